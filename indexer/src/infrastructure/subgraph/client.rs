use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

use crate::config::{AppConfig, Network};
use crate::domain::models::{GlobalInfo, StakeEnd, StakeStart};
use crate::domain::ports::StakeEventSource;
use crate::infrastructure::subgraph::error::SubgraphClientError;
use crate::infrastructure::subgraph::pagination::{paginate, FetchOptions};
use crate::infrastructure::subgraph::queries::{
    page_variables, GLOBAL_INFO_QUERY, STAKE_ENDS_QUERY, STAKE_STARTS_QUERY,
};
use crate::infrastructure::subgraph::records::{
    GlobalInfosData, GraphqlResponse, StakeEndsData, StakeStartsData,
};
use crate::utils::cancel::CancelSignal;
use crate::utils::logging;
use crate::utils::RetryHandler;

/// Client for the per-network stake subgraphs
#[derive(Debug, Clone)]
pub struct SubgraphClient {
    client: Client,
    endpoints: HashMap<Network, String>,
    retry_handler: RetryHandler,
}

impl SubgraphClient {
    /// Create a client for every configured network
    pub fn new(config: &AppConfig) -> Result<Self, SubgraphClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.sync.request_timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        let endpoints = config
            .subgraphs
            .iter()
            .map(|s| (s.network, s.url.clone()))
            .collect();

        Ok(Self {
            client,
            endpoints,
            retry_handler: RetryHandler::with_config(
                config.sync.max_retries,
                config.sync.retry_base_delay_ms,
            ),
        })
    }

    /// Endpoint URL for a network
    pub fn endpoint(&self, network: Network) -> Result<&str, SubgraphClientError> {
        self.endpoints
            .get(&network)
            .map(String::as_str)
            .ok_or(SubgraphClientError::UnknownNetwork(network))
    }

    /// Send one GraphQL request, retrying transient failures with backoff
    async fn query<D: DeserializeOwned>(
        &self,
        network: Network,
        operation_name: &str,
        query: &str,
        variables: Value,
    ) -> Result<D, SubgraphClientError> {
        let url = self.endpoint(network)?;
        let variables = &variables;

        self.retry_handler
            .execute_with_retry_if(
                move || self.post_query::<D>(url, query, variables),
                SubgraphClientError::is_transient,
                operation_name,
                network.as_str(),
            )
            .await
    }

    async fn post_query<D: DeserializeOwned>(
        &self,
        url: &str,
        query: &str,
        variables: &Value,
    ) -> Result<D, SubgraphClientError> {
        let body = json!({ "query": query, "variables": variables });
        let response = self.client.post(url).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SubgraphClientError::StatusError {
                status: status.as_u16(),
                body: truncate(&body, 200),
            });
        }

        let bytes = response.bytes().await?;
        let envelope: GraphqlResponse<D> = serde_json::from_slice(&bytes)?;

        if let Some(errors) = envelope.errors.filter(|e| !e.is_empty()) {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(SubgraphClientError::GraphqlError(messages.join("; ")));
        }

        envelope.data.ok_or_else(|| {
            SubgraphClientError::MalformedResponse("response has neither data nor errors".into())
        })
    }
}

#[async_trait]
impl StakeEventSource for SubgraphClient {
    async fn fetch_stake_starts(
        &self,
        network: Network,
        options: &FetchOptions,
        cancel: &CancelSignal,
    ) -> Result<Vec<StakeStart>, SubgraphClientError> {
        logging::log_info(&format!(
            "[{}] 📥 Fetching stake starts (page size {}, ceiling {}, filter {:?})",
            network, options.page_size, options.max_records, options.filter
        ));

        let starts = paginate(options, cancel, move |first, skip| async move {
            let data: StakeStartsData = self
                .query(
                    network,
                    &format!("stakeStarts page (skip {})", skip),
                    STAKE_STARTS_QUERY,
                    page_variables(first, skip, &options.filter),
                )
                .await?;
            data.stake_starts
                .into_iter()
                .map(|record| record.into_domain(network))
                .collect::<Result<Vec<_>, _>>()
        })
        .await?;

        logging::log_info(&format!(
            "[{}] ✅ Fetched {} stake starts",
            network,
            starts.len()
        ));
        Ok(starts)
    }

    async fn fetch_stake_ends(
        &self,
        network: Network,
        options: &FetchOptions,
        cancel: &CancelSignal,
    ) -> Result<Vec<StakeEnd>, SubgraphClientError> {
        logging::log_info(&format!(
            "[{}] 📥 Fetching stake ends (page size {}, ceiling {}, filter {:?})",
            network, options.page_size, options.max_records, options.filter
        ));

        let ends = paginate(options, cancel, move |first, skip| async move {
            let data: StakeEndsData = self
                .query(
                    network,
                    &format!("stakeEnds page (skip {})", skip),
                    STAKE_ENDS_QUERY,
                    page_variables(first, skip, &options.filter),
                )
                .await?;
            data.stake_ends
                .into_iter()
                .map(|record| record.into_domain(network))
                .collect::<Result<Vec<_>, _>>()
        })
        .await?;

        logging::log_info(&format!("[{}] ✅ Fetched {} stake ends", network, ends.len()));
        Ok(ends)
    }

    async fn fetch_global_info(
        &self,
        network: Network,
    ) -> Result<Option<GlobalInfo>, SubgraphClientError> {
        let data: GlobalInfosData = self
            .query(network, "globalInfos", GLOBAL_INFO_QUERY, json!({}))
            .await?;

        data.global_infos
            .into_iter()
            .next()
            .map(|record| record.into_domain(network))
            .transpose()
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}…", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseConfig, SubgraphConfig, SyncConfig, WebConfig};

    fn config() -> AppConfig {
        AppConfig {
            subgraphs: vec![SubgraphConfig {
                network: Network::Ethereum,
                url: "http://localhost:8000/subgraphs/name/hex".to_string(),
                enabled: true,
            }],
            database: DatabaseConfig {
                url: "postgres://localhost/test".to_string(),
            },
            sync: SyncConfig::default(),
            web: WebConfig { api_port: 0 },
        }
    }

    #[test]
    fn test_endpoint_lookup() {
        let client = SubgraphClient::new(&config()).unwrap();
        assert_eq!(
            client.endpoint(Network::Ethereum).unwrap(),
            "http://localhost:8000/subgraphs/name/hex"
        );
        assert!(matches!(
            client.endpoint(Network::Pulsechain),
            Err(SubgraphClientError::UnknownNetwork(Network::Pulsechain))
        ));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc…");
    }
}
