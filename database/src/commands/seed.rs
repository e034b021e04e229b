use sea_orm::{ConnectionTrait, DbBackend, Statement, Value};
use std::error::Error;
use tracing::info;

use crate::commands::migrate;

/// Networks the indexer keeps a `sync_status` row for
pub const NETWORKS: [&str; 2] = ["ethereum", "pulsechain"];

const INSERT_STATUS_SQL: &str = "INSERT INTO sync_status (network, updated_at) \
     VALUES ($1, NOW()) \
     ON CONFLICT (network) DO NOTHING";

const CLEAR_IN_PROGRESS_SQL: &str = "UPDATE sync_status \
     SET sync_in_progress = FALSE, updated_at = NOW() \
     WHERE network = $1 AND sync_in_progress";

/// Execute the seed command
///
/// Inserts any missing `sync_status` rows. With `clear_in_progress` it also drops the
/// in-progress flag a crashed indexer left behind.
pub async fn execute(network: Option<String>, clear_in_progress: bool) -> Result<(), Box<dyn Error>> {
    let networks = resolve_networks(network.as_deref())?;
    let connection = migrate::connect().await?;

    for network in networks {
        let inserted = connection
            .execute(Statement::from_sql_and_values(
                DbBackend::Postgres,
                INSERT_STATUS_SQL,
                [Value::from(network)],
            ))
            .await?
            .rows_affected();

        if inserted > 0 {
            info!("Seeded sync_status row for {}", network);
        } else {
            info!("sync_status row for {} already present", network);
        }

        if clear_in_progress {
            let cleared = connection
                .execute(Statement::from_sql_and_values(
                    DbBackend::Postgres,
                    CLEAR_IN_PROGRESS_SQL,
                    [Value::from(network)],
                ))
                .await?
                .rows_affected();
            if cleared > 0 {
                info!("Cleared stale in-progress flag for {}", network);
            }
        }
    }

    Ok(())
}

fn resolve_networks(network: Option<&str>) -> Result<Vec<&'static str>, String> {
    match network {
        None => Ok(NETWORKS.to_vec()),
        Some(name) => {
            let name = name.trim().to_ascii_lowercase();
            NETWORKS
                .iter()
                .find(|n| **n == name)
                .map(|n| vec![*n])
                .ok_or_else(|| {
                    format!("unknown network '{}', expected one of {}", name, NETWORKS.join(", "))
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_networks() {
        assert_eq!(resolve_networks(None).unwrap(), vec!["ethereum", "pulsechain"]);
        assert_eq!(resolve_networks(Some("PulseChain")).unwrap(), vec!["pulsechain"]);
        assert!(resolve_networks(Some("polygon")).unwrap_err().contains("polygon"));
    }
}
