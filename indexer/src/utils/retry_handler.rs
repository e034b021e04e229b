//! Retry handler for operations that may fail temporarily

use std::fmt::Display;
use std::future::Future;
use tokio::time::{sleep, Duration};

use crate::utils::logging;

/// Handles retry logic with exponential backoff
#[derive(Debug, Clone)]
pub struct RetryHandler {
    max_retries: u32,
    base_delay_ms: u64,
}

impl RetryHandler {
    /// `max_retries` counts total attempts, so 1 means "no retry"
    pub fn with_config(max_retries: u32, base_delay_ms: u64) -> Self {
        Self {
            max_retries: max_retries.max(1),
            base_delay_ms,
        }
    }

    /// Execute an operation, retrying only failures accepted by `should_retry`
    pub async fn execute_with_retry_if<F, Fut, T, E, P>(
        &self,
        operation: F,
        should_retry: P,
        operation_name: &str,
        network_name: &str,
    ) -> Result<T, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
        P: Fn(&E) -> bool,
    {
        let mut retry_count = 0;

        loop {
            match operation().await {
                Ok(result) => {
                    if retry_count > 0 {
                        logging::log_info(&format!(
                            "[{}] {} succeeded after {} retries",
                            network_name, operation_name, retry_count
                        ));
                    }
                    return Ok(result);
                }
                Err(e) => {
                    retry_count += 1;

                    if !should_retry(&e) {
                        return Err(e);
                    }

                    if retry_count >= self.max_retries {
                        logging::log_error(&format!(
                            "[{}] {} failed after {} attempts: {}",
                            network_name, operation_name, self.max_retries, e
                        ));
                        return Err(e);
                    }

                    let delay = self.calculate_delay(retry_count);
                    logging::log_warning(&format!(
                        "[{}] {} failed (attempt {}/{}): {}. Retrying in {}ms",
                        network_name, operation_name, retry_count, self.max_retries, e, delay
                    ));

                    sleep(Duration::from_millis(delay)).await;
                }
            }
        }
    }

    /// Calculate exponential backoff delay
    fn calculate_delay(&self, retry_count: u32) -> u64 {
        let exponent = retry_count.saturating_sub(1).min(16);
        self.base_delay_ms.saturating_mul(2_u64.pow(exponent))
    }
}
