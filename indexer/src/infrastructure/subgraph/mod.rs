pub mod client;
pub mod error;
pub mod pagination;
pub mod queries;
pub mod records;

pub use client::SubgraphClient;
pub use error::SubgraphClientError;
pub use pagination::{EventFilter, FetchOptions};
