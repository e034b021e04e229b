pub mod namespacing;
pub mod reconciler;

pub use namespacing::{namespaced_key, split_namespaced_key};
pub use reconciler::{reconcile, Reconciliation};
