pub mod cancel;
pub mod logging;
pub mod retry_handler;

pub use cancel::CancelSignal;
pub use retry_handler::RetryHandler;
