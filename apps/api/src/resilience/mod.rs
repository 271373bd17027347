// Request resilience: bounded retry with backoff, plus failure classification.
// Used by the model invoker; nothing here performs I/O except the retry waits.

pub mod classifier;
pub mod retry;

pub use classifier::{is_retryable, to_user_message, Classify};
pub use retry::{execute, RetryPolicy};
