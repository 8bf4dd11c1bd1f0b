//! Generation with a deadline
//!
//! Generation runs on tokio's blocking pool. If it does not finish before
//! the deadline, the caller stops waiting and receives
//! [`RandomnessError::GenerationTimeout`]. The worker itself is not
//! interrupted and finishes in the background.

use randomness_core::{RandomnessError, RandomnessResult};
use std::any::{Any, type_name};
use std::fmt::Display;
use std::time::Duration;
use tracing::warn;

/// Run `generate` on a worker thread, waiting at most `timeout` for its result
///
/// A failure of `generate` is reported as a generation error carrying its
/// message, or its type name if the message is empty.
pub async fn generate_timely<T, E, F>(timeout: Duration, generate: F) -> RandomnessResult<T>
where
    T: Send + 'static,
    E: Display + Send + 'static,
    F: FnOnce() -> Result<T, E> + Send + 'static,
{
    let worker = tokio::task::spawn_blocking(generate);

    match tokio::time::timeout(timeout, worker).await {
        Ok(Ok(Ok(output))) => Ok(output),
        Ok(Ok(Err(error))) => Err(RandomnessError::generation(failure_message(&error))),
        Ok(Err(join_error)) => {
            let message = if join_error.is_panic() {
                panic_message(join_error.into_panic())
            } else {
                join_error.to_string()
            };
            Err(RandomnessError::generation(message))
        }
        Err(_) => {
            warn!("Generation did not finish within {:?}.", timeout);
            Err(RandomnessError::GenerationTimeout)
        }
    }
}

/// The message of `error`, or the name of its type if it has none
fn failure_message<E: Display>(error: &E) -> String {
    let message = error.to_string();
    if !message.is_empty() {
        return message;
    }

    let name = type_name::<E>();
    name.rsplit("::").next().unwrap_or(name).to_string()
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => match payload.downcast::<&str>() {
            Ok(message) => message.to_string(),
            Err(_) => "Generation panicked.".to_string(),
        },
    }
}
