//! HTTP clients for the two external services.
//!
//! Both clients own their retry behaviour: transient failures (rate limits,
//! 5xx responses, refused connections) are retried with a doubling delay
//! before an error is returned to the caller.

mod garmin;
mod github;
mod retry;

pub use garmin::*;
pub use github::*;
pub use retry::{RetryPolicy, Transient};

/// User agent sent with every request. GitHub rejects requests without one.
const USER_AGENT: &str = concat!("sleeplog/", env!("CARGO_PKG_VERSION"));
