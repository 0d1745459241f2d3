//! Core logic for sleeplog.
//!
//! Everything in this crate is pure: no I/O, no environment access, no clock
//! reads. Callers pass in the current time and the comment history they
//! fetched from the issue tracker.
//!
//! # Pieces
//!
//! - [`DailyRecord`]: one night of sleep, attributed to the day the sleeper
//!   woke up, with times already shifted to UTC+8.
//! - [`format_record`]: the single display line posted for a record.
//! - [`compose`] / [`extract_payload`]: attach and strip the hidden
//!   `<!-- data-source: ..., ... -->` footer.
//! - [`is_duplicate`]: decide whether a payload is already present in an
//!   issue's recent comments.
//! - [`describe_age`]: the `X岁Y个月Z天` suffix used by quick notes.

mod age;
mod composer;
mod formatter;
mod guard;
mod record;

pub use age::*;
pub use composer::*;
pub use formatter::*;
pub use guard::*;
pub use record::*;
