//! Relay implementations.
//!
//! Each relay implements the [`Mailer`](crate::Mailer) trait.
//!
//! | Relay | Description |
//! |-------|-------------|
//! | [`ResendMailer`] | Resend HTTP API |
//! | [`LocalMailer`] | Records calls in memory for dev/testing |

mod resend;
pub use resend::{ResendMailer, REQUEST_TIMEOUT};

mod local;
pub use local::{LocalMailer, RecordedDelivery};
