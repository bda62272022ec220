//! Smtp-courier delivers a single email message by driving the SMTP protocol
//! directly over a TCP connection.
//!
//! Blind-copy recipients get their own mail transaction each, on their own
//! connection, so a BCC address never shares an envelope with anyone else.
//! The To and CC recipients are delivered together in one final transaction.

#![deny(
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    missing_debug_implementations,
    clippy::unwrap_used
)]

pub mod client;
mod codec;
pub mod commands;
mod compose;
pub mod error;
pub mod response;
pub mod stream;
mod types;

pub use types::*;

pub use crate::client::{DeliveryReport, SmtpClient};
pub use crate::error::{Error, SmtpResult};
pub use crate::response::Reply;
