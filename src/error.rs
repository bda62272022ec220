//! Error and result types for the delivery client.

use std::io;

use crate::response::Reply;

/// All the ways a delivery can fail.
///
/// Protocol variants carry the server's full [`Reply`] so callers can inspect
/// the raw status code and text instead of comparing opaque error values.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// From address does not contain exactly one `'@'`
    #[error("from address must contain exactly one '@'")]
    InvalidFrom,
    /// No To recipients defined
    #[error("no recipients defined")]
    NoRecipients,
    /// Message body is empty
    #[error("message body undefined")]
    EmptyBody,
    /// Server host is empty
    #[error("server host undefined")]
    MissingHost,
    /// Server port is zero
    #[error("server port undefined")]
    MissingPort,
    /// Greeting was not 220
    #[error("server reports not ready: {0}")]
    ServerNotReady(Reply),
    /// Both EHLO and HELO were rejected
    #[error("EHLO/HELO not accepted: {0}")]
    GreetingNotAccepted(Reply),
    /// MAIL FROM was rejected
    #[error("MAIL FROM not accepted: {0}")]
    SenderRejected(Reply),
    /// RCPT TO was rejected
    #[error("RCPT TO not accepted: {0}")]
    RecipientRejected(Reply),
    /// DATA was rejected
    #[error("DATA not accepted: {0}")]
    DataNotAccepted(Reply),
    /// QUIT was rejected
    #[error("QUIT not accepted: {0}")]
    QuitNotAccepted(Reply),
    /// Reply line too short or status code not numeric
    #[error("malformed reply line: {0:?}")]
    MalformedReply(String),
    /// IO error
    #[error("io: {0}")]
    Io(#[from] io::Error),
    /// Network operation exceeded the configured deadline
    #[error("timeout: {0}")]
    Timeout(#[from] tokio::time::error::Elapsed),
}

/// Result of one SMTP exchange.
pub type SmtpResult = Result<Reply, Error>;
