use std::fmt::{self, Display, Formatter};

/// Email address with an optional display name.
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct Address {
    /// Display name shown to recipients, if any.
    pub name: Option<String>,
    /// The `user@domain` address itself.
    pub email: String,
}

impl Address {
    /// Creates an address without a display name.
    pub fn new(email: impl Into<String>) -> Address {
        Address {
            name: None,
            email: email.into(),
        }
    }

    /// Creates an address with a display name.
    pub fn with_name(name: impl Into<String>, email: impl Into<String>) -> Address {
        Address {
            name: Some(name.into()),
            email: email.into(),
        }
    }

    /// The envelope check is deliberately trivial: exactly one `'@'`.
    /// Real validation is the server's job.
    pub fn is_well_formed(&self) -> bool {
        self.email.chars().filter(|c| *c == '@').count() == 1
    }

    /// Everything after the `'@'`, announced during EHLO/HELO.
    pub(crate) fn domain(&self) -> &str {
        self.email.splitn(2, '@').nth(1).unwrap_or("")
    }
}

/// An email message ready for delivery.
///
/// `to`, `cc` and `bcc` keep their insertion order; envelope recipients are
/// issued in exactly that order.
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct Message {
    pub from: Address,
    pub to: Vec<Address>,
    pub cc: Vec<Address>,
    pub bcc: Vec<Address>,
    pub body: String,
    pub attachments: Vec<Attachment>,
}

/// File attachment transmitted as a MIME part.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Attachment {
    pub content_id: String,
    pub content_type: String,
    pub transfer_encoding: TransferEncoding,
    pub data: Vec<u8>,
}

/// Content-Transfer-Encoding of an attachment part.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum TransferEncoding {
    SevenBit,
    EightBit,
    Base64,
}

impl TransferEncoding {
    pub(crate) fn header_value(self) -> &'static str {
        match self {
            TransferEncoding::SevenBit => "7bit",
            TransferEncoding::EightBit => "8bit",
            TransferEncoding::Base64 => "base64",
        }
    }
}

/// Mail server to deliver to.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct ServerAddress {
    pub host: String,
    pub port: u16,
}

impl ServerAddress {
    pub fn new(host: impl Into<String>, port: u16) -> ServerAddress {
        ServerAddress {
            host: host.into(),
            port,
        }
    }
}

impl Display for ServerAddress {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
