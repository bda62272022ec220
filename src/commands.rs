//! SMTP commands, each rendering itself as one CRLF-terminated line.

use std::fmt::{self, Display, Formatter};

use crate::types::Address;

/// EHLO command
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct EhloCommand {
    domain: String,
}

impl EhloCommand {
    /// Creates an EHLO command announcing the given domain
    pub fn new(domain: impl Into<String>) -> EhloCommand {
        EhloCommand {
            domain: domain.into(),
        }
    }
}

impl Display for EhloCommand {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "EHLO {}\r\n", self.domain)
    }
}

/// HELO command, the fallback when EHLO is rejected
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct HeloCommand {
    domain: String,
}

impl HeloCommand {
    /// Creates a HELO command announcing the given domain
    pub fn new(domain: impl Into<String>) -> HeloCommand {
        HeloCommand {
            domain: domain.into(),
        }
    }
}

impl Display for HeloCommand {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "HELO {}\r\n", self.domain)
    }
}

/// MAIL FROM command
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct MailCommand {
    from: Address,
}

impl MailCommand {
    /// Creates a MAIL FROM command for the given sender
    pub fn new(from: Address) -> MailCommand {
        MailCommand { from }
    }
}

impl Display for MailCommand {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self.from.name {
            Some(ref name) => write!(f, "MAIL FROM:\"{}\"<{}>\r\n", name, self.from.email),
            None => write!(f, "MAIL FROM:<{}>\r\n", self.from.email),
        }
    }
}

/// RCPT TO command
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct RcptCommand {
    to: Address,
}

impl RcptCommand {
    /// Creates an RCPT TO command for the given recipient
    pub fn new(to: Address) -> RcptCommand {
        RcptCommand { to }
    }
}

impl Display for RcptCommand {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self.to.name {
            Some(ref name) => write!(f, "RCPT TO:\"{}\"<{}>\r\n", name, self.to.email),
            None => write!(f, "RCPT TO:<{}>\r\n", self.to.email),
        }
    }
}

/// DATA command
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct DataCommand;

impl Display for DataCommand {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str("DATA\r\n")
    }
}

/// QUIT command
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct QuitCommand;

impl Display for QuitCommand {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str("QUIT\r\n")
    }
}
