//! High level delivery client and session orchestration.

use std::fmt::Display;
use std::time::Duration;

use log::debug;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::commands::{
    DataCommand, EhloCommand, HeloCommand, MailCommand, QuitCommand, RcptCommand,
};
use crate::compose;
use crate::error::{Error, SmtpResult};
use crate::stream::SmtpStream;
use crate::types::{Address, Message, ServerAddress};

/// Default per-operation network deadline.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Outcome of a successful delivery.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct DeliveryReport {
    /// Envelopes (mail transactions) delivered.
    pub envelopes: usize,
    /// Bytes written across all sessions. Informational only.
    pub bytes_sent: usize,
}

/// Contains client configuration
#[derive(Clone, Debug)]
pub struct SmtpClient {
    /// Server we are delivering to
    server: ServerAddress,
    /// Per-operation network deadline
    timeout: Option<Duration>,
}

impl SmtpClient {
    /// Creates a new SMTP client for the given server.
    ///
    /// It does not connect; connections are opened per transaction during
    /// [`SmtpClient::send`]. Defaults to a 60 second per-operation deadline.
    pub fn new(server: ServerAddress) -> SmtpClient {
        SmtpClient {
            server,
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    /// Set the per-operation deadline. `None` disables it.
    pub fn timeout(mut self, timeout: Option<Duration>) -> SmtpClient {
        self.timeout = timeout;
        self
    }

    /// Delivers `message`: one mail transaction per blind-copy recipient,
    /// then one for the To and CC recipients together. Each transaction gets
    /// its own connection and session, since QUIT ends a session; this keeps
    /// every BCC envelope private without reusing a half-closed connection.
    ///
    /// The first failing check or exchange aborts the whole delivery.
    pub async fn send(&self, message: &Message) -> Result<DeliveryReport, Error> {
        self.validate(message)?;

        let payload = compose::render(message);
        let mut bytes_sent = 0;
        let mut envelopes = 0;

        for recipients in envelope_groups(message) {
            let stream = self.connect().await?;
            let mut session = Session::new(stream, self.timeout);
            bytes_sent += session.deliver(message, &recipients, &payload).await?;
            envelopes += 1;
        }

        Ok(DeliveryReport {
            envelopes,
            bytes_sent,
        })
    }

    /// Minimum-detail checks, in fixed order, first failure wins.
    fn validate(&self, message: &Message) -> Result<(), Error> {
        if !message.from.is_well_formed() {
            return Err(Error::InvalidFrom);
        }
        if message.to.is_empty() {
            return Err(Error::NoRecipients);
        }
        if message.body.is_empty() {
            return Err(Error::EmptyBody);
        }
        if self.server.host.is_empty() {
            return Err(Error::MissingHost);
        }
        if self.server.port == 0 {
            return Err(Error::MissingPort);
        }
        Ok(())
    }

    async fn connect(&self) -> Result<TcpStream, Error> {
        debug!("connecting to {}", self.server);
        let addr = (self.server.host.as_str(), self.server.port);
        let stream = match self.timeout {
            Some(limit) => timeout(limit, TcpStream::connect(addr)).await??,
            None => TcpStream::connect(addr).await?,
        };
        Ok(stream)
    }
}

/// Envelope recipient groups in delivery order: one group per BCC recipient,
/// then the combined To+CC group last.
fn envelope_groups(message: &Message) -> Vec<Vec<&Address>> {
    let mut groups: Vec<Vec<&Address>> =
        message.bcc.iter().map(|address| vec![address]).collect();
    groups.push(message.to.iter().chain(message.cc.iter()).collect());
    groups
}

/// One SMTP session: greeting, EHLO/HELO negotiation, a single mail
/// transaction and QUIT.
///
/// Dropping the session drops the connection, so the socket is released on
/// every exit path, failure included.
struct Session<S: AsyncRead + AsyncWrite + Unpin> {
    stream: SmtpStream<S>,
    timeout: Option<Duration>,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Session<S> {
    fn new(stream: S, timeout: Option<Duration>) -> Session<S> {
        Session {
            stream: SmtpStream::new(stream),
            timeout,
        }
    }

    /// Runs the whole session for one envelope. Returns bytes written.
    async fn deliver(
        &mut self,
        message: &Message,
        recipients: &[&Address],
        payload: &[u8],
    ) -> Result<usize, Error> {
        let greeting = self.read_reply().await?;
        if !greeting.has_code(220) {
            return Err(Error::ServerNotReady(greeting));
        }

        let domain = message.from.domain();
        let mut hello = self.command(EhloCommand::new(domain)).await?;
        if !hello.has_code(250) {
            // older servers only speak HELO
            hello = self.command(HeloCommand::new(domain)).await?;
            if !hello.has_code(250) {
                return Err(Error::GreetingNotAccepted(hello));
            }
        }

        let reply = self.command(MailCommand::new(message.from.clone())).await?;
        if !reply.has_code(250) {
            return Err(Error::SenderRejected(reply));
        }

        for recipient in recipients {
            let reply = self.command(RcptCommand::new((*recipient).clone())).await?;
            if !reply.has_code(250) {
                return Err(Error::RecipientRejected(reply));
            }
            debug!("to=<{}>", recipient.email);
        }

        let reply = self.command(DataCommand).await?;
        if !reply.has_code(354) {
            return Err(Error::DataNotAccepted(reply));
        }

        let verdict = self.payload(payload).await?;
        debug!(
            "status=sent ({})",
            verdict.first_line().unwrap_or("no response")
        );

        let reply = self.command(QuitCommand).await?;
        if !reply.has_code(221) {
            return Err(Error::QuitNotAccepted(reply));
        }

        Ok(self.stream.bytes_sent())
    }

    async fn read_reply(&mut self) -> SmtpResult {
        match self.timeout {
            Some(limit) => timeout(limit, self.stream.read_reply()).await?,
            None => self.stream.read_reply().await,
        }
    }

    async fn command(&mut self, command: impl Display) -> SmtpResult {
        match self.timeout {
            Some(limit) => timeout(limit, self.stream.command(command)).await?,
            None => self.stream.command(command).await,
        }
    }

    async fn payload(&mut self, payload: &[u8]) -> SmtpResult {
        match self.timeout {
            Some(limit) => timeout(limit, self.stream.payload(payload)).await?,
            None => self.stream.payload(payload).await,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample_message() -> Message {
        Message {
            from: Address::new("sender@example.org"),
            to: vec![Address::new("dest@example.org")],
            cc: vec![],
            bcc: vec![],
            body: "Testing".to_string(),
            attachments: vec![],
        }
    }

    fn client() -> SmtpClient {
        SmtpClient::new(ServerAddress::new("mail.example.org", 25))
    }

    #[tokio::test]
    async fn rejects_from_without_at_sign() {
        let mut message = sample_message();
        message.from.email = "nobody".to_string();
        assert!(matches!(
            client().send(&message).await,
            Err(Error::InvalidFrom)
        ));
    }

    #[tokio::test]
    async fn rejects_from_with_two_at_signs() {
        let mut message = sample_message();
        message.from.email = "a@b@example.org".to_string();
        assert!(matches!(
            client().send(&message).await,
            Err(Error::InvalidFrom)
        ));
    }

    #[tokio::test]
    async fn rejects_empty_recipient_list() {
        let mut message = sample_message();
        message.to.clear();
        assert!(matches!(
            client().send(&message).await,
            Err(Error::NoRecipients)
        ));
    }

    #[tokio::test]
    async fn rejects_empty_body() {
        let mut message = sample_message();
        message.body.clear();
        assert!(matches!(client().send(&message).await, Err(Error::EmptyBody)));
    }

    #[tokio::test]
    async fn rejects_empty_host_and_zero_port() {
        let client = SmtpClient::new(ServerAddress::new("", 25));
        assert!(matches!(
            client.send(&sample_message()).await,
            Err(Error::MissingHost)
        ));

        let client = SmtpClient::new(ServerAddress::new("mail.example.org", 0));
        assert!(matches!(
            client.send(&sample_message()).await,
            Err(Error::MissingPort)
        ));
    }

    #[tokio::test]
    async fn validation_short_circuits_in_fixed_order() {
        // everything is wrong; the from check must win
        let message = Message::default();
        let client = SmtpClient::new(ServerAddress::new("", 0));
        assert!(matches!(client.send(&message).await, Err(Error::InvalidFrom)));
    }

    #[test]
    fn groups_put_each_bcc_alone_and_to_cc_last() {
        let mut message = sample_message();
        message.cc = vec![Address::new("cc@example.org")];
        message.bcc = vec![
            Address::new("b1@example.org"),
            Address::new("b2@example.org"),
        ];

        let groups = envelope_groups(&message);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0], vec![&message.bcc[0]]);
        assert_eq!(groups[1], vec![&message.bcc[1]]);
        assert_eq!(groups[2], vec![&message.to[0], &message.cc[0]]);
    }

    #[test]
    fn no_bcc_means_a_single_group() {
        let message = sample_message();
        let groups = envelope_groups(&message);
        assert_eq!(groups.len(), 1);
    }
}
