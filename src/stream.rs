//! Buffered command/response exchange over one connection.

use std::fmt::Display;

use log::debug;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::codec;
use crate::error::{Error, SmtpResult};
use crate::response::{parse_reply_line, Reply};

/// SMTP stream.
///
/// Every command is followed by exactly one reply read; nothing is ever
/// pipelined.
#[derive(Debug)]
pub struct SmtpStream<S: AsyncRead + AsyncWrite + Unpin> {
    /// Inner stream.
    inner: BufReader<S>,
    /// Bytes written so far, informational only.
    bytes_sent: usize,
}

impl<S: AsyncRead + AsyncWrite + Unpin> SmtpStream<S> {
    /// Creates new SMTP stream.
    pub fn new(stream: S) -> Self {
        Self {
            inner: BufReader::new(stream),
            bytes_sent: 0,
        }
    }

    /// Bytes written to the server so far.
    pub fn bytes_sent(&self) -> usize {
        self.bytes_sent
    }

    /// Returns inner stream.
    ///
    /// Should only be used when there are no unread replies,
    /// because the buffer of `BufReader` may be lost.
    pub fn into_inner(self) -> S {
        self.inner.into_inner()
    }

    /// Sends the given SMTP command and reads the matching reply.
    pub async fn command(&mut self, command: impl Display) -> SmtpResult {
        self.write(command.to_string().as_bytes()).await?;
        self.read_reply().await
    }

    /// Writes the given data to the server and flushes before returning.
    async fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.inner.get_mut().write_all(bytes).await?;
        self.inner.get_mut().flush().await?;
        self.bytes_sent += bytes.len();

        debug!(
            ">> {}",
            escape_crlf(String::from_utf8_lossy(bytes).as_ref())
        );
        Ok(())
    }

    /// Reads one server reply off the wire, following continuation lines
    /// (4th character `'-'`) until the final one.
    pub async fn read_reply(&mut self) -> SmtpResult {
        let mut lines = Vec::new();

        loop {
            let mut buffer = String::with_capacity(100);
            let read = self.inner.read_line(&mut buffer).await?;
            if read == 0 {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "connection closed mid-reply",
                )
                .into());
            }
            debug!("<< {}", escape_crlf(&buffer));

            let line = parse_reply_line(&buffer)?;
            let last = line.last;
            let code = line.code;
            lines.push(line.text);
            if last {
                return Ok(Reply { code, lines });
            }
        }
    }

    /// Sends the DATA payload, dot-stuffed and terminated, then reads the
    /// server's verdict.
    pub async fn payload(&mut self, payload: &[u8]) -> SmtpResult {
        let mut encoded = codec::encode(payload);
        encoded.extend_from_slice(codec::TERMINATOR);

        self.inner.get_mut().write_all(&encoded).await?;
        self.inner.get_mut().flush().await?;
        self.bytes_sent += encoded.len();
        debug!(">> [{} byte payload]", encoded.len());

        self.read_reply().await
    }
}

/// Returns the string replacing all the CRLF with "\<CRLF\>"
/// Used for debug displays
fn escape_crlf(string: &str) -> String {
    string.replace("\r\n", "<CRLF>")
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::commands::DataCommand;
    use tokio::io::AsyncReadExt;

    #[test]
    fn test_escape_crlf() {
        assert_eq!(escape_crlf("\r\n"), "<CRLF>");
        assert_eq!(escape_crlf("EHLO my_name\r\n"), "EHLO my_name<CRLF>");
        assert_eq!(
            escape_crlf("EHLO my_name\r\nSIZE 42\r\n"),
            "EHLO my_name<CRLF>SIZE 42<CRLF>"
        );
    }

    #[tokio::test]
    async fn multi_line_reply_keeps_order() {
        let (client, mut server) = tokio::io::duplex(1024);
        server
            .write_all(b"250-first\r\n250-second\r\n250 third\r\n")
            .await
            .unwrap();

        let mut stream = SmtpStream::new(client);
        let reply = stream.read_reply().await.unwrap();
        assert_eq!(reply.code, 250);
        assert_eq!(reply.lines, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn command_writes_line_then_reads_reply() {
        let (client, server) = tokio::io::duplex(1024);
        let (mut server_read, mut server_write) = tokio::io::split(server);
        server_write.write_all(b"354 go ahead\r\n").await.unwrap();

        let mut stream = SmtpStream::new(client);
        let reply = stream.command(DataCommand).await.unwrap();
        assert_eq!(reply.code, 354);

        let mut sent = [0u8; 6];
        server_read.read_exact(&mut sent).await.unwrap();
        assert_eq!(&sent, b"DATA\r\n");
        assert_eq!(stream.bytes_sent(), 6);
    }

    #[tokio::test]
    async fn short_line_is_malformed() {
        let (client, mut server) = tokio::io::duplex(1024);
        server.write_all(b"ok\r\n").await.unwrap();

        let mut stream = SmtpStream::new(client);
        assert!(matches!(
            stream.read_reply().await,
            Err(Error::MalformedReply(_))
        ));
    }

    #[tokio::test]
    async fn closed_connection_surfaces_io_error() {
        let (client, server) = tokio::io::duplex(1024);
        drop(server);

        let mut stream = SmtpStream::new(client);
        assert!(matches!(stream.read_reply().await, Err(Error::Io(_))));
    }

    #[tokio::test]
    async fn payload_is_stuffed_and_terminated() {
        let (client, server) = tokio::io::duplex(1024);
        let (server_read, mut server_write) = tokio::io::split(server);
        server_write.write_all(b"250 queued\r\n").await.unwrap();

        let mut stream = SmtpStream::new(client);
        let reply = stream.payload(b"hi\n.hidden\n").await.unwrap();
        assert_eq!(reply.code, 250);
        drop(stream);
        drop(server_write);

        let mut reader = BufReader::new(server_read);
        let mut sent = Vec::new();
        reader.read_to_end(&mut sent).await.unwrap();
        assert_eq!(&sent, b"hi\r\n..hidden\r\n.\r\n");
    }
}
