//! RFC 5322 header block and MIME framing for outgoing messages.
//!
//! The rendered payload is identical for every transaction of one delivery:
//! To and Cc headers are present, Bcc is never rendered, so blind recipients
//! receive the same content without being named anywhere in it.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::{Address, Message, TransferEncoding};

/// Renders the full DATA payload for a message: headers, text body and any
/// attachment parts. Dot-stuffing is left to the codec.
pub(crate) fn render(message: &Message) -> Vec<u8> {
    let mut out = String::new();

    out.push_str(&format!("From: {}\r\n", header_address(&message.from)));
    out.push_str(&format!("To: {}\r\n", address_list(&message.to)));
    if !message.cc.is_empty() {
        out.push_str(&format!("Cc: {}\r\n", address_list(&message.cc)));
    }

    if message.attachments.is_empty() {
        out.push_str("Content-Type: text/plain; charset=utf-8\r\n");
        out.push_str("\r\n");
        out.push_str(&message.body);
        return out.into_bytes();
    }

    let boundary = boundary();
    out.push_str("MIME-Version: 1.0\r\n");
    out.push_str(&format!(
        "Content-Type: multipart/mixed; boundary=\"{}\"\r\n\r\n",
        boundary
    ));

    out.push_str(&format!("--{}\r\n", boundary));
    out.push_str("Content-Type: text/plain; charset=utf-8\r\n\r\n");
    out.push_str(&message.body);
    out.push_str("\r\n");

    let mut bytes = out.into_bytes();
    for attachment in &message.attachments {
        let mut part = format!("--{}\r\n", boundary);
        part.push_str(&format!("Content-Type: {}\r\n", attachment.content_type));
        part.push_str(&format!("Content-ID: <{}>\r\n", attachment.content_id));
        part.push_str(&format!(
            "Content-Transfer-Encoding: {}\r\n\r\n",
            attachment.transfer_encoding.header_value()
        ));
        bytes.extend_from_slice(part.as_bytes());

        match attachment.transfer_encoding {
            TransferEncoding::Base64 => {
                let mut encoded = String::new();
                wrap_mime_lines(&base64::encode(&attachment.data), &mut encoded);
                bytes.extend_from_slice(encoded.as_bytes());
            }
            _ => {
                bytes.extend_from_slice(&attachment.data);
                bytes.extend_from_slice(b"\r\n");
            }
        }
    }
    bytes.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

    bytes
}

fn header_address(address: &Address) -> String {
    match address.name {
        Some(ref name) => format!("\"{}\" <{}>", name, address.email),
        None => format!("<{}>", address.email),
    }
}

fn address_list(addresses: &[Address]) -> String {
    addresses
        .iter()
        .map(header_address)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Splits base64 output into 76-column lines as MIME requires.
/// Safe to slice bytewise, base64 output is ASCII.
fn wrap_mime_lines(encoded: &str, out: &mut String) {
    let mut rest = encoded;
    while !rest.is_empty() {
        let split = rest.len().min(76);
        out.push_str(&rest[..split]);
        out.push_str("\r\n");
        rest = &rest[split..];
    }
}

/// Multipart boundary unlikely to collide with message content.
fn boundary() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("=_{:x}_{:x}", std::process::id(), nanos)
}
