//! Transparency encoding for the DATA phase.

/// Line terminating the DATA payload.
pub(crate) const TERMINATOR: &[u8] = b".\r\n";

/// Prepares a payload for the DATA phase: normalizes bare LF line endings to
/// CRLF, doubles the leading dot of any line starting with `'.'`, and
/// guarantees the output ends with CRLF so the terminator sits on its own
/// line.
pub(crate) fn encode(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 2);
    let mut lines = payload.split(|b| *b == b'\n').peekable();

    while let Some(line) = lines.next() {
        // a trailing newline in the input produces one empty tail segment
        if lines.peek().is_none() && line.is_empty() {
            break;
        }
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.first() == Some(&b'.') {
            out.push(b'.');
        }
        out.extend_from_slice(line);
        out.extend_from_slice(b"\r\n");
    }

    out
}
