//! SMTP reply values and the reply-line grammar.

use std::fmt::{self, Display, Formatter};

use nom::bytes::complete::take_while_m_n;
use nom::character::complete::anychar;
use nom::combinator::map_res;
use nom::IResult;

use crate::error::Error;

/// One parsed server reply, possibly assembled from several continuation
/// lines. The code comes from the final line; `lines` holds every line's
/// text in arrival order.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Reply {
    pub code: u16,
    pub lines: Vec<String>,
}

impl Reply {
    /// Tests code equality
    pub fn has_code(&self, code: u16) -> bool {
        self.code == code
    }

    /// Returns the text of the first line, if any
    pub fn first_line(&self) -> Option<&str> {
        self.lines.first().map(String::as_str)
    }
}

impl Display for Reply {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} {}", self.code, self.first_line().unwrap_or(""))
    }
}

/// One raw line of a reply: its code, whether it terminates the reply, and
/// the text after the separator.
#[derive(PartialEq, Eq, Clone, Debug)]
pub(crate) struct ReplyLine {
    pub code: u16,
    pub last: bool,
    pub text: String,
}

/// Grammar of a single reply line: three code digits, one separator
/// character ('-' marks a continuation line), then free text.
fn reply_line(i: &str) -> IResult<&str, ReplyLine> {
    let (i, code) = map_res(
        take_while_m_n(3, 3, |c: char| c.is_ascii_digit()),
        |s: &str| s.parse::<u16>(),
    )(i)?;
    let (text, separator) = anychar(i)?;

    Ok((
        "",
        ReplyLine {
            code,
            last: separator != '-',
            text: text
                .trim_end_matches(|c| c == '\r' || c == '\n')
                .to_string(),
        },
    ))
}

/// Parses one line as read off the wire, line ending included.
pub(crate) fn parse_reply_line(line: &str) -> Result<ReplyLine, Error> {
    match reply_line(line) {
        Ok((_, parsed)) => Ok(parsed),
        Err(_) => Err(Error::MalformedReply(
            line.trim_end_matches(|c| c == '\r' || c == '\n').to_string(),
        )),
    }
}
