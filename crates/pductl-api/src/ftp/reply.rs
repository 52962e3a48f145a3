// FTP reply parsing
//
// A reply is a three-digit code followed by either a space (single line)
// or a dash (first line of a multi-line reply terminated by `NNN text`).

use std::net::Ipv4Addr;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Reply {
    pub code: u16,
    pub text: String,
}

impl Reply {
    /// 1xx: the server started the action, another reply will follow.
    pub fn is_preliminary(&self) -> bool {
        (100..200).contains(&self.code)
    }

    /// 2xx: the action completed.
    pub fn is_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }

    /// 3xx: the server needs more information (e.g. PASS after USER).
    pub fn is_intermediate(&self) -> bool {
        (300..400).contains(&self.code)
    }

    pub fn into_error(self, command: &str) -> Error {
        Error::UnexpectedReply {
            command: command.to_owned(),
            code: self.code,
            message: self.text,
        }
    }
}

/// Read one complete (possibly multi-line) reply.
pub(crate) async fn read_reply<R>(reader: &mut R) -> Result<Reply, Error>
where
    R: AsyncBufRead + Unpin,
{
    let first = read_line(reader).await?;
    let (code, multiline, text) = split_status(&first)?;
    if !multiline {
        return Ok(Reply {
            code,
            text: text.to_owned(),
        });
    }

    let mut lines = vec![text.to_owned()];
    loop {
        let line = read_line(reader).await?;
        let last = split_status(&line)
            .ok()
            .filter(|(c, more, _)| *c == code && !more)
            .map(|(_, _, t)| t.to_owned());
        if let Some(last) = last {
            lines.push(last);
            break;
        }
        lines.push(line);
    }

    Ok(Reply {
        code,
        text: lines.join("\n"),
    })
}

async fn read_line<R>(reader: &mut R) -> Result<String, Error>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = String::new();
    let n = reader.read_line(&mut buf).await?;
    if n == 0 {
        return Err(Error::ConnectionClosed);
    }
    Ok(buf.trim_end_matches(['\r', '\n']).to_owned())
}

/// Split `NNN-text` / `NNN text` into (code, is_multiline, text).
fn split_status(line: &str) -> Result<(u16, bool, &str), Error> {
    let code = line
        .get(..3)
        .filter(|c| c.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|c| c.parse::<u16>().ok())
        .ok_or_else(|| Error::MalformedReply(line.to_owned()))?;

    let rest = line.get(3..).unwrap_or("");
    let multiline = rest.starts_with('-');
    let text = rest.get(1..).unwrap_or("");
    Ok((code, multiline, text))
}

/// Extract the address and port from a `227 Entering Passive Mode
/// (h1,h2,h3,h4,p1,p2)` reply. Parentheses are optional.
pub(crate) fn parse_pasv(text: &str) -> Result<(Ipv4Addr, u16), Error> {
    let malformed = || Error::MalformedReply(format!("227 {text}"));

    let start = text.find(|c: char| c.is_ascii_digit()).ok_or_else(malformed)?;
    let numbers: Vec<u8> = text[start..]
        .split(|c: char| !c.is_ascii_digit() && c != ',')
        .next()
        .unwrap_or("")
        .split(',')
        .map(str::parse::<u8>)
        .collect::<Result<_, _>>()
        .map_err(|_| malformed())?;

    match numbers.as_slice() {
        [a, b, c, d, hi, lo] => Ok((
            Ipv4Addr::new(*a, *b, *c, *d),
            (u16::from(*hi) << 8) | u16::from(*lo),
        )),
        _ => Err(malformed()),
    }
}
