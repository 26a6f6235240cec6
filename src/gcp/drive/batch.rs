// Specs: https://developers.google.com/drive/api/guides/performance#batch-requests
// POST https://www.googleapis.com/batch/drive/v3 HTTP/1.1
// Authorization: Bearer <Token>
// Content-Type: multipart/mixed; boundary=batch_<uuid>
//
// --batch_<uuid>
// Content-Type: application/http
// Content-Transfer-Encoding: binary
// Content-ID: <item-0>
//
// DELETE /drive/v3/files/<id> HTTP/1.1
//
// --batch_<uuid>--
//
// Every reply part echoes the request Content-ID prefixed with `response-` and wraps a full
// http response: status line, headers, blank line, body.
use bytes::BufMut;

use super::{DriveResult, Error};

const CRLF: &[u8] = b"\r\n";
const PART_HEADERS: &[u8] =
    b"Content-Type: application/http\r\nContent-Transfer-Encoding: binary\r\n";
const RESPONSE_ID_PREFIX: &str = "response-";

pub(super) fn new_boundary() -> String {
    format!("batch_{}", uuid::Uuid::new_v4().simple())
}

pub(super) fn content_id(index: usize) -> String {
    format!("item-{}", index)
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub(super) struct BatchPart {
    pub content_id: String,
    pub method: &'static str,
    pub path: String,
}

impl BatchPart {
    pub fn delete(content_id: String, path: String) -> Self {
        Self {
            content_id,
            method: "DELETE",
            path,
        }
    }
}

pub(super) fn encode(boundary: &str, parts: &[BatchPart]) -> bytes::Bytes {
    let mut body = bytes::BytesMut::new();
    for part in parts {
        body.put_slice(b"--");
        body.put_slice(boundary.as_bytes());
        body.put_slice(CRLF);
        body.put_slice(PART_HEADERS);
        body.put_slice(format!("Content-ID: <{}>", part.content_id).as_bytes());
        body.put_slice(CRLF);
        body.put_slice(CRLF);
        body.put_slice(format!("{} {} HTTP/1.1", part.method, part.path).as_bytes());
        body.put_slice(CRLF);
        body.put_slice(CRLF);
    }
    body.put_slice(b"--");
    body.put_slice(boundary.as_bytes());
    body.put_slice(b"--");
    body.put_slice(CRLF);
    body.freeze()
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub(super) struct BatchResponsePart {
    /// Request Content-ID this part answers, without the `response-` prefix.
    pub content_id: Option<String>,
    pub status: u16,
    pub body: String,
}

impl BatchResponsePart {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Extracts the boundary parameter of a `multipart/mixed` content type.
pub(super) fn boundary(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.trim().split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| value.trim().trim_matches('"').to_owned())
        .filter(|value| !value.is_empty())
}

/// Splits at the first blank line, accepting both CRLF and bare LF line endings.
fn split_head(s: &str) -> (&str, &str) {
    let crlf = s.find("\r\n\r\n").map(|i| (i, 4));
    let lf = s.find("\n\n").map(|i| (i, 2));
    let first = match (crlf, lf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    };
    match first {
        Some((i, len)) => (&s[..i], &s[i + len..]),
        None => (s, ""),
    }
}

fn header_value<'a>(head: &'a str, name: &str) -> Option<&'a str> {
    head.lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(n, _)| n.trim().eq_ignore_ascii_case(name))
        .map(|(_, v)| v.trim())
}

fn response_content_id(raw: &str) -> String {
    let id = raw.trim_start_matches('<').trim_end_matches('>');
    id.strip_prefix(RESPONSE_ID_PREFIX).unwrap_or(id).to_owned()
}

fn decode_part(part: &str) -> DriveResult<BatchResponsePart> {
    let (outer_head, http) = split_head(part);
    let content_id = header_value(outer_head, "Content-ID").map(response_content_id);

    let (inner_head, body) = split_head(http);
    let status_line = inner_head.lines().next().unwrap_or_default();
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| {
            Error::InvalidBatchResponse(format!("invalid status line {:?}", status_line))
        })?;

    Ok(BatchResponsePart {
        content_id,
        status,
        body: body.trim_end().to_owned(),
    })
}

pub(super) fn decode(boundary: &str, body: &[u8]) -> DriveResult<Vec<BatchResponsePart>> {
    let body = String::from_utf8_lossy(body);
    let delimiter = format!("--{}", boundary);

    let mut segments = body.split(delimiter.as_str());
    // preamble
    segments.next();

    let mut parts = Vec::new();
    for segment in segments {
        if segment.starts_with("--") {
            return Ok(parts);
        }
        let segment = segment.trim_start_matches(|c| c == '\r' || c == '\n');
        if segment.trim().is_empty() {
            continue;
        }
        parts.push(decode_part(segment)?);
    }

    Err(Error::InvalidBatchResponse(format!(
        "missing closing delimiter {}--",
        delimiter
    )))
}
