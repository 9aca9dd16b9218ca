//! Response writer.
//!
//! Every response is a `200 OK` with a content type, `Connection: close`
//! and a body.  There are no error statuses: a request the server cannot
//! handle is dropped instead.

use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Text,
    Html,
}

impl ContentType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text/plain",
            Self::Html => "text/html",
        }
    }
}

/// Body of a `status_check` reply.
pub const STATUS_OK: &str = "OK";

/// Write the header block followed by `body`.
pub fn write_response<W: Write>(out: &mut W, content_type: ContentType, body: &str) -> io::Result<()> {
    write!(
        out,
        "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nConnection: close\r\n\r\n",
        content_type.as_str()
    )?;
    out.write_all(body.as_bytes())?;
    out.flush()
}
