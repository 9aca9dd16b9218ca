//! Request-line parser.
//!
//! Only the first line of a request matters:
//!
//! ```text
//! GET /?a_minus=1&buzzer=on HTTP/1.1
//! ^^^ ^^^^^^^^^^^^^^^^^^^^^ ^^^^^^^^ ignored
//!     target = path [ "?" query ]
//! ```
//!
//! Parsing is tolerant: query segments without `=` are skipped and unknown
//! keys are kept (the dispatcher ignores them).  Nothing here allocates;
//! every slice borrows from the receive buffer.

use core::fmt;

use log::debug;

/// Upper bound on key/value pairs kept from one query string.
pub const MAX_QUERY_PAIRS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestError {
    /// Nothing before the first line break.
    Empty,
    /// The request line is not UTF-8.
    NotUtf8,
    /// A method with no target after it.
    MissingTarget,
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty request"),
            Self::NotUtf8 => write!(f, "request line is not UTF-8"),
            Self::MissingTarget => write!(f, "request line has no target"),
        }
    }
}

impl core::error::Error for RequestError {}

/// Parsed `key=value` pairs, in wire order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query<'a> {
    pairs: heapless::Vec<(&'a str, &'a str), MAX_QUERY_PAIRS>,
}

impl<'a> Query<'a> {
    /// Split `raw` on `&` and `=`.  Segments without `=` are dropped, as
    /// are pairs past [`MAX_QUERY_PAIRS`].
    pub fn parse(raw: &'a str) -> Self {
        let mut pairs = heapless::Vec::new();
        for segment in raw.split('&') {
            let Some((key, value)) = segment.split_once('=') else {
                if !segment.is_empty() {
                    debug!("Query: skipping malformed segment '{}'", segment);
                }
                continue;
            };
            if pairs.push((key, value)).is_err() {
                debug!("Query: more than {} pairs, rest ignored", MAX_QUERY_PAIRS);
                break;
            }
        }
        Self { pairs }
    }

    /// Value of `key`.  When a key repeats, the last occurrence wins.
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| *k == key)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// The parts of the request line the server acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine<'a> {
    pub method: &'a str,
    pub path: &'a str,
    /// `None` when the target has no `?` or nothing after it.
    pub query: Option<Query<'a>>,
}

/// Parse the first line of `buf`.
pub fn parse_request(buf: &[u8]) -> Result<RequestLine<'_>, RequestError> {
    let end = buf.iter().position(|&b| b == b'\n').unwrap_or(buf.len());
    let line = core::str::from_utf8(&buf[..end]).map_err(|_| RequestError::NotUtf8)?;
    let line = line.trim_end_matches('\r');

    let mut tokens = line.split_ascii_whitespace();
    let method = tokens.next().ok_or(RequestError::Empty)?;
    let target = tokens.next().ok_or(RequestError::MissingTarget)?;

    // The query runs from the first `?` up to the next one, if any.
    let (path, query) = match target.split_once('?') {
        Some((path, rest)) => {
            let raw = rest.split_once('?').map_or(rest, |(raw, _)| raw);
            (path, (!raw.is_empty()).then(|| Query::parse(raw)))
        }
        None => (target, None),
    };

    Ok(RequestLine {
        method,
        path,
        query,
    })
}
