//! Response building and serialization.
//!
//! Every response closes the connection, so bodies are always framed by
//! `Content-Length`.

use std::fs::File;
use std::io::{self, Write};

use super::listing::push_escaped;

/// Value of the `Server` header.
const SERVER_NAME: &str = concat!("writerdeck-export/", env!("CARGO_PKG_VERSION"));

/// Response payload.
#[derive(Debug)]
pub enum Body {
    Empty,
    Bytes(Vec<u8>),
    /// An open file and the length advertised for it.
    File(File, u64),
}

impl Body {
    fn len(&self) -> u64 {
        match self {
            Body::Empty => 0,
            Body::Bytes(b) => b.len() as u64,
            Body::File(_, len) => *len,
        }
    }
}

#[derive(Debug)]
pub struct Response {
    pub status: u16,
    headers: Vec<(String, String)>,
    body: Body,
}

impl Response {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Body::Empty,
        }
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    /// An HTML page with the given status.
    pub fn html(status: u16, page: String) -> Self {
        Self::new(status)
            .header("Content-Type", "text/html; charset=utf-8")
            .body(Body::Bytes(page.into_bytes()))
    }

    /// A small HTML error page.
    pub fn error(status: u16, message: &str) -> Self {
        let mut escaped = String::new();
        push_escaped(&mut escaped, message);
        let page = format!(
            "<!DOCTYPE HTML>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
             <title>Error response</title>\n</head>\n<body>\n<h1>Error response</h1>\n\
             <p>Error code: {status}</p>\n<p>Message: {escaped}.</p>\n</body>\n</html>\n"
        );
        Self::html(status, page)
    }

    /// First value of header `name`, case-insensitively.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Serialize onto `out`. `head_only` omits the body (HEAD requests) but
    /// keeps the advertised length.
    pub fn write_to<W: Write>(self, out: &mut W, head_only: bool) -> io::Result<()> {
        let mut head = format!("HTTP/1.1 {} {}\r\n", self.status, reason_phrase(self.status));
        head.push_str(&format!("Server: {SERVER_NAME}\r\n"));
        for (name, value) in &self.headers {
            head.push_str(&format!("{name}: {value}\r\n"));
        }
        if self.header_value("Content-Length").is_none() {
            head.push_str(&format!("Content-Length: {}\r\n", self.body.len()));
        }
        head.push_str("Connection: close\r\n\r\n");
        out.write_all(head.as_bytes())?;

        if !head_only {
            match self.body {
                Body::Empty => {},
                Body::Bytes(bytes) => out.write_all(&bytes)?,
                Body::File(file, len) => {
                    io::copy(&mut io::Read::take(file, len), out)?;
                },
            }
        }
        out.flush()
    }
}

/// Standard reason phrase for the statuses this server emits.
pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        301 => "Moved Permanently",
        400 => "Bad Request",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        _ => "Unknown",
    }
}
