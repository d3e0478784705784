//! Shared test helpers: a capturing log sink and request builders.

#![allow(dead_code)]

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use allium::{Body, Level, Logger};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};

/// An in-memory log sink that can be inspected after the fact.
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A logger that emits nothing, for tests that don't care about log output.
pub fn silent_logger() -> Logger {
    Logger::with_sink(None, io::sink())
}

/// A logger gated at `threshold` whose output lands in the returned capture.
pub fn capture_logger(threshold: Level) -> (Logger, Capture) {
    let capture = Capture::default();
    let logger = Logger::with_sink(Some(threshold), capture.clone());
    (logger, capture)
}

/// A finite body, same type as what the transport hands the core.
pub fn body(data: impl Into<Bytes>) -> Body {
    Full::new(data.into()).map_err(|e| match e {}).boxed_unsync()
}

/// A parsed request, ready for `Context::new` / `Server::handle`.
pub fn request(method: &str, uri: &str, data: &str) -> http::Request<Body> {
    http::Request::builder()
        .method(method)
        .uri(uri)
        .body(body(data.to_owned()))
        .expect("request builds")
}

/// Same as [`request`], with an extra header.
pub fn request_with_header(
    method: &str,
    uri: &str,
    name: &str,
    value: &str,
    data: &str,
) -> http::Request<Body> {
    http::Request::builder()
        .method(method)
        .uri(uri)
        .header(name, value)
        .body(body(data.to_owned()))
        .expect("request builds")
}
