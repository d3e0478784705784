//! Per-request context.
//!
//! One [`Context`] exists per in-flight request and is exclusively owned by
//! that request's dispatch — it is never shared, so nothing here locks. It
//! presents a read-only, normalized view of the inbound request and the
//! single mutable slot the eventual [`Response`] lands in.

use std::collections::HashMap;

use bytes::Bytes;
use http::header;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::BodyExt;
use url::form_urlencoded;

use crate::error::{BoxError, Error};
use crate::logger::Logger;
use crate::method::Method;
use crate::response::Response;

/// The request body stream threaded through the chain.
///
/// Boxed so the transport's `hyper::body::Incoming` and the `Full<Bytes>`
/// bodies tests build are the same type to middleware.
pub type Body = UnsyncBoxBody<Bytes, BoxError>;

/// The per-request bundle threaded through the middleware chain.
pub struct Context {
    method: Method,
    uri: http::Uri,
    headers: http::HeaderMap,
    body: Option<Body>,
    response: Option<Response>,
    logger: Logger,
}

impl Context {
    /// Wraps a parsed request. The logger is where this context reports
    /// locally-absorbed failures (form parsing).
    pub fn new(request: http::Request<Body>, logger: Logger) -> Self {
        let (parts, body) = request.into_parts();
        Self {
            method: Method::from(&parts.method),
            uri: parts.uri,
            headers: parts.headers,
            body: Some(body),
            response: None,
            logger,
        }
    }

    /// The HTTP method of the request.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The path of the request URL.
    pub fn pathname(&self) -> &str {
        self.uri.path()
    }

    /// The query parameters of the request URL.
    ///
    /// A fresh snapshot on every call — mutating the returned map has no
    /// effect on the context. Duplicate keys resolve last-value-wins.
    pub fn query(&self) -> HashMap<String, String> {
        match self.uri.query() {
            Some(query) => form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
            None => HashMap::new(),
        }
    }

    /// The headers of the request, keys lowercased.
    ///
    /// A fresh snapshot on every call. Values that are not valid UTF-8 are
    /// omitted.
    pub fn headers(&self) -> HashMap<String, String> {
        self.headers
            .iter()
            .filter_map(|(name, value)| {
                let value = value.to_str().ok()?;
                Some((name.as_str().to_owned(), value.to_owned()))
            })
            .collect()
    }

    /// Takes the body stream out of the context.
    ///
    /// Reading is destructive: the first caller gets the stream, every later
    /// call returns `None`. No buffering or replay happens at this layer.
    pub fn take_body(&mut self) -> Option<Body> {
        self.body.take()
    }

    /// Drains the body stream to completion.
    ///
    /// Returns empty bytes when there is no body left to read. A transport
    /// failure mid-stream surfaces as [`Error::Handler`].
    pub async fn read_body(&mut self) -> Result<Bytes, Error> {
        match self.body.take() {
            Some(body) => {
                let collected = body.collect().await.map_err(Error::Handler)?;
                Ok(collected.to_bytes())
            }
            None => Ok(Bytes::new()),
        }
    }

    /// The parameters of a form-encoded body.
    ///
    /// Failure is absorbed here: a missing or wrong `content-type`, or a
    /// body-read failure, produces an empty map and one error line on the
    /// log sink. An absent (or already-consumed) body is an empty map with
    /// no complaint.
    pub async fn form_params(&mut self) -> HashMap<String, String> {
        if self.body.is_none() {
            return HashMap::new();
        }

        let content_type = self
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        if !content_type.starts_with("application/x-www-form-urlencoded") {
            self.logger.error(
                "server.context",
                format!("error parsing form data: unsupported content type {content_type:?}"),
            );
            return HashMap::new();
        }

        let body = match self.read_body().await {
            Ok(body) => body,
            Err(e) => {
                self.logger
                    .error("server.context", format!("error parsing form data: {e}"));
                return HashMap::new();
            }
        };

        form_urlencoded::parse(&body).into_owned().collect()
    }

    /// Places `response` in the response slot, silently overwriting any
    /// earlier write. Middleware ordering is what makes the last writer the
    /// right one.
    pub fn set_response(&mut self, response: Response) {
        self.response = Some(response);
    }

    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    pub fn response_mut(&mut self) -> Option<&mut Response> {
        self.response.as_mut()
    }

    /// Takes the response out of the slot. Used by the dispatcher once the
    /// chain has fully unwound.
    pub fn take_response(&mut self) -> Option<Response> {
        self.response.take()
    }
}
