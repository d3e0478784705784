//! HTTP server: chain ownership, transport binding, graceful shutdown.
//!
//! The server owns the middleware chain and the logger, and provides the
//! binding between the transport (hyper over tokio) and chain dispatch. The
//! dispatch core installs no catch-all: a failure that escapes the chain is
//! converted to a 500 here, at the transport glue, not inside the chain.
//!
//! # Graceful shutdown
//!
//! On **SIGTERM** (what Kubernetes and `kill` send) or **Ctrl-C** the server
//! immediately stops accepting new connections, lets every in-flight
//! connection task run to completion, then returns from
//! [`Server::listen`] so `main` can exit cleanly.

use std::convert::Infallible;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::{Config, LOG_LEVEL_VAR};
use crate::context::{Body, Context};
use crate::error::{BoxError, Error};
use crate::logger::Logger;
use crate::middleware::{Chain, Middleware, RequestLog, SecurityHeaders};
use crate::response::Response;

/// The HTTP server.
///
/// Construction binds the built-in middleware: request logging first (unless
/// disabled in the [`Config`]), then security headers. User middleware
/// registered afterwards runs inside both — after the built-ins on the way
/// in, before them on the way out.
pub struct Server {
    chain: Chain,
    logger: Logger,
    config: Config,
}

impl Server {
    /// A server logging to stdout at the configured threshold.
    pub fn new(config: Config) -> Self {
        let logger = Logger::new(Some(config.log_level));
        Self::with_logger(config, logger)
    }

    /// A server writing to the given logger. This is the seam tests and
    /// embedders use to capture or redirect the core's log lines.
    pub fn with_logger(config: Config, logger: Logger) -> Self {
        let mut chain = Chain::new();
        if config.log_requests {
            chain.register(RequestLog::new(logger.clone()));
        }
        chain.register(SecurityHeaders);
        Self {
            chain,
            logger,
            config,
        }
    }

    /// Appends a middleware to the end of the chain.
    pub fn register(&mut self, middleware: impl Middleware) {
        self.chain.register(middleware);
    }

    /// The per-request entry point: wraps the request in a fresh [`Context`],
    /// dispatches it through the chain, and resolves the response (or the
    /// 404 fallback).
    ///
    /// Public so a deployment — or a test — can drive the core without a
    /// socket. An `Err` here is an uncaught middleware failure; the caller
    /// owns turning it into a user-visible 500.
    pub async fn handle(&self, request: http::Request<Body>) -> Result<Response, Error> {
        let mut ctx = Context::new(request, self.logger.clone());
        self.chain.run(&mut ctx).await
    }

    /// Binds `hostname:port` and serves until shutdown.
    ///
    /// Bind failure is logged and returned — it is fatal, never retried; the
    /// caller decides how to terminate. Configuration was already validated
    /// when the [`Config`] was built, before anything could bind.
    pub async fn listen(self, port: u16, hostname: &str) -> Result<(), Error> {
        let listener = match TcpListener::bind(format!("{hostname}:{port}")).await {
            Ok(listener) => listener,
            Err(e) => {
                self.logger
                    .error("server", format!("error starting server: {e}"));
                return Err(Error::Io(e));
            }
        };

        if self.config.log_level_defaulted {
            self.logger.info(
                "server",
                format!("{LOG_LEVEL_VAR} not set, defaulting to INFO"),
            );
        } else {
            self.logger.info(
                "server",
                format!("{LOG_LEVEL_VAR} set to {}", self.config.log_level),
            );
        }
        self.logger.info(
            "server",
            format!("listening on {hostname}:{port}, available on http://localhost:{port}/"),
        );

        // Shared across concurrent connection tasks without copying the chain.
        let server = Arc::new(self);

        // JoinSet tracks every spawned connection task so we can wait for
        // them all to finish during graceful shutdown.
        let mut tasks = tokio::task::JoinSet::new();

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // `biased` checks arms top-to-bottom: a shutdown signal must
                // stop the accept loop even if more connections are queued.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let server = Arc::clone(&server);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // `service_fn` is called once per request on the
                        // connection, not once per connection.
                        let svc = service_fn(move |req| {
                            let server = Arc::clone(&server);
                            async move { dispatch(server, req).await }
                        });

                        // `auto` negotiates HTTP/1.1 or HTTP/2 per client.
                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet does not grow
                // without bound on long-running servers.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        // Drain: wait for every in-flight connection before returning.
        while tasks.join_next().await.is_some() {}

        info!("server stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Transport glue: one raw request in, one response out.
///
/// The error type is [`Infallible`] — an uncaught failure from the chain is
/// converted to a bare 500 here, so hyper never sees an error. This is the
/// transport-boundary responsibility the dispatch core deliberately does not
/// take on.
async fn dispatch(
    server: Arc<Server>,
    req: hyper::Request<hyper::body::Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let req = req.map(|body| body.map_err(|e| Box::new(e) as BoxError).boxed_unsync());

    let response = match server.handle(req).await {
        Ok(response) => response,
        Err(e) => {
            error!("unhandled error in middleware chain: {e}");
            Response::status(StatusCode::INTERNAL_SERVER_ERROR)
        }
    };

    Ok(response.into_http())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives: SIGTERM or
/// Ctrl-C on Unix, Ctrl-C only elsewhere.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    // `pending()` never resolves — the SIGTERM arm is effectively disabled
    // on non-Unix platforms.
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = sigterm => {}
    }
}
