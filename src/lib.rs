//! # allium
//!
//! A minimal HTTP middleware core for Rust services. The onion model.
//! Nothing more. Nothing less.
//!
//! ## The contract
//!
//! Every request runs through an ordered chain of middleware. Each unit gets
//! the per-request [`Context`] and a [`Next`] continuation: code before
//! `next.run(ctx)` executes outside-in (registration order), code after it
//! executes inside-out — by which point the response slot is usually
//! populated. Not calling the continuation short-circuits the rest of the
//! chain. When the chain unwinds with an empty slot, the dispatcher answers
//! with the default 404.
//!
//! What the reverse proxy / transport already owns — allium intentionally
//! ignores:
//!
//! - **Path-pattern routing** — register a middleware that inspects
//!   [`Context::pathname`] if you need to branch
//! - **TLS termination** — nginx SSL / k8s ingress
//! - **Body-size limits** — `client_max_body_size` in nginx
//!
//! What's left for allium — the only part that changes between applications:
//!
//! - The dispatch engine — ordering, invocation, short-circuiting
//! - Built-in request logging and security headers
//! - A leveled, area-tagged log sink gated by `LOG_LEVEL`
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use allium::{BoxFuture, Config, Context, Next, Response, Server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::from_env().unwrap_or_else(|e| {
//!         eprintln!("allium: {e}");
//!         std::process::exit(1);
//!     });
//!
//!     let mut server = Server::new(config);
//!     server.register(hello);
//!
//!     if let Err(e) = server.listen(3000, "0.0.0.0").await {
//!         eprintln!("allium: {e}");
//!         std::process::exit(1);
//!     }
//! }
//!
//! fn hello<'a>(ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a> {
//!     Box::pin(async move {
//!         ctx.set_response(Response::json(br#"{"ok":true}"#.to_vec()));
//!         next.run(ctx).await
//!     })
//! }
//! ```

mod config;
mod context;
mod error;
mod logger;
mod method;
mod response;
mod server;

pub mod middleware;

pub use config::{Config, LOG_LEVEL_VAR};
pub use context::{Body, Context};
pub use error::{BoxError, Error};
pub use logger::{Level, Logger};
pub use method::Method;
pub use middleware::{BoxFuture, Chain, Middleware, Next};
pub use response::{ContentType, Response, ResponseBuilder};
pub use server::Server;
