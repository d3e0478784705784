//! Middleware chain and dispatch.
//!
//! Middleware intercepts requests and responses and is the right place for
//! cross-cutting concerns: request logging, security headers, authentication,
//! metrics. Each unit has a single capability — it is invoked with the
//! per-request [`Context`] and a [`Next`] continuation representing the rest
//! of the chain.
//!
//! # The onion model
//!
//! Dispatch runs middleware in registration order. Code a middleware runs
//! *before* calling the continuation executes outside-in (registration
//! order); code *after* the continuation executes inside-out (reverse
//! order), by which point inner middleware has usually populated the
//! response slot:
//!
//! ```text
//! chain.run(ctx)
//!   ├─ a: before ──┐                       outside-in
//!   │   ├─ b: before ──┐
//!   │   │   └─ c: sets response
//!   │   └─ b: after ←──┘
//!   └─ a: after ←──┘                       inside-out
//! ```
//!
//! A middleware that never calls its continuation short-circuits the chain:
//! everything registered after it simply does not run for that request.
//!
//! # How middlewares are stored
//!
//! The chain holds units of *different* types in one `Vec`, so they are
//! type-erased behind `dyn Middleware`. Implement the trait on a struct for
//! anything with state, or register a plain function:
//!
//! ```text
//! fn auth<'a>(ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a> { … }
//!        ↓ chain.register(auth)
//! Box<dyn Middleware>                 ← blanket impl over the fn
//! middleware.invoke(ctx, next)        ← one vtable dispatch per step
//! ```

mod log;
mod security;

pub use log::RequestLog;
pub use security::SecurityHeaders;

use std::future::Future;
use std::pin::Pin;

use crate::context::Context;
use crate::error::Error;
use crate::response::Response;

/// A heap-allocated, type-erased future that resolves when a middleware
/// completes (or fails).
///
/// `Pin<Box<…>>` because the runtime polls the future in place; `Send` so
/// tokio may move it across worker threads between polls. Boxing here is
/// also what lets dispatch recurse through the chain without an
/// infinitely-sized future type.
pub type BoxFuture<'a> = Pin<Box<dyn Future<Output = Result<(), Error>> + Send + 'a>>;

pub(crate) type BoxedMiddleware = Box<dyn Middleware>;

/// A unit of request processing.
///
/// A middleware may inspect or mutate the context before calling the
/// continuation, and act on the (by-then-populated) response slot after it
/// returns. Completing without calling [`Next::run`] short-circuits the rest
/// of the chain.
///
/// Implement this directly for stateful middleware, or rely on the blanket
/// impl and register a plain function:
///
/// ```rust
/// use allium::{BoxFuture, Context, Next, Response};
///
/// fn hello<'a>(ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a> {
///     Box::pin(async move {
///         ctx.set_response(Response::text("hello"));
///         next.run(ctx).await
///     })
/// }
/// ```
pub trait Middleware: Send + Sync + 'static {
    fn invoke<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a>;
}

/// Any plain function (or function-shaped value) with the middleware
/// signature is a middleware. Named `fn` items with a lifetime parameter
/// satisfy the higher-ranked bound directly.
impl<F> Middleware for F
where
    F: for<'a> Fn(&'a mut Context, Next<'a>) -> BoxFuture<'a> + Send + Sync + 'static,
{
    fn invoke<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a> {
        (self)(ctx, next)
    }
}

// ── Next ─────────────────────────────────────────────────────────────────────

/// The continuation: the rest of the chain, handed to each middleware.
///
/// There is exactly one logical continuation per request, and it moves
/// forward only — `Next` is a view of the not-yet-run tail of the chain.
pub struct Next<'a> {
    chain: &'a [BoxedMiddleware],
}

impl<'a> Next<'a> {
    pub(crate) fn new(chain: &'a [BoxedMiddleware]) -> Self {
        Self { chain }
    }

    /// Transfers control to the next middleware in the chain (a no-op
    /// terminal step when the chain is exhausted). Control returns here
    /// exactly once everything downstream has completed.
    ///
    /// `run` consumes the continuation, so calling it a second time — always
    /// a programming error — is rejected at compile time rather than guarded
    /// at runtime:
    ///
    /// ```compile_fail
    /// use allium::{BoxFuture, Context, Next};
    ///
    /// fn twice<'a>(ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a> {
    ///     Box::pin(async move {
    ///         next.run(ctx).await?;
    ///         next.run(ctx).await // error: use of moved value `next`
    ///     })
    /// }
    /// ```
    pub async fn run(self, ctx: &mut Context) -> Result<(), Error> {
        match self.chain.split_first() {
            Some((head, rest)) => head.invoke(ctx, Next::new(rest)).await,
            None => Ok(()),
        }
    }
}

// ── Chain ────────────────────────────────────────────────────────────────────

/// An ordered sequence of middleware.
///
/// Insertion order is execution order and it matters: a post-processing
/// middleware must be registered *before* whatever produces the response it
/// post-processes. The chain is append-only — there are no removal or
/// reordering operations.
#[derive(Default)]
pub struct Chain {
    middlewares: Vec<BoxedMiddleware>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware to the end of the chain.
    pub fn register(&mut self, middleware: impl Middleware) {
        self.middlewares.push(Box::new(middleware));
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Dispatches `ctx` through the chain, then resolves the response slot.
    ///
    /// Runs middleware 0..N onion-style, starting before position 0. After
    /// the full unwind, an empty response slot synthesizes the default 404 —
    /// the terminal fallback is the dispatcher's job, never a middleware's.
    /// A failure from any middleware propagates out unhandled; converting it
    /// into a user-visible response is the transport's responsibility.
    pub async fn run(&self, ctx: &mut Context) -> Result<Response, Error> {
        Next::new(&self.middlewares).run(ctx).await?;
        Ok(ctx.take_response().unwrap_or_else(Response::not_found))
    }
}
