//! Request-logging middleware.

use std::time::Instant;

use crate::context::Context;
use crate::error::Error;
use crate::logger::Logger;
use crate::middleware::{BoxFuture, Middleware, Next};

/// Logs one INFO line per request: `[METHOD] path - status (Nms)`.
///
/// The line is emitted after the continuation returns, so the status is the
/// final one and the elapsed time covers the whole downstream chain. The
/// response must be set by then — an empty slot is a chain-ordering bug and
/// fails the request loudly.
pub struct RequestLog {
    logger: Logger,
}

impl RequestLog {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

impl Middleware for RequestLog {
    fn invoke<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a> {
        Box::pin(async move {
            let start = Instant::now();
            next.run(ctx).await?;
            let elapsed = start.elapsed();

            let response = ctx
                .response()
                .ok_or(Error::ResponseMissing("cannot log request"))?;
            self.logger.info(
                "server",
                format!(
                    "[{}] {} - {} ({}ms)",
                    ctx.method(),
                    ctx.pathname(),
                    response.status_code().as_u16(),
                    elapsed.as_millis(),
                ),
            );
            Ok(())
        })
    }
}
