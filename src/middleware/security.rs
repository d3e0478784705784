//! Security-headers middleware.

use http::header::{HeaderName, HeaderValue};

use crate::context::Context;
use crate::error::Error;
use crate::middleware::{BoxFuture, Middleware, Next};

/// Sets three fixed security headers on every response, unconditionally,
/// after the continuation returns:
///
/// - `X-Content-Type-Options: nosniff` — content-type sniffing block
/// - `X-Frame-Options: DENY` — frame-embedding deny
/// - `X-XSS-Protection: 1; mode=block` — legacy XSS protection
///
/// Existing values for these headers are overwritten. The response must be
/// set by the time the continuation returns — an empty slot is a
/// chain-ordering bug and fails the request loudly.
pub struct SecurityHeaders;

impl Middleware for SecurityHeaders {
    fn invoke<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a> {
        Box::pin(async move {
            next.run(ctx).await?;

            let response = ctx
                .response_mut()
                .ok_or(Error::ResponseMissing("cannot set security headers"))?;
            response.set_header(
                HeaderName::from_static("x-content-type-options"),
                HeaderValue::from_static("nosniff"),
            );
            response.set_header(
                HeaderName::from_static("x-frame-options"),
                HeaderValue::from_static("DENY"),
            );
            response.set_header(
                HeaderName::from_static("x-xss-protection"),
                HeaderValue::from_static("1; mode=block"),
            );
            Ok(())
        })
    }
}
