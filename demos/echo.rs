//! Minimal allium deployment — a catch-all echo endpoint.
//!
//! Run with:
//!   LOG_LEVEL=20 cargo run --example echo
//!
//! Try:
//!   curl 'http://localhost:3000/x?a=1'
//!   curl -X POST http://localhost:3000/anything -d 'hello'
//!   LOG_LEVEL=99 cargo run --example echo   # fatal configuration error
//!
//! The single middleware reflects the received request back as JSON — an
//! example composition, not part of the core.

use allium::{BoxFuture, Config, Context, Next, Response, Server};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    // An invalid LOG_LEVEL is fatal before anything binds.
    let config = Config::from_env().unwrap_or_else(|e| {
        eprintln!("allium: {e}");
        std::process::exit(1);
    });

    let mut server = Server::new(config);
    server.register(echo);

    if let Err(e) = server.listen(3000, "0.0.0.0").await {
        eprintln!("allium: {e}");
        std::process::exit(1);
    }
}

// Reflects method, pathname, query, headers, and body back to the caller.
//
// Reading the body is destructive — fine here, nothing downstream wants it.
fn echo<'a>(ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a> {
    Box::pin(async move {
        let body = ctx.read_body().await?;

        let document = serde_json::json!({
            "headers": ctx.headers(),
            "query": ctx.query(),
            "body": String::from_utf8_lossy(&body),
            "method": ctx.method().as_str(),
            "pathname": ctx.pathname(),
        });

        let bytes = serde_json::to_vec(&document).expect("echo document serializes");
        ctx.set_response(Response::json(bytes));

        next.run(ctx).await
    })
}
