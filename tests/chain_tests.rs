//! Dispatch-engine contract: onion ordering, short-circuiting, the 404
//! fallback, and last-write-wins on the response slot.

mod common;

use std::sync::{Arc, Mutex};

use allium::{BoxFuture, Chain, Context, Middleware, Next, Response};
use http::StatusCode;

/// Records entry/exit into a shared ordered log; optionally refuses to call
/// its continuation.
struct Recorder {
    tag: &'static str,
    order: Arc<Mutex<Vec<String>>>,
    proceed: bool,
}

impl Middleware for Recorder {
    fn invoke<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a> {
        Box::pin(async move {
            self.order.lock().unwrap().push(format!("{}-in", self.tag));
            if self.proceed {
                next.run(ctx).await?;
            }
            self.order.lock().unwrap().push(format!("{}-out", self.tag));
            Ok(())
        })
    }
}

/// Sets a status-only response; optionally short-circuits.
struct Responder {
    status: StatusCode,
    proceed: bool,
}

impl Middleware for Responder {
    fn invoke<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a> {
        Box::pin(async move {
            ctx.set_response(Response::status(self.status));
            if self.proceed {
                next.run(ctx).await?;
            }
            Ok(())
        })
    }
}

fn ctx() -> Context {
    Context::new(common::request("GET", "/", ""), common::silent_logger())
}

#[tokio::test]
async fn visits_every_middleware_once_in_onion_order() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let mut chain = Chain::new();
    for tag in ["a", "b", "c"] {
        chain.register(Recorder {
            tag,
            order: Arc::clone(&order),
            proceed: true,
        });
    }

    let mut ctx = ctx();
    chain.run(&mut ctx).await.unwrap();

    assert_eq!(
        *order.lock().unwrap(),
        ["a-in", "b-in", "c-in", "c-out", "b-out", "a-out"]
    );
}

#[tokio::test]
async fn short_circuit_skips_everything_downstream() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let mut chain = Chain::new();
    chain.register(Recorder {
        tag: "a",
        order: Arc::clone(&order),
        proceed: true,
    });
    chain.register(Recorder {
        tag: "b",
        order: Arc::clone(&order),
        proceed: false,
    });
    chain.register(Recorder {
        tag: "c",
        order: Arc::clone(&order),
        proceed: true,
    });

    let mut ctx = ctx();
    let response = chain.run(&mut ctx).await.unwrap();

    assert_eq!(*order.lock().unwrap(), ["a-in", "b-in", "b-out", "a-out"]);
    // Nothing set a response, so the short-circuit falls through to the 404.
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn short_circuit_keeps_response_set_before_the_cut() {
    let mut chain = Chain::new();
    chain.register(Responder {
        status: StatusCode::NO_CONTENT,
        proceed: false,
    });
    chain.register(Responder {
        status: StatusCode::IM_A_TEAPOT,
        proceed: true,
    });

    let mut ctx = ctx();
    let response = chain.run(&mut ctx).await.unwrap();

    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn empty_chain_yields_default_404() {
    let chain = Chain::new();
    assert!(chain.is_empty());

    let mut ctx = ctx();
    let response = chain.run(&mut ctx).await.unwrap();

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.body().as_ref(), b"Not found");
    // No headers beyond what the transport adds on its own.
    assert!(response.headers().is_empty());
}

#[tokio::test]
async fn response_slot_is_last_write_wins() {
    let mut chain = Chain::new();
    chain.register(Responder {
        status: StatusCode::OK,
        proceed: true,
    });
    chain.register(Responder {
        status: StatusCode::ACCEPTED,
        proceed: true,
    });

    let mut ctx = ctx();
    let response = chain.run(&mut ctx).await.unwrap();

    // The inner (later-registered) middleware wrote last on the way in.
    assert_eq!(response.status_code(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn registration_appends_in_order() {
    let mut chain = Chain::new();
    assert_eq!(chain.len(), 0);
    chain.register(Responder {
        status: StatusCode::OK,
        proceed: true,
    });
    chain.register(Responder {
        status: StatusCode::ACCEPTED,
        proceed: true,
    });
    assert_eq!(chain.len(), 2);
}
