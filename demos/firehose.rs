//! Two consumers tapping one stream: one prints raw wire lines, the other
//! blocks until a specific event shows up.
//!
//! Run with `cargo run --example firehose`.

use std::time::Duration;

use hydrant::{Event, EventKind, EventStream};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .init();

    let stream = EventStream::new("firehose-demo");
    let mut raw_tap = stream.attach();
    let mut waiter_tap = stream.attach();

    let watcher = tokio::spawn(async move {
        match waiter_tap
            .wait_for(EventKind::Info, "done", Duration::from_secs(2))
            .await
        {
            Ok(event) => println!("observed completion from node {}", event.node),
            Err(err) => println!("gave up: {err}"),
        }
    });

    let producer = {
        let stream = stream.clone();
        tokio::spawn(async move {
            stream.info("starting up");
            for i in 0..5 {
                stream.metric_with("tick", [serde_json::json!({ "n": i })]);
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            stream.warn("winding down");
            stream.info("done");
        })
    };

    while let Some(line) = raw_tap.next_line().await {
        println!("wire> {line}");
        if Event::from_line(&line).is_ok_and(|event| event.matches(EventKind::Info, "done")) {
            break;
        }
    }

    raw_tap.detach();
    while let Some(line) = raw_tap.next_line().await {
        println!("wire> {line} (drained after detach)");
    }
    println!("wire> <end of stream>");

    producer.await.expect("producer");
    watcher.await.expect("watcher");
}
