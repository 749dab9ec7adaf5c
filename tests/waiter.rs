use std::time::{Duration, Instant};

use hydrant::{EventKind, EventStream};

#[tokio::test]
async fn returns_an_event_already_in_flight() {
    let stream = EventStream::new("svc");
    let mut tap = stream.attach();

    stream.info("warming up");
    stream.metric("cache size");
    stream.info("ready");

    let started = Instant::now();
    let event = tap
        .wait_for(EventKind::Info, "ready", Duration::from_secs(2))
        .await
        .expect("matching event in flight");

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(event.kind, EventKind::Info);
    assert_eq!(event.body.message, "ready");
    assert_eq!(event.source, "svc");
}

#[tokio::test]
async fn returns_an_event_emitted_mid_wait() {
    let stream = EventStream::new("svc");
    let mut tap = stream.attach();

    let producer = {
        let stream = stream.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            stream.error("late arrival");
        })
    };

    let event = tap
        .wait_for(EventKind::Error, "late arrival", Duration::from_secs(2))
        .await
        .expect("event arrives during the wait");
    assert_eq!(event.kind, EventKind::Error);
    producer.await.unwrap();
}

#[tokio::test]
async fn times_out_no_earlier_than_requested() {
    let stream = EventStream::new("svc");
    let mut tap = stream.attach();
    stream.info("something else entirely");

    let wait = Duration::from_millis(300);
    let started = Instant::now();
    let err = tap
        .wait_for(EventKind::Info, "never emitted", wait)
        .await
        .unwrap_err();
    let elapsed = started.elapsed();

    assert!(elapsed >= wait, "timed out early: {elapsed:?}");
    assert!(
        elapsed < wait + Duration::from_millis(300),
        "timeout slack too large: {elapsed:?}"
    );
    assert_eq!(err.kind, EventKind::Info);
    assert_eq!(err.message, "never emitted");
    assert_eq!(err.timeout, wait);
}

#[tokio::test]
async fn kind_must_match_not_just_the_message() {
    let stream = EventStream::new("svc");
    let mut tap = stream.attach();

    stream.warn("checkpoint");
    stream.info("checkpoint");

    let event = tap
        .wait_for(EventKind::Info, "checkpoint", Duration::from_secs(1))
        .await
        .expect("the Info record matches");
    assert_eq!(event.kind, EventKind::Info);
}

#[tokio::test]
async fn consecutive_waits_resume_from_the_reader_position() {
    let stream = EventStream::new("svc");
    let mut tap = stream.attach();

    stream.info("alpha");
    stream.info("beta");

    let event = tap
        .wait_for(EventKind::Info, "beta", Duration::from_secs(1))
        .await
        .expect("second record matches");
    assert_eq!(event.body.message, "beta");

    // "alpha" was consumed on the way to "beta"; there is no rewind.
    let err = tap
        .wait_for(EventKind::Info, "alpha", Duration::from_millis(200))
        .await
        .unwrap_err();
    assert_eq!(err.message, "alpha");
}

#[tokio::test]
async fn wait_then_read_continues_the_same_stream() {
    let stream = EventStream::new("svc");
    let mut tap = stream.attach();

    stream.info("first");
    stream.info("second");
    stream.info("third");

    tap.wait_for(EventKind::Info, "first", Duration::from_secs(1))
        .await
        .expect("first record");

    // Plain reads pick up exactly where the wait scan stopped.
    let line = tap.next_line().await.expect("line");
    assert!(line.contains("second"));
}

#[tokio::test]
async fn timeout_error_is_displayable() {
    let stream = EventStream::new("svc");
    let mut tap = stream.attach();

    let err = tap
        .wait_for(EventKind::Metric, "qps", Duration::from_millis(50))
        .await
        .unwrap_err();
    let rendered = err.to_string();
    assert!(rendered.contains("Metric"));
    assert!(rendered.contains("qps"));
}
