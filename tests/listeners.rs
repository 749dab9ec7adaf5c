use hydrant::{ListenerSet, Sink};
use tokio::sync::mpsc;
use uuid::Uuid;

fn sink() -> Sink {
    let (tx, _rx) = mpsc::channel(1);
    Sink::new(tx)
}

#[test]
fn snapshots_are_immutable() {
    let set = ListenerSet::new();
    set.add(sink());

    let before = set.snapshot();
    set.add(sink());

    // The earlier snapshot is untouched by the mutation.
    assert_eq!(before.len(), 1);
    assert_eq!(set.snapshot().len(), 2);
}

#[test]
fn remove_swaps_in_a_smaller_snapshot() {
    let set = ListenerSet::new();
    let keep = sink();
    let gone = sink();
    let keep_id = keep.id();
    let gone_id = gone.id();
    set.add(keep);
    set.add(gone);

    let during = set.snapshot();
    assert!(set.remove(gone_id));

    assert_eq!(during.len(), 2);
    let after = set.snapshot();
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].id(), keep_id);
}

#[test]
fn remove_of_absent_sink_is_a_noop() {
    let set = ListenerSet::new();
    set.add(sink());

    assert!(!set.remove(Uuid::new_v4()));
    assert_eq!(set.len(), 1);
}

#[test]
fn empties_and_refills() {
    let set = ListenerSet::new();
    assert!(set.is_empty());

    let s = sink();
    let id = s.id();
    set.add(s);
    assert!(!set.is_empty());

    assert!(set.remove(id));
    assert!(set.is_empty());
    assert!(!set.remove(id));

    set.add(sink());
    assert_eq!(set.len(), 1);
}

#[test]
fn sink_ids_are_unique() {
    let a = sink();
    let b = sink();
    assert_ne!(a.id(), b.id());
}
