use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use pe_resource_tree::{NodeId, NodeKind, PeParser, ResourcesView};
use tracing::span::{Attributes, Id};
use tracing::{Dispatch, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::Registry;

use crate::common::*;

/// Counts `load_resources` spans, one per tree build.
struct BuildCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for BuildCounter {
    fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
        if attrs.metadata().name() == "load_resources" {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[test]
fn concurrent_first_use_builds_once() {
    let data = sample_image();
    let parser = PeParser::new(&data).unwrap();
    let builds = Arc::new(AtomicUsize::new(0));
    let dispatch = Dispatch::new(Registry::default().with(BuildCounter(builds.clone())));

    let views: Vec<&ResourcesView<'_>> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                s.spawn(|| {
                    tracing::dispatcher::with_default(&dispatch, || parser.resources().unwrap())
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(builds.load(Ordering::SeqCst), 1);
    assert!(views.windows(2).all(|w| std::ptr::eq(w[0], w[1])));
    assert!(std::ptr::eq(views[0], parser.resources().unwrap()));
    assert_eq!(views[0].len(), 22);
}

#[test]
fn dispose_then_reuse_rebuilds() {
    let data = sample_image();
    let mut parser = PeParser::new(&data).unwrap();
    let builds = Arc::new(AtomicUsize::new(0));
    let dispatch = Dispatch::new(Registry::default().with(BuildCounter(builds.clone())));

    tracing::dispatcher::with_default(&dispatch, || {
        assert_eq!(parser.resources().unwrap().len(), 22);
        assert_eq!(parser.resources().unwrap().len(), 22);
        parser.dispose_resources();
        assert_eq!(parser.resources().unwrap().len(), 22);
    });
    assert_eq!(builds.load(Ordering::SeqCst), 2);
}

#[test]
fn concurrent_read_only_searches_agree() {
    let data = sample_image();
    let parser = PeParser::new(&data).unwrap();
    let view = parser.resources().unwrap();
    let tree = view.tree().unwrap();
    let root = tree.root().unwrap().id();

    let results: Vec<Vec<NodeId>> = thread::scope(|s| {
        let handles: Vec<_> = [
            NodeKind::Directory,
            NodeKind::DirectoryEntry,
            NodeKind::DataDescriptor,
            NodeKind::Directory,
        ]
        .into_iter()
        .map(|kind| {
            s.spawn(move || {
                tree.search(root, |n| n.kind() == kind)
                    .iter()
                    .map(|n| n.id())
                    .collect()
            })
        })
        .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results[0], results[3]);
    assert_eq!(results[2].len(), 4);
    assert_eq!(results[0].len() + results[1].len() + results[2].len() + 1, tree.len());
}
