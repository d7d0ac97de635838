//! Model-based property: delivered editions never go backwards, except for a
//! late known-good confirmation once the first round has completed, and a run
//! of flushes with no discovery in between notifies at most once. Flushes see a
//! context whose latest known slot varies from call to call.

use std::sync::Arc;

use parking_lot::Mutex;
use proptest::prelude::*;
use sparse_proxy_core::*;

#[derive(Clone, Debug)]
enum Op {
    Discover { edition: u64, known_good: bool },
    Flush { slot: Option<u64> },
    RoundComplete { slot: Option<u64> },
}

/// Context reporting a fixed latest known slot.
struct Slot(Option<u64>);

impl PollContext for Slot {
    fn latest_known_edition(&self, _resource: &ResourceId) -> Option<Edition> {
        self.0.map(Edition)
    }
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (0u64..24, any::<bool>()).prop_map(|(edition, known_good)| Op::Discover { edition, known_good }),
        2 => proptest::option::of(0u64..24).prop_map(|slot| Op::Flush { slot }),
        1 => proptest::option::of(0u64..24).prop_map(|slot| Op::RoundComplete { slot }),
    ]
}

#[derive(Default)]
struct Sink {
    got: Mutex<Vec<Discovery>>,
}

impl EditionCallback for Sink {
    fn on_found_edition(&self, _resource: &ResourceId, _ctx: &dyn PollContext, found: Discovery) {
        self.got.lock().push(found);
    }

    fn polling_priority_normal(&self) -> PollingPriority {
        PollingPriority::default()
    }

    fn polling_priority_progress(&self) -> PollingPriority {
        PollingPriority::default()
    }
}

proptest! {
    #[test]
    fn delivered_editions_are_monotonic(ops in prop::collection::vec(op(), 0..64)) {
        let sink = Arc::new(Sink::default());
        let proxy = SparseProxy::new(sink.clone(), ResourceId::from("res"));
        let resource = ResourceId::from("res");

        let mut finished = false;
        let mut max_delivered: Option<Edition> = None;
        let mut flush_run_deliveries = 0usize;

        for op in &ops {
            let before = sink.got.lock().len();
            match op {
                Op::Discover { edition, known_good } => {
                    proxy.on_found_edition(&resource, &NoContext, Discovery::new(*edition).known_good(*known_good));
                    flush_run_deliveries = 0;
                }
                Op::Flush { slot } => proxy.on_flush(&Slot(*slot)),
                Op::RoundComplete { slot } => {
                    proxy.on_round_complete(&Slot(*slot));
                    finished = true;
                }
            }

            let got = sink.got.lock();
            let new = &got[before..];
            prop_assert!(new.len() <= 1);

            if let Some(d) = new.first() {
                match op {
                    Op::Discover { known_good, .. } => {
                        prop_assert!(finished, "discovery forwarded before any round completed");
                        if max_delivered.is_some_and(|m| d.edition < m) {
                            prop_assert!(*known_good, "regressed without a late confirmation");
                        }
                    }
                    Op::Flush { .. } | Op::RoundComplete { .. } => {
                        prop_assert!(max_delivered.map_or(true, |m| d.edition >= m));
                        flush_run_deliveries += 1;
                        prop_assert!(flush_run_deliveries <= 1, "flushes without discoveries notified twice");
                    }
                }
                max_delivered = max_delivered.max(Some(d.edition));
            }

            let snap = proxy.snapshot();
            prop_assert!(snap.last_delivered <= snap.highest);
        }
    }

    #[test]
    fn highest_edition_never_decreases(editions in prop::collection::vec(0u64..100, 1..40)) {
        let proxy = SparseProxy::new(Arc::new(Sink::default()), ResourceId::from("res"));
        let resource = ResourceId::from("res");
        let mut prev = None;
        for e in editions {
            proxy.on_found_edition(&resource, &NoContext, Discovery::new(e));
            let highest = proxy.snapshot().highest;
            prop_assert!(highest >= prev);
            prev = highest;
        }
    }
}
