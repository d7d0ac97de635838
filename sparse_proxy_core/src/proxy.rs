//! Sparse proxy: coalesces discoveries into at most one notification per round
//! until the first round completes, then passes discoveries straight through.
//!
//! The lock only guards `ProxyState`; the subscriber is always called with it released,
//! so a subscriber may call back into the proxy.

use log::{debug, trace};
use parking_lot::Mutex;

use crate::callback::{EditionCallback, PollContext, ProgressCallback};
use crate::cfg::ProxyCfg;
use crate::discovery::Discovery;
use crate::edition::{PollingPriority, ResourceId};
use crate::state::{Admission, Announcement, ProxySnapshot, ProxyState};

#[derive(Debug)]
pub struct SparseProxy<S> {
    target: S,
    resource: ResourceId,
    cfg: ProxyCfg,
    state: Mutex<ProxyState>,
}

impl<S: EditionCallback> SparseProxy<S> {
    pub fn new(target: S, resource: ResourceId) -> Self {
        Self::with_cfg(target, resource, ProxyCfg::default())
    }

    pub fn with_cfg(target: S, resource: ResourceId, cfg: ProxyCfg) -> Self {
        debug!("creating sparse proxy for {resource} ({cfg:?})");
        Self {
            target,
            resource,
            cfg,
            state: Mutex::new(ProxyState::default()),
        }
    }

    pub fn resource(&self) -> &ResourceId {
        &self.resource
    }

    pub fn subscriber(&self) -> &S {
        &self.target
    }

    pub fn snapshot(&self) -> ProxySnapshot {
        self.state.lock().snapshot()
    }

    fn reconcile(&self, ctx: &dyn PollContext, finish_round: bool) {
        let announcement = self.state.lock().take_announcement(finish_round);

        let found = match announcement {
            None => return,
            Some(Announcement::Cached(found)) => found,
            Some(Announcement::Lookup) => {
                if !self.cfg.fallback_lookup {
                    return;
                }
                let Some(edition) = ctx.latest_known_edition(&self.resource) else {
                    trace!("{}: nothing discovered and no known slot", self.resource);
                    return;
                };
                let settled = self.state.lock().settle_fallback(edition);
                if !settled {
                    return;
                }
                Discovery::at(edition)
            }
        };

        debug!(
            "{}: announcing {} (known good: {}, round finished: {})",
            self.resource, found.edition, found.known_good, finish_round
        );
        self.target.on_found_edition(&self.resource, ctx, found);
    }
}

impl<S: EditionCallback> EditionCallback for SparseProxy<S> {
    fn on_found_edition(&self, resource: &ResourceId, ctx: &dyn PollContext, found: Discovery) {
        let admission = self.state.lock().observe(&found);
        match admission {
            Admission::PassThrough => self.target.on_found_edition(resource, ctx, found),
            Admission::Buffered => trace!("{resource}: buffered {}", found.edition),
            Admission::Dropped => trace!("{resource}: dropped stale {}", found.edition),
        }
    }

    fn polling_priority_normal(&self) -> PollingPriority {
        self.target.polling_priority_normal()
    }

    fn polling_priority_progress(&self) -> PollingPriority {
        self.target.polling_priority_progress()
    }
}

impl<S: EditionCallback> ProgressCallback for SparseProxy<S> {
    fn on_flush(&self, ctx: &dyn PollContext) {
        self.reconcile(ctx, false);
    }

    fn on_round_complete(&self, ctx: &dyn PollContext) {
        self.reconcile(ctx, true);
    }
}
