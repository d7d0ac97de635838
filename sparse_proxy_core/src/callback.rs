//! Seams between the proxy, its subscriber and the polling engine.

use std::sync::Arc;

use crate::discovery::Discovery;
use crate::edition::{Edition, PollingPriority, ResourceId};

/// Runtime context handed through by the polling engine.
pub trait PollContext {
    /// Latest edition the runtime knows of for `resource`, from any subscriber.
    fn latest_known_edition(&self, resource: &ResourceId) -> Option<Edition>;
}

/// Receiver of discovered editions.
pub trait EditionCallback {
    fn on_found_edition(&self, resource: &ResourceId, ctx: &dyn PollContext, found: Discovery);

    /// Priority to poll at while idle.
    fn polling_priority_normal(&self) -> PollingPriority;

    /// Priority to poll at while a round is making progress.
    fn polling_priority_progress(&self) -> PollingPriority;
}

/// An `EditionCallback` that also follows round lifecycle events.
pub trait ProgressCallback: EditionCallback {
    /// The round is about to go to the network; report what is known so far.
    fn on_flush(&self, ctx: &dyn PollContext);

    /// The round has exhausted its discovery sources.
    fn on_round_complete(&self, ctx: &dyn PollContext);
}

impl<T: EditionCallback + ?Sized> EditionCallback for Arc<T> {
    fn on_found_edition(&self, resource: &ResourceId, ctx: &dyn PollContext, found: Discovery) {
        (**self).on_found_edition(resource, ctx, found)
    }

    fn polling_priority_normal(&self) -> PollingPriority {
        (**self).polling_priority_normal()
    }

    fn polling_priority_progress(&self) -> PollingPriority {
        (**self).polling_priority_progress()
    }
}

impl<T: ProgressCallback + ?Sized> ProgressCallback for Arc<T> {
    fn on_flush(&self, ctx: &dyn PollContext) {
        (**self).on_flush(ctx)
    }

    fn on_round_complete(&self, ctx: &dyn PollContext) {
        (**self).on_round_complete(ctx)
    }
}

impl<T: EditionCallback + ?Sized> EditionCallback for &T {
    fn on_found_edition(&self, resource: &ResourceId, ctx: &dyn PollContext, found: Discovery) {
        (**self).on_found_edition(resource, ctx, found)
    }

    fn polling_priority_normal(&self) -> PollingPriority {
        (**self).polling_priority_normal()
    }

    fn polling_priority_progress(&self) -> PollingPriority {
        (**self).polling_priority_progress()
    }
}

/// A context that never knows anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoContext;

impl PollContext for NoContext {
    fn latest_known_edition(&self, _resource: &ResourceId) -> Option<Edition> {
        None
    }
}
