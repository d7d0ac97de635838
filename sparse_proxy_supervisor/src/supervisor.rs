//! Sharded subscription supervisor.
//!
//! Owns one `SparseProxy` per (subscriber, resource) pairing and routes polling-engine
//! calls to every proxy of the addressed resource:
//! - shards resources by a deterministic hash of the resource id
//! - applies per-resource `ProxyCfg` overrides to newly created proxies
//! - aggregates subscriber polling priorities per resource
//!
//! No IO. No async. Proxies are always invoked with every supervisor lock released,
//! so subscribers may subscribe or unsubscribe from inside a callback.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;
use sparse_proxy_core::{
    Discovery, EditionCallback, PollContext, PollingPriority, ProgressCallback, ProxyCfg,
    ProxySnapshot, ResourceId, SparseProxy,
};

use crate::error::SupervisorError;

/// A subscriber shared between the caller and the supervisor.
pub type SharedSubscriber = Arc<dyn EditionCallback + Send + Sync>;

type Proxy = SparseProxy<SharedSubscriber>;

/// Handle for one subscription, unique within a supervisor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// One row of a `SupervisorSnapshot`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SubscriptionEntry {
    pub resource: ResourceId,
    pub subscription: SubscriptionId,
    pub state: ProxySnapshot,
}

/// Diagnostic view of every subscription.
///
/// Pure data; there is no restore, proxies are rebuilt by subscribing again.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SupervisorSnapshot {
    pub subscriptions: Vec<SubscriptionEntry>,
}

#[derive(Default)]
struct Shard {
    resources: HashMap<ResourceId, Vec<(SubscriptionId, Arc<Proxy>)>>,
}

fn shard_index(resource: &ResourceId, shard_count: usize) -> usize {
    if shard_count <= 1 {
        return 0;
    }
    (resource.stable_hash() % shard_count as u64) as usize
}

pub struct SubscriptionSupervisor {
    cfg: ProxyCfg,
    /// Optional per-resource cfg overrides, applied when a proxy is created.
    cfg_overrides: HashMap<ResourceId, ProxyCfg>,
    shards: usize,
    state_shards: Vec<Mutex<Shard>>,
    owners: Mutex<HashMap<SubscriptionId, ResourceId>>,
    next_id: AtomicU64,
}

impl fmt::Debug for SubscriptionSupervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionSupervisor")
            .field("cfg", &self.cfg)
            .field("cfg_overrides", &self.cfg_overrides)
            .field("shards", &self.shards)
            .field("subscriptions", &self.len())
            .finish()
    }
}

impl SubscriptionSupervisor {
    /// Create a supervisor with `shards` lock shards. `shards=1` is the default.
    pub fn new(shards: usize, cfg: ProxyCfg) -> Self {
        let shards = shards.max(1);
        let mut state_shards = Vec::with_capacity(shards);
        for _ in 0..shards {
            state_shards.push(Mutex::new(Shard::default()));
        }

        Self {
            cfg,
            cfg_overrides: HashMap::new(),
            shards,
            state_shards,
            owners: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Override cfg for proxies later created for `resource`.
    pub fn set_cfg_override(&mut self, resource: impl Into<ResourceId>, cfg: ProxyCfg) {
        self.cfg_overrides.insert(resource.into(), cfg);
    }

    pub fn clear_cfg_override(&mut self, resource: &ResourceId) {
        self.cfg_overrides.remove(resource);
    }

    fn cfg_for(&self, resource: &ResourceId) -> &ProxyCfg {
        self.cfg_overrides.get(resource).unwrap_or(&self.cfg)
    }

    fn shard(&self, resource: &ResourceId) -> &Mutex<Shard> {
        &self.state_shards[shard_index(resource, self.shards)]
    }

    /// Wrap `subscriber` in a fresh sparse proxy tracking `resource`.
    pub fn subscribe<S>(&self, resource: impl Into<ResourceId>, subscriber: Arc<S>) -> SubscriptionId
    where
        S: EditionCallback + Send + Sync + 'static,
    {
        let resource = resource.into();
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let target: SharedSubscriber = subscriber;
        let proxy = Arc::new(SparseProxy::with_cfg(
            target,
            resource.clone(),
            self.cfg_for(&resource).clone(),
        ));

        self.shard(&resource)
            .lock()
            .resources
            .entry(resource.clone())
            .or_default()
            .push((id, proxy));
        debug!("{id} subscribed to {resource}");
        self.owners.lock().insert(id, resource);
        id
    }

    /// Drop a subscription and its proxy state. Returns the resource it tracked.
    pub fn unsubscribe(&self, id: SubscriptionId) -> Result<ResourceId, SupervisorError> {
        let resource = self
            .owners
            .lock()
            .remove(&id)
            .ok_or(SupervisorError::UnknownSubscription(id))?;

        let mut guard = self.shard(&resource).lock();
        if let Some(subs) = guard.resources.get_mut(&resource) {
            subs.retain(|(sid, _)| *sid != id);
            if subs.is_empty() {
                guard.resources.remove(&resource);
            }
        }
        drop(guard);

        debug!("{id} unsubscribed from {resource}");
        Ok(resource)
    }

    /// Number of live subscriptions for `resource`.
    pub fn subscriptions(&self, resource: &ResourceId) -> usize {
        self.shard(resource)
            .lock()
            .resources
            .get(resource)
            .map_or(0, Vec::len)
    }

    pub fn len(&self) -> usize {
        self.owners.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clone the proxy handles out of the shard so callbacks run unlocked.
    fn proxies_for(&self, resource: &ResourceId) -> Vec<Arc<Proxy>> {
        self.shard(resource)
            .lock()
            .resources
            .get(resource)
            .map(|subs| subs.iter().map(|(_, p)| Arc::clone(p)).collect())
            .unwrap_or_default()
    }

    /// Report a discovery to every subscription of `resource`.
    /// Returns the number of proxies reached.
    pub fn on_found_edition(&self, resource: &ResourceId, ctx: &dyn PollContext, found: Discovery) -> usize {
        let proxies = self.proxies_for(resource);
        for proxy in &proxies {
            proxy.on_found_edition(resource, ctx, found.clone());
        }
        proxies.len()
    }

    pub fn on_flush(&self, resource: &ResourceId, ctx: &dyn PollContext) -> usize {
        let proxies = self.proxies_for(resource);
        for proxy in &proxies {
            proxy.on_flush(ctx);
        }
        proxies.len()
    }

    pub fn on_round_complete(&self, resource: &ResourceId, ctx: &dyn PollContext) -> usize {
        let proxies = self.proxies_for(resource);
        for proxy in &proxies {
            proxy.on_round_complete(ctx);
        }
        proxies.len()
    }

    /// Most urgent (normal, progress) priorities over the subscribers of `resource`,
    /// or `None` if nobody subscribes to it.
    pub fn polling_priority(&self, resource: &ResourceId) -> Option<(PollingPriority, PollingPriority)> {
        self.proxies_for(resource)
            .iter()
            .map(|p| (p.polling_priority_normal(), p.polling_priority_progress()))
            .reduce(|(n1, p1), (n2, p2)| (n1.most_urgent(n2), p1.most_urgent(p2)))
    }

    /// Export the state of every subscription.
    ///
    /// Deterministic ordering: sorted by resource, then subscription id.
    pub fn snapshot(&self) -> SupervisorSnapshot {
        let mut out: Vec<SubscriptionEntry> = Vec::new();

        // Lock shards in a stable order.
        for shard in &self.state_shards {
            let guard = shard.lock();
            for (resource, subs) in guard.resources.iter() {
                for (id, proxy) in subs {
                    out.push(SubscriptionEntry {
                        resource: resource.clone(),
                        subscription: *id,
                        state: proxy.snapshot(),
                    });
                }
            }
        }

        out.sort_by(|a, b| (&a.resource, a.subscription).cmp(&(&b.resource, b.subscription)));
        SupervisorSnapshot { subscriptions: out }
    }
}
