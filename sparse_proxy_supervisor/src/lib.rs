//! sparse_proxy_supervisor
//!
//! Outside-world facing layer around `sparse_proxy_core`.
//!
//! Responsibilities:
//! - own one `SparseProxy` per (subscriber, resource) subscription
//! - shard subscriptions by resource id (deterministic)
//! - route polling-engine calls to the proxies of a resource
//!
//! Non-goals:
//! - no IO
//! - no async
//! - no forwarding policy (lives in core)

pub mod error;
pub mod supervisor;

pub use error::SupervisorError;

pub use supervisor::{
    SharedSubscriber,
    SubscriptionEntry,
    SubscriptionId,
    SubscriptionSupervisor,
    SupervisorSnapshot,
};
