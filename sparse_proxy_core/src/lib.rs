pub mod edition;
pub mod discovery;

pub mod callback;
pub mod cfg;
pub mod state;
pub mod proxy;

pub use edition::{Edition, PollingPriority, ResourceId};
pub use discovery::Discovery;

pub use callback::{EditionCallback, NoContext, PollContext, ProgressCallback};
pub use cfg::ProxyCfg;
pub use state::{Admission, Announcement, ProxySnapshot, ProxyState};
pub use proxy::SparseProxy;
