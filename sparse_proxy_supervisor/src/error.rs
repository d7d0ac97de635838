use thiserror::Error;

use crate::supervisor::SubscriptionId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SupervisorError {
    #[error("unknown subscription {0}")]
    UnknownSubscription(SubscriptionId),
}
