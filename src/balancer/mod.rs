//! Replica load balancers.
//!
//! A load balancer picks one replica out of the ordered list configured
//! for a rule. Balancers are created by type name through the [`registry`],
//! so new strategies can be plugged in without touching the router.

pub mod error;
pub mod random;
pub mod registry;
pub mod round_robin;

pub use error::Error;
pub use random::Random;
pub use registry::{create, register, registered, Factory, Registry};
pub use round_robin::RoundRobin;

use indexmap::IndexMap;

/// Construction properties of a load balancer, e.g. `seed = "42"`.
pub type Properties = IndexMap<String, String>;

/// Replica selection strategy.
///
/// Implementations own whatever state they need between calls
/// and must be safe to call from many threads at once.
pub trait LoadBalanceAlgorithm: std::fmt::Debug + Send + Sync {
    /// Type name this balancer is registered under, e.g. `ROUND_ROBIN`.
    fn kind(&self) -> &str;

    /// Properties the balancer was created with.
    fn properties(&self) -> &Properties;

    /// Pick a replica. Returns `None` only if there are no replicas.
    fn select<'a>(&self, replicas: &'a [String]) -> Option<&'a str>;
}
