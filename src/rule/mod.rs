//! Replica query rules, resolved and ready for routing.
//!
//! A [`RuleSet`] is built from [`crate::config::ReplicaQueryConfig`] by the
//! [`swapper`], with every load balancer already created. It is never
//! modified afterwards: changes produce a new rule set which replaces
//! the active one, see [`generation`].

pub mod error;
pub mod generation;
pub mod swapper;

pub use error::Error;
pub use generation::{activate, reload, replace, rules, ActiveRules};
pub use swapper::{ReplicaQuerySwapper, RuleConfigSwapper};

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::balancer::LoadBalanceAlgorithm;

/// Order of replica query rules relative to other rule kinds.
pub const ORDER: i32 = 10;

/// Order of replica query rules configured with load balancer instances.
pub const ALGORITHM_PROVIDER_ORDER: i32 = ORDER + 1;

/// Rule tag used by configuration management tooling.
pub const RULE_TAG: &str = "REPLICA_QUERY";

/// A primary, its replicas, and the balancer choosing between replicas.
#[derive(Debug, Clone)]
pub struct ReplicaQueryRule {
    name: String,
    primary: String,
    replicas: Vec<String>,
    load_balancer_name: Option<String>,
    load_balancer: Arc<dyn LoadBalanceAlgorithm>,
}

impl ReplicaQueryRule {
    /// Create a rule, checking that it makes sense.
    pub fn new(
        name: &str,
        primary: &str,
        replicas: &[String],
        load_balancer_name: Option<&str>,
        load_balancer: Arc<dyn LoadBalanceAlgorithm>,
    ) -> Result<Self, Error> {
        if name.trim().is_empty() {
            return Err(Error::invalid(name, "rule name is empty"));
        }

        if primary.trim().is_empty() {
            return Err(Error::invalid(name, "primary datasource name is empty"));
        }

        if replicas.is_empty() {
            return Err(Error::invalid(name, "no replica datasources configured"));
        }

        let mut unique = HashSet::new();
        for replica in replicas {
            if replica == primary {
                return Err(Error::invalid(
                    name,
                    format!("primary \"{}\" is also listed as a replica", primary),
                ));
            }

            if !unique.insert(replica.as_str()) {
                return Err(Error::invalid(
                    name,
                    format!("replica \"{}\" is listed more than once", replica),
                ));
            }
        }

        Ok(Self {
            name: name.into(),
            primary: primary.into(),
            replicas: replicas.to_vec(),
            load_balancer_name: load_balancer_name.map(|n| n.into()),
            load_balancer,
        })
    }

    /// Rule name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Datasource receiving writes.
    pub fn primary(&self) -> &str {
        &self.primary
    }

    /// Datasources receiving reads, in configured order.
    pub fn replicas(&self) -> &[String] {
        &self.replicas
    }

    /// Configured load balancer name, `None` if using the default.
    pub fn load_balancer_name(&self) -> Option<&str> {
        self.load_balancer_name.as_deref()
    }

    /// Load balancer instance.
    pub fn load_balancer(&self) -> &Arc<dyn LoadBalanceAlgorithm> {
        &self.load_balancer
    }

    /// Pick the replica for the next read.
    pub fn replica(&self) -> Option<&str> {
        self.load_balancer.select(&self.replicas)
    }
}

/// One generation of replica query rules.
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: IndexMap<String, ReplicaQueryRule>,
    load_balancers: IndexMap<String, Arc<dyn LoadBalanceAlgorithm>>,
    generation: u64,
}

impl RuleSet {
    pub fn new(
        rules: IndexMap<String, ReplicaQueryRule>,
        load_balancers: IndexMap<String, Arc<dyn LoadBalanceAlgorithm>>,
    ) -> Self {
        Self {
            rules,
            load_balancers,
            generation: 0,
        }
    }

    /// Get a rule by name.
    pub fn rule(&self, name: &str) -> Option<&ReplicaQueryRule> {
        self.rules.get(name)
    }

    /// All rules, in configured order.
    pub fn rules(&self) -> impl Iterator<Item = &ReplicaQueryRule> {
        self.rules.values()
    }

    /// Named load balancers, in configured order.
    pub fn load_balancers(&self) -> &IndexMap<String, Arc<dyn LoadBalanceAlgorithm>> {
        &self.load_balancers
    }

    /// Generation number, assigned on activation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub(crate) fn set_generation(&mut self, generation: u64) {
        self.generation = generation;
    }
}
