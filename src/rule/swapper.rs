//! Conversion between declarative rules and live rules.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use super::{Error, ReplicaQueryRule, RuleSet, ALGORITHM_PROVIDER_ORDER, RULE_TAG};
use crate::balancer::{self, LoadBalanceAlgorithm, Properties, Registry};
use crate::config::{DataSourceRule, General, LoadBalancer, ReplicaQueryConfig};

/// Converts a rule kind between its on-disk and runtime shapes.
///
/// The hosting pipeline applies rule kinds sorted by [`RuleConfigSwapper::ORDER`].
pub trait RuleConfigSwapper {
    /// Shape written by humans and stored on disk.
    type Declarative;
    /// Shape used for routing.
    type Resolved;

    /// Tag identifying this rule kind.
    const TAG: &'static str;
    /// Position of this rule kind in the pipeline.
    const ORDER: i32;

    /// Build runtime rules, failing on anything invalid.
    fn swap_to_object(&self, declarative: &Self::Declarative) -> Result<Self::Resolved, Error>;

    /// Describe runtime rules in declarative form.
    fn swap_to_declarative(&self, resolved: &Self::Resolved) -> Self::Declarative;
}

/// Swapper for replica query rules.
#[derive(Debug, Clone)]
pub struct ReplicaQuerySwapper {
    default_load_balancer: String,
    registry: Option<Registry>,
}

impl Default for ReplicaQuerySwapper {
    fn default() -> Self {
        Self::new(&General::default())
    }
}

impl ReplicaQuerySwapper {
    /// Swapper using the process-wide load balancer registry.
    pub fn new(general: &General) -> Self {
        Self {
            default_load_balancer: general.default_load_balancer.clone(),
            registry: None,
        }
    }

    /// Use this registry instead of the process-wide one.
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    fn create(
        &self,
        kind: &str,
        properties: &Properties,
    ) -> Result<Arc<dyn LoadBalanceAlgorithm>, Error> {
        let load_balancer = match self.registry {
            Some(ref registry) => registry.create(kind, properties)?,
            None => balancer::create(kind, properties)?,
        };

        Ok(load_balancer)
    }
}

impl RuleConfigSwapper for ReplicaQuerySwapper {
    type Declarative = ReplicaQueryConfig;
    type Resolved = RuleSet;

    const TAG: &'static str = RULE_TAG;
    const ORDER: i32 = ALGORITHM_PROVIDER_ORDER;

    fn swap_to_object(&self, declarative: &ReplicaQueryConfig) -> Result<RuleSet, Error> {
        let mut load_balancers = IndexMap::new();
        for (name, load_balancer) in &declarative.load_balancers {
            let instance = self.create(&load_balancer.kind, &load_balancer.properties)?;
            debug!("load balancer \"{}\" is {}", name, instance.kind());
            load_balancers.insert(name.clone(), instance);
        }

        let mut rules = IndexMap::new();
        for (name, rule) in &declarative.data_sources {
            let load_balancer = match rule.load_balancer_name {
                Some(ref lb_name) => load_balancers.get(lb_name).cloned().ok_or_else(|| {
                    Error::invalid(
                        name,
                        format!("load balancer \"{}\" is not configured", lb_name),
                    )
                })?,
                None => self.create(&self.default_load_balancer, &Properties::new())?,
            };

            let rule = ReplicaQueryRule::new(
                name,
                &rule.primary_data_source_name,
                &rule.replica_data_source_names,
                rule.load_balancer_name.as_deref(),
                load_balancer,
            )?;

            rules.insert(name.clone(), rule);
        }

        Ok(RuleSet::new(rules, load_balancers))
    }

    fn swap_to_declarative(&self, resolved: &RuleSet) -> ReplicaQueryConfig {
        let data_sources = resolved
            .rules()
            .map(|rule| {
                (
                    rule.name().to_string(),
                    DataSourceRule {
                        primary_data_source_name: rule.primary().into(),
                        replica_data_source_names: rule.replicas().to_vec(),
                        load_balancer_name: rule.load_balancer_name().map(|n| n.into()),
                    },
                )
            })
            .collect();

        let load_balancers = resolved
            .load_balancers()
            .iter()
            .map(|(name, instance)| {
                (
                    name.clone(),
                    LoadBalancer {
                        kind: instance.kind().into(),
                        properties: instance.properties().clone(),
                    },
                )
            })
            .collect();

        ReplicaQueryConfig {
            data_sources,
            load_balancers,
        }
    }
}
