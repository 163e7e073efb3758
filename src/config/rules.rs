//! Declarative replica query rules, as they are written to and read from disk.
//!
//! This shape holds names and primitives only. It's turned into live
//! rules with load balancer instances by [`crate::rule::swapper`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::balancer::Properties;

/// All replica query rules and the load balancers they reference.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReplicaQueryConfig {
    /// Rule name to rule.
    #[serde(default)]
    pub data_sources: IndexMap<String, DataSourceRule>,
    /// Load balancer name to load balancer.
    #[serde(default)]
    pub load_balancers: IndexMap<String, LoadBalancer>,
}

/// One primary and its replicas.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DataSourceRule {
    /// Datasource receiving writes.
    pub primary_data_source_name: String,
    /// Datasources receiving reads, in selection order.
    #[serde(default)]
    pub replica_data_source_names: Vec<String>,
    /// Name of an entry in `loadBalancers`. Uses the default balancer if not set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_balancer_name: Option<String>,
}

/// Load balancer type and how to build it.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoadBalancer {
    /// Registered type name, e.g. `ROUND_ROBIN`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, alias = "props")]
    pub properties: Properties,
}

impl LoadBalancer {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.into(),
            properties: Properties::new(),
        }
    }
}
