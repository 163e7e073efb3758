//! Load balancer registry.
//!
//! Maps a type name, e.g. `ROUND_ROBIN`, to a function that builds
//! a new balancer from its properties. Built-in balancers are registered
//! on first use; others can be added with [`register`] at startup.

use std::sync::Arc;

use fnv::FnvHashMap as HashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::debug;

use super::{Error, LoadBalanceAlgorithm, Properties, Random, RoundRobin};

static REGISTRY: Lazy<RwLock<Registry>> = Lazy::new(|| RwLock::new(Registry::builtin()));

/// Builds a load balancer from its properties.
pub type Factory = fn(&Properties) -> Result<Box<dyn LoadBalanceAlgorithm>, Error>;

/// Register a load balancer type process-wide.
///
/// Registering a type name that already exists replaces its factory.
pub fn register(kind: &str, factory: Factory) {
    REGISTRY.write().register(kind, factory);
}

/// Create a new load balancer using the process-wide registry.
pub fn create(kind: &str, properties: &Properties) -> Result<Arc<dyn LoadBalanceAlgorithm>, Error> {
    REGISTRY.read().create(kind, properties)
}

/// Names of all registered load balancer types.
pub fn registered() -> Vec<String> {
    REGISTRY.read().registered()
}

/// Load balancer type name to factory mapping.
#[derive(Default, Clone)]
pub struct Registry {
    factories: HashMap<String, Factory>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("factories", &self.registered())
            .finish()
    }
}

impl Registry {
    /// Registry with the built-in balancers.
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        registry.register(RoundRobin::TYPE, RoundRobin::factory);
        registry.register(Random::TYPE, Random::factory);
        registry
    }

    /// Add a balancer type. Type names are case-insensitive.
    pub fn register(&mut self, kind: &str, factory: Factory) {
        debug!("registering load balancer \"{}\"", kind);
        self.factories.insert(normalize(kind), factory);
    }

    /// Create a new balancer instance.
    pub fn create(
        &self,
        kind: &str,
        properties: &Properties,
    ) -> Result<Arc<dyn LoadBalanceAlgorithm>, Error> {
        let factory = self
            .factories
            .get(&normalize(kind))
            .ok_or_else(|| Error::UnknownAlgorithmType(kind.into(), self.registered().join(", ")))?;

        Ok(Arc::from(factory(properties)?))
    }

    /// Registered type names, sorted.
    pub fn registered(&self) -> Vec<String> {
        let mut names = self.factories.keys().cloned().collect::<Vec<_>>();
        names.sort();
        names
    }
}

fn normalize(kind: &str) -> String {
    kind.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Debug)]
    struct First {
        properties: Properties,
    }

    impl LoadBalanceAlgorithm for First {
        fn kind(&self) -> &str {
            "FIRST"
        }

        fn properties(&self) -> &Properties {
            &self.properties
        }

        fn select<'a>(&self, replicas: &'a [String]) -> Option<&'a str> {
            replicas.first().map(|r| r.as_str())
        }
    }

    fn first(properties: &Properties) -> Result<Box<dyn LoadBalanceAlgorithm>, Error> {
        Ok(Box::new(First {
            properties: properties.clone(),
        }))
    }

    #[test]
    fn test_builtin() {
        let registry = Registry::builtin();
        assert_eq!(registry.registered(), vec!["RANDOM", "ROUND_ROBIN"]);

        let lb = registry.create("round_robin", &Properties::new()).unwrap();
        assert_eq!(lb.kind(), "ROUND_ROBIN");

        let lb = registry.create("Random", &Properties::new()).unwrap();
        assert_eq!(lb.kind(), "RANDOM");
    }

    #[test]
    fn test_unknown_type() {
        let registry = Registry::builtin();
        let err = registry.create("LEAST_CONN", &Properties::new()).unwrap_err();
        assert_eq!(
            err,
            Error::UnknownAlgorithmType("LEAST_CONN".into(), "RANDOM, ROUND_ROBIN".into())
        );
    }

    #[test]
    fn test_register_custom() {
        let mut registry = Registry::builtin();
        registry.register("FIRST", first);

        let lb = registry.create("first", &Properties::new()).unwrap();
        let replicas = vec!["a".to_string(), "b".to_string()];
        assert_eq!(lb.select(&replicas), Some("a"));
        assert_eq!(lb.select(&replicas), Some("a"));
    }

    #[test]
    fn test_instances_are_independent() {
        let registry = Registry::builtin();
        let replicas = vec!["a".to_string(), "b".to_string()];

        let one = registry.create(RoundRobin::TYPE, &Properties::new()).unwrap();
        let two = registry.create(RoundRobin::TYPE, &Properties::new()).unwrap();

        assert_eq!(one.select(&replicas), Some("a"));
        assert_eq!(one.select(&replicas), Some("b"));
        assert_eq!(two.select(&replicas), Some("a"));
    }
}
