//! Round robin load balancer.

use std::sync::atomic::{AtomicUsize, Ordering};

use super::{Error, LoadBalanceAlgorithm, Properties};

/// Rotates through replicas in configured order.
#[derive(Debug, Default)]
pub struct RoundRobin {
    counter: AtomicUsize,
    properties: Properties,
}

impl RoundRobin {
    pub const TYPE: &'static str = "ROUND_ROBIN";

    pub fn new(properties: &Properties) -> Self {
        Self {
            counter: AtomicUsize::new(0),
            properties: properties.clone(),
        }
    }

    pub(crate) fn factory(
        properties: &Properties,
    ) -> Result<Box<dyn LoadBalanceAlgorithm>, Error> {
        Ok(Box::new(Self::new(properties)))
    }
}

impl LoadBalanceAlgorithm for RoundRobin {
    fn kind(&self) -> &str {
        Self::TYPE
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }

    fn select<'a>(&self, replicas: &'a [String]) -> Option<&'a str> {
        if replicas.is_empty() {
            return None;
        }

        let next = self.counter.fetch_add(1, Ordering::Relaxed);
        replicas.get(next % replicas.len()).map(|r| r.as_str())
    }
}
