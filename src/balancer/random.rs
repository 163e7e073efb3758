//! Random load balancer.

use parking_lot::Mutex;
use rand::{rngs::StdRng, thread_rng, Rng, SeedableRng};

use super::{Error, LoadBalanceAlgorithm, Properties};

/// Picks a replica uniformly at random.
///
/// Setting the `seed` property makes the sequence reproducible,
/// which is mostly useful in tests.
#[derive(Debug)]
pub struct Random {
    rng: Option<Mutex<StdRng>>,
    properties: Properties,
}

impl Random {
    pub const TYPE: &'static str = "RANDOM";

    pub fn new(properties: &Properties) -> Result<Self, Error> {
        let rng = match properties.get("seed") {
            Some(seed) => {
                let seed = seed.parse::<u64>().map_err(|_| Error::InvalidProperty {
                    kind: Self::TYPE.into(),
                    name: "seed".into(),
                    value: seed.clone(),
                })?;
                Some(Mutex::new(StdRng::seed_from_u64(seed)))
            }
            None => None,
        };

        Ok(Self {
            rng,
            properties: properties.clone(),
        })
    }

    pub(crate) fn factory(
        properties: &Properties,
    ) -> Result<Box<dyn LoadBalanceAlgorithm>, Error> {
        Ok(Box::new(Self::new(properties)?))
    }
}

impl LoadBalanceAlgorithm for Random {
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

        let index = match self.rng {
            Some(ref rng) => rng.lock().gen_range(0..replicas.len()),
            None => thread_rng().gen_range(0..replicas.len()),
        };

        replicas.get(index).map(|r| r.as_str())
    }
}
