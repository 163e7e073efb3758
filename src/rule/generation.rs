//! Active rule set.
//!
//! Routing reads a snapshot of the active rules; reloading builds a whole
//! new [`RuleSet`] and swaps it in with a single atomic store. Requests that
//! took a snapshot before the swap finish with the rules and load balancers
//! they started with.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use tracing::{error, info};

use super::{Error, ReplicaQuerySwapper, RuleConfigSwapper, RuleSet};
use crate::config::{self, Config};

static ACTIVE: Lazy<ActiveRules> = Lazy::new(ActiveRules::default);

/// Get the active rules.
pub fn rules() -> Arc<RuleSet> {
    ACTIVE.load()
}

/// Build rules from configuration and make them active.
pub fn activate(config: &Config) -> Result<Arc<RuleSet>, Error> {
    ACTIVE.activate(config)
}

/// Replace the active rules.
pub fn replace(rules: RuleSet) -> Arc<RuleSet> {
    ACTIVE.replace(rules)
}

/// Re-read the configuration file and activate it.
///
/// If anything is wrong with the new configuration, including the file
/// being gone or unreadable, the current rules stay active.
pub fn reload(path: &Path) -> Result<Arc<RuleSet>, Error> {
    ACTIVE.reload(path)
}

/// Holder of the active rule set generation.
#[derive(Debug)]
pub struct ActiveRules {
    current: ArcSwap<RuleSet>,
    generation: AtomicU64,
}

impl Default for ActiveRules {
    fn default() -> Self {
        Self {
            current: ArcSwap::from_pointee(RuleSet::default()),
            generation: AtomicU64::new(0),
        }
    }
}

impl ActiveRules {
    /// Snapshot of the active rules.
    pub fn load(&self) -> Arc<RuleSet> {
        self.current.load_full()
    }

    /// Build rules from configuration and make them active.
    pub fn activate(&self, config: &Config) -> Result<Arc<RuleSet>, Error> {
        let rules = ReplicaQuerySwapper::new(&config.general).swap_to_object(&config.rules)?;
        Ok(self.replace(rules))
    }

    /// Make these rules active.
    pub fn replace(&self, mut rules: RuleSet) -> Arc<RuleSet> {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        rules.set_generation(generation);

        let rules = Arc::new(rules);
        self.current.store(rules.clone());

        info!(
            "activated {} replica query rules [generation {}]",
            rules.len(),
            generation
        );

        rules
    }

    /// Re-read the configuration file and activate it.
    pub fn reload(&self, path: &Path) -> Result<Arc<RuleSet>, Error> {
        let result = config::read(path)
            .map_err(Error::from)
            .and_then(|config| self.activate(&config));

        if let Err(ref err) = result {
            error!(
                "reload of \"{}\" failed, keeping generation {}: {}",
                path.display(),
                self.load().generation(),
                err
            );
        }

        result
    }
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    const GOOD: &str = r#"
[dataSources.r1]
primaryDataSourceName = "ds0"
replicaDataSourceNames = ["ds1", "ds2"]
loadBalancerName = "rr"

[loadBalancers.rr]
type = "ROUND_ROBIN"
"#;

    const NEW: &str = r#"
[dataSources.r1]
primaryDataSourceName = "ds10"
replicaDataSourceNames = ["ds11", "ds12"]
"#;

    const BAD: &str = r#"
[dataSources.r1]
primaryDataSourceName = "ds0"
replicaDataSourceNames = ["ds0"]
"#;

    fn file(source: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(source.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_activate() {
        let active = ActiveRules::default();
        assert!(active.load().is_empty());
        assert_eq!(active.load().generation(), 0);

        let rules = active.activate(&Config::from_toml(GOOD).unwrap()).unwrap();
        assert_eq!(rules.generation(), 1);
        assert_eq!(active.load().rule("r1").unwrap().primary(), "ds0");
    }

    #[test]
    fn test_snapshot_survives_reload() {
        let active = ActiveRules::default();
        active.activate(&Config::from_toml(GOOD).unwrap()).unwrap();

        let before = active.load();
        let rule = before.rule("r1").unwrap();
        assert_eq!(rule.replica(), Some("ds1"));

        active.reload(file(NEW).path()).unwrap();

        // Old snapshot still sees old rules and the old balancer state.
        assert_eq!(rule.primary(), "ds0");
        assert_eq!(rule.replica(), Some("ds2"));
        assert_eq!(before.generation(), 1);

        // New generation starts fresh.
        let after = active.load();
        assert_eq!(after.generation(), 2);
        let rule = after.rule("r1").unwrap();
        assert_eq!(rule.primary(), "ds10");
        assert_eq!(rule.replica(), Some("ds11"));
    }

    #[test]
    fn test_failed_reload_keeps_rules() {
        let active = ActiveRules::default();
        active.activate(&Config::from_toml(GOOD).unwrap()).unwrap();

        let err = active.reload(file(BAD).path()).unwrap_err();
        assert!(err.is_invalid_rule());

        let err = active.reload(file("[dataSources.r1\n").path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let rules = active.load();
        assert_eq!(rules.generation(), 1);
        assert_eq!(rules.rule("r1").unwrap().primary(), "ds0");
    }

    #[test]
    fn test_reload_missing_or_unreadable_file() {
        let active = ActiveRules::default();
        active.activate(&Config::from_toml(GOOD).unwrap()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let err = active.reload(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Config(config::Error::Io(_))));

        let err = active.reload(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, Error::Config(config::Error::Io(_))));

        let rules = active.load();
        assert_eq!(rules.generation(), 1);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules.rule("r1").unwrap().primary(), "ds0");
    }

    #[test]
    fn test_concurrent_reload() {
        let active = Arc::new(ActiveRules::default());
        let good = Config::from_toml(GOOD).unwrap();
        let new = Config::from_toml(NEW).unwrap();
        active.activate(&good).unwrap();

        let readers = (0..4)
            .map(|_| {
                let active = active.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        let rules = active.load();
                        let rule = rules.rule("r1").unwrap();
                        let replica = rule.replica().unwrap();
                        // Primary and replicas always come from the same generation.
                        match rule.primary() {
                            "ds0" => assert!(replica == "ds1" || replica == "ds2"),
                            "ds10" => assert!(replica == "ds11" || replica == "ds12"),
                            primary => panic!("unexpected primary {}", primary),
                        }
                    }
                })
            })
            .collect::<Vec<_>>();

        for i in 0..100 {
            let config = if i % 2 == 0 { &new } else { &good };
            active.activate(config).unwrap();
        }

        for reader in readers {
            reader.join().unwrap();
        }

        assert_eq!(active.load().generation(), 101);
    }
}
