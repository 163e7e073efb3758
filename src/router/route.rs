//! Routing decision.

use serde::Serialize;

/// Datasource role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Primary,
    Replica,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Replica => write!(f, "replica"),
        }
    }
}

/// Where a statement should be executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    rule: String,
    data_source: String,
    role: Role,
    schema: Option<String>,
    generation: u64,
}

impl Route {
    pub(super) fn new(
        rule: &str,
        data_source: &str,
        role: Role,
        schema: Option<&str>,
        generation: u64,
    ) -> Self {
        Self {
            rule: rule.into(),
            data_source: data_source.into(),
            role,
            schema: schema.map(|s| s.into()),
            generation,
        }
    }

    /// Rule that made the decision.
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// Target datasource name.
    pub fn data_source(&self) -> &str {
        &self.data_source
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_primary(&self) -> bool {
        self.role == Role::Primary
    }

    pub fn is_replica(&self) -> bool {
        self.role == Role::Replica
    }

    /// Schema the statement runs in, if known.
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Rule set generation used for the decision.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}, rule \"{}\")", self.data_source, self.role, self.rule)
    }
}
