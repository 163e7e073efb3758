//! Query router.
//!
//! Sends writes to the primary and spreads reads over replicas
//! using the rule's load balancer.

pub mod error;
pub mod route;


pub use error::Error;
pub use route::{Role, Route};

use std::time::Instant;

use tracing::debug;

use crate::parser::{EnrichedStatement, Intent};
use crate::rule::{rules, RuleSet};

/// What the caller knows about the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteContext<'a> {
    /// Rule governing this request, resolved by the caller.
    pub rule: &'a str,
    /// Session's current schema.
    pub schema: Option<&'a str>,
    /// Send reads to the primary as well.
    pub primary_only: bool,
}

impl<'a> RouteContext<'a> {
    pub fn new(rule: &'a str) -> Self {
        Self {
            rule,
            schema: None,
            primary_only: false,
        }
    }

    /// Session's current schema.
    pub fn schema(mut self, schema: Option<&'a str>) -> Self {
        self.schema = schema;
        self
    }

    /// Route everything to the primary, e.g. after the session wrote something.
    pub fn primary_only(mut self) -> Self {
        self.primary_only = true;
        self
    }
}

/// Route a statement using the active rules.
///
/// The rules are loaded once, so a reload happening in the meantime
/// doesn't affect this decision.
pub fn route_active(statement: &EnrichedStatement, context: &RouteContext) -> Result<Route, Error> {
    let rules = rules();
    route(statement, &rules, context)
}

/// Decide which datasource should execute the statement.
pub fn route(
    statement: &EnrichedStatement,
    rules: &RuleSet,
    context: &RouteContext,
) -> Result<Route, Error> {
    let now = Instant::now();

    let rule = rules
        .rule(context.rule)
        .ok_or_else(|| Error::UnknownRule(context.rule.into()))?;

    let intent = statement
        .intent()
        .ok_or_else(|| Error::UnroutableStatement(statement.statement().name().into()))?;

    let schema = statement.active_schema().or(context.schema);

    let route = match intent {
        Intent::Read if !context.primary_only => {
            let replica = rule
                .replica()
                .ok_or_else(|| Error::NoReplicas(rule.name().into()))?;
            Route::new(rule.name(), replica, Role::Replica, schema, rules.generation())
        }
        _ => Route::new(
            rule.name(),
            rule.primary(),
            Role::Primary,
            schema,
            rules.generation(),
        ),
    };

    debug!(
        "routing {} to {} [{}, {:.3}ms]",
        statement.statement().name(),
        route,
        rule.load_balancer().kind(),
        now.elapsed().as_secs_f64() * 1000.0,
    );

    Ok(route)
}
