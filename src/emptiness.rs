//! Truthiness rules for template conditionals.
//!
//! Handlebars decides whether `{{#if x}}` renders its block with a single
//! "is this value empty" test. The engine's own rule treats any non-empty
//! object as present, which would make every decorated query result truthy
//! (it always has `head` and `results` members). [`QueryAware`] layers the
//! domain rule on top: a decorated result is empty exactly when it has no
//! rows, everything else falls through to the engine rule.
//!
//! The policy is a plain value handed to each resource's helper set, not a
//! global override, so two engines can run with different rules side by side.

use crate::query;
use handlebars::JsonTruthy;
use serde_json::Value as Json;

/// Decides whether a template value counts as absent.
pub trait EmptinessPolicy: Send + Sync {
    fn is_empty(&self, value: &Json) -> bool;
}

/// The engine's built-in rule: `null`, `false`, `0`, `""`, `[]` and `{}` are empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineDefault;

impl EmptinessPolicy for EngineDefault {
    fn is_empty(&self, value: &Json) -> bool {
        !value.is_truthy(false)
    }
}

/// Decorated query results are empty iff they have no rows; other values
/// defer to `fallback`.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryAware<P = EngineDefault> {
    fallback: P,
}

impl<P> QueryAware<P> {
    pub fn new(fallback: P) -> Self {
        Self { fallback }
    }
}

impl<P: EmptinessPolicy> EmptinessPolicy for QueryAware<P> {
    fn is_empty(&self, value: &Json) -> bool {
        match query::decorated_rows(value) {
            Some(rows) => rows.is_empty(),
            None => self.fallback.is_empty(value),
        }
    }
}
