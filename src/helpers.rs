//! Template helpers installed into every resource's Handlebars instance.
//!
//! ## Value helpers
//!
//! | Helper | Example | Result |
//! |--------|---------|--------|
//! | `any` | `{{#if (any people orgs)}}` | true if at least one argument is present |
//! | `all` | `{{#if (all name homepage)}}` | true if every argument is present |
//! | `equals` | `{{#if (equals kind "person")}}` | true if every argument equals the first |
//! | `markdown` | `{{{markdown about.description}}}` | argument rendered as HTML |
//! | `relative` | `<a href="{{relative item.uri}}">` | path + query + fragment of the resolved URL |
//!
//! "Present" always means "not empty" under the resource's
//! [`EmptinessPolicy`].
//!
//! ## Block helpers
//!
//! `if`, `unless`, `with` and `each` replace the engine's built-ins so that
//! they use the same policy: `{{#if people}}` is false for a query that
//! returned no rows, `{{#with people}}` falls through to its `{{else}}`, and
//! `{{#each people}}` walks the rows of a decorated result instead of the
//! members of the JSON object carrying it. Plain arrays and objects iterate as
//! usual, with `@index`, `@first`, `@last` and (for objects) `@key`. Block
//! parameters work as with the built-ins: `{{#each people as |p i|}}`,
//! `{{#with people as |p|}}`.

use crate::emptiness::EmptinessPolicy;
use crate::markdown;
use crate::query;
use handlebars::{
    BlockContext, BlockParams, Context, Handlebars, Helper, HelperDef, HelperResult, JsonRender, Output,
    RenderContext, RenderError, RenderErrorReason, Renderable, ScopedJson, to_json,
};
use serde_json::Value as Json;
use std::sync::Arc;
use url::{Position, Url};

/// Install the helper set for a resource served at `address`.
pub fn register(engine: &mut Handlebars<'static>, address: &Url, policy: Arc<dyn EmptinessPolicy>) {
    engine.register_helper("any", Box::new(Any(policy.clone())));
    engine.register_helper("all", Box::new(All(policy.clone())));
    engine.register_helper("equals", Box::new(Equals));
    engine.register_helper("markdown", Box::new(Markdown(policy.clone())));
    engine.register_helper(
        "relative",
        Box::new(Relative {
            base: address.clone(),
            policy: policy.clone(),
        }),
    );
    engine.register_helper(
        "if",
        Box::new(Conditional {
            policy: policy.clone(),
            negate: false,
        }),
    );
    engine.register_helper(
        "unless",
        Box::new(Conditional {
            policy: policy.clone(),
            negate: true,
        }),
    );
    engine.register_helper("with", Box::new(With(policy.clone())));
    engine.register_helper("each", Box::new(Each(policy)));
}

// ============================================================================
// Reductions
// ============================================================================

pub fn any(policy: &dyn EmptinessPolicy, args: &[&Json]) -> bool {
    args.iter().any(|v| !policy.is_empty(v))
}

pub fn all(policy: &dyn EmptinessPolicy, args: &[&Json]) -> bool {
    args.iter().all(|v| !policy.is_empty(v))
}

/// Strict equality against the first argument. Vacuously true for no arguments.
pub fn equals(args: &[&Json]) -> bool {
    match args.split_first() {
        Some((first, rest)) => rest.iter().all(|v| v == first),
        None => true,
    }
}

/// String form of a template value.
///
/// Decorated query results coerce to their first variable's value; other
/// values render the way `{{value}}` would.
pub fn scalar_string(value: &Json) -> String {
    match value {
        Json::String(s) => s.clone(),
        other => match query::decorated_scalar(other) {
            Some(scalar) => scalar.to_string(),
            None => other.render(),
        },
    }
}

/// Resolve `target` against `base` and keep only path, query and fragment.
///
/// `https://example.org/site/a/b?x=1#y` against `https://example.org/site/`
/// → `/site/a/b?x=1#y`
pub fn relative(base: &Url, target: &str) -> Result<String, url::ParseError> {
    let resolved = base.join(target)?;
    Ok(resolved[Position::BeforePath..].to_string())
}

fn args<'a>(h: &'a Helper<'_>) -> Vec<&'a Json> {
    h.params().iter().map(|p| p.value()).collect()
}

// ============================================================================
// Value helpers
// ============================================================================

struct Any(Arc<dyn EmptinessPolicy>);

impl HelperDef for Any {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        Ok(ScopedJson::Derived(Json::Bool(any(self.0.as_ref(), &args(h)))))
    }
}

struct All(Arc<dyn EmptinessPolicy>);

impl HelperDef for All {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        Ok(ScopedJson::Derived(Json::Bool(all(self.0.as_ref(), &args(h)))))
    }
}

struct Equals;

impl HelperDef for Equals {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        Ok(ScopedJson::Derived(Json::Bool(equals(&args(h)))))
    }
}

struct Markdown(Arc<dyn EmptinessPolicy>);

impl HelperDef for Markdown {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        let html = match h.param(0).map(|p| p.value()) {
            Some(value) if !self.0.is_empty(value) => markdown::render(&scalar_string(value)),
            _ => String::new(),
        };
        Ok(ScopedJson::Derived(Json::String(html)))
    }
}

struct Relative {
    base: Url,
    policy: Arc<dyn EmptinessPolicy>,
}

impl HelperDef for Relative {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        let value = match h.param(0).map(|p| p.value()) {
            Some(value) if !self.policy.is_empty(value) => value,
            _ => return Ok(ScopedJson::Derived(Json::String(String::new()))),
        };
        let target = scalar_string(value);
        let path = relative(&self.base, &target).map_err(|e| {
            RenderErrorReason::Other(format!(
                "relative: cannot resolve '{target}' against <{}>: {e}",
                self.base
            ))
        })?;
        Ok(ScopedJson::Derived(Json::String(path)))
    }
}

// ============================================================================
// Block helpers
// ============================================================================

struct Conditional {
    policy: Arc<dyn EmptinessPolicy>,
    negate: bool,
}

impl HelperDef for Conditional {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let name = if self.negate { "unless" } else { "if" };
        let value = h
            .param(0)
            .ok_or(RenderErrorReason::ParamNotFoundForIndex(name, 0))?
            .value();

        let include_zero = h
            .hash_get("includeZero")
            .and_then(|v| v.value().as_bool())
            .unwrap_or(false);
        let present = (include_zero && value.is_number()) || !self.policy.is_empty(value);

        let branch = if present != self.negate {
            h.template()
        } else {
            h.inverse()
        };
        match branch {
            Some(t) => t.render(r, ctx, rc, out),
            None => Ok(()),
        }
    }
}

struct With(Arc<dyn EmptinessPolicy>);

impl HelperDef for With {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let value = h
            .param(0)
            .ok_or(RenderErrorReason::ParamNotFoundForIndex("with", 0))?
            .value();

        if self.0.is_empty(value) {
            return match h.inverse() {
                Some(t) => t.render(r, ctx, rc, out),
                None => Ok(()),
            };
        }
        let Some(template) = h.template() else {
            return Ok(());
        };

        let mut block = BlockContext::new();
        block.set_base_value(value.clone());
        if let Some(name) = h.block_param() {
            let mut params = BlockParams::new();
            params.add_value(name, value.clone())?;
            block.set_block_params(params);
        }
        rc.push_block(block);
        template.render(r, ctx, rc, out)?;
        rc.pop_block();
        Ok(())
    }
}

struct Each(Arc<dyn EmptinessPolicy>);

impl Each {
    /// Items to iterate, paired with their object key where there is one.
    fn items(&self, value: &Json) -> Vec<(Option<String>, Json)> {
        if let Some(rows) = query::decorated_rows(value) {
            return rows.iter().map(|row| (None, row.clone())).collect();
        }
        match value {
            Json::Array(items) => items.iter().map(|v| (None, v.clone())).collect(),
            Json::Object(members) => members
                .iter()
                .map(|(k, v)| (Some(k.clone()), v.clone()))
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl HelperDef for Each {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let value = h
            .param(0)
            .ok_or(RenderErrorReason::ParamNotFoundForIndex("each", 0))?
            .value();

        let items = if self.0.is_empty(value) {
            Vec::new()
        } else {
            self.items(value)
        };

        if items.is_empty() {
            return match h.inverse() {
                Some(t) => t.render(r, ctx, rc, out),
                None => Ok(()),
            };
        }
        let Some(template) = h.template() else {
            return Ok(());
        };

        let len = items.len();
        rc.push_block(BlockContext::new());
        for (index, (key, item)) in items.into_iter().enumerate() {
            if let Some(block) = rc.block_mut() {
                block.set_local_var("index", to_json(index));
                block.set_local_var("first", to_json(index == 0));
                block.set_local_var("last", to_json(index + 1 == len));
                if let Some(key) = &key {
                    block.set_local_var("key", to_json(key));
                }
                if let Some(name) = h.block_param() {
                    let mut params = BlockParams::new();
                    params.add_value(name, item.clone())?;
                    block.set_block_params(params);
                } else if let Some((name, position)) = h.block_param_pair() {
                    let mut params = BlockParams::new();
                    params.add_value(name, item.clone())?;
                    match &key {
                        Some(key) => params.add_value(position, to_json(key))?,
                        None => params.add_value(position, to_json(index))?,
                    }
                    block.set_block_params(params);
                }
                block.set_base_value(item);
            }
            template.render(r, ctx, rc, out)?;
        }
        rc.pop_block();
        Ok(())
    }
}
