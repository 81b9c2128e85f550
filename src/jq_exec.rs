//! jq pre-filtering via jaq.
//!
//! Descriptor sources don't always arrive in descriptor shape. A jq filter
//! lets the loader carve the `{ "types": [...] }` document out of whatever
//! manifest a front end produced; every output the filter yields becomes
//! its own descriptor document.

use jaq_core::{compile::Undefined, load, Compiler, Ctx, RcIter};
use jaq_json::Val;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JqError {
    #[error("invalid jq filter: {0}")]
    Parse(String),
    #[error("jq filter uses undefined names: {0}")]
    Undefined(String),
    #[error("jq filter failed: {0}")]
    Eval(String),
}

/// Run `filter_src` over one input document, collecting every output value.
pub fn apply_filter(filter_src: &str, input: &Value) -> Result<Vec<Value>, JqError> {
    let loader = load::Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let arena = load::Arena::default();
    let program = load::File { code: filter_src, path: () };

    let modules = loader.load(&arena, program).map_err(collect_parse_errors)?;

    let filter = Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(collect_undefined_errors)?;

    let inputs = RcIter::new(core::iter::empty());
    let mut outputs = Vec::new();
    for item in filter.run((Ctx::new([], &inputs), Val::from(input.clone()))) {
        let val = item.map_err(|e| JqError::Eval(format!("{e:?}")))?;
        outputs.push(Value::from(val));
    }
    Ok(outputs)
}

fn collect_parse_errors(errs: Vec<(load::File<&str, ()>, load::Error<&str>)>) -> JqError {
    let msgs: Vec<String> = errs
        .into_iter()
        .map(|(file, err)| format!("{err:?} in `{}`", file.code))
        .collect();
    JqError::Parse(msgs.join("; "))
}

fn collect_undefined_errors(
    errs: Vec<(load::File<&str, ()>, Vec<(&str, Undefined)>)>,
) -> JqError {
    let mut msgs = Vec::new();
    for (file, list) in errs {
        for (name, undef) in list {
            msgs.push(format!("`{name}` {undef:?} in `{}`", file.code));
        }
    }
    JqError::Undefined(msgs.join("; "))
}

// ------------------------------- Tests ------------------------------------ //
