//! Placeholder substitution engine.
//!
//! The whole templating language is one token shape: `{name}`. [`render`]
//! replaces every token whose name exists in the value set and leaves every
//! other token verbatim, braces included. There is no error path: an
//! unresolved placeholder is a valid outcome, not a failure, which is what
//! lets template defaults and partially-populated pages work at all.
//!
//! ## Scanner Semantics
//!
//! Tokens are matched with `\{([^}]+)\}`: the first `}` after a `{` closes
//! the token, nothing nests, and there are no escape sequences. So
//! `"{a{b}"` is one token named `a{b`, and `"{}"` is not a token (empty
//! name). These exact semantics are shared by [`placeholder_names`], which
//! the template store uses to derive a template's default value set.
//!
//! ## Determinism
//!
//! [`render`] is a single left-to-right pass over the input; the output
//! never depends on value-map iteration order. Rendering the same
//! `(text, values)` twice always yields identical output, and re-rendering
//! an output that contains no token syntax is the identity.

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

/// One `{name}` token: a `{`, then everything up to the next `}`.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^}]+)\}").expect("placeholder regex is valid"));

/// Substitute `{name}` tokens in `raw` from `values`.
///
/// Tokens whose name is absent from `values` pass through verbatim,
/// including their braces. Pure function, no I/O.
pub fn render(raw: &str, values: &BTreeMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(raw, |caps: &regex::Captures| {
            let name = &caps[1];
            match values.get(name) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Extract the distinct placeholder names occurring in `text`.
///
/// Duplicates collapse; order is irrelevant to callers, so the set is
/// returned sorted for stable iteration.
pub fn placeholder_names(text: &str) -> BTreeSet<String> {
    PLACEHOLDER
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}
