// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

// Replaces variable placeholders like `#{name}` with values.
//
// The default `#{name}` syntax leaves an unresolved placeholder readable as a
// yaml comment, and does not clash with `${name}` variables that the
// configuration itself may rely on at runtime.


use std::borrow::Cow;

use hashlink::LinkedHashMap;

use crate::error::Error;

pub const DEFAULT_PREFIX: &str = "#{";
pub const DEFAULT_POSTFIX: &str = "}";

/// Variable values by name. A `None` value is replaced with an empty string.
///
/// Variables are applied in insertion order. When one placeholder can contain
/// another (e.g. names `a` and `ab` with an empty postfix) the result depends on
/// that order.
pub type Variables = LinkedHashMap<String, Option<String>>;

/// Receives diagnostics about a substitution run.
pub trait SubstitutionObserver {
    fn on_variables(&self, _prefix: &str, _postfix: &str, _env: &Variables) {}

    fn on_replaced(&self, _token: &str, _count: usize, _value: &str) {}
}

/// Replaces `#{name}` placeholders.
pub fn apply<'a>(text: Option<&'a str>, env: Option<&Variables>) -> Option<Cow<'a, str>> {
    Substitution::new().apply(text, env)
}

/// Replaces `{prefix}name{postfix}` placeholders.
///
/// Missing text or variables return the text as is. Otherwise both prefix and
/// postfix are required.
pub fn apply_with<'a>(
    text: Option<&'a str>,
    prefix: Option<&str>,
    postfix: Option<&str>,
    env: Option<&Variables>,
) -> Result<Option<Cow<'a, str>>, Error> {
    if is_noop(text, env) {
        return Ok(text.map(Cow::Borrowed));
    }
    let prefix = prefix.ok_or(Error::InvalidArgument("variable prefix required"))?;
    let postfix = postfix.ok_or(Error::InvalidArgument("variable postfix required"))?;

    let res = Substitution::with_syntax(prefix, postfix).apply(text, env);
    Ok(res)
}

pub struct Substitution<'o> {
    prefix: String,
    postfix: String,
    observer: Option<&'o dyn SubstitutionObserver>,
}

impl Default for Substitution<'_> {
    fn default() -> Self {
        Substitution::new()
    }
}

impl<'o> Substitution<'o> {
    pub fn new() -> Substitution<'o> {
        Substitution::with_syntax(DEFAULT_PREFIX, DEFAULT_POSTFIX)
    }

    pub fn with_syntax(prefix: impl Into<String>, postfix: impl Into<String>) -> Substitution<'o> {
        Substitution {
            prefix: prefix.into(),
            postfix: postfix.into(),
            observer: None,
        }
    }

    pub fn observer(mut self, observer: &'o dyn SubstitutionObserver) -> Substitution<'o> {
        self.observer = Some(observer);
        self
    }

    pub fn apply<'a>(&self, text: Option<&'a str>, env: Option<&Variables>) -> Option<Cow<'a, str>> {
        match (text, env) {
            (Some(text), Some(env)) if !is_noop(Some(text), Some(env)) => Some(self.replace(text, env)),
            _ => text.map(Cow::Borrowed),
        }
    }

    pub fn apply_str<'a>(&self, text: &'a str, env: &Variables) -> Cow<'a, str> {
        if is_noop(Some(text), Some(env)) {
            return Cow::Borrowed(text);
        }
        self.replace(text, env)
    }

    fn replace<'a>(&self, text: &'a str, env: &Variables) -> Cow<'a, str> {
        if tracing::enabled!(tracing::Level::DEBUG) {
            let vars = env
                .iter()
                .map(|(name, value)| format!("    {}={}", name, value.as_deref().unwrap_or("")))
                .collect::<Vec<_>>()
                .join("\n");
            tracing::debug!("Replacing variables in format '{}name{}' from: \n{}", self.prefix, self.postfix, vars);
        }
        if let Some(observer) = self.observer {
            observer.on_variables(&self.prefix, &self.postfix, env);
        }

        let mut res = Cow::Borrowed(text);
        for (name, value) in env {
            let token = format!("{}{}{}", self.prefix, name, self.postfix);
            // An empty token would insert the value between every character.
            if token.is_empty() {
                continue;
            }
            let value = value.as_deref().unwrap_or("");

            let count = res.matches(token.as_str()).count();
            if count == 0 {
                continue;
            }
            tracing::debug!("    {} ({}) replaced with: {}", token, count, value);
            if let Some(observer) = self.observer {
                observer.on_replaced(&token, count, value);
            }

            // Single literal pass, so the inserted value is never rescanned for this token.
            res = Cow::Owned(res.replace(token.as_str(), value));
        }
        res
    }
}

fn is_noop(text: Option<&str>, env: Option<&Variables>) -> bool {
    match (text, env) {
        (Some(text), Some(env)) => text.is_empty() || env.is_empty(),
        _ => true,
    }
}
