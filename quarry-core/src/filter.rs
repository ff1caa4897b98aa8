use crate::{Result, UnknownFilterError, Value};
use regex::{Regex, RegexBuilder};
use std::fmt;

/// Context a filter chain runs against. Named filters that do not match a
/// built-in fall back to a capability looked up here; custom callables
/// receive the context as their first argument.
pub trait FilterContext {
    /// Invoke the capability `name` with the original, uncoerced value.
    /// `None` when the context exposes no such capability.
    fn call_filter(&self, name: &str, value: &Value) -> Option<Value> {
        let _ = (name, value);
        None
    }
}

/// The empty context, for chains built purely from built-ins.
impl FilterContext for () {}

pub type CustomFilter = Box<dyn Fn(&dyn FilterContext, &str) -> Value + Send + Sync>;

/// One transformation applied to a single value.
pub enum Filter {
    /// A built-in (`trim`, `ltrim`, `rtrim`, `uppercase`, `lowercase`)
    /// applied to the text form, or a capability of the context applied to
    /// the original value.
    Named(String),
    /// Every match of the pattern is removed from the text form.
    Pattern(Regex),
    /// Search and replace over the text form.
    Replace {
        search: Regex,
        replacement: String,
        /// Replace every occurrence instead of the first.
        global: bool,
    },
    /// Caller supplied transformation over the text form.
    Custom(CustomFilter),
}

impl Filter {
    pub fn named(name: impl Into<String>) -> Self {
        Filter::Named(name.into())
    }

    pub fn pattern(search: &str) -> Result<Self> {
        Ok(Filter::Pattern(Regex::new(search)?))
    }

    /// Build a replace directive from its `{search, replacement, flags}`
    /// form. Recognized flags: `i` case-insensitive, `g` all occurrences.
    pub fn replace(search: &str, replacement: impl Into<String>, flags: &str) -> Result<Self> {
        let search = RegexBuilder::new(search)
            .case_insensitive(flags.contains('i'))
            .build()?;
        Ok(Filter::Replace {
            search,
            replacement: replacement.into(),
            global: flags.contains('g'),
        })
    }

    pub fn custom(f: impl Fn(&dyn FilterContext, &str) -> Value + Send + Sync + 'static) -> Self {
        Filter::Custom(Box::new(f))
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Named(name) => write!(f, "Named({:?})", name),
            Filter::Pattern(search) => write!(f, "Pattern(/{}/)", search),
            Filter::Replace {
                search,
                replacement,
                global,
            } => write!(f, "Replace(/{}/ -> {:?}, global: {})", search, replacement, global),
            Filter::Custom(..) => f.write_str("Custom(..)"),
        }
    }
}

/// Apply an ordered filter chain to `value`, threading the result of each
/// filter into the next.
pub fn apply_filters(value: &Value, filters: &[Filter], context: &dyn FilterContext) -> Result<Value> {
    let mut value = value.clone();
    for filter in filters {
        value = apply_filter(&value, filter, context)?;
    }
    Ok(value)
}

/// Resolve and apply a single filter.
pub fn apply_filter(value: &Value, filter: &Filter, context: &dyn FilterContext) -> Result<Value> {
    let text = value.to_text();
    Ok(match filter {
        Filter::Named(name) => match name.as_str() {
            "trim" => Value::Text(text.trim().into()),
            "ltrim" => Value::Text(text.trim_start().into()),
            "rtrim" => Value::Text(text.trim_end().into()),
            "uppercase" => Value::Text(text.to_uppercase()),
            "lowercase" => Value::Text(text.to_lowercase()),
            // The capability gets the original value, not the text form.
            _ => context
                .call_filter(name, value)
                .ok_or_else(|| UnknownFilterError(name.clone()))?,
        },
        Filter::Pattern(search) => Value::Text(search.replace_all(&text, "").into_owned()),
        Filter::Replace {
            search,
            replacement,
            global,
        } => Value::Text(if *global {
            search.replace_all(&text, replacement.as_str()).into_owned()
        } else {
            search.replace(&text, replacement.as_str()).into_owned()
        }),
        Filter::Custom(f) => f(context, &text),
    })
}
