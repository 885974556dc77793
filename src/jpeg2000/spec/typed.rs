//! Option text to `SpecTable` parsers.

use tracing::debug;

use crate::error::ConfigError;

use super::options::tokenize;
use super::table::{SpecScope, SpecTable};

/// Build a table from option text with a caller supplied value parser.
///
/// With no text the table only holds the fallback as its default. Otherwise
/// every value is applied to its selection, then defaults are normalized with
/// the fallback used for cells the text left uncovered.
pub fn parse_spec<V, F>(
    option: &str,
    num_tiles: usize,
    num_components: usize,
    scope: SpecScope,
    text: Option<&str>,
    fallback: &str,
    parse_value: F,
) -> Result<SpecTable<V>, ConfigError>
where
    V: Clone,
    F: Fn(&str) -> Result<V, ConfigError>,
{
    let Some(text) = text else {
        return Ok(SpecTable::with_default(
            num_tiles,
            num_components,
            scope,
            parse_value(fallback)?,
        ));
    };

    let mut table = SpecTable::new(num_tiles, num_components, scope);
    for entry in tokenize(option, text, num_tiles, num_components, scope)? {
        let value = parse_value(&entry.value)?;
        // Tokenizer already bounded indices and checked the scope.
        table
            .apply(&entry.target, value)
            .map_err(|_| ConfigError::ScopeNotAllowed {
                option: option.to_string(),
                scope,
                token: entry.scope_text.clone(),
            })?;
    }
    table.normalize_defaults(|| parse_value(fallback))?;
    debug!(option, text, "parsed option");
    Ok(table)
}

pub fn parse_integer(option: &str, value: &str) -> Result<i32, ConfigError> {
    value.parse::<i32>().map_err(|_| ConfigError::InvalidValue {
        option: option.to_string(),
        value: value.to_string(),
    })
}

pub fn parse_float(option: &str, value: &str) -> Result<f32, ConfigError> {
    match value.parse::<f32>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ConfigError::InvalidValue {
            option: option.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Match `value` case-insensitively against `allowed`, returning the
/// canonical spelling.
pub fn parse_allowed(option: &str, value: &str, allowed: &[&str]) -> Result<String, ConfigError> {
    allowed
        .iter()
        .find(|a| a.eq_ignore_ascii_case(value))
        .map(|a| a.to_string())
        .ok_or_else(|| ConfigError::DisallowedValue {
            option: option.to_string(),
            value: value.to_string(),
            allowed: allowed.iter().map(|a| a.to_string()).collect(),
        })
}

pub fn parse_integer_spec(
    option: &str,
    num_tiles: usize,
    num_components: usize,
    scope: SpecScope,
    text: Option<&str>,
    fallback: &str,
) -> Result<SpecTable<i32>, ConfigError> {
    parse_spec(option, num_tiles, num_components, scope, text, fallback, |v| {
        parse_integer(option, v)
    })
}

pub fn parse_float_spec(
    option: &str,
    num_tiles: usize,
    num_components: usize,
    scope: SpecScope,
    text: Option<&str>,
    fallback: &str,
) -> Result<SpecTable<f32>, ConfigError> {
    parse_spec(option, num_tiles, num_components, scope, text, fallback, |v| {
        parse_float(option, v)
    })
}

/// String table whose every literal, the fallback included, must be one of
/// `allowed`.
pub fn parse_string_spec(
    option: &str,
    num_tiles: usize,
    num_components: usize,
    scope: SpecScope,
    text: Option<&str>,
    fallback: &str,
    allowed: &[&str],
) -> Result<SpecTable<String>, ConfigError> {
    parse_spec(option, num_tiles, num_components, scope, text, fallback, |v| {
        parse_allowed(option, v, allowed)
    })
}
