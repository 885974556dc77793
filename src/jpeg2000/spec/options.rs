//! Tokenizer for the per tile-component option language.
//!
//! ```text
//! "t0,3-4 c0-2 reversible t9 derived expounded"
//! ```
//!
//! `t…` and `c…` tokens select tiles and components for the next value
//! token only. A value with no pending selection is the global default.

use crate::error::ConfigError;

use super::index_set::IndexSet;
use super::table::{SpecScope, SpecTarget};

/// One value of an option together with the cells it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionEntry {
    pub target: SpecTarget,
    pub value: String,
    /// Scope tokens that produced `target`, space separated, for diagnostics.
    pub scope_text: String,
}

fn is_scope_token(token: &str, lead: char) -> bool {
    let mut chars = token.chars();
    chars.next() == Some(lead) && chars.all(|ch| ch.is_ascii_digit() || ch == ',' || ch == '-')
}

/// Split option text into targeted values.
///
/// Scope tokens are checked against `scope`: a tile selection on a
/// component only option, or the reverse, is rejected.
pub fn tokenize(
    option: &str,
    text: &str,
    num_tiles: usize,
    num_components: usize,
    scope: SpecScope,
) -> Result<Vec<OptionEntry>, ConfigError> {
    let mut entries = Vec::new();
    let mut tiles: Option<(IndexSet, &str)> = None;
    let mut components: Option<(IndexSet, &str)> = None;

    for token in text.split_whitespace() {
        if is_scope_token(token, 't') {
            if !scope.allows_tiles() {
                return Err(ConfigError::ScopeNotAllowed {
                    option: option.to_string(),
                    scope,
                    token: token.to_string(),
                });
            }
            tiles = Some((IndexSet::parse(&token[1..], num_tiles)?, token));
            continue;
        }
        if is_scope_token(token, 'c') {
            if !scope.allows_components() {
                return Err(ConfigError::ScopeNotAllowed {
                    option: option.to_string(),
                    scope,
                    token: token.to_string(),
                });
            }
            components = Some((IndexSet::parse(&token[1..], num_components)?, token));
            continue;
        }

        let (target, scope_text) = match (tiles.take(), components.take()) {
            (None, None) => (SpecTarget::Default, String::new()),
            (Some((t, tt)), None) => (SpecTarget::Tiles(t), tt.to_string()),
            (None, Some((c, ct))) => (SpecTarget::Components(c), ct.to_string()),
            (Some((t, tt)), Some((c, ct))) => {
                (SpecTarget::TileComponents(t, c), format!("{tt} {ct}"))
            }
        };
        entries.push(OptionEntry {
            target,
            value: token.to_string(),
            scope_text,
        });
    }

    if let Some((_, token)) = tiles.or(components) {
        return Err(ConfigError::DanglingScope {
            option: option.to_string(),
            token: token.to_string(),
        });
    }
    Ok(entries)
}
