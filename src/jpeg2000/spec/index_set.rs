//! Tile and component index sets of the option language ("t0,3-5", "c2").

use crate::error::ConfigError;

/// Membership set over `0..max_index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSet {
    members: Vec<bool>,
}

impl IndexSet {
    /// Parse the body of an index token, the leading `t`/`c` already stripped.
    ///
    /// Indices are separated by `,` or joined by `-` into inclusive ranges. A
    /// range is closed by whichever index follows the dash, so `"1-3-5"`
    /// selects 1 through 5 and `"5-2"` selects only 2 and 5.
    pub fn parse(expr: &str, max_index: usize) -> Result<Self, ConfigError> {
        let mut members = vec![false; max_index];
        let mut idx: Option<usize> = None;
        let mut last_idx: Option<usize> = None;
        let mut is_dash = false;

        for ch in expr.chars() {
            if let Some(digit) = ch.to_digit(10) {
                let value = idx
                    .unwrap_or(0)
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(digit as usize))
                    .ok_or_else(|| ConfigError::IndexOutOfRange {
                        token: expr.to_string(),
                        index: usize::MAX,
                        max: max_index,
                    })?;
                idx = Some(value);
                continue;
            }

            let current = match (idx, ch) {
                (Some(current), ',' | '-') => current,
                _ => {
                    return Err(ConfigError::MalformedIndexSet {
                        token: expr.to_string(),
                    });
                }
            };
            Self::close(&mut members, expr, current, last_idx, is_dash)?;
            is_dash = ch == '-';
            last_idx = Some(current);
            idx = None;
        }

        let current = idx.ok_or_else(|| ConfigError::MalformedIndexSet {
            token: expr.to_string(),
        })?;
        Self::close(&mut members, expr, current, last_idx, is_dash)?;

        Ok(Self { members })
    }

    fn close(
        members: &mut [bool],
        expr: &str,
        idx: usize,
        last_idx: Option<usize>,
        is_dash: bool,
    ) -> Result<(), ConfigError> {
        if idx >= members.len() {
            return Err(ConfigError::IndexOutOfRange {
                token: expr.to_string(),
                index: idx,
                max: members.len(),
            });
        }
        if is_dash {
            let start = last_idx.map_or(0, |l| l + 1);
            for member in members.iter_mut().take(idx).skip(start) {
                *member = true;
            }
        }
        members[idx] = true;
        Ok(())
    }

    pub fn contains(&self, index: usize) -> bool {
        self.members.get(index).copied().unwrap_or(false)
    }

    /// Selected indices in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.members
            .iter()
            .enumerate()
            .filter_map(|(i, &m)| if m { Some(i) } else { None })
    }

    pub fn len(&self) -> usize {
        self.members.iter().filter(|&&m| m).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.members.iter().any(|&m| m)
    }

    /// Size of the universe the set was parsed against.
    pub fn max_index(&self) -> usize {
        self.members.len()
    }
}
