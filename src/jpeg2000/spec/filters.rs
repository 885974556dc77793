use std::fmt;

use crate::constants::{FILTER_VALUES, OPT_FILTERS};
use crate::error::{ConfigError, ContractViolation, Error};

use super::options::tokenize;
use super::quant_type::{QuantTypeSpec, QuantizationType};
use super::table::{SpecScope, SpecTable, SpecTag};
use super::typed::parse_allowed;

/// Wavelet filter bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaveletFilter {
    /// Integer 5/3, reversible.
    W5x3,
    /// Floating point 9/7, irreversible.
    W9x7,
}

impl WaveletFilter {
    pub fn is_reversible(self) -> bool {
        self == WaveletFilter::W5x3
    }

    /// Filter a tile-component gets when none is requested.
    pub fn for_quantization(q: QuantizationType) -> Self {
        if q == QuantizationType::Reversible {
            WaveletFilter::W5x3
        } else {
            WaveletFilter::W9x7
        }
    }

    fn parse(value: &str) -> Result<Self, ConfigError> {
        match parse_allowed(OPT_FILTERS, value, &FILTER_VALUES)?.as_str() {
            "w5x3" => Ok(WaveletFilter::W5x3),
            _ => Ok(WaveletFilter::W9x7),
        }
    }
}

impl fmt::Display for WaveletFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaveletFilter::W5x3 => write!(f, "w5x3"),
            WaveletFilter::W9x7 => write!(f, "w9x7"),
        }
    }
}

/// Anything that can tell which filter bank a tile-component uses.
pub trait FilterKindSource {
    fn filter(&self, tile: usize, component: usize) -> Result<WaveletFilter, ContractViolation>;
}

/// Filter bank of every tile-component.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    table: SpecTable<WaveletFilter>,
}

impl FilterSpec {
    /// Cells the option text leaves open follow their quantization type.
    /// An irreversible filter on a reversibly quantized cell is rejected.
    pub fn parse(
        num_tiles: usize,
        num_components: usize,
        text: Option<&str>,
        quant_types: &QuantTypeSpec,
    ) -> Result<Self, Error> {
        let mut table = SpecTable::new(num_tiles, num_components, SpecScope::TileAndComponent);
        if let Some(text) = text {
            for entry in tokenize(
                OPT_FILTERS,
                text,
                num_tiles,
                num_components,
                SpecScope::TileAndComponent,
            )? {
                table.apply(&entry.target, WaveletFilter::parse(&entry.value)?)?;
            }
        }

        if table.default().is_none() {
            let default = quant_types
                .table()
                .default()
                .map_or(WaveletFilter::W5x3, |&q| WaveletFilter::for_quantization(q));
            table.set_default(default);
            for t in 0..num_tiles {
                for c in 0..num_components {
                    if table.tag(t, c) != SpecTag::Default {
                        continue;
                    }
                    let filter = WaveletFilter::for_quantization(quant_types.get(t, c)?);
                    if filter != default {
                        table.set_tile_component(t, c, filter)?;
                    }
                }
            }
        }

        for t in 0..num_tiles {
            for c in 0..num_components {
                let filter = *table.resolve("filter", t, c)?;
                if quant_types.is_reversible(t, c)? && !filter.is_reversible() {
                    return Err(ConfigError::IrreversibleFilter {
                        tile: t,
                        component: c,
                        filter,
                    }
                    .into());
                }
            }
        }
        Ok(Self { table })
    }

    pub fn table(&self) -> &SpecTable<WaveletFilter> {
        &self.table
    }
}

impl FilterKindSource for FilterSpec {
    fn filter(&self, tile: usize, component: usize) -> Result<WaveletFilter, ContractViolation> {
        self.table.resolve("filter", tile, component).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_quantization() {
        let quant = QuantTypeSpec::parse(2, 2, Some("t1 c0 reversible"), false).unwrap();
        let filters = FilterSpec::parse(2, 2, None, &quant).unwrap();
        assert_eq!(filters.filter(0, 0).unwrap(), WaveletFilter::W9x7);
        assert_eq!(filters.filter(1, 0).unwrap(), WaveletFilter::W5x3);
        assert_eq!(filters.filter(1, 1).unwrap(), WaveletFilter::W9x7);
    }

    #[test]
    fn test_explicit_filters() {
        let quant = QuantTypeSpec::parse(1, 3, None, false).unwrap();
        let filters = FilterSpec::parse(1, 3, Some("c2 w5x3"), &quant).unwrap();
        assert_eq!(filters.filter(0, 2).unwrap(), WaveletFilter::W5x3);
        assert_eq!(filters.filter(0, 1).unwrap(), WaveletFilter::W9x7);
    }

    #[test]
    fn test_irreversible_filter_with_reversible_quantization() {
        let quant = QuantTypeSpec::parse(1, 1, None, true).unwrap();
        let err = FilterSpec::parse(1, 1, Some("W9X7"), &quant).unwrap_err();
        assert_eq!(
            err,
            Error::Config(ConfigError::IrreversibleFilter {
                tile: 0,
                component: 0,
                filter: WaveletFilter::W9x7
            })
        );
    }

    #[test]
    fn test_unknown_filter() {
        let quant = QuantTypeSpec::parse(1, 1, None, false).unwrap();
        assert!(matches!(
            FilterSpec::parse(1, 1, Some("haar"), &quant),
            Err(Error::Config(ConfigError::DisallowedValue { .. }))
        ));
    }
}
