//! Guard bits, base step size and decomposition level tables.

use crate::constants::{
    DEFAULT_DECOMPOSITION_LEVELS, DEFAULT_GUARD_BITS, DEFAULT_QUANT_STEP,
    MAXIMUM_DECOMPOSITION_LEVELS, MAXIMUM_GUARD_BITS, OPT_DECOMPOSITION_LEVELS, OPT_GUARD_BITS, OPT_QUANT_STEP,
};
use crate::error::{ConfigError, ContractViolation};

use super::table::{SpecScope, SpecTable};
use super::typed::{parse_float, parse_integer, parse_spec};

#[derive(Debug, Clone, PartialEq)]
pub struct GuardBitsSpec {
    table: SpecTable<i32>,
}

impl GuardBitsSpec {
    pub fn parse(
        num_tiles: usize,
        num_components: usize,
        text: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let table = parse_spec(
            OPT_GUARD_BITS,
            num_tiles,
            num_components,
            SpecScope::TileAndComponent,
            text,
            DEFAULT_GUARD_BITS,
            |v| {
                let bits = parse_integer(OPT_GUARD_BITS, v)?;
                if bits <= 0 {
                    return Err(ConfigError::NonPositive {
                        option: OPT_GUARD_BITS.to_string(),
                        value: v.to_string(),
                    });
                }
                if bits as i64 > MAXIMUM_GUARD_BITS {
                    return Err(ConfigError::OutOfRange {
                        option: OPT_GUARD_BITS.to_string(),
                        value: bits as i64,
                        min: 1,
                        max: MAXIMUM_GUARD_BITS,
                    });
                }
                Ok(bits)
            },
        )?;
        Ok(Self { table })
    }

    pub fn get(&self, t: usize, c: usize) -> Result<i32, ContractViolation> {
        self.table.resolve("guard bits", t, c).copied()
    }

    pub fn table(&self) -> &SpecTable<i32> {
        &self.table
    }
}

/// Base step size, relative to a unit nominal dynamic range.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantStepSizeSpec {
    table: SpecTable<f32>,
}

impl QuantStepSizeSpec {
    pub fn parse(
        num_tiles: usize,
        num_components: usize,
        text: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let table = parse_spec(
            OPT_QUANT_STEP,
            num_tiles,
            num_components,
            SpecScope::TileAndComponent,
            text,
            DEFAULT_QUANT_STEP,
            |v| {
                let step = parse_float(OPT_QUANT_STEP, v)?;
                if step <= 0.0 {
                    return Err(ConfigError::NonPositive {
                        option: OPT_QUANT_STEP.to_string(),
                        value: v.to_string(),
                    });
                }
                Ok(step)
            },
        )?;
        Ok(Self { table })
    }

    pub fn get(&self, t: usize, c: usize) -> Result<f32, ContractViolation> {
        self.table.resolve("quantization step", t, c).copied()
    }

    pub fn table(&self) -> &SpecTable<f32> {
        &self.table
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecompositionLevelsSpec {
    table: SpecTable<i32>,
}

impl DecompositionLevelsSpec {
    pub fn parse(
        num_tiles: usize,
        num_components: usize,
        text: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let table = parse_spec(
            OPT_DECOMPOSITION_LEVELS,
            num_tiles,
            num_components,
            SpecScope::TileAndComponent,
            text,
            DEFAULT_DECOMPOSITION_LEVELS,
            |v| {
                let levels = parse_integer(OPT_DECOMPOSITION_LEVELS, v)?;
                if !(0..=MAXIMUM_DECOMPOSITION_LEVELS).contains(&(levels as i64)) {
                    return Err(ConfigError::OutOfRange {
                        option: OPT_DECOMPOSITION_LEVELS.to_string(),
                        value: levels as i64,
                        min: 0,
                        max: MAXIMUM_DECOMPOSITION_LEVELS,
                    });
                }
                Ok(levels)
            },
        )?;
        Ok(Self { table })
    }

    pub fn get(&self, t: usize, c: usize) -> Result<usize, ContractViolation> {
        self.table
            .resolve("decomposition levels", t, c)
            .map(|&l| l as usize)
    }

    /// Deepest decomposition used by any tile-component.
    pub fn max_levels(&self) -> usize {
        self.table.max_value().map_or(0, |&l| l as usize)
    }

    pub fn min_levels(&self) -> usize {
        self.table.min_value().map_or(0, |&l| l as usize)
    }

    pub fn table(&self) -> &SpecTable<i32> {
        &self.table
    }
}
