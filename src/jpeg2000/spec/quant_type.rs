use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::constants::{
    DEFAULT_QUANT_TYPE_LOSSLESS, DEFAULT_QUANT_TYPE_LOSSY, OPT_QUANT_TYPE, QUANT_TYPE_VALUES,
};
use crate::error::{ConfigError, ContractViolation};

use super::table::{SpecScope, SpecTable};
use super::typed::{parse_allowed, parse_spec};

/// Scalar quantization mode. The discriminant is the Sqcd style value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum QuantizationType {
    Reversible = 0,
    Derived = 1,
    Expounded = 2,
}

impl QuantizationType {
    pub fn name(self) -> &'static str {
        match self {
            QuantizationType::Reversible => "reversible",
            QuantizationType::Derived => "derived",
            QuantizationType::Expounded => "expounded",
        }
    }

    fn parse(value: &str) -> Result<Self, ConfigError> {
        match parse_allowed(OPT_QUANT_TYPE, value, &QUANT_TYPE_VALUES)?.as_str() {
            "reversible" => Ok(QuantizationType::Reversible),
            "derived" => Ok(QuantizationType::Derived),
            _ => Ok(QuantizationType::Expounded),
        }
    }
}

impl fmt::Display for QuantizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Quantization type of every tile-component.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantTypeSpec {
    table: SpecTable<QuantizationType>,
}

impl QuantTypeSpec {
    /// Lossless coding defaults every cell to reversible and rejects any
    /// other explicit choice.
    pub fn parse(
        num_tiles: usize,
        num_components: usize,
        text: Option<&str>,
        lossless: bool,
    ) -> Result<Self, ConfigError> {
        let fallback = if lossless {
            DEFAULT_QUANT_TYPE_LOSSLESS
        } else {
            DEFAULT_QUANT_TYPE_LOSSY
        };
        let table = parse_spec(
            OPT_QUANT_TYPE,
            num_tiles,
            num_components,
            SpecScope::TileAndComponent,
            text,
            fallback,
            QuantizationType::parse,
        )?;
        if lossless {
            if let Some((tile, component, _)) = table
                .cells()
                .find(|(_, _, q)| q.is_some_and(|q| *q != QuantizationType::Reversible))
            {
                return Err(ConfigError::LosslessNotReversible { tile, component });
            }
        }
        Ok(Self { table })
    }

    pub fn table(&self) -> &SpecTable<QuantizationType> {
        &self.table
    }

    pub fn get(&self, t: usize, c: usize) -> Result<QuantizationType, ContractViolation> {
        self.table.resolve("quantization type", t, c).copied()
    }

    pub fn is_reversible(&self, t: usize, c: usize) -> Result<bool, ContractViolation> {
        Ok(self.get(t, c)? == QuantizationType::Reversible)
    }

    pub fn is_derived(&self, t: usize, c: usize) -> Result<bool, ContractViolation> {
        Ok(self.get(t, c)? == QuantizationType::Derived)
    }

    /// True when every tile-component is quantized reversibly.
    pub fn is_fully_reversible(&self) -> bool {
        self.table
            .cells()
            .all(|(_, _, q)| q == Some(&QuantizationType::Reversible))
    }

    /// True when no tile-component is quantized reversibly.
    pub fn is_fully_non_reversible(&self) -> bool {
        self.table
            .cells()
            .all(|(_, _, q)| q.is_some_and(|q| *q != QuantizationType::Reversible))
    }
}
