//! Tile-component parameter resolution.
//!
//! Every encoder parameter is held in a [`SpecTable`], which resolves a value
//! for each (tile, component) pair from four layers of increasing priority:
//! the global default, per-component defaults, per-tile defaults and
//! explicit per tile-component values. Tables are filled from option strings
//! such as `"t0,3-4 c0-2 reversible t9 derived"` and are read-only once the
//! encoder is configured.

pub mod comp_transf;
pub mod encoder_specs;
pub mod filters;
pub mod index_set;
pub mod numeric;
pub mod options;
pub mod quant_type;
pub mod table;
pub mod typed;

pub use comp_transf::{ComponentTransform, ComponentTransformSpec};
pub use encoder_specs::{EncoderOptions, EncoderSpecs};
pub use filters::{FilterKindSource, FilterSpec, WaveletFilter};
pub use index_set::IndexSet;
pub use numeric::{DecompositionLevelsSpec, GuardBitsSpec, QuantStepSizeSpec};
pub use options::{OptionEntry, tokenize};
pub use quant_type::{QuantTypeSpec, QuantizationType};
pub use table::{SpecScope, SpecTable, SpecTag, SpecTarget};
pub use typed::{parse_float_spec, parse_integer_spec, parse_spec, parse_string_spec};
