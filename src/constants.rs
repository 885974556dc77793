// Step size exponent/mantissa layout as defined in ISO/IEC 15444-1, A.6.4 (SPqcd).
pub const QSTEP_MANTISSA_BITS: u32 = 11;
// The conversion formulas do not support more than 5 exponent bits, otherwise (-1 << exp) overflows.
pub const QSTEP_EXPONENT_BITS: u32 = 5;
pub const QSTEP_MAX_MANTISSA: u16 = (1 << QSTEP_MANTISSA_BITS) - 1;
pub const QSTEP_MAX_EXPONENT: u16 = (1 << QSTEP_EXPONENT_BITS) - 1;

// Sqcd/Sqcc: quantization style in the lower 5 bits, guard bits above.
pub const QUANT_STYLE_MASK: u8 = 0x1f;
pub const QUANT_STYLE_GUARD_BITS_SHIFT: u32 = 5;
// Three bits of Sqcd hold the number of guard bits.
pub const MAXIMUM_GUARD_BITS: i64 = 7;

// Option names, used in diagnostics.
pub const OPT_QUANT_TYPE: &str = "Qtype";
pub const OPT_QUANT_STEP: &str = "Qstep";
pub const OPT_GUARD_BITS: &str = "Qguard_bits";
pub const OPT_FILTERS: &str = "Ffilters";
pub const OPT_COMPONENT_TRANSFORM: &str = "Mct";
pub const OPT_DECOMPOSITION_LEVELS: &str = "Wlev";

// Fallback values used when an option leaves some tile-components unspecified.
pub const DEFAULT_GUARD_BITS: &str = "2";
pub const DEFAULT_QUANT_STEP: &str = "0.0078125";
pub const DEFAULT_DECOMPOSITION_LEVELS: &str = "5";
pub const DEFAULT_QUANT_TYPE_LOSSLESS: &str = "reversible";
pub const DEFAULT_QUANT_TYPE_LOSSY: &str = "expounded";

pub const QUANT_TYPE_VALUES: [&str; 3] = ["reversible", "derived", "expounded"];
pub const FILTER_VALUES: [&str; 2] = ["w5x3", "w9x7"];
pub const COMPONENT_TRANSFORM_VALUES: [&str; 2] = ["on", "off"];

// The 5 bit exponent field of COD/COC limits the number of decompositions (A.6.1).
pub const MAXIMUM_DECOMPOSITION_LEVELS: i64 = 32;

// Nominal code-block size, 2^6 = 64 in both directions.
pub const DEFAULT_CODE_BLOCK_SIZE: usize = 64;

// Number of leading components involved in RCT/ICT.
pub const MCT_COMPONENT_COUNT: usize = 3;
