//! 16-bit exponent/mantissa step size codec (ISO/IEC 15444-1, A.6.4).

use tracing::warn;

use crate::constants::{QSTEP_MANTISSA_BITS, QSTEP_MAX_EXPONENT, QSTEP_MAX_MANTISSA};

/// Encode a step size as `exponent << 11 | mantissa`.
///
/// Steps below 2^-31 do not fit the 5-bit exponent and clamp to it; steps
/// of 2 or more clamp to the largest mantissa with a zero exponent.
pub fn encode_step(step: f32) -> u16 {
    let exp = (-(step as f64).log2()).ceil() as i32;
    if exp > QSTEP_MAX_EXPONENT as i32 {
        warn!(step, "quantization step too small, clamped");
        return QSTEP_MAX_EXPONENT << QSTEP_MANTISSA_BITS;
    }
    if exp < 0 {
        warn!(step, "quantization step too large, clamped");
        return QSTEP_MAX_MANTISSA;
    }
    let scaled = step * (1u64 << exp) as f32;
    let mantissa = ((scaled - 1.0) * (1 << QSTEP_MANTISSA_BITS) as f32 + 0.5) as i64;
    if mantissa > QSTEP_MAX_MANTISSA as i64 {
        // Rounded up to the next power of two.
        if exp > 0 {
            return ((exp - 1) as u16) << QSTEP_MANTISSA_BITS;
        }
        return QSTEP_MAX_MANTISSA;
    }
    ((exp as u16) << QSTEP_MANTISSA_BITS) | mantissa.max(0) as u16
}

/// Expand an encoded step size.
pub fn decode_step(encoded: u16) -> f32 {
    let exp = (encoded >> QSTEP_MANTISSA_BITS) & QSTEP_MAX_EXPONENT;
    let mantissa = encoded & QSTEP_MAX_MANTISSA;
    ((-1.0 - mantissa as f64 / (1 << QSTEP_MANTISSA_BITS) as f64) / (-1i64 << exp) as f64) as f32
}

/// Exponent-only entry used by reversible quantization.
pub fn encode_reversible(range_bits: i32) -> u16 {
    (range_bits.clamp(0, QSTEP_MAX_EXPONENT as i32) as u16) << 3
}
