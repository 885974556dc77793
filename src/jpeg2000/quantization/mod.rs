//! Scalar quantization (Annex E).
//!
//! A quantizer sits between the wavelet stage and the entropy coder. It
//! pulls code-blocks from a [`CodeBlockSource`](crate::jpeg2000::source::CodeBlockSource)
//! and returns them in sign-magnitude form: bit 31 holds the sign and the
//! `magbits` bits below it the magnitude, most significant bit first.

pub mod scalar;
pub mod step_size;

pub use scalar::ScalarQuantizer;
pub use step_size::{decode_step, encode_reversible, encode_step};

use crate::error::ContractViolation;
use crate::jpeg2000::code_block::CodeBlock;
use crate::jpeg2000::image::QuantizationHeader;
use crate::jpeg2000::source::Tiled;

pub trait Quantizer: Tiled {
    fn num_components(&self) -> usize;

    fn num_guard_bits(&self, t: usize, c: usize) -> Result<i32, ContractViolation>;

    fn is_reversible(&self, t: usize, c: usize) -> Result<bool, ContractViolation>;

    fn is_derived(&self, t: usize, c: usize) -> Result<bool, ContractViolation>;

    /// Largest `magbits` of any code-block of component `c` in the current
    /// tile.
    fn max_magnitude_bits(&mut self, c: usize) -> Result<i32, ContractViolation>;

    /// Next quantized code-block of component `c`, or `None` once the tile
    /// has been exhausted. `reuse` recycles a previously returned block.
    fn next_code_block(
        &mut self,
        c: usize,
        reuse: Option<CodeBlock<i32>>,
    ) -> Result<Option<CodeBlock<i32>>, ContractViolation>;

    /// Like `next_code_block`, but the block stays owned by the quantizer and
    /// is overwritten by the next call.
    fn next_intern_code_block(
        &mut self,
        c: usize,
    ) -> Result<Option<&CodeBlock<i32>>, ContractViolation>;

    /// QCD/QCC content for component `c` of the current tile.
    fn quantization_header(&self, c: usize) -> Result<QuantizationHeader, ContractViolation>;
}
