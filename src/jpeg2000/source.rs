//! Pull interfaces between the wavelet transform, the quantizer and the
//! entropy coder.

use crate::error::{ContractViolation, Error};
use crate::jpeg2000::code_block::CodeBlock;
use crate::jpeg2000::subband::SubbandTree;

/// Sample representation of a tile-component's coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Int,
    Float,
}

/// Tile navigation shared by every stage of the chain.
///
/// Changing tile resets the per-tile state of the stage, including the
/// code-block cursors of every component.
pub trait Tiled {
    fn num_tiles(&self) -> usize;

    /// Tile grid as (columns, rows).
    fn tile_grid(&self) -> (usize, usize);

    fn tile_index(&self) -> usize;

    fn set_tile(&mut self, x: usize, y: usize) -> Result<(), Error>;

    /// Advance to the next tile in raster order.
    fn next_tile(&mut self) -> Result<(), Error>;
}

/// Source of wavelet coefficients, one code-block at a time.
///
/// Each code-block of the current tile is handed out once per component
/// whichever sample type is asked for; afterwards `None` is returned until
/// the tile changes. A block passed back in as `reuse` has its allocation
/// recycled.
pub trait CodeBlockSource: Tiled {
    fn num_components(&self) -> usize;

    fn data_type(&self, c: usize) -> Result<DataType, ContractViolation>;

    /// Nominal dynamic range of component `c` of the current tile, in bits.
    fn nominal_range_bits(&self, c: usize) -> Result<u32, ContractViolation>;

    /// Fractional bits of integer coefficients, 0 for float data.
    fn fixed_point_position(&self, c: usize) -> Result<i32, ContractViolation>;

    fn subband_tree(&self, c: usize) -> Result<&SubbandTree, ContractViolation>;

    fn subband_tree_mut(&mut self, c: usize) -> Result<&mut SubbandTree, ContractViolation>;

    fn next_int_code_block(
        &mut self,
        c: usize,
        reuse: Option<CodeBlock<i32>>,
    ) -> Result<Option<CodeBlock<i32>>, ContractViolation>;

    fn next_float_code_block(
        &mut self,
        c: usize,
        reuse: Option<CodeBlock<f32>>,
    ) -> Result<Option<CodeBlock<f32>>, ContractViolation>;
}
