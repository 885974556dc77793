//! JPEG 2000 quantization pipeline
//!
//! Ties together image tiling, the multiple component transform, the
//! wavelet transform and scalar quantization, and feeds the resulting
//! sign-magnitude code-blocks to a caller supplied sink in place of an
//! entropy coder.

use tracing::info;

use super::code_block::{CodeBlock, magnitude};
use super::image::{Image, QuantizationHeader, TileGrid};
use super::quantization::{Quantizer, ScalarQuantizer};
use super::source::{CodeBlockSource, Tiled};
use super::spec::{
    ComponentTransform, EncoderOptions, EncoderSpecs, FilterKindSource, QuantizationType,
    WaveletFilter,
};
use super::wavelet::ForwardWavelet;
use crate::error::Error;

/// What happened to one tile-component.
#[derive(Debug, Clone, PartialEq)]
pub struct TileComponentSummary {
    pub tile: usize,
    pub component: usize,
    pub quant_type: QuantizationType,
    pub filter: WaveletFilter,
    pub component_transform: ComponentTransform,
    pub decomposition_levels: usize,
    pub guard_bits: i32,
    /// Nominal range after the component transform.
    pub range_bits: u32,
    pub max_magnitude_bits: i32,
    pub code_blocks: usize,
    pub nonzero_coefficients: usize,
    pub header: QuantizationHeader,
}

/// JPEG 2000 quantization front end
#[derive(Debug, Clone, Default)]
pub struct QuantizationPipeline {
    options: EncoderOptions,
}

impl QuantizationPipeline {
    pub fn new(options: EncoderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    /// Select lossless coding: reversible quantization and the 5/3 filter
    /// unless overridden.
    pub fn set_lossless(&mut self, lossless: bool) {
        self.options.lossless = lossless;
    }

    /// Set the nominal tile size, `None` for a single tile.
    pub fn set_tile_size(&mut self, tile_size: Option<(usize, usize)>) {
        self.options.tile_size = tile_size;
    }

    /// Set the nominal code-block size
    pub fn set_code_block_size(&mut self, width: usize, height: usize) {
        self.options.code_block_width = width;
        self.options.code_block_height = height;
    }

    /// Quantize every tile-component of `image`.
    ///
    /// `sink` receives `(tile, component, block)` for each code-block in
    /// pull order. The block is only valid for the duration of the call.
    pub fn run<F>(&self, image: &Image, mut sink: F) -> Result<Vec<TileComponentSummary>, Error>
    where
        F: FnMut(usize, usize, &CodeBlock<i32>),
    {
        let grid = TileGrid::new(image.width, image.height, self.options.tile_size)?;
        let specs =
            EncoderSpecs::from_options(grid.num_tiles(), image.num_components(), &self.options)?;
        let source = ForwardWavelet::new(
            image,
            &specs,
            grid,
            (self.options.code_block_width, self.options.code_block_height),
        )?;
        let mut quantizer = ScalarQuantizer::new(source, &specs)?;

        let mut summaries = Vec::with_capacity(grid.num_tiles() * image.num_components());
        for t in 0..quantizer.num_tiles() {
            if t > 0 {
                quantizer.next_tile()?;
            }
            info!(
                tile = t,
                num_tiles = quantizer.num_tiles(),
                "quantizing tile"
            );

            for c in 0..Quantizer::num_components(&quantizer) {
                let mut code_blocks = 0;
                let mut nonzero_coefficients = 0;
                while let Some(blk) = quantizer.next_intern_code_block(c)? {
                    code_blocks += 1;
                    nonzero_coefficients += (0..blk.h)
                        .map(|y| blk.row(y).iter().filter(|&&v| magnitude(v) != 0).count())
                        .sum::<usize>();
                    sink(t, c, blk);
                }

                summaries.push(TileComponentSummary {
                    tile: t,
                    component: c,
                    quant_type: specs.quant_types.get(t, c)?,
                    filter: specs.filters.filter(t, c)?,
                    component_transform: specs.component_transforms.get(t)?,
                    decomposition_levels: specs.decomposition_levels.get(t, c)?,
                    guard_bits: quantizer.num_guard_bits(t, c)?,
                    range_bits: quantizer.source().nominal_range_bits(c)?,
                    max_magnitude_bits: quantizer.max_magnitude_bits(c)?,
                    code_blocks,
                    nonzero_coefficients,
                    header: quantizer.quantization_header(c)?,
                });
            }
        }
        Ok(summaries)
    }
}
