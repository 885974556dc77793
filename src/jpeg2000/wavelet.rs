//! Forward wavelet stage: tiles the image, applies the component transform
//! and the DWT, then hands out code-blocks of each leaf subband.

use tracing::debug;

use crate::error::{ConfigError, ContractViolation, Error};
use crate::jpeg2000::code_block::CodeBlock;
use crate::jpeg2000::component_transform;
use crate::jpeg2000::dwt::{Dwt53, Dwt97, forward_2d};
use crate::jpeg2000::image::{Image, Plane, TileGrid};
use crate::jpeg2000::source::{CodeBlockSource, DataType, Tiled};
use crate::jpeg2000::spec::{EncoderSpecs, FilterKindSource, WaveletFilter};
use crate::jpeg2000::subband::{SubbandId, SubbandTree};

#[derive(Debug, Clone, Copy)]
struct BlockPosition {
    sb: SubbandId,
    m: usize,
    n: usize,
    ulx: usize,
    uly: usize,
    w: usize,
    h: usize,
}

#[derive(Debug)]
struct TileComponentData {
    coefficients: Plane,
    width: usize,
    range_bits: u32,
    tree: SubbandTree,
    blocks: Vec<BlockPosition>,
    cursor: usize,
}

impl TileComponentData {
    fn next_position(&mut self) -> Option<BlockPosition> {
        let pos = self.blocks.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(pos)
    }
}

/// Code-block partition of every leaf subband, in resolution order.
fn partition(tree: &SubbandTree, cblk_w: usize, cblk_h: usize) -> Vec<BlockPosition> {
    let mut blocks = Vec::new();
    for sb in tree.leaves() {
        let band = tree.get(sb);
        if band.w == 0 || band.h == 0 {
            continue;
        }
        for m in 0..band.h.div_ceil(cblk_h) {
            for n in 0..band.w.div_ceil(cblk_w) {
                let x0 = n * cblk_w;
                let y0 = m * cblk_h;
                blocks.push(BlockPosition {
                    sb,
                    m,
                    n,
                    ulx: band.ulx + x0,
                    uly: band.uly + y0,
                    w: cblk_w.min(band.w - x0),
                    h: cblk_h.min(band.h - y0),
                });
            }
        }
    }
    blocks
}

fn fill_block<T, F>(reuse: Option<CodeBlock<T>>, pos: BlockPosition, width: usize, sample: F) -> CodeBlock<T>
where
    T: Copy + Default,
    F: Fn(usize) -> T,
{
    let mut blk = reuse.unwrap_or_default();
    blk.reset_dense(pos.w, pos.h);
    for y in 0..pos.h {
        let src = (pos.uly + y) * width + pos.ulx;
        for (x, dst) in blk.row_mut(y).iter_mut().enumerate() {
            *dst = sample(src + x);
        }
    }
    blk.ulx = pos.ulx;
    blk.uly = pos.uly;
    blk.sb = pos.sb;
    blk.m = pos.m;
    blk.n = pos.n;
    blk
}

/// Upstream stage of the quantizer, one tile resident at a time.
#[derive(Debug)]
pub struct ForwardWavelet<'a> {
    image: &'a Image,
    specs: &'a EncoderSpecs,
    grid: TileGrid,
    cblk_w: usize,
    cblk_h: usize,
    tile: usize,
    components: Vec<TileComponentData>,
}

impl<'a> ForwardWavelet<'a> {
    /// Set up the stage and transform the first tile.
    pub fn new(
        image: &'a Image,
        specs: &'a EncoderSpecs,
        grid: TileGrid,
        code_block_size: (usize, usize),
    ) -> Result<Self, Error> {
        if grid.num_tiles() != specs.num_tiles {
            return Err(ContractViolation::TileGridMismatch {
                width: grid.tiles_x,
                height: grid.tiles_y,
                num_tiles: specs.num_tiles,
            }
            .into());
        }
        if image.num_components() != specs.num_components {
            return Err(ConfigError::InvalidGeometry(format!(
                "image has {} component(s), parameters were resolved for {}",
                image.num_components(),
                specs.num_components
            ))
            .into());
        }
        let (cblk_w, cblk_h) = code_block_size;
        if cblk_w == 0 || cblk_h == 0 {
            return Err(ConfigError::InvalidGeometry(format!(
                "code-block size {cblk_w}x{cblk_h}"
            ))
            .into());
        }
        let mut source = Self {
            image,
            specs,
            grid,
            cblk_w,
            cblk_h,
            tile: 0,
            components: Vec::new(),
        };
        source.load_tile(0)?;
        Ok(source)
    }

    fn load_tile(&mut self, t: usize) -> Result<(), Error> {
        let mut tile = self.image.tile(&self.grid, t)?;
        let transform = self.specs.component_transforms.get(t)?;
        let ranges = component_transform::forward(&mut tile, transform)?;

        let (w, h) = (tile.width, tile.height);
        let mut components = Vec::with_capacity(tile.planes.len());
        for (c, plane) in tile.planes.into_iter().enumerate() {
            let filter = self.specs.filters.filter(t, c)?;
            let levels = self.specs.decomposition_levels.get(t, c)?;
            let coefficients = match filter {
                WaveletFilter::W5x3 => {
                    let mut data = plane.into_int();
                    forward_2d::<Dwt53>(&mut data, w, h, levels);
                    Plane::Int(data)
                }
                WaveletFilter::W9x7 => {
                    let mut data = plane.into_float();
                    forward_2d::<Dwt97>(&mut data, w, h, levels);
                    Plane::Float(data)
                }
            };
            let tree = SubbandTree::new(w, h, levels, filter);
            let blocks = partition(&tree, self.cblk_w, self.cblk_h);
            debug!(
                tile = t,
                component = c,
                %filter,
                levels,
                code_blocks = blocks.len(),
                "tile-component transformed"
            );
            components.push(TileComponentData {
                coefficients,
                width: w,
                range_bits: ranges[c],
                tree,
                blocks,
                cursor: 0,
            });
        }
        self.components = components;
        self.tile = t;
        Ok(())
    }

    fn component(&self, c: usize) -> Result<&TileComponentData, ContractViolation> {
        self.components
            .get(c)
            .ok_or(ContractViolation::ComponentOutOfRange {
                component: c,
                num_components: self.components.len(),
            })
    }

    fn component_mut(&mut self, c: usize) -> Result<&mut TileComponentData, ContractViolation> {
        let num_components = self.components.len();
        self.components
            .get_mut(c)
            .ok_or(ContractViolation::ComponentOutOfRange {
                component: c,
                num_components,
            })
    }
}

impl Tiled for ForwardWavelet<'_> {
    fn num_tiles(&self) -> usize {
        self.grid.num_tiles()
    }

    fn tile_grid(&self) -> (usize, usize) {
        (self.grid.tiles_x, self.grid.tiles_y)
    }

    fn tile_index(&self) -> usize {
        self.tile
    }

    fn set_tile(&mut self, x: usize, y: usize) -> Result<(), Error> {
        let t = self.grid.index(x, y)?;
        self.load_tile(t)
    }

    fn next_tile(&mut self) -> Result<(), Error> {
        if self.tile + 1 >= self.grid.num_tiles() {
            return Err(ContractViolation::NoNextTile { tile: self.tile }.into());
        }
        self.load_tile(self.tile + 1)
    }
}

impl CodeBlockSource for ForwardWavelet<'_> {
    fn num_components(&self) -> usize {
        self.components.len()
    }

    fn data_type(&self, c: usize) -> Result<DataType, ContractViolation> {
        Ok(match self.component(c)?.coefficients {
            Plane::Int(_) => DataType::Int,
            Plane::Float(_) => DataType::Float,
        })
    }

    fn nominal_range_bits(&self, c: usize) -> Result<u32, ContractViolation> {
        Ok(self.component(c)?.range_bits)
    }

    fn fixed_point_position(&self, c: usize) -> Result<i32, ContractViolation> {
        self.component(c)?;
        Ok(0)
    }

    fn subband_tree(&self, c: usize) -> Result<&SubbandTree, ContractViolation> {
        Ok(&self.component(c)?.tree)
    }

    fn subband_tree_mut(&mut self, c: usize) -> Result<&mut SubbandTree, ContractViolation> {
        Ok(&mut self.component_mut(c)?.tree)
    }

    fn next_int_code_block(
        &mut self,
        c: usize,
        reuse: Option<CodeBlock<i32>>,
    ) -> Result<Option<CodeBlock<i32>>, ContractViolation> {
        let data = self.component_mut(c)?;
        let Some(pos) = data.next_position() else {
            return Ok(None);
        };
        let blk = match &data.coefficients {
            Plane::Int(v) => fill_block(reuse, pos, data.width, |i| v[i]),
            Plane::Float(v) => fill_block(reuse, pos, data.width, |i| v[i].round() as i32),
        };
        Ok(Some(blk))
    }

    fn next_float_code_block(
        &mut self,
        c: usize,
        reuse: Option<CodeBlock<f32>>,
    ) -> Result<Option<CodeBlock<f32>>, ContractViolation> {
        let data = self.component_mut(c)?;
        let Some(pos) = data.next_position() else {
            return Ok(None);
        };
        let blk = match &data.coefficients {
            Plane::Int(v) => fill_block(reuse, pos, data.width, |i| v[i] as f32),
            Plane::Float(v) => fill_block(reuse, pos, data.width, |i| v[i]),
        };
        Ok(Some(blk))
    }
}
