use num_enum::TryFromPrimitive;

use crate::constants::{QUANT_STYLE_GUARD_BITS_SHIFT, QUANT_STYLE_MASK};
use crate::error::{ConfigError, ContractViolation};
use crate::jpeg2000::spec::QuantizationType;

/// Depth and signedness of one image component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentInfo {
    /// bit depth (e.g. 8, 12, 16)
    pub depth: u8,
    /// true if signed, false if unsigned
    pub is_signed: bool,
}

/// Planar source image, one sample vector per component.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub width: usize,
    pub height: usize,
    pub components: Vec<ComponentInfo>,
    pub planes: Vec<Vec<i32>>,
}

impl Image {
    pub fn new(
        width: usize,
        height: usize,
        components: Vec<ComponentInfo>,
        planes: Vec<Vec<i32>>,
    ) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 || components.is_empty() {
            return Err(ConfigError::InvalidGeometry(format!(
                "{width}x{height} image with {} component(s)",
                components.len()
            )));
        }
        if planes.len() != components.len() || planes.iter().any(|p| p.len() != width * height) {
            return Err(ConfigError::InvalidGeometry(
                "component planes do not match the image size".to_string(),
            ));
        }
        if let Some(c) = components.iter().find(|c| c.depth == 0 || c.depth > 30) {
            return Err(ConfigError::InvalidGeometry(format!(
                "unsupported bit depth {}",
                c.depth
            )));
        }
        Ok(Self {
            width,
            height,
            components,
            planes,
        })
    }

    /// Unsigned 8-bit interleaved samples (e.g. RGBRGB...).
    pub fn from_interleaved_u8(
        pixels: &[u8],
        width: usize,
        height: usize,
        component_count: usize,
    ) -> Result<Self, ConfigError> {
        let expected = width * height * component_count;
        if pixels.len() < expected {
            return Err(ConfigError::InvalidGeometry(format!(
                "expected {expected} bytes of pixel data, got {}",
                pixels.len()
            )));
        }
        let planes = (0..component_count)
            .map(|c| {
                pixels[..expected]
                    .iter()
                    .skip(c)
                    .step_by(component_count.max(1))
                    .map(|&v| v as i32)
                    .collect()
            })
            .collect();
        let info = ComponentInfo {
            depth: 8,
            is_signed: false,
        };
        Self::new(width, height, vec![info; component_count], planes)
    }

    pub fn num_components(&self) -> usize {
        self.components.len()
    }

    /// Copy out the samples of tile `index`, level shifting unsigned
    /// components to a zero-centred range.
    pub fn tile(&self, grid: &TileGrid, index: usize) -> Result<Tile, ContractViolation> {
        let (x0, y0, w, h) = grid.tile_rect(index)?;
        let planes = self
            .planes
            .iter()
            .zip(&self.components)
            .map(|(plane, info)| {
                // Level shift: subtract 2^(depth-1) for signed representation
                let shift = if info.is_signed {
                    0
                } else {
                    1 << (info.depth - 1)
                };
                let mut out = Vec::with_capacity(w * h);
                for y in y0..y0 + h {
                    let row = &plane[y * self.width + x0..y * self.width + x0 + w];
                    out.extend(row.iter().map(|&v| v - shift));
                }
                Plane::Int(out)
            })
            .collect();
        Ok(Tile {
            index,
            width: w,
            height: h,
            planes,
            depths: self.components.iter().map(|c| c.depth as u32).collect(),
        })
    }
}

/// Partition of the image into a grid of equally sized tiles, the last
/// row and column possibly smaller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
    pub image_width: usize,
    pub image_height: usize,
    pub tile_width: usize,
    pub tile_height: usize,
    pub tiles_x: usize,
    pub tiles_y: usize,
}

impl TileGrid {
    /// `None` puts the whole image in a single tile.
    pub fn new(
        image_width: usize,
        image_height: usize,
        tile_size: Option<(usize, usize)>,
    ) -> Result<Self, ConfigError> {
        let (tile_width, tile_height) = tile_size.unwrap_or((image_width, image_height));
        if tile_width == 0 || tile_height == 0 || image_width == 0 || image_height == 0 {
            return Err(ConfigError::InvalidGeometry(format!(
                "{tile_width}x{tile_height} tiles on a {image_width}x{image_height} image"
            )));
        }
        Ok(Self {
            image_width,
            image_height,
            tile_width,
            tile_height,
            tiles_x: image_width.div_ceil(tile_width),
            tiles_y: image_height.div_ceil(tile_height),
        })
    }

    pub fn num_tiles(&self) -> usize {
        self.tiles_x * self.tiles_y
    }

    /// Raster index of the tile at column `x`, row `y`.
    pub fn index(&self, x: usize, y: usize) -> Result<usize, ContractViolation> {
        if x >= self.tiles_x || y >= self.tiles_y {
            return Err(ContractViolation::NoSuchTile { x, y });
        }
        Ok(y * self.tiles_x + x)
    }

    /// Origin and size `(x0, y0, w, h)` of a tile on the image grid.
    pub fn tile_rect(&self, index: usize) -> Result<(usize, usize, usize, usize), ContractViolation> {
        if index >= self.num_tiles() {
            return Err(ContractViolation::TileOutOfRange {
                tile: index,
                num_tiles: self.num_tiles(),
            });
        }
        let x0 = (index % self.tiles_x) * self.tile_width;
        let y0 = (index / self.tiles_x) * self.tile_height;
        let w = self.tile_width.min(self.image_width - x0);
        let h = self.tile_height.min(self.image_height - y0);
        Ok((x0, y0, w, h))
    }
}

/// Sample buffer of one tile-component.
#[derive(Debug, Clone, PartialEq)]
pub enum Plane {
    Int(Vec<i32>),
    Float(Vec<f32>),
}

impl Plane {
    pub fn len(&self) -> usize {
        match self {
            Plane::Int(v) => v.len(),
            Plane::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_int(self) -> Vec<i32> {
        match self {
            Plane::Int(v) => v,
            Plane::Float(v) => v.into_iter().map(|s| s.round() as i32).collect(),
        }
    }

    pub fn into_float(self) -> Vec<f32> {
        match self {
            Plane::Int(v) => v.into_iter().map(|s| s as f32).collect(),
            Plane::Float(v) => v,
        }
    }
}

/// Level shifted samples of one tile.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub index: usize,
    pub width: usize,
    pub height: usize,
    pub planes: Vec<Plane>,
    /// Nominal bit depth of each component.
    pub depths: Vec<u32>,
}

/// Orientation of a wavelet subband.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubbandOrientation {
    #[default]
    /// Low-Low (base image)
    LL,
    /// High-Low (horizontal details)
    HL,
    /// Low-High (vertical details)
    LH,
    /// High-High (diagonal details)
    HH,
}

impl SubbandOrientation {
    pub const ALL: [SubbandOrientation; 4] = [
        SubbandOrientation::LL,
        SubbandOrientation::HL,
        SubbandOrientation::LH,
        SubbandOrientation::HH,
    ];

    pub fn index(self) -> usize {
        match self {
            SubbandOrientation::LL => 0,
            SubbandOrientation::HL => 1,
            SubbandOrientation::LH => 2,
            SubbandOrientation::HH => 3,
        }
    }
}

/// Quantization parameters of a tile-component as signalled in QCD/QCC.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuantizationHeader {
    /// Guard bits in the upper 3 bits, quantization style in the lower 5.
    pub quant_style: u8,
    /// One entry per leaf subband in resolution order; derived quantization
    /// only carries the LL entry.
    pub step_sizes: Vec<u16>,
}

impl QuantizationHeader {
    pub fn guard_bits(&self) -> u8 {
        self.quant_style >> QUANT_STYLE_GUARD_BITS_SHIFT
    }

    pub fn quantization_type(&self) -> Option<QuantizationType> {
        QuantizationType::try_from_primitive(self.quant_style & QUANT_STYLE_MASK).ok()
    }
}
