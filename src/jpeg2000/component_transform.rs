//! Forward multiple component transforms (Annex G).

use tracing::debug;

use crate::constants::MCT_COMPONENT_COUNT;
use crate::error::ConfigError;
use crate::jpeg2000::image::{Plane, Tile};
use crate::jpeg2000::spec::ComponentTransform;

// ICT row weights, made positive, used to bound the output range.
const ICT_Y: [f64; 3] = [0.299072, 0.586914, 0.114014];
const ICT_CB: [f64; 3] = [0.168701, 0.331299, 0.5];
const ICT_CR: [f64; 3] = [0.5, 0.418701, 0.081299];

fn floor_log2(v: i64) -> u32 {
    if v <= 0 { 0 } else { v.ilog2() }
}

fn weighted_bits(weights: [f64; 3], depths: [u32; 3]) -> u32 {
    let sum: f64 = weights
        .iter()
        .zip(depths)
        .map(|(w, d)| (1i64 << d) as f64 * w)
        .sum();
    floor_log2(sum.floor() as i64 - 1) + 1
}

/// Nominal bit depth of every component after `transform`. Components past
/// the third keep their depth.
pub fn mixed_bit_depths(transform: ComponentTransform, depths: &[u32]) -> Vec<u32> {
    let mut out = depths.to_vec();
    if depths.len() < MCT_COMPONENT_COUNT {
        return out;
    }
    let d = [depths[0], depths[1], depths[2]];
    match transform {
        ComponentTransform::None => {}
        ComponentTransform::Rct => {
            out[0] = floor_log2((1i64 << d[0]) + (2i64 << d[1]) + (1i64 << d[2]) - 1) - 2 + 1;
            out[1] = floor_log2((1i64 << d[2]) + (1i64 << d[1]) - 1) + 1;
            out[2] = floor_log2((1i64 << d[0]) + (1i64 << d[1]) - 1) + 1;
        }
        ComponentTransform::Ict => {
            out[0] = weighted_bits(ICT_Y, d);
            out[1] = weighted_bits(ICT_CB, d);
            out[2] = weighted_bits(ICT_CR, d);
        }
    }
    out
}

/// Apply `transform` to the three leading components of `tile` in place and
/// return the nominal range bits of all its components.
///
/// RCT keeps integer samples, ICT turns the leading planes into floats.
pub fn forward(tile: &mut Tile, transform: ComponentTransform) -> Result<Vec<u32>, ConfigError> {
    if transform == ComponentTransform::None {
        return Ok(tile.depths.clone());
    }
    if tile.planes.len() < MCT_COMPONENT_COUNT {
        return Err(ConfigError::TooFewComponents {
            components: tile.planes.len(),
        });
    }
    let count = tile.planes[0].len();
    if tile.planes[1].len() != count || tile.planes[2].len() != count {
        return Err(ConfigError::ComponentDimensionMismatch { tile: tile.index });
    }

    let components = tile.planes.len();
    let [r, g, b]: [Plane; MCT_COMPONENT_COUNT] = tile
        .planes
        .drain(..MCT_COMPONENT_COUNT)
        .collect::<Vec<_>>()
        .try_into()
        .map_err(|_| ConfigError::TooFewComponents { components })?;

    let transformed = match transform {
        ComponentTransform::Rct => {
            let (r, g, b) = (r.into_int(), g.into_int(), b.into_int());
            let mut y = Vec::with_capacity(count);
            let mut u = Vec::with_capacity(count);
            let mut v = Vec::with_capacity(count);
            for i in 0..count {
                // RCT: Y = floor((R + 2G + B) / 4), U = B - G, V = R - G
                y.push((r[i] + 2 * g[i] + b[i]) >> 2);
                u.push(b[i] - g[i]);
                v.push(r[i] - g[i]);
            }
            [Plane::Int(y), Plane::Int(u), Plane::Int(v)]
        }
        _ => {
            let (r, g, b) = (r.into_float(), g.into_float(), b.into_float());
            let mut y = Vec::with_capacity(count);
            let mut cb = Vec::with_capacity(count);
            let mut cr = Vec::with_capacity(count);
            for i in 0..count {
                y.push(0.299 * r[i] + 0.587 * g[i] + 0.114 * b[i]);
                cb.push(-0.16875 * r[i] - 0.33126 * g[i] + 0.5 * b[i]);
                cr.push(0.5 * r[i] - 0.41869 * g[i] - 0.08131 * b[i]);
            }
            [Plane::Float(y), Plane::Float(cb), Plane::Float(cr)]
        }
    };
    tile.planes.splice(0..0, transformed);

    let ranges = mixed_bit_depths(transform, &tile.depths);
    debug!(tile = tile.index, %transform, ?ranges, "component transform applied");
    Ok(ranges)
}
