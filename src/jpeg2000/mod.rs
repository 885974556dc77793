//! JPEG 2000 encoder front end (Part 1, ISO/IEC 15444-1)
//!
//! This module covers everything between the source image and the entropy
//! coder:
//!
//! - `spec`: Tile-component parameter tables and the option language that fills them.
//! - `image`: Source image, tile grid and the quantization header content.
//! - `component_transform`: Forward RCT and ICT.
//! - `dwt`: Discrete Wavelet Transform (5-3 and 9-7).
//! - `subband`: Subband decomposition tree with gains and synthesis norms.
//! - `wavelet` / `source`: Code-block sources feeding the quantizer.
//! - `quantization`: Scalar quantization and step size encoding.
//! - `encoder`: The pipeline tying the stages together.

pub mod code_block;
pub mod component_transform;
pub mod dwt;
pub mod encoder;
pub mod image;
pub mod quantization;
pub mod source;
pub mod spec;
pub mod subband;
pub mod wavelet;
