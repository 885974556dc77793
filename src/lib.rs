//! JPEG 2000 tile-component parameter resolution and scalar quantization.
//!
//! Encoder options are resolved into per tile-component tables
//! ([`jpeg2000::spec`]), wavelet coefficients are produced tile by tile and
//! quantized into sign-magnitude code-blocks ready for an entropy coder.

pub mod constants;
pub mod error;
pub mod jpeg2000;

pub use error::{ConfigError, ContractViolation, Error};
pub use jpeg2000::code_block::CodeBlock;
pub use jpeg2000::encoder::{QuantizationPipeline, TileComponentSummary};
pub use jpeg2000::image::{ComponentInfo, Image, QuantizationHeader, TileGrid};
pub use jpeg2000::quantization::{Quantizer, ScalarQuantizer};
pub use jpeg2000::spec::{EncoderOptions, EncoderSpecs};
