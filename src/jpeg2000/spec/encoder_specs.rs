use tracing::debug;

use crate::constants::DEFAULT_CODE_BLOCK_SIZE;
use crate::error::{ConfigError, Error};

use super::comp_transf::ComponentTransformSpec;
use super::filters::FilterSpec;
use super::numeric::{DecompositionLevelsSpec, GuardBitsSpec, QuantStepSizeSpec};
use super::quant_type::QuantTypeSpec;

/// Raw encoder options, each a string in the tile-component option
/// language. `None` leaves the corresponding built-in default in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderOptions {
    pub lossless: bool,
    pub quant_type: Option<String>,
    pub quant_step: Option<String>,
    pub guard_bits: Option<String>,
    pub filters: Option<String>,
    pub component_transform: Option<String>,
    pub decomposition_levels: Option<String>,
    pub code_block_width: usize,
    pub code_block_height: usize,
    /// Nominal tile size; `None` puts the whole image in one tile.
    pub tile_size: Option<(usize, usize)>,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            lossless: false,
            quant_type: None,
            quant_step: None,
            guard_bits: None,
            filters: None,
            component_transform: None,
            decomposition_levels: None,
            code_block_width: DEFAULT_CODE_BLOCK_SIZE,
            code_block_height: DEFAULT_CODE_BLOCK_SIZE,
            tile_size: None,
        }
    }
}

impl EncoderOptions {
    pub fn lossless() -> Self {
        Self {
            lossless: true,
            ..Self::default()
        }
    }
}

/// Every resolved parameter table of an encoding session.
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderSpecs {
    pub num_tiles: usize,
    pub num_components: usize,
    pub quant_types: QuantTypeSpec,
    pub filters: FilterSpec,
    pub decomposition_levels: DecompositionLevelsSpec,
    pub guard_bits: GuardBitsSpec,
    pub quant_steps: QuantStepSizeSpec,
    pub component_transforms: ComponentTransformSpec,
}

impl EncoderSpecs {
    /// Resolve the tables in dependency order: filters depend on the
    /// quantization type and component transforms on the filters.
    pub fn from_options(
        num_tiles: usize,
        num_components: usize,
        options: &EncoderOptions,
    ) -> Result<Self, Error> {
        if num_tiles == 0 || num_components == 0 {
            return Err(ConfigError::InvalidGeometry(format!(
                "{num_tiles} tile(s) with {num_components} component(s)"
            ))
            .into());
        }
        if options.code_block_width == 0 || options.code_block_height == 0 {
            return Err(ConfigError::InvalidGeometry(format!(
                "code-block size {}x{}",
                options.code_block_width, options.code_block_height
            ))
            .into());
        }

        let quant_types = QuantTypeSpec::parse(
            num_tiles,
            num_components,
            options.quant_type.as_deref(),
            options.lossless,
        )?;
        let filters = FilterSpec::parse(
            num_tiles,
            num_components,
            options.filters.as_deref(),
            &quant_types,
        )?;
        let decomposition_levels = DecompositionLevelsSpec::parse(
            num_tiles,
            num_components,
            options.decomposition_levels.as_deref(),
        )?;
        let guard_bits =
            GuardBitsSpec::parse(num_tiles, num_components, options.guard_bits.as_deref())?;
        let quant_steps =
            QuantStepSizeSpec::parse(num_tiles, num_components, options.quant_step.as_deref())?;
        let component_transforms = ComponentTransformSpec::parse(
            num_tiles,
            num_components,
            options.component_transform.as_deref(),
            options.lossless,
            &filters,
        )?;

        debug!(
            num_tiles,
            num_components,
            lossless = options.lossless,
            max_levels = decomposition_levels.max_levels(),
            "encoder specifications resolved"
        );
        Ok(Self {
            num_tiles,
            num_components,
            quant_types,
            filters,
            decomposition_levels,
            guard_bits,
            quant_steps,
            component_transforms,
        })
    }
}
