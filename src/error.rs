use thiserror::Error;

use crate::jpeg2000::spec::{ComponentTransform, SpecScope, WaveletFilter};

/// Errors caused by user supplied encoder options.
///
/// These are always fatal and reported while the option tables are built,
/// never while coefficients are being quantized.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Bad construction for index set '{token}'")]
    MalformedIndexSet { token: String },
    #[error("Out of range index in '{token}': {index} (must be below {max})")]
    IndexOutOfRange {
        token: String,
        index: usize,
        max: usize,
    },
    #[error("Non recognized value for option -{option}: {value}")]
    InvalidValue { option: String, value: String },
    #[error("Value '{value}' for option -{option} is not one of {allowed:?}")]
    DisallowedValue {
        option: String,
        value: String,
        allowed: Vec<String>,
    },
    #[error("Option -{option} is a {scope} option and cannot be set for '{token}'")]
    ScopeNotAllowed {
        option: String,
        scope: SpecScope,
        token: String,
    },
    #[error("Option -{option}: index set '{token}' is not followed by a value")]
    DanglingScope { option: String, token: String },
    #[error("Option -{option} requires a value greater than 0, got {value}")]
    NonPositive { option: String, value: String },
    #[error("Option -{option}: {value} is outside {min}..={max}")]
    OutOfRange {
        option: String,
        value: i64,
        min: i64,
        max: i64,
    },
    #[error("Cannot use {transform} with the {filter} filter in tile {tile}")]
    TransformFilterMismatch {
        tile: usize,
        transform: ComponentTransform,
        filter: WaveletFilter,
    },
    #[error("Cannot use component transformation in tile {tile}: leading components use different filters")]
    MixedFilters { tile: usize },
    #[error("Cannot use component transformation on an image with {components} component(s)")]
    TooFewComponents { components: usize },
    #[error("Components of tile {tile} have different dimensions")]
    ComponentDimensionMismatch { tile: usize },
    #[error("Lossless coding requires reversible quantization (tile {tile}, component {component})")]
    LosslessNotReversible { tile: usize, component: usize },
    #[error("Filter {filter} is not reversible but tile {tile}, component {component} uses reversible quantization")]
    IrreversibleFilter {
        tile: usize,
        component: usize,
        filter: WaveletFilter,
    },
    #[error("Invalid image geometry: {0}")]
    InvalidGeometry(String),
}

/// Misuse of the API by calling code, as opposed to bad user input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractViolation {
    #[error("{operation} is not allowed on a {scope} specification")]
    ScopeViolation {
        operation: &'static str,
        scope: SpecScope,
    },
    #[error("Tile index {tile} out of range (0..{num_tiles})")]
    TileOutOfRange { tile: usize, num_tiles: usize },
    #[error("Component index {component} out of range (0..{num_components})")]
    ComponentOutOfRange {
        component: usize,
        num_components: usize,
    },
    #[error("No {spec} value resolved for tile {tile}, component {component}")]
    Unresolved {
        spec: &'static str,
        tile: usize,
        component: usize,
    },
    #[error("{magbits} magnitude bits do not fit in a 32-bit sign-magnitude word")]
    MagnitudeBitsOverflow { magbits: i32 },
    #[error("Tile grid {width}x{height} does not hold {num_tiles} tiles")]
    TileGridMismatch {
        width: usize,
        height: usize,
        num_tiles: usize,
    },
    #[error("Tile ({x}, {y}) does not exist")]
    NoSuchTile { x: usize, y: usize },
    #[error("No tile follows tile {tile}")]
    NoNextTile { tile: usize },
}

/// Crate level error joining both kinds.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Contract(#[from] ContractViolation),
}
