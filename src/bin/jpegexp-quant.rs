//! jpegexp-quant CLI - JPEG 2000 parameter resolution and quantization tool.
//!
//! Resolves encoder options the way the codestream writer sees them and runs
//! raw images through the wavelet and quantization stages.

use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Display;
use std::fs;
use std::path::PathBuf;

use jpegexp_quant::jpeg2000::quantization::{decode_step, encode_step};
use jpegexp_quant::jpeg2000::spec::{SpecTable, SpecTag};
use jpegexp_quant::{EncoderOptions, EncoderSpecs, Image, QuantizationPipeline};

/// JPEG 2000 tile-component parameter and quantization tool
#[derive(Parser)]
#[command(name = "jpegexp-quant")]
#[command(author = "jpegexp-rs contributors")]
#[command(version)]
#[command(about = "Resolve JPEG 2000 encoder options and quantize raw images", long_about = None)]
#[command(after_help = "EXAMPLES:
    jpegexp-quant quantize -i pixels.raw -w 512 -H 512 -n 3 --lossless
    jpegexp-quant quantize -i pixels.raw -w 512 -H 512 --qtype \"derived t1 expounded\" --tile 256x256
    jpegexp-quant resolve qtype \"t0,3-4 c0-2 reversible t9 derived\" --tiles 10 --components 3
    jpegexp-quant step 0.0078125
    jpegexp-quant step --decode 0x0800

OPTION LANGUAGE:
    <value> | t<set> <value> | c<set> <value> | t<set> c<set> <value> ...
    where <set> is a comma separated list of indices and ranges, e.g. t0,3-5")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Quantize a raw 8-bit image and report every tile-component
    ///
    /// Input must be interleaved unsigned 8-bit samples (e.g. RGBRGB...).
    #[command(visible_alias = "q")]
    Quantize {
        /// Input raw pixel file
        #[arg(short, long, help = "Path to raw pixel data file")]
        input: PathBuf,

        /// Image width in pixels
        #[arg(short, long)]
        width: usize,

        /// Image height in pixels
        #[arg(short = 'H', long)]
        height: usize,

        /// Number of color components (1=grayscale, 3=RGB)
        #[arg(short = 'n', long, default_value = "1")]
        components: usize,

        /// Tile size as WIDTHxHEIGHT, whole image when omitted
        #[arg(short, long, value_parser = parse_size)]
        tile: Option<(usize, usize)>,

        /// Code-block size as WIDTHxHEIGHT
        #[arg(long, default_value = "64x64", value_parser = parse_size)]
        code_block: (usize, usize),

        #[command(flatten)]
        options: SpecOptions,
    },

    /// Print the resolved value of one parameter for every tile-component
    #[command(visible_alias = "r")]
    Resolve {
        /// Parameter to resolve
        #[arg(value_enum)]
        parameter: Parameter,

        /// Option string, e.g. "t0-2 c1 w5x3 w9x7"
        value: String,

        /// Number of tiles
        #[arg(short, long, default_value = "1")]
        tiles: usize,

        /// Number of components
        #[arg(short = 'n', long, default_value = "3")]
        components: usize,

        /// Resolve as for lossless coding
        #[arg(long)]
        lossless: bool,
    },

    /// Encode a quantization step size, or decode one with --decode
    #[command(visible_alias = "s")]
    Step {
        /// Step size, or encoded value (decimal or 0x hex) with --decode
        value: String,

        #[arg(short, long)]
        decode: bool,
    },
}

/// Options in the tile-component option language
#[derive(clap::Args, Default)]
struct SpecOptions {
    /// Lossless coding: reversible quantization, 5/3 filter and RCT
    #[arg(long)]
    lossless: bool,

    /// Quantization type (reversible, derived, expounded)
    #[arg(long)]
    qtype: Option<String>,

    /// Base quantization step size
    #[arg(long)]
    qstep: Option<String>,

    /// Number of guard bits
    #[arg(long)]
    guard_bits: Option<String>,

    /// Wavelet filters (w5x3, w9x7)
    #[arg(long)]
    filters: Option<String>,

    /// Component transform (on, off)
    #[arg(long)]
    mct: Option<String>,

    /// Number of decomposition levels
    #[arg(long)]
    levels: Option<String>,
}

impl SpecOptions {
    fn into_encoder_options(self) -> EncoderOptions {
        EncoderOptions {
            lossless: self.lossless,
            quant_type: self.qtype,
            quant_step: self.qstep,
            guard_bits: self.guard_bits,
            filters: self.filters,
            component_transform: self.mct,
            decomposition_levels: self.levels,
            ..EncoderOptions::default()
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Parameter {
    /// Quantization type
    Qtype,
    /// Quantization step size
    Qstep,
    /// Guard bits
    GuardBits,
    /// Wavelet filters
    Filters,
    /// Component transform (tiles only)
    Mct,
    /// Decomposition levels
    Levels,
}

fn main() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Quantize {
            input,
            width,
            height,
            components,
            tile,
            code_block,
            options,
        } => quantize_image(&input, width, height, components, tile, code_block, options),
        Commands::Resolve {
            parameter,
            value,
            tiles,
            components,
            lossless,
        } => resolve_option(parameter, value, tiles, components, lossless),
        Commands::Step { value, decode } => convert_step(&value, decode),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn parse_size(text: &str) -> Result<(usize, usize), String> {
    let (w, h) = text
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{text}'"))?;
    let w = w.trim().parse().map_err(|e| format!("bad width '{w}': {e}"))?;
    let h = h.trim().parse().map_err(|e| format!("bad height '{h}': {e}"))?;
    Ok((w, h))
}

fn quantize_image(
    input: &PathBuf,
    width: usize,
    height: usize,
    components: usize,
    tile: Option<(usize, usize)>,
    code_block: (usize, usize),
    options: SpecOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let pixels = fs::read(input)?;
    let image = Image::from_interleaved_u8(&pixels, width, height, components)?;

    let mut pipeline = QuantizationPipeline::new(options.into_encoder_options());
    pipeline.set_tile_size(tile);
    pipeline.set_code_block_size(code_block.0, code_block.1);

    let summaries = pipeline.run(&image, |_, _, _| {})?;

    println!("Image: {}x{}, {} component(s)", width, height, components);
    println!(
        "{:>4} {:>4}  {:<9} {:<5} {:<4} {:>3} {:>5} {:>5} {:>7} {:>7} {:>9}",
        "tile", "comp", "qtype", "wt", "mct", "lev", "guard", "range", "magbits", "blocks", "nonzero"
    );
    for s in &summaries {
        println!(
            "{:>4} {:>4}  {:<9} {:<5} {:<4} {:>3} {:>5} {:>5} {:>7} {:>7} {:>9}",
            s.tile,
            s.component,
            s.quant_type.to_string(),
            s.filter.to_string(),
            s.component_transform.to_string(),
            s.decomposition_levels,
            s.guard_bits,
            s.range_bits,
            s.max_magnitude_bits,
            s.code_blocks,
            s.nonzero_coefficients
        );
        let steps: Vec<String> = s
            .header
            .step_sizes
            .iter()
            .map(|v| format!("{v:#06x}"))
            .collect();
        println!(
            "           Sqcd {:#04x}  SPqcd [{}]",
            s.header.quant_style,
            steps.join(" ")
        );
    }
    Ok(())
}

fn tag_marker(tag: SpecTag) -> &'static str {
    match tag {
        SpecTag::Default => "",
        SpecTag::ComponentDefault => " (c)",
        SpecTag::TileDefault => " (t)",
        SpecTag::TileComponent => " (tc)",
    }
}

fn print_table<V: Display>(name: &str, table: &SpecTable<V>) {
    println!(
        "{}: {} tile(s) x {} component(s), scope {}",
        name,
        table.num_tiles(),
        table.num_components(),
        table.scope()
    );
    if let Some(v) = table.default() {
        println!("  default: {}", v);
    }
    for t in 0..table.num_tiles() {
        let row: Vec<String> = (0..table.num_components())
            .map(|c| match table.get(t, c) {
                Some(v) => format!("{}{}", v, tag_marker(table.tag(t, c))),
                None => "-".to_string(),
            })
            .collect();
        println!("  t{:<3} {}", t, row.join(" | "));
    }
}

fn resolve_option(
    parameter: Parameter,
    value: String,
    tiles: usize,
    components: usize,
    lossless: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = SpecOptions {
        lossless,
        ..SpecOptions::default()
    };
    match parameter {
        Parameter::Qtype => options.qtype = Some(value),
        Parameter::Qstep => options.qstep = Some(value),
        Parameter::GuardBits => options.guard_bits = Some(value),
        Parameter::Filters => options.filters = Some(value),
        Parameter::Mct => options.mct = Some(value),
        Parameter::Levels => options.levels = Some(value),
    }
    let specs = EncoderSpecs::from_options(tiles, components, &options.into_encoder_options())?;

    match parameter {
        Parameter::Qtype => print_table("quantization type", specs.quant_types.table()),
        Parameter::Qstep => print_table("quantization step", specs.quant_steps.table()),
        Parameter::GuardBits => print_table("guard bits", specs.guard_bits.table()),
        Parameter::Filters => print_table("filters", specs.filters.table()),
        Parameter::Mct => print_table("component transform", specs.component_transforms.table()),
        Parameter::Levels => print_table("decomposition levels", specs.decomposition_levels.table()),
    }
    Ok(())
}

fn convert_step(value: &str, decode: bool) -> Result<(), Box<dyn std::error::Error>> {
    if decode {
        let encoded = match value.strip_prefix("0x") {
            Some(hex) => u16::from_str_radix(hex, 16)?,
            None => value.parse::<u16>()?,
        };
        println!(
            "{:#06x} -> exponent {}, mantissa {} -> {}",
            encoded,
            encoded >> 11,
            encoded & 0x7ff,
            decode_step(encoded)
        );
    } else {
        let step: f32 = value.parse()?;
        if step.is_nan() || step <= 0.0 {
            return Err(format!("step size must be positive, got {step}").into());
        }
        let encoded = encode_step(step);
        println!(
            "{} -> {:#06x} (exponent {}, mantissa {}) -> {}",
            step,
            encoded,
            encoded >> 11,
            encoded & 0x7ff,
            decode_step(encoded)
        );
    }
    Ok(())
}
