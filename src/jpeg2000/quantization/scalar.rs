//! Scalar deadzone quantizer, reversible and irreversible.

use tracing::debug;

use crate::constants::QUANT_STYLE_GUARD_BITS_SHIFT;
use crate::error::{ContractViolation, Error};
use crate::jpeg2000::code_block::CodeBlock;
use crate::jpeg2000::image::QuantizationHeader;
use crate::jpeg2000::quantization::Quantizer;
use crate::jpeg2000::quantization::step_size::{decode_step, encode_reversible, encode_step};
use crate::jpeg2000::source::{CodeBlockSource, Tiled};
use crate::jpeg2000::spec::{
    EncoderSpecs, GuardBitsSpec, QuantStepSizeSpec, QuantTypeSpec, QuantizationType,
};
use crate::jpeg2000::subband::Subband;

/// Largest magnitude that fits below the sign bit.
const MAX_MAGNITUDE_BITS: i32 = 31;

/// Sign-magnitude form of `v`: bit 31 set for negative values.
#[inline]
pub fn sign_magnitude(v: i32) -> i32 {
    if v < 0 { i32::MIN | v.wrapping_neg() } else { v }
}

fn floor_log2(v: f64) -> i32 {
    v.log2().floor() as i32
}

/// Resolved quantization parameters of one tile-component.
#[derive(Debug, Clone, Copy)]
struct Params {
    qtype: QuantizationType,
    guard_bits: i32,
    base_step: f32,
    range_bits: i32,
}

impl Params {
    fn magnitude_bits(&self, sb: &Subband) -> i32 {
        let g = self.guard_bits;
        match self.qtype {
            QuantizationType::Reversible => g - 1 + self.range_bits + sb.an_gain_exp,
            QuantizationType::Derived => {
                g - 1 + sb.level as i32 - floor_log2(self.base_step as f64)
            }
            QuantizationType::Expounded => g - 1 - floor_log2(self.step_udr(sb) as f64),
        }
    }

    /// Step relative to a unit dynamic range, before step size encoding.
    fn step_udr(&self, sb: &Subband) -> f32 {
        match self.qtype {
            QuantizationType::Reversible => 1.0,
            QuantizationType::Derived => self.base_step / 2f32.powi(sb.level as i32),
            QuantizationType::Expounded => {
                self.base_step / (sb.l2_norm * 2f32.powi(sb.an_gain_exp))
            }
        }
    }

    fn step_wmse(&self, sb: &Subband) -> f32 {
        let l2 = sb.l2_norm * sb.l2_norm;
        match self.qtype {
            QuantizationType::Reversible => 2f32.powi(-2 * self.range_bits) * l2,
            QuantizationType::Derived => {
                self.base_step
                    * self.base_step
                    * 2f32.powi(2 * (sb.an_gain_exp - sb.level as i32))
                    * l2
            }
            QuantizationType::Expounded => self.base_step * self.base_step,
        }
    }
}

/// Deadzone scalar quantizer over a code-block source.
///
/// Not reentrant: one scratch block bridges floating point input to integer
/// output and the intern block is overwritten by each call.
#[derive(Debug)]
pub struct ScalarQuantizer<'a, S: CodeBlockSource> {
    src: S,
    quant_types: &'a QuantTypeSpec,
    steps: &'a QuantStepSizeSpec,
    guard_bits: &'a GuardBitsSpec,
    scratch: Option<CodeBlock<f32>>,
    intern: Option<CodeBlock<i32>>,
    max_magbits: Vec<Option<i32>>,
}

impl<'a, S: CodeBlockSource> ScalarQuantizer<'a, S> {
    pub fn new(src: S, specs: &'a EncoderSpecs) -> Result<Self, ContractViolation> {
        let mut quantizer = Self {
            src,
            quant_types: &specs.quant_types,
            steps: &specs.quant_steps,
            guard_bits: &specs.guard_bits,
            scratch: None,
            intern: None,
            max_magbits: Vec::new(),
        };
        quantizer.init_tile()?;
        Ok(quantizer)
    }

    pub fn source(&self) -> &S {
        &self.src
    }

    pub fn into_source(self) -> S {
        self.src
    }

    fn params(&self, c: usize) -> Result<Params, ContractViolation> {
        let t = self.src.tile_index();
        Ok(Params {
            qtype: self.quant_types.get(t, c)?,
            guard_bits: self.guard_bits.get(t, c)?,
            base_step: self.steps.get(t, c)?,
            range_bits: self.src.nominal_range_bits(c)? as i32,
        })
    }

    fn init_tile(&mut self) -> Result<(), ContractViolation> {
        self.max_magbits = vec![None; self.src.num_components()];
        for c in 0..self.src.num_components() {
            self.calc_sb_params(c)?;
            // Rejected before any code-block of the tile is pulled.
            let magbits = self.max_magnitude_bits(c)?;
            if magbits > MAX_MAGNITUDE_BITS {
                return Err(ContractViolation::MagnitudeBitsOverflow { magbits });
            }
        }
        Ok(())
    }

    /// Fill in the weighted step MSE of every subband not yet computed.
    fn calc_sb_params(&mut self, c: usize) -> Result<(), ContractViolation> {
        let params = self.params(c)?;
        let tree = self.src.subband_tree_mut(c)?;
        for sb in tree.nodes_mut() {
            if sb.step_wmse > 0.0 {
                continue;
            }
            sb.step_wmse = if sb.is_node {
                1.0
            } else {
                params.step_wmse(sb)
            };
        }
        debug!(
            tile = self.src.tile_index(),
            component = c,
            qtype = %params.qtype,
            "subband parameters computed"
        );
        Ok(())
    }

    fn quantize_reversible(
        &mut self,
        c: usize,
        params: &Params,
    ) -> Result<bool, ContractViolation> {
        let reuse = self.intern.take();
        let Some(mut blk) = self.src.next_int_code_block(c, reuse)? else {
            return Ok(false);
        };
        let magbits = params.magnitude_bits(self.src.subband_tree(c)?.get(blk.sb));
        let shift = MAX_MAGNITUDE_BITS - magbits;
        for y in 0..blk.h {
            for v in blk.row_mut(y) {
                *v = sign_magnitude(*v << shift);
            }
        }
        blk.magbits = magbits;
        blk.convert_factor = 2f32.powi(shift);
        blk.step_size = 1.0;
        self.intern = Some(blk);
        Ok(true)
    }

    fn quantize_irreversible(
        &mut self,
        c: usize,
        params: &Params,
    ) -> Result<bool, ContractViolation> {
        let scratch = self.scratch.take();
        let Some(input) = self.src.next_float_code_block(c, scratch)? else {
            return Ok(false);
        };
        let fixed_point = self.src.fixed_point_position(c)?;
        let sb = self.src.subband_tree(c)?.get(input.sb);
        let magbits = params.magnitude_bits(sb);
        let shift = MAX_MAGNITUDE_BITS - magbits;

        // Use the step as the decoder will see it.
        let step_udr = decode_step(encode_step(params.step_udr(sb)));
        let range_scale = 2f32.powi(params.range_bits + sb.an_gain_exp);
        let mut invstep = 1.0 / (range_scale * step_udr);
        invstep *= 2f32.powi(shift - fixed_point);

        let mut out = self.intern.take().unwrap_or_default();
        out.reset_dense(input.w, input.h);
        out.copy_position(&input);
        for y in 0..input.h {
            for (dst, &x) in out.row_mut(y).iter_mut().zip(input.row(y)) {
                *dst = sign_magnitude((x * invstep) as i32);
            }
        }
        out.magbits = magbits;
        out.convert_factor = invstep;
        out.step_size = range_scale * step_udr;

        self.scratch = Some(input);
        self.intern = Some(out);
        Ok(true)
    }
}

impl<S: CodeBlockSource> Tiled for ScalarQuantizer<'_, S> {
    fn num_tiles(&self) -> usize {
        self.src.num_tiles()
    }

    fn tile_grid(&self) -> (usize, usize) {
        self.src.tile_grid()
    }

    fn tile_index(&self) -> usize {
        self.src.tile_index()
    }

    fn set_tile(&mut self, x: usize, y: usize) -> Result<(), Error> {
        self.src.set_tile(x, y)?;
        self.init_tile()?;
        Ok(())
    }

    fn next_tile(&mut self) -> Result<(), Error> {
        self.src.next_tile()?;
        self.init_tile()?;
        Ok(())
    }
}

impl<S: CodeBlockSource> Quantizer for ScalarQuantizer<'_, S> {
    fn num_components(&self) -> usize {
        self.src.num_components()
    }

    fn num_guard_bits(&self, t: usize, c: usize) -> Result<i32, ContractViolation> {
        self.guard_bits.get(t, c)
    }

    fn is_reversible(&self, t: usize, c: usize) -> Result<bool, ContractViolation> {
        self.quant_types.is_reversible(t, c)
    }

    fn is_derived(&self, t: usize, c: usize) -> Result<bool, ContractViolation> {
        self.quant_types.is_derived(t, c)
    }

    fn max_magnitude_bits(&mut self, c: usize) -> Result<i32, ContractViolation> {
        if let Some(Some(cached)) = self.max_magbits.get(c) {
            return Ok(*cached);
        }
        let params = self.params(c)?;
        let tree = self.src.subband_tree(c)?;
        let max = tree
            .leaves()
            .into_iter()
            .map(|sb| params.magnitude_bits(tree.get(sb)))
            .max()
            .unwrap_or(0);
        if let Some(slot) = self.max_magbits.get_mut(c) {
            *slot = Some(max);
        }
        Ok(max)
    }

    fn next_code_block(
        &mut self,
        c: usize,
        reuse: Option<CodeBlock<i32>>,
    ) -> Result<Option<CodeBlock<i32>>, ContractViolation> {
        if reuse.is_some() {
            self.intern = reuse;
        }
        let produced = self.next_intern_code_block(c)?.is_some();
        Ok(if produced { self.intern.take() } else { None })
    }

    fn next_intern_code_block(
        &mut self,
        c: usize,
    ) -> Result<Option<&CodeBlock<i32>>, ContractViolation> {
        let params = self.params(c)?;
        let produced = if params.qtype == QuantizationType::Reversible {
            self.quantize_reversible(c, &params)?
        } else {
            self.quantize_irreversible(c, &params)?
        };
        Ok(if produced { self.intern.as_ref() } else { None })
    }

    fn quantization_header(&self, c: usize) -> Result<QuantizationHeader, ContractViolation> {
        let params = self.params(c)?;
        let tree = self.src.subband_tree(c)?;
        let leaves = tree.leaves();
        let step_sizes = match params.qtype {
            QuantizationType::Reversible => leaves
                .iter()
                .map(|&sb| encode_reversible(params.range_bits + tree.get(sb).an_gain_exp))
                .collect(),
            QuantizationType::Derived => leaves
                .first()
                .map(|&ll| vec![encode_step(params.step_udr(tree.get(ll)))])
                .unwrap_or_default(),
            QuantizationType::Expounded => leaves
                .iter()
                .map(|&sb| encode_step(params.step_udr(tree.get(sb))))
                .collect(),
        };
        Ok(QuantizationHeader {
            quant_style: ((params.guard_bits as u8) << QUANT_STYLE_GUARD_BITS_SHIFT)
                | u8::from(params.qtype),
            step_sizes,
        })
    }
}
