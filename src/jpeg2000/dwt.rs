//! Forward discrete wavelet transforms for JPEG 2000 (Annex F).
//!
//! Both filters use symmetric extension and split a signal of length `n`
//! into `(n + 1) / 2` low-pass and `n / 2` high-pass samples, the low-pass
//! sample first. The 2D transform leaves the usual Mallat layout in place:
//!
//! ```text
//! +-------+-------+
//! |  LL   |  HL   |
//! +-------+-------+
//! |  LH   |  HH   |
//! +-------+-------+
//! ```

use crate::jpeg2000::spec::WaveletFilter;

/// One dimensional lifting filter over samples of type `Sample`.
pub trait Lifting {
    type Sample: Copy + Default;

    fn forward(signal: &[Self::Sample], out_l: &mut [Self::Sample], out_h: &mut [Self::Sample]);
}

// Symmetric extension around the signal ends.
#[inline]
fn neighbours<T: Copy>(x: &[T], i: usize) -> (T, T) {
    let len = x.len();
    let left = if i > 0 { x[i - 1] } else { x[i + 1] };
    let right = if i + 1 < len { x[i + 1] } else { x[i - 1] };
    (left, right)
}

fn deinterleave<T: Copy>(x: &[T], out_l: &mut [T], out_h: &mut [T]) {
    for (dst, &v) in out_l.iter_mut().zip(x.iter().step_by(2)) {
        *dst = v;
    }
    for (dst, &v) in out_h.iter_mut().zip(x.iter().skip(1).step_by(2)) {
        *dst = v;
    }
}

/// Reversible integer 5/3 filter.
pub struct Dwt53;

impl Lifting for Dwt53 {
    type Sample = i32;

    fn forward(signal: &[i32], out_l: &mut [i32], out_h: &mut [i32]) {
        match signal.len() {
            0 => return,
            1 => {
                out_l[0] = signal[0];
                return;
            }
            _ => {}
        }
        let mut x = signal.to_vec();
        let len = x.len();

        // y[2n+1] = x[2n+1] - floor((x[2n] + x[2n+2]) / 2)
        for i in (1..len).step_by(2) {
            let (left, right) = neighbours(&x, i);
            x[i] -= (left + right) >> 1;
        }
        // y[2n] = x[2n] + floor((y[2n-1] + y[2n+1] + 2) / 4)
        for i in (0..len).step_by(2) {
            let (left, right) = neighbours(&x, i);
            x[i] += (left + right + 2) >> 2;
        }

        deinterleave(&x, out_l, out_h);
    }
}

/// Irreversible floating point 9/7 filter.
pub struct Dwt97;

impl Dwt97 {
    const ALPHA: f32 = -1.586_134_3;
    const BETA: f32 = -0.052_980_12;
    const GAMMA: f32 = 0.882_911_1;
    const DELTA: f32 = 0.443_506_87;
    const K: f32 = 1.230_174_1;
    const INV_K: f32 = 1.0 / 1.230_174_1;

    fn lift(x: &mut [f32], start: usize, coeff: f32) {
        for i in (start..x.len()).step_by(2) {
            let (left, right) = neighbours(x, i);
            x[i] += coeff * (left + right);
        }
    }
}

impl Lifting for Dwt97 {
    type Sample = f32;

    fn forward(signal: &[f32], out_l: &mut [f32], out_h: &mut [f32]) {
        match signal.len() {
            0 => return,
            1 => {
                out_l[0] = signal[0];
                return;
            }
            _ => {}
        }
        let mut x = signal.to_vec();

        Self::lift(&mut x, 1, Self::ALPHA);
        Self::lift(&mut x, 0, Self::BETA);
        Self::lift(&mut x, 1, Self::GAMMA);
        Self::lift(&mut x, 0, Self::DELTA);

        for (i, v) in x.iter_mut().enumerate() {
            if i % 2 == 0 {
                *v *= Self::INV_K;
            } else {
                *v *= Self::K;
            }
        }

        deinterleave(&x, out_l, out_h);
    }
}

/// In place multi-level 2D forward transform of a `width` x `height` plane.
///
/// Each level transforms rows then columns of the current LL band, which
/// stays in the top-left corner.
pub fn forward_2d<L: Lifting>(data: &mut [L::Sample], width: usize, height: usize, levels: usize) {
    let mut cur_w = width;
    let mut cur_h = height;

    for _ in 0..levels {
        if cur_w == 0 || cur_h == 0 {
            break;
        }
        let ll_w = cur_w.div_ceil(2);
        let ll_h = cur_h.div_ceil(2);

        let mut out_l = vec![L::Sample::default(); ll_w];
        let mut out_h = vec![L::Sample::default(); cur_w / 2];
        for y in 0..cur_h {
            let row = &mut data[y * width..y * width + cur_w];
            L::forward(row, &mut out_l, &mut out_h);
            row[..ll_w].copy_from_slice(&out_l);
            row[ll_w..].copy_from_slice(&out_h);
        }

        let mut col = vec![L::Sample::default(); cur_h];
        let mut out_l = vec![L::Sample::default(); ll_h];
        let mut out_h = vec![L::Sample::default(); cur_h / 2];
        for x in 0..cur_w {
            for (y, v) in col.iter_mut().enumerate() {
                *v = data[y * width + x];
            }
            L::forward(&col, &mut out_l, &mut out_h);
            for (i, &v) in out_l.iter().chain(out_h.iter()).enumerate() {
                data[i * width + x] = v;
            }
        }

        cur_w = ll_w;
        cur_h = ll_h;
    }
}

// Synthesis filter taps, used for subband L2 norms.
const W5X3_SYNTH_LP: [f32; 3] = [0.5, 1.0, 0.5];
const W5X3_SYNTH_HP: [f32; 5] = [-0.125, -0.25, 0.75, -0.25, -0.125];
const W9X7_SYNTH_LP: [f32; 7] = [
    -0.091272, -0.057544, 0.591272, 1.115087, 0.591272, -0.057544, -0.091272,
];
const W9X7_SYNTH_HP: [f32; 9] = [
    0.026749, 0.016864, -0.078223, -0.266864, 0.602949, -0.266864, -0.078223, 0.016864, 0.026749,
];

/// Low-pass and high-pass synthesis filters of a filter bank.
pub fn synthesis_filters(filter: WaveletFilter) -> (&'static [f32], &'static [f32]) {
    match filter {
        WaveletFilter::W5x3 => (&W5X3_SYNTH_LP, &W5X3_SYNTH_HP),
        WaveletFilter::W9x7 => (&W9X7_SYNTH_LP, &W9X7_SYNTH_HP),
    }
}
