use crate::jpeg2000::subband::SubbandId;

/// Rectangular block of subband coefficients.
///
/// `data` may be larger than the block: sample `(x, y)` lives at
/// `offset + y * scanw + x`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CodeBlock<T> {
    pub data: Vec<T>,
    /// Origin relative to the transformed tile.
    pub ulx: usize,
    pub uly: usize,
    pub w: usize,
    pub h: usize,
    pub offset: usize,
    pub scanw: usize,
    /// Subband the block belongs to, in the tile-component's tree.
    pub sb: SubbandId,
    /// Row and column of the block within its subband.
    pub m: usize,
    pub n: usize,
    /// Magnitude bits of sign-magnitude output, 0 before quantization.
    pub magbits: i32,
    /// Factor applied to coefficients by quantization.
    pub convert_factor: f32,
    /// Quantization step in the coefficient domain, 1.0 when reversible.
    pub step_size: f32,
    pub wmse_scaling: f32,
}

impl<T: Copy + Default> CodeBlock<T> {
    /// Reshape to a dense `w` x `h` block, keeping the allocation.
    pub fn reset_dense(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.offset = 0;
        self.scanw = w;
        self.data.clear();
        self.data.resize(w * h, T::default());
        self.magbits = 0;
        self.convert_factor = 1.0;
        self.step_size = 1.0;
        self.wmse_scaling = 1.0;
    }

    pub fn at(&self, x: usize, y: usize) -> T {
        self.data[self.offset + y * self.scanw + x]
    }

    /// Samples of row `y`.
    pub fn row(&self, y: usize) -> &[T] {
        let start = self.offset + y * self.scanw;
        &self.data[start..start + self.w]
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        let start = self.offset + y * self.scanw;
        &mut self.data[start..start + self.w]
    }

    /// Copy the geometry of `other`, not its samples.
    pub fn copy_position<U>(&mut self, other: &CodeBlock<U>) {
        self.ulx = other.ulx;
        self.uly = other.uly;
        self.sb = other.sb;
        self.m = other.m;
        self.n = other.n;
        self.wmse_scaling = other.wmse_scaling;
    }
}

/// Magnitude of a sign-magnitude sample, as produced by quantization.
pub fn magnitude(v: i32) -> u32 {
    (v as u32) & 0x7fff_ffff
}

pub fn is_negative(v: i32) -> bool {
    v < 0
}
