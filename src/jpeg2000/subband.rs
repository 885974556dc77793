//! Subband decomposition tree of a tile-component.
//!
//! The tree is stored in an arena. Only LL bands are ever split, so every
//! node has either no children or exactly four (LL, HL, LH, HH).

use crate::jpeg2000::dwt::synthesis_filters;
use crate::jpeg2000::image::SubbandOrientation;
use crate::jpeg2000::spec::WaveletFilter;

/// Index of a subband inside its [`SubbandTree`].
pub type SubbandId = usize;

#[derive(Debug, Clone, PartialEq)]
pub struct Subband {
    pub orientation: SubbandOrientation,
    /// True if the subband was split further.
    pub is_node: bool,
    /// Number of decompositions that produced this subband.
    pub level: usize,
    /// Resolution level the subband belongs to, 0 being the lowest.
    pub res_level: usize,
    /// Index within the resolution level: LL 0, HL 1, LH 2, HH 3.
    pub sb_index: usize,
    /// Position in the transformed tile, where the 2D DWT leaves it.
    pub ulx: usize,
    pub uly: usize,
    /// Position on the subband's own sampling grid.
    pub ulcx: usize,
    pub ulcy: usize,
    pub w: usize,
    pub h: usize,
    /// log2 of the nominal analysis gain.
    pub an_gain_exp: i32,
    /// L2 norm of the synthesis basis function.
    pub l2_norm: f32,
    /// Squared quantization step weighted by the synthesis energy. Zero until
    /// computed; nodes hold 1.0.
    pub step_wmse: f32,
    pub children: Option<[SubbandId; 4]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubbandTree {
    nodes: Vec<Subband>,
    filter: WaveletFilter,
    levels: usize,
}

impl SubbandTree {
    /// Decompose a `w` x `h` tile-component `levels` times.
    pub fn new(w: usize, h: usize, levels: usize, filter: WaveletFilter) -> Self {
        let root = Subband {
            orientation: SubbandOrientation::LL,
            is_node: false,
            level: 0,
            res_level: levels,
            sb_index: 0,
            ulx: 0,
            uly: 0,
            ulcx: 0,
            ulcy: 0,
            w,
            h,
            an_gain_exp: 0,
            l2_norm: 1.0,
            step_wmse: 0.0,
            children: None,
        };
        let mut tree = Self {
            nodes: vec![root],
            filter,
            levels,
        };
        let mut current = 0;
        for _ in 0..levels {
            current = tree.split(current);
        }
        // Norms depend on the level and orientation only.
        let norms: Vec<[f32; 4]> = (0..=levels)
            .map(|level| SubbandOrientation::ALL.map(|o| l2_norm(filter, level, o)))
            .collect();
        for node in &mut tree.nodes {
            node.l2_norm = if node.is_node {
                0.0
            } else {
                norms[node.level][node.orientation.index()]
            };
        }
        tree
    }

    /// Split subband `id` into its four children and return the new LL.
    fn split(&mut self, id: SubbandId) -> SubbandId {
        let parent = self.nodes[id].clone();
        let ll_ulcx = parent.ulcx.div_ceil(2);
        let ll_ulcy = parent.ulcy.div_ceil(2);
        let ll_w = (parent.ulcx + parent.w).div_ceil(2) - ll_ulcx;
        let ll_h = (parent.ulcy + parent.h).div_ceil(2) - ll_ulcy;
        let hi_ulcx = parent.ulcx / 2;
        let hi_ulcy = parent.ulcy / 2;
        let hi_w = (parent.ulcx + parent.w) / 2 - hi_ulcx;
        let hi_h = (parent.ulcy + parent.h) / 2 - hi_ulcy;

        let child = |orientation: SubbandOrientation| {
            let (high_x, high_y) = match orientation {
                SubbandOrientation::LL => (false, false),
                SubbandOrientation::HL => (true, false),
                SubbandOrientation::LH => (false, true),
                SubbandOrientation::HH => (true, true),
            };
            Subband {
                orientation,
                is_node: false,
                level: parent.level + 1,
                res_level: if orientation == SubbandOrientation::LL {
                    parent.res_level - 1
                } else {
                    parent.res_level
                },
                sb_index: orientation.index(),
                ulx: parent.ulx + if high_x { ll_w } else { 0 },
                uly: parent.uly + if high_y { ll_h } else { 0 },
                ulcx: if high_x { hi_ulcx } else { ll_ulcx },
                ulcy: if high_y { hi_ulcy } else { ll_ulcy },
                w: if high_x { hi_w } else { ll_w },
                h: if high_y { hi_h } else { ll_h },
                an_gain_exp: parent.an_gain_exp + high_x as i32 + high_y as i32,
                l2_norm: 0.0,
                step_wmse: 0.0,
                children: None,
            }
        };

        let first = self.nodes.len();
        for orientation in SubbandOrientation::ALL {
            self.nodes.push(child(orientation));
        }
        let node = &mut self.nodes[id];
        node.is_node = true;
        node.children = Some([first, first + 1, first + 2, first + 3]);
        first
    }

    pub fn filter(&self) -> WaveletFilter {
        self.filter
    }

    pub fn levels(&self) -> usize {
        self.levels
    }

    pub fn root(&self) -> &Subband {
        &self.nodes[0]
    }

    pub fn get(&self, id: SubbandId) -> &Subband {
        &self.nodes[id]
    }

    pub fn get_mut(&mut self, id: SubbandId) -> &mut Subband {
        &mut self.nodes[id]
    }

    pub fn nodes(&self) -> &[Subband] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Subband] {
        &mut self.nodes
    }

    /// Leaf subbands from the lowest resolution up: the deepest LL, then
    /// HL, LH, HH of each level from the deepest to the first. This is the
    /// order of the step sizes in a QCD/QCC marker.
    pub fn leaves(&self) -> Vec<SubbandId> {
        let mut ll = 0;
        let mut chain = vec![ll];
        while let Some(children) = self.nodes[ll].children {
            ll = children[0];
            chain.push(ll);
        }
        let mut leaves = Vec::with_capacity(1 + 3 * self.levels);
        leaves.push(ll);
        for &node in chain.iter().rev().skip(1) {
            if let Some([_, hl, lh, hh]) = self.nodes[node].children {
                leaves.extend([hl, lh, hh]);
            }
        }
        leaves
    }
}

/// Autocorrelation of a sequence at lags `0..=max_lag`.
fn autocorrelation(taps: &[f32], max_lag: usize) -> Vec<f64> {
    (0..=max_lag)
        .map(|k| {
            taps.iter()
                .zip(taps.iter().skip(k))
                .map(|(&a, &b)| a as f64 * b as f64)
                .sum()
        })
        .collect()
}

/// Norm of the 1D synthesis waveform reached after `level` reconstructions.
///
/// The waveform itself grows as 2^level, so only its autocorrelation is
/// tracked. Upsampling keeps the even lags and convolving with the taps
/// convolves the autocorrelations, which keeps lags beyond the tap length
/// out of the energy.
fn waveform_norm(filter: WaveletFilter, level: usize, high: bool) -> f32 {
    if level == 0 {
        return 1.0;
    }
    let (lp, hp) = synthesis_filters(filter);
    let window = lp.len().max(hp.len());
    let lp_corr = autocorrelation(lp, window);
    let hp_corr = autocorrelation(hp, window);
    let lag = |corr: &[f64], k: isize| corr.get(k.unsigned_abs()).copied().unwrap_or(0.0);

    // Autocorrelation of the single sample waveform.
    let mut corr = vec![0.0f64; window + 1];
    corr[0] = 1.0;
    for step in 0..level {
        let taps = if step == 0 && high { &hp_corr } else { &lp_corr };
        let next: Vec<f64> = (0..=window as isize)
            .map(|k| {
                (-(window as isize)..=window as isize)
                    .filter(|j| (k - j) % 2 == 0)
                    .map(|j| lag(taps.as_slice(), j) * lag(corr.as_slice(), (k - j) / 2))
                    .sum()
            })
            .collect();
        corr = next;
    }
    corr[0].sqrt() as f32
}

/// L2 norm of the 2D synthesis basis function of a subband.
pub fn l2_norm(filter: WaveletFilter, level: usize, orientation: SubbandOrientation) -> f32 {
    let (high_x, high_y) = match orientation {
        SubbandOrientation::LL => (false, false),
        SubbandOrientation::HL => (true, false),
        SubbandOrientation::LH => (false, true),
        SubbandOrientation::HH => (true, true),
    };
    waveform_norm(filter, level, high_x) * waveform_norm(filter, level, high_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_odd_size() {
        let tree = SubbandTree::new(5, 3, 1, WaveletFilter::W5x3);
        let [ll, hl, lh, hh] = tree.root().children.unwrap();
        let (ll, hl, lh, hh) = (tree.get(ll), tree.get(hl), tree.get(lh), tree.get(hh));
        assert_eq!((ll.w, ll.h), (3, 2));
        assert_eq!((hl.w, hl.h), (2, 2));
        assert_eq!((lh.w, lh.h), (3, 1));
        assert_eq!((hh.w, hh.h), (2, 1));
        assert_eq!((hl.ulx, hl.uly), (3, 0));
        assert_eq!((lh.ulx, lh.uly), (0, 2));
        assert_eq!((hh.ulx, hh.uly), (3, 2));
    }

    #[test]
    fn test_gains_and_resolution_levels() {
        let tree = SubbandTree::new(64, 64, 3, WaveletFilter::W9x7);
        let leaves = tree.leaves();
        assert_eq!(leaves.len(), 10);

        let first = tree.get(leaves[0]);
        assert_eq!(first.orientation, SubbandOrientation::LL);
        assert_eq!((first.level, first.res_level, first.an_gain_exp), (3, 0, 0));
        assert_eq!((first.w, first.h), (8, 8));

        let hh = tree.get(leaves[3]);
        assert_eq!(hh.orientation, SubbandOrientation::HH);
        assert_eq!((hh.level, hh.res_level, hh.an_gain_exp), (3, 1, 2));

        let last = tree.get(leaves[9]);
        assert_eq!((last.level, last.res_level, last.w), (1, 3, 32));
        assert!(tree.root().is_node);
    }

    #[test]
    fn test_no_decomposition() {
        let tree = SubbandTree::new(7, 9, 0, WaveletFilter::W5x3);
        assert_eq!(tree.leaves(), vec![0]);
        assert_eq!(tree.root().l2_norm, 1.0);
        assert_eq!(tree.root().res_level, 0);
    }

    #[test]
    fn test_l2_norms() {
        // 5/3 first level: LP taps give sqrt(1.5), HP taps sqrt(0.71875).
        let ll = l2_norm(WaveletFilter::W5x3, 1, SubbandOrientation::LL);
        assert!((ll - 1.5).abs() < 1e-6);
        let hh = l2_norm(WaveletFilter::W5x3, 1, SubbandOrientation::HH);
        assert!((hh - 0.71875).abs() < 1e-6);
        let hl = l2_norm(WaveletFilter::W5x3, 1, SubbandOrientation::HL);
        assert!((hl - (1.5f32 * 0.71875).sqrt()).abs() < 1e-6);

        // Deeper LL bands gain energy.
        let deep = l2_norm(WaveletFilter::W9x7, 4, SubbandOrientation::LL);
        let shallow = l2_norm(WaveletFilter::W9x7, 1, SubbandOrientation::LL);
        assert!(deep > shallow);
    }

    #[test]
    fn test_norms_match_explicit_waveform() {
        fn up_convolve(w: &[f32], taps: &[f32]) -> Vec<f32> {
            let mut out = vec![0.0f32; 2 * w.len() - 1 + taps.len() - 1];
            for (i, &v) in w.iter().enumerate() {
                for (k, &t) in taps.iter().enumerate() {
                    out[2 * i + k] += v * t;
                }
            }
            out
        }
        for filter in [WaveletFilter::W5x3, WaveletFilter::W9x7] {
            let (lp, hp) = synthesis_filters(filter);
            for high in [false, true] {
                let mut w = up_convolve(&[1.0], if high { hp } else { lp });
                for level in 1..=6 {
                    let norm = w.iter().map(|v| v * v).sum::<f32>().sqrt();
                    let fast = waveform_norm(filter, level, high);
                    assert!((fast - norm).abs() <= norm * 1e-5, "{filter} {level} {high}");
                    w = up_convolve(&w, lp);
                }
            }
        }
    }

    #[test]
    fn test_deepest_decomposition_is_cheap() {
        let tree = SubbandTree::new(4, 4, 32, WaveletFilter::W9x7);
        let leaves = tree.leaves();
        assert_eq!(leaves.len(), 97);
        for &id in &leaves {
            let band = tree.get(id);
            assert!(band.l2_norm.is_finite() && band.l2_norm > 0.0);
        }
        let deepest = tree.get(leaves[0]);
        assert_eq!((deepest.level, deepest.w, deepest.h), (32, 1, 1));
    }
}
