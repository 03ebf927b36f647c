use crate::Error;

/// Geometry of a single binning axis: an inclusive sampling range
/// `[lower, upper]` discretized into `bins` equal-width bins.
///
/// Both accumulators delegate their per-axis arithmetic here, so the
/// bounds-check, bin-index, and bin-center conventions are defined in
/// exactly one place.
///
/// # Boundary Policy
///
/// The range is inclusive at both ends. A coordinate exactly at `upper`
/// would naively index one past the last bin; [`Axis::bin`] clamps it
/// into the last bin instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axis {
    bins: usize,
    lower: f64,
    upper: f64,
    width: f64,
}

impl Axis {
    /// Creates an axis over `[lower, upper]` with `bins` bins.
    ///
    /// Rejects the degenerate geometries (zero bins, inverted or collapsed
    /// bounds) that would otherwise poison every later bin-index division.
    pub fn new(lower: f64, upper: f64, bins: usize) -> Result<Self, Error> {
        if bins == 0 || !(upper > lower) {
            Err(Error::Geometry { lower, upper, bins })
        } else {
            Ok(Self {
                bins,
                lower,
                upper,
                width: (upper - lower) / bins as f64,
            })
        }
    }
    /// Maps a coordinate to its bin index, or `None` if out of range.
    pub fn bin(&self, x: f64) -> Option<usize> {
        if x >= self.lower && x <= self.upper {
            let index = ((x - self.lower) / self.width) as usize;
            Some(index.min(self.bins - 1))
        } else {
            None
        }
    }
    /// The coordinate at the center of bin `i`.
    pub fn center(&self, i: usize) -> f64 {
        self.lower + self.width * (i as f64 + 0.5)
    }
    /// Number of bins along this axis.
    pub fn bins(&self) -> usize {
        self.bins
    }
    /// Inclusive lower edge of the sampling range.
    pub fn lower(&self) -> f64 {
        self.lower
    }
    /// Inclusive upper edge of the sampling range.
    pub fn upper(&self) -> f64 {
        self.upper
    }
    /// Width of each bin, `(upper - lower) / bins`.
    pub fn width(&self) -> f64 {
        self.width
    }
}
