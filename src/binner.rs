use crate::Arbitrary;
use crate::Axis;
use crate::Cell;
use crate::Encoding;
use crate::Error;
use crate::Lattice;
use crate::Scale;
use crate::Weight;
use std::path::Path;

/// Normalization target for an accumulated grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Norm {
    /// Rescale so the maximum bin becomes 1.
    Peak,
    /// Rescale so the bins sum to 1.
    Unity,
}

/// General N-dimensional histogram accumulator.
///
/// Owns a dense [`Lattice`] of atomic bin weights plus the per-axis
/// geometry. Accumulation ([`Binner::add`]) is safe from many threads at
/// once; every other operation assumes producers have quiesced first.
///
/// # Lifecycle
///
/// Bounds and bin widths are fixed at construction. Grid contents mutate
/// only through `add`, `clear`, and `normalize`.
#[derive(Debug)]
pub struct Binner {
    axes: Vec<Axis>,
    grid: Lattice<Cell>,
}

impl Binner {
    /// Creates an accumulator over the axis-aligned box
    /// `[lower[i], upper[i]]` with `bins[i]` bins along each axis.
    ///
    /// All three slices must agree on length and describe at least one
    /// axis; each axis must have a positive extent and bin count.
    pub fn new(lower: &[f64], upper: &[f64], bins: &[usize]) -> Result<Self, Error> {
        if lower.is_empty() || lower.len() != upper.len() || lower.len() != bins.len() {
            return Err(Error::Dimension {
                expected: lower.len().max(1),
                observed: upper.len().min(bins.len()),
            });
        }
        let axes = lower
            .iter()
            .zip(upper.iter())
            .zip(bins.iter())
            .map(|((&lo, &hi), &n)| Axis::new(lo, hi, n))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            grid: Lattice::new(bins),
            axes,
        })
    }

    /// Accumulates one weighted sample point.
    ///
    /// A point with any coordinate outside its axis range is silently
    /// dropped. A coordinate exactly on the upper edge lands in the last
    /// bin. Safe to call concurrently from many threads.
    pub fn add(&self, pos: &[f64], weight: Weight) {
        debug_assert_eq!(pos.len(), self.axes.len());
        let mut linear = 0;
        for (i, (axis, &x)) in self.axes.iter().zip(pos.iter()).enumerate() {
            match axis.bin(x) {
                Some(index) => linear += index * self.grid.stride(i),
                None => return,
            }
        }
        self.grid.at(linear).add(weight);
    }

    /// Resets every bin to zero. Not safe concurrent with `add`.
    pub fn clear(&self) {
        self.grid.iter().for_each(|cell| cell.store(0.));
    }

    /// Divides every bin by the chosen norm.
    ///
    /// Normalizing an all-zero grid divides by zero and leaves every bin
    /// non-finite; avoiding that is the caller's responsibility.
    pub fn normalize(&self, norm: Norm) {
        let norm = match norm {
            Norm::Peak => self.peak(),
            Norm::Unity => self.sum(),
        };
        self.grid.iter().for_each(|cell| cell.store(cell.load() / norm));
    }

    /// Serializes the grid to a file in the requested encoding and scale.
    pub fn save(&self, path: impl AsRef<Path>, encoding: Encoding, scale: Scale) -> Result<(), Error> {
        log::info!("{:<32}{:<32}", "saving nd histogram", path.as_ref().display());
        crate::save::write_grid(path.as_ref(), &self.axes, &self.snapshot(), encoding, scale)
    }

    /// Accumulated weight in one bin.
    pub fn weight(&self, index: &[usize]) -> Weight {
        self.grid.get(index).load()
    }
    /// Total accumulated mass.
    pub fn sum(&self) -> Weight {
        self.grid.iter().map(Cell::load).sum()
    }
    /// Largest single bin.
    pub fn peak(&self) -> Weight {
        self.grid.iter().map(Cell::load).fold(0., Weight::max)
    }
    /// Per-axis geometry.
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }
    /// Number of axes.
    pub fn dimensions(&self) -> usize {
        self.axes.len()
    }
    /// Total number of bins.
    pub fn len(&self) -> usize {
        self.grid.len()
    }
    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// Copies the bins out of their atomic cells in native linear order.
    fn snapshot(&self) -> Vec<Weight> {
        self.grid.iter().map(Cell::load).collect()
    }
}

impl Arbitrary for Binner {
    fn random() -> Self {
        use rand::Rng;
        let mut rng = rand::rng();
        let dimensions = rng.random_range(1..=3);
        let lower = (0..dimensions)
            .map(|_| rng.random_range(-8.0..0.0))
            .collect::<Vec<_>>();
        let upper = (0..dimensions)
            .map(|_| rng.random_range(1.0..8.0))
            .collect::<Vec<_>>();
        let bins = (0..dimensions)
            .map(|_| rng.random_range(2..=8))
            .collect::<Vec<_>>();
        let binner = Self::new(&lower, &upper, &bins).expect("positive extents");
        for _ in 0..64 {
            let pos = lower
                .iter()
                .zip(upper.iter())
                .map(|(&lo, &hi)| rng.random_range(lo..hi))
                .collect::<Vec<_>>();
            binner.add(&pos, rng.random_range(0.0..1.0));
        }
        binner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square(bins: usize) -> Binner {
        Binner::new(&[0., 0.], &[1., 1.], &[bins, bins]).expect("binner")
    }

    #[test]
    fn out_of_range_points_leave_every_bin_unchanged() {
        let binner = unit_square(4);
        binner.add(&[0.5, 1.5], 1.);
        binner.add(&[-0.1, 0.5], 1.);
        binner.add(&[f64::NAN, 0.5], 1.);
        assert_eq!(binner.sum(), 0.);
    }

    #[test]
    fn accumulation_is_linear_in_weight() {
        let a = unit_square(4);
        let b = unit_square(4);
        a.add(&[0.3, 0.7], 1.25);
        a.add(&[0.3, 0.7], 0.75);
        b.add(&[0.3, 0.7], 2.0);
        assert_eq!(a.weight(&[1, 2]), b.weight(&[1, 2]));
        assert_eq!(a.sum(), b.sum());
    }

    #[test]
    fn upper_corner_lands_in_last_bin() {
        let binner = unit_square(4);
        binner.add(&[1.0, 1.0], 1.);
        assert_eq!(binner.weight(&[3, 3]), 1.);
    }

    #[test]
    fn normalize_to_peak_scales_maximum_to_one() {
        let binner = unit_square(2);
        binner.add(&[0.1, 0.1], 400.);
        binner.add(&[0.9, 0.9], 100.);
        binner.normalize(Norm::Peak);
        assert!((binner.peak() - 1.0).abs() < 1e-12);
        assert!((binner.weight(&[1, 1]) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn normalize_to_unity_scales_sum_to_one() {
        let binner = unit_square(3);
        binner.add(&[0.1, 0.1], 4.);
        binner.add(&[0.5, 0.5], 12.);
        binner.add(&[0.9, 0.9], 16.);
        binner.normalize(Norm::Unity);
        assert!((binner.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn clear_zeroes_the_grid() {
        let binner = unit_square(4);
        binner.add(&[0.5, 0.5], 3.);
        binner.clear();
        assert_eq!(binner.sum(), 0.);
        assert_eq!(binner.peak(), 0.);
    }

    #[test]
    fn mismatched_axis_arguments_are_rejected() {
        assert!(Binner::new(&[0.], &[1., 2.], &[4]).is_err());
        assert!(Binner::new(&[], &[], &[]).is_err());
        assert!(Binner::new(&[0.], &[1.], &[0]).is_err());
        assert!(Binner::new(&[1.], &[0.], &[4]).is_err());
    }

    #[test]
    fn arbitrary_grids_hold_their_mass_inside_bounds() {
        for _ in 0..8 {
            let binner = Binner::random();
            assert!(binner.sum() > 0.);
            assert!(binner.peak() <= binner.sum());
        }
    }
}
