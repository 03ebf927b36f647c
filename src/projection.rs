use crate::Axis;
use crate::Cell;
use crate::Encoding;
use crate::Error;
use crate::Scale;
use crate::Weight;
use std::path::Path;

/// A 2-D histogram accumulator embedded in an `N`-dimensional sample space.
///
/// Each incoming sample carries all `N` coordinates; the projection reads
/// only the two at `select[0]` and `select[1]` and bins them against its
/// own bounds. The bins live in one dense row-major buffer (`axes[0]`
/// major) with no lattice indirection.
///
/// The sample dimension is a type parameter, so feeding a projection from
/// the wrong sample space is a compile error rather than a runtime one.
#[derive(Debug)]
pub struct Projection<const N: usize> {
    axes: [Axis; 2],
    select: [usize; 2],
    grid: Vec<Cell>,
}

impl<const N: usize> Projection<N> {
    /// Creates a projection binning sample coordinates `select[0]` and
    /// `select[1]` over the given 2-D bounds and resolution.
    ///
    /// Rejects selectors outside the sample dimension and degenerate axis
    /// geometry.
    pub fn new(
        lower: [f64; 2],
        upper: [f64; 2],
        bins: [usize; 2],
        select: [usize; 2],
    ) -> Result<Self, Error> {
        if let Some(&s) = select.iter().find(|&&s| s >= N) {
            return Err(Error::Selector {
                select: s,
                dimension: N,
            });
        }
        let axes = [
            Axis::new(lower[0], upper[0], bins[0])?,
            Axis::new(lower[1], upper[1], bins[1])?,
        ];
        let grid = (0..bins[0] * bins[1]).map(|_| Cell::default()).collect();
        Ok(Self { axes, select, grid })
    }

    /// Accumulates one weighted sample, binning only the two selected
    /// coordinates. Out-of-range samples are silently dropped; the upper
    /// edge clamps into the last bin. Safe to call concurrently.
    pub fn add(&self, pos: &[f64; N], weight: Weight) {
        let Some(row) = self.axes[0].bin(pos[self.select[0]]) else {
            return;
        };
        let Some(col) = self.axes[1].bin(pos[self.select[1]]) else {
            return;
        };
        self.grid[row * self.axes[1].bins() + col].add(weight);
    }

    /// Resets every bin to zero. Not safe concurrent with `add`.
    pub fn clear(&self) {
        self.grid.iter().for_each(|cell| cell.store(0.));
    }

    /// Divides every bin by the chosen norm; all-zero grids go non-finite,
    /// exactly as for [`crate::Binner::normalize`].
    pub fn normalize(&self, norm: crate::Norm) {
        let norm = match norm {
            crate::Norm::Peak => self.peak(),
            crate::Norm::Unity => self.sum(),
        };
        self.grid.iter().for_each(|cell| cell.store(cell.load() / norm));
    }

    /// Serializes the grid through the same codec as the N-D accumulator.
    pub fn save(&self, path: impl AsRef<Path>, encoding: Encoding, scale: Scale) -> Result<(), Error> {
        log::info!("{:<32}{:<32}", "saving 2d histogram", path.as_ref().display());
        crate::save::write_grid(path.as_ref(), &self.axes, &self.snapshot(), encoding, scale)
    }

    /// Accumulated weight in one bin.
    pub fn weight(&self, row: usize, col: usize) -> Weight {
        self.grid[row * self.axes[1].bins() + col].load()
    }
    /// Total accumulated mass.
    pub fn sum(&self) -> Weight {
        self.grid.iter().map(Cell::load).sum()
    }
    /// Largest single bin.
    pub fn peak(&self) -> Weight {
        self.grid.iter().map(Cell::load).fold(0., Weight::max)
    }
    /// The two binning axes.
    pub fn axes(&self) -> &[Axis; 2] {
        &self.axes
    }
    /// Which sample coordinates this projection bins.
    pub fn select(&self) -> [usize; 2] {
        self.select
    }

    fn snapshot(&self) -> Vec<Weight> {
        self.grid.iter().map(Cell::load).collect()
    }
}

/// Diagnostic matrix rendering: axis-1 rows top-down from the highest
/// index, axis-1 bin centers as the leading column, axis-0 bin centers as
/// the footer row.
impl<const N: usize> std::fmt::Display for Projection<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for col in (0..self.axes[1].bins()).rev() {
            write!(f, "{:.3}\t||\t", self.axes[1].center(col))?;
            for row in 0..self.axes[0].bins() {
                write!(f, "{:.3}\t", self.weight(row, col))?;
            }
            writeln!(f)?;
        }
        for _ in 0..self.axes[0].bins() + 2 {
            write!(f, "====\t")?;
        }
        writeln!(f)?;
        write!(f, "\t||\t")?;
        for row in 0..self.axes[0].bins() {
            write!(f, "{:.3}\t", self.axes[0].center(row))?;
        }
        writeln!(f)
    }
}
