/// A dense N-dimensional array stored as one contiguous buffer.
///
/// Index conversion is pure stride arithmetic: `strides[i]` is the linear
/// distance between neighbors along axis `i`, computed once at
/// construction with the last axis contiguous (row-major). No dynamic
/// dispatch, no per-element bookkeeping.
#[derive(Debug, Clone)]
pub struct Lattice<T> {
    shape: Vec<usize>,
    strides: Vec<usize>,
    cells: Vec<T>,
}

impl<T> Lattice<T>
where
    T: Default,
{
    /// Allocates a lattice with the given per-axis extents, every cell
    /// default-initialized.
    pub fn new(shape: &[usize]) -> Self {
        let mut strides = vec![1; shape.len()];
        for i in (0..shape.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * shape[i + 1];
        }
        let cells = (0..shape.iter().product::<usize>())
            .map(|_| T::default())
            .collect();
        Self {
            shape: shape.to_vec(),
            strides,
            cells,
        }
    }
}

impl<T> Lattice<T> {
    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
    /// Number of axes.
    pub fn dimensions(&self) -> usize {
        self.shape.len()
    }
    /// Extent along one axis.
    pub fn width(&self, axis: usize) -> usize {
        self.shape[axis]
    }
    /// Linear distance between neighbors along one axis.
    pub fn stride(&self, axis: usize) -> usize {
        self.strides[axis]
    }
    /// Collapses a multi-index into its linear position.
    pub fn flatten(&self, index: &[usize]) -> usize {
        debug_assert_eq!(index.len(), self.shape.len());
        index
            .iter()
            .zip(self.strides.iter())
            .map(|(i, s)| i * s)
            .sum()
    }
    /// Recovers the multi-index of a linear position.
    pub fn coords(&self, linear: usize) -> Vec<usize> {
        self.strides
            .iter()
            .zip(self.shape.iter())
            .map(|(s, w)| linear / s % w)
            .collect()
    }
    /// Cell at a linear position.
    pub fn at(&self, linear: usize) -> &T {
        &self.cells[linear]
    }
    /// Cell at a multi-index.
    pub fn get(&self, index: &[usize]) -> &T {
        &self.cells[self.flatten(index)]
    }
    pub fn get_mut(&mut self, index: &[usize]) -> &mut T {
        let linear = self.flatten(index);
        &mut self.cells[linear]
    }
    /// Iterates over every cell in linear order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.cells.iter()
    }
    /// Iterates over every cell in linear order together with its
    /// recovered multi-index.
    pub fn positions(&self) -> impl Iterator<Item = (Vec<usize>, &T)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(linear, cell)| (self.coords(linear), cell))
    }
    /// Overwrites every cell with a constant.
    pub fn fill(&mut self, value: T)
    where
        T: Clone,
    {
        self.cells.fill(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strides_are_row_major() {
        let lattice = Lattice::<u32>::new(&[2, 3, 4]);
        assert_eq!(lattice.stride(0), 12);
        assert_eq!(lattice.stride(1), 4);
        assert_eq!(lattice.stride(2), 1);
        assert_eq!(lattice.len(), 24);
    }

    #[test]
    fn flatten_and_coords_are_inverse() {
        let lattice = Lattice::<u32>::new(&[3, 4, 5]);
        for linear in 0..lattice.len() {
            assert_eq!(lattice.flatten(&lattice.coords(linear)), linear);
        }
    }

    #[test]
    fn positions_recover_each_multi_index() {
        let mut lattice = Lattice::<usize>::new(&[2, 3]);
        for i in 0..2 {
            for j in 0..3 {
                *lattice.get_mut(&[i, j]) = i * 10 + j;
            }
        }
        for (index, cell) in lattice.positions() {
            assert_eq!(*cell, index[0] * 10 + index[1]);
        }
    }

    #[test]
    fn fill_overwrites_every_cell() {
        let mut lattice = Lattice::<f64>::new(&[4, 4]);
        lattice.fill(7.);
        assert!(lattice.iter().all(|&x| x == 7.));
    }
}
