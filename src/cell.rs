use crate::Weight;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

/// A single bin: an `f64` weight stored by bit pattern in an `AtomicU64`.
///
/// Bin selection is a pure function of a sample's coordinates, so the only
/// shared mutable state during accumulation is the one cell a sample lands
/// in. [`Cell::add`] makes that increment a single indivisible
/// read-modify-write, which is all the synchronization concurrent
/// accumulation needs. Relaxed ordering suffices: no other memory is
/// published through a bin and total mass is order-independent.
pub struct Cell(AtomicU64);

impl Cell {
    pub fn new(value: Weight) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }
    /// Atomically adds `weight` to the stored value.
    pub fn add(&self, weight: Weight) {
        let mut seen = self.0.load(Ordering::Relaxed);
        loop {
            let next = (Weight::from_bits(seen) + weight).to_bits();
            match self
                .0
                .compare_exchange_weak(seen, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => break,
                Err(bits) => seen = bits,
            }
        }
    }
    pub fn load(&self) -> Weight {
        Weight::from_bits(self.0.load(Ordering::Relaxed))
    }
    pub fn store(&self, value: Weight) {
        self.0.store(value.to_bits(), Ordering::Relaxed)
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::new(0.)
    }
}

impl Clone for Cell {
    fn clone(&self) -> Self {
        Self::new(self.load())
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Cell").field(&self.load()).finish()
    }
}
