use crate::Projection;
use crate::Weight;
use std::sync::Arc;

/// Broadcast fan-out of one sample stream to many independent 2-D
/// projections of the same `N`-dimensional sample space.
///
/// Members are shared-ownership handles, so the same projection can sit
/// in several collectors (or be held by the caller) at once. Insertion
/// order is preserved and defines broadcast order.
#[derive(Default)]
pub struct Collector<const N: usize> {
    members: Vec<Arc<Projection<N>>>,
}

impl<const N: usize> Collector<N> {
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
        }
    }
    /// Appends a shared projection handle.
    pub fn attach(&mut self, member: Arc<Projection<N>>) {
        self.members.push(member);
    }
    /// Takes sole ownership of a projection and appends it.
    pub fn adopt(&mut self, member: Projection<N>) {
        self.attach(Arc::new(member));
    }
    /// Forwards one weighted sample to every member in insertion order.
    pub fn add(&self, pos: &[f64; N], weight: Weight) {
        for member in self.members.iter() {
            member.add(pos, weight);
        }
    }
    /// Forwards `clear` to every member.
    pub fn clear(&self) {
        for member in self.members.iter() {
            member.clear();
        }
    }
    pub fn len(&self) -> usize {
        self.members.len()
    }
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
    /// Member at insertion index `i`, or `None` past the end.
    pub fn get(&self, i: usize) -> Option<&Arc<Projection<N>>> {
        self.members.get(i)
    }
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Projection<N>>> {
        self.members.iter()
    }
}
