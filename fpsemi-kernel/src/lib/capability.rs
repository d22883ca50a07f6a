//! The element-level capability interface: a single trait carrying the
//! handful of operations every concrete semigroup element needs to
//! support, so `OrbitEngine`, `CongruenceByPairs`, and `DClassEngine` can
//! all be generic over whichever concrete element type (transformations,
//! boolean matrices, ...) a caller plugs in, without this crate knowing
//! about any of them.

/// `identity(n)`, `product(a, b)`, `degree(a)`, `complexity(a)`,
/// `swap(a, b)`, `inverse(a)`, `action(a, p)`.
pub trait Capability: Clone + Eq + std::hash::Hash {
    /// The type of point this element acts on (may be `Self`, e.g. a
    /// transformation semigroup acting on itself by right multiplication).
    type Point: Clone + Eq + std::hash::Hash;

    fn identity(degree: usize) -> Self;
    fn product(&self, other: &Self) -> Self;
    fn degree(&self) -> usize;

    /// A cheap complexity estimate used only to rank candidates (e.g. by
    /// D-class rank); no fixed meaning is required beyond "larger is no
    /// simpler".
    fn complexity(&self, other: &Self) -> usize;

    fn swap(&mut self, other: &mut Self);

    /// `None` when `self` has no inverse (most semigroup elements don't).
    fn inverse(&self) -> Option<Self>;

    fn action(&self, point: &Self::Point) -> Self::Point;
}
