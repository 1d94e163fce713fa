//! Staleness signalling shared by everything that derives data from a topology.

/// Anything holding data derived from a topology (per-element arrays, the
/// engines keeping them in sync, …) should implement this so a host
/// data-flow graph can flag it stale without knowing its concrete type.
pub trait InvalidateCache {
    /// Mark derived data stale so the next refresh recomputes it.
    fn invalidate_cache(&mut self);
}

// Blanket impl for Box<T>
impl<T: InvalidateCache + ?Sized> InvalidateCache for Box<T> {
    #[inline]
    fn invalidate_cache(&mut self) {
        (**self).invalidate_cache();
    }
}
