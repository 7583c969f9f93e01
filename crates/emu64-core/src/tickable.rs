//! Trait for components that can be advanced by clock ticks.

/// A component that can be advanced by clock ticks.
///
/// This is the core abstraction for cycle-accurate emulation. Every
/// component that owns its own bus access (or needs none) implements this
/// trait; CPUs implement [`crate::Cpu`] instead, because they borrow the
/// bus per cycle.
pub trait Tickable {
    /// Advance the component by one master clock tick.
    fn tick(&mut self);

    /// Advance the component by `count` ticks.
    ///
    /// Default implementation calls `tick()` in a loop. Components may
    /// override for efficiency, but must produce identical results.
    fn tick_n(&mut self, count: u64) {
        for _ in 0..count {
            self.tick();
        }
    }
}
