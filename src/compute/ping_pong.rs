//! Ping-pong selection between the two cell-state bind groups.

/// Tick counter selecting which of two resource sets is read this tick.
///
/// Set `i` reads state buffer `i` and writes buffer `1 - i`. On tick `t`
/// the compute pass uses set `t % 2`; once the tick is submitted the
/// counter advances, so the render pass that follows reads the buffer the
/// dispatch just wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PingPong {
    tick: u64,
}

impl PingPong {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completed ticks.
    #[inline]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Index of the set whose read slot holds the latest state.
    #[inline]
    pub fn read_index(&self) -> usize {
        (self.tick % 2) as usize
    }

    /// Index of the buffer the next dispatch writes.
    #[inline]
    pub fn write_index(&self) -> usize {
        1 - self.read_index()
    }

    /// Advance to the next tick.
    #[inline]
    pub fn advance(&mut self) {
        self.tick += 1;
    }

    /// Pick the element of a pair read on this tick.
    #[inline]
    pub fn select<'a, T>(&self, pair: &'a [T; 2]) -> &'a T {
        &pair[self.read_index()]
    }
}
