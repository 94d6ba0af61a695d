//! Wall-clock time effects

/// Source of wall-clock time for sleep deadlines
pub trait TimeEffects: Send + Sync {
    /// Milliseconds since the Unix epoch
    fn now_ms(&self) -> u64;
}
