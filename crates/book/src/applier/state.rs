/// Readiness state of the book applier
/// Domain concept representing the snapshot + delta protocol state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplierState {
    /// No snapshot applied yet
    Uninitialized,
    /// First snapshot applied; deltas keep flowing until shutdown
    Initialized,
}

impl ApplierState {
    /// Check if the book can be read as a full picture
    pub fn is_ready(&self) -> bool {
        matches!(self, ApplierState::Initialized)
    }
}
