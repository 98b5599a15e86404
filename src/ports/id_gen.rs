//! Case identity port.

/// Hands out the uuid stamped on every case when a tree is built.
///
/// Reports from separate runs are told apart by these ids, so a simulated
/// run substitutes a predictable sequence.
pub trait IdGenerator: Send + Sync {
    /// Returns an id no earlier call has returned.
    fn case_id(&self) -> String;
}
