/// Track lifecycle state.
///
/// Newly created tracks are `Tentative` until enough consecutive matches
/// accumulate, then `Confirmed`. Tracks that miss while tentative, or
/// outlive `max_age` without a match, become `Deleted` and are pruned
/// from the active set. `Deleted` is terminal; identities are never
/// resurrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackState {
    /// Newly created, not yet confirmed
    #[default]
    Tentative,
    /// Established identity with enough consecutive matches
    Confirmed,
    /// Marked for removal from the active set
    Deleted,
}
