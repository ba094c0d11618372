//! Local/remote candidate pairs.

use crate::candidate::Candidate;

/// A local candidate paired with a remote one, ranked with the RFC 5245
/// §5.7.2 pair priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePair {
    pub local: Candidate,
    pub remote: Candidate,
    pub priority: u64,
}

impl CandidatePair {
    /// `controlling` is true on the endpoint that sent the offer.
    pub fn new(local: Candidate, remote: Candidate, controlling: bool) -> Self {
        let (g, d) = if controlling {
            (local.priority, remote.priority)
        } else {
            (remote.priority, local.priority)
        };
        let priority = Self::calculate_priority(g, d);

        Self {
            local,
            remote,
            priority,
        }
    }

    /// pair priority = 2^32 * MIN(G,D) + 2 * MAX(G,D) + (G>D ? 1 : 0)
    fn calculate_priority(g: u32, d: u32) -> u64 {
        let min = g.min(d) as u64;
        let max = g.max(d) as u64;
        let g_greater = u64::from(g > d);

        (1u64 << 32) * min + 2 * max + g_greater
    }
}
