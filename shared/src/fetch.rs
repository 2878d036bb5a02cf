//! Ordering of concurrent week fetches: only the answer to the last request
//! issued may be shown.

/// Handed out when a fetch starts, checked when its answer arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchSequence {
    latest: u64,
}

impl FetchSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch; every ticket issued before this one becomes stale
    pub fn issue(&mut self) -> FetchTicket {
        self.latest += 1;
        FetchTicket(self.latest)
    }

    /// Invalidate every fetch in flight, e.g. when a week arrived by
    /// another route
    pub fn supersede(&mut self) {
        self.latest += 1;
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_late_answer_to_older_fetch_is_stale() {
        let mut fetches = FetchSequence::new();
        let first = fetches.issue();
        let second = fetches.issue();

        // Answers arrive in reverse order
        assert!(fetches.is_current(second));
        assert!(!fetches.is_current(first));
    }

    #[test]
    fn test_supersede_drops_fetch_in_flight() {
        let mut fetches = FetchSequence::new();
        let ticket = fetches.issue();
        assert!(fetches.is_current(ticket));

        fetches.supersede();
        assert!(!fetches.is_current(ticket));
        let next = fetches.issue();
        assert!(fetches.is_current(next));
    }
}
