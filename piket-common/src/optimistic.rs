//! Speculative state with rollback
//!
//! Holds the last state confirmed by the server plus at most one speculative
//! state applied ahead of the round trip. On success the speculative state
//! becomes confirmed (or is replaced by what the server returned); on failure
//! it is dropped and readers see the confirmed state again.

/// Confirmed value plus an optional in-flight speculative value
#[derive(Debug, Clone, PartialEq)]
pub struct Optimistic<T: Clone> {
    confirmed: T,
    pending: Option<T>,
}

impl<T: Clone> Optimistic<T> {
    pub fn new(confirmed: T) -> Self {
        Self {
            confirmed,
            pending: None,
        }
    }

    /// What a reader should display right now
    pub fn current(&self) -> &T {
        self.pending.as_ref().unwrap_or(&self.confirmed)
    }

    /// Last state the server agreed with
    pub fn confirmed(&self) -> &T {
        &self.confirmed
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Apply a speculative change on top of the current view
    ///
    /// Stacks on an already pending value so consecutive edits compose.
    pub fn apply<F>(&mut self, change: F) -> &T
    where
        F: FnOnce(&mut T),
    {
        let mut next = self.current().clone();
        change(&mut next);
        self.pending.insert(next)
    }

    /// Round trip succeeded; keep the speculative state
    pub fn commit(&mut self) {
        if let Some(next) = self.pending.take() {
            self.confirmed = next;
        }
    }

    /// Round trip succeeded and the server sent back its own view
    pub fn reconcile(&mut self, server_state: T) {
        self.pending = None;
        self.confirmed = server_state;
    }

    /// Round trip failed; drop the speculative state
    pub fn revert(&mut self) -> &T {
        self.pending = None;
        &self.confirmed
    }

    /// Run a fallible round trip around a speculative change
    ///
    /// The change is visible while `send` runs. `Ok` commits, `Err` reverts
    /// and hands the error back.
    pub fn mutate<F, S, E>(&mut self, change: F, send: S) -> Result<&T, E>
    where
        F: FnOnce(&mut T),
        S: FnOnce(&T) -> Result<(), E>,
    {
        self.apply(change);
        let outcome = send(self.current());
        match outcome {
            Ok(()) => {
                self.commit();
                Ok(&self.confirmed)
            }
            Err(e) => {
                self.revert();
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_then_commit() {
        let mut state = Optimistic::new(vec![1]);
        state.apply(|v| v.push(2));
        assert!(state.is_pending());
        assert_eq!(state.current(), &vec![1, 2]);
        assert_eq!(state.confirmed(), &vec![1]);

        state.commit();
        assert!(!state.is_pending());
        assert_eq!(state.confirmed(), &vec![1, 2]);
    }

    #[test]
    fn test_revert_restores_confirmed() {
        let mut state = Optimistic::new(vec![1]);
        state.apply(|v| v.clear());
        assert_eq!(state.revert(), &vec![1]);
        assert_eq!(state.current(), &vec![1]);
    }

    #[test]
    fn test_stacked_changes_revert_together() {
        let mut state = Optimistic::new(0);
        state.apply(|n| *n += 1);
        state.apply(|n| *n += 1);
        assert_eq!(*state.current(), 2);
        state.revert();
        assert_eq!(*state.current(), 0);
    }

    #[test]
    fn test_reconcile_takes_server_view() {
        let mut state = Optimistic::new(vec!["a"]);
        state.apply(|v| v.push("b"));
        state.reconcile(vec!["a", "b", "c"]);
        assert_eq!(state.current(), &vec!["a", "b", "c"]);
    }

    #[test]
    fn test_mutate_failure_rolls_back() {
        let mut state = Optimistic::new(vec![10]);
        let result: Result<_, &str> = state.mutate(
            |v| v.push(20),
            |seen| {
                assert_eq!(seen, &vec![10, 20]);
                Err("network down")
            },
        );
        assert_eq!(result, Err("network down"));
        assert_eq!(state.current(), &vec![10]);
        assert!(!state.is_pending());
    }

    #[test]
    fn test_mutate_success_commits() {
        let mut state = Optimistic::new(vec![10]);
        let result: Result<_, ()> = state.mutate(|v| v.push(20), |_| Ok(()));
        assert_eq!(result, Ok(&vec![10, 20]));
        assert_eq!(state.confirmed(), &vec![10, 20]);
    }
}
