/// Snapshot stack backing the simulators' [`Journaled`](crate::market::Journaled) impls.
#[derive(Debug)]
pub struct Journal<T: Clone> {
    snapshots: Vec<T>,
}

/// Position in a [`Journal`]. Consumed by commit/revert so it cannot be reused.
#[derive(Debug, PartialEq, Eq)]
pub struct SnapshotId(usize);

impl<T: Clone> Journal<T> {
    pub fn new() -> Self {
        Journal {
            snapshots: Vec::new(),
        }
    }

    pub fn depth(&self) -> usize {
        self.snapshots.len()
    }

    pub fn checkpoint(&mut self, state: &T) -> SnapshotId {
        self.snapshots.push(state.clone());
        SnapshotId(self.snapshots.len() - 1)
    }

    pub fn commit(&mut self, id: SnapshotId) {
        self.snapshots.truncate(id.0);
    }

    pub fn revert(&mut self, id: SnapshotId, state: &mut T) {
        if let Some(snapshot) = self.snapshots.drain(id.0..).next() {
            *state = snapshot;
        }
    }
}

impl<T: Clone> Default for Journal<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_revert_restores_outer_snapshot() {
        let mut journal = Journal::new();
        let mut state = 1u32;

        let outer = journal.checkpoint(&state);
        state = 2;
        let _inner = journal.checkpoint(&state);
        state = 3;

        journal.revert(outer, &mut state);
        assert_eq!(state, 1);
        assert_eq!(journal.depth(), 0);
    }

    #[test]
    fn commit_keeps_changes() {
        let mut journal = Journal::new();
        let mut state = vec![1];
        let cp = journal.checkpoint(&state);
        state.push(2);
        journal.commit(cp);
        assert_eq!(state, vec![1, 2]);
        assert_eq!(journal.depth(), 0);
    }
}
