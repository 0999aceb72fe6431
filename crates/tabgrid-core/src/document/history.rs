//! Bounded linear undo/redo log over whole-document snapshots.

#[derive(Debug)]
pub(crate) struct History {
    snapshots: Vec<String>,
    index: usize,
    limit: usize,
    restoring: bool,
}

impl History {
    pub(crate) fn new(limit: usize) -> History {
        History {
            snapshots: Vec::new(),
            index: 0,
            limit: limit.max(1),
            restoring: false,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.snapshots.clear();
        self.index = 0;
    }

    /// Appends a snapshot after the current position, discarding any
    /// redo entries beyond it. Once the limit is exceeded the oldest
    /// entry falls off. Ignored while a restoration is in progress.
    pub(crate) fn record(&mut self, snapshot: &str) {
        if self.restoring {
            return;
        }
        if !self.snapshots.is_empty() {
            self.snapshots.truncate(self.index + 1);
        }
        self.snapshots.push(snapshot.to_string());
        self.index = self.snapshots.len() - 1;
        if self.snapshots.len() > self.limit {
            self.snapshots.remove(0);
            self.index -= 1;
        }
    }

    /// Steps back one entry. `None` at the oldest retained snapshot.
    pub(crate) fn undo(&mut self) -> Option<&str> {
        if self.snapshots.is_empty() || self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(&self.snapshots[self.index])
    }

    /// Steps forward one entry. `None` at the newest snapshot.
    pub(crate) fn redo(&mut self) -> Option<&str> {
        if self.index + 1 >= self.snapshots.len() {
            return None;
        }
        self.index += 1;
        Some(&self.snapshots[self.index])
    }

    pub(crate) fn begin_restore(&mut self) {
        self.restoring = true;
    }

    pub(crate) fn end_restore(&mut self) {
        self.restoring = false;
    }

    pub(crate) fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[cfg(test)]
    pub(crate) fn position(&self) -> usize {
        self.index
    }
}
