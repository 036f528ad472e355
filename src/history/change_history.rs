use crate::history::change::Change;

/// Default number of changes kept for undo
pub const DEFAULT_HISTORY_LIMIT: usize = 500;

/// Linear undo/redo history.
///
/// Undoing moves a change from the undo stack to the redo stack and redoing
/// moves it back. Pushing a new change discards everything that could be
/// redone.
#[derive(Debug, Clone)]
pub struct ChangeHistory {
    undo: Vec<Change>,
    redo: Vec<Change>,
    limit: usize,
}

impl Default for ChangeHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl ChangeHistory {
    pub fn new(limit: usize) -> Self {
        ChangeHistory {
            undo: Vec::new(),
            redo: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Push a new change. Clears the redo stack.
    pub fn push(&mut self, change: Change) {
        self.undo.push(change);
        if self.undo.len() > self.limit {
            self.undo.drain(..self.undo.len() - self.limit);
        }
        self.redo.clear();
    }

    /// Step back: the most recent change moves to the redo stack and is
    /// returned for reverting.
    pub fn undo(&mut self) -> Option<&Change> {
        let change = self.undo.pop()?;
        self.redo.push(change);
        self.redo.last()
    }

    /// Step forward: the most recently undone change moves back to the undo
    /// stack and is returned for replaying.
    pub fn redo(&mut self) -> Option<&Change> {
        let change = self.redo.pop()?;
        self.undo.push(change);
        self.undo.last()
    }

    /// Put a change back after it failed to revert
    pub(crate) fn cancel_undo(&mut self) {
        if let Some(change) = self.redo.pop() {
            self.undo.push(change);
        }
    }

    /// Put a change back after it failed to replay
    pub(crate) fn cancel_redo(&mut self) {
        if let Some(change) = self.undo.pop() {
            self.redo.push(change);
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn peek_undo(&self) -> Option<&Change> {
        self.undo.last()
    }

    pub fn peek_redo(&self) -> Option<&Change> {
        self.redo.last()
    }

    /// Forget every recorded change
    pub fn reset(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Number of changes that can be undone
    pub fn len(&self) -> usize {
        self.undo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
