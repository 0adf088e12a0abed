//! Undo/redo history over committed transforms.

use merchkit_core::Transform;
use std::collections::VecDeque;

/// Default number of undo steps kept per session.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Bounded undo/redo stack pair.
///
/// `present` is the only transform that is ever rendered; `past` and
/// `future` are snapshots. Pushing a new transform clears `future`.
#[derive(Debug, Clone)]
pub struct TransformHistory {
    past: VecDeque<Transform>,
    present: Transform,
    future: VecDeque<Transform>,
    limit: usize,
}

impl TransformHistory {
    /// Creates a history whose present is `initial`.
    pub fn new(initial: Transform) -> Self {
        Self::with_limit(initial, DEFAULT_HISTORY_LIMIT)
    }

    /// Creates a history keeping at most `limit` undo steps (minimum 1).
    pub fn with_limit(initial: Transform, limit: usize) -> Self {
        Self {
            past: VecDeque::new(),
            present: initial.clamp(),
            future: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    pub fn present(&self) -> Transform {
        self.present
    }

    /// Commits `transform` as the new present.
    pub fn push_transform(&mut self, transform: Transform) {
        let previous = std::mem::replace(&mut self.present, transform.clamp());
        self.past.push_back(previous);
        self.future.clear();
        // Limit stack size, dropping the oldest entry
        while self.past.len() > self.limit {
            self.past.pop_front();
        }
    }

    /// Steps back; `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<Transform> {
        let previous = self.past.pop_back()?;
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push_front(current);
        Some(self.present)
    }

    /// Steps forward; `None` when there is nothing to redo.
    pub fn redo(&mut self) -> Option<Transform> {
        let next = self.future.pop_front()?;
        let current = std::mem::replace(&mut self.present, next);
        self.past.push_back(current);
        Some(self.present)
    }

    /// Clears both stacks and makes `transform` the present.
    pub fn reset(&mut self, transform: Transform) {
        self.past.clear();
        self.future.clear();
        self.present = transform.clamp();
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for TransformHistory {
    fn default() -> Self {
        Self::new(Transform::default())
    }
}
