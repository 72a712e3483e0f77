#![forbid(unsafe_code)]

//! Background scroll suspension while the mobile panel is open.

use crate::surface::{BODY_LOCKED_CLASS, DomOp, Node};

/// Saves the scroll offset on lock and restores it on unlock.
///
/// The saved offset is present exactly while the lock is held; repeated
/// `lock`/`unlock` calls are no-ops and never overwrite it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScrollLock {
    saved: Option<i32>,
}

impl ScrollLock {
    #[must_use]
    pub const fn new() -> Self {
        Self { saved: None }
    }

    #[inline]
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.saved.is_some()
    }

    /// Offset captured by the current lock.
    #[inline]
    #[must_use]
    pub const fn saved_offset(&self) -> Option<i32> {
        self.saved
    }

    /// Lock at `current_offset`. Returns whether a lock was taken.
    pub fn lock(&mut self, current_offset: i32, ops: &mut Vec<DomOp>) -> bool {
        if self.saved.is_some() {
            return false;
        }
        self.saved = Some(current_offset);
        ops.push(DomOp::class(Node::Body, BODY_LOCKED_CLASS, true));
        ops.push(DomOp::LockScroll {
            offset: current_offset,
        });
        true
    }

    /// Release the lock and restore the captured offset.
    pub fn unlock(&mut self, ops: &mut Vec<DomOp>) -> Option<i32> {
        let restore = self.saved.take()?;
        ops.push(DomOp::class(Node::Body, BODY_LOCKED_CLASS, false));
        ops.push(DomOp::UnlockScroll { restore });
        Some(restore)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_captures_offset() {
        let mut lock = ScrollLock::new();
        let mut ops = Vec::new();
        assert!(lock.lock(420, &mut ops));
        assert!(lock.is_locked());
        assert_eq!(lock.saved_offset(), Some(420));
        assert!(ops.contains(&DomOp::LockScroll { offset: 420 }));
    }

    #[test]
    fn second_lock_keeps_first_offset() {
        let mut lock = ScrollLock::new();
        let mut ops = Vec::new();
        lock.lock(100, &mut ops);
        ops.clear();
        assert!(!lock.lock(999, &mut ops));
        assert!(ops.is_empty());
        assert_eq!(lock.saved_offset(), Some(100));
    }

    #[test]
    fn unlock_restores_and_clears() {
        let mut lock = ScrollLock::new();
        let mut ops = Vec::new();
        lock.lock(0, &mut ops);
        ops.clear();
        assert_eq!(lock.unlock(&mut ops), Some(0));
        assert_eq!(ops.last(), Some(&DomOp::UnlockScroll { restore: 0 }));
        assert!(!lock.is_locked());
        assert_eq!(lock.saved_offset(), None);
    }

    #[test]
    fn unlock_when_unlocked_is_noop() {
        let mut lock = ScrollLock::new();
        let mut ops = Vec::new();
        assert_eq!(lock.unlock(&mut ops), None);
        assert!(ops.is_empty());
    }
}
