//! Bounded, linear undo/redo history of surface snapshots.
//!
//! The history is a sequence of [`Snapshot`]s with a cursor pointing at the
//! state currently shown on the surface. Recording a new snapshot while the
//! cursor is behind the tail discards everything after the cursor (there is
//! no branching), and once the sequence grows past `max_history` the oldest
//! entry is evicted.

use crate::snapshot::Snapshot;
use crate::surface::{Surface, SurfaceError};
use std::collections::VecDeque;

/// Default number of snapshots kept.
pub const DEFAULT_MAX_HISTORY: usize = 50;

/// Linear undo/redo log of surface snapshots.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<Snapshot>,
    /// Index of the state currently on the surface. `None` iff `entries` is empty.
    cursor: Option<usize>,
    max_history: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl History {
    /// Create an empty history keeping at most `max_history` snapshots.
    ///
    /// A bound of zero is raised to one.
    pub fn new(max_history: usize) -> Self {
        let max_history = max_history.max(1);
        Self {
            entries: VecDeque::with_capacity(max_history.min(DEFAULT_MAX_HISTORY)),
            cursor: None,
            max_history,
        }
    }

    /// Capture the surface and record it as the newest state.
    ///
    /// The surface itself is not modified. When the surface cannot be read
    /// the error is returned and the history is left untouched.
    pub fn capture<S: Surface + ?Sized>(&mut self, surface: &S) -> Result<(), SurfaceError> {
        let snapshot = surface.snapshot()?;
        self.push(snapshot);
        Ok(())
    }

    /// Record `snapshot` as the newest state.
    ///
    /// Drops any redo entries after the cursor, appends, moves the cursor to
    /// the new tail and evicts the oldest entry if the bound is exceeded.
    pub fn push(&mut self, snapshot: Snapshot) {
        if let Some(cursor) = self.cursor {
            self.entries.truncate(cursor + 1);
        }
        self.entries.push_back(snapshot);
        let mut cursor = self.entries.len() - 1;

        if self.entries.len() > self.max_history {
            // Eviction only follows an append, so the cursor is at a tail >= 1.
            debug_assert!(cursor >= 1);
            self.entries.pop_front();
            cursor -= 1;
            log::debug!("History full, evicted oldest snapshot");
        }

        self.cursor = Some(cursor);
        log::debug!("Recorded snapshot {}/{}", cursor + 1, self.entries.len());
    }

    /// Step back one state and restore it to the surface.
    ///
    /// Returns `Ok(false)` without touching the surface when already at the
    /// oldest state or when the history is empty. If the surface rejects the
    /// snapshot the cursor stays where it was.
    pub fn undo<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Result<bool, SurfaceError> {
        match self.cursor {
            Some(cursor) if cursor > 0 => self.move_to(cursor - 1, surface),
            _ => Ok(false),
        }
    }

    /// Step forward one state and restore it to the surface.
    ///
    /// Returns `Ok(false)` without touching the surface when already at the
    /// newest state or when the history is empty.
    pub fn redo<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Result<bool, SurfaceError> {
        match self.cursor {
            Some(cursor) if cursor + 1 < self.entries.len() => self.move_to(cursor + 1, surface),
            _ => Ok(false),
        }
    }

    fn move_to<S: Surface + ?Sized>(
        &mut self,
        index: usize,
        surface: &mut S,
    ) -> Result<bool, SurfaceError> {
        let snapshot = &self.entries[index];
        if let Err(e) = surface.restore(snapshot) {
            log::warn!("Failed to restore snapshot {}: {}", index, e);
            return Err(e);
        }
        self.cursor = Some(index);
        log::debug!("Moved to snapshot {}/{}", index + 1, self.entries.len());
        Ok(true)
    }

    /// Restore the current state to the surface again, e.g. to drop an
    /// abandoned stroke. Does nothing on an empty history.
    pub fn restore_current<S: Surface + ?Sized>(&self, surface: &mut S) -> Result<(), SurfaceError> {
        match self.current() {
            Some(snapshot) => surface.restore(snapshot),
            None => Ok(()),
        }
    }

    /// Replace the whole history with a single initial state.
    pub fn reset(&mut self, initial: Snapshot) {
        self.entries.clear();
        self.entries.push_back(initial);
        self.cursor = Some(0);
    }

    /// Drop every recorded state.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }

    /// Cursor position, `None` when empty.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Cursor position with `-1` standing for an empty history.
    pub fn current_step(&self) -> isize {
        self.cursor.map_or(-1, |c| c as isize)
    }

    /// The state currently shown.
    pub fn current(&self) -> Option<&Snapshot> {
        self.cursor.and_then(|c| self.entries.get(c))
    }

    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.entries.get(index)
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.cursor, Some(c) if c > 0)
    }

    pub fn can_redo(&self) -> bool {
        matches!(self.cursor, Some(c) if c + 1 < self.entries.len())
    }

    /// Total bytes held by all snapshots.
    pub fn memory_size(&self) -> usize {
        self.entries.iter().map(Snapshot::memory_size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MemorySurface;

    /// A 1x1 snapshot whose single pixel encodes `tag`.
    fn snap(tag: u8) -> Snapshot {
        Snapshot::from_rgba(1, 1, vec![tag, 0, 0, 255]).unwrap()
    }

    fn tags(history: &History) -> Vec<u8> {
        history.iter().map(|s| s.pixels()[0]).collect()
    }

    fn shown(surface: &MemorySurface) -> u8 {
        surface.pixel(0, 0).unwrap()[0]
    }

    /// Paint `tag` onto the surface and capture it.
    fn draw_and_capture(history: &mut History, surface: &mut MemorySurface, tag: u8) {
        surface.restore(&snap(tag)).unwrap();
        history.capture(surface).unwrap();
    }

    #[test]
    fn test_empty_history() {
        let mut history = History::new(10);
        let mut surface = MemorySurface::new(1, 1);

        assert!(history.is_empty());
        assert_eq!(history.cursor(), None);
        assert_eq!(history.current_step(), -1);
        assert!(!history.can_undo());
        assert!(!history.can_redo());

        assert_eq!(history.undo(&mut surface), Ok(false));
        assert_eq!(history.redo(&mut surface), Ok(false));
        assert_eq!(history.current_step(), -1);
        assert!(!surface.has_content());
    }

    #[test]
    fn test_capture_moves_cursor_to_tail() {
        let mut history = History::new(10);
        history.push(snap(1));
        history.push(snap(2));

        assert_eq!(history.len(), 2);
        assert_eq!(history.cursor(), Some(1));
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_capture_does_not_touch_surface() {
        let mut history = History::new(10);
        let surface = MemorySurface::new(2, 2);
        let before = surface.clone();

        history.capture(&surface).unwrap();
        assert_eq!(surface, before);
        assert_eq!(history.current().unwrap().pixels(), surface.pixels());
    }

    #[test]
    fn test_capture_unavailable_surface_keeps_history() {
        let mut history = History::new(10);
        history.push(snap(1));
        history.push(snap(2));

        let surface = MemorySurface::uninitialized();
        assert_eq!(history.capture(&surface), Err(SurfaceError::Unavailable));
        assert_eq!(tags(&history), vec![1, 2]);
        assert_eq!(history.cursor(), Some(1));
    }

    #[test]
    fn test_round_trip() {
        let mut history = History::new(10);
        let mut surface = MemorySurface::new(1, 1);
        history.capture(&surface).unwrap();

        for tag in 1..=5 {
            draw_and_capture(&mut history, &mut surface, tag);
        }
        let final_pixels = surface.pixels().to_vec();

        for _ in 0..5 {
            assert_eq!(history.undo(&mut surface), Ok(true));
        }
        assert!(!surface.has_content());

        for _ in 0..5 {
            assert_eq!(history.redo(&mut surface), Ok(true));
        }
        assert_eq!(surface.pixels(), final_pixels.as_slice());
    }

    #[test]
    fn test_undo_then_redo_is_identity() {
        let mut history = History::new(10);
        let mut surface = MemorySurface::new(1, 1);
        draw_and_capture(&mut history, &mut surface, 10);
        draw_and_capture(&mut history, &mut surface, 20);
        let before = surface.pixels().to_vec();

        history.undo(&mut surface).unwrap();
        history.redo(&mut surface).unwrap();
        assert_eq!(surface.pixels(), before.as_slice());
        assert_eq!(history.cursor(), Some(1));
    }

    #[test]
    fn test_bounded_depth() {
        let max = 4;
        for extra in 1..=6 {
            let mut history = History::new(max);
            for tag in 0..(max + extra) as u8 {
                history.push(snap(tag));
                assert!(history.len() <= max);
            }
            assert_eq!(history.len(), max);
            assert_eq!(history.cursor(), Some(max - 1));
        }
    }

    #[test]
    fn test_branch_destruction() {
        let mut history = History::new(10);
        let mut surface = MemorySurface::new(1, 1);
        draw_and_capture(&mut history, &mut surface, b'A');
        draw_and_capture(&mut history, &mut surface, b'B');
        draw_and_capture(&mut history, &mut surface, b'C');

        history.undo(&mut surface).unwrap();
        history.undo(&mut surface).unwrap();
        assert_eq!(history.cursor(), Some(0));

        draw_and_capture(&mut history, &mut surface, b'D');
        assert_eq!(tags(&history), vec![b'A', b'D']);
        assert_eq!(history.cursor(), Some(1));
        assert_eq!(history.redo(&mut surface), Ok(false));
        assert_eq!(shown(&surface), b'D');
    }

    #[test]
    fn test_idempotent_boundaries() {
        let mut history = History::new(10);
        let mut surface = MemorySurface::new(1, 1);
        draw_and_capture(&mut history, &mut surface, 1);
        draw_and_capture(&mut history, &mut surface, 2);

        history.undo(&mut surface).unwrap();
        let at_start = surface.clone();
        assert_eq!(history.undo(&mut surface), Ok(false));
        assert_eq!(history.undo(&mut surface), Ok(false));
        assert_eq!(surface, at_start);
        assert_eq!(history.cursor(), Some(0));

        history.redo(&mut surface).unwrap();
        let at_end = surface.clone();
        assert_eq!(history.redo(&mut surface), Ok(false));
        assert_eq!(surface, at_end);
        assert_eq!(history.cursor(), Some(1));
    }

    #[test]
    fn test_eviction_scenario() {
        let mut history = History::new(3);
        let mut surface = MemorySurface::new(1, 1);
        for tag in [b'A', b'B', b'C', b'D'] {
            draw_and_capture(&mut history, &mut surface, tag);
        }
        assert_eq!(tags(&history), vec![b'B', b'C', b'D']);
        assert_eq!(history.cursor(), Some(2));

        assert_eq!(history.undo(&mut surface), Ok(true));
        assert_eq!(history.cursor(), Some(1));
        assert_eq!(shown(&surface), b'C');

        draw_and_capture(&mut history, &mut surface, b'E');
        assert_eq!(tags(&history), vec![b'B', b'C', b'E']);
        assert_eq!(history.cursor(), Some(2));
    }

    #[test]
    fn test_max_history_of_one() {
        let mut history = History::new(0);
        assert_eq!(history.max_history(), 1);

        history.push(snap(1));
        history.push(snap(2));
        assert_eq!(tags(&history), vec![2]);
        assert_eq!(history.cursor(), Some(0));
        assert!(!history.can_undo());
    }

    #[test]
    fn test_reset() {
        let mut history = History::new(10);
        history.push(snap(1));
        history.push(snap(2));
        history.push(snap(3));

        history.reset(snap(9));
        assert_eq!(tags(&history), vec![9]);
        assert_eq!(history.cursor(), Some(0));
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_clear() {
        let mut history = History::new(10);
        history.push(snap(1));
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.current_step(), -1);
        assert!(history.current().is_none());
    }

    #[test]
    fn test_dimension_mismatch_keeps_cursor() {
        let mut history = History::new(10);
        let mut surface = MemorySurface::new(1, 1);
        draw_and_capture(&mut history, &mut surface, 1);
        draw_and_capture(&mut history, &mut surface, 2);

        surface.resize(2, 2);
        let result = history.undo(&mut surface);
        assert_eq!(
            result,
            Err(SurfaceError::DimensionMismatch {
                expected: (1, 1),
                actual: (2, 2),
            })
        );
        assert_eq!(history.cursor(), Some(1));
    }

    #[test]
    fn test_restore_current() {
        let mut history = History::new(10);
        let mut surface = MemorySurface::new(1, 1);
        draw_and_capture(&mut history, &mut surface, 7);

        surface.restore(&snap(99)).unwrap();
        history.restore_current(&mut surface).unwrap();
        assert_eq!(shown(&surface), 7);

        let empty = History::new(10);
        assert_eq!(empty.restore_current(&mut surface), Ok(()));
    }

    #[test]
    fn test_memory_size() {
        let mut history = History::new(10);
        history.push(Snapshot::blank(2, 2));
        history.push(Snapshot::blank(3, 1));
        assert_eq!(history.memory_size(), 16 + 12);
    }
}
