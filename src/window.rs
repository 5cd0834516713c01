use std::collections::VecDeque;

use crate::token::Reference;

pub const DICTIONARY_SIZE: usize = 4095; // 12 bits of position
pub const MAX_MATCH_SIZE: usize = 15; // 4 bits of length

/// Bounded FIFO of bytes, used both as the history (dictionary) window and as
/// the encoder's lookahead buffer.
///
/// Indices are relative to the current contents: 0 is always the oldest byte
/// still retained, so every eviction shifts surviving bytes down by one.
#[derive(Debug, Clone)]
pub struct Window {
    bytes: VecDeque<u8>,
    capacity: usize,
}

impl Window {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { bytes: VecDeque::with_capacity(capacity + 1), capacity }
    }

    pub fn history() -> Self {
        Self::with_capacity(DICTIONARY_SIZE)
    }

    pub fn lookahead() -> Self {
        Self::with_capacity(MAX_MATCH_SIZE)
    }

    /// Append a byte, evicting the oldest one on overflow. Returns true if a byte was evicted.
    pub fn push(&mut self, byte: u8) -> bool {
        self.bytes.push_back(byte);
        if self.bytes.len() > self.capacity {
            self.bytes.pop_front();
            return true;
        }
        false
    }

    pub fn pop_front(&mut self) -> Option<u8> {
        self.bytes.pop_front()
    }

    pub fn byte_at(&self, index: usize) -> Option<u8> {
        self.bytes.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Copy `length` bytes starting at `start`, appending each one to the window
    /// before reading the next.
    ///
    /// The source range may run into bytes appended by this same copy. When an
    /// append evicts the oldest byte the cursor stays put, since the next byte
    /// has shifted into its slot. Returns `None` if a read falls outside the window.
    pub fn copy_range(&mut self, start: usize, length: usize) -> Option<Vec<u8>> {
        let mut copied = Vec::with_capacity(length);
        let mut cursor = start;
        for _ in 0..length {
            let byte = self.byte_at(cursor)?;
            copied.push(byte);
            if !self.push(byte) {
                cursor += 1;
            }
        }
        Some(copied)
    }

    /// Find the longest prefix of `lookahead` that occurs in this window.
    ///
    /// Every start position is tried left to right and only a strictly longer
    /// run replaces the best, so ties go to the earliest position. Runs stop at
    /// the end of the window; they never extend into the lookahead itself.
    pub fn longest_match(&self, lookahead: &Window) -> Reference {
        let limit = lookahead.len().min(MAX_MATCH_SIZE);
        let size = self.bytes.len();
        let mut best = Reference::default();

        for start in 0..size {
            let mut run = 0;
            while run < limit && start + run < size && self.bytes[start + run] == lookahead.bytes[run] {
                run += 1;
            }
            if run > best.length as usize {
                best = Reference::new(start as u16, run as u8);
                if run == limit {
                    break;
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_from(capacity: usize, data: &[u8]) -> Window {
        let mut window = Window::with_capacity(capacity);
        for &byte in data {
            window.push(byte);
        }
        window
    }

    #[test]
    fn test_push_evicts_oldest() {
        let mut window = window_from(3, b"abc");
        assert!(!window.is_empty());
        assert!(window.push(b'd'));
        assert_eq!(window.len(), 3);
        assert_eq!(window.byte_at(0), Some(b'b'));
        assert_eq!(window.byte_at(2), Some(b'd'));
        assert_eq!(window.byte_at(3), None);
        assert_eq!(window.pop_front(), Some(b'b'));
        assert_eq!(window.len(), 2);
    }

    #[test]
    fn test_history_capacity() {
        let mut history = Window::history();
        for i in 0..DICTIONARY_SIZE + 10 {
            history.push(i as u8);
        }
        assert_eq!(history.len(), DICTIONARY_SIZE);
        assert_eq!(history.byte_at(0), Some(10));
    }

    #[test]
    fn test_longest_match_prefers_longest_then_leftmost() {
        let history = window_from(DICTIONARY_SIZE, b"abxabcdyabcd");
        let lookahead = window_from(MAX_MATCH_SIZE, b"abcdz");
        assert_eq!(history.longest_match(&lookahead), Reference::new(3, 4));

        let history = window_from(DICTIONARY_SIZE, b"xyzxyz");
        let lookahead = window_from(MAX_MATCH_SIZE, b"xyq");
        assert_eq!(history.longest_match(&lookahead), Reference::new(0, 2));
    }

    #[test]
    fn test_longest_match_stops_at_window_end() {
        let history = window_from(DICTIONARY_SIZE, b"aa");
        let lookahead = window_from(MAX_MATCH_SIZE, b"aaaaaa");
        assert_eq!(history.longest_match(&lookahead), Reference::new(0, 2));
    }

    #[test]
    fn test_longest_match_empty_history() {
        let history = Window::history();
        let lookahead = window_from(MAX_MATCH_SIZE, b"abc");
        assert_eq!(history.longest_match(&lookahead).length, 0);
    }

    #[test]
    fn test_copy_range_self_overlap() {
        let mut history = window_from(DICTIONARY_SIZE, b"ab");
        let copied = history.copy_range(0, 6);
        assert_eq!(copied.as_deref(), Some(&b"ababab"[..]));
        assert_eq!(history.len(), 8);
    }

    #[test]
    fn test_copy_range_with_eviction() {
        let mut history = window_from(4, b"wxyz");
        let copied = history.copy_range(1, 3);
        assert_eq!(copied.as_deref(), Some(&b"xyz"[..]));
        assert_eq!(history.byte_at(0), Some(b'z'));
        assert_eq!(history.byte_at(3), Some(b'z'));
    }

    #[test]
    fn test_copy_range_out_of_window() {
        let mut history = window_from(DICTIONARY_SIZE, b"abc");
        assert_eq!(history.copy_range(5, 3), None);
    }
}
