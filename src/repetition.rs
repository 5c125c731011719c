//! Stack of "repeatable" Zobrist keys since the last irreversible move.
//!
//! A key pushed here has had the en-passant file and 50-move-tail
//! contributions XORed out, so two positions that differ only in those
//! respects (and so are not truly distinguishable for draw purposes) compare
//! equal. Capped at 101 entries, matching the 50-move window: nothing older
//! than that can contribute to a claimable repetition or to the fifty-move
//! rule.

use crate::board::Board;
use crate::hash::zobrist::{ep_file_to_hash, zobrist_keys};
use arrayvec::ArrayVec;

const CAP: usize = 101;

#[derive(Debug, Clone, Default)]
pub struct Repetition {
    stack: ArrayVec<u64, CAP>,
}

/// The portion of `board.hash` that repeats across functionally-equal
/// positions: piece placement, castling rights, side to move, en-passant
/// file and the 50-move tail folded back out.
pub fn repetition_key(board: &Board) -> u64 {
    let keys = zobrist_keys();
    let mut key = board.zobrist;
    if let Some(file) = ep_file_to_hash(board) {
        key ^= keys.ep_file[file as usize];
    }
    key ^= keys.halfmove_tail[crate::hash::zobrist::halfmove_tail_index(board.halfmove_clock)];
    key
}

impl Repetition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, board: &Board) {
        // Capacity is sized to the 50-move window; a position can never
        // accrue more irreversible-move-free plies than that before the
        // clock itself forces a draw, so this never overflows in practice.
        let _ = self.stack.try_push(repetition_key(board));
    }

    pub fn pop(&mut self) {
        self.stack.pop();
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// True if `board`'s repetition key has occurred at an earlier ply with
    /// the same side to move. `board` is assumed already pushed, so the scan
    /// starts two plies back (`len-3`) and steps by 2 from there.
    pub fn contains(&self, board: &Board) -> bool {
        let key = repetition_key(board);
        let len = self.stack.len();
        if len < 3 {
            return false;
        }
        let mut i = len - 3;
        loop {
            if self.stack[i] == key {
                return true;
            }
            if i < 2 {
                return false;
            }
            i -= 2;
        }
    }

    pub fn fifty_move_draw(&self) -> bool {
        self.stack.len() > 100
    }

    /// Number of times `board`'s repetition key occurs in the stack,
    /// including the current position itself if it was already pushed.
    /// Used for fivefold-repetition detection; `contains` is cheaper and
    /// sufficient for the threefold claim.
    pub fn occurrences(&self, board: &Board) -> usize {
        let key = repetition_key(board);
        let mut count = 0;
        let mut i = self.stack.len();
        while i >= 1 {
            i -= 1;
            if self.stack[i] == key {
                count += 1;
            }
        }
        count
    }
}
