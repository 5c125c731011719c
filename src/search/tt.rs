//! Packed transposition table: a flat array of 12-byte entries indexed by
//! `hash mod size`, with generational always-replace-with-policy writes.

use crate::moves::types::Move;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Bound {
    Lower = 0,
    Upper = 1,
    Exact = 2,
}

impl Bound {
    #[inline]
    fn from_bits(bits: u8) -> Self {
        match bits {
            0 => Bound::Lower,
            1 => Bound::Upper,
            _ => Bound::Exact,
        }
    }
}

const DEPTH_MASK: u8 = 0b0001_1111;
const OCCUPIED_BIT: u8 = 0b0010_0000;
const BOUND_SHIFT: u32 = 6;

/// 12 bytes, natural alignment: `partial_hash`(4) + `best_move`(4) +
/// `score`(2) + `generation`(1) + `flags`(1). `flags`: depth in bits 0-4,
/// occupied in bit 5, bound in bits 6-7.
#[derive(Clone, Copy, Debug)]
#[repr(C)]
struct TTEntry {
    partial_hash: u32,
    best_move: Move,
    score: i16,
    generation: u8,
    flags: u8,
}

impl TTEntry {
    const EMPTY: TTEntry = TTEntry {
        partial_hash: 0,
        best_move: Move::NULL,
        score: 0,
        generation: 0,
        flags: 0,
    };

    #[inline]
    fn is_occupied(&self) -> bool {
        self.flags & OCCUPIED_BIT != 0
    }

    #[inline]
    fn depth(&self) -> u8 {
        self.flags & DEPTH_MASK
    }

    #[inline]
    fn bound(&self) -> Bound {
        Bound::from_bits(self.flags >> BOUND_SHIFT)
    }
}

const _SIZE_CHECK: () = assert!(std::mem::size_of::<TTEntry>() == 12);

/// Decoded view of a TT hit. `score` is in local (TT-relative) form; callers
/// translate to root form themselves via `search::to_root`.
#[derive(Clone, Copy, Debug)]
pub struct ProbeResult {
    pub best_move: Option<Move>,
    pub score: i32,
    pub depth: u8,
    pub bound: Bound,
}

pub struct TranspositionTable {
    entries: Vec<TTEntry>,
    generation: u8,
}

impl TranspositionTable {
    /// Sizes the table to `size_mb` mebibytes, rounding down to a whole
    /// number of 12-byte entries.
    pub fn new(size_mb: usize) -> Self {
        let bytes = size_mb.saturating_mul(1024 * 1024);
        let capacity = bytes / std::mem::size_of::<TTEntry>();
        assert!(capacity > 0, "transposition table size too small: {size_mb} MiB");
        Self {
            entries: vec![TTEntry::EMPTY; capacity],
            generation: 0,
        }
    }

    #[inline]
    fn index(&self, hash: u64) -> usize {
        (hash % self.entries.len() as u64) as usize
    }

    /// Begins a new search epoch; entries older than 5 generations become
    /// replaceable even at equal depth.
    pub fn start_new_search(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn clear(&mut self) {
        for e in self.entries.iter_mut() {
            *e = TTEntry::EMPTY;
        }
        self.generation = 0;
    }

    /// Raw lookup: a hit requires the slot to be occupied and its stored
    /// `partial_hash` to match the low 32 bits of `hash`. Callers apply the
    /// usability rule (depth vs. remaining, bound vs. the search window)
    /// themselves before trusting the score.
    pub fn probe(&self, hash: u64) -> Option<ProbeResult> {
        let entry = &self.entries[self.index(hash)];
        if !entry.is_occupied() || entry.partial_hash != hash as u32 {
            return None;
        }
        Some(ProbeResult {
            best_move: if entry.best_move.is_null() { None } else { Some(entry.best_move) },
            score: entry.score as i32,
            depth: entry.depth(),
            bound: entry.bound(),
        })
    }

    /// Stores `(best_move, score, depth, bound)` under `hash`, subject to
    /// the replacement policy: overwrite an empty slot, a slot at least as
    /// shallow as the incoming depth, or a slot stale by more than 5
    /// generations (wrapped 8-bit difference).
    pub fn store(&mut self, hash: u64, best_move: Option<Move>, score: i32, depth: u8, bound: Bound) {
        let idx = self.index(hash);
        let incoming_depth = depth.min(DEPTH_MASK);
        let generation = self.generation;
        let entry = &mut self.entries[idx];

        let stale = generation.wrapping_sub(entry.generation) > 5;
        let replace = !entry.is_occupied() || incoming_depth >= entry.depth() || stale;
        if !replace {
            return;
        }

        let flags = incoming_depth | OCCUPIED_BIT | ((bound as u8) << BOUND_SHIFT);
        *entry = TTEntry {
            partial_hash: hash as u32,
            best_move: best_move.unwrap_or(Move::NULL),
            score: score.clamp(i16::MIN as i32 + 1, i16::MAX as i32) as i16,
            generation,
            flags,
        };
    }

    /// Fraction (per-mille) of the first 10k slots occupied at the current
    /// generation. For observability only, not consulted by search.
    pub fn fullness_permille(&self) -> u32 {
        let sample = self.entries.len().min(10_000);
        if sample == 0 {
            return 0;
        }
        let occupied = self.entries[..sample]
            .iter()
            .filter(|e| e.is_occupied() && e.generation == self.generation)
            .count();
        (occupied * 1000 / sample) as u32
    }
}
