//! Builds the magic-bitboard tables at process startup (or at test time):
//! computes each square's relevant-occupancy mask, enumerates every blocker
//! subset of that mask, finds a collision-free magic multiplier via
//! `search::find_magic_number_for_square`, and bakes the resulting attack
//! table.

use super::attacks::{bishop_attacks_per_square, rook_attacks_per_square};
use super::search::find_magic_number_for_square;
use super::structs::{BishopMagicTables, MagicEntry, MagicTables, RookMagicTables};
use rand::{RngCore, SeedableRng, rngs::StdRng};

/// How to seed the magic-number search.
pub enum MagicTableSeed {
    Fixed(u64),
    Random,
}

fn rook_mask(square: usize) -> u64 {
    let rank = (square / 8) as i32;
    let file = (square % 8) as i32;
    let mut mask = 0u64;
    for r in (rank + 1)..7 {
        mask |= 1u64 << (r * 8 + file);
    }
    for r in 1..rank {
        mask |= 1u64 << (r * 8 + file);
    }
    for f in (file + 1)..7 {
        mask |= 1u64 << (rank * 8 + f);
    }
    for f in 1..file {
        mask |= 1u64 << (rank * 8 + f);
    }
    mask
}

fn bishop_mask(square: usize) -> u64 {
    let rank = (square / 8) as i32;
    let file = (square % 8) as i32;
    let mut mask = 0u64;
    let dirs = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
    for (dr, df) in dirs {
        let mut r = rank + dr;
        let mut f = file + df;
        while (1..7).contains(&r) && (1..7).contains(&f) {
            mask |= 1u64 << (r * 8 + f);
            r += dr;
            f += df;
        }
    }
    mask
}

/// Every subset of `mask`, via the standard subset-of-subset enumeration.
fn subsets_of(mask: u64) -> Vec<u64> {
    let mut subsets = Vec::with_capacity(1 << mask.count_ones());
    let mut subset: u64 = 0;
    loop {
        subsets.push(subset);
        if subset == mask {
            break;
        }
        subset = (subset.wrapping_sub(mask)) & mask;
    }
    subsets
}

fn build_entry(
    square: usize,
    mask: u64,
    attacks_fn: impl Fn(usize, u64) -> u64,
    rng: &mut StdRng,
) -> Result<MagicEntry, String> {
    let blockers = subsets_of(mask);
    let attacks: Vec<u64> = blockers.iter().map(|&b| attacks_fn(square, b)).collect();
    let shift = 64 - mask.count_ones();
    let magic = find_magic_number_for_square(&blockers, &attacks, shift, rng)?;

    let size = 1usize << mask.count_ones();
    let mut table = vec![0u64; size];
    for (&b, &a) in blockers.iter().zip(attacks.iter()) {
        let index = ((b.wrapping_mul(magic)) >> shift) as usize;
        table[index] = a;
    }

    Ok(MagicEntry {
        magic,
        shift,
        mask,
        table: table.into_boxed_slice(),
    })
}

pub fn generate_magic_tables(seed: MagicTableSeed) -> Result<MagicTables, String> {
    let mut rng = match seed {
        MagicTableSeed::Fixed(s) => StdRng::seed_from_u64(s),
        MagicTableSeed::Random => {
            let mut seed_bytes = [0u8; 32];
            rand::rng().fill_bytes(&mut seed_bytes);
            StdRng::from_seed(seed_bytes)
        }
    };

    let mut rook_entries = Vec::with_capacity(64);
    let mut bishop_entries = Vec::with_capacity(64);

    for square in 0..64 {
        rook_entries.push(build_entry(square, rook_mask(square), rook_attacks_per_square, &mut rng)?);
        bishop_entries.push(build_entry(square, bishop_mask(square), bishop_attacks_per_square, &mut rng)?);
    }

    Ok(MagicTables {
        rook: RookMagicTables { entries: rook_entries },
        bishop: BishopMagicTables { entries: bishop_entries },
    })
}
