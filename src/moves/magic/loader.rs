//! Produces the process-wide magic tables once and hands out a shared
//! reference on every subsequent call, the same caching shape as
//! `hash::zobrist::zobrist_keys`.
//!
//! With the `load_magic` feature, tables are read from a bincode blob on
//! disk (`magic_tables.bin`, written by whatever offline tool produced it)
//! and generation is only a fallback for a missing/corrupt file. Without it,
//! tables are always generated at startup — fast enough (a few milliseconds)
//! that shipping a precomputed blob is an optimization, not a requirement.

use super::precompute::{MagicTableSeed, generate_magic_tables};
use super::structs::MagicTables;
use once_cell::sync::OnceCell;

#[cfg(feature = "deterministic_magic")]
const MAGIC_SEED: u64 = 0x5DEE_CE11_D0DA_57AC;

fn generate() -> MagicTables {
    #[cfg(feature = "deterministic_magic")]
    let seed = MagicTableSeed::Fixed(MAGIC_SEED);
    #[cfg(not(feature = "deterministic_magic"))]
    let seed = MagicTableSeed::Random;

    generate_magic_tables(seed).expect("magic-number search failed to find collision-free magics")
}

#[cfg(feature = "load_magic")]
fn load_from_disk() -> Option<MagicTables> {
    let bytes = std::fs::read("magic_tables.bin").ok()?;
    bincode::deserialize(&bytes).ok()
}

/// Returns the shared magic tables, generating (or loading) them on first
/// call and reusing the result afterwards.
pub fn load_magic_tables() -> &'static MagicTables {
    static TABLES: OnceCell<MagicTables> = OnceCell::new();
    TABLES.get_or_init(|| {
        #[cfg(feature = "load_magic")]
        {
            load_from_disk().unwrap_or_else(generate)
        }
        #[cfg(not(feature = "load_magic"))]
        {
            generate()
        }
    })
}
