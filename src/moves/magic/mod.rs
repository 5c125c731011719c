//! Magic-bitboard attack tables for sliding pieces, plus the scan-based
//! reference generator and magic-number search used to build them.

pub mod attacks;
pub mod loader;
pub mod precompute;
pub mod search;
pub mod structs;

pub use structs::{BishopMagicTables, MagicEntry, MagicTables, RookMagicTables};
