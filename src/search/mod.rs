pub mod context;
pub mod eval;
pub mod ordering;
pub mod search;
pub mod timeman;
pub mod tt;

pub use search::{iterative_deepening, search_fixed_depth, to_local, to_root, MATE_MAX, MIN_MATE_SCORE, SCORE_MAX};
