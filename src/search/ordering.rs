//! Four-tier move ordering: hash move, then queen promotions, then
//! MVV/LVA captures, then quiets ranked by the history heuristic.

use crate::board::{Board, Piece};
use crate::moves::types::Move;

/// Score bands keep every tier from tier N+1 regardless of that tier's
/// internal score range; `sort_by_cached_key` ascending, so lower sorts
/// first.
const HASH_MOVE_BAND: i64 = 0;
const PROMOTION_BAND: i64 = 1 << 40;
const CAPTURE_BAND: i64 = 2 << 40;
const QUIET_BAND: i64 = 3 << 40;

/// `value(victim) + (value(victim) - value(attacker)) / 50`, the exact
/// MVV/LVA tiebreak formula: biggest victim first, cheapest attacker first
/// among equal victims.
fn mvv_lva_score(board: &Board, mv: Move) -> i32 {
    let victim_value = match board.piece_at(mv.to) {
        Some((_, piece)) => piece.value(),
        None => Piece::Pawn.value(), // en-passant: captured pawn isn't on `to`
    };
    let attacker_value = mv.piece_before_move().value();
    victim_value + (victim_value - attacker_value) / 50
}

pub fn order_moves(moves: &mut [Move], board: &Board, history: &[i32; 1 << 15], hash_move: Option<Move>) {
    moves.sort_by_cached_key(|&mv| {
        if Some(mv) == hash_move {
            return HASH_MOVE_BAND;
        }
        if mv.promotion() == Some(Piece::Queen) {
            return PROMOTION_BAND - mv.piece.value() as i64;
        }
        if mv.is_capture() {
            return CAPTURE_BAND - mvv_lva_score(board, mv) as i64;
        }
        QUIET_BAND - history[mv.move_index()] as i64
    });
}
