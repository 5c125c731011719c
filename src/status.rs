//! Game-outcome classification on top of the core draw rules: insufficient
//! material and FIDE's automatic (non-claimable) draws, layered over the
//! engine's own threefold/fifty-move machinery.

use crate::board::{Board, Color, Piece};
use crate::moves::magic::MagicTables;
use crate::moves::make::generate_legal;
use crate::moves::movegen::Mode;
use crate::moves::square_control::in_check;
use crate::repetition::Repetition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InPlay,
    DrawFivefold,
    DrawSeventyFiveMove,
    DrawThreefold,
    DrawFiftyMove,
    DrawDeadPosition,
    Stalemate,
    Checkmate,
}

pub fn is_insufficient_material(board: &Board) -> bool {
    let wp = board.pieces(Piece::Pawn, Color::White);
    let bp = board.pieces(Piece::Pawn, Color::Black);
    let wr = board.pieces(Piece::Rook, Color::White);
    let br = board.pieces(Piece::Rook, Color::Black);
    let wq = board.pieces(Piece::Queen, Color::White);
    let bq = board.pieces(Piece::Queen, Color::Black);
    if (wp | bp | wr | br | wq | bq) != 0 {
        return false;
    }

    let wb = board.pieces(Piece::Bishop, Color::White).count_ones();
    let wn = board.pieces(Piece::Knight, Color::White).count_ones();
    let bb = board.pieces(Piece::Bishop, Color::Black).count_ones();
    let bn = board.pieces(Piece::Knight, Color::Black).count_ones();

    let w_minors = wb + wn;
    let b_minors = bb + bn;
    let total_minors = w_minors + b_minors;

    if total_minors == 0 || total_minors == 1 {
        return true;
    }

    if total_minors == 2 {
        if wn == 2 || bn == 2 {
            return true;
        }
        if w_minors == 1 && b_minors == 1 {
            return true;
        }
        return false;
    }

    false
}

/// Determine the game status for the current position.
///
/// Priority (highest → lowest):
///  1) `DrawFivefold`          (automatic; 5 occurrences of the same key)
///  2) `DrawSeventyFiveMove`   (automatic; halfmove_clock ≥ 150)
///  3) `DrawDeadPosition`      (insufficient material)
///  4) `DrawThreefold`         (claimable)
///  5) `DrawFiftyMove`         (claimable; halfmove_clock ≥ 100)
///  6) `Checkmate` / `Stalemate` / `InPlay`
pub fn position_status(board: &Board, tables: &MagicTables, repetition: &Repetition) -> GameStatus {
    let hmc = board.halfmove_clock;

    if repetition.occurrences(board) >= 5 {
        return GameStatus::DrawFivefold;
    }
    if hmc >= 150 {
        return GameStatus::DrawSeventyFiveMove;
    }
    if is_insufficient_material(board) {
        return GameStatus::DrawDeadPosition;
    }
    if repetition.contains(board) {
        return GameStatus::DrawThreefold;
    }
    if hmc >= 100 {
        return GameStatus::DrawFiftyMove;
    }

    let mut legal = Vec::with_capacity(64);
    let mut scratch = Vec::with_capacity(256);
    generate_legal(board, tables, Mode::Normal, &mut legal, &mut scratch);
    if legal.is_empty() {
        if in_check(board, board.side_to_move, tables) {
            GameStatus::Checkmate
        } else {
            GameStatus::Stalemate
        }
    } else {
        GameStatus::InPlay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::magic::loader::load_magic_tables;
    use std::str::FromStr;

    #[test]
    fn checkmate_is_detected() {
        let board = Board::from_str("4R1k1/5ppp/8/8/8/8/8/7K b - - 0 1").expect("valid fen");
        let repetition = Repetition::new();
        let status = position_status(&board, load_magic_tables(), &repetition);
        assert_eq!(status, GameStatus::Checkmate);
    }

    #[test]
    fn stalemate_is_detected() {
        let board = Board::from_str("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").expect("valid fen");
        let repetition = Repetition::new();
        let status = position_status(&board, load_magic_tables(), &repetition);
        assert_eq!(status, GameStatus::Stalemate);
    }

    #[test]
    fn lone_kings_are_dead_position() {
        let board = Board::from_str("4k3/8/8/8/8/8/8/4K3 w - - 0 1").expect("valid fen");
        assert!(is_insufficient_material(&board));
    }

    #[test]
    fn fifty_move_clock_triggers_claimable_draw() {
        let board = Board::from_str("8/8/8/4k3/8/4K3/8/8 w - - 100 1").expect("valid fen");
        let repetition = Repetition::new();
        let status = position_status(&board, load_magic_tables(), &repetition);
        assert_eq!(status, GameStatus::DrawFiftyMove);
    }

    #[test]
    fn threefold_repetition_is_detected_via_repetition_table() {
        // Knights shuffle out and back twice: Nf3 Nf6 Ng1 Ng8, repeated,
        // bringing the startpos key back to the stack three times total
        // with white to move each time.
        use crate::moves::make::{generate_legal, make_move};

        let tables = load_magic_tables();
        let board = Board::from_str(crate::board::STARTPOS_FEN).unwrap();
        let mut repetition = Repetition::new();
        repetition.push(&board);

        let mut current = board.clone();
        for uci in ["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8"] {
            let mut legal = Vec::with_capacity(64);
            let mut scratch = Vec::with_capacity(256);
            generate_legal(&current, tables, Mode::Normal, &mut legal, &mut scratch);
            let mv = legal.into_iter().find(|m| m.to_uci() == uci).expect("legal shuffling move");
            current = make_move(&current, mv);
            repetition.push(&current);
        }

        assert_eq!(current.zobrist, board.zobrist);
        let status = position_status(&current, tables, &repetition);
        assert_eq!(status, GameStatus::DrawThreefold);
    }
}
