//! FEN parsing and serialization.

use super::fen_tables::{CHAR_TO_PC, PC_TO_CHAR};
use super::{Board, Color, Piece, CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ};
use crate::square::Square;

impl Board {
    /// Overwrite `self` with the position described by `s`. Leaves `self`
    /// unchanged on error.
    pub fn set_fen(&mut self, s: &str) -> Result<(), String> {
        let mut fields = s.split_whitespace();

        let placement = fields.next().ok_or("FEN missing piece placement field")?;
        let side = fields.next().ok_or("FEN missing side-to-move field")?;
        let castling = fields.next().unwrap_or("-");
        let ep = fields.next().unwrap_or("-");
        let halfmove = fields.next().unwrap_or("0");
        let fullmove = fields.next().unwrap_or("1");

        let mut board = Board::new_empty();
        board.piece_bb = [[0u64; 6]; 2];
        board.occ_white = 0;
        board.occ_black = 0;
        board.occ_all = 0;
        board.piece_on_sq = [super::EMPTY_SQ; 64];

        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(format!(
                "FEN piece placement must have 8 ranks, found {}",
                ranks.len()
            ));
        }

        for (rank_from_top, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_from_top as u8;
            let mut file: u8 = 0;
            for ch in rank_str.chars() {
                if let Some(skip) = ch.to_digit(10) {
                    file += skip as u8;
                } else {
                    if file >= 8 {
                        return Err(format!("FEN rank '{}' overflows 8 files", rank_str));
                    }
                    let (piece, color) = CHAR_TO_PC[ch as usize]
                        .ok_or_else(|| format!("invalid FEN piece glyph '{}'", ch))?;
                    let sq = Square::from_file_rank(file, rank);
                    let bb = board.bb(color, piece) | (1u64 << sq.index());
                    board.set_bb(color, piece, bb);
                    file += 1;
                }
            }
            if file != 8 {
                return Err(format!("FEN rank '{}' does not cover 8 files", rank_str));
            }
        }

        board.side_to_move = match side {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(format!("invalid FEN side to move '{}'", side)),
        };

        board.castling_rights = 0;
        if castling != "-" {
            for ch in castling.chars() {
                board.castling_rights |= match ch {
                    'K' => CASTLE_WK,
                    'Q' => CASTLE_WQ,
                    'k' => CASTLE_BK,
                    'q' => CASTLE_BQ,
                    _ => return Err(format!("invalid FEN castling glyph '{}'", ch)),
                };
            }
        }

        board.en_passant = if ep == "-" {
            None
        } else {
            Some(
                ep.parse::<Square>()
                    .map_err(|_| format!("invalid FEN en-passant square '{}'", ep))?,
            )
        };

        board.halfmove_clock = halfmove
            .parse()
            .map_err(|_| format!("invalid FEN halfmove clock '{}'", halfmove))?;
        board.fullmove_number = fullmove
            .parse()
            .map_err(|_| format!("invalid FEN fullmove number '{}'", fullmove))?;
        board.ply = board
            .fullmove_number
            .saturating_sub(1)
            .saturating_mul(2)
            + if board.side_to_move == Color::Black { 1 } else { 0 };

        board.refresh_zobrist();
        board.validate()?;

        *self = board;
        Ok(())
    }

    /// Serialize the current position to a FEN string.
    pub fn to_fen(&self) -> String {
        let mut placement = String::new();
        for rank_from_top in 0..8u8 {
            let rank = 7 - rank_from_top;
            let mut empty_run = 0u8;
            for file in 0..8u8 {
                let sq = Square::from_file_rank(file, rank);
                match self.piece_at(sq) {
                    None => empty_run += 1,
                    Some((color, piece)) => {
                        if empty_run > 0 {
                            placement.push_str(&empty_run.to_string());
                            empty_run = 0;
                        }
                        let idx = (color as usize) * 6 + (piece as usize);
                        placement.push(PC_TO_CHAR[idx]);
                    }
                }
            }
            if empty_run > 0 {
                placement.push_str(&empty_run.to_string());
            }
            if rank_from_top != 7 {
                placement.push('/');
            }
        }

        let side = match self.side_to_move {
            Color::White => "w",
            Color::Black => "b",
        };

        let mut castling = String::new();
        if self.has_kingside_castle(Color::White) {
            castling.push('K');
        }
        if self.has_queenside_castle(Color::White) {
            castling.push('Q');
        }
        if self.has_kingside_castle(Color::Black) {
            castling.push('k');
        }
        if self.has_queenside_castle(Color::Black) {
            castling.push('q');
        }
        if castling.is_empty() {
            castling.push('-');
        }

        let ep = match self.en_passant {
            Some(sq) => sq.to_string(),
            None => "-".to_string(),
        };

        format!(
            "{} {} {} {} {} {}",
            placement, side, castling, ep, self.halfmove_clock, self.fullmove_number
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::STARTPOS_FEN;

    #[test]
    fn parses_startpos() {
        let mut b = Board::new_empty();
        b.set_fen(STARTPOS_FEN).unwrap();
        assert_eq!(b, Board::new());
    }

    #[test]
    fn startpos_roundtrips() {
        let mut b = Board::new_empty();
        b.set_fen(STARTPOS_FEN).unwrap();
        assert_eq!(b.to_fen(), STARTPOS_FEN);
    }

    #[test]
    fn parses_en_passant_square() {
        let fen = "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3";
        let mut b = Board::new_empty();
        b.set_fen(fen).unwrap();
        assert_eq!(b.en_passant, Some("d6".parse().unwrap()));
    }

    #[test]
    fn defaults_missing_clocks() {
        let fen = "8/8/8/8/8/8/8/K6k w - -";
        let mut b = Board::new_empty();
        b.set_fen(fen).unwrap();
        assert_eq!(b.halfmove_clock, 0);
        assert_eq!(b.fullmove_number, 1);
    }

    #[test]
    fn rejects_malformed_rank() {
        let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBN w KQkq - 0 1";
        let mut b = Board::new_empty();
        assert!(b.set_fen(fen).is_err());
    }
}
