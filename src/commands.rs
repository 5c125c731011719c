//! Line-oriented command interface: one command per line, one response per
//! command. Kept deliberately thin — parsing and formatting only, all real
//! work delegates to `moves`/`search`/`status`.

use crate::board::Board;
use crate::error::EngineError;
use crate::moves::magic::MagicTables;
use crate::moves::magic::loader::load_magic_tables;
use crate::moves::make::{generate_legal, make_move};
use crate::moves::movegen::Mode;
use crate::repetition::Repetition;
use crate::search::tt::TranspositionTable;
use crate::search::{MATE_MAX, MIN_MATE_SCORE, iterative_deepening, search_fixed_depth};
use crate::search::timeman::budget_from_clock;
use crate::status::{GameStatus, position_status};
use std::str::FromStr;
use std::time::Duration;

/// One-line description of a terminal `GameStatus`, used in place of a
/// search result when `bestMove`/`go` are asked to move in a position that
/// is already decided.
fn terminal_description(status: GameStatus) -> Option<&'static str> {
    match status {
        GameStatus::InPlay => None,
        GameStatus::Checkmate => Some("checkmate"),
        GameStatus::Stalemate => Some("stalemate"),
        GameStatus::DrawFivefold => Some("draw: fivefold repetition"),
        GameStatus::DrawSeventyFiveMove => Some("draw: seventy-five-move rule"),
        GameStatus::DrawThreefold => Some("draw: threefold repetition"),
        GameStatus::DrawFiftyMove => Some("draw: fifty-move rule"),
        GameStatus::DrawDeadPosition => Some("draw: insufficient material"),
    }
}

/// Result of dispatching one command line.
pub enum Outcome {
    /// Print this line to the response channel.
    Output(String),
    /// Command succeeded with nothing to print.
    Silent,
    /// `quit`/`exit` was seen; the caller should stop reading input.
    Quit,
}

pub struct Engine {
    board: Board,
    tables: &'static MagicTables,
    tt: TranspositionTable,
    repetition: Repetition,
}

impl Engine {
    /// Builds the engine at the startup position with a `tt_mb`-mebibyte
    /// transposition table. Panics (fail-fast) if `tt_mb` is too small to
    /// hold even one entry — a configuration error, not a recoverable one.
    pub fn new(tt_mb: usize) -> Self {
        let board = Board::new();
        let mut repetition = Repetition::new();
        repetition.push(&board);
        Engine {
            board,
            tables: load_magic_tables(),
            tt: TranspositionTable::new(tt_mb),
            repetition,
        }
    }

    /// Parses and runs one command line, returning what to do with it.
    pub fn execute(&mut self, line: &str) -> Result<Outcome, EngineError> {
        let mut parts = line.split_whitespace();
        let command = match parts.next() {
            Some(c) => c,
            None => return Ok(Outcome::Silent),
        };
        let rest: Vec<&str> = parts.collect();

        match command {
            "setPosition" => self.set_position(&rest),
            "getPosition" | "showBoard" | "show" => Ok(Outcome::Output(self.board.to_fen())),
            "makeMove" => self.make_move_cmd(&rest),
            "bestMove" => self.best_move_cmd(&rest),
            "go" => self.go_cmd(&rest),
            "bench" => self.bench_cmd(&rest),
            "quit" | "exit" => Ok(Outcome::Quit),
            other => Err(EngineError::UnknownCommand(other.to_string())),
        }
    }

    fn set_position(&mut self, args: &[&str]) -> Result<Outcome, EngineError> {
        let fen = args.join(" ");
        let board = Board::from_str(&fen).map_err(EngineError::InvalidFen)?;
        self.board = board;
        self.tt.clear();
        self.repetition.clear();
        self.repetition.push(&self.board);
        Ok(Outcome::Silent)
    }

    fn make_move_cmd(&mut self, args: &[&str]) -> Result<Outcome, EngineError> {
        let uci = args.first().ok_or_else(|| EngineError::InvalidConfig("makeMove requires a move".into()))?;

        let mut legal = Vec::with_capacity(64);
        let mut scratch = Vec::with_capacity(256);
        generate_legal(&self.board, self.tables, Mode::Normal, &mut legal, &mut scratch);

        let mv = legal
            .into_iter()
            .find(|m| m.to_uci() == *uci)
            .ok_or_else(|| EngineError::IllegalMove(uci.to_string()))?;

        self.board = make_move(&self.board, mv);
        if self.board.halfmove_clock == 0 {
            self.repetition.clear();
        }
        self.repetition.push(&self.board);
        Ok(Outcome::Silent)
    }

    fn best_move_cmd(&mut self, args: &[&str]) -> Result<Outcome, EngineError> {
        if let Some(desc) = self.terminal_status() {
            return Ok(Outcome::Output(format!("(none) ({desc})")));
        }

        let seconds: f64 = args
            .first()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| EngineError::InvalidConfig("bestMove requires a seconds argument".into()))?;
        let think_time = Duration::from_secs_f64(seconds.max(0.0));

        let (mv, eval, stats) = iterative_deepening(&self.board, self.tables, &mut self.tt, &mut self.repetition, think_time);
        Ok(Outcome::Output(format_search_result(mv, eval, stats.nodes, stats.depth, stats.elapsed)))
    }

    /// `None` while the game is still in play; the terminal-status description
    /// otherwise, short-circuiting any further search.
    fn terminal_status(&self) -> Option<&'static str> {
        terminal_description(position_status(&self.board, self.tables, &self.repetition))
    }

    fn go_cmd(&mut self, args: &[&str]) -> Result<Outcome, EngineError> {
        if let Some(desc) = self.terminal_status() {
            return Ok(Outcome::Output(format!("(none) ({desc})")));
        }

        let mut wtime = None;
        let mut btime = None;
        let mut winc = 0i64;
        let mut binc = 0i64;

        let mut i = 0;
        while i < args.len() {
            match args[i] {
                "wtime" => wtime = args.get(i + 1).and_then(|s| s.parse().ok()),
                "btime" => btime = args.get(i + 1).and_then(|s| s.parse().ok()),
                "winc" => winc = args.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(0),
                "binc" => binc = args.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(0),
                _ => {}
            }
            i += 2;
        }

        let (time_left, inc) = match self.board.side_to_move {
            crate::board::Color::White => (wtime, winc),
            crate::board::Color::Black => (btime, binc),
        };
        let time_left = time_left.ok_or_else(|| EngineError::InvalidConfig("go requires wtime and btime".into()))?;

        let budget = budget_from_clock(time_left, inc, self.board.fullmove_number as i64);
        let (mv, eval, stats) = iterative_deepening(&self.board, self.tables, &mut self.tt, &mut self.repetition, budget);
        Ok(Outcome::Output(format_search_result(mv, eval, stats.nodes, stats.depth, stats.elapsed)))
    }

    fn bench_cmd(&mut self, args: &[&str]) -> Result<Outcome, EngineError> {
        if args.first() != Some(&"depth") {
            return Err(EngineError::UnknownCommand(format!("bench {}", args.join(" "))));
        }
        let depth: i32 = args
            .get(1)
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| EngineError::InvalidConfig("bench depth requires an integer depth".into()))?;

        let (_, _, stats) = search_fixed_depth(&self.board, self.tables, &mut self.tt, &mut self.repetition, depth);
        Ok(Outcome::Output(format!("nodes {} time {}ms", stats.nodes, stats.elapsed.as_millis())))
    }
}

fn format_eval(score: i32) -> String {
    if score.abs() >= MIN_MATE_SCORE {
        let n = MATE_MAX - score.abs();
        let sign = if score > 0 { '+' } else { '-' };
        format!("{sign}M{n}")
    } else {
        score.to_string()
    }
}

fn format_search_result(mv: Option<crate::moves::types::Move>, eval: i32, nodes: u64, depth: i32, elapsed: Duration) -> String {
    let uci = mv.map(|m| m.to_uci()).unwrap_or_else(|| "(none)".to_string());
    format!(
        "{} (eval: {}, depth: {}, nodes: {}, time: {}ms)",
        uci,
        format_eval(eval),
        depth,
        nodes,
        elapsed.as_millis()
    )
}
