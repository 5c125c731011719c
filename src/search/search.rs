//! Iterative-deepening PVS negamax search: the core recursive driver,
//! quiescence extension, and mate-score translation between the TT's local
//! form and the root-relative form the search itself uses.

use crate::board::Board;
use crate::moves::magic::MagicTables;
use crate::moves::make::{generate_legal, make_move};
use crate::moves::movegen::Mode;
use crate::moves::square_control::in_check;
use crate::moves::types::Move;
use crate::repetition::Repetition;
use crate::search::context::SearchContext;
use crate::search::eval::static_eval;
use crate::search::ordering::order_moves;
use crate::search::timeman::TimeManager;
use crate::search::tt::{Bound, TranspositionTable};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Score is 16-bit signed; kept one below `i16::MAX` so `-SCORE_MAX` is
/// representable too.
pub const SCORE_MAX: i32 = i16::MAX as i32 - 1;
pub const MATE_MAX: i32 = SCORE_MAX;
/// Any `|score| >= MIN_MATE_SCORE` encodes "mate in N", `N = MATE_MAX - |score|`.
pub const MIN_MATE_SCORE: i32 = MATE_MAX - 1000;

const ABSOLUTE_DEPTH_CAP: i32 = 64;
const FIXED_MAX_Q_DEPTH: i32 = 8;

/// `to_local(s, d) = s + sign(s)*d` — stash a mate score relative to the
/// node it was proven at, so it survives being reused from a different ply.
pub fn to_local(score: i32, ply: i32) -> i32 {
    if score >= MIN_MATE_SCORE {
        score + ply
    } else if score <= -MIN_MATE_SCORE {
        score - ply
    } else {
        score
    }
}

/// `to_root(s, d) = s - sign(s)*d` — the inverse of `to_local`.
pub fn to_root(score: i32, ply: i32) -> i32 {
    if score >= MIN_MATE_SCORE {
        score - ply
    } else if score <= -MIN_MATE_SCORE {
        score + ply
    } else {
        score
    }
}

pub struct SearchStats {
    pub nodes: u64,
    pub depth: i32,
    pub elapsed: Duration,
}

#[allow(clippy::too_many_arguments)]
fn quiescence(
    board: &Board,
    tables: &MagicTables,
    ctx: &mut SearchContext,
    tt: &mut TranspositionTable,
    stopped: &AtomicBool,
    ply: i32,
    q_depth: i32,
    max_q_depth: i32,
    mut alpha: i32,
    beta: i32,
    nodes: &mut u64,
) -> i32 {
    if stopped.load(Ordering::Relaxed) {
        return 0;
    }
    *nodes += 1;

    let hash = board.zobrist;
    if let Some(hit) = tt.probe(hash) {
        if hit.depth == 0 {
            let score = to_root(hit.score, ply);
            let usable = match hit.bound {
                Bound::Exact => true,
                Bound::Lower => score >= beta,
                Bound::Upper => score <= alpha,
            };
            if usable {
                return score;
            }
        }
    }

    let stand_pat = static_eval(board);
    if stand_pat >= beta {
        return beta;
    }
    if stand_pat > alpha {
        alpha = stand_pat;
    }
    if q_depth >= max_q_depth {
        return alpha;
    }

    let mut moves: Vec<Move> = Vec::with_capacity(32);
    let mut scratch: Vec<Move> = Vec::with_capacity(128);
    generate_legal(board, tables, Mode::Quiescent, &mut moves, &mut scratch);
    order_moves(&mut moves, board, &ctx.history, None);

    let original_alpha = alpha;
    let mut best_score = stand_pat;

    for &mv in &moves {
        let child = make_move(board, mv);
        let score = -quiescence(
            &child,
            tables,
            ctx,
            tt,
            stopped,
            ply + 1,
            q_depth + 1,
            max_q_depth,
            -beta,
            -alpha,
            nodes,
        );

        if stopped.load(Ordering::Relaxed) {
            return 0;
        }

        if score > best_score {
            best_score = score;
        }
        if best_score > alpha {
            alpha = best_score;
        }
        if best_score >= beta {
            break;
        }
    }

    let bound = if best_score >= beta {
        Bound::Lower
    } else if best_score <= original_alpha {
        Bound::Upper
    } else {
        Bound::Exact
    };
    tt.store(hash, None, to_local(best_score, ply), 0, bound);

    best_score
}

#[allow(clippy::too_many_arguments)]
fn negamax(
    board: &Board,
    tables: &MagicTables,
    ctx: &mut SearchContext,
    tt: &mut TranspositionTable,
    repetition: &mut Repetition,
    stopped: &AtomicBool,
    remaining: i32,
    max_q_depth: i32,
    ply: i32,
    mut alpha: i32,
    beta: i32,
    nodes: &mut u64,
) -> (i32, Option<Move>) {
    if stopped.load(Ordering::Relaxed) {
        return (0, None);
    }
    *nodes += 1;

    if ply > 0 && (repetition.fifty_move_draw() || repetition.contains(board)) {
        return (0, None);
    }

    let hash = board.zobrist;
    let mut tt_move = None;

    if let Some(hit) = tt.probe(hash) {
        tt_move = hit.best_move;
        if hit.depth as i32 >= remaining {
            let score = to_root(hit.score, ply);
            let usable = match hit.bound {
                Bound::Exact => true,
                Bound::Lower => score >= beta,
                Bound::Upper => score <= alpha,
            };
            if usable {
                return (score, tt_move);
            }
        }
    }

    if remaining <= 0 {
        let score = quiescence(board, tables, ctx, tt, stopped, ply, 0, max_q_depth, alpha, beta, nodes);
        return (score, None);
    }

    let mut moves: Vec<Move> = Vec::with_capacity(64);
    let mut scratch: Vec<Move> = Vec::with_capacity(256);
    generate_legal(board, tables, Mode::Normal, &mut moves, &mut scratch);

    if moves.is_empty() {
        if in_check(board, board.side_to_move, tables) {
            return (-(MATE_MAX - ply), None);
        }
        return (0, None);
    }

    order_moves(&mut moves, board, &ctx.history, tt_move);

    let original_alpha = alpha;
    let mut best_score = -SCORE_MAX;
    let mut best_move = None;

    for (i, &mv) in moves.iter().enumerate() {
        let child = make_move(board, mv);
        repetition.push(&child);

        let score = if i == 0 {
            let (s, _) = negamax(
                &child, tables, ctx, tt, repetition, stopped, remaining - 1, max_q_depth, ply + 1, -beta, -alpha,
                nodes,
            );
            -s
        } else {
            let (s, _) = negamax(
                &child,
                tables,
                ctx,
                tt,
                repetition,
                stopped,
                remaining - 1,
                max_q_depth,
                ply + 1,
                -alpha - 1,
                -alpha,
                nodes,
            );
            let mut rescored = -s;
            if rescored > alpha && beta - alpha > 1 {
                let (s2, _) = negamax(
                    &child, tables, ctx, tt, repetition, stopped, remaining - 1, max_q_depth, ply + 1, -beta,
                    -alpha, nodes,
                );
                rescored = -s2;
            }
            rescored
        };

        repetition.pop();

        if stopped.load(Ordering::Relaxed) {
            return (0, None);
        }

        if score > best_score {
            best_score = score;
            best_move = Some(mv);
        }
        if best_score > alpha {
            alpha = best_score;
        }
        if best_score >= beta {
            if !mv.is_capture() {
                ctx.update_history(mv, remaining);
            }
            break;
        }
    }

    if stopped.load(Ordering::Relaxed) {
        return (0, None);
    }

    let bound = if best_score >= beta {
        Bound::Lower
    } else if best_score <= original_alpha {
        Bound::Upper
    } else {
        Bound::Exact
    };
    tt.store(hash, best_move, to_local(best_score, ply), remaining.clamp(0, 31) as u8, bound);

    (best_score, best_move)
}

fn white_relative(score: i32, side_to_move: crate::board::Color) -> i32 {
    if side_to_move == crate::board::Color::White { score } else { -score }
}

/// Runs `negamax` for an increasing schedule of `(min_depth, max_q_depth)`
/// until `think_time` elapses, a forced mate is found within the current
/// minimum depth, or the absolute depth cap is hit. Returns the best move
/// found, its evaluation (white-relative), and node/depth/time stats.
pub fn iterative_deepening(
    board: &Board,
    tables: &MagicTables,
    tt: &mut TranspositionTable,
    repetition: &mut Repetition,
    think_time: Duration,
) -> (Option<Move>, i32, SearchStats) {
    tt.start_new_search();
    let mut ctx = SearchContext::new();

    let timer = TimeManager::start(think_time);
    let stopped = timer.stopped_flag();

    let t_seconds = think_time.as_secs_f64().max(0.001);
    let mut min_depth = ((0.5 * t_seconds.sqrt()).round() as i32).clamp(1, 4);
    let mut max_q_depth = ((2.0 * t_seconds.sqrt()).round() as i32).clamp(3, 12);

    let start = Instant::now();
    let mut nodes = 0u64;
    let mut best_move = None;
    let mut best_score = 0i32;

    loop {
        let forced_mate_within_horizon =
            best_score.abs() >= MIN_MATE_SCORE && (MATE_MAX - best_score.abs()) <= min_depth;
        if forced_mate_within_horizon || stopped.load(Ordering::Relaxed) || max_q_depth >= ABSOLUTE_DEPTH_CAP {
            break;
        }

        min_depth += 1;
        max_q_depth += 1;

        let (score, mv) = negamax(
            board,
            tables,
            &mut ctx,
            tt,
            repetition,
            &stopped,
            min_depth,
            max_q_depth,
            0,
            -SCORE_MAX,
            SCORE_MAX,
            &mut nodes,
        );

        if stopped.load(Ordering::Relaxed) {
            break;
        }

        best_score = score;
        if mv.is_some() {
            best_move = mv;
        }
        ctx.age();
    }

    timer.cancel_and_join();

    let stats = SearchStats {
        nodes,
        depth: min_depth,
        elapsed: start.elapsed(),
    };
    (best_move, white_relative(best_score, board.side_to_move), stats)
}

/// A single fixed-depth search with no time limit, for `bench`.
pub fn search_fixed_depth(
    board: &Board,
    tables: &MagicTables,
    tt: &mut TranspositionTable,
    repetition: &mut Repetition,
    depth: i32,
) -> (Option<Move>, i32, SearchStats) {
    tt.start_new_search();
    let mut ctx = SearchContext::new();
    let stopped = AtomicBool::new(false);
    let start = Instant::now();
    let mut nodes = 0u64;

    let (score, mv) = negamax(
        board,
        tables,
        &mut ctx,
        tt,
        repetition,
        &stopped,
        depth,
        FIXED_MAX_Q_DEPTH,
        0,
        -SCORE_MAX,
        SCORE_MAX,
        &mut nodes,
    );

    let stats = SearchStats {
        nodes,
        depth,
        elapsed: start.elapsed(),
    };
    (mv, white_relative(score, board.side_to_move), stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn tables() -> &'static MagicTables {
        crate::moves::magic::loader::load_magic_tables()
    }

    #[test]
    fn mate_score_round_trips_through_local_and_root() {
        let s = MATE_MAX - 3;
        assert_eq!(to_root(to_local(s, 7), 7), s);
        assert_eq!(to_root(to_local(-s, 4), 4), -s);
    }

    #[test]
    fn non_mate_scores_pass_through_translation_unchanged() {
        assert_eq!(to_local(150, 10), 150);
        assert_eq!(to_root(-320, 3), -320);
    }

    #[test]
    fn finds_mate_in_one() {
        let board = Board::from_str("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1").expect("valid fen");
        let mut tt = TranspositionTable::new(1);
        let mut repetition = Repetition::new();
        repetition.push(&board);
        let (mv, score, _) = search_fixed_depth(&board, tables(), &mut tt, &mut repetition, 3);
        assert!(mv.is_some());
        assert!(score >= MIN_MATE_SCORE);
    }

    #[test]
    fn stalemate_scores_zero() {
        let board = Board::from_str("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").expect("valid fen");
        let mut tt = TranspositionTable::new(1);
        let mut repetition = Repetition::new();
        repetition.push(&board);
        let (mv, score, _) = search_fixed_depth(&board, tables(), &mut tt, &mut repetition, 1);
        assert_eq!(mv, None);
        assert_eq!(score, 0);
    }

    #[test]
    fn fifty_move_rule_forces_draw_before_expanding() {
        let board = Board::from_str("8/8/8/4k3/8/4K3/8/8 w - - 99 1").expect("valid fen");
        let mut tt = TranspositionTable::new(1);
        let mut repetition = Repetition::new();
        for _ in 0..101 {
            repetition.push(&board);
        }
        assert!(repetition.fifty_move_draw());

        let mut nodes = 0u64;
        let (score, mv) = negamax(
            &board,
            tables(),
            &mut SearchContext::new(),
            &mut tt,
            &mut repetition,
            &AtomicBool::new(false),
            4,
            FIXED_MAX_Q_DEPTH,
            1,
            -SCORE_MAX,
            SCORE_MAX,
            &mut nodes,
        );
        assert_eq!(score, 0);
        assert_eq!(mv, None);
        assert_eq!(nodes, 1);
    }
}
