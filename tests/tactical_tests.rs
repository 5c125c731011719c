use std::str::FromStr;

use vantage::board::Board;
use vantage::moves::magic::loader::load_magic_tables;
use vantage::repetition::Repetition;
use vantage::search::search_fixed_depth;
use vantage::search::tt::TranspositionTable;

fn run(fen: &str, depth: i32) -> (Option<vantage::moves::types::Move>, i32) {
    let board = Board::from_str(fen).unwrap();
    let tables = load_magic_tables();
    let mut tt = TranspositionTable::new(4);
    let mut repetition = Repetition::new();
    let (mv, eval, _stats) = search_fixed_depth(&board, tables, &mut tt, &mut repetition, depth);
    (mv, eval)
}

#[test]
fn finds_back_rank_mate() {
    // Black to move, delivers back rank mate with Rd1#.
    let (mv, _eval) = run("3r2k1/5ppp/8/8/8/8/5PPP/6K1 b - - 0 1", 3);
    let mv = mv.expect("should find a move");
    assert_eq!(mv.to_uci(), "d8d1");
}

#[test]
fn captures_hanging_queen() {
    // White queen hanging on e5; black queen on e8 can take it.
    let (mv, eval) = run("rnb1kbnr/pppp1ppp/4q3/4Q3/4P3/8/PPPP1PPP/RNB1KBNR b KQkq - 0 1", 2);
    let mv = mv.expect("should find a move");
    assert!(mv.to_uci().ends_with("e5"), "should capture the queen on e5: {}", mv.to_uci());
    // Black to move capturing a white queen swings the white-relative eval very negative.
    assert!(eval < -700, "should recognize the material swing, got {eval}");
}

#[test]
fn starting_position_is_roughly_equal() {
    let (mv, eval) = run("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", 3);
    assert!(mv.is_some(), "should find a move in the starting position");
    assert!(eval.abs() < 150, "starting position should be close to equal, got {eval}");
}

#[test]
fn recognizes_queen_advantage() {
    // White is up a queen.
    let (_mv, eval) = run("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", 2);
    assert!(eval > 700, "should recognize the queen advantage, got {eval}");
}

#[test]
fn recognizes_queen_disadvantage() {
    // Black is up a queen (White is missing its queen).
    let (_mv, eval) = run("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNB1KBNR w KQkq - 0 1", 2);
    assert!(eval < -700, "should recognize the queen disadvantage, got {eval}");
}
