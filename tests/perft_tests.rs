use std::str::FromStr;
use std::time::Instant;

use vantage::board::Board;
use vantage::moves::magic::loader::load_magic_tables;
use vantage::moves::make::generate_legal;
use vantage::moves::movegen::Mode;
use vantage::moves::perft::{perft, perft_divide, perft_divide_with_breakdown};

const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
const KIWI_FEN: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

const FUZZ_FENS: &[&str] = &[
    START_FEN,
    "rnbq1k1r/pppp1ppp/5n2/4p3/1b1P4/5N2/PPPNPPPP/R1BQKB1R w KQkq - 0 1",
    "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1",
    "4k3/P7/8/8/8/8/8/4K3 w - - 0 1",
];

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

fn run_startpos_depth(depth: u32, expected_nodes: u64) {
    let tables = load_magic_tables();
    let board = Board::from_str(START_FEN).expect("valid startpos");

    let start = Instant::now();
    let nodes = perft(&board, tables, depth);
    let secs = start.elapsed().as_secs_f64().max(1e-9);
    println!("d{depth}: nodes={nodes} time={:.3}s nps={:.0}", secs, nodes as f64 / secs);

    assert_eq!(nodes, expected_nodes, "perft mismatch at depth {depth}: got {nodes}, expected {expected_nodes}");
}

#[test]
fn perft_startpos_d1() {
    run_startpos_depth(1, 20);
}

#[test]
fn perft_startpos_d2() {
    run_startpos_depth(2, 400);
}

#[test]
fn perft_startpos_d3() {
    run_startpos_depth(3, 8_902);
}

#[test]
fn perft_startpos_d4() {
    run_startpos_depth(4, 197_281);
}

#[test]
fn perft_startpos_d5() {
    run_startpos_depth(5, 4_865_609);
}

#[test]
#[ignore]
fn perft_startpos_d6() {
    run_startpos_depth(6, 119_060_324);
}

/// Kiwipete known perft counts: d1=48, d2=2039, d3=97862, d4=4085603.
#[test]
fn perft_kiwipete_complete() {
    let tables = load_magic_tables();
    let expected = [(1, 48u64), (2, 2_039), (3, 97_862), (4, 4_085_603)];

    for (depth, expected_nodes) in expected {
        let board = Board::from_str(KIWI_FEN).expect("valid kiwipete");
        let nodes = perft(&board, tables, depth);
        assert_eq!(nodes, expected_nodes, "kiwipete mismatch at depth {depth}: got {nodes}, expected {expected_nodes}");
    }
}

#[test]
fn perft_kiwipete_divide() {
    let tables = load_magic_tables();
    let board = Board::from_str(KIWI_FEN).unwrap();
    let total = perft_divide(&board, tables, 2);
    assert_eq!(total, 2_039);
}

#[test]
fn divide_startpos_d2_matches_total() {
    let tables = load_magic_tables();
    let board = Board::from_str(START_FEN).unwrap();
    let rows = perft_divide_with_breakdown(&board, tables, 2);
    let total: u64 = rows.iter().map(|(_, pc)| pc.nodes).sum();
    assert_eq!(total, 400);
}

/// Random legal play from a handful of tricky positions; every position
/// visited must recompute to the same hash it carries incrementally.
#[test]
fn perft_fuzz_zobrist_parity() {
    let tables = load_magic_tables();
    let seeds = [1_u64, 2, 3, 42, 99];

    for &seed0 in &seeds {
        for &fen in FUZZ_FENS {
            let mut board = Board::from_str(fen).expect("valid fen");
            let mut seed = seed0;

            for _ply in 0..200 {
                assert_eq!(board.zobrist, board.compute_zobrist_full());

                let mut moves = Vec::new();
                let mut scratch = Vec::with_capacity(256);
                generate_legal(&board, tables, Mode::Normal, &mut moves, &mut scratch);
                if moves.is_empty() {
                    break;
                }

                seed = splitmix64(seed);
                let mv = moves[(seed as usize) % moves.len()];
                board = vantage::moves::make::make_move(&board, mv);
            }
        }
    }
}
