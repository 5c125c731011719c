use crate::board::Board;
use crate::moves::make::{generate_legal, is_castle_move, is_en_passant_move, make_move};
use crate::moves::movegen::Mode;
use crate::moves::{magic::MagicTables, square_control::in_check, types::Move};
use tracing::{debug, instrument};

const MAX_LOG_DEPTH: u32 = 3; // only trace details for shallow nodes
const MAX_PERFT_DEPTH: usize = 20; // support perft up to depth 20

pub struct PerftCounters {
    pub nodes: u64,
    pub captures: u64,
    pub ep_captures: u64,
    pub castles: u64,
    pub promotions: u64,
    pub checks: u64,
    pub checkmates: u64,
}

impl PerftCounters {
    pub fn zero() -> Self {
        Self {
            nodes: 0,
            captures: 0,
            ep_captures: 0,
            castles: 0,
            promotions: 0,
            checks: 0,
            checkmates: 0,
        }
    }
    pub fn add(&mut self, o: &PerftCounters) {
        self.nodes += o.nodes;
        self.captures += o.captures;
        self.ep_captures += o.ep_captures;
        self.castles += o.castles;
        self.promotions += o.promotions;
        self.checks += o.checks;
        self.checkmates += o.checkmates;
    }
}

fn create_move_buffer_array() -> [Vec<Move>; MAX_PERFT_DEPTH] {
    std::array::from_fn(|_| Vec::with_capacity(64))
}

fn create_pseudo_buffer_array() -> [Vec<Move>; MAX_PERFT_DEPTH] {
    std::array::from_fn(|_| Vec::with_capacity(256))
}

#[inline]
fn sq_as_a1_zero(idx: u8) -> String {
    let file = idx % 8;
    let rank = idx / 8;
    let f = (b'a' + file) as char;
    let r = (b'1' + rank) as char;
    format!("{f}{r}")
}

fn perft_recursive(
    board: &Board,
    tables: &MagicTables,
    depth: u32,
    ply: usize,
    move_buffers: &mut [Vec<Move>],
    pseudo_buffers: &mut [Vec<Move>],
) -> u64 {
    if depth == 0 {
        return 1;
    }

    {
        let moves = &mut move_buffers[ply];
        let pseudo = &mut pseudo_buffers[ply];
        generate_legal(board, tables, Mode::Normal, moves, pseudo);
    }

    let moves: Vec<Move> = move_buffers[ply].clone();
    let mut node_count = 0;
    for mv in moves {
        let child = make_move(board, mv);
        node_count += perft_recursive(&child, tables, depth - 1, ply + 1, move_buffers, pseudo_buffers);
    }
    node_count
}

#[instrument(skip(board, tables), fields(depth))]
pub fn perft(board: &Board, tables: &MagicTables, depth: u32) -> u64 {
    if depth as usize > MAX_PERFT_DEPTH {
        panic!("Depth {} exceeds MAX_PERFT_DEPTH {}", depth, MAX_PERFT_DEPTH);
    }

    let mut move_buffers = create_move_buffer_array();
    let mut pseudo_buffers = create_pseudo_buffer_array();

    perft_recursive(board, tables, depth, 0, &mut move_buffers, &mut pseudo_buffers)
}

#[instrument(skip(board, tables), fields(depth))]
pub fn perft_divide(board: &Board, tables: &MagicTables, depth: u32) -> u64 {
    if depth as usize > MAX_PERFT_DEPTH {
        panic!("Depth {} exceeds MAX_PERFT_DEPTH {}", depth, MAX_PERFT_DEPTH);
    }

    let mut move_buffers = create_move_buffer_array();
    let mut pseudo_buffers = create_pseudo_buffer_array();

    {
        let moves = &mut move_buffers[0];
        let pseudo = &mut pseudo_buffers[0];
        generate_legal(board, tables, Mode::Normal, moves, pseudo);

        if depth <= MAX_LOG_DEPTH {
            debug!(depth, moves = moves.len(), "divide: root legal moves");
        }
    }

    let moves: Vec<Move> = move_buffers[0].clone();
    let mut total = 0;

    for mv in moves {
        if depth <= MAX_LOG_DEPTH {
            let from = mv.from.index();
            let to = mv.to.index();
            debug!(%mv, depth, from_idx = from, to_idx = to,
                from_a1 = %sq_as_a1_zero(from), to_a1 = %sq_as_a1_zero(to),
                "divide: exploring root move");
        }

        let child = make_move(board, mv);
        let count = if depth == 1 {
            1
        } else {
            perft_recursive(&child, tables, depth - 1, 1, &mut move_buffers, &mut pseudo_buffers)
        };

        if depth <= MAX_LOG_DEPTH {
            debug!(%mv, nodes = count, "divide: root child total");
        }

        println!("{}: {}", mv, count);
        total += count;
    }

    debug!(depth, total, "divide: total");
    println!("Total: {}", total);
    total
}

fn perft_count_recursive(
    board: &Board,
    tables: &MagicTables,
    depth: u32,
    ply: usize,
    out: &mut PerftCounters,
    move_buffers: &mut [Vec<Move>],
    pseudo_buffers: &mut [Vec<Move>],
) {
    if depth == 0 {
        out.nodes += 1;

        let side_in_check = in_check(board, board.side_to_move, tables);
        if side_in_check {
            out.checks += 1;
        }

        {
            let tmp = &mut move_buffers[ply];
            let scratch = &mut pseudo_buffers[ply];
            generate_legal(board, tables, Mode::Normal, tmp, scratch);
        }

        if move_buffers[ply].is_empty() && side_in_check {
            out.checkmates += 1;
        }
        return;
    }

    {
        let moves = &mut move_buffers[ply];
        let pseudo = &mut pseudo_buffers[ply];
        generate_legal(board, tables, Mode::Normal, moves, pseudo);
    }

    let moves: Vec<Move> = move_buffers[ply].clone();
    for mv in moves {
        if mv.is_capture() {
            out.captures += 1;
            if is_en_passant_move(board, mv) {
                out.ep_captures += 1;
            }
        }
        if is_castle_move(mv) {
            out.castles += 1;
        }
        if mv.is_promotion() {
            out.promotions += 1;
        }

        let child = make_move(board, mv);

        #[cfg(debug_assertions)]
        debug_assert_eq!(child.compute_zobrist_full(), child.zobrist, "full recompute mismatch");

        perft_count_recursive(&child, tables, depth - 1, ply + 1, out, move_buffers, pseudo_buffers);
    }
}

pub fn perft_count_with_breakdown(
    board: &Board,
    tables: &MagicTables,
    depth: u32,
    out: &mut PerftCounters,
) {
    if depth as usize > MAX_PERFT_DEPTH {
        panic!("Depth {} exceeds MAX_PERFT_DEPTH {}", depth, MAX_PERFT_DEPTH);
    }

    let mut move_buffers = create_move_buffer_array();
    let mut pseudo_buffers = create_pseudo_buffer_array();

    perft_count_recursive(board, tables, depth, 0, out, &mut move_buffers, &mut pseudo_buffers);
}

pub fn perft_divide_with_breakdown(
    board: &Board,
    tables: &MagicTables,
    depth: u32,
) -> Vec<(Move, PerftCounters)> {
    if depth as usize > MAX_PERFT_DEPTH {
        panic!("Depth {} exceeds MAX_PERFT_DEPTH {}", depth, MAX_PERFT_DEPTH);
    }

    let mut move_buffers = create_move_buffer_array();
    let mut pseudo_buffers = create_pseudo_buffer_array();

    {
        let moves = &mut move_buffers[0];
        let pseudo = &mut pseudo_buffers[0];
        generate_legal(board, tables, Mode::Normal, moves, pseudo);
    }

    let moves: Vec<Move> = move_buffers[0].clone();
    let mut out = Vec::with_capacity(moves.len());

    for mv in moves {
        let child = make_move(board, mv);
        let mut pc = PerftCounters::zero();

        if depth > 1 {
            perft_count_recursive(&child, tables, depth - 1, 1, &mut pc, &mut move_buffers, &mut pseudo_buffers);
        } else {
            pc.nodes = 1;
        }

        out.push((mv, pc));
    }
    out
}
