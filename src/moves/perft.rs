//! Move-count search tree enumeration, used to validate the move generator
//! against known node counts at fixed depths.

use crate::board::{EMPTY_SQ, Position};
use crate::moves::execute::{make_move, undo_move};
use crate::moves::magic::structs::MagicTables;
use crate::moves::movegen::generate_legal;
use crate::moves::square_control::in_check;
use crate::moves::types::Move;
use tracing::instrument;

#[derive(Debug, Clone, Copy, Default)]
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
        Self::default()
    }

    fn add(&mut self, other: PerftCounters) {
        self.nodes += other.nodes;
        self.captures += other.captures;
        self.ep_captures += other.ep_captures;
        self.castles += other.castles;
        self.promotions += other.promotions;
        self.checks += other.checks;
        self.checkmates += other.checkmates;
    }
}

/// Plain node count at `depth`, no per-move breakdown.
pub fn perft(pos: &mut Position, tables: &MagicTables, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut moves = Vec::with_capacity(64);
    let mut scratch = Vec::with_capacity(256);
    generate_legal(pos, tables, &mut moves, &mut scratch);

    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;
    for mv in moves {
        make_move(pos, mv);
        nodes += perft(pos, tables, depth - 1);
        undo_move(pos);
    }
    nodes
}

/// Per-move node counts at the root, for cross-checking against a reference
/// engine's `go perft` output.
#[instrument(skip(pos, tables))]
pub fn perft_divide(pos: &mut Position, tables: &MagicTables, depth: u32) -> Vec<(Move, u64)> {
    let mut moves = Vec::with_capacity(64);
    let mut scratch = Vec::with_capacity(256);
    generate_legal(pos, tables, &mut moves, &mut scratch);

    let mut out = Vec::with_capacity(moves.len());
    for mv in moves {
        make_move(pos, mv);
        let count = if depth <= 1 { 1 } else { perft(pos, tables, depth - 1) };
        undo_move(pos);
        out.push((mv, count));
    }
    out
}

/// `perft` with the classic capture/en-passant/castle/promotion/check/mate
/// breakdown, tallied at the leaves (depth 0).
pub fn perft_count_with_breakdown(pos: &mut Position, tables: &MagicTables, depth: u32) -> PerftCounters {
    perft_count_recursive(pos, tables, depth)
}

fn perft_count_recursive(pos: &mut Position, tables: &MagicTables, depth: u32) -> PerftCounters {
    if depth == 0 {
        return PerftCounters { nodes: 1, ..PerftCounters::zero() };
    }

    let mut moves = Vec::with_capacity(64);
    let mut scratch = Vec::with_capacity(256);
    generate_legal(pos, tables, &mut moves, &mut scratch);

    let mut total = PerftCounters::zero();
    for mv in moves {
        let captured_before = pos.squares[mv.to().index() as usize] != EMPTY_SQ;

        make_move(pos, mv);

        if depth == 1 {
            total.nodes += 1;
            if captured_before || mv.is_en_passant() {
                total.captures += 1;
            }
            if mv.is_en_passant() {
                total.ep_captures += 1;
            }
            if mv.is_castling() {
                total.castles += 1;
            }
            if mv.is_promotion() {
                total.promotions += 1;
            }
            let opp = pos.side_to_move;
            if in_check(pos, opp, tables) {
                total.checks += 1;
                let mut reply = Vec::with_capacity(64);
                let mut reply_scratch = Vec::with_capacity(256);
                generate_legal(pos, tables, &mut reply, &mut reply_scratch);
                if reply.is_empty() {
                    total.checkmates += 1;
                }
            }
        } else {
            total.add(perft_count_recursive(pos, tables, depth - 1));
        }

        undo_move(pos);
    }
    total
}

/// Per-move breakdown at the root, for debugging perft divergences.
pub fn perft_divide_with_breakdown(pos: &mut Position, tables: &MagicTables, depth: u32) -> Vec<(Move, PerftCounters)> {
    let mut moves = Vec::with_capacity(64);
    let mut scratch = Vec::with_capacity(256);
    generate_legal(pos, tables, &mut moves, &mut scratch);

    let mut out = Vec::with_capacity(moves.len());
    for mv in moves {
        make_move(pos, mv);
        let counters = if depth <= 1 {
            PerftCounters { nodes: 1, ..PerftCounters::zero() }
        } else {
            perft_count_recursive(pos, tables, depth - 1)
        };
        undo_move(pos);
        out.push((mv, counters));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::magic::magic_tables;

    #[test]
    fn starting_position_perft_1_through_3() {
        let mut pos = Position::new();
        let tables = magic_tables();
        assert_eq!(perft(&mut pos, tables, 1), 20);
        assert_eq!(perft(&mut pos, tables, 2), 400);
        assert_eq!(perft(&mut pos, tables, 3), 8_902);
    }

    #[test]
    fn starting_position_perft_4() {
        let mut pos = Position::new();
        let tables = magic_tables();
        assert_eq!(perft(&mut pos, tables, 4), 197_281);
    }

    #[test]
    fn kiwipete_perft_2() {
        let mut pos: Position = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
            .parse()
            .unwrap();
        let tables = magic_tables();
        assert_eq!(perft(&mut pos, tables, 1), 48);
        assert_eq!(perft(&mut pos, tables, 2), 2_039);
    }

    #[test]
    fn perft_divide_sums_to_perft() {
        let mut pos = Position::new();
        let tables = magic_tables();
        let divided = perft_divide(&mut pos, tables, 3);
        let sum: u64 = divided.iter().map(|(_, n)| n).sum();
        assert_eq!(sum, 8_902);
    }
}
