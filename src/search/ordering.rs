//! Move ordering (spec §4.F `search_moves`), ported from
//! `examples/original_source/search.py`'s generator of the same name: hash
//! move first, then the generator-appropriate tier, materialised into a
//! plain buffer rather than lazily yielded (an equivalent simplification
//! spec.md §9 calls out explicitly).

use crate::board::{Piece, Position};
use crate::moves::execute::{is_legal, is_pseudo_legal};
use crate::moves::magic::structs::MagicTables;
use crate::moves::movegen::{GenType, check_evasions, generate_pseudo_legal};
use crate::moves::types::Move;
use crate::search::eval::material;

fn victim_value(pos: &Position, mv: Move) -> i32 {
    if mv.is_en_passant() {
        return material(Piece::Pawn).0;
    }
    pos.piece_at(mv.to()).map(|(_, p)| material(p).0).unwrap_or(0)
}

/// MVV/LVA sort key: primary descending victim (promotions add the
/// promoted piece's value), secondary ascending attacker value.
fn capture_sort_key(pos: &Position, mv: Move) -> (i32, i32) {
    let mut victim = victim_value(pos, mv);
    if let Some(promo) = mv.promotion_piece() {
        victim += material(promo).0;
    }
    let attacker = pos.piece_at(mv.from()).map(|(_, p)| material(p).0).unwrap_or(0);
    (-victim, attacker)
}

fn legal_captures_sorted(pos: &mut Position, tables: &MagicTables) -> Vec<Move> {
    let mut captures = Vec::with_capacity(32);
    generate_pseudo_legal(pos, GenType::Captures, tables, &mut captures);
    captures.sort_by_key(|&mv| capture_sort_key(pos, mv));
    captures.into_iter().filter(|&mv| is_legal(pos, mv, tables)).collect()
}

/// Full `ALL`-generator ordering: hash move, MVV/LVA captures, killers
/// (distinct from the hash move), quiets by descending history.
pub fn order_moves(
    pos: &mut Position,
    tables: &MagicTables,
    hash_move: Option<Move>,
    killers: [Option<Move>; 2],
    history: &[[i32; 64]; 64],
) -> Vec<Move> {
    let mut out = Vec::with_capacity(64);

    if let Some(hm) = hash_move
        && is_pseudo_legal(pos, hm, tables)
        && is_legal(pos, hm, tables)
    {
        out.push(hm);
    }

    out.extend(legal_captures_sorted(pos, tables));

    for killer in killers {
        if let Some(k) = killer
            && Some(k) != hash_move
            && is_pseudo_legal(pos, k, tables)
            && is_legal(pos, k, tables)
        {
            out.push(k);
        }
    }

    let mut quiets = Vec::with_capacity(64);
    generate_pseudo_legal(pos, GenType::Quiets, tables, &mut quiets);
    quiets.sort_by_key(|&mv| -history[mv.from().index() as usize][mv.to().index() as usize]);
    out.extend(quiets.into_iter().filter(|&mv| is_legal(pos, mv, tables)));

    out
}

/// `CAPTURES`-only ordering, used by quiescence.
pub fn order_captures(pos: &mut Position, tables: &MagicTables) -> Vec<Move> {
    legal_captures_sorted(pos, tables)
}

/// Check-evasion ordering: hash move first (possibly duplicated by the
/// evasion list, matching the source's lack of dedup here), then every
/// legal evasion.
pub fn order_evasions(pos: &mut Position, tables: &MagicTables, hash_move: Option<Move>) -> Vec<Move> {
    let mut out = Vec::with_capacity(16);

    if let Some(hm) = hash_move
        && is_pseudo_legal(pos, hm, tables)
        && is_legal(pos, hm, tables)
    {
        out.push(hm);
    }

    let mut evasions = Vec::with_capacity(16);
    check_evasions(pos, tables, &mut evasions);
    out.extend(evasions);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::magic::magic_tables;
    use std::str::FromStr;

    #[test]
    fn captures_sorted_most_valuable_victim_first() {
        let mut pos = Position::from_str("4k3/8/3q4/4p3/8/2N5/8/4K3 w - - 0 1").unwrap();
        let tables = magic_tables();
        let moves = order_captures(&mut pos, tables);
        assert!(!moves.is_empty());
        assert_eq!(moves[0].to(), crate::square::Square::from_san("d6").unwrap());
    }

    #[test]
    fn hash_move_is_first_when_legal() {
        let mut pos = Position::new();
        let tables = magic_tables();
        let hash_move = Move::normal(crate::square::Square::from_san("e2").unwrap(), crate::square::Square::from_san("e4").unwrap());
        let history = [[0i32; 64]; 64];
        let moves = order_moves(&mut pos, tables, Some(hash_move), [None, None], &history);
        assert_eq!(moves[0], hash_move);
    }

    #[test]
    fn illegal_hash_move_is_dropped() {
        let mut pos = Position::new();
        let tables = magic_tables();
        let bogus = Move::normal(crate::square::Square::from_san("e1").unwrap(), crate::square::Square::from_san("e8").unwrap());
        let history = [[0i32; 64]; 64];
        let moves = order_moves(&mut pos, tables, Some(bogus), [None, None], &history);
        assert!(!moves.contains(&bogus));
    }
}
