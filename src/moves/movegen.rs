//! Pseudo-legal and legal move generation (spec §4.C/§4.D): one routine per
//! piece kind, filtered by `GenType`, plus the legality filter and the
//! dedicated check-evasion path.

use crate::bitboard::BitboardExt;
use crate::board::{CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ, Color, Piece, Position};
use crate::moves::execute::{make_move, undo_move};
use crate::moves::magic::attacks::{get_king_attacks, get_knight_attacks};
use crate::moves::magic::structs::MagicTables;
use crate::moves::square_control::{attackers_to, in_check, is_legal_castling};
use crate::moves::tables::{between, pawn_attacks};
use crate::moves::types::{Move, MoveBuffer};
use crate::square::Square;

/// Which subset of pseudo-legal moves a generator should emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenType {
    All,
    Captures,
    Quiets,
}

const PROMOTION_PIECES: [Piece; 4] = [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen];

fn emit_promotions(from: Square, to: Square, gen_type: GenType, moves: &mut impl MoveBuffer) {
    for &piece in &PROMOTION_PIECES {
        let is_queen = piece == Piece::Queen;
        let include = match gen_type {
            GenType::All => true,
            GenType::Captures => is_queen,
            GenType::Quiets => !is_queen,
        };
        if include {
            moves.push(Move::promotion(from, to, piece));
        }
    }
}

fn generate_pawn_moves(pos: &Position, gen_type: GenType, moves: &mut impl MoveBuffer) {
    let side = pos.side_to_move;
    let colour = side.index();
    let push: i32 = if side == Color::White { 8 } else { -8 };
    let start_rank: u8 = if side == Color::White { 1 } else { 6 };
    let promo_rank: u8 = if side == Color::White { 7 } else { 0 };
    let enemy_occ = pos.occupancy_for(side.opposite());

    let mut pawns = pos.piece_bb(side, Piece::Pawn);
    while pawns != 0 {
        let from_idx = pawns.pop_lsb();
        let from = Square::from_index(from_idx);
        let from_sq = from_idx as i32;

        if gen_type != GenType::Captures {
            let push_idx = from_sq + push;
            if (0..64).contains(&push_idx) && pos.squares[push_idx as usize] == 0 {
                let to = Square::from_index(push_idx as u8);
                if to.rank() == promo_rank {
                    emit_promotions(from, to, gen_type, moves);
                } else {
                    moves.push(Move::normal(from, to));
                    if from.rank() == start_rank {
                        let double_idx = from_sq + 2 * push;
                        if pos.squares[double_idx as usize] == 0 {
                            moves.push(Move::normal(from, Square::from_index(double_idx as u8)));
                        }
                    }
                }
            }
        }

        if gen_type != GenType::Quiets {
            let mut targets = pawn_attacks(colour, from_idx as usize) & enemy_occ;
            while targets != 0 {
                let to_idx = targets.pop_lsb();
                let to = Square::from_index(to_idx);
                if to.rank() == promo_rank {
                    emit_promotions(from, to, gen_type, moves);
                } else {
                    moves.push(Move::normal(from, to));
                }
            }

            if let Some(ep) = pos.ep_square {
                if pawn_attacks(colour, from_idx as usize) & ep.bb() != 0 {
                    moves.push(Move::en_passant(from, ep));
                }
            }
        }
    }
}

fn occ_filter(pos: &Position, side: Color, gen_type: GenType) -> u64 {
    match gen_type {
        GenType::Captures => pos.occupancy_for(side.opposite()),
        GenType::Quiets => !pos.occupancy,
        GenType::All => !pos.occupancy_for(side),
    }
}

fn generate_step_moves(pos: &Position, piece: Piece, gen_type: GenType, moves: &mut impl MoveBuffer) {
    let side = pos.side_to_move;
    let filter = occ_filter(pos, side, gen_type);
    let mut pieces = pos.piece_bb(side, piece);
    while pieces != 0 {
        let from_idx = pieces.pop_lsb();
        let from = Square::from_index(from_idx);
        let attacks = match piece {
            Piece::Knight => get_knight_attacks(from_idx as usize),
            Piece::King => get_king_attacks(from_idx as usize),
            _ => unreachable!("generate_step_moves called with sliding piece"),
        };
        let mut targets = attacks & filter;
        while targets != 0 {
            let to = Square::from_index(targets.pop_lsb());
            moves.push(Move::normal(from, to));
        }
    }
}

fn generate_slider_moves(pos: &Position, piece: Piece, gen_type: GenType, tables: &MagicTables, moves: &mut impl MoveBuffer) {
    let side = pos.side_to_move;
    let filter = occ_filter(pos, side, gen_type);
    let occ = pos.occupancy;
    let mut pieces = pos.piece_bb(side, piece);
    while pieces != 0 {
        let from_idx = pieces.pop_lsb();
        let from = Square::from_index(from_idx);
        let attacks = match piece {
            Piece::Bishop => tables.bishop.get_attacks(from_idx as usize, occ),
            Piece::Rook => tables.rook.get_attacks(from_idx as usize, occ),
            Piece::Queen => tables.queen_attacks(from_idx as usize, occ),
            _ => unreachable!("generate_slider_moves called with non-sliding piece"),
        };
        let mut targets = attacks & filter;
        while targets != 0 {
            let to = Square::from_index(targets.pop_lsb());
            moves.push(Move::normal(from, to));
        }
    }
}

fn generate_castling_moves(pos: &Position, tables: &MagicTables, moves: &mut impl MoveBuffer) {
    let side = pos.side_to_move;
    let (king_sq, kingside_flag, queenside_flag, king_to_k, king_to_q, rook_k, rook_q) = match side {
        Color::White => (Square::from_index(4), CASTLE_WK, CASTLE_WQ, 6u8, 2u8, 7u8, 0u8),
        Color::Black => (Square::from_index(60), CASTLE_BK, CASTLE_BQ, 62u8, 58u8, 63u8, 56u8),
    };

    if pos.has_castling(kingside_flag) {
        let clear = ((king_sq.index() + 1)..rook_k).all(|s| pos.squares[s as usize] == 0);
        if clear {
            let mv = Move::castling(king_sq, Square::from_index(king_to_k));
            if is_legal_castling(pos, mv, tables) {
                moves.push(mv);
            }
        }
    }
    if pos.has_castling(queenside_flag) {
        let clear = ((rook_q + 1)..king_sq.index()).all(|s| pos.squares[s as usize] == 0);
        if clear {
            let mv = Move::castling(king_sq, Square::from_index(king_to_q));
            if is_legal_castling(pos, mv, tables) {
                moves.push(mv);
            }
        }
    }
}

/// Appends every pseudo-legal move of `gen_type` to `moves`. Does not filter
/// for leaving the king in check.
pub fn generate_pseudo_legal(pos: &Position, gen_type: GenType, tables: &MagicTables, moves: &mut impl MoveBuffer) {
    generate_pawn_moves(pos, gen_type, moves);
    generate_step_moves(pos, Piece::Knight, gen_type, moves);
    generate_slider_moves(pos, Piece::Bishop, gen_type, tables, moves);
    generate_slider_moves(pos, Piece::Rook, gen_type, tables, moves);
    generate_slider_moves(pos, Piece::Queen, gen_type, tables, moves);
    generate_step_moves(pos, Piece::King, gen_type, moves);
    if gen_type != GenType::Captures {
        generate_castling_moves(pos, tables, moves);
    }
}

/// Filters `candidates` by playing each move and checking the mover isn't
/// left in check, appending survivors to `moves`.
fn filter_legal(pos: &mut Position, tables: &MagicTables, candidates: &[Move], moves: &mut impl MoveBuffer) {
    let mover = pos.side_to_move;
    for &mv in candidates {
        if mv.is_castling() {
            // Castling legality (king not in/through/into check) was already
            // verified at generation time.
            moves.push(mv);
            continue;
        }
        make_move(pos, mv);
        if !in_check(pos, mover, tables) {
            moves.push(mv);
        }
        undo_move(pos);
    }
}

/// All legal moves in the current position. Dispatches to the dedicated
/// check-evasion path when the side to move is in check.
pub fn generate_legal(pos: &mut Position, tables: &MagicTables, moves: &mut impl MoveBuffer, scratch: &mut Vec<Move>) {
    if in_check(pos, pos.side_to_move, tables) {
        check_evasions(pos, tables, moves);
        return;
    }
    scratch.clear();
    generate_pseudo_legal(pos, GenType::All, tables, scratch);
    let candidates = std::mem::take(scratch);
    filter_legal(pos, tables, &candidates, moves);
    *scratch = candidates;
}

/// Legal moves when the side to move is in check: king steps to
/// non-attacked squares (king removed from occupancy for the x-ray check),
/// plus, against a single checker, captures of the checker and
/// interpositions on the blocking ray, each re-verified against pins by
/// make/undo.
pub fn check_evasions(pos: &mut Position, tables: &MagicTables, moves: &mut impl MoveBuffer) {
    let side = pos.side_to_move;
    let enemy = side.opposite();
    let king_sq = pos.king_square(side);
    let occ_without_king = pos.occupancy & !king_sq.bb();

    let king_targets = get_king_attacks(king_sq.index() as usize) & !pos.occupancy_for(side);
    let mut targets = king_targets;
    let mut king_candidates = Vec::new();
    while targets != 0 {
        let to = Square::from_index(targets.pop_lsb());
        if attackers_to(pos, to, enemy, occ_without_king) == 0 {
            king_candidates.push(Move::normal(king_sq, to));
        }
    }
    filter_legal(pos, tables, &king_candidates, moves);

    let checkers = attackers_to(pos, king_sq, enemy, pos.occupancy);
    if checkers.count_ones() != 1 {
        return;
    }
    let checker_sq = Square::from_index(checkers.lsb());
    let block_mask = between(king_sq.index() as usize, checker_sq.index() as usize) | checker_sq.bb();

    let mut non_king = Vec::new();
    generate_pawn_moves(pos, GenType::All, &mut non_king);
    generate_step_moves(pos, Piece::Knight, GenType::All, &mut non_king);
    generate_slider_moves(pos, Piece::Bishop, GenType::All, tables, &mut non_king);
    generate_slider_moves(pos, Piece::Rook, GenType::All, tables, &mut non_king);
    generate_slider_moves(pos, Piece::Queen, GenType::All, tables, &mut non_king);

    let blockers: Vec<Move> = non_king
        .into_iter()
        .filter(|mv| {
            if mv.is_en_passant() {
                // The captured pawn sits behind the ep square; an en-passant
                // evasion is only valid if that pawn is the checker.
                let captured_sq = if side == Color::White {
                    Square::from_index(mv.to().index() - 8)
                } else {
                    Square::from_index(mv.to().index() + 8)
                };
                captured_sq == checker_sq
            } else {
                block_mask & mv.to().bb() != 0
            }
        })
        .collect();
    filter_legal(pos, tables, &blockers, moves);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::magic::magic_tables;
    use std::str::FromStr;

    #[test]
    fn starting_position_has_20_legal_moves() {
        let mut pos = Position::new();
        let tables = magic_tables();
        let mut moves = Vec::new();
        let mut scratch = Vec::new();
        generate_legal(&mut pos, tables, &mut moves, &mut scratch);
        assert_eq!(moves.len(), 20);
    }

    #[test]
    fn double_check_only_king_moves() {
        // White king e1, black knight on d3 and rook on e-file both check.
        let mut pos = Position::from_str("4k3/8/8/8/8/3n4/4r3/4K3 w - - 0 1").unwrap();
        let tables = magic_tables();
        let mut moves = Vec::new();
        let mut scratch = Vec::new();
        generate_legal(&mut pos, tables, &mut moves, &mut scratch);
        for mv in &moves {
            assert_eq!(mv.from(), Square::from_index(4));
        }
    }

    #[test]
    fn single_checker_allows_capture_and_block() {
        // White king e1, black rook e8 gives check along the open e-file;
        // assert every legal move resolves the check (king steps off the
        // file, or the destination square is itself on the e-file).
        let mut pos = Position::from_str("4r3/8/8/4R3/8/8/8/4K3 w - - 0 1").unwrap();
        let tables = magic_tables();
        let mut moves = Vec::new();
        let mut scratch = Vec::new();
        generate_legal(&mut pos, tables, &mut moves, &mut scratch);
        assert!(!moves.is_empty());
        for mv in &moves {
            let resolves = mv.from() == Square::from_index(4) || mv.to().file() == 4;
            assert!(resolves);
        }
    }
}
