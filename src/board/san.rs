//! Short algebraic notation (spec §4.C `move_to_san`), ported from
//! `examples/original_source/position.py`'s method of the same name, with
//! disambiguation added (the original never needs it because its callers
//! never face an ambiguous pair of pieces).

use super::{Piece, Position};
use crate::moves::execute::{gives_check, is_capture, is_legal};
use crate::moves::magic::structs::MagicTables;
use crate::moves::movegen::{GenType, generate_pseudo_legal};
use crate::moves::types::Move;
use crate::status::{GameStatus, position_status};

fn piece_letter(piece: Piece) -> char {
    match piece {
        Piece::Pawn => 'P',
        Piece::Knight => 'N',
        Piece::Bishop => 'B',
        Piece::Rook => 'R',
        Piece::Queen => 'Q',
        Piece::King => 'K',
    }
}

/// Whether another legal move of the same piece type reaches `mv.to()`,
/// and whether any such move shares `mv`'s file / rank.
fn disambiguation(pos: &mut Position, tables: &MagicTables, mv: Move, piece: Piece) -> (bool, bool, bool) {
    let mut pseudo = Vec::with_capacity(64);
    generate_pseudo_legal(pos, GenType::All, tables, &mut pseudo);

    let mut same_file = false;
    let mut same_rank = false;
    let mut any_other = false;

    for other in pseudo {
        if other.to() != mv.to() || other.from() == mv.from() {
            continue;
        }
        let Some((_, other_piece)) = pos.piece_at(other.from()) else { continue };
        if other_piece != piece {
            continue;
        }
        if !is_legal(pos, other, tables) {
            continue;
        }
        any_other = true;
        if other.from().file() == mv.from().file() {
            same_file = true;
        }
        if other.from().rank() == mv.from().rank() {
            same_rank = true;
        }
    }

    (any_other, same_file, same_rank)
}

/// Abbreviated algebraic notation for `mv`, assumed legal in `pos`.
/// Castling collapses to `O-O`/`O-O-O`; otherwise piece letter (omitted for
/// pawns) plus disambiguation, `x` on capture, destination square, `=`
/// promotion suffix, and a trailing `+`/`#`.
pub fn move_to_san(pos: &mut Position, mv: Move, tables: &MagicTables) -> String {
    if mv.is_castling() {
        return if mv.to().file() > mv.from().file() { "O-O".to_string() } else { "O-O-O".to_string() };
    }

    let Some((_, piece)) = pos.piece_at(mv.from()) else { return mv.to_uci() };
    let capture = is_capture(pos, mv);

    let mut san = String::new();
    if piece == Piece::Pawn {
        if capture {
            san.push((b'a' + mv.from().file()) as char);
        }
    } else {
        san.push(piece_letter(piece));
        let (any_other, same_file, same_rank) = disambiguation(pos, tables, mv, piece);
        if any_other {
            if !same_file {
                san.push((b'a' + mv.from().file()) as char);
            } else if !same_rank {
                san.push((b'1' + mv.from().rank()) as char);
            } else {
                san.push_str(&mv.from().to_string());
            }
        }
    }

    if capture {
        san.push('x');
    }
    san.push_str(&mv.to().to_string());

    if let Some(promo) = mv.promotion_piece() {
        san.push('=');
        san.push(piece_letter(promo));
    }

    if gives_check(pos, mv, tables) {
        crate::moves::execute::make_move(pos, mv);
        let status = position_status(pos, tables);
        crate::moves::execute::undo_move(pos);
        san.push(if status == GameStatus::Checkmate { '#' } else { '+' });
    }

    san
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::magic::magic_tables;
    use crate::square::Square;
    use std::str::FromStr;

    #[test]
    fn simple_pawn_push_has_no_prefix() {
        let mut pos = Position::new();
        let tables = magic_tables();
        let mv = Move::normal(Square::from_san("e2").unwrap(), Square::from_san("e4").unwrap());
        assert_eq!(move_to_san(&mut pos, mv, tables), "e4");
    }

    #[test]
    fn pawn_capture_keeps_source_file() {
        let mut pos = Position::from_str("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let tables = magic_tables();
        let mv = Move::normal(Square::from_san("e4").unwrap(), Square::from_san("d5").unwrap());
        assert_eq!(move_to_san(&mut pos, mv, tables), "exd5");
    }

    #[test]
    fn knight_move_gets_piece_letter() {
        let mut pos = Position::new();
        let tables = magic_tables();
        let mv = Move::normal(Square::from_san("g1").unwrap(), Square::from_san("f3").unwrap());
        assert_eq!(move_to_san(&mut pos, mv, tables), "Nf3");
    }

    #[test]
    fn ambiguous_rook_move_disambiguates_by_file() {
        let mut pos = Position::from_str("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let tables = magic_tables();
        let mv = Move::normal(Square::from_san("a1").unwrap(), Square::from_san("d1").unwrap());
        assert_eq!(move_to_san(&mut pos, mv, tables), "Rad1");
    }

    #[test]
    fn castling_kingside() {
        let mut pos = Position::from_str("4k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        let tables = magic_tables();
        let mv = Move::castling(Square::from_san("e1").unwrap(), Square::from_san("g1").unwrap());
        assert_eq!(move_to_san(&mut pos, mv, tables), "O-O");
    }

    #[test]
    fn checkmating_move_gets_hash_suffix() {
        let mut pos = Position::from_str("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
        let tables = magic_tables();
        let mv = Move::normal(Square::from_san("a1").unwrap(), Square::from_san("a8").unwrap());
        assert_eq!(move_to_san(&mut pos, mv, tables), "Ra8#");
    }
}
