//! FEN parsing/serialization (spec §4.C, §9 open question #1: the castling
//! field uses the letters `KQkq`, not the bit names `W_K`/`B_K`/... — this
//! fixes a bug present in the teacher where the parser matched on the wrong
//! glyph for queenside rights).

use super::fen_tables::{CHAR_TO_PC, PC_TO_CHAR};
use super::{CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ, Color, Piece, Position};
use crate::error::EngineError;
use crate::square::Square;

pub fn from_fen(s: &str) -> Result<Position, EngineError> {
    let fields: Vec<&str> = s.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(EngineError::ParseError {
            field: "fen",
            reason: format!("expected at least 4 fields, got {}", fields.len()),
        });
    }

    let mut pos = Position::new_empty();
    parse_board(fields[0], &mut pos)?;

    pos.side_to_move = match fields[1] {
        "w" => Color::White,
        "b" => Color::Black,
        other => {
            return Err(EngineError::ParseError {
                field: "side_to_move",
                reason: format!("expected `w` or `b`, got `{other}`"),
            });
        }
    };

    let mut rights = 0u8;
    if fields[2] != "-" {
        for c in fields[2].chars() {
            rights |= match c {
                'K' => CASTLE_WK,
                'Q' => CASTLE_WQ,
                'k' => CASTLE_BK,
                'q' => CASTLE_BQ,
                other => {
                    return Err(EngineError::ParseError {
                        field: "castling",
                        reason: format!("unexpected castling glyph `{other}`"),
                    });
                }
            };
        }
    }
    pos.castling_rights = rights;

    pos.ep_square = if fields[3] == "-" {
        None
    } else {
        Some(Square::from_san(fields[3]).ok_or_else(|| EngineError::ParseError {
            field: "en_passant",
            reason: format!("invalid square `{}`", fields[3]),
        })?)
    };

    pos.halfmove_clock = fields.get(4).and_then(|s| s.parse().ok()).unwrap_or(0);
    pos.fullmove_number = fields.get(5).and_then(|s| s.parse().ok()).unwrap_or(1);

    pos.refresh_hashes();
    Ok(pos)
}

fn parse_board(placement: &str, pos: &mut Position) -> Result<(), EngineError> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(EngineError::ParseError {
            field: "piece_placement",
            reason: format!("expected 8 ranks, got {}", ranks.len()),
        });
    }

    for (rank_from_top, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - rank_from_top;
        let mut file = 0usize;
        for ch in rank_str.chars() {
            if let Some(skip) = ch.to_digit(9) {
                file += skip as usize;
                continue;
            }
            if file >= 8 {
                return Err(EngineError::ParseError {
                    field: "piece_placement",
                    reason: format!("rank `{rank_str}` overflows 8 files"),
                });
            }
            let (piece, color) = CHAR_TO_PC[ch as usize].ok_or_else(|| EngineError::ParseError {
                field: "piece_placement",
                reason: format!("unexpected glyph `{ch}`"),
            })?;
            let sq = Square::make(file as u8, rank as u8);
            pos.set_square(sq, Some((color, piece)));
            file += 1;
        }
        if file != 8 {
            return Err(EngineError::ParseError {
                field: "piece_placement",
                reason: format!("rank `{rank_str}` covers {file} files, expected 8"),
            });
        }
    }
    Ok(())
}

pub fn to_fen(pos: &Position) -> String {
    let mut out = String::new();
    for rank_from_top in 0..8 {
        let rank = 7 - rank_from_top;
        let mut empty_run = 0u32;
        for file in 0..8 {
            let sq = Square::make(file, rank as u8);
            match pos.piece_at(sq) {
                None => empty_run += 1,
                Some((color, piece)) => {
                    if empty_run > 0 {
                        out.push_str(&empty_run.to_string());
                        empty_run = 0;
                    }
                    let idx = (color as usize) * 6 + (piece as usize - 1);
                    out.push(PC_TO_CHAR[idx]);
                }
            }
        }
        if empty_run > 0 {
            out.push_str(&empty_run.to_string());
        }
        if rank_from_top != 7 {
            out.push('/');
        }
    }

    out.push(' ');
    out.push(if pos.side_to_move == Color::White { 'w' } else { 'b' });

    out.push(' ');
    if pos.castling_rights == 0 {
        out.push('-');
    } else {
        if pos.has_castling(CASTLE_WK) {
            out.push('K');
        }
        if pos.has_castling(CASTLE_WQ) {
            out.push('Q');
        }
        if pos.has_castling(CASTLE_BK) {
            out.push('k');
        }
        if pos.has_castling(CASTLE_BQ) {
            out.push('q');
        }
    }

    out.push(' ');
    match pos.ep_square {
        Some(sq) => out.push_str(&sq.to_string()),
        None => out.push('-'),
    }

    out.push(' ');
    out.push_str(&pos.halfmove_clock.to_string());
    out.push(' ');
    out.push_str(&pos.fullmove_number.to_string());

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_round_trips() {
        let start = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        let pos = from_fen(start).unwrap();
        assert_eq!(to_fen(&pos), start);
    }

    #[test]
    fn matches_position_new() {
        let fen_pos = from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
        let fresh = Position::new();
        assert_eq!(fen_pos.occupancy, fresh.occupancy);
        assert_eq!(fen_pos.squares, fresh.squares);
        assert_eq!(fen_pos.zobrist, fresh.zobrist);
    }

    #[test]
    fn kiwipete_round_trips() {
        let kiwipete =
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let pos = from_fen(kiwipete).unwrap();
        assert_eq!(to_fen(&pos), kiwipete);
    }

    #[test]
    fn en_passant_square_parses() {
        let fen = "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3";
        let pos = from_fen(fen).unwrap();
        assert_eq!(pos.ep_square, Some(Square::from_san("d6").unwrap()));
    }

    #[test]
    fn rejects_bad_piece_count_rank() {
        let bad = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPP/RNBQKBNR w KQkq - 0 1";
        assert!(from_fen(bad).is_err());
    }
}
