//! Zobrist keys: random 64-bit values drawn once at process startup.
//!
//! Grounded on `examples/original_source/consts.py`'s `ZOBRIST_BOARD` /
//! `ZOBRIST_CASTLING` / `ZOBRIST_ENPASSANT` / `ZOBRIST_COLOUR` generation,
//! adapted to the teacher's `OnceCell`-backed singleton style.

use once_cell::sync::OnceCell;
use rand::{RngCore, SeedableRng, rngs::StdRng};

#[cfg(feature = "deterministic_zobrist")]
const ZOBRIST_SEED: u64 = 0x9E37_79B9_AAAC_5C87;

fn make_zobrist_rng() -> StdRng {
    #[cfg(feature = "deterministic_zobrist")]
    {
        StdRng::seed_from_u64(ZOBRIST_SEED)
    }
    #[cfg(not(feature = "deterministic_zobrist"))]
    {
        let mut seed = [0u8; 32];
        rand::rng().fill_bytes(&mut seed);
        StdRng::from_seed(seed)
    }
}

pub struct ZobristKeys {
    /// Indexed by encoded piece (0..15, NONE row unused) and square (0..63).
    pub board: [[u64; 64]; 15],
    /// Indexed by en-passant file, 0..7.
    pub ep_file: [u64; 8],
    /// Indexed by the 4-bit castling_rights word, 0..15. Individual bits get
    /// their own random key; every multi-bit combination is the XOR-fold of
    /// its set bits' individual keys, precomputed once so a rights change
    /// can be applied with a single `table[old] ^ table[new]` lookup.
    pub castling: [u64; 16],
    pub side_to_move: u64,
}

#[inline]
fn non_zero(rng: &mut StdRng) -> u64 {
    loop {
        let v = rng.next_u64();
        if v != 0 {
            return v;
        }
    }
}

fn generate_zobrist_keys_with_rng(mut rng: StdRng) -> ZobristKeys {
    let mut board = [[0u64; 64]; 15];
    // Pieces are encoded as (color<<3)|piece_type: white 1..6, black 9..14.
    for piece in (1..7).chain(9..15) {
        for sq in 0..64 {
            board[piece][sq] = non_zero(&mut rng);
        }
    }

    let mut ep_file = [0u64; 8];
    for f in ep_file.iter_mut() {
        *f = non_zero(&mut rng);
    }

    let mut castling = [0u64; 16];
    for right in [1u8, 2, 4, 8] {
        castling[right as usize] = non_zero(&mut rng);
    }
    for combo in 1u8..16 {
        if combo.count_ones() < 2 {
            continue;
        }
        let mut folded = 0u64;
        for bit in [1u8, 2, 4, 8] {
            if combo & bit != 0 {
                folded ^= castling[bit as usize];
            }
        }
        castling[combo as usize] = folded;
    }

    let side_to_move = non_zero(&mut rng);

    ZobristKeys {
        board,
        ep_file,
        castling,
        side_to_move,
    }
}

pub fn zobrist_keys() -> &'static ZobristKeys {
    static KEYS: OnceCell<ZobristKeys> = OnceCell::new();
    KEYS.get_or_init(|| generate_zobrist_keys_with_rng(make_zobrist_rng()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn castling_fold_matches_manual_xor() {
        let keys = zobrist_keys();
        let manual = keys.castling[1] ^ keys.castling[2] ^ keys.castling[8];
        assert_eq!(keys.castling[1 | 2 | 8], manual);
    }

    #[test]
    fn no_zero_keys() {
        let keys = zobrist_keys();
        for piece in (1..7).chain(9..15) {
            for sq in 0..64 {
                assert_ne!(keys.board[piece][sq], 0);
            }
        }
        assert!(keys.ep_file.iter().all(|&k| k != 0));
        assert!(keys.side_to_move != 0);
    }
}
