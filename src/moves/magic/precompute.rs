//! Builds the rook/bishop magic tables at process startup.
//!
//! Relevant-occupancy masks are the exact bit patterns from
//! `examples/original_source/attack_tables.py`'s `rook_masks`/`bishop_masks`.
//! Magic numbers are found by random search (see `magic::search`), then
//! every subset of each mask is enumerated via Carry-Rippler and the
//! resulting attack set stored at the magic-hashed index.

use super::attacks::{bishop_attacks_per_square, rook_attacks_per_square};
use super::search::find_magic_number_for_square;
use super::structs::{BishopMagicTables, MagicEntry, MagicTables, RookMagicTables};
use crate::bitboard::next_subset;
use rand::{RngCore, SeedableRng, rngs::StdRng};

#[rustfmt::skip]
pub const ROOK_MASKS: [u64; 64] = [
    0x101010101017e, 0x202020202027c, 0x404040404047a, 0x8080808080876,
    0x1010101010106e, 0x2020202020205e, 0x4040404040403e, 0x8080808080807e,
    0x1010101017e00, 0x2020202027c00, 0x4040404047a00, 0x8080808087600,
    0x10101010106e00, 0x20202020205e00, 0x40404040403e00, 0x80808080807e00,
    0x10101017e0100, 0x20202027c0200, 0x40404047a0400, 0x8080808760800,
    0x101010106e1000, 0x202020205e2000, 0x404040403e4000, 0x808080807e8000,
    0x101017e010100, 0x202027c020200, 0x404047a040400, 0x8080876080800,
    0x1010106e101000, 0x2020205e202000, 0x4040403e404000, 0x8080807e808000,
    0x1017e01010100, 0x2027c02020200, 0x4047a04040400, 0x8087608080800,
    0x10106e10101000, 0x20205e20202000, 0x40403e40404000, 0x80807e80808000,
    0x17e0101010100, 0x27c0202020200, 0x47a0404040400, 0x8760808080800,
    0x106e1010101000, 0x205e2020202000, 0x403e4040404000, 0x807e8080808000,
    0x7e010101010100, 0x7c020202020200, 0x7a040404040400, 0x76080808080800,
    0x6e101010101000, 0x5e202020202000, 0x3e404040404000, 0x7e808080808000,
    0x7e01010101010100, 0x7c02020202020200, 0x7a04040404040400, 0x7608080808080800,
    0x6e10101010101000, 0x5e20202020202000, 0x3e40404040404000, 0x7e80808080808000,
];

#[rustfmt::skip]
pub const BISHOP_MASKS: [u64; 64] = [
    0x40201008040200, 0x402010080400, 0x4020100a00, 0x40221400,
    0x2442800, 0x204085000, 0x20408102000, 0x2040810204000,
    0x20100804020000, 0x40201008040000, 0x4020100a0000, 0x4022140000,
    0x244280000, 0x20408500000, 0x2040810200000, 0x4081020400000,
    0x10080402000200, 0x20100804000400, 0x4020100a000a00, 0x402214001400,
    0x24428002800, 0x2040850005000, 0x4081020002000, 0x8102040004000,
    0x8040200020400, 0x10080400040800, 0x20100a000a1000, 0x40221400142200,
    0x2442800284400, 0x4085000500800, 0x8102000201000, 0x10204000402000,
    0x4020002040800, 0x8040004081000, 0x100a000a102000, 0x22140014224000,
    0x44280028440200, 0x8500050080400, 0x10200020100800, 0x20400040201000,
    0x2000204081000, 0x4000408102000, 0xa000a10204000, 0x14001422400000,
    0x28002844020000, 0x50005008040200, 0x20002010080400, 0x40004020100800,
    0x20408102000, 0x40810204000, 0xa1020400000, 0x142240000000,
    0x284402000000, 0x500804020000, 0x201008040200, 0x402010080400,
    0x2040810204000, 0x4081020400000, 0xa102040000000, 0x14224000000000,
    0x28440200000000, 0x50080402000000, 0x20100804020000, 0x40201008040200,
];

pub enum MagicTableSeed {
    Random,
    Fixed(u64),
}

fn rng_for(seed: MagicTableSeed) -> StdRng {
    match seed {
        MagicTableSeed::Fixed(s) => StdRng::seed_from_u64(s),
        MagicTableSeed::Random => {
            let mut bytes = [0u8; 32];
            rand::rng().fill_bytes(&mut bytes);
            StdRng::from_seed(bytes)
        }
    }
}

fn subsets_and_attacks(
    mask: u64,
    per_square: impl Fn(usize, u64) -> u64,
    square: usize,
) -> (Vec<u64>, Vec<u64>) {
    let mut blockers = Vec::new();
    let mut attacks = Vec::new();
    let mut subset = 0u64;
    loop {
        blockers.push(subset);
        attacks.push(per_square(square, subset));
        subset = next_subset(subset, mask);
        if subset == 0 {
            break;
        }
    }
    (blockers, attacks)
}

fn build_entry(
    square: usize,
    mask: u64,
    per_square: impl Fn(usize, u64) -> u64,
    rng: &mut StdRng,
) -> Result<MagicEntry, String> {
    let shift = 64 - mask.count_ones();
    let (blockers, attacks) = subsets_and_attacks(mask, &per_square, square);
    let magic = find_magic_number_for_square(&blockers, &attacks, shift, rng)?;

    let table_size = 1usize << mask.count_ones();
    let mut table = vec![0u64; table_size];
    for (&blocker, &attack) in blockers.iter().zip(attacks.iter()) {
        let index = ((blocker.wrapping_mul(magic)) >> shift) as usize;
        table[index] = attack;
    }

    Ok(MagicEntry {
        magic,
        shift,
        mask,
        table: table.into_boxed_slice(),
    })
}

pub fn generate_magic_tables(seed: MagicTableSeed) -> Result<MagicTables, String> {
    let mut rng = rng_for(seed);

    let mut rook_entries = Vec::with_capacity(64);
    for sq in 0..64 {
        rook_entries.push(build_entry(
            sq,
            ROOK_MASKS[sq],
            rook_attacks_per_square,
            &mut rng,
        )?);
    }

    let mut bishop_entries = Vec::with_capacity(64);
    for sq in 0..64 {
        bishop_entries.push(build_entry(
            sq,
            BISHOP_MASKS[sq],
            bishop_attacks_per_square,
            &mut rng,
        )?);
    }

    Ok(MagicTables {
        rook: RookMagicTables {
            entries: rook_entries,
        },
        bishop: BishopMagicTables {
            entries: bishop_entries,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tables_match_scan_for_every_square() {
        let tables = generate_magic_tables(MagicTableSeed::Fixed(0x45)).unwrap();
        for sq in 0..64 {
            let mut subset = 0u64;
            loop {
                let expected = rook_attacks_per_square(sq, subset);
                assert_eq!(tables.rook.get_attacks(sq, subset), expected);
                subset = next_subset(subset, ROOK_MASKS[sq]);
                if subset == 0 {
                    break;
                }
            }
        }
    }
}
