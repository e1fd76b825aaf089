//! Magic-bitboard sliding-piece attack tables (spec §4.A).

pub mod attacks;
pub mod precompute;
pub mod search;
pub mod structs;

pub use precompute::{MagicTableSeed, generate_magic_tables};
pub use structs::{BishopMagicTables, MagicEntry, MagicTables, RookMagicTables};

use once_cell::sync::OnceCell;

#[cfg(feature = "deterministic_magic")]
const MAGIC_SEED: u64 = 0x45;

/// The process-wide magic tables, generated once and shared by move
/// generation, SEE and the evaluator's mobility term.
pub fn magic_tables() -> &'static MagicTables {
    static TABLES: OnceCell<MagicTables> = OnceCell::new();
    TABLES.get_or_init(|| {
        #[cfg(feature = "deterministic_magic")]
        let seed = MagicTableSeed::Fixed(MAGIC_SEED);
        #[cfg(not(feature = "deterministic_magic"))]
        let seed = MagicTableSeed::Random;
        generate_magic_tables(seed).expect("magic number search should not exhaust its budget")
    })
}
