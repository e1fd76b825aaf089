//! Exact move-count enumeration from the starting position (spec §8).

use chesscore::board::Position;
use chesscore::logger::init_logging;
use chesscore::moves::magic::magic_tables;
use chesscore::moves::perft::perft;

#[test]
fn starting_position_perft_1_through_5() {
    init_logging("logs/perft_tests.log", "chesscore=info");
    let mut pos = Position::new();
    let tables = magic_tables();

    assert_eq!(perft(&mut pos, tables, 1), 20);
    assert_eq!(perft(&mut pos, tables, 2), 400);
    assert_eq!(perft(&mut pos, tables, 3), 8_902);
    assert_eq!(perft(&mut pos, tables, 4), 197_281);
    assert_eq!(perft(&mut pos, tables, 5), 4_865_609);
}

#[test]
fn kiwipete_perft_1_through_3() {
    let mut pos: Position = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
        .parse()
        .unwrap();
    let tables = magic_tables();

    assert_eq!(perft(&mut pos, tables, 1), 48);
    assert_eq!(perft(&mut pos, tables, 2), 2_039);
    assert_eq!(perft(&mut pos, tables, 3), 97_862);
}
