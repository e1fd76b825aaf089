//! Named scenarios from spec §8.

use chesscore::board::Position;
use chesscore::moves::magic::magic_tables;
use chesscore::moves::movegen::{GenType, check_evasions, generate_pseudo_legal};
use chesscore::moves::execute::is_legal;
use chesscore::search::eval::Evaluator;
use chesscore::status::{GameStatus, is_insufficient_material, position_status};

#[test]
fn starting_position_has_twenty_legal_moves() {
    let mut pos = Position::new();
    let tables = magic_tables();
    let mut moves = Vec::new();
    generate_pseudo_legal(&pos, GenType::All, tables, &mut moves);
    assert_eq!(moves.len(), 20);
    assert!(moves.iter().all(|&mv| is_legal(&mut pos, mv, tables)));
}

#[test]
fn lone_pawn_gives_white_a_positive_material_evaluation() {
    let pos: Position = "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1".parse().unwrap();
    let mut evaluator = Evaluator::new();
    assert!(evaluator.evaluate(&pos) > 0);
}

#[test]
fn two_lone_kings_is_insufficient_material_and_game_over() {
    let mut pos: Position = "8/8/8/8/4k3/8/4K3/8 w - - 0 1".parse().unwrap();
    let tables = magic_tables();
    assert!(is_insufficient_material(&pos));
    assert_eq!(position_status(&mut pos, tables), GameStatus::DrawDeadPosition);
}

#[test]
fn both_sides_have_both_castling_rights_available() {
    let mut pos: Position = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".parse().unwrap();
    let tables = magic_tables();
    let mut moves = Vec::new();
    generate_pseudo_legal(&pos, GenType::All, tables, &mut moves);

    let kingside = chesscore::moves::types::Move::castling(
        chesscore::square::Square::from_san("e1").unwrap(),
        chesscore::square::Square::from_san("g1").unwrap(),
    );
    let queenside = chesscore::moves::types::Move::castling(
        chesscore::square::Square::from_san("e1").unwrap(),
        chesscore::square::Square::from_san("c1").unwrap(),
    );

    assert!(moves.contains(&kingside));
    assert!(moves.contains(&queenside));
    assert!(is_legal(&mut pos, kingside, tables));
    assert!(is_legal(&mut pos, queenside, tables));
}

#[test]
fn single_checker_evasions_are_all_legal() {
    // White king on e1 in check along the open e-file from a rook on e8;
    // every generated evasion (king steps off the file, or a block/capture
    // on the file) must itself be legal.
    let mut pos: Position = "4r3/8/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
    let tables = magic_tables();
    let mut evasions = Vec::new();
    check_evasions(&mut pos, tables, &mut evasions);

    assert!(!evasions.is_empty());
    for mv in &evasions {
        assert!(is_legal(&mut pos, *mv, tables));
    }
}
