//! Principal-variation search (spec §4.F), ported from
//! `examples/original_source/search.py`'s `Search` class: iterative
//! deepening driving `pvs`, with null-move pruning, late-move reduction,
//! a transposition table, and quiescence at the leaves.

use crate::board::{Color, Piece, Position};
use crate::moves::execute::{gives_check, is_capture, make_move, make_null_move, undo_move, undo_null_move};
use crate::moves::magic::magic_tables;
use crate::moves::magic::structs::MagicTables;
use crate::moves::square_control::in_check;
use crate::moves::types::Move;
use crate::search::context::SearchContext;
use crate::search::eval::Evaluator;
use crate::search::ordering::{order_captures, order_evasions, order_moves};
use crate::search::see::see;
use crate::search::tt::{Bound, TranspositionTable};
use std::time::{Duration, Instant};
use tracing::{info, instrument};

pub const MATE: i32 = 100_000;
pub const DRAW: i32 = 0;
pub const INFINITY: i32 = 1_000_000;

const NULL_MOVE_REDUCTION: i32 = 2;
const LMR_MIN_MOVE_COUNT: usize = 3;
const LMR_REDUCTION: i32 = 1;

/// Search tuning knobs (spec's AMBIENT STACK configuration section). The
/// transposition table itself is fixed-size per spec.md §4.F; `tt_size_log2`
/// is carried for documentation parity with the teacher's config structs
/// and asserted against the table's actual size.
#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    pub max_depth: Option<u32>,
    pub time_limit: Option<Duration>,
    pub tt_size_log2: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { max_depth: None, time_limit: None, tt_size_log2: 16 }
    }
}

struct TimeBudget {
    start: Instant,
    limit: Option<Duration>,
}

impl TimeBudget {
    fn new(limit: Option<Duration>) -> Self {
        Self { start: Instant::now(), limit }
    }

    fn expired(&self) -> bool {
        match self.limit {
            Some(limit) => self.start.elapsed() >= limit,
            None => false,
        }
    }
}

/// Owns everything a search needs across iterations: the position under
/// search, the transposition table, and the killer/history ordering state.
pub struct Search {
    pub position: Position,
    tt: TranspositionTable,
    ctx: SearchContext,
    evaluator: Evaluator,
    tables: &'static MagicTables,
    node_count: u64,
    time: TimeBudget,
    stopped: bool,
}

impl Search {
    pub fn new(position: Position) -> Self {
        debug_assert_eq!(1u32 << SearchConfig::default().tt_size_log2, crate::search::tt::TT_SIZE as u32);
        Self {
            position,
            tt: TranspositionTable::new(),
            ctx: SearchContext::new(),
            evaluator: Evaluator::new(),
            tables: magic_tables(),
            node_count: 0,
            time: TimeBudget::new(None),
            stopped: false,
        }
    }

    fn check_time(&mut self) {
        if self.stopped {
            return;
        }
        if self.node_count & 1023 == 0 && self.time.expired() {
            self.stopped = true;
        }
    }

    fn is_endgame(&self) -> bool {
        let side = self.position.side_to_move;
        let non_king_non_pawn = self.position.occupancy_for(side)
            & !self.position.piece_bb(side, Piece::King)
            & !self.position.piece_bb(side, Piece::Pawn);
        non_king_non_pawn == 0
    }

    fn quiescence(&mut self, mut alpha: i32, beta: i32, ply: usize) -> i32 {
        self.node_count += 1;
        self.check_time();
        if self.stopped {
            return alpha;
        }

        if self.position.halfmove_clock >= 100 {
            return DRAW;
        }

        let in_check_now = in_check(&self.position, self.position.side_to_move, self.tables);

        let (moves, mut best_score) = if in_check_now {
            (order_evasions(&mut self.position, self.tables, None), -INFINITY)
        } else {
            let stand_pat = self.evaluator.evaluate(&self.position);
            if stand_pat >= beta {
                return stand_pat;
            }
            if stand_pat > alpha {
                alpha = stand_pat;
            }
            (order_captures(&mut self.position, self.tables), stand_pat)
        };

        let mut move_count = 0usize;
        for mv in moves {
            if !in_check_now && see(&self.position, mv.from(), mv.to()) < 0 {
                continue;
            }
            move_count += 1;

            make_move(&mut self.position, mv);
            let score = if move_count == 1 {
                -self.quiescence(-beta, -alpha, ply + 1)
            } else {
                let mut score = -self.quiescence(-alpha - 1, -alpha, ply + 1);
                if alpha < score && score < beta {
                    score = -self.quiescence(-beta, -alpha, ply + 1);
                }
                score
            };
            undo_move(&mut self.position);

            if score > best_score {
                if score > alpha {
                    if score >= beta {
                        return score;
                    }
                    alpha = score;
                }
                best_score = score;
            }
        }

        if in_check_now && move_count == 0 {
            return -MATE - ply as i32;
        }
        best_score
    }

    #[allow(clippy::too_many_arguments)]
    fn pvs(&mut self, mut alpha: i32, beta: i32, mut depth: i32, ply: usize, last_was_null: bool) -> i32 {
        self.node_count += 1;
        self.check_time();
        if self.stopped {
            return alpha;
        }

        let is_pv_node = beta - alpha != 1;

        self.ctx.clear_ply(ply + 1);

        if ply > 0 && self.position.repetition_count() >= 2 {
            return DRAW;
        }
        if self.position.halfmove_clock >= 100 {
            return DRAW;
        }

        let zobrist = self.position.zobrist;
        let (hash_move, cutoff) = self.tt.probe(zobrist, depth, alpha, beta);
        if let Some(score) = cutoff
            && ply > 0
        {
            return score;
        }

        if depth <= 0 {
            return self.quiescence(alpha, beta, ply);
        }

        let in_check_now = in_check(&self.position, self.position.side_to_move, self.tables);
        let endgame = self.is_endgame();

        if !in_check_now && !endgame && !is_pv_node && !last_was_null {
            let undo = make_null_move(&mut self.position);
            let null_score = -self.pvs(-beta, -beta + 1, depth - NULL_MOVE_REDUCTION - 1, ply + 1, true);
            undo_null_move(&mut self.position, undo);

            if self.stopped {
                return alpha;
            }
            if null_score >= beta {
                return null_score;
            }
            if null_score <= -MATE {
                depth += 1;
            }
        }

        let side = self.position.side_to_move.index();
        let moves = if in_check_now {
            order_evasions(&mut self.position, self.tables, hash_move)
        } else {
            let killers = self.ctx.killer_moves.get(ply).copied().unwrap_or([None, None]);
            order_moves(&mut self.position, self.tables, hash_move, killers, &self.ctx.history[side])
        };

        let mut best_score = -INFINITY;
        let mut best_move = None;
        let original_alpha = alpha;
        let mut move_count = 0usize;

        for mv in moves {
            move_count += 1;
            let capture = is_capture(&self.position, mv);

            make_move(&mut self.position, mv);

            let score = if move_count == 1 {
                -self.pvs(-beta, -alpha, depth - 1, ply + 1, false)
            } else {
                let reduce = move_count > LMR_MIN_MOVE_COUNT
                    && !in_check_now
                    && !capture
                    && !mv.is_promotion()
                    && !mv.is_castling()
                    && !endgame
                    && !gives_check(&self.position, mv, self.tables);

                let mut score = if reduce {
                    -self.pvs(-alpha - 1, -alpha, depth - LMR_REDUCTION - 1, ply + 1, false)
                } else {
                    alpha + 1
                };

                if score > alpha {
                    score = -self.pvs(-alpha - 1, -alpha, depth - 1, ply + 1, false);
                    if alpha < score && score < beta {
                        score = -self.pvs(-beta, -alpha, depth - 1, ply + 1, false);
                    }
                }
                score
            };

            undo_move(&mut self.position);

            if self.stopped {
                return alpha;
            }

            if score > best_score {
                if score > alpha {
                    if score >= beta {
                        if !capture && !mv.is_promotion() {
                            self.ctx.update_killer(ply, mv);
                            self.ctx.update_history(self.position.side_to_move, mv, depth);
                        }
                        self.tt.store(zobrist, Some(mv), depth, score, Bound::Lower);
                        return score;
                    }
                    alpha = score;
                    best_move = Some(mv);
                }
                best_score = score;
            }
        }

        if move_count == 0 {
            return if in_check_now { -MATE - depth } else { DRAW };
        }

        let bound = if best_score <= original_alpha { Bound::Upper } else { Bound::Exact };
        self.tt.store(zobrist, best_move, depth, best_score, bound);
        best_score
    }

    /// Iterative deepening driver (spec §6 `Search.iter_search`). Restores
    /// the root position and returns the last fully completed iteration's
    /// best move if the time budget runs out mid-iteration.
    #[instrument(skip(self), fields(max_depth, time_limit_ms = time_limit.map(|d| d.as_millis())))]
    pub fn iter_search(&mut self, max_depth: Option<u32>, time_limit: Option<Duration>) -> Move {
        self.node_count = 0;
        self.time = TimeBudget::new(time_limit);
        self.stopped = false;
        self.ctx.clear_killers();

        let max_depth = max_depth.unwrap_or(u32::MAX);
        let mut best_move = None;
        let mut best_score = 0;

        let mut depth = 0u32;
        while depth < max_depth && !self.time.expired() {
            depth += 1;
            let snapshot = self.position.clone();

            self.ctx.decay_history();
            let score = self.pvs(-INFINITY, INFINITY, depth as i32, 0, false);

            if self.stopped {
                self.position = snapshot;
                break;
            }

            let (tt_move, _) = self.tt.probe(self.position.zobrist, depth as i32, -INFINITY, INFINITY);
            let Some(mv) = tt_move else {
                self.position = snapshot;
                break;
            };

            best_move = Some(mv);
            best_score = score;
            info!(depth, score, nodes = self.node_count, elapsed_ms = self.time.start.elapsed().as_millis(), pv = %mv, "completed iteration");

            if score.abs() >= MATE - 1000 {
                break;
            }
        }

        best_move.unwrap_or_else(|| panic!("iter_search found no legal move; caller must check is_game_over first (score {best_score})"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn finds_mate_in_one() {
        let pos = Position::from_str("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
        let mut search = Search::new(pos);
        let mv = search.iter_search(Some(3), None);
        assert_eq!(mv.from(), crate::square::Square::from_san("a1").unwrap());
        assert_eq!(mv.to(), crate::square::Square::from_san("a8").unwrap());
    }

    #[test]
    fn avoids_hanging_a_queen() {
        let pos = Position::from_str("4k3/8/8/8/4q3/8/4Q3/4K3 w - - 0 1").unwrap();
        let mut search = Search::new(pos);
        let mv = search.iter_search(Some(2), None);
        assert_ne!((mv.from(), mv.to()), (crate::square::Square::from_san("e2").unwrap(), crate::square::Square::from_san("e4").unwrap()));
    }

    #[test]
    fn quiescence_resolves_hanging_capture() {
        let pos = Position::from_str("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let mut search = Search::new(pos);
        let score = search.quiescence(-INFINITY, INFINITY, 0);
        assert!(score > 0);
    }

    #[test]
    fn stalemate_scores_as_draw() {
        let pos = Position::from_str("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let mut search = Search::new(pos);
        let score = search.pvs(-INFINITY, INFINITY, 1, 0, false);
        assert_eq!(score, DRAW);
    }
}
