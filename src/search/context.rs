//! Per-search mutable ordering state (spec §4.F move ordering): killer
//! moves (two slots per ply) and the history heuristic, indexed by colour
//! the way `search.py`'s `self.history[colour][from][to]` is.

use crate::board::Color;
use crate::moves::types::Move;

const MAX_PLY: usize = 50;

pub struct SearchContext {
    pub killer_moves: Vec<[Option<Move>; 2]>,
    pub history: [[[i32; 64]; 64]; 2],
}

impl Default for SearchContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchContext {
    pub fn new() -> Self {
        Self { killer_moves: vec![[None; 2]; MAX_PLY], history: [[[0; 64]; 64]; 2] }
    }

    pub fn clear_killers(&mut self) {
        for slot in &mut self.killer_moves {
            *slot = [None, None];
        }
    }

    pub fn clear_ply(&mut self, ply: usize) {
        if let Some(slot) = self.killer_moves.get_mut(ply) {
            *slot = [None, None];
        }
    }

    pub fn update_killer(&mut self, ply: usize, mv: Move) {
        let Some(slot) = self.killer_moves.get_mut(ply) else { return };
        if slot[0] != Some(mv) {
            slot[1] = slot[0];
            slot[0] = Some(mv);
        }
    }

    pub fn update_history(&mut self, colour: Color, mv: Move, depth: i32) {
        self.history[colour.index()][mv.from().index() as usize][mv.to().index() as usize] += depth * depth;
    }

    /// Age existing history scores down between iterative-deepening
    /// iterations, matching the teacher's `/= 8` decay between depths.
    pub fn decay_history(&mut self) {
        for colour in &mut self.history {
            for from in colour.iter_mut() {
                for entry in from.iter_mut() {
                    *entry /= 8;
                }
            }
        }
    }
}
