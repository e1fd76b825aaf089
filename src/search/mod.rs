pub mod context;
pub mod eval;
pub mod ordering;
pub mod search;
pub mod see;
pub mod tt;

pub use search::{Search, SearchConfig, DRAW, INFINITY, MATE};
