//! Transform engine: the staging-to-star transformation rules
//!
//! Five independent set-based rules populate the dimension and fact tables
//! from staging data. The rules are pure SQL emitters; execution happens in
//! the warehouse via the sequencer.

mod rules;
mod time;

pub use rules::TransformRule;
pub use time::TimeParts;
