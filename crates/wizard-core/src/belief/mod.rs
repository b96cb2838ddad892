//! What a seat knows about a round, and turning that into full worlds.
//!
//! - `info_set`: the per-seat view (`InformationSet`) with legal queries and shown-out suits.
//! - `sampler`: the determinizer that deals unseen cards consistently with that view.

mod info_set;
mod sampler;

pub use info_set::InformationSet;
pub use sampler::{DEFAULT_SAMPLER_ATTEMPTS, Determinizer, SamplingStats};
