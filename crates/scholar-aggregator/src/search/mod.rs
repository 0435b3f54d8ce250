//! Search orchestration: the [`Aggregator`] pipeline and per-client [`SearchSession`].

mod engine;
mod session;

pub use engine::{Aggregator, today};
pub use session::SearchSession;
