//! Pipeline components: shared context, executor, and the three signing stages.

pub mod combine;
pub mod context;
pub mod executor;
pub mod multi_hash;
pub mod single_hash;

pub use combine::Combine;
pub use context::StageContext;
pub use executor::{Stage, execute_pipeline};
pub use multi_hash::MultiHash;
pub use single_hash::SingleHash;

/// Inter-stage channel capacity. Stages drain continuously, so the cap only
/// bounds in-flight memory; 1024 is far above any exercise-scale seed. The
/// final channel carries a single combined string.
pub const STAGE_CHANNEL_CAP: usize = 1_024;
