pub mod action_value;
pub mod config;
pub mod error;
pub mod logging;
pub mod match_metrics;
pub mod match_rating;
pub mod outcome;
pub mod pipeline;
pub mod role_weights;
pub mod season_rating;
pub mod sheet;
pub mod sqlite_store;
pub mod store;

pub use action_value::{Action, MistakeType, compute_cav};
pub use error::ModelError;
pub use match_metrics::{MatchMetrics, aggregate};
pub use match_rating::{MatchRatingInputs, Modifiers, compute_mpr};
pub use outcome::{StatRecord, resolve_outcome_multiplier};
pub use role_weights::{RoleWeightTable, RoleWeights};
pub use season_rating::{CsrMode, compute_csr};
