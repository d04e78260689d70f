use chrono::{DateTime, Utc};
use nevo_network::NetworkSnapshot;
use serde::{Deserialize, Serialize};

/// A trained network with metadata, as written by the `train` and `evolve`
/// commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    /// Model name/identifier
    pub name: String,
    /// Timestamp when training completed
    pub trained_at: DateTime<Utc>,
    /// Final cost for `train` runs, final fitness for `evolve` runs
    pub final_score: f64,
    /// The trained network
    pub snapshot: NetworkSnapshot,
}
