/// Ordered catch rewards: one entry per successful catch, with the last
/// entry repeating once the table is exhausted.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreTable {
    values: Vec<i64>,
}

impl ScoreTable {
    /// Builds a table from configured values. An empty slice degenerates to
    /// a single zero entry so lookups stay total.
    pub fn new(values: &[i64]) -> Self {
        let values = if values.is_empty() {
            vec![0]
        } else {
            values.to_vec()
        };
        Self { values }
    }

    /// Reward for the catch made at `progress` (0-based count of prior
    /// successes). Indexes past the end clamp to the final value.
    pub fn value_at(&self, progress: u32) -> i64 {
        let idx = (progress as usize).min(self.values.len() - 1);
        self.values[idx]
    }

}

/// Selects the prize tier for a final progress value against ascending
/// thresholds: the highest threshold met wins (1-based tier index), `None`
/// when even the first threshold is missed.
pub fn select_tier(thresholds: &[u32], progress: u32) -> Option<usize> {
    thresholds
        .iter()
        .rposition(|&t| t <= progress)
        .map(|idx| idx + 1)
}
