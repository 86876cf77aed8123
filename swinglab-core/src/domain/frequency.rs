use serde::{Deserialize, Serialize};

/// Sampling interval of a bar series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarFrequency {
    Daily,
    Weekly,
    Monthly,
}

impl BarFrequency {
    /// Periods per year, used to annualize returns and the Sharpe ratio.
    pub fn periods_per_year(self) -> f64 {
        match self {
            BarFrequency::Daily => 252.0,
            BarFrequency::Weekly => 52.0,
            BarFrequency::Monthly => 12.0,
        }
    }
}
