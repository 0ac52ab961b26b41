use serde::{Serialize, Deserialize};

use crate::core::{Error, Result};

/// One band of the lead table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadBand {
    /// Upper bound of remaining time this band covers
    pub threshold_ms: u64,
    /// Estimated speech time for announcements spoken in this band
    pub lead_ms: u64,
}

/// Banded estimate of how long speaking an announcement takes
///
/// Given the current remaining time, yields the milliseconds by which the
/// speak instruction must precede the exact offset so that speech completion
/// coincides with it. Bands are finer near the end of the countdown, where
/// messages are short, and coarser far from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadTable {
    bands: Vec<LeadBand>,
}

impl LeadTable {
    /// Creates a lead table from bands ordered by ascending threshold
    pub fn new(bands: Vec<LeadBand>) -> Result<Self> {
        if bands.is_empty() {
            return Err(Error::config("lead table needs at least one band"));
        }
        if !bands.windows(2).all(|w| w[0].threshold_ms < w[1].threshold_ms) {
            return Err(Error::config("lead table thresholds must be strictly ascending"));
        }
        Ok(LeadTable { bands })
    }

    /// Estimated speech lead for the given remaining time
    ///
    /// Remaining times past the last threshold use the last band.
    pub fn lead_for(&self, remaining_ms: u64) -> u64 {
        self.bands
            .iter()
            .find(|b| remaining_ms <= b.threshold_ms)
            .or_else(|| self.bands.last())
            .map(|b| b.lead_ms)
            .unwrap_or(0)
    }
}

impl Default for LeadTable {
    fn default() -> Self {
        LeadTable {
            bands: vec![
                LeadBand { threshold_ms: 10_000, lead_ms: 300 },
                LeadBand { threshold_ms: 30_000, lead_ms: 600 },
                LeadBand { threshold_ms: 60_000, lead_ms: 900 },
                LeadBand { threshold_ms: 300_000, lead_ms: 1_200 },
                LeadBand { threshold_ms: u64::MAX, lead_ms: 1_500 },
            ],
        }
    }
}
