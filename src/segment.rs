//! Search for the alignment window kept for the downstream profile model.
//!
//! A window qualifies when its share of lowly conserved columns (many
//! distinct residues) lies within the diversity bounds; among qualifying
//! windows the one with the most lowly plus highly conserved (`:`) columns
//! wins, later windows winning ties.

use crate::alignment::{AlignmentMatrix, MARKINGS_LABEL, NUM_UNIQUE_LABEL};
use crate::error::{ReportError, Result};
use log::debug;
use msa_protocol::OptimalSegment;

pub const HIGHLY_CONSERVED_MARK: &str = ":";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentParams {
    pub window_size: usize,
    /// Columns with at least this many distinct residues are lowly conserved.
    pub diversity_min_aa: usize,
    pub diversity_lower_fraction: f64,
    pub diversity_upper_fraction: f64,
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self {
            window_size: 100,
            diversity_min_aa: 5,
            diversity_lower_fraction: 0.10,
            diversity_upper_fraction: 0.15,
        }
    }
}

impl SegmentParams {
    fn bounds(&self) -> (f64, f64) {
        let w = self.window_size as f64;
        (self.diversity_lower_fraction * w, self.diversity_upper_fraction * w)
    }
}

fn parse_count(cell: &str) -> Result<usize> {
    let cell = cell.trim();
    cell.parse::<usize>()
        .or_else(|_| cell.parse::<f64>().map(|f| f as usize))
        .map_err(|_| ReportError::String(format!("Invalid unique residue count '{cell}'")))
}

/// Picks the best window from the `num_unique` and `markings` rows of `matrix`.
/// Without a qualifying window the first `window_size` columns are returned
/// with no conservation counts.
pub fn find_optimal_segment(matrix: &AlignmentMatrix, params: &SegmentParams) -> Result<OptimalSegment> {
    let num_unique: Vec<usize> = matrix
        .row(NUM_UNIQUE_LABEL)
        .ok_or_else(|| ReportError::String(format!("Alignment has no '{NUM_UNIQUE_LABEL}' row")))?
        .iter()
        .map(|cell| parse_count(cell))
        .collect::<Result<_>>()?;
    let markings = matrix
        .row(MARKINGS_LABEL)
        .ok_or_else(|| ReportError::String(format!("Alignment has no '{MARKINGS_LABEL}' row")))?;

    let window = params.window_size;
    let (lower, upper) = params.bounds();
    let mut best = OptimalSegment::new(0, window as i64);
    let mut max_desired = 0;

    let length = num_unique.len();
    if length < window {
        return Ok(best);
    }
    for start in 0..=(length - window) {
        let end = start + window;
        let lowly = num_unique[start..end]
            .iter()
            .filter(|&&n| n >= params.diversity_min_aa)
            .count();
        let highly = markings
            .get(start..end.min(markings.len()))
            .unwrap_or_default()
            .iter()
            .filter(|m| m.as_str() == HIGHLY_CONSERVED_MARK)
            .count();
        let desired = lowly + highly;
        let qualifies = lower <= lowly as f64 && lowly as f64 <= upper && desired >= max_desired;
        debug!(
            "window {start}: lowly={lowly} highly={highly}{}",
            if qualifies { " *" } else { "" }
        );
        if qualifies {
            max_desired = desired;
            best = OptimalSegment {
                start: start as i64,
                end: end as i64,
                num_lowly_conserved: Some(lowly),
                num_highly_conserved: Some(highly),
            };
        }
    }
    Ok(best)
}
