use super::Marker;
use std::collections::HashSet;

/// Marker count at which the density factor saturates.
pub const SATURATION_MARKERS: f64 = 5.0;
/// Number of marker kinds treated as full diversity.
pub const FULL_DIVERSITY_KINDS: f64 = 3.0;

/// The three inputs to a window's confidence, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceFactors {
    pub marker_count: f64,
    pub engagement_spread: f64,
    pub kind_diversity: f64,
}

impl ConfidenceFactors {
    pub fn from_markers(markers: &[Marker]) -> Self {
        if markers.is_empty() {
            return ConfidenceFactors {
                marker_count: 0.0,
                engagement_spread: 0.0,
                kind_diversity: 0.0,
            };
        }

        let marker_count = clamp_unit(markers.len() as f64 / SATURATION_MARKERS);

        let max = markers
            .iter()
            .map(|m| m.engagement)
            .fold(f64::NEG_INFINITY, f64::max);
        let min = markers
            .iter()
            .map(|m| m.engagement)
            .fold(f64::INFINITY, f64::min);
        // A window with no engagement at all has no spread to reward.
        let engagement_spread = if max > 0.0 {
            clamp_unit(1.0 - (max - min) / max)
        } else {
            0.0
        };

        let distinct: HashSet<_> = markers.iter().map(|m| &m.kind).collect();
        let kind_diversity = clamp_unit(distinct.len() as f64 / FULL_DIVERSITY_KINDS);

        ConfidenceFactors {
            marker_count,
            engagement_spread,
            kind_diversity,
        }
    }

    pub fn mean(&self) -> f64 {
        (self.marker_count + self.engagement_spread + self.kind_diversity) / 3.0
    }
}

/// Unweighted mean of density, engagement uniformity and kind diversity.
pub fn score_confidence(markers: &[Marker]) -> f64 {
    clamp_unit(ConfidenceFactors::from_markers(markers).mean())
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
