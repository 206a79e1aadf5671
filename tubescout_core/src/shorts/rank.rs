use super::markers::sanitize_engagement;
use super::Segment;

/// Order segments by descending engagement and keep the first `max_segments`.
///
/// The sort is stable, so equally engaging segments keep their input order.
/// Overlapping segments are all kept; see [`suppress_overlaps`]. Engagement
/// that is NaN or negative ranks as 0.
pub fn rank_segments(mut segments: Vec<Segment>, max_segments: usize) -> Vec<Segment> {
    segments.sort_by(|a, b| {
        sanitize_engagement(b.engagement).total_cmp(&sanitize_engagement(a.engagement))
    });
    segments.truncate(max_segments);
    segments
}

/// Walk ranked segments and drop any whose span intersects one already kept.
pub fn suppress_overlaps(ranked: Vec<Segment>) -> Vec<Segment> {
    let mut kept: Vec<Segment> = Vec::with_capacity(ranked.len());
    for segment in ranked {
        let overlaps = kept
            .iter()
            .any(|k| segment.start_time < k.end_time() && k.start_time < segment.end_time());
        if !overlaps {
            kept.push(segment);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shorts::{Marker, MarkerKind};

    fn segment(start_time: u64, engagement: f64) -> Segment {
        Segment {
            start_time,
            duration: 60,
            markers: vec![Marker {
                time: start_time,
                kind: MarkerKind::Comment,
                engagement,
            }],
            engagement,
            kind: MarkerKind::Comment,
            confidence: 0.5,
        }
    }

    fn starts(segments: &[Segment]) -> Vec<u64> {
        segments.iter().map(|s| s.start_time).collect()
    }

    #[test]
    fn sorts_descending_and_truncates() {
        let ranked = rank_segments(
            vec![segment(0, 1.0), segment(100, 9.0), segment(200, 4.0), segment(300, 6.0)],
            3,
        );
        assert_eq!(starts(&ranked), vec![100, 300, 200]);
        assert!(ranked
            .windows(2)
            .all(|pair| pair[0].engagement >= pair[1].engagement));
    }

    #[test]
    fn ties_keep_input_order() {
        let ranked = rank_segments(
            vec![segment(50, 2.0), segment(10, 2.0), segment(30, 5.0), segment(20, 2.0)],
            10,
        );
        assert_eq!(starts(&ranked), vec![30, 50, 10, 20]);
    }

    #[test]
    fn zero_limit_yields_nothing() {
        assert!(rank_segments(vec![segment(0, 1.0)], 0).is_empty());
    }

    #[test]
    fn limit_larger_than_input_keeps_everything() {
        assert_eq!(rank_segments(vec![segment(0, 1.0)], 3).len(), 1);
    }

    #[test]
    fn nan_engagement_ranks_as_zero() {
        let segments: Vec<Segment> = (0..200u64)
            .map(|i| {
                let engagement = if i % 7 == 0 { f64::NAN } else { (i % 13) as f64 };
                segment(i * 100, engagement)
            })
            .collect();
        let ranked = rank_segments(segments, usize::MAX);
        assert_eq!(ranked.len(), 200);

        let keys: Vec<f64> = ranked
            .iter()
            .map(|s| sanitize_engagement(s.engagement))
            .collect();
        assert!(keys.windows(2).all(|pair| pair[0] >= pair[1]));
        assert_eq!(ranked[0].engagement, 12.0);
    }

    #[test]
    fn overlapping_segments_are_dropped_after_the_first() {
        let ranked = vec![segment(10, 8.0), segment(300, 4.0), segment(40, 3.0), segment(70, 1.0)];
        let kept = suppress_overlaps(ranked);
        // 40 overlaps [10, 70); 70 touches it only at the exclusive end
        assert_eq!(starts(&kept), vec![10, 300, 70]);
    }
}
