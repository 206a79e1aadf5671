use super::timestamp::extract_timestamp;
use super::{Marker, MarkerKind};
use tracing::debug;

/// Turn `(text, engagement)` items into comment markers, keeping input order.
///
/// Items without a timestamp have no place on the timeline and are dropped.
pub fn collect_markers<'a, I>(items: I) -> Vec<Marker>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut dropped = 0usize;
    let markers: Vec<Marker> = items
        .into_iter()
        .filter_map(|(text, engagement)| match extract_timestamp(text) {
            Some(time) => Some(Marker {
                time,
                kind: MarkerKind::Comment,
                engagement: sanitize_engagement(engagement),
            }),
            None => {
                dropped += 1;
                None
            }
        })
        .collect();

    debug!(kept = markers.len(), dropped, "Collected timestamp markers");
    markers
}

/// Engagement is a non-negative weight; anything else counts as 0.
pub fn sanitize_engagement(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_timestamped_items_in_order() {
        let markers = collect_markers(vec![
            ("5:00 best part", 4.0),
            ("first!", 50.0),
            ("0:00 intro", 1.0),
            ("1:10 lol", 2.0),
        ]);
        let times: Vec<u64> = markers.iter().map(|m| m.time).collect();
        assert_eq!(times, vec![300, 0, 70]);
        assert!(markers.iter().all(|m| m.kind == MarkerKind::Comment));
    }

    #[test]
    fn bad_engagement_becomes_zero() {
        let markers = collect_markers(vec![
            ("0:01", f64::NAN),
            ("0:02", -3.0),
            ("0:03", f64::INFINITY),
            ("0:04", 2.5),
        ]);
        let weights: Vec<f64> = markers.iter().map(|m| m.engagement).collect();
        assert_eq!(weights, vec![0.0, 0.0, 0.0, 2.5]);
    }

    #[test]
    fn no_items_no_markers() {
        assert!(collect_markers(Vec::<(&str, f64)>::new()).is_empty());
    }
}
