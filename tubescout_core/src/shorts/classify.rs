use super::{Marker, MarkerKind};

/// The most frequent marker kind in a window.
///
/// Counting follows first-appearance order, and on a tie the kind that
/// appeared first wins. An empty slice classifies as [`MarkerKind::Comment`].
pub fn classify_segment(markers: &[Marker]) -> MarkerKind {
    let mut counts: Vec<(&MarkerKind, usize)> = Vec::new();
    for marker in markers {
        match counts.iter_mut().find(|(kind, _)| *kind == &marker.kind) {
            Some((_, count)) => *count += 1,
            None => counts.push((&marker.kind, 1)),
        }
    }

    let mut best: Option<(&MarkerKind, usize)> = None;
    for (kind, count) in counts {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((kind, count));
        }
    }

    best.map(|(kind, _)| kind.clone()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(kind: MarkerKind) -> Marker {
        Marker {
            time: 0,
            kind,
            engagement: 1.0,
        }
    }

    #[test]
    fn majority_kind_wins() {
        let markers = vec![
            marker(MarkerKind::Action),
            marker(MarkerKind::Highlight),
            marker(MarkerKind::Highlight),
        ];
        assert_eq!(classify_segment(&markers), MarkerKind::Highlight);
    }

    #[test]
    fn ties_go_to_first_seen_kind() {
        let markers = vec![
            marker(MarkerKind::Transition),
            marker(MarkerKind::Action),
            marker(MarkerKind::Action),
            marker(MarkerKind::Transition),
        ];
        assert_eq!(classify_segment(&markers), MarkerKind::Transition);

        let markers = vec![marker(MarkerKind::Action), marker(MarkerKind::Transition)];
        assert_eq!(classify_segment(&markers), MarkerKind::Action);
    }

    #[test]
    fn single_kind_window() {
        let markers = vec![marker(MarkerKind::Comment), marker(MarkerKind::Comment)];
        assert_eq!(classify_segment(&markers), MarkerKind::Comment);
    }

    #[test]
    fn empty_window_defaults_to_comment() {
        assert_eq!(classify_segment(&[]), MarkerKind::Comment);
    }
}
