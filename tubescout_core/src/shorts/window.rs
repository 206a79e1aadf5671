use super::Marker;

/// Length of a Short, and of every candidate window.
pub const WINDOW_SECS: u64 = 60;

/// Markers falling in `[start_time, start_time + duration)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    pub start_time: u64,
    pub duration: u64,
    pub markers: Vec<Marker>,
    pub engagement: f64,
}

/// Build one window per marker, anchored at that marker's time.
///
/// Windows overlap and are not deduplicated: two markers at the same second
/// produce two identical windows. Since every anchor falls inside its own
/// window, no window is ever empty.
pub fn aggregate_windows(markers: &[Marker]) -> Vec<Window> {
    markers
        .iter()
        .map(|anchor| {
            let start_time = anchor.time;
            let members: Vec<Marker> = markers
                .iter()
                .filter(|m| m.time >= start_time && m.time - start_time < WINDOW_SECS)
                .cloned()
                .collect();
            let engagement: f64 = members.iter().map(|m| m.engagement).sum();

            Window {
                start_time,
                duration: WINDOW_SECS,
                markers: members,
                engagement,
            }
        })
        .collect()
}
