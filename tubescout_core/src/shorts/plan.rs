//! Describes how to cut and transform one Short. Nothing here runs ffmpeg.

use super::effects::Effect;
use super::timestamp::format_timestamp;
use super::window::WINDOW_SECS;
use serde::{Deserialize, Serialize};

pub const TARGET_WIDTH: u32 = 1080;
pub const TARGET_HEIGHT: u32 = 1920;

const BLUR_STRENGTH: u32 = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipPlan {
    pub video_id: String,
    pub start_time: u64,
    /// Clamped to `1..=60` seconds.
    pub duration: u64,
    pub effects: Vec<Effect>,
    pub width: u32,
    pub height: u32,
}

impl ClipPlan {
    pub fn new(
        video_id: impl Into<String>,
        start_time: u64,
        duration: u64,
        effects: Vec<Effect>,
    ) -> Self {
        ClipPlan {
            video_id: video_id.into(),
            start_time,
            duration: duration.clamp(1, WINDOW_SECS),
            effects,
            width: TARGET_WIDTH,
            height: TARGET_HEIGHT,
        }
    }

    pub fn source_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }

    pub fn label(&self) -> String {
        format!(
            "{} - {}",
            format_timestamp(self.start_time),
            format_timestamp(self.start_time.saturating_add(self.duration))
        )
    }

    fn fit_filter(&self) -> String {
        format!(
            "scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:-1:-1",
            w = self.width,
            h = self.height
        )
    }

    fn effect_filter(&self, effect: Effect) -> Option<String> {
        match effect {
            Effect::Speedup => Some("setpts=0.5*PTS".to_string()),
            Effect::Slowdown => Some("setpts=2*PTS".to_string()),
            Effect::Fade => Some(format!(
                "fade=in:0:30,fade=out:st={}:d=1",
                self.duration.saturating_sub(1)
            )),
            Effect::Mirror => Some("hflip".to_string()),
            Effect::BlurBackground => None,
        }
    }

    fn wants_blur(&self) -> bool {
        self.effects.contains(&Effect::BlurBackground)
    }

    /// Simple per-frame filters, in effect order.
    ///
    /// Without a blurred background the list starts with the scale/pad step
    /// that letterboxes the source into the vertical frame.
    pub fn video_filters(&self) -> Vec<String> {
        let mut filters = Vec::new();
        if !self.wants_blur() {
            filters.push(self.fit_filter());
        }
        filters.extend(self.effects.iter().filter_map(|e| self.effect_filter(*e)));
        filters
    }

    /// The split/blur/overlay graph, present only with [`Effect::BlurBackground`].
    /// Remaining filters are chained onto the overlay output, labelled `[v]`.
    pub fn filter_complex(&self) -> Option<String> {
        if !self.wants_blur() {
            return None;
        }
        let (w, h) = (self.width, self.height);
        let mut overlay = "[blurred][scaled]overlay=(W-w)/2:(H-h)/2".to_string();
        for filter in self.video_filters() {
            overlay.push(',');
            overlay.push_str(&filter);
        }
        overlay.push_str("[v]");

        Some(
            [
                "[0:v]split[original][blur]".to_string(),
                format!(
                    "[blur]scale={w}:{h},boxblur={b}:{b}[blurred]",
                    b = BLUR_STRENGTH
                ),
                format!("[original]scale={w}:{h}:force_original_aspect_ratio=decrease[scaled]"),
                overlay,
            ]
            .join(";"),
        )
    }

    /// Argument vector for `ffmpeg`, excluding the program name.
    pub fn to_ffmpeg_args(&self, input: &str, output: &str) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "-ss".into(),
            self.start_time.to_string(),
            "-i".into(),
            input.to_string(),
            "-t".into(),
            self.duration.to_string(),
        ];

        match self.filter_complex() {
            Some(graph) => {
                args.extend([
                    "-filter_complex".into(),
                    graph,
                    "-map".into(),
                    "[v]".into(),
                    "-map".into(),
                    "0:a?".into(),
                ]);
            }
            None => {
                args.extend(["-vf".into(), self.video_filters().join(",")]);
            }
        }

        args.extend(
            [
                "-c:v", "libx264", "-c:a", "aac", "-movflags", "+faststart", "-f", "mp4",
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        args.push(output.to_string());
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_is_clamped_to_a_short() {
        assert_eq!(ClipPlan::new("abc", 0, 600, vec![]).duration, 60);
        assert_eq!(ClipPlan::new("abc", 0, 0, vec![]).duration, 1);
        assert_eq!(ClipPlan::new("abc", 0, 45, vec![]).duration, 45);
    }

    #[test]
    fn simple_effects_become_a_vf_chain() {
        let plan = ClipPlan::new("abc", 90, 30, vec![Effect::Speedup, Effect::Fade]);
        assert!(plan.filter_complex().is_none());
        assert_eq!(
            plan.video_filters(),
            vec![
                "scale=1080:1920:force_original_aspect_ratio=decrease,pad=1080:1920:-1:-1"
                    .to_string(),
                "setpts=0.5*PTS".to_string(),
                "fade=in:0:30,fade=out:st=29:d=1".to_string(),
            ]
        );

        let args = plan.to_ffmpeg_args("in.mp4", "out.mp4");
        assert_eq!(&args[..6], &["-ss", "90", "-i", "in.mp4", "-t", "30"]);
        let vf = args.iter().position(|a| a == "-vf").unwrap();
        assert!(args[vf + 1].ends_with("fade=out:st=29:d=1"));
        assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
    }

    #[test]
    fn blur_background_uses_a_filter_graph() {
        let plan = ClipPlan::new("abc", 0, 60, vec![Effect::Slowdown, Effect::BlurBackground]);
        let graph = plan.filter_complex().unwrap();
        assert!(graph.starts_with("[0:v]split[original][blur];"));
        assert!(graph.contains("boxblur=20:20"));
        assert!(graph.ends_with("overlay=(W-w)/2:(H-h)/2,setpts=2*PTS[v]"));

        let args = plan.to_ffmpeg_args("in.mp4", "out.mp4");
        assert!(!args.iter().any(|a| a == "-vf"));
        assert!(args.windows(2).any(|w| w[0] == "-map" && w[1] == "[v]"));
    }

    #[test]
    fn mirror_is_hflip() {
        let plan = ClipPlan::new("abc", 0, 10, vec![Effect::Mirror]);
        assert_eq!(plan.video_filters().last().map(String::as_str), Some("hflip"));
        assert_eq!(plan.label(), "0:00 - 0:10");
    }
}
