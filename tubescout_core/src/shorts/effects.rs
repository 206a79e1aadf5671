use super::MarkerKind;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A post-processing step for an extracted clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Effect {
    Speedup,
    Slowdown,
    Fade,
    Mirror,
    BlurBackground,
}

impl Effect {
    pub const ALL: [Effect; 5] = [
        Effect::Speedup,
        Effect::Slowdown,
        Effect::Fade,
        Effect::Mirror,
        Effect::BlurBackground,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Effect::Speedup => "speedup",
            Effect::Slowdown => "slowdown",
            Effect::Fade => "fade",
            Effect::Mirror => "mirror",
            Effect::BlurBackground => "blur-background",
        }
    }
}

impl std::fmt::Display for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Effect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Effect::ALL
            .iter()
            .copied()
            .find(|effect| effect.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "Unknown effect '{}'. Expected one of: speedup, slowdown, fade, mirror, blur-background",
                    s
                )
            })
    }
}

/// Suggested when nothing more specific applies.
pub const DEFAULT_EFFECTS: &[Effect] = &[Effect::BlurBackground];

/// Effects that suit a segment of the given kind, in application order.
pub fn suggest_effects(kind: &MarkerKind) -> &'static [Effect] {
    match kind {
        MarkerKind::Action => &[Effect::Speedup, Effect::Fade],
        MarkerKind::Highlight => &[Effect::Slowdown, Effect::BlurBackground],
        MarkerKind::Transition => &[Effect::Fade],
        MarkerKind::Comment => &[Effect::BlurBackground],
        MarkerKind::Other(_) => DEFAULT_EFFECTS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_kinds_map_to_fixed_lists() {
        assert_eq!(
            suggest_effects(&MarkerKind::Action),
            &[Effect::Speedup, Effect::Fade]
        );
        assert_eq!(
            suggest_effects(&MarkerKind::Highlight),
            &[Effect::Slowdown, Effect::BlurBackground]
        );
        assert_eq!(suggest_effects(&MarkerKind::Transition), &[Effect::Fade]);
        assert_eq!(
            suggest_effects(&MarkerKind::Comment),
            &[Effect::BlurBackground]
        );
    }

    #[test]
    fn unknown_kinds_get_exactly_the_default() {
        for name in ["laugh", "", "ACTION", "blur-background"] {
            let kind = MarkerKind::Other(name.to_string());
            assert_eq!(suggest_effects(&kind), DEFAULT_EFFECTS);
        }
    }

    #[test]
    fn effect_names_parse_and_serialize() {
        assert_eq!("blur-background".parse::<Effect>(), Ok(Effect::BlurBackground));
        assert_eq!(" Speedup ".parse::<Effect>(), Ok(Effect::Speedup));
        assert!("sepia".parse::<Effect>().is_err());
        assert_eq!(
            serde_json::to_value(Effect::BlurBackground).unwrap(),
            serde_json::json!("blur-background")
        );
    }
}
