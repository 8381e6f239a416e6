//! Presentation profiles keyed by emotion.
//!
//! One TOML file per emotion under `contrib/themes/`, embedded at compile
//! time and parsed once into a static table. Lookup is total: a missing or
//! malformed entry resolves to the neutral profile, and a built-in default
//! backstops even that.

use moodlens_core::EmotionLabel;
use serde::Deserialize;
use std::sync::OnceLock;

const THEME_HAPPY: &str = include_str!("../../../contrib/themes/happy.toml");
const THEME_SAD: &str = include_str!("../../../contrib/themes/sad.toml");
const THEME_ANGRY: &str = include_str!("../../../contrib/themes/angry.toml");
const THEME_SURPRISED: &str = include_str!("../../../contrib/themes/surprised.toml");
const THEME_NEUTRAL: &str = include_str!("../../../contrib/themes/neutral.toml");

static PROFILE_TABLE: OnceLock<Vec<(EmotionLabel, PresentationProfile)>> = OnceLock::new();
static NEUTRAL_FALLBACK: OnceLock<PresentationProfile> = OnceLock::new();

/// Display attributes for one emotion. Immutable after table build.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PresentationProfile {
    pub heading: String,
    pub message: String,
    pub show_help: bool,
    pub text_scale: f32,
    pub suggestions: Vec<String>,
    pub palette: Palette,
}

/// Hex color strings ("#RRGGBB").
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Palette {
    pub primary: String,
    pub background: String,
    pub accent: String,
}

/// Top-level structure of one theme file.
#[derive(Debug, Deserialize)]
struct ThemeFile {
    emotion: EmotionLabel,
    profile: PresentationProfile,
}

fn table() -> &'static [(EmotionLabel, PresentationProfile)] {
    PROFILE_TABLE.get_or_init(|| {
        let mut table = Vec::new();
        for src in [
            THEME_HAPPY,
            THEME_SAD,
            THEME_ANGRY,
            THEME_SURPRISED,
            THEME_NEUTRAL,
        ] {
            match toml::from_str::<ThemeFile>(src) {
                Ok(t) => table.push((t.emotion, t.profile)),
                Err(e) => tracing::warn!(error = %e, "bad theme TOML, skipping"),
            }
        }
        table
    })
}

/// Built-in neutral profile, used when the embedded table has no entry.
fn neutral_fallback() -> &'static PresentationProfile {
    NEUTRAL_FALLBACK.get_or_init(|| PresentationProfile {
        heading: "How are you feeling?".into(),
        message: "Look at the camera and we'll take it from there.".into(),
        show_help: false,
        text_scale: 1.0,
        suggestions: Vec::new(),
        palette: Palette {
            primary: "#9AA5B1".into(),
            background: "#F5F7FA".into(),
            accent: "#616E7C".into(),
        },
    })
}

/// Resolve the profile for a label.
///
/// Total and O(n) over a five-entry table: an absent entry falls back to
/// the neutral entry, and an absent neutral entry falls back to the
/// built-in default.
pub fn profile_for(label: EmotionLabel) -> &'static PresentationProfile {
    let table = table();
    table
        .iter()
        .find(|(l, _)| *l == label)
        .or_else(|| table.iter().find(|(l, _)| *l == EmotionLabel::Neutral))
        .map(|(_, p)| p)
        .unwrap_or_else(neutral_fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_labels_resolve() {
        for label in EmotionLabel::ALL {
            let profile = profile_for(label);
            assert!(!profile.heading.is_empty(), "{label}: empty heading");
            assert!(profile.text_scale > 0.0);
        }
    }

    #[test]
    fn test_unknown_label_string_resolves_to_neutral_profile() {
        // The closed set is enforced at parse time; anything outside it
        // lands on Neutral and therefore on the neutral profile.
        let label = EmotionLabel::parse("bewildered");
        assert_eq!(label, EmotionLabel::Neutral);
        assert_eq!(profile_for(label), profile_for(EmotionLabel::Neutral));
    }

    #[test]
    fn test_angry_profile_shows_help() {
        let profile = profile_for(EmotionLabel::Angry);
        assert!(profile.show_help);
        assert!(!profile.suggestions.is_empty());
    }

    #[test]
    fn test_happy_profile_hides_help() {
        assert!(!profile_for(EmotionLabel::Happy).show_help);
    }

    #[test]
    fn test_palettes_are_hex() {
        for label in EmotionLabel::ALL {
            let palette = &profile_for(label).palette;
            for color in [&palette.primary, &palette.background, &palette.accent] {
                assert!(color.starts_with('#') && color.len() == 7, "bad color {color}");
            }
        }
    }

    #[test]
    fn test_theme_file_rejects_unknown_emotion() {
        let src = r##"
            emotion = "melancholy"

            [profile]
            heading = "x"
            message = "y"
            show_help = false
            text_scale = 1.0
            suggestions = []

            [profile.palette]
            primary = "#000000"
            background = "#FFFFFF"
            accent = "#808080"
        "##;
        assert!(toml::from_str::<ThemeFile>(src).is_err());
    }

    #[test]
    fn test_neutral_fallback_is_neutral_shaped() {
        let fallback = neutral_fallback();
        assert!(!fallback.show_help);
        assert!((fallback.text_scale - 1.0).abs() < 1e-6);
    }
}
