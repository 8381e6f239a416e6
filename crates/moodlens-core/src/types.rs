use serde::{Deserialize, Serialize};

/// Emotion categories the expression net distinguishes.
///
/// [`EmotionLabel::ALL`] fixes the model output order; score decoding and
/// tie-breaking both depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Happy,
    Sad,
    Angry,
    Surprised,
    Neutral,
}

impl EmotionLabel {
    /// The five classes in model output order.
    pub const ALL: [EmotionLabel; 5] = [
        EmotionLabel::Happy,
        EmotionLabel::Sad,
        EmotionLabel::Angry,
        EmotionLabel::Surprised,
        EmotionLabel::Neutral,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EmotionLabel::Happy => "happy",
            EmotionLabel::Sad => "sad",
            EmotionLabel::Angry => "angry",
            EmotionLabel::Surprised => "surprised",
            EmotionLabel::Neutral => "neutral",
        }
    }

    /// Parse a lowercase label string. Anything outside the fixed set maps
    /// to `Neutral`.
    pub fn parse(s: &str) -> EmotionLabel {
        match s {
            "happy" => EmotionLabel::Happy,
            "sad" => EmotionLabel::Sad,
            "angry" => EmotionLabel::Angry,
            "surprised" => EmotionLabel::Surprised,
            _ => EmotionLabel::Neutral,
        }
    }
}

impl Default for EmotionLabel {
    fn default() -> Self {
        EmotionLabel::Neutral
    }
}

impl std::fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-label confidence scores for one classified frame.
///
/// Transient: produced per sample, consumed for its dominant label, dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpressionScores {
    values: Vec<(EmotionLabel, f32)>,
}

impl ExpressionScores {
    pub fn new(values: Vec<(EmotionLabel, f32)>) -> Self {
        Self { values }
    }

    /// Build from a score slice in model output order.
    pub fn from_model_order(scores: &[f32]) -> Self {
        Self {
            values: EmotionLabel::ALL
                .iter()
                .copied()
                .zip(scores.iter().copied())
                .collect(),
        }
    }

    /// Confidence for one label; 0.0 if absent.
    pub fn score(&self, label: EmotionLabel) -> f32 {
        self.values
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, s)| *s)
            .unwrap_or(0.0)
    }

    /// Label with the maximum score.
    ///
    /// Strict `>` comparison: when two labels share the maximum, the first
    /// in input order wins, so repeated calls over the same input are stable.
    pub fn dominant(&self) -> Option<EmotionLabel> {
        let mut best: Option<(EmotionLabel, f32)> = None;
        for &(label, score) in &self.values {
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((label, score)),
            }
        }
        best.map(|(label, _)| label)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EmotionLabel, f32)> + '_ {
        self.values.iter().copied()
    }
}
