//! Terminal renderer.
//!
//! Observes [`UiState`](crate::state::UiState) snapshots and re-skins its
//! output from the resolved presentation profile: truecolor accents from
//! the palette, heading and message copy, and the suggestion list when the
//! profile asks for help to be shown.

use crate::state::UiState;
use crate::theme::profile_for;

/// Parse "#RRGGBB" into (r, g, b). Malformed input falls back to white.
fn hex_rgb(hex: &str) -> (u8, u8, u8) {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 {
        return (255, 255, 255);
    }
    match u32::from_str_radix(digits, 16) {
        Ok(v) => ((v >> 16) as u8, (v >> 8) as u8, v as u8),
        Err(_) => (255, 255, 255),
    }
}

/// Wrap text in an ANSI truecolor foreground escape.
fn paint(text: &str, hex: &str) -> String {
    let (r, g, b) = hex_rgb(hex);
    format!("\x1b[38;2;{r};{g};{b}m{text}\x1b[0m")
}

/// Render one state snapshot into terminal lines.
pub fn render_lines(state: &UiState) -> Vec<String> {
    let profile = profile_for(state.emotion);

    // No font sizes in a terminal; a scaled-up profile shouts instead.
    let heading = if profile.text_scale > 1.0 {
        profile.heading.to_uppercase()
    } else {
        profile.heading.clone()
    };

    let mut lines = vec![
        format!(
            "[{}] {}",
            state.status,
            paint(state.emotion.as_str(), &profile.palette.primary)
        ),
        paint(&heading, &profile.palette.accent),
        profile.message.clone(),
    ];

    if profile.show_help {
        for suggestion in &profile.suggestions {
            lines.push(format!("  - {suggestion}"));
        }
    }

    lines
}

/// Print a snapshot, preceded by a blank separator line.
pub fn draw(state: &UiState) {
    println!();
    for line in render_lines(state) {
        println!("{line}");
    }
}
