//! Encoder speed presets.
//!
//! The table maps the labels shown to users ("Very Fast", "Medium", ...) to the
//! x264 `-preset` values. Slower presets spend more time for better quality at
//! the same bitrate.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EncoderPreset {
    UltraFast,
    SuperFast,
    VeryFast,
    Faster,
    Fast,
    #[default]
    Medium,
    Slow,
    Slower,
    VerySlow,
}

/// Label to preset, in speed order.
pub static PRESET_TABLE: &[(&str, EncoderPreset)] = &[
    ("Ultra Fast", EncoderPreset::UltraFast),
    ("Super Fast", EncoderPreset::SuperFast),
    ("Very Fast", EncoderPreset::VeryFast),
    ("Faster", EncoderPreset::Faster),
    ("Fast", EncoderPreset::Fast),
    ("Medium", EncoderPreset::Medium),
    ("Slow", EncoderPreset::Slow),
    ("Slower", EncoderPreset::Slower),
    ("Very Slow", EncoderPreset::VerySlow),
];

impl EncoderPreset {
    /// Value passed to `ffmpeg -preset`.
    pub fn as_ffmpeg(&self) -> &'static str {
        match self {
            EncoderPreset::UltraFast => "ultrafast",
            EncoderPreset::SuperFast => "superfast",
            EncoderPreset::VeryFast => "veryfast",
            EncoderPreset::Faster => "faster",
            EncoderPreset::Fast => "fast",
            EncoderPreset::Medium => "medium",
            EncoderPreset::Slow => "slow",
            EncoderPreset::Slower => "slower",
            EncoderPreset::VerySlow => "veryslow",
        }
    }

    pub fn label(&self) -> &'static str {
        PRESET_TABLE
            .iter()
            .find(|(_, preset)| preset == self)
            .map(|(label, _)| *label)
            .unwrap_or("Medium")
    }

    /// Looks up a preset by its display label, falling back to `Medium`.
    ///
    /// Also accepts the ffmpeg spelling (`veryslow`) and ignores case and
    /// surrounding whitespace, so CLI input and UI labels both resolve.
    pub fn lookup(name: &str) -> EncoderPreset {
        name.parse().unwrap_or_else(|_| {
            tracing::debug!(preset = name, "unrecognized preset, using medium");
            EncoderPreset::Medium
        })
    }
}

impl fmt::Display for EncoderPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for EncoderPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        let squashed: String = wanted
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();

        PRESET_TABLE
            .iter()
            .find(|(label, preset)| {
                label.eq_ignore_ascii_case(wanted) || preset.as_ffmpeg() == squashed
            })
            .map(|(_, preset)| *preset)
            .ok_or_else(|| format!("unknown preset: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_covers_every_preset_once() {
        assert_eq!(PRESET_TABLE.len(), 9);
        for (label, preset) in PRESET_TABLE {
            assert_eq!(EncoderPreset::lookup(label), *preset);
            assert_eq!(preset.label(), *label);
        }
    }

    #[test]
    fn test_lookup_maps_labels_to_ffmpeg_names() {
        assert_eq!(EncoderPreset::lookup("Ultra Fast").as_ffmpeg(), "ultrafast");
        assert_eq!(EncoderPreset::lookup("Very Slow").as_ffmpeg(), "veryslow");
        assert_eq!(EncoderPreset::lookup("Medium").as_ffmpeg(), "medium");
    }

    #[test]
    fn test_lookup_accepts_ffmpeg_spelling() {
        assert_eq!(EncoderPreset::lookup("veryfast"), EncoderPreset::VeryFast);
        assert_eq!(EncoderPreset::lookup("very-slow"), EncoderPreset::VerySlow);
        assert_eq!(EncoderPreset::lookup("  slow "), EncoderPreset::Slow);
    }

    #[test]
    fn test_unknown_preset_falls_back_to_medium() {
        assert_eq!(EncoderPreset::lookup("Warp Speed"), EncoderPreset::Medium);
        assert_eq!(EncoderPreset::lookup(""), EncoderPreset::Medium);
        assert!("Warp Speed".parse::<EncoderPreset>().is_err());
    }
}
