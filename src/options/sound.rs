//! Sound descriptor played when the dialog opens

use serde::{Deserialize, Serialize};

/// Oscillator waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// Either a raw frequency in Hz or a note name with octave digit ("A4", "C#3")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Frequency {
    Hz(f64),
    Note(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sound {
    #[serde(rename = "type", default)]
    pub waveform: Waveform,

    pub freq: Frequency,

    /// Fade-out length in seconds
    pub duration: f64,
}

impl Sound {
    pub fn note(waveform: Waveform, note: impl Into<String>, duration: f64) -> Self {
        Self {
            waveform,
            freq: Frequency::Note(note.into()),
            duration,
        }
    }

    pub fn hz(waveform: Waveform, hz: f64, duration: f64) -> Self {
        Self {
            waveform,
            freq: Frequency::Hz(hz),
            duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_descriptor() {
        let sound: Sound = serde_json::from_value(json!({
            "type": "triangle", "freq": "F#2", "duration": 1.5
        }))
        .unwrap();
        assert_eq!(sound, Sound::note(Waveform::Triangle, "F#2", 1.5));

        let raw: Sound = serde_json::from_value(json!({ "freq": 300, "duration": 0.5 })).unwrap();
        assert_eq!(raw.waveform, Waveform::Sine);
        assert_eq!(raw.freq, Frequency::Hz(300.0));
    }
}
