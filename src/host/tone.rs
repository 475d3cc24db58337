//! Tone synthesis for the open sound

use crate::error::{AlertError, AlertResult};
use crate::options::{Frequency, Sound, Waveform};
use regex::Regex;
use std::sync::OnceLock;

/// Gain the envelope decays towards; exponential ramps cannot reach zero
pub const SILENCE: f64 = 0.00001;

const NOTES: [&str; 12] = ["C", "C#", "D", "Eb", "E", "F", "F#", "G", "G#", "A", "Bb", "B"];

/// Chromatic frequencies in Hz, one row per note of `NOTES`, octaves 0 through 8
const FREQUENCIES: [[f64; 9]; 12] = [
    [16.35, 32.7, 65.41, 130.8, 261.6, 523.3, 1047.0, 2093.0, 4186.0],
    [17.32, 34.65, 69.3, 138.6, 277.2, 554.4, 1109.0, 2217.0, 4435.0],
    [18.35, 36.71, 73.42, 146.8, 293.7, 587.3, 1175.0, 2349.0, 4699.0],
    [19.45, 38.89, 77.78, 155.6, 311.1, 622.3, 1245.0, 2489.0, 4978.0],
    [20.6, 41.2, 82.41, 164.8, 329.6, 659.3, 1319.0, 2637.0, 5274.0],
    [21.83, 43.65, 87.31, 174.6, 349.2, 698.5, 1397.0, 2794.0, 5588.0],
    [23.12, 46.25, 92.5, 185.0, 370.0, 740.0, 1480.0, 2960.0, 5920.0],
    [24.5, 49.0, 98.0, 196.0, 392.0, 784.0, 1568.0, 3136.0, 6272.0],
    [25.96, 51.91, 103.8, 207.7, 415.3, 830.6, 1661.0, 3322.0, 6645.0],
    [27.5, 55.0, 110.0, 220.0, 440.0, 880.0, 1760.0, 3520.0, 7040.0],
    [29.14, 58.27, 116.5, 233.1, 466.2, 932.3, 1865.0, 3729.0, 7459.0],
    [30.87, 61.74, 123.5, 246.9, 493.9, 987.8, 1976.0, 3951.0, 7902.0],
];

fn note_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([A-Ga-g])([#b]?)([0-8])$").expect("valid note pattern"))
}

fn note_index(letter: char, accidental: &str) -> Option<usize> {
    let name = format!("{}{}", letter.to_ascii_uppercase(), accidental);
    let canonical = match name.as_str() {
        "D#" => "Eb",
        "A#" => "Bb",
        "Db" => "C#",
        "Gb" => "F#",
        "Ab" => "G#",
        other => other,
    };
    NOTES.iter().position(|note| *note == canonical)
}

/// Resolve a note name ("A4", "eb2") to Hz
pub fn note_frequency(note: &str) -> AlertResult<f64> {
    let unknown = || AlertError::UnknownNote(note.to_string());
    let captures = note_pattern().captures(note.trim()).ok_or_else(unknown)?;

    let letter = captures[1].chars().next().ok_or_else(unknown)?;
    let index = note_index(letter, &captures[2]).ok_or_else(unknown)?;
    let octave: usize = captures[3].parse().map_err(|_| unknown())?;

    Ok(FREQUENCIES[index][octave])
}

impl Frequency {
    pub fn resolve(&self) -> AlertResult<f64> {
        match self {
            Frequency::Hz(hz) if hz.is_finite() && *hz > 0.0 => Ok(*hz),
            Frequency::Hz(hz) => Err(AlertError::UnknownNote(hz.to_string())),
            Frequency::Note(note) => note_frequency(note),
        }
    }
}

/// A ready-to-play tone: fixed frequency, exponential fade from full gain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub waveform: Waveform,
    pub frequency: f64,
    /// Fade length in seconds
    pub duration: f64,
}

impl Tone {
    pub fn from_sound(sound: &Sound) -> AlertResult<Self> {
        Ok(Self {
            waveform: sound.waveform,
            frequency: sound.freq.resolve()?,
            duration: sound.duration.max(0.0),
        })
    }

    /// Gain `t` seconds after the start; reaches [`SILENCE`] at `duration`
    pub fn gain_at(&self, t: f64) -> f64 {
        if self.duration <= 0.0 || t >= self.duration {
            return SILENCE;
        }
        if t <= 0.0 {
            return 1.0;
        }
        SILENCE.powf(t / self.duration)
    }

    /// Oscillator output at `t` seconds, before the gain envelope
    pub fn oscillator_at(&self, t: f64) -> f64 {
        let phase = (t * self.frequency).fract();
        match self.waveform {
            Waveform::Sine => (2.0 * std::f64::consts::PI * phase).sin(),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * phase - 1.0,
            Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
        }
    }

    /// Enveloped sample at `t` seconds
    pub fn sample_at(&self, t: f64) -> f64 {
        self.oscillator_at(t) * self.gain_at(t)
    }
}

impl Sound {
    /// Same descriptor with the note replaced by its frequency
    pub fn resolved(&self) -> AlertResult<Sound> {
        Ok(Sound::hz(self.waveform, self.freq.resolve()?, self.duration))
    }
}

/// Audio output of the hosted window
pub trait AudioSink: Send + Sync {
    fn play(&self, tone: Tone);
}
