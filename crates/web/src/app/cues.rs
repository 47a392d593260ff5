//! Audio cues played by the browser.
//!
//! Each cue is a short sheet of sine tones. The server only decides which
//! cue to play; the sheet is sent as JSON and synthesized by `static/app.js`.

use serde::Serialize;
use serde_json::{Value, json};

/// Starting gain of every tone.
pub const TONE_GAIN: f64 = 0.1;

/// Gain each tone decays to by the end of its duration.
pub const TONE_FLOOR: f64 = 0.001;

/// One tone: frequency in Hz, start offset and duration in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tone {
    pub frequency: f64,
    pub start: f64,
    pub duration: f64,
}

const fn tone(frequency: f64, start: f64, duration: f64) -> Tone {
    Tone {
        frequency,
        start,
        duration,
    }
}

// C5 E5 G5 C6, rising.
const ENROLL: [Tone; 4] = [
    tone(523.25, 0.0, 0.2),
    tone(659.25, 0.15, 0.2),
    tone(783.99, 0.30, 0.2),
    tone(1046.50, 0.45, 0.4),
];

// A5 A6.
const MESSAGE: [Tone; 2] = [tone(880.0, 0.0, 0.1), tone(1760.0, 0.1, 0.3)];

// G5 E5 C5, falling.
const UNENROLL: [Tone; 3] = [
    tone(783.99, 0.0, 0.2),
    tone(659.25, 0.15, 0.2),
    tone(523.25, 0.30, 0.4),
];

/// A named audio cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cue {
    Enroll,
    Message,
    Unenroll,
}

impl Cue {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Enroll => "enroll",
            Self::Message => "message",
            Self::Unenroll => "unenroll",
        }
    }

    /// The tone sheet for this cue.
    #[must_use]
    pub const fn tones(self) -> &'static [Tone] {
        match self {
            Self::Enroll => &ENROLL,
            Self::Message => &MESSAGE,
            Self::Unenroll => &UNENROLL,
        }
    }

    /// Payload understood by the page script.
    #[must_use]
    pub fn payload(self) -> Value {
        json!({
            "cue": self.name(),
            "gain": TONE_GAIN,
            "floor": TONE_FLOOR,
            "tones": self.tones(),
        })
    }

    #[must_use]
    pub fn to_json(self) -> String {
        self.payload().to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_enroll_rises_and_unenroll_falls() {
        let rising = Cue::Enroll.tones();
        assert!(rising.windows(2).all(|w| w[0].frequency < w[1].frequency));

        let falling = Cue::Unenroll.tones();
        assert!(falling.windows(2).all(|w| w[0].frequency > w[1].frequency));
    }

    #[test]
    fn test_message_cue_is_two_octave_a() {
        let tones = Cue::Message.tones();
        assert_eq!(tones.len(), 2);
        assert!((tones[1].frequency - tones[0].frequency * 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_to_json_carries_sheet() {
        let payload: Value = serde_json::from_str(&Cue::Enroll.to_json()).unwrap();
        assert_eq!(payload["cue"], "enroll");
        assert_eq!(payload["tones"].as_array().unwrap().len(), 4);
        assert_eq!(payload["tones"][3]["frequency"], 1046.5);
        assert_eq!(payload["gain"], 0.1);
    }
}
