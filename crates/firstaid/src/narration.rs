//! Spoken narration of guide steps.
//!
//! A [`Narrator`] turns text into speech without blocking the caller.
//! [`Narration`] adds the session-wide on/off switch and the configured
//! default voice on top of it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fully resolved voice settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    /// BCP 47 language tag (e.g. `en-US`).
    pub language: String,
    /// Pitch multiplier, 1.0 is the voice default.
    pub pitch: f32,
    /// Rate multiplier, 1.0 is the voice default.
    pub rate: f32,
}

impl Default for Voice {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            pitch: 1.0,
            // A little slower than normal for emergencies
            rate: 0.8,
        }
    }
}

/// Per-utterance overrides of the default voice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeechOptions {
    /// Language override.
    pub language: Option<String>,
    /// Pitch override.
    pub pitch: Option<f32>,
    /// Rate override.
    pub rate: Option<f32>,
}

impl SpeechOptions {
    /// Fill unset fields from `defaults`.
    #[must_use]
    pub fn resolve(&self, defaults: &Voice) -> Voice {
        Voice {
            language: self
                .language
                .clone()
                .unwrap_or_else(|| defaults.language.clone()),
            pitch: self.pitch.unwrap_or(defaults.pitch),
            rate: self.rate.unwrap_or(defaults.rate),
        }
    }
}

/// Platform capability for speaking text aloud.
///
/// Implementations must return immediately; speech finishes in the
/// background. A new utterance interrupts the one in progress.
pub trait Narrator: Send + Sync + std::fmt::Debug {
    /// Start speaking `text`.
    fn speak(&self, text: &str, voice: &Voice);

    /// Stop any speech in progress.
    fn stop(&self);
}

/// A narrator that never makes a sound.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNarrator;

impl Narrator for SilentNarrator {
    fn speak(&self, _text: &str, _voice: &Voice) {}

    fn stop(&self) {}
}

/// Narration for one process: a narrator, its default voice and the
/// user's on/off choice.
#[derive(Debug)]
pub struct Narration {
    narrator: Arc<dyn Narrator>,
    voice: Voice,
    enabled: AtomicBool,
}

impl Narration {
    /// Create narration with an initial enabled state.
    #[must_use]
    pub fn new(narrator: Arc<dyn Narrator>, voice: Voice, enabled: bool) -> Self {
        Self {
            narrator,
            voice,
            enabled: AtomicBool::new(enabled),
        }
    }

    /// Narration that is off and has no backend.
    #[must_use]
    pub fn silent() -> Self {
        Self::new(Arc::new(SilentNarrator), Voice::default(), false)
    }

    /// The default voice.
    #[must_use]
    pub fn voice(&self) -> &Voice {
        &self.voice
    }

    /// Whether narration is on.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Turn narration on or off. Turning it off silences any speech.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
        debug!(enabled, "Narration toggled");
        if !enabled {
            self.narrator.stop();
        }
    }

    /// Flip narration on or off, returning the new state.
    pub fn toggle(&self) -> bool {
        let enabled = !self.is_enabled();
        self.set_enabled(enabled);
        enabled
    }

    /// Speak with the default voice. Does nothing while narration is off.
    pub fn speak(&self, text: &str) {
        if self.is_enabled() {
            self.narrator.speak(text, &self.voice);
        }
    }

    /// Speak with some voice settings overridden.
    pub fn speak_with(&self, text: &str, options: &SpeechOptions) {
        if self.is_enabled() {
            self.narrator.speak(text, &options.resolve(&self.voice));
        }
    }

    /// Stop any speech in progress.
    pub fn stop(&self) {
        self.narrator.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingNarrator, Spoken};

    #[test]
    fn test_voice_default() {
        let voice = Voice::default();
        assert_eq!(voice.language, "en-US");
        assert!((voice.pitch - 1.0).abs() < f32::EPSILON);
        assert!((voice.rate - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_speech_options_resolve() {
        let defaults = Voice::default();
        let options = SpeechOptions {
            rate: Some(1.2),
            ..SpeechOptions::default()
        };
        let voice = options.resolve(&defaults);
        assert_eq!(voice.language, "en-US");
        assert!((voice.rate - 1.2).abs() < f32::EPSILON);
        assert!((voice.pitch - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_speak_when_enabled() {
        let narrator = Arc::new(RecordingNarrator::default());
        let narration = Narration::new(narrator.clone(), Voice::default(), true);

        narration.speak("Press firmly");
        assert_eq!(narrator.spoken(), vec!["Press firmly".to_string()]);
    }

    #[test]
    fn test_speak_when_disabled_is_dropped() {
        let narrator = Arc::new(RecordingNarrator::default());
        let narration = Narration::new(narrator.clone(), Voice::default(), false);

        narration.speak("Press firmly");
        narration.speak_with("Faster", &SpeechOptions::default());
        assert!(narrator.spoken().is_empty());
    }

    #[test]
    fn test_disabling_stops_speech() {
        let narrator = Arc::new(RecordingNarrator::default());
        let narration = Narration::new(narrator.clone(), Voice::default(), true);

        narration.speak("one");
        assert!(!narration.toggle());
        narration.speak("two");
        assert!(narration.toggle());
        narration.speak("three");

        assert_eq!(
            narrator.events(),
            vec![
                Spoken::Said("one".to_string()),
                Spoken::Stopped,
                Spoken::Said("three".to_string()),
            ]
        );
    }

    #[test]
    fn test_speak_with_overrides_voice() {
        let narrator = Arc::new(RecordingNarrator::default());
        let narration = Narration::new(narrator.clone(), Voice::default(), true);

        narration.speak_with(
            "Hola",
            &SpeechOptions {
                language: Some("es-ES".to_string()),
                ..SpeechOptions::default()
            },
        );
        assert_eq!(narrator.last_voice().unwrap().language, "es-ES");
    }

    #[test]
    fn test_silent_narration() {
        let narration = Narration::silent();
        assert!(!narration.is_enabled());
        narration.speak("nothing");
        narration.stop();
    }
}
