//! Fake collaborators for unit tests.

use std::sync::Mutex;

use crate::narration::{Narrator, Voice};
use crate::telephony::{Dialer, TelephonyError};

/// Something a [`RecordingNarrator`] was asked to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Spoken {
    Said(String),
    Stopped,
}

/// A narrator that remembers every request.
#[derive(Debug, Default)]
pub struct RecordingNarrator {
    events: Mutex<Vec<Spoken>>,
    voices: Mutex<Vec<Voice>>,
}

impl RecordingNarrator {
    pub fn events(&self) -> Vec<Spoken> {
        self.events.lock().unwrap().clone()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Spoken::Said(text) => Some(text),
                Spoken::Stopped => None,
            })
            .collect()
    }

    pub fn last_voice(&self) -> Option<Voice> {
        self.voices.lock().unwrap().last().cloned()
    }
}

impl Narrator for RecordingNarrator {
    fn speak(&self, text: &str, voice: &Voice) {
        self.events.lock().unwrap().push(Spoken::Said(text.to_string()));
        self.voices.lock().unwrap().push(voice.clone());
    }

    fn stop(&self) {
        self.events.lock().unwrap().push(Spoken::Stopped);
    }
}

/// A dialer that records numbers and always succeeds or always fails.
#[derive(Debug)]
pub struct ScriptedDialer {
    fail: bool,
    calls: Mutex<Vec<String>>,
}

impl ScriptedDialer {
    pub fn succeeding() -> Self {
        Self {
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Dialer for ScriptedDialer {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn dial(&self, number: &str) -> Result<(), TelephonyError> {
        self.calls.lock().unwrap().push(number.to_string());
        if self.fail {
            Err(TelephonyError::DialerFailed("no signal".to_string()))
        } else {
            Ok(())
        }
    }
}
