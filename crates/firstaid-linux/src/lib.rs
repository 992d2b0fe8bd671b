//! Linux speech and dialing backends for firstaid.
//!
//! Speech goes through `espeak-ng`; calls are handed to whatever handles
//! `tel:` links via `xdg-open`. Both are built as [`Command`]s so the caller
//! decides how to spawn and supervise them.

#![cfg(target_os = "linux")]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::process::Command;

/// Speech program.
pub const SPEECH_PROGRAM: &str = "espeak-ng";

/// Program that opens `tel:` links.
pub const DIAL_PROGRAM: &str = "xdg-open";

/// espeak-ng speaking rate at a rate multiplier of 1.0, in words per minute.
const BASE_WORDS_PER_MINUTE: f32 = 175.0;

/// espeak-ng pitch at a pitch multiplier of 1.0, on its 0-99 scale.
const BASE_PITCH: f32 = 50.0;

/// One utterance to speak.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeechRequest<'a> {
    /// Text to speak.
    pub text: &'a str,
    /// BCP 47 language tag.
    pub language: &'a str,
    /// Pitch multiplier.
    pub pitch: f32,
    /// Rate multiplier.
    pub rate: f32,
}

/// Get platform name
#[must_use]
pub fn platform_name() -> &'static str {
    "Linux"
}

/// Build the command that speaks `request`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn speech_command(request: &SpeechRequest<'_>) -> Command {
    let words_per_minute = (BASE_WORDS_PER_MINUTE * request.rate).round().max(80.0) as u32;
    let pitch = (BASE_PITCH * request.pitch).round().clamp(0.0, 99.0) as u32;

    tracing::trace!(words_per_minute, pitch, "Building espeak-ng command");

    let mut command = Command::new(SPEECH_PROGRAM);
    command
        .arg("-v")
        .arg(request.language.to_ascii_lowercase())
        .arg("-s")
        .arg(words_per_minute.to_string())
        .arg("-p")
        .arg(pitch.to_string())
        .arg("--")
        .arg(request.text);
    command
}

/// Build the command that hands `number` to the system dialer.
#[must_use]
pub fn dial_command(number: &str) -> Command {
    let mut command = Command::new(DIAL_PROGRAM);
    command.arg(format!("tel:{number}"));
    command
}
