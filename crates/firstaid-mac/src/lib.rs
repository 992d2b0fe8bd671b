//! macOS speech and dialing backends for firstaid.
//!
//! Speech uses the built-in `say` command. Calls open a `tel:` link, which
//! macOS routes to FaceTime or a paired iPhone.

#![cfg(target_os = "macos")]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::process::Command;

/// Speech program.
pub const SPEECH_PROGRAM: &str = "say";

/// Program that opens `tel:` links.
pub const DIAL_PROGRAM: &str = "open";

/// `say` speaking rate at a rate multiplier of 1.0, in words per minute.
const BASE_WORDS_PER_MINUTE: f32 = 180.0;

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

/// Get the platform name.
#[must_use]
pub fn platform_name() -> &'static str {
    "macOS"
}

/// Build the command that speaks `request`.
///
/// `say` picks its voice from the system language and has no pitch control,
/// so only the rate is applied.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn speech_command(request: &SpeechRequest<'_>) -> Command {
    let words_per_minute = (BASE_WORDS_PER_MINUTE * request.rate).round().max(80.0) as u32;

    tracing::trace!(
        words_per_minute,
        language = request.language,
        "Building say command"
    );

    let mut command = Command::new(SPEECH_PROGRAM);
    command
        .arg("-r")
        .arg(words_per_minute.to_string())
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

#[cfg(test)]
mod tests {
    use super::*;

    fn args(command: &Command) -> Vec<String> {
        command
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_platform_name() {
        assert_eq!(platform_name(), "macOS");
    }

    #[test]
    fn test_speech_command() {
        let command = speech_command(&SpeechRequest {
            text: "Stay calm",
            language: "en-US",
            pitch: 1.0,
            rate: 0.8,
        });

        assert_eq!(command.get_program(), SPEECH_PROGRAM);
        assert_eq!(args(&command), vec!["-r", "144", "--", "Stay calm"]);
    }

    #[test]
    fn test_dial_command() {
        let command = dial_command("119");
        assert_eq!(command.get_program(), DIAL_PROGRAM);
        assert_eq!(args(&command), vec!["tel:119"]);
    }
}
