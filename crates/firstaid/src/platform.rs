//! Speech and dialing backends for the current operating system.
//!
//! Both backends run an external program built by the platform crate
//! (`firstaid-linux` or `firstaid-mac`). On other systems narration is
//! silent and calls always fall back to manual dialing.

use std::process::{Child, Command as StdCommand, Stdio};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, warn};

use crate::narration::{Narrator, Voice};
use crate::telephony::{Dialer, TelephonyError};

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
use crate::narration::SilentNarrator;
#[cfg(not(any(target_os = "linux", target_os = "macos")))]
use crate::telephony::UnsupportedDialer;

#[cfg(target_os = "linux")]
use firstaid_linux as native;

#[cfg(target_os = "macos")]
use firstaid_mac as native;

/// Builds the command that speaks some text.
pub type SpeechCommandBuilder = fn(&str, &Voice) -> StdCommand;

/// Builds the command that dials a number.
pub type DialCommandBuilder = fn(&str) -> StdCommand;

/// Name of the operating system backends in use.
#[must_use]
pub fn platform_name() -> &'static str {
    #[cfg(any(target_os = "linux", target_os = "macos"))]
    {
        native::platform_name()
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        "unsupported"
    }
}

/// The narrator for this platform.
#[must_use]
pub fn default_narrator() -> Arc<dyn Narrator> {
    #[cfg(any(target_os = "linux", target_os = "macos"))]
    {
        Arc::new(SystemNarrator::new(native_speech_command))
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        Arc::new(SilentNarrator)
    }
}

/// The dialer for this platform.
#[must_use]
pub fn default_dialer(timeout: Duration) -> Arc<dyn Dialer> {
    #[cfg(any(target_os = "linux", target_os = "macos"))]
    {
        Arc::new(SystemDialer::new(native::dial_command, timeout))
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        let _ = timeout;
        Arc::new(UnsupportedDialer)
    }
}

#[cfg(any(target_os = "linux", target_os = "macos"))]
fn native_speech_command(text: &str, voice: &Voice) -> StdCommand {
    native::speech_command(&native::SpeechRequest {
        text,
        language: &voice.language,
        pitch: voice.pitch,
        rate: voice.rate,
    })
}

/// Speaks by running an external program, one utterance at a time.
#[derive(Debug)]
pub struct SystemNarrator {
    build: SpeechCommandBuilder,
    current: Mutex<Option<Child>>,
}

impl SystemNarrator {
    /// Create a narrator that runs the commands made by `build`.
    #[must_use]
    pub fn new(build: SpeechCommandBuilder) -> Self {
        Self {
            build,
            current: Mutex::new(None),
        }
    }

    /// Whether an utterance is still playing.
    #[must_use]
    pub fn is_speaking(&self) -> bool {
        let Ok(mut current) = self.current.lock() else {
            return false;
        };
        match current.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    fn interrupt(current: &mut Option<Child>) {
        if let Some(mut child) = current.take() {
            // The child may already have exited; either way reap it
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Narrator for SystemNarrator {
    fn speak(&self, text: &str, voice: &Voice) {
        let Ok(mut current) = self.current.lock() else {
            warn!("Narrator lock poisoned, skipping speech");
            return;
        };
        Self::interrupt(&mut current);

        let mut command = (self.build)(text, voice);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        match command.spawn() {
            Ok(child) => {
                debug!(pid = child.id(), chars = text.len(), "Speaking");
                *current = Some(child);
            }
            Err(e) => {
                warn!(
                    program = %command.get_program().to_string_lossy(),
                    error = %e,
                    "Failed to start speech"
                );
            }
        }
    }

    fn stop(&self) {
        if let Ok(mut current) = self.current.lock() {
            Self::interrupt(&mut current);
        }
    }
}

impl Drop for SystemNarrator {
    fn drop(&mut self) {
        if let Ok(current) = self.current.get_mut() {
            Self::interrupt(current);
        }
    }
}

/// Dials by running an external program that opens a `tel:` link.
#[derive(Debug, Clone)]
pub struct SystemDialer {
    build: DialCommandBuilder,
    timeout: Duration,
}

impl SystemDialer {
    /// Create a dialer that runs the commands made by `build` and waits at
    /// most `timeout` for them.
    #[must_use]
    pub fn new(build: DialCommandBuilder, timeout: Duration) -> Self {
        Self { build, timeout }
    }
}

#[async_trait::async_trait]
impl Dialer for SystemDialer {
    fn name(&self) -> &'static str {
        "system"
    }

    async fn dial(&self, number: &str) -> Result<(), TelephonyError> {
        let mut command = tokio::process::Command::from((self.build)(number));
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let program = command
            .as_std()
            .get_program()
            .to_string_lossy()
            .into_owned();
        debug!(%program, number, "Launching dialer");

        let status = match tokio::time::timeout(self.timeout, command.status()).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => return Err(TelephonyError::Launch(format!("{program}: {e}"))),
            Err(_) => return Err(TelephonyError::Timeout(self.timeout)),
        };

        if status.success() {
            Ok(())
        } else {
            Err(TelephonyError::DialerFailed(format!(
                "{program} exited with {status}"
            )))
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn run_true(_number: &str) -> StdCommand {
        StdCommand::new("true")
    }

    fn run_false(_number: &str) -> StdCommand {
        StdCommand::new("false")
    }

    fn run_missing(_number: &str) -> StdCommand {
        StdCommand::new("firstaid-no-such-dialer")
    }

    fn run_slow(_number: &str) -> StdCommand {
        let mut command = StdCommand::new("sleep");
        command.arg("5");
        command
    }

    fn speak_slowly(_text: &str, _voice: &Voice) -> StdCommand {
        let mut command = StdCommand::new("sleep");
        command.arg("5");
        command
    }

    fn speak_nowhere(_text: &str, _voice: &Voice) -> StdCommand {
        StdCommand::new("firstaid-no-such-voice")
    }

    #[test]
    fn test_platform_name_is_set() {
        assert!(!platform_name().is_empty());
    }

    #[tokio::test]
    async fn test_dialer_success() {
        let dialer = SystemDialer::new(run_true, Duration::from_secs(5));
        assert!(dialer.dial("110").await.is_ok());
    }

    #[tokio::test]
    async fn test_dialer_nonzero_exit() {
        let dialer = SystemDialer::new(run_false, Duration::from_secs(5));
        let err = dialer.dial("110").await.unwrap_err();
        assert!(matches!(err, TelephonyError::DialerFailed(_)));
    }

    #[tokio::test]
    async fn test_dialer_missing_program() {
        let dialer = SystemDialer::new(run_missing, Duration::from_secs(5));
        let err = dialer.dial("110").await.unwrap_err();
        assert!(matches!(err, TelephonyError::Launch(_)));
    }

    #[tokio::test]
    async fn test_dialer_timeout() {
        let dialer = SystemDialer::new(run_slow, Duration::from_millis(50));
        let err = dialer.dial("110").await.unwrap_err();
        assert_eq!(err, TelephonyError::Timeout(Duration::from_millis(50)));
    }

    #[test]
    fn test_narrator_interrupts_and_stops() {
        let narrator = SystemNarrator::new(speak_slowly);
        let voice = Voice::default();

        narrator.speak("first", &voice);
        assert!(narrator.is_speaking());
        narrator.speak("second", &voice);
        assert!(narrator.is_speaking());

        narrator.stop();
        assert!(!narrator.is_speaking());
    }

    #[test]
    fn test_narrator_missing_program_is_quiet() {
        let narrator = SystemNarrator::new(speak_nowhere);
        narrator.speak("hello", &Voice::default());
        assert!(!narrator.is_speaking());
    }
}
