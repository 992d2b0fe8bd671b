//! Line-oriented prompts over any async reader and writer.

use tokio::io::{
    self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout,
};
use tracing::warn;

use crate::error::Result;

/// A prompt that reads whole lines and writes plain text.
///
/// End of input is reported as `None` so callers can treat a closed
/// terminal like a quit. Bytes that are not UTF-8 never end a session: the
/// line is decoded lossily and reaches the caller as an unknown answer.
#[derive(Debug)]
pub struct Console<R, W> {
    input: R,
    out: W,
}

impl Console<BufReader<Stdin>, Stdout> {
    /// A console on the process's stdin and stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Create a console.
    pub fn new(input: R, out: W) -> Self {
        Self { input, out }
    }

    /// Write `text` followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    pub async fn say(&mut self, text: &str) -> Result<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.out.flush().await?;
        Ok(())
    }

    /// Read one trimmed line, or `None` at end of input.
    ///
    /// Invalid UTF-8 is replaced with `U+FFFD`, so a garbled line still
    /// comes back as text that matches no command.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read.
    pub async fn read_line(&mut self) -> Result<Option<String>> {
        let mut raw = Vec::new();
        if self.input.read_until(b'\n', &mut raw).await? == 0 {
            return Ok(None);
        }

        let line = match String::from_utf8(raw) {
            Ok(line) => line,
            Err(e) => {
                warn!(bytes = e.as_bytes().len(), "Input line is not valid UTF-8");
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };
        Ok(Some(line.trim().to_string()))
    }

    /// Print `prompt` without a newline and read the answer.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt cannot be written or the answer read.
    pub async fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        self.out.write_all(prompt.as_bytes()).await?;
        self.out.write_all(b" ").await?;
        self.out.flush().await?;
        self.read_line().await
    }

    /// Ask a yes/no question. Anything but `y`/`yes` is a no.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt cannot be written or the answer read.
    pub async fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let answer = self.ask(&format!("{prompt} [y/N]")).await?;
        Ok(answer.is_some_and(|a| matches!(a.to_ascii_lowercase().as_str(), "y" | "yes")))
    }

    /// The underlying writer.
    pub fn out(&mut self) -> &mut W {
        &mut self.out
    }

    /// Consume the console, returning the writer.
    pub fn into_output(self) -> W {
        self.out
    }
}
