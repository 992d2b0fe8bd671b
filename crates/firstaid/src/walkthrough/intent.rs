//! Parsing of typed commands during a guide.

/// What the user asked for on one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Continue to the next step.
    Next,
    /// Go back one step.
    Back,
    /// Choose a question option by its 1-based number.
    Answer(usize),
    /// Read the current step aloud again.
    Repeat,
    /// Turn voice guidance on or off.
    ToggleVoice,
    /// Call the emergency number now.
    Call,
    /// Leave the guide.
    Quit,
    /// Show the available commands.
    Help,
    /// Anything else, lowercased. May still be an option id.
    Unknown(String),
}

impl Intent {
    /// Parse a trimmed input line. An empty line means "next".
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let word = input.trim().to_ascii_lowercase();
        match word.as_str() {
            "" | "n" | "next" => Self::Next,
            "b" | "back" => Self::Back,
            "r" | "repeat" => Self::Repeat,
            "v" | "voice" => Self::ToggleVoice,
            "c" | "call" => Self::Call,
            "q" | "quit" | "exit" => Self::Quit,
            "h" | "help" | "?" => Self::Help,
            _ => match word.parse::<usize>() {
                Ok(n) if n > 0 => Self::Answer(n),
                _ => Self::Unknown(word),
            },
        }
    }
}
