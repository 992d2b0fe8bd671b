//! Plain-text screens for the terminal walkthrough.

use std::fmt::Write;

use chrono::TimeDelta;

use crate::guide::Guide;
use crate::navigator::{NavigationError, Navigator};
use crate::registry::GuideRegistry;

const RULE: &str = "----------------------------------------";

/// Commands accepted while a guide is shown.
pub const HELP: &str = "\
Commands:
  n, Enter   next step
  b          previous step
  1, 2, ...  choose an option (or type the option id)
  r          repeat the current step aloud
  v          turn voice guidance on or off
  c          call the emergency number
  q          leave this guide
  h, ?       show this help";

/// Format an elapsed time as `mm:ss`. Negative spans show as `00:00`.
#[must_use]
pub fn format_elapsed(elapsed: TimeDelta) -> String {
    let seconds = elapsed.num_seconds().max(0);
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// The full screen for the navigator's current step.
#[must_use]
pub fn step_screen(
    navigator: &Navigator<'_>,
    elapsed: TimeDelta,
    voice_on: bool,
    emergency_number: &str,
) -> String {
    let step = navigator.current_step();
    let mut out = String::new();

    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(
        out,
        "{}  |  {}  |  {}",
        navigator.guide().title,
        navigator.progress(),
        format_elapsed(elapsed)
    );
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "{}", step.title);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", step.instruction);

    if let Some(image) = &step.image {
        let _ = writeln!(out);
        let _ = writeln!(out, "[Image: {image}]");
    }

    if step.is_question() {
        let _ = writeln!(out);
        for (index, option) in step.question_options.iter().enumerate() {
            let _ = writeln!(out, "  {}) {}", index + 1, option.text);
        }
    }

    let _ = writeln!(out);
    out.push_str(&controls(navigator, voice_on, emergency_number));
    out
}

/// The control bar for the current step.
#[must_use]
pub fn controls(navigator: &Navigator<'_>, voice_on: bool, emergency_number: &str) -> String {
    let step = navigator.current_step();
    let mut parts = Vec::new();

    if step.is_question() {
        parts.push(format!("[1-{}] answer", step.question_options.len()));
    } else {
        parts.push("[n] next".to_string());
    }
    if navigator.can_go_back() {
        parts.push("[b] back".to_string());
    }
    parts.push("[r] repeat".to_string());
    parts.push(format!("[v] voice {}", if voice_on { "off" } else { "on" }));
    parts.push(format!("[c] call {emergency_number}"));
    parts.push("[q] quit".to_string());

    parts.join("  ")
}

/// Closing screen listing a guide's post-care instructions in order.
#[must_use]
pub fn post_care_screen(guide: &Guide) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Well done. You have completed the first aid steps.");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Aftercare:");
    for (index, instruction) in guide.post_care_instructions.iter().enumerate() {
        let _ = writeln!(out, "  {}. {instruction}", index + 1);
    }
    out
}

/// Numbered list of categories. Categories without a guide go straight to
/// the emergency call.
#[must_use]
pub fn category_menu(registry: &GuideRegistry) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "What is the emergency?");
    for (index, category) in registry.list_categories().iter().enumerate() {
        let marker = if registry.has_guide(&category.id) {
            ""
        } else {
            "  (call for help)"
        };
        let _ = writeln!(
            out,
            "  {}) {} - {}{marker}",
            index + 1,
            category.title,
            category.description
        );
    }
    out
}

/// Short hint for a request the navigator rejected.
#[must_use]
pub fn navigation_hint(err: &NavigationError) -> &'static str {
    match err {
        NavigationError::NoPreviousStep => "You are at the first step.",
        NavigationError::NotAQuestion { .. } => {
            "This step has no options. Press Enter to continue."
        }
        NavigationError::UnknownOption { .. } => "That is not one of the options.",
        NavigationError::NotInSequence { .. } | NavigationError::AwaitingAnswer { .. } => {
            "Please choose one of the options above."
        }
        NavigationError::StepNotFound { .. }
        | NavigationError::MalformedOption { .. }
        | NavigationError::EmptyGuide { .. } => "This guide cannot continue.",
    }
}
