//! Interactive terminal walkthrough of a guide.
//!
//! The [`Assistant`] turns typed intents into navigator calls, renders each
//! step, narrates it and owns the side effects of flow outcomes. Whenever
//! guide data turns out to be broken, or no guide exists for the emergency,
//! the user is sent to the emergency call instead.

mod intent;
mod render;

use chrono::{DateTime, Utc};
use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::{debug, error, info};

pub use intent::Intent;
pub use render::{category_menu, format_elapsed, navigation_hint, post_care_screen, step_screen};

use crate::console::Console;
use crate::error::Result;
use crate::guide::{Category, Flow, Guide};
use crate::narration::Narration;
use crate::navigator::{NavigationError, Navigator, Transition};
use crate::registry::{GuideRegistry, Selection};
use crate::telephony::EmergencyLine;

const CONTINUE_PHRASE: &str = "Okay, let's continue.";

const MILD_CHOKING_ADVICE: [&str; 3] = [
    "Encourage the person to keep coughing.",
    "Do not slap their back or give abdominal thrusts while they can cough.",
    "If they stop coughing or cannot breathe, start over and follow the steps.",
];

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The guide was completed and the user chose to finish.
    Finished,
    /// The guide was completed and the user wants to pick another emergency.
    NewEmergency,
    /// The user left the guide, or input ended.
    Exited,
    /// Guide data was broken; the user was sent to the emergency call.
    Escalated,
    /// No guide exists for the emergency; the user was sent to the
    /// emergency call.
    Unavailable,
}

/// Guided first-aid sessions over a console.
#[derive(Debug)]
pub struct Assistant<'r> {
    registry: &'r GuideRegistry,
    narration: Narration,
    line: EmergencyLine,
}

impl<'r> Assistant<'r> {
    /// Create an assistant.
    #[must_use]
    pub fn new(registry: &'r GuideRegistry, narration: Narration, line: EmergencyLine) -> Self {
        Self {
            registry,
            narration,
            line,
        }
    }

    /// The narration switch shared by every session.
    #[must_use]
    pub fn narration(&self) -> &Narration {
        &self.narration
    }

    /// Run sessions until the user is done.
    ///
    /// Starts with `category` when given, otherwise with the category
    /// picker. Choosing "new emergency" at the end of a guide returns to the
    /// picker.
    ///
    /// # Errors
    ///
    /// Returns an error only if the console fails.
    pub async fn run<R, W>(
        &self,
        console: &mut Console<R, W>,
        category: Option<&str>,
    ) -> Result<SessionEnd>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut pending = category.map(str::to_string);
        loop {
            let category_id = match pending.take() {
                Some(id) => id,
                None => match self.pick_category(console).await? {
                    Some(id) => id,
                    None => return Ok(SessionEnd::Exited),
                },
            };

            let end = self.start_category(console, &category_id).await?;
            debug!(category = %category_id, ?end, "Session ended");
            if end != SessionEnd::NewEmergency {
                return Ok(end);
            }
        }
    }

    /// Show the category menu and read a choice by number or id.
    ///
    /// Returns `None` when the user quits or input ends.
    ///
    /// # Errors
    ///
    /// Returns an error only if the console fails.
    pub async fn pick_category<R, W>(&self, console: &mut Console<R, W>) -> Result<Option<String>>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let categories = self.registry.list_categories();
        console.say(&category_menu(self.registry)).await?;

        loop {
            let Some(answer) = console.ask("Choose an emergency (q to quit):").await? else {
                return Ok(None);
            };
            let answer = answer.to_ascii_lowercase();
            if matches!(answer.as_str(), "q" | "quit" | "exit") {
                return Ok(None);
            }

            let chosen = match answer.parse::<usize>() {
                Ok(n) if n > 0 => categories.get(n - 1),
                _ => categories.iter().find(|c| c.id == answer),
            };
            match chosen {
                Some(category) => return Ok(Some(category.id.clone())),
                None => {
                    console
                        .say(&format!("Please type a number from 1 to {}.", categories.len()))
                        .await?;
                }
            }
        }
    }

    /// Start the guide for a category, or fall back to the emergency call.
    ///
    /// # Errors
    ///
    /// Returns an error only if the console fails.
    pub async fn start_category<R, W>(
        &self,
        console: &mut Console<R, W>,
        category_id: &str,
    ) -> Result<SessionEnd>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        match self.registry.select(category_id) {
            Selection::Available { category, guide } => {
                info!(category = %category.id, guide = %guide.id, "Starting guide");
                match Navigator::new(guide) {
                    Ok(navigator) => self.run_guide(console, navigator).await,
                    Err(err) => self.escalate(console, &err).await,
                }
            }
            Selection::NotImplemented(category) => self.unavailable(console, Some(category)).await,
            Selection::UnknownCategory => {
                info!(category = category_id, "Unknown category selected");
                self.unavailable(console, None).await
            }
        }
    }

    /// Drive one navigator until the guide ends.
    ///
    /// # Errors
    ///
    /// Returns an error only if the console fails.
    pub async fn run_guide<R, W>(
        &self,
        console: &mut Console<R, W>,
        mut navigator: Navigator<'_>,
    ) -> Result<SessionEnd>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let started = Utc::now();
        self.show_step(console, &navigator, started).await?;

        loop {
            let Some(input) = console.ask(">").await? else {
                self.narration.stop();
                return Ok(SessionEnd::Exited);
            };

            let result = match Intent::parse(&input) {
                Intent::Next => navigator.advance(),
                Intent::Back => navigator.retreat(),
                Intent::Answer(number) => {
                    let step = navigator.current_step();
                    match step.question_options.get(number - 1) {
                        Some(option) => {
                            self.narration.speak(CONTINUE_PHRASE);
                            navigator.answer_question(&option.id)
                        }
                        None if step.is_question() => {
                            console.say("That is not one of the options.").await?;
                            continue;
                        }
                        None => Err(NavigationError::NotAQuestion {
                            step_id: step.id.clone(),
                        }),
                    }
                }
                Intent::Unknown(word) if navigator.current_step().option(&word).is_some() => {
                    self.narration.speak(CONTINUE_PHRASE);
                    navigator.answer_question(&word)
                }
                Intent::Repeat => {
                    self.narration.speak(&navigator.current_step().voice_text);
                    continue;
                }
                Intent::ToggleVoice => {
                    let enabled = self.narration.toggle();
                    console
                        .say(if enabled {
                            "Voice guidance on."
                        } else {
                            "Voice guidance off."
                        })
                        .await?;
                    if enabled {
                        self.narration.speak(&navigator.current_step().voice_text);
                    }
                    continue;
                }
                Intent::Call => {
                    self.offer_call(console).await?;
                    continue;
                }
                Intent::Quit => {
                    if console.confirm("Leave this guide?").await? {
                        self.narration.stop();
                        return Ok(SessionEnd::Exited);
                    }
                    continue;
                }
                Intent::Help => {
                    console.say(render::HELP).await?;
                    continue;
                }
                Intent::Unknown(_) => {
                    console.say("Unknown command. Type h for help.").await?;
                    continue;
                }
            };

            match result {
                Ok(Transition::Moved(_)) => self.show_step(console, &navigator, started).await?,
                Ok(Transition::Complete | Transition::Outcome(Flow::PostCare)) => {
                    return self.post_care(console, navigator.guide()).await;
                }
                Ok(Transition::Outcome(Flow::MildChoking)) => {
                    if let Some(end) = self.mild_choking(console).await? {
                        return Ok(end);
                    }
                    navigator.restart();
                    self.show_step(console, &navigator, started).await?;
                }
                Ok(Transition::Outcome(Flow::Unrecognized(tag))) => {
                    console
                        .say(&format!(
                            "This answer leads to '{tag}', which this assistant cannot show. \
                             Stay with the person and call {} if you are unsure.",
                            self.line.number()
                        ))
                        .await?;
                }
                Err(err) if err.is_data_integrity() => return self.escalate(console, &err).await,
                Err(err) => {
                    debug!(error = %err, "Navigation request rejected");
                    console.say(navigation_hint(&err)).await?;
                }
            }
        }
    }

    async fn show_step<R, W>(
        &self,
        console: &mut Console<R, W>,
        navigator: &Navigator<'_>,
        started: DateTime<Utc>,
    ) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let step = navigator.current_step();
        debug!(step = %step.id, history = navigator.history_len(), "Showing step");
        console
            .say(&step_screen(
                navigator,
                Utc::now() - started,
                self.narration.is_enabled(),
                self.line.number(),
            ))
            .await?;
        self.narration.speak(&step.voice_text);
        Ok(())
    }

    async fn post_care<R, W>(&self, console: &mut Console<R, W>, guide: &Guide) -> Result<SessionEnd>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!(guide = %guide.id, "Guide completed");
        self.narration.speak(
            "Well done. You have completed the first aid steps. Follow the aftercare instructions.",
        );
        console.say(&post_care_screen(guide)).await?;

        let answer = console
            .ask("[e] New emergency  [f] Finish:")
            .await?
            .unwrap_or_default()
            .to_ascii_lowercase();
        Ok(if matches!(answer.as_str(), "e" | "new") {
            SessionEnd::NewEmergency
        } else {
            SessionEnd::Finished
        })
    }

    /// Returns `None` when the user wants to start the guide over.
    async fn mild_choking<R, W>(&self, console: &mut Console<R, W>) -> Result<Option<SessionEnd>>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        self.narration
            .speak("Good. If the person can cough, encourage them to keep coughing.");
        console.say("The airway is only partly blocked.").await?;
        for advice in MILD_CHOKING_ADVICE {
            console.say(&format!("  - {advice}")).await?;
        }

        let answer = console
            .ask("[s] Start over  [f] Finish:")
            .await?
            .unwrap_or_default()
            .to_ascii_lowercase();
        Ok(if matches!(answer.as_str(), "s" | "start") {
            None
        } else {
            Some(SessionEnd::Finished)
        })
    }

    async fn escalate<R, W>(
        &self,
        console: &mut Console<R, W>,
        err: &NavigationError,
    ) -> Result<SessionEnd>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        error!(error = %err, "Guide data is broken, escalating to emergency call");
        let message = format!(
            "This guide cannot continue. Call the emergency number {} now.",
            self.line.number()
        );
        self.narration.speak(&message);
        console.say(&message).await?;
        self.offer_call(console).await?;
        Ok(SessionEnd::Escalated)
    }

    async fn unavailable<R, W>(
        &self,
        console: &mut Console<R, W>,
        category: Option<&Category>,
    ) -> Result<SessionEnd>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let subject = category.map_or("this emergency", |c| c.title.as_str());
        let message = format!(
            "There is no guide for {subject} yet. Call the emergency number {} now.",
            self.line.number()
        );
        self.narration.speak(&message);
        console.say(&message).await?;
        self.offer_call(console).await?;
        Ok(SessionEnd::Unavailable)
    }

    async fn offer_call<R, W>(&self, console: &mut Console<R, W>) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        if console
            .confirm(&format!("Call {} now?", self.line.number()))
            .await?
        {
            self.call_now(console).await?;
        } else {
            console
                .say(&format!("Dial {} as soon as you can.", self.line.number()))
                .await?;
        }
        Ok(())
    }

    async fn call_now<R, W>(&self, console: &mut Console<R, W>) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let outcome = self.line.call_emergency_number().await;
        console.say(&outcome.message()).await
    }
}
