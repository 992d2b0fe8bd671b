//! `firstaid` - A guided first-aid assistant
//!
//! This library walks a user through step-by-step emergency procedures. Its
//! core is the [`Navigator`], a small state machine over a [`Guide`] of steps
//! and branching questions. Speech and emergency calling are injected
//! collaborators ([`Narrator`], [`Dialer`]).

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod catalog;
pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod guide;
pub mod logging;
pub mod narration;
pub mod navigator;
pub mod platform;
pub mod registry;
pub mod resolver;
pub mod telephony;
pub mod walkthrough;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::{Error, Result};
pub use guide::{Category, EntryPoint, Flow, Guide, QuestionOption, Step};
pub use logging::init_logging;
pub use narration::{Narration, Narrator, Voice};
pub use navigator::{NavigationError, Navigator, Progress, Transition};
pub use registry::{GuideRegistry, Selection};
pub use telephony::{CallOutcome, Contact, Dialer, EmergencyLine};
pub use walkthrough::{Assistant, SessionEnd};
