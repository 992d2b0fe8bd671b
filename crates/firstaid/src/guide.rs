//! Guide data model.
//!
//! Categories, guides, steps and question options are immutable values built
//! once at startup (see [`crate::catalog`]). Flow order through a guide is
//! determined by the position of a step in [`Guide::steps`] and by explicit
//! branch targets on question options, never by [`Step::step_number`].

use serde::{Deserialize, Serialize};

/// A classification tag for an emergency.
///
/// Many categories may exist without an implemented guide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Stable identifier (e.g. `choking`).
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Icon name used by graphical front ends.
    pub icon: String,
    /// Accent color as a hex string.
    pub color: String,
    /// One-line description of the emergency.
    pub description: String,
}

impl Category {
    /// Create a new category.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        icon: impl Into<String>,
        color: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            icon: icon.into(),
            color: color.into(),
            description: description.into(),
        }
    }
}

/// A symbolic outcome named by a question option instead of a step.
///
/// The navigator does not interpret flows; it hands them to the presentation
/// layer, which owns the side effects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Flow {
    /// The person can still cough or speak.
    MildChoking,
    /// The emergency is resolved; show post-care instructions.
    PostCare,
    /// A tag no front end knows how to handle.
    Unrecognized(String),
}

impl Flow {
    /// The wire tag of this flow.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::MildChoking => "mild_choking",
            Self::PostCare => "post_care",
            Self::Unrecognized(tag) => tag,
        }
    }

    /// Whether this flow is one of the known outcomes.
    #[must_use]
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl From<&str> for Flow {
    fn from(tag: &str) -> Self {
        match tag {
            "mild_choking" => Self::MildChoking,
            "post_care" => Self::PostCare,
            other => Self::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for Flow {
    fn from(tag: String) -> Self {
        Self::from(tag.as_str())
    }
}

impl From<Flow> for String {
    fn from(flow: Flow) -> Self {
        flow.tag().to_string()
    }
}

impl std::fmt::Display for Flow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// One answer to a question step.
///
/// Exactly one of `next_step_id` and `next_flow` is expected to be set;
/// [`crate::registry::GuideRegistry::issues`] reports options that break this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    /// Identifier, unique within its question.
    pub id: String,
    /// Label shown to the user.
    pub text: String,
    /// Step in the same guide to jump to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_step_id: Option<String>,
    /// Symbolic outcome to hand to the presentation layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_flow: Option<Flow>,
}

/// Where a question option leads, in resolution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionTarget<'a> {
    /// A concrete step id.
    Step(&'a str),
    /// A symbolic outcome.
    Flow(&'a Flow),
    /// Neither target is set.
    Missing,
}

impl QuestionOption {
    /// An option that jumps to a step.
    #[must_use]
    pub fn to_step(id: impl Into<String>, text: impl Into<String>, step_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            next_step_id: Some(step_id.into()),
            next_flow: None,
        }
    }

    /// An option that ends in a symbolic outcome.
    #[must_use]
    pub fn to_flow(id: impl Into<String>, text: impl Into<String>, flow: impl Into<Flow>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            next_step_id: None,
            next_flow: Some(flow.into()),
        }
    }

    /// The effective target. A step id wins over a flow when both are set.
    #[must_use]
    pub fn target(&self) -> OptionTarget<'_> {
        match (&self.next_step_id, &self.next_flow) {
            (Some(step_id), _) => OptionTarget::Step(step_id),
            (None, Some(flow)) => OptionTarget::Flow(flow),
            (None, None) => OptionTarget::Missing,
        }
    }
}

/// A single instruction or question within a guide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Identifier, unique within its guide.
    pub id: String,
    /// Number shown in progress displays. Not used for ordering.
    pub step_number: u32,
    /// Short title.
    pub title: String,
    /// Instruction text shown on screen.
    pub instruction: String,
    /// Text read aloud by the narrator.
    pub voice_text: String,
    /// Illustration file name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Answers, non-empty only for question steps.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub question_options: Vec<QuestionOption>,
}

impl Step {
    /// Create a plain instruction step.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        step_number: u32,
        title: impl Into<String>,
        instruction: impl Into<String>,
        voice_text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            step_number,
            title: title.into(),
            instruction: instruction.into(),
            voice_text: voice_text.into(),
            image: None,
            question_options: Vec::new(),
        }
    }

    /// Attach an illustration.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Add an answer, turning this step into a question.
    #[must_use]
    pub fn with_option(mut self, option: QuestionOption) -> Self {
        self.question_options.push(option);
        self
    }

    /// Whether this step asks a question.
    #[must_use]
    pub fn is_question(&self) -> bool {
        !self.question_options.is_empty()
    }

    /// Find one of this step's options by id.
    #[must_use]
    pub fn option(&self, option_id: &str) -> Option<&QuestionOption> {
        self.question_options.iter().find(|o| o.id == option_id)
    }
}

/// How a session enters a guide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint<'g> {
    /// The guide opens with an assessment question outside the sequence.
    InitialQuestion(&'g Step),
    /// The guide opens at the first sequential step.
    FirstOfSequence(&'g Step),
}

impl<'g> EntryPoint<'g> {
    /// The entry step.
    #[must_use]
    pub fn step(&self) -> &'g Step {
        match self {
            Self::InitialQuestion(step) | Self::FirstOfSequence(step) => step,
        }
    }
}

/// A step-by-step procedure for one emergency category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guide {
    /// Identifier (e.g. `choking_guide`).
    pub id: String,
    /// The category this guide implements.
    pub category_id: String,
    /// Human-readable title.
    pub title: String,
    /// Entry question, not part of `steps`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_question: Option<Step>,
    /// Sequential steps, in flow order.
    pub steps: Vec<Step>,
    /// Free-text instructions shown once the emergency is handled.
    pub post_care_instructions: Vec<String>,
}

impl Guide {
    /// Resolve the entry point: the initial question if present, otherwise
    /// the first sequential step. `None` for a guide with no steps at all.
    #[must_use]
    pub fn entry_point(&self) -> Option<EntryPoint<'_>> {
        match &self.initial_question {
            Some(question) => Some(EntryPoint::InitialQuestion(question)),
            None => self.steps.first().map(EntryPoint::FirstOfSequence),
        }
    }

    /// Look up a step by id, checking the initial question first.
    #[must_use]
    pub fn find_step(&self, step_id: &str) -> Option<&Step> {
        self.initial_question
            .iter()
            .chain(self.steps.iter())
            .find(|step| step.id == step_id)
    }

    /// Array position of a step within the sequence.
    #[must_use]
    pub fn position(&self, step_id: &str) -> Option<usize> {
        self.steps.iter().position(|step| step.id == step_id)
    }

    /// Every step of the guide, initial question first.
    pub fn all_steps(&self) -> impl Iterator<Item = &Step> {
        self.initial_question.iter().chain(self.steps.iter())
    }
}
