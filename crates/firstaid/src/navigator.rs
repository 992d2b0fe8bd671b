//! The step-flow navigator.
//!
//! A [`Navigator`] is the only mutable piece of a guide session. It sits at
//! exactly one step at a time and keeps an append-only history of visited
//! steps; the current step is always the last history entry. Every operation
//! either applies fully and returns a [`Transition`], or fails with a
//! [`NavigationError`] and leaves the navigator untouched.
//!
//! Revisiting a step (for example looping back to `heimlich_thrust` after a
//! failed check) pushes a new history entry, so walking back retraces the loop
//! instead of jumping out of it.

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::guide::{EntryPoint, Flow, Guide, OptionTarget, Step};

/// Reasons a navigation operation is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    // === Data integrity ===
    /// A branch target does not exist in the guide.
    #[error("step '{step_id}' not found in guide '{guide_id}'")]
    StepNotFound {
        /// The guide being navigated.
        guide_id: String,
        /// The unresolved step id.
        step_id: String,
    },

    /// A question option has neither a step nor a flow target.
    #[error("option '{option_id}' of step '{step_id}' has no target")]
    MalformedOption {
        /// The question step.
        step_id: String,
        /// The offending option.
        option_id: String,
    },

    /// The guide has no step to start from.
    #[error("guide '{guide_id}' has no entry step")]
    EmptyGuide {
        /// The empty guide.
        guide_id: String,
    },

    // === Caller preconditions ===
    /// `retreat` was called at the first step.
    #[error("already at the first step")]
    NoPreviousStep,

    /// `answer_question` was called on an instruction step.
    #[error("step '{step_id}' is not a question")]
    NotAQuestion {
        /// The current step.
        step_id: String,
    },

    /// The answer does not belong to the current question.
    #[error("step '{step_id}' has no option '{option_id}'")]
    UnknownOption {
        /// The current step.
        step_id: String,
        /// The option that was given.
        option_id: String,
    },

    /// `advance` was called on a step outside the sequence.
    #[error("step '{step_id}' is outside the step sequence; answer its question to continue")]
    NotInSequence {
        /// The current step.
        step_id: String,
    },

    /// `advance` was called on a question step.
    #[error("step '{step_id}' is a question and must be answered")]
    AwaitingAnswer {
        /// The current step.
        step_id: String,
    },
}

impl NavigationError {
    /// Whether the guide content itself is broken.
    #[must_use]
    pub fn is_data_integrity(&self) -> bool {
        matches!(
            self,
            Self::StepNotFound { .. } | Self::MalformedOption { .. } | Self::EmptyGuide { .. }
        )
    }

    /// Whether the caller asked for something the current state does not allow.
    #[must_use]
    pub fn is_caller_precondition(&self) -> bool {
        !self.is_data_integrity()
    }
}

/// Result of a successful navigation operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition<'g> {
    /// The navigator now sits at this step.
    Moved(&'g Step),
    /// The last sequential step was passed; the guide is finished.
    Complete,
    /// A question option named a symbolic outcome. The step is unchanged.
    Outcome(Flow),
}

impl Transition<'_> {
    /// Whether this transition should be surfaced as a warning.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Outcome(flow) if !flow.is_recognized())
    }
}

/// Progress indicator for the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// A question is being asked.
    Assessment,
    /// An instruction step, by its display number.
    Step {
        /// The step's display number.
        number: u32,
        /// Number of sequential steps in the guide.
        total: usize,
    },
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Assessment => write!(f, "Assessment"),
            Self::Step { number, total } => write!(f, "Step {number} of {total}"),
        }
    }
}

/// Stateful controller for one pass through a guide.
#[derive(Debug, Clone)]
pub struct Navigator<'g> {
    guide: &'g Guide,
    entry: EntryPoint<'g>,
    history: Vec<&'g Step>,
}

impl<'g> Navigator<'g> {
    /// Start a session at the guide's entry point.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::EmptyGuide`] if the guide has neither an
    /// initial question nor any steps.
    pub fn new(guide: &'g Guide) -> Result<Self, NavigationError> {
        let entry = guide.entry_point().ok_or_else(|| {
            error!(guide = %guide.id, "Guide has no entry step");
            NavigationError::EmptyGuide {
                guide_id: guide.id.clone(),
            }
        })?;
        debug!(guide = %guide.id, step = %entry.step().id, "Starting guide session");

        Ok(Self {
            guide,
            entry,
            history: vec![entry.step()],
        })
    }

    /// The guide being navigated.
    #[must_use]
    pub fn guide(&self) -> &'g Guide {
        self.guide
    }

    /// How this session entered the guide.
    #[must_use]
    pub fn entry(&self) -> EntryPoint<'g> {
        self.entry
    }

    /// The step the navigator sits at.
    #[must_use]
    pub fn current_step(&self) -> &'g Step {
        self.history
            .last()
            .copied()
            .unwrap_or_else(|| self.entry.step())
    }

    /// Id of the current step.
    #[must_use]
    pub fn current_step_id(&self) -> &'g str {
        &self.current_step().id
    }

    /// Ids of every visited step, oldest first. Repeated visits appear once
    /// per visit.
    #[must_use]
    pub fn history(&self) -> Vec<&'g str> {
        self.history.iter().map(|step| step.id.as_str()).collect()
    }

    /// Number of history entries. Never zero.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Whether [`Navigator::retreat`] would succeed.
    #[must_use]
    pub fn can_go_back(&self) -> bool {
        self.history.len() > 1
    }

    /// Progress indicator for the current step.
    #[must_use]
    pub fn progress(&self) -> Progress {
        let step = self.current_step();
        if step.is_question() {
            Progress::Assessment
        } else {
            Progress::Step {
                number: step.step_number,
                total: self.guide.steps.len(),
            }
        }
    }

    /// Jump to a step of this guide and record it in the history.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::StepNotFound`] if the id does not resolve.
    pub fn go_to_step(&mut self, step_id: &str) -> Result<Transition<'g>, NavigationError> {
        let guide = self.guide;
        let Some(step) = guide.find_step(step_id) else {
            error!(guide = %guide.id, step = step_id, "Step not found in guide");
            return Err(NavigationError::StepNotFound {
                guide_id: guide.id.clone(),
                step_id: step_id.to_string(),
            });
        };

        self.history.push(step);
        debug!(guide = %guide.id, step = %step.id, depth = self.history.len(), "Moved to step");
        Ok(Transition::Moved(step))
    }

    /// Move to the step following the current one in the sequence.
    ///
    /// Returns [`Transition::Complete`] when the current step is the last one.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::NotInSequence`] if the current step is the
    /// initial question, or [`NavigationError::AwaitingAnswer`] if it is a
    /// question inside the sequence.
    pub fn advance(&mut self) -> Result<Transition<'g>, NavigationError> {
        let guide = self.guide;
        let current = self.current_step();

        let Some(index) = guide.position(&current.id) else {
            return Err(NavigationError::NotInSequence {
                step_id: current.id.clone(),
            });
        };
        if current.is_question() {
            return Err(NavigationError::AwaitingAnswer {
                step_id: current.id.clone(),
            });
        }

        match guide.steps.get(index + 1) {
            Some(next) => {
                self.history.push(next);
                debug!(guide = %guide.id, step = %next.id, depth = self.history.len(), "Advanced to step");
                Ok(Transition::Moved(next))
            }
            None => {
                info!(guide = %guide.id, "Guide completed");
                Ok(Transition::Complete)
            }
        }
    }

    /// Step back to the previous history entry, discarding the current one.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::NoPreviousStep`] at the first step.
    pub fn retreat(&mut self) -> Result<Transition<'g>, NavigationError> {
        if self.history.len() <= 1 {
            return Err(NavigationError::NoPreviousStep);
        }

        self.history.pop();
        let current = self.current_step();
        debug!(guide = %self.guide.id, step = %current.id, depth = self.history.len(), "Went back to step");
        Ok(Transition::Moved(current))
    }

    /// Answer the current question.
    ///
    /// An option with a step target behaves exactly like
    /// [`Navigator::go_to_step`]. An option with a flow target returns
    /// [`Transition::Outcome`] and leaves the step unchanged; unrecognized
    /// flows are logged as warnings but still returned.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::NotAQuestion`] or
    /// [`NavigationError::UnknownOption`] for invalid requests, and
    /// [`NavigationError::StepNotFound`] or
    /// [`NavigationError::MalformedOption`] for broken guide data.
    pub fn answer_question(&mut self, option_id: &str) -> Result<Transition<'g>, NavigationError> {
        let current = self.current_step();
        if !current.is_question() {
            return Err(NavigationError::NotAQuestion {
                step_id: current.id.clone(),
            });
        }

        let option = current
            .option(option_id)
            .ok_or_else(|| NavigationError::UnknownOption {
                step_id: current.id.clone(),
                option_id: option_id.to_string(),
            })?;

        match option.target() {
            OptionTarget::Step(step_id) => self.go_to_step(step_id),
            OptionTarget::Flow(flow) => {
                if flow.is_recognized() {
                    debug!(guide = %self.guide.id, step = %current.id, flow = %flow, "Question resolved to flow");
                } else {
                    warn!(guide = %self.guide.id, step = %current.id, flow = %flow, "Question resolved to unrecognized flow");
                }
                Ok(Transition::Outcome(flow.clone()))
            }
            OptionTarget::Missing => {
                error!(guide = %self.guide.id, step = %current.id, option = option_id, "Question option has no target");
                Err(NavigationError::MalformedOption {
                    step_id: current.id.clone(),
                    option_id: option_id.to_string(),
                })
            }
        }
    }

    /// Discard the history and start over at the entry step.
    pub fn restart(&mut self) -> Transition<'g> {
        let entry = self.entry.step();
        self.history.clear();
        self.history.push(entry);
        debug!(guide = %self.guide.id, step = %entry.id, "Restarted guide session");
        Transition::Moved(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guide::QuestionOption;
    use crate::logging::init_test_logging;
    use crate::registry::GuideRegistry;

    fn registry() -> GuideRegistry {
        GuideRegistry::builtin()
    }

    fn moved_to<'g>(result: Result<Transition<'g>, NavigationError>) -> &'g str {
        match result {
            Ok(Transition::Moved(step)) => &step.id,
            other => panic!("expected a move, got {other:?}"),
        }
    }

    fn broken_guide() -> Guide {
        let question = Step::new("q", 0, "Q", "?", "?")
            .with_option(QuestionOption::to_step("dangling", "Dangling", "gone"))
            .with_option(QuestionOption {
                id: "empty".to_string(),
                text: "Empty".to_string(),
                next_step_id: None,
                next_flow: None,
            })
            .with_option(QuestionOption::to_flow("odd", "Odd", "call_poison_control"));
        Guide {
            id: "broken".to_string(),
            category_id: "broken".to_string(),
            title: "Broken".to_string(),
            initial_question: Some(question),
            steps: vec![Step::new("a", 1, "A", "Do A", "Do A")],
            post_care_instructions: Vec::new(),
        }
    }

    #[test]
    fn test_new_seeds_history_with_entry() {
        let registry = registry();
        let guide = registry.find_guide("choking_guide").unwrap();
        let nav = Navigator::new(guide).unwrap();

        assert_eq!(nav.current_step_id(), "choking_assessment");
        assert_eq!(nav.history(), vec!["choking_assessment"]);
        assert!(matches!(nav.entry(), EntryPoint::InitialQuestion(_)));
        assert!(!nav.can_go_back());
    }

    #[test]
    fn test_new_without_initial_question() {
        let registry = registry();
        let guide = registry.find_guide("cpr_guide").unwrap();
        let nav = Navigator::new(guide).unwrap();

        assert_eq!(nav.current_step_id(), "check_consciousness");
        assert!(matches!(nav.entry(), EntryPoint::FirstOfSequence(_)));
    }

    #[test]
    fn test_new_empty_guide() {
        let mut guide = broken_guide();
        guide.initial_question = None;
        guide.steps.clear();

        let err = Navigator::new(&guide).unwrap_err();
        assert_eq!(
            err,
            NavigationError::EmptyGuide {
                guide_id: "broken".to_string()
            }
        );
        assert!(err.is_data_integrity());
    }

    #[test]
    fn test_advance_reaches_complete_after_n_minus_one_moves() {
        let registry = registry();
        let guide = registry.find_guide("cpr_guide").unwrap();
        let mut nav = Navigator::new(guide).unwrap();
        let n = guide.steps.len();

        for expected in guide.steps.iter().skip(1) {
            assert_eq!(moved_to(nav.advance()), expected.id);
        }
        assert_eq!(nav.history_len(), n);
        assert_eq!(nav.advance(), Ok(Transition::Complete));
        assert_eq!(nav.history_len(), n);
        assert_eq!(nav.current_step_id(), "chest_compressions");
    }

    #[test]
    fn test_advance_uses_position_not_step_number() {
        let mut guide = registry().find_guide("cpr_guide").unwrap().clone();
        for step in &mut guide.steps {
            step.step_number = 7;
        }
        let mut nav = Navigator::new(&guide).unwrap();

        assert_eq!(moved_to(nav.advance()), "call_emergency");
        assert_eq!(moved_to(nav.advance()), "position_hands");
    }

    #[test]
    fn test_advance_from_initial_question_is_rejected() {
        let registry = registry();
        let guide = registry.find_guide("choking_guide").unwrap();
        let mut nav = Navigator::new(guide).unwrap();

        let err = nav.advance().unwrap_err();
        assert_eq!(
            err,
            NavigationError::NotInSequence {
                step_id: "choking_assessment".to_string()
            }
        );
        assert!(err.is_caller_precondition());
        assert_eq!(nav.history(), vec!["choking_assessment"]);
    }

    #[test]
    fn test_advance_from_question_in_sequence_is_rejected() {
        let registry = registry();
        let guide = registry.find_guide("choking_guide").unwrap();
        let mut nav = Navigator::new(guide).unwrap();
        nav.go_to_step("repeat_check").unwrap();

        let err = nav.advance().unwrap_err();
        assert!(matches!(err, NavigationError::AwaitingAnswer { .. }));
        assert_eq!(nav.current_step_id(), "repeat_check");
    }

    #[test]
    fn test_go_to_step_unknown_leaves_state_unchanged() {
        let registry = registry();
        let guide = registry.find_guide("cuts_guide").unwrap();
        let mut nav = Navigator::new(guide).unwrap();
        nav.go_to_step("clean_hands").unwrap();
        let before = nav.history();

        let err = nav.go_to_step("heimlich_thrust").unwrap_err();
        assert!(matches!(err, NavigationError::StepNotFound { .. }));
        assert!(err.is_data_integrity());
        assert_eq!(nav.history(), before);
        assert_eq!(nav.current_step_id(), "clean_hands");
    }

    #[test]
    fn test_go_to_initial_question() {
        let registry = registry();
        let guide = registry.find_guide("cuts_guide").unwrap();
        let mut nav = Navigator::new(guide).unwrap();
        nav.go_to_step("stop_bleeding").unwrap();

        assert_eq!(moved_to(nav.go_to_step("assess_bleeding")), "assess_bleeding");
        assert_eq!(nav.history_len(), 3);
    }

    #[test]
    fn test_retreat_at_first_step_fails() {
        let registry = registry();
        let guide = registry.find_guide("cpr_guide").unwrap();
        let mut nav = Navigator::new(guide).unwrap();

        assert_eq!(nav.retreat(), Err(NavigationError::NoPreviousStep));
        assert_eq!(nav.current_step_id(), "check_consciousness");
        assert_eq!(nav.history_len(), 1);
    }

    #[test]
    fn test_retreat_restores_previous_and_terminates_at_entry() {
        let registry = registry();
        let guide = registry.find_guide("cuts_guide").unwrap();
        let mut nav = Navigator::new(guide).unwrap();

        nav.answer_question("heavy_bleeding").unwrap();
        nav.advance().unwrap();
        nav.advance().unwrap();
        nav.go_to_step("elevate_wound").unwrap();
        assert_eq!(
            nav.history(),
            vec![
                "assess_bleeding",
                "call_emergency_cuts",
                "clean_hands",
                "stop_bleeding",
                "elevate_wound"
            ]
        );

        assert_eq!(moved_to(nav.retreat()), "stop_bleeding");
        assert_eq!(moved_to(nav.retreat()), "clean_hands");

        let mut guard = 0;
        while nav.can_go_back() {
            nav.retreat().unwrap();
            guard += 1;
            assert!(guard < 10, "retreat did not terminate");
        }
        assert_eq!(nav.current_step_id(), "assess_bleeding");
        assert_eq!(nav.retreat(), Err(NavigationError::NoPreviousStep));
    }

    #[test]
    fn test_self_loop_records_every_visit() {
        let registry = registry();
        let guide = registry.find_guide("choking_guide").unwrap();
        let mut nav = Navigator::new(guide).unwrap();

        nav.answer_question("cannot_cough").unwrap();
        nav.advance().unwrap();
        nav.advance().unwrap();
        nav.advance().unwrap();
        assert_eq!(nav.current_step_id(), "repeat_check");
        let base = nav.history_len();

        assert_eq!(moved_to(nav.answer_question("still_choking")), "heimlich_thrust");
        assert_eq!(nav.history_len(), base + 1);
        assert_eq!(moved_to(nav.advance()), "repeat_check");
        assert_eq!(moved_to(nav.answer_question("still_choking")), "heimlich_thrust");
        assert_eq!(nav.history_len(), base + 3);

        let visits = nav
            .history()
            .into_iter()
            .filter(|id| *id == "heimlich_thrust")
            .count();
        assert_eq!(visits, 3);

        // Walking back retraces the loop.
        assert_eq!(moved_to(nav.retreat()), "repeat_check");
        assert_eq!(moved_to(nav.retreat()), "heimlich_thrust");
        assert_eq!(moved_to(nav.retreat()), "repeat_check");
        assert_eq!(moved_to(nav.retreat()), "heimlich_thrust");
        assert_eq!(moved_to(nav.retreat()), "fist_placement");
    }

    #[test]
    fn test_choking_end_to_end() {
        let registry = registry();
        let guide = registry.find_guide_by_category("choking").unwrap();
        assert_eq!(guide.id, "choking_guide");
        let mut nav = Navigator::new(guide).unwrap();
        assert_eq!(nav.current_step_id(), "choking_assessment");

        assert_eq!(moved_to(nav.answer_question("cannot_cough")), "choking_position");
        assert_eq!(moved_to(nav.advance()), "fist_placement");
        assert_eq!(moved_to(nav.advance()), "heimlich_thrust");
        assert_eq!(moved_to(nav.advance()), "repeat_check");

        let before = nav.history_len();
        assert_eq!(
            nav.answer_question("object_out"),
            Ok(Transition::Outcome(Flow::PostCare))
        );
        assert_eq!(nav.history_len(), before);
        assert_eq!(nav.guide().post_care_instructions.len(), 4);
    }

    #[test]
    fn test_mild_choking_outcome() {
        let registry = registry();
        let guide = registry.find_guide("choking_guide").unwrap();
        let mut nav = Navigator::new(guide).unwrap();

        let transition = nav.answer_question("can_cough").unwrap();
        assert_eq!(transition, Transition::Outcome(Flow::MildChoking));
        assert!(!transition.is_warning());
        assert_eq!(nav.current_step_id(), "choking_assessment");
    }

    #[test]
    fn test_answer_on_instruction_step() {
        let registry = registry();
        let guide = registry.find_guide("cpr_guide").unwrap();
        let mut nav = Navigator::new(guide).unwrap();

        let err = nav.answer_question("anything").unwrap_err();
        assert_eq!(
            err,
            NavigationError::NotAQuestion {
                step_id: "check_consciousness".to_string()
            }
        );
        assert!(err.is_caller_precondition());
    }

    #[test]
    fn test_answer_unknown_option() {
        let registry = registry();
        let guide = registry.find_guide("choking_guide").unwrap();
        let mut nav = Navigator::new(guide).unwrap();

        let err = nav.answer_question("object_out").unwrap_err();
        assert!(matches!(err, NavigationError::UnknownOption { .. }));
        assert_eq!(nav.history_len(), 1);
    }

    #[test]
    fn test_answer_with_dangling_target() {
        let guide = broken_guide();
        let mut nav = Navigator::new(&guide).unwrap();

        let err = nav.answer_question("dangling").unwrap_err();
        assert_eq!(
            err,
            NavigationError::StepNotFound {
                guide_id: "broken".to_string(),
                step_id: "gone".to_string(),
            }
        );
        assert_eq!(nav.history(), vec!["q"]);
    }

    #[test]
    fn test_answer_with_malformed_option() {
        let guide = broken_guide();
        let mut nav = Navigator::new(&guide).unwrap();

        let err = nav.answer_question("empty").unwrap_err();
        assert!(matches!(err, NavigationError::MalformedOption { .. }));
        assert!(err.is_data_integrity());
        assert_eq!(nav.history_len(), 1);
    }

    #[test]
    fn test_answer_with_unrecognized_flow_is_warning() {
        init_test_logging();
        let guide = broken_guide();
        let mut nav = Navigator::new(&guide).unwrap();

        let transition = nav.answer_question("odd").unwrap();
        assert_eq!(
            transition,
            Transition::Outcome(Flow::Unrecognized("call_poison_control".to_string()))
        );
        assert!(transition.is_warning());
        assert_eq!(nav.current_step_id(), "q");
    }

    #[test]
    fn test_restart_resets_history() {
        let registry = registry();
        let guide = registry.find_guide("choking_guide").unwrap();
        let mut nav = Navigator::new(guide).unwrap();
        nav.answer_question("cannot_cough").unwrap();
        nav.advance().unwrap();

        let transition = nav.restart();
        assert_eq!(moved_to(Ok(transition)), "choking_assessment");
        assert_eq!(nav.history(), vec!["choking_assessment"]);
        assert!(!nav.can_go_back());
    }

    #[test]
    fn test_progress() {
        let registry = registry();
        let guide = registry.find_guide("choking_guide").unwrap();
        let mut nav = Navigator::new(guide).unwrap();
        assert_eq!(nav.progress(), Progress::Assessment);
        assert_eq!(nav.progress().to_string(), "Assessment");

        nav.answer_question("cannot_cough").unwrap();
        assert_eq!(nav.progress(), Progress::Step { number: 1, total: 4 });
        assert_eq!(nav.progress().to_string(), "Step 1 of 4");
    }

    #[test]
    fn test_error_taxonomy() {
        assert!(NavigationError::StepNotFound {
            guide_id: String::new(),
            step_id: String::new()
        }
        .is_data_integrity());
        assert!(NavigationError::MalformedOption {
            step_id: String::new(),
            option_id: String::new()
        }
        .is_data_integrity());
        assert!(NavigationError::NoPreviousStep.is_caller_precondition());
        assert!(NavigationError::NotAQuestion {
            step_id: String::new()
        }
        .is_caller_precondition());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            NavigationError::NoPreviousStep.to_string(),
            "already at the first step"
        );
        let err = NavigationError::StepNotFound {
            guide_id: "choking_guide".to_string(),
            step_id: "gone".to_string(),
        };
        assert_eq!(err.to_string(), "step 'gone' not found in guide 'choking_guide'");
    }
}
