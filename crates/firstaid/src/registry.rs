//! Read-only registry of categories and guides.
//!
//! The registry is populated once at startup from [`crate::catalog`] and never
//! changes afterwards, so it can be shared freely across threads.

use std::collections::HashSet;

use tracing::{debug, error, warn};

use crate::catalog;
use crate::error::{Error, Result};
use crate::guide::{Category, Flow, Guide, OptionTarget};

/// In-memory registry of all categories and guides.
#[derive(Debug, Clone, Default)]
pub struct GuideRegistry {
    categories: Vec<Category>,
    guides: Vec<Guide>,
}

/// Result of selecting a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<'r> {
    /// The category has an implemented guide.
    Available {
        /// The selected category.
        category: &'r Category,
        /// Its guide.
        guide: &'r Guide,
    },
    /// The category exists but no guide has been written for it.
    NotImplemented(&'r Category),
    /// No category with this id exists.
    UnknownCategory,
}

impl Selection<'_> {
    /// Whether the caller must fall back to an emergency call.
    #[must_use]
    pub fn needs_emergency_fallback(&self) -> bool {
        !matches!(self, Self::Available { .. })
    }
}

/// How serious an integrity issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// The guide still works, but a branch is degraded.
    Warning,
    /// The guide can dead-end or mislead the user.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A specific problem found in guide data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// The guide has neither an initial question nor any steps.
    EmptyGuide,
    /// Two guides share an id.
    DuplicateGuideId,
    /// The guide names a category that is not registered.
    UnknownCategory {
        /// The missing category id.
        category_id: String,
    },
    /// A second guide was registered for the same category.
    DuplicateGuideForCategory {
        /// The contested category id.
        category_id: String,
    },
    /// Two steps of the guide share an id.
    DuplicateStepId {
        /// The repeated id.
        step_id: String,
    },
    /// Two options of one question share an id.
    DuplicateOptionId {
        /// The question step.
        step_id: String,
        /// The repeated option id.
        option_id: String,
    },
    /// An option has neither a step nor a flow target.
    MalformedOption {
        /// The question step.
        step_id: String,
        /// The offending option.
        option_id: String,
    },
    /// An option has both a step and a flow target.
    AmbiguousOption {
        /// The question step.
        step_id: String,
        /// The offending option.
        option_id: String,
    },
    /// An option points at a step the guide does not contain.
    DanglingStepReference {
        /// The question step.
        step_id: String,
        /// The offending option.
        option_id: String,
        /// The missing step id.
        target: String,
    },
    /// An option names a flow no front end handles.
    UnrecognizedFlow {
        /// The question step.
        step_id: String,
        /// The offending option.
        option_id: String,
        /// The unknown flow tag.
        tag: String,
    },
}

impl IssueKind {
    /// The severity of this kind of issue.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::AmbiguousOption { .. } | Self::UnrecognizedFlow { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyGuide => write!(f, "guide has no entry step"),
            Self::DuplicateGuideId => write!(f, "guide id is registered more than once"),
            Self::UnknownCategory { category_id } => {
                write!(f, "guide refers to unknown category '{category_id}'")
            }
            Self::DuplicateGuideForCategory { category_id } => {
                write!(f, "category '{category_id}' already has a guide")
            }
            Self::DuplicateStepId { step_id } => write!(f, "step id '{step_id}' is not unique"),
            Self::DuplicateOptionId { step_id, option_id } => {
                write!(f, "option '{option_id}' appears twice in step '{step_id}'")
            }
            Self::MalformedOption { step_id, option_id } => write!(
                f,
                "option '{option_id}' in step '{step_id}' has no step or flow target"
            ),
            Self::AmbiguousOption { step_id, option_id } => write!(
                f,
                "option '{option_id}' in step '{step_id}' has both a step and a flow target; the step wins"
            ),
            Self::DanglingStepReference {
                step_id,
                option_id,
                target,
            } => write!(
                f,
                "option '{option_id}' in step '{step_id}' points to missing step '{target}'"
            ),
            Self::UnrecognizedFlow {
                step_id,
                option_id,
                tag,
            } => write!(
                f,
                "option '{option_id}' in step '{step_id}' names unrecognized flow '{tag}'"
            ),
        }
    }
}

/// An issue attributed to a guide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityIssue {
    /// The guide containing the problem.
    pub guide_id: String,
    /// What is wrong.
    pub kind: IssueKind,
}

impl IntegrityIssue {
    /// The severity of this issue.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

impl std::fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.severity(), self.guide_id, self.kind)
    }
}

impl GuideRegistry {
    /// Build a registry from explicit definitions.
    #[must_use]
    pub fn new(categories: Vec<Category>, guides: Vec<Guide>) -> Self {
        Self { categories, guides }
    }

    /// The registry of embedded guides.
    #[must_use]
    pub fn builtin() -> Self {
        let registry = Self::new(catalog::categories(), catalog::guides());
        debug!(
            categories = registry.categories.len(),
            guides = registry.guides.len(),
            "Loaded builtin guide registry"
        );
        registry
    }

    /// All categories, in insertion order.
    #[must_use]
    pub fn list_categories(&self) -> &[Category] {
        &self.categories
    }

    /// All guides, in insertion order.
    #[must_use]
    pub fn guides(&self) -> &[Guide] {
        &self.guides
    }

    /// Find a category by id.
    #[must_use]
    pub fn find_category(&self, category_id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == category_id)
    }

    /// Find a guide by id.
    #[must_use]
    pub fn find_guide(&self, guide_id: &str) -> Option<&Guide> {
        self.guides.iter().find(|g| g.id == guide_id)
    }

    /// Find the guide for a category.
    ///
    /// `None` means the emergency type has no guide yet, which callers must
    /// present as a distinct outcome rather than an error.
    #[must_use]
    pub fn find_guide_by_category(&self, category_id: &str) -> Option<&Guide> {
        self.guides.iter().find(|g| g.category_id == category_id)
    }

    /// Whether a category has a guide.
    #[must_use]
    pub fn has_guide(&self, category_id: &str) -> bool {
        self.find_guide_by_category(category_id).is_some()
    }

    /// Resolve a user's category choice.
    #[must_use]
    pub fn select(&self, category_id: &str) -> Selection<'_> {
        match self.find_category(category_id) {
            None => Selection::UnknownCategory,
            Some(category) => match self.find_guide_by_category(category_id) {
                Some(guide) => Selection::Available { category, guide },
                None => Selection::NotImplemented(category),
            },
        }
    }

    /// Check every guide for data integrity problems.
    #[must_use]
    pub fn issues(&self) -> Vec<IntegrityIssue> {
        let mut issues = Vec::new();
        let mut guide_ids = HashSet::new();
        let mut covered_categories = HashSet::new();

        for guide in &self.guides {
            let mut report = |kind| {
                issues.push(IntegrityIssue {
                    guide_id: guide.id.clone(),
                    kind,
                });
            };

            if !guide_ids.insert(guide.id.as_str()) {
                report(IssueKind::DuplicateGuideId);
            }
            if self.find_category(&guide.category_id).is_none() {
                report(IssueKind::UnknownCategory {
                    category_id: guide.category_id.clone(),
                });
            }
            if !covered_categories.insert(guide.category_id.as_str()) {
                report(IssueKind::DuplicateGuideForCategory {
                    category_id: guide.category_id.clone(),
                });
            }
            if guide.entry_point().is_none() {
                report(IssueKind::EmptyGuide);
            }

            let mut step_ids = HashSet::new();
            for step in guide.all_steps() {
                if !step_ids.insert(step.id.as_str()) {
                    report(IssueKind::DuplicateStepId {
                        step_id: step.id.clone(),
                    });
                }

                let mut option_ids = HashSet::new();
                for option in &step.question_options {
                    if !option_ids.insert(option.id.as_str()) {
                        report(IssueKind::DuplicateOptionId {
                            step_id: step.id.clone(),
                            option_id: option.id.clone(),
                        });
                    }
                    if option.next_step_id.is_some() && option.next_flow.is_some() {
                        report(IssueKind::AmbiguousOption {
                            step_id: step.id.clone(),
                            option_id: option.id.clone(),
                        });
                    }
                    match option.target() {
                        OptionTarget::Step(target) if guide.find_step(target).is_none() => {
                            report(IssueKind::DanglingStepReference {
                                step_id: step.id.clone(),
                                option_id: option.id.clone(),
                                target: target.to_string(),
                            });
                        }
                        OptionTarget::Step(_) | OptionTarget::Flow(Flow::MildChoking | Flow::PostCare) => {}
                        OptionTarget::Flow(Flow::Unrecognized(tag)) => {
                            report(IssueKind::UnrecognizedFlow {
                                step_id: step.id.clone(),
                                option_id: option.id.clone(),
                                tag: tag.clone(),
                            });
                        }
                        OptionTarget::Missing => {
                            report(IssueKind::MalformedOption {
                                step_id: step.id.clone(),
                                option_id: option.id.clone(),
                            });
                        }
                    }
                }
            }
        }

        issues
    }

    /// Validate the registry, logging every issue found.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GuideIntegrity`] if any issue has error severity.
    /// Warnings are logged but do not fail validation.
    pub fn validate(&self) -> Result<()> {
        let issues = self.issues();
        for issue in &issues {
            match issue.severity() {
                Severity::Warning => warn!(guide = %issue.guide_id, "{}", issue.kind),
                Severity::Error => error!(guide = %issue.guide_id, "{}", issue.kind),
            }
        }

        if issues.iter().any(|i| i.severity() == Severity::Error) {
            return Err(Error::GuideIntegrity { issues });
        }
        Ok(())
    }
}
