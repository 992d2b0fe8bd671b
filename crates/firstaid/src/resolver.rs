//! Step resolution.
//!
//! Pure lookups over a [`GuideRegistry`]. A missing guide or step is an
//! ordinary `None`, never a panic: dangling references in guide data are
//! expected to be handled by the caller.

use crate::guide::{Guide, Step};
use crate::registry::GuideRegistry;

/// Find a step of a guide by id.
///
/// The guide's initial question is checked before its sequential steps.
#[must_use]
pub fn find_step<'r>(
    registry: &'r GuideRegistry,
    guide_id: &str,
    step_id: &str,
) -> Option<&'r Step> {
    registry.find_guide(guide_id)?.find_step(step_id)
}

/// The id of the step a new session starts at.
#[must_use]
pub fn entry_step_id(guide: &Guide) -> Option<&str> {
    guide.entry_point().map(|entry| entry.step().id.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_step_resolves_for_every_guide() {
        let registry = GuideRegistry::builtin();
        for guide in registry.guides() {
            let entry = entry_step_id(guide).expect("guide has an entry");
            assert!(
                find_step(&registry, &guide.id, entry).is_some(),
                "entry of {} does not resolve",
                guide.id
            );
        }
    }

    #[test]
    fn test_entry_step_ids() {
        let registry = GuideRegistry::builtin();
        let entry = |id| entry_step_id(registry.find_guide(id).unwrap());
        assert_eq!(entry("choking_guide"), Some("choking_assessment"));
        assert_eq!(entry("cuts_guide"), Some("assess_bleeding"));
        assert_eq!(entry("cpr_guide"), Some("check_consciousness"));
    }

    #[test]
    fn test_find_initial_question() {
        let registry = GuideRegistry::builtin();
        let step = find_step(&registry, "choking_guide", "choking_assessment").unwrap();
        assert!(step.is_question());
    }

    #[test]
    fn test_find_sequential_step() {
        let registry = GuideRegistry::builtin();
        let step = find_step(&registry, "choking_guide", "heimlich_thrust").unwrap();
        assert_eq!(step.step_number, 3);
    }

    #[test]
    fn test_find_step_missing_guide_or_step() {
        let registry = GuideRegistry::builtin();
        assert!(find_step(&registry, "burns_guide", "anything").is_none());
        assert!(find_step(&registry, "choking_guide", "no_such_step").is_none());
    }

    #[test]
    fn test_find_step_does_not_cross_guides() {
        let registry = GuideRegistry::builtin();
        assert!(find_step(&registry, "cpr_guide", "heimlich_thrust").is_none());
    }
}
