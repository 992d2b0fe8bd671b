//! Embedded emergency categories and guides.
//!
//! This is the only source of guide content. Every guide here must pass
//! [`crate::registry::GuideRegistry::validate`].

use crate::guide::{Category, Flow, Guide, QuestionOption, Step};

/// All known emergency categories, in display order.
#[must_use]
pub fn categories() -> Vec<Category> {
    vec![
        Category::new(
            "choking",
            "Choking",
            "account-alert",
            "#FF6B6B",
            "Someone cannot breathe because their airway is blocked",
        ),
        Category::new(
            "cuts",
            "Cuts and Wounds",
            "bandage",
            "#4ECDC4",
            "Bleeding wounds that need immediate attention",
        ),
        Category::new(
            "burns",
            "Burns",
            "fire",
            "#FFE66D",
            "Injuries caused by heat, chemicals or electricity",
        ),
        Category::new(
            "fainting",
            "Fainting",
            "head",
            "#A8E6CF",
            "Sudden loss of consciousness",
        ),
        Category::new(
            "cpr",
            "CPR",
            "heart-pulse",
            "#FF8B94",
            "Cardiopulmonary resuscitation for cardiac arrest",
        ),
        Category::new(
            "heatstroke",
            "Heatstroke",
            "weather-sunny",
            "#FFAAA5",
            "Dangerously high body temperature",
        ),
    ]
}

/// All implemented guides. At most one per category.
#[must_use]
pub fn guides() -> Vec<Guide> {
    vec![choking_guide(), cuts_guide(), cpr_guide()]
}

fn choking_guide() -> Guide {
    let assessment = Step::new(
        "choking_assessment",
        0,
        "Initial Assessment",
        "Can the person cough or speak?",
        "For choking: can the person cough or speak? Choose yes or no.",
    )
    .with_option(QuestionOption::to_flow(
        "can_cough",
        "Yes, they can cough or speak",
        Flow::MildChoking,
    ))
    .with_option(QuestionOption::to_step(
        "cannot_cough",
        "No, they are completely blocked",
        "choking_position",
    ));

    Guide {
        id: "choking_guide".to_string(),
        category_id: "choking".to_string(),
        title: "Choking Guide".to_string(),
        initial_question: Some(assessment),
        steps: vec![
            Step::new(
                "choking_position",
                1,
                "Get Into Position",
                "Stand behind the person. Wrap your arms around their waist.",
                "Step one: wrap your arms around the person's waist from behind.",
            )
            .with_image("choking_position.png"),
            Step::new(
                "fist_placement",
                2,
                "Place Your Fist",
                "Make a fist with one hand. Place it between the person's navel and breastbone.",
                "Step two: make a fist and place it between the navel and the chest.",
            )
            .with_image("fist_placement.png"),
            Step::new(
                "heimlich_thrust",
                3,
                "Abdominal Thrust",
                "Grab your fist with the other hand. Press hard inwards and upwards.",
                "Step three: grab your fist with your other hand and press hard inwards and upwards.",
            )
            .with_image("heimlich_thrust.png"),
            Step::new(
                "repeat_check",
                4,
                "Check and Repeat",
                "Repeat the thrusts until the object comes out or the person can breathe.",
                "Keep giving thrusts until the object comes out. Has the object come out?",
            )
            .with_option(QuestionOption::to_flow(
                "object_out",
                "Yes, the object came out",
                Flow::PostCare,
            ))
            .with_option(QuestionOption::to_step(
                "still_choking",
                "No, they are still choking",
                "heimlich_thrust",
            )),
        ],
        post_care_instructions: vec![
            "Make sure the person can breathe normally".to_string(),
            "Stay with the person until medical help arrives".to_string(),
            "Watch that they do not choke again".to_string(),
            "If the person loses consciousness, start CPR".to_string(),
        ],
    }
}

fn cuts_guide() -> Guide {
    let assessment = Step::new(
        "assess_bleeding",
        0,
        "Assess the Bleeding",
        "Look at the wound. Is it bleeding heavily?",
        "First assess the bleeding. Is the wound bleeding heavily?",
    )
    .with_option(QuestionOption::to_step(
        "heavy_bleeding",
        "Yes, it is bleeding a lot",
        "call_emergency_cuts",
    ))
    .with_option(QuestionOption::to_step(
        "light_bleeding",
        "No, it is bleeding a little",
        "clean_hands",
    ));

    Guide {
        id: "cuts_guide".to_string(),
        category_id: "cuts".to_string(),
        title: "Cuts and Wounds Guide".to_string(),
        initial_question: Some(assessment),
        steps: vec![
            Step::new(
                "call_emergency_cuts",
                1,
                "Call Emergency Services",
                "For heavy bleeding, call 110 right away while you follow the next steps.",
                "Heavy bleeding is serious. Call 110 now.",
            )
            .with_image("call_emergency.png"),
            Step::new(
                "clean_hands",
                2,
                "Clean Your Hands",
                "Wash your hands with soap and water, or use hand sanitizer if available.",
                "Wash your hands to prevent infection.",
            )
            .with_image("wash_hands.png"),
            Step::new(
                "stop_bleeding",
                3,
                "Stop the Bleeding",
                "Press directly on the wound with a clean cloth or gauze. Keep steady pressure.",
                "Press firmly on the wound with a clean cloth. Do not release the pressure.",
            )
            .with_image("direct_pressure.png"),
            Step::new(
                "elevate_wound",
                4,
                "Raise the Wound",
                "If possible, raise the injured part above the level of the heart.",
                "If you can, raise the injured part higher than the heart.",
            )
            .with_image("elevate_limb.png"),
        ],
        post_care_instructions: vec![
            "Keep the wound clean and dry".to_string(),
            "Change the bandage regularly".to_string(),
            "Watch for signs of infection (redness, swelling, pus)".to_string(),
            "Get medical attention if the wound is deep".to_string(),
        ],
    }
}

fn cpr_guide() -> Guide {
    Guide {
        id: "cpr_guide".to_string(),
        category_id: "cpr".to_string(),
        title: "CPR Guide".to_string(),
        initial_question: None,
        steps: vec![
            Step::new(
                "check_consciousness",
                1,
                "Check Responsiveness",
                "Tap the person's shoulders and shout: \"Are you okay?\"",
                "Step one: tap the shoulders firmly and ask loudly if they are okay.",
            )
            .with_image("check_consciousness.png"),
            Step::new(
                "call_emergency",
                2,
                "Call Emergency Services",
                "If there is no response, call 110 right away or ask someone else to.",
                "If there is no response, it is vital to call 110 right now.",
            )
            .with_image("call_emergency.png"),
            Step::new(
                "position_hands",
                3,
                "Hand Position",
                "Place the heel of one hand in the center of the chest. Put the other hand on top.",
                "Place the heel of one hand in the center of the chest and the other hand on top, interlacing your fingers.",
            )
            .with_image("hand_position.png"),
            Step::new(
                "chest_compressions",
                4,
                "Compressions",
                "Push hard and fast, at least 5 cm deep, 100 to 120 times per minute.",
                "Push hard and fast, at least five centimeters deep. Count: one, two, three...",
            )
            .with_image("compressions.png"),
        ],
        post_care_instructions: vec![
            "Continue CPR until medical help arrives".to_string(),
            "Do not leave the person alone".to_string(),
            "If the person regains consciousness, place them in the recovery position".to_string(),
            "Keep the airway clear".to_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_order() {
        let ids: Vec<String> = categories().into_iter().map(|c| c.id).collect();
        assert_eq!(
            ids,
            vec!["choking", "cuts", "burns", "fainting", "cpr", "heatstroke"]
        );
    }

    #[test]
    fn test_every_guide_has_four_post_care_instructions() {
        for guide in guides() {
            assert_eq!(guide.post_care_instructions.len(), 4, "{}", guide.id);
        }
    }

    #[test]
    fn test_initial_questions_are_outside_the_sequence() {
        for guide in guides() {
            if let Some(question) = &guide.initial_question {
                assert!(question.is_question());
                assert!(guide.position(&question.id).is_none(), "{}", guide.id);
            }
        }
    }

    #[test]
    fn test_cpr_guide_has_no_initial_question() {
        let cpr = guides().into_iter().find(|g| g.id == "cpr_guide").unwrap();
        assert!(cpr.initial_question.is_none());
        assert_eq!(cpr.steps.len(), 4);
    }
}
