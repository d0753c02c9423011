use crate::models::IntentAction;

/// One intent category: the phrases that trigger it and the (possibly
/// smaller) keyword subset used to score confidence.
struct IntentRule {
    action: IntentAction,
    triggers: &'static [&'static str],
    confidence_terms: &'static [&'static str],
}

/// Categories are evaluated in this exact order and the first trigger match
/// wins; there is no scoring across categories. Reordering changes behavior.
const INTENT_RULES: &[IntentRule] = &[
    IntentRule {
        action: IntentAction::ScheduleAppointment,
        triggers: &[
            "schedule",
            "book",
            "make an appointment",
            "set up an appointment",
            "new appointment",
        ],
        confidence_terms: &["schedule", "book", "appointment"],
    },
    IntentRule {
        action: IntentAction::CancelAppointment,
        triggers: &["cancel", "call off"],
        confidence_terms: &["cancel", "appointment"],
    },
    IntentRule {
        action: IntentAction::RescheduleAppointment,
        triggers: &[
            "reschedule",
            "move my appointment",
            "move the appointment",
            "change my appointment",
            "different time",
        ],
        confidence_terms: &["reschedule", "move", "change"],
    },
    IntentRule {
        action: IntentAction::FindClient,
        triggers: &["find", "look up", "lookup", "search for"],
        confidence_terms: &["find", "look up", "client"],
    },
    IntentRule {
        action: IntentAction::CheckAppointments,
        triggers: &[
            "check appointments",
            "what appointments",
            "appointments today",
            "appointments tomorrow",
            "appointments for",
            "appointments do we have",
            "on the calendar",
            "upcoming appointments",
        ],
        confidence_terms: &["appointments", "today", "calendar"],
    },
    IntentRule {
        action: IntentAction::SendIntakeForm,
        triggers: &[
            "send intake",
            "send the intake",
            "send an intake",
            "intake form",
            "send form",
            "send questionnaire",
            "send",
        ],
        confidence_terms: &["send", "intake", "form"],
    },
    IntentRule {
        action: IntentAction::CheckIntakeStatus,
        triggers: &[
            "intake status",
            "form status",
            "filled out",
            "completed the intake",
            "finished the intake",
        ],
        confidence_terms: &["status", "intake"],
    },
    IntentRule {
        action: IntentAction::GetClientInfo,
        triggers: &[
            "client info",
            "client information",
            "contact info",
            "contact information",
            "phone number",
            "email address",
            "details for",
        ],
        confidence_terms: &["info", "client", "contact"],
    },
    IntentRule {
        action: IntentAction::CheckAvailability,
        triggers: &[
            "availability",
            "available",
            "openings",
            "open slots",
            "free time",
        ],
        confidence_terms: &["available", "openings"],
    },
];

/// Map a transcript to an action and a confidence score. Confidence is the
/// fraction of the winning rule's confidence keywords present in the text,
/// capped at 1.0. No trigger anywhere yields `Unknown` at 0.0.
pub fn classify(transcript: &str) -> (IntentAction, f32) {
    let text = normalize(transcript);

    for rule in INTENT_RULES {
        if rule
            .triggers
            .iter()
            .any(|trigger| contains_phrase(&text, trigger))
        {
            let matched = rule
                .confidence_terms
                .iter()
                .filter(|term| contains_phrase(&text, term))
                .count();
            let confidence = (matched as f32 / rule.confidence_terms.len() as f32).min(1.0);
            return (rule.action, confidence);
        }
    }

    (IntentAction::Unknown, 0.0)
}

/// Lowercase, strip punctuation to spaces (characters meaningful inside
/// emails, dates and times survive), collapse whitespace.
pub fn normalize(transcript: &str) -> String {
    let lowered = transcript.trim().to_lowercase();
    let cleaned: String = lowered
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '@' | '.' | '/' | ':' | '\'' | '-') {
                c
            } else {
                ' '
            }
        })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Word-boundary-aware substring containment: "schedule" does not fire
/// inside "reschedule", which keeps every category in the ordered table
/// reachable.
pub fn contains_phrase(normalized: &str, phrase: &str) -> bool {
    let padded = format!(" {normalized} ");
    padded.contains(&format!(" {phrase} "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_intent() {
        let (action, confidence) = classify("Schedule John Smith for tomorrow at 3 PM");
        assert_eq!(action, IntentAction::ScheduleAppointment);
        assert!(confidence > 0.0);
    }

    #[test]
    fn test_book_maps_to_schedule() {
        let (action, _) = classify("Can you book an appointment for Jane Doe?");
        assert_eq!(action, IntentAction::ScheduleAppointment);
    }

    #[test]
    fn test_cancel_intent() {
        let (action, _) = classify("Please cancel appointment 12345");
        assert_eq!(action, IntentAction::CancelAppointment);
    }

    #[test]
    fn test_reschedule_not_shadowed_by_schedule() {
        let (action, _) = classify("I need to reschedule my appointment");
        assert_eq!(action, IntentAction::RescheduleAppointment);
    }

    #[test]
    fn test_find_client_intent() {
        let (action, _) = classify("Find John Smith");
        assert_eq!(action, IntentAction::FindClient);
    }

    #[test]
    fn test_check_appointments_intent() {
        let (action, _) = classify("What appointments do we have today?");
        assert_eq!(action, IntentAction::CheckAppointments);
    }

    #[test]
    fn test_send_intake_intent() {
        let (action, _) = classify("Send the intake form to jane@example.com");
        assert_eq!(action, IntentAction::SendIntakeForm);
    }

    #[test]
    fn test_intake_status_intent() {
        let (action, _) = classify("What's the intake status for Jane?");
        assert_eq!(action, IntentAction::CheckIntakeStatus);
    }

    #[test]
    fn test_client_info_intent() {
        let (action, _) = classify("What's the phone number for Bob Jones?");
        assert_eq!(action, IntentAction::GetClientInfo);
    }

    #[test]
    fn test_availability_intent() {
        let (action, _) = classify("Do you have any openings on Friday?");
        assert_eq!(action, IntentAction::CheckAvailability);
    }

    #[test]
    fn test_unknown_intent() {
        let (action, confidence) = classify("the quick brown fox");
        assert_eq!(action, IntentAction::Unknown);
        assert_eq!(confidence, 0.0);
    }

    #[test]
    fn test_priority_order_first_match_wins() {
        // "schedule" (priority 1) beats the availability trigger also present.
        let (action, _) = classify("Schedule whatever is available");
        assert_eq!(action, IntentAction::ScheduleAppointment);
    }

    #[test]
    fn test_confidence_fraction() {
        // Triggers on "cancel"; both confidence terms present.
        let (action, confidence) = classify("cancel the appointment please");
        assert_eq!(action, IntentAction::CancelAppointment);
        assert!((confidence - 1.0).abs() < f32::EPSILON);

        // Only "cancel" of the two terms present.
        let (_, confidence) = classify("cancel it");
        assert!((confidence - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_normalize_strips_punctuation() {
        assert_eq!(normalize("  Hello,   there!  "), "hello there");
        assert_eq!(normalize("email Bob@Example.com"), "email bob@example.com");
    }

    #[test]
    fn test_contains_phrase_word_boundaries() {
        assert!(contains_phrase("please schedule me", "schedule"));
        assert!(!contains_phrase("please reschedule me", "schedule"));
        assert!(contains_phrase("look up jane", "look up"));
    }
}
