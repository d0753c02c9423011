use regex::Regex;

use crate::models::{IntentAction, IntentParams};
use crate::services::classifier;

/// Words that terminate a captured name run even though they look
/// capitalized in transcripts ("Schedule John Smith Tomorrow at 3").
const NAME_STOP_WORDS: &[&str] = &[
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
    "today",
    "tomorrow",
    "next",
    "at",
    "on",
    "for",
    "with",
    "am",
    "pm",
];

/// Tokens that end a spoken service/form name.
const SERVICE_STOP_WORDS: &[&str] = &[
    "for", "to", "with", "on", "at", "today", "tomorrow", "next", "this", "please", "monday",
    "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
];

/// Per-intent slot extraction over ordered regex templates. Patterns are
/// compiled once at construction and reused across invocations.
pub struct SlotExtractor {
    email: Regex,
    name_templates: Vec<Regex>,
    practitioner: Regex,
    date_time_patterns: Vec<Regex>,
    date_patterns: Vec<Regex>,
    appointment_id: Regex,
    form_name: Regex,
}

impl SlotExtractor {
    pub fn new() -> anyhow::Result<Self> {
        const NAME_RUN: &str = r"((?:[A-Z][A-Za-z'-]*)(?:\s+[A-Z][A-Za-z'-]*)*)";
        const TIME_TAIL: &str =
            r"(?:\s+(?:at\s+)?\d{1,2}(?::\d{2})?(?:\s*(?:am|pm|a\.m\.|p\.m\.))?)?";

        let name_templates = vec![
            Regex::new(&format!(
                r"\b(?:[Ss]chedule|[Bb]ook)\s+(?:an?\s+appointment\s+for\s+)?{NAME_RUN}"
            ))?,
            Regex::new(&format!(
                r"\b(?:[Ff]ind|[Ll]ook\s+up|[Aa]bout)\s+{NAME_RUN}"
            ))?,
            Regex::new(&format!(r"\b[Ff]or\s+{NAME_RUN}"))?,
        ];

        // Day-plus-time phrases are matched before the time-only pattern so
        // a phrase like "friday at 2 pm" keeps its day.
        let date_time_patterns = vec![
            Regex::new(&format!(r"(?i)\b(?:today|tomorrow){TIME_TAIL}"))?,
            Regex::new(&format!(
                r"(?i)\b(?:next\s+)?(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday){TIME_TAIL}"
            ))?,
            Regex::new(&format!(
                r"(?i)\b\d{{1,2}}/\d{{1,2}}(?:/\d{{2,4}})?{TIME_TAIL}"
            ))?,
            Regex::new(&format!(
                r"(?i)\b(?:january|february|march|april|may|june|july|august|september|october|november|december)\s+\d{{1,2}}(?:st|nd|rd|th)?{TIME_TAIL}"
            ))?,
            Regex::new(r"(?i)\b\d{1,2}(?::\d{2})?\s*(?:am|pm|a\.m\.|p\.m\.)")?,
            Regex::new(r"\b\d{1,2}:\d{2}\b")?,
        ];

        let date_patterns = vec![
            Regex::new(r"(?i)\b(?:today|tomorrow)\b")?,
            Regex::new(
                r"(?i)\b(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b",
            )?,
            Regex::new(r"\b\d{1,2}/\d{1,2}(?:/\d{2,4})?\b")?,
            Regex::new(
                r"(?i)\b(?:january|february|march|april|may|june|july|august|september|october|november|december)\s+\d{1,2}(?:st|nd|rd|th)?\b",
            )?,
        ];

        Ok(Self {
            email: Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")?,
            name_templates,
            practitioner: Regex::new(
                r"\b[Ww]ith\s+((?:Dr\.?\s+)?(?:[A-Z][A-Za-z'.-]*)(?:\s+[A-Z][A-Za-z'.-]*)*)",
            )?,
            date_time_patterns,
            date_patterns,
            appointment_id: Regex::new(
                r"(?i)\bappointment\s+(?:id\s+|number\s+)?([A-Za-z0-9-]*\d[A-Za-z0-9-]*)",
            )?,
            form_name: Regex::new(
                r"(?i)\bsend\s+(?:the\s+|a\s+|an\s+)?(.+?)\s+(?:form|intake|questionnaire)",
            )?,
        })
    }

    /// Fill the slots the given intent cares about. Unmatched slots stay
    /// `None`; nothing is ever inferred without textual evidence.
    pub fn extract(&self, action: IntentAction, transcript: &str) -> IntentParams {
        let mut params = IntentParams {
            client_email: self.extract_email(transcript),
            ..Default::default()
        };

        match action {
            IntentAction::ScheduleAppointment => {
                params.client_name = self.extract_client_name(transcript);
                params.date_time = self.extract_date_time(transcript);
                params.service_name = self.extract_service_name(transcript);
                params.practitioner_name = self.extract_practitioner_name(transcript);
            }
            IntentAction::CancelAppointment | IntentAction::RescheduleAppointment => {
                params.appointment_id = self.extract_appointment_id(transcript);
                params.client_name = self.extract_client_name(transcript);
                params.date_time = self.extract_date_time(transcript);
            }
            IntentAction::FindClient
            | IntentAction::GetClientInfo
            | IntentAction::CheckIntakeStatus => {
                params.client_name = self.extract_client_name(transcript);
            }
            IntentAction::CheckAppointments | IntentAction::CheckAvailability => {
                params.date = self.extract_date(transcript);
            }
            IntentAction::SendIntakeForm => {
                params.client_name = self.extract_client_name(transcript);
                params.service_name = self.extract_form_name(transcript);
            }
            IntentAction::Unknown => {}
        }

        params
    }

    pub fn extract_email(&self, transcript: &str) -> Option<String> {
        self.email
            .find(transcript)
            .map(|m| m.as_str().to_lowercase())
    }

    pub fn extract_client_name(&self, transcript: &str) -> Option<String> {
        for template in &self.name_templates {
            if let Some(caps) = template.captures(transcript) {
                if let Some(name) = caps.get(1) {
                    if let Some(trimmed) = trim_name(name.as_str()) {
                        return Some(trimmed);
                    }
                }
            }
        }
        None
    }

    pub fn extract_practitioner_name(&self, transcript: &str) -> Option<String> {
        self.practitioner
            .captures(transcript)
            .and_then(|caps| caps.get(1))
            .and_then(|m| trim_name(m.as_str()))
    }

    /// First matching date/time pattern wins; the raw matched substring is
    /// returned unmodified for the resolver to interpret.
    pub fn extract_date_time(&self, transcript: &str) -> Option<String> {
        self.date_time_patterns
            .iter()
            .find_map(|p| p.find(transcript))
            .map(|m| m.as_str().to_string())
    }

    pub fn extract_date(&self, transcript: &str) -> Option<String> {
        self.date_patterns
            .iter()
            .find_map(|p| p.find(transcript))
            .map(|m| m.as_str().to_string())
    }

    pub fn extract_appointment_id(&self, transcript: &str) -> Option<String> {
        self.appointment_id
            .captures(transcript)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Form name from "send the <name> form/intake/questionnaire". Generic
    /// phrasings ("send the intake form") carry no name.
    pub fn extract_form_name(&self, transcript: &str) -> Option<String> {
        let captured = self
            .form_name
            .captures(transcript)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_lowercase())?;
        if matches!(captured.as_str(), "intake" | "a" | "an" | "the" | "") {
            return None;
        }
        Some(captured)
    }

    /// Service name from "for a/an/the <tokens>" up to the next preposition
    /// or temporal word.
    pub fn extract_service_name(&self, transcript: &str) -> Option<String> {
        let normalized = classifier::normalize(transcript);
        let tokens: Vec<&str> = normalized.split_whitespace().collect();

        for (i, window) in tokens.windows(2).enumerate() {
            if window[0] == "for" && matches!(window[1], "a" | "an" | "the") {
                let mut collected = Vec::new();
                for token in &tokens[i + 2..] {
                    if SERVICE_STOP_WORDS.contains(token) || token.contains('@') {
                        break;
                    }
                    collected.push(*token);
                }
                if !collected.is_empty() {
                    return Some(collected.join(" "));
                }
            }
        }
        None
    }
}

/// Drop trailing tokens that are capitalized terminators rather than part
/// of the name.
fn trim_name(raw: &str) -> Option<String> {
    let mut tokens: Vec<&str> = raw.split_whitespace().collect();
    while let Some(last) = tokens.last() {
        if NAME_STOP_WORDS.contains(&last.to_lowercase().as_str()) {
            tokens.pop();
        } else {
            break;
        }
    }
    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(" "))
    }
}
