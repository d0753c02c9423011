use std::sync::Arc;

use chrono::{Duration, Local, NaiveDateTime};
use serde_json::json;

use crate::config::AssistantConfig;
use crate::models::{
    AppointmentStatus, CreateAppointmentRequest, DateRange, Intent, IntentAction, IntentParams,
    Practitioner, QuestionnaireTemplate, SendQuestionnaireRequest, Service, VoiceResponse,
};
use crate::services::classifier;
use crate::services::datetime;
use crate::services::directory::{Directory, DirectoryError};
use crate::services::extractor::SlotExtractor;
use crate::services::speech;

const GREETING_PHRASES: &[&str] = &[
    "hello",
    "hi",
    "hey",
    "good morning",
    "good afternoon",
    "good evening",
];

const HELP_PHRASES: &[&str] = &["help", "what can you do", "capabilities", "options"];

const CAPABILITIES: &str =
    "I can schedule appointments, look up clients, check a day's appointments, or send intake forms.";

/// The workflow engine: one classified transcript in, exactly one
/// `VoiceResponse` out. Holds the collaborator seam and an immutable config;
/// a configuration change means constructing a new `Assistant`.
pub struct Assistant {
    directory: Arc<dyn Directory>,
    config: AssistantConfig,
    extractor: SlotExtractor,
}

impl Assistant {
    pub fn new(directory: Arc<dyn Directory>, config: AssistantConfig) -> anyhow::Result<Self> {
        Ok(Self {
            directory,
            config,
            extractor: SlotExtractor::new()?,
        })
    }

    /// Classify a transcript and extract its slots without executing
    /// anything.
    pub fn interpret(&self, transcript: &str) -> Intent {
        let (action, confidence) = classifier::classify(transcript);
        let params = self.extractor.extract(action, transcript);
        Intent {
            action,
            params,
            confidence,
        }
    }

    /// Run the workflow for a transcript. Total: every path, including any
    /// directory failure, lands on a speakable response.
    pub async fn process_command(&self, transcript: &str) -> VoiceResponse {
        let intent = self.interpret(transcript);
        tracing::info!(
            action = intent.action.as_str(),
            confidence = intent.confidence,
            "dispatching intent"
        );

        let result = match intent.action {
            IntentAction::ScheduleAppointment => self.schedule_appointment(&intent.params).await,
            IntentAction::CancelAppointment => self.cancel_appointment(&intent.params).await,
            IntentAction::FindClient | IntentAction::GetClientInfo => {
                self.find_client(&intent.params).await
            }
            IntentAction::CheckAppointments => self.check_appointments(&intent.params).await,
            IntentAction::SendIntakeForm => self.send_intake_form(&intent.params).await,
            IntentAction::RescheduleAppointment => Ok(self.transfer_response(
                "I'm not able to reschedule appointments over the phone yet.",
            )),
            IntentAction::CheckIntakeStatus => Ok(self.transfer_response(
                "I'm not able to check intake form status over the phone yet.",
            )),
            IntentAction::CheckAvailability => Ok(self.transfer_response(
                "I'm not able to check open availability over the phone yet.",
            )),
            IntentAction::Unknown => Ok(self.unknown_response(transcript)),
        };

        match result {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    action = intent.action.as_str(),
                    "directory call failed"
                );
                VoiceResponse::fail(
                    "I'm sorry, I'm having trouble reaching our scheduling system right now. \
                     Please try again in a moment.",
                )
                .with_transfer(self.config.transfer_number.as_deref())
            }
        }
    }

    async fn schedule_appointment(
        &self,
        params: &IntentParams,
    ) -> Result<VoiceResponse, DirectoryError> {
        let Some(name) = params.client_name.as_deref() else {
            return Ok(VoiceResponse::fail(
                "Who is the appointment for? Please give me the client's full name.",
            ));
        };
        let Some(phrase) = params.date_time.as_deref() else {
            return Ok(VoiceResponse::fail(format!(
                "What day and time would you like for {name}'s appointment?"
            )));
        };

        let matches = self.directory.search_clients(name).await?;
        let client = match matches.as_slice() {
            [] => {
                return Ok(VoiceResponse::fail(format!(
                    "I couldn't find a client named {name}. Would you like me to create a new client record?"
                )));
            }
            [client] => client.clone(),
            candidates => {
                let names =
                    speech::format_spoken_list(candidates.iter().map(|c| c.name.as_str()), 3);
                return Ok(VoiceResponse::fail(format!(
                    "I found {} clients matching {name}: {names}. Which one did you mean?",
                    candidates.len()
                ))
                .with_data(json!({ "matches": candidates })));
            }
        };

        let Some(start) = datetime::resolve_date_time(phrase, self.now()) else {
            return Ok(VoiceResponse::fail(
                "I couldn't make out that date and time. Could you say something like \
                 \"tomorrow at 3 PM\"?",
            ));
        };
        if !self.config.business_hours.is_open_at(&start) {
            return Ok(VoiceResponse::fail(format!(
                "That time is outside our business hours. We're open {}. What other time works?",
                self.config.business_hours.to_speech()
            )));
        }

        let settings = self.directory.scheduling_settings().await?;
        let Some(practitioner) = pick_practitioner(
            &settings.practitioners,
            params.practitioner_name.as_deref(),
            self.config.default_practitioner_email.as_deref(),
        ) else {
            return Ok(
                self.transfer_response("I couldn't find an available practitioner for that appointment.")
            );
        };
        let Some(service) = pick_service(
            &settings.services,
            params.service_name.as_deref(),
            self.config.default_service_id.as_deref(),
        ) else {
            return Ok(self.transfer_response("I couldn't find a matching service for that appointment."));
        };
        let location_id = self
            .config
            .default_location_id
            .clone()
            .or_else(|| settings.locations.first().map(|l| l.id.clone()));

        let request = CreateAppointmentRequest {
            client_id: client.id.clone(),
            service_id: service.id.clone(),
            practitioner_id: practitioner.id.clone(),
            location_id,
            start,
            send_email_notification: true,
            reminder_type: "Email".to_string(),
            status: AppointmentStatus::WaitingConfirmation,
        };
        let appointment = self.directory.create_appointment(&request).await?;

        tracing::info!(
            appointment_id = %appointment.id,
            client = %client.name,
            "appointment created"
        );
        Ok(VoiceResponse::ok(format!(
            "I've scheduled {} for {} with {} on {}. They'll receive an email confirmation shortly.",
            client.name,
            service.name,
            practitioner.name,
            speech::format_date_time_for_speech(&start),
        ))
        .with_data(json!({ "appointmentId": appointment.id })))
    }

    async fn cancel_appointment(
        &self,
        params: &IntentParams,
    ) -> Result<VoiceResponse, DirectoryError> {
        if let Some(id) = params.appointment_id.as_deref() {
            self.directory
                .cancel_appointment(id, Some("Cancelled by phone request"))
                .await?;
            tracing::info!(appointment_id = id, "appointment cancelled");
            return Ok(VoiceResponse::ok(format!(
                "I've cancelled appointment {id}. A cancellation notice will go out by email."
            )));
        }

        if params.client_name.is_none() && params.date_time.is_none() {
            return Ok(VoiceResponse::fail(
                "I can help with that. Could you give me the appointment ID, or the client's \
                 name and the appointment time?",
            ));
        }

        // A name or a time alone never identifies an appointment
        // unambiguously; never guess at a cancellation target.
        Ok(VoiceResponse::fail(
            "To make sure I cancel the right appointment, I need the appointment ID from the \
             confirmation email. If you don't have it handy, I can transfer you to the front desk.",
        )
        .with_transfer(self.config.transfer_number.as_deref()))
    }

    async fn find_client(&self, params: &IntentParams) -> Result<VoiceResponse, DirectoryError> {
        let client = if let Some(email) = params.client_email.as_deref() {
            match self.directory.get_client_by_email(email).await? {
                Some(client) => client,
                None => {
                    return Ok(VoiceResponse::fail(format!(
                        "I couldn't find a client with the email {email}. Could you double-check \
                         the address, or give me their name instead?"
                    )));
                }
            }
        } else if let Some(name) = params.client_name.as_deref() {
            let matches = self.directory.search_clients(name).await?;
            match matches.as_slice() {
                [] => {
                    return Ok(VoiceResponse::fail(format!(
                        "I couldn't find a client named {name}. Could you check the spelling, \
                         or give me their email address?"
                    )));
                }
                [client] => client.clone(),
                candidates => {
                    let names =
                        speech::format_spoken_list(candidates.iter().map(|c| c.name.as_str()), 3);
                    return Ok(VoiceResponse::fail(format!(
                        "I found {} clients matching {name}: {names}. Which one did you mean?",
                        candidates.len()
                    ))
                    .with_data(json!({ "matches": candidates })));
                }
            }
        } else {
            return Ok(VoiceResponse::fail(
                "Which client are you looking for? You can give me a name or an email address.",
            ));
        };

        // Enrich with the next confirmed appointment inside a 30-day window.
        let today = self.now().date();
        let range = DateRange {
            start: today,
            end: today + Duration::days(30),
        };
        let appointments = self
            .directory
            .list_appointments(range, Some(AppointmentStatus::Confirmed))
            .await?;
        let next = appointments
            .into_iter()
            .filter(|a| a.client_id == client.id)
            .min_by_key(|a| a.start);

        let mut message = client.name.clone();
        if let Some(phone) = client.phone.as_deref() {
            message.push_str(&format!(
                ". Phone: {}",
                speech::format_phone_for_speech(phone)
            ));
        }
        if let Some(email) = client.email.as_deref() {
            message.push_str(&format!(". Email: {email}"));
        }
        match &next {
            Some(appointment) => message.push_str(&format!(
                ". Their next appointment is {} with {}.",
                speech::format_date_time_for_speech(&appointment.start),
                appointment.practitioner_name
            )),
            None => message.push_str(". They have no upcoming appointments in the next 30 days."),
        }

        Ok(VoiceResponse::ok(message)
            .with_data(json!({ "client": client, "nextAppointment": next })))
    }

    async fn check_appointments(
        &self,
        params: &IntentParams,
    ) -> Result<VoiceResponse, DirectoryError> {
        let today = self.now().date();
        let target = match params.date.as_deref() {
            Some(phrase) => match datetime::resolve_date(phrase, today) {
                Some(date) => date,
                None => {
                    return Ok(VoiceResponse::fail(
                        "Which day would you like to check? You can say today, tomorrow, or a date.",
                    ));
                }
            },
            None => today,
        };

        let appointments = self
            .directory
            .list_appointments(DateRange::single_day(target), Some(AppointmentStatus::Confirmed))
            .await?;
        let mut day_appointments: Vec<_> = appointments
            .into_iter()
            .filter(|a| a.start.date() == target)
            .collect();
        day_appointments.sort_by_key(|a| a.start);

        let spoken_day = speech::format_day_for_speech(&target);
        if day_appointments.is_empty() {
            return Ok(VoiceResponse::ok(format!(
                "There are no confirmed appointments for {spoken_day}."
            ))
            .with_data(json!({ "appointments": [] })));
        }

        let total = day_appointments.len();
        let entries: Vec<String> = day_appointments
            .iter()
            .take(5)
            .map(|a| {
                format!(
                    "{} - {} with {}",
                    speech::format_time_for_speech(&a.start.time()),
                    a.client_name,
                    a.practitioner_name
                )
            })
            .collect();
        let listing = entries.join(", ");
        let message = if total > 5 {
            format!(
                "There are {total} confirmed appointments for {spoken_day}. \
                 Here are the first 5: {listing}."
            )
        } else if total == 1 {
            format!("There is 1 confirmed appointment for {spoken_day}: {listing}.")
        } else {
            format!("There are {total} confirmed appointments for {spoken_day}: {listing}.")
        };

        Ok(VoiceResponse::ok(message).with_data(json!({ "appointments": day_appointments })))
    }

    async fn send_intake_form(
        &self,
        params: &IntentParams,
    ) -> Result<VoiceResponse, DirectoryError> {
        let Some(email) = params.client_email.as_deref() else {
            return Ok(VoiceResponse::fail(
                "What email address should I send the intake form to?",
            ));
        };

        let templates = self.directory.list_questionnaire_templates().await?;
        let Some(template) = pick_template(&templates, params.service_name.as_deref()) else {
            return Ok(self.transfer_response("I'm not able to send intake forms right now."));
        };

        let practitioners = self.directory.list_questionnaire_practitioners().await?;
        let Some(practitioner) = pick_practitioner(
            &practitioners,
            None,
            self.config.default_practitioner_email.as_deref(),
        ) else {
            return Ok(self.transfer_response("I'm not able to send intake forms right now."));
        };

        let request = SendQuestionnaireRequest {
            template_id: template.id.clone(),
            practitioner_id: practitioner.id.clone(),
            client_email: email.to_string(),
        };
        let send = self.directory.send_questionnaire(&request).await?;

        tracing::info!(send_id = %send.id, template = %template.name, "questionnaire sent");
        Ok(VoiceResponse::ok(format!(
            "I've sent the {} to {email}. It should arrive in a few minutes.",
            template.name
        ))
        .with_data(json!({ "sendId": send.id })))
    }

    fn unknown_response(&self, transcript: &str) -> VoiceResponse {
        let text = classifier::normalize(transcript);
        if GREETING_PHRASES
            .iter()
            .any(|p| classifier::contains_phrase(&text, p))
        {
            return VoiceResponse::ok(format!("Hello! {CAPABILITIES} How can I help?"));
        }
        if HELP_PHRASES
            .iter()
            .any(|p| classifier::contains_phrase(&text, p))
        {
            return VoiceResponse::ok(format!("{CAPABILITIES} What would you like to do?"));
        }
        VoiceResponse::fail(format!("I'm sorry, I didn't catch that. {CAPABILITIES}"))
    }

    fn transfer_response(&self, context: &str) -> VoiceResponse {
        let message = match &self.config.transfer_number {
            Some(_) => format!("{context} Let me transfer you to the front desk."),
            None => format!("{context} Please reach the front desk directly and they'll take care of it."),
        };
        VoiceResponse::fail(message).with_transfer(self.config.transfer_number.as_deref())
    }

    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Priority: explicitly named practitioner, then the configured default
/// email, then the first one listed.
fn pick_practitioner<'a>(
    practitioners: &'a [Practitioner],
    explicit: Option<&str>,
    default_email: Option<&str>,
) -> Option<&'a Practitioner> {
    if let Some(name) = explicit {
        let wanted = name.to_lowercase();
        let wanted = wanted
            .trim_start_matches("dr.")
            .trim_start_matches("dr ")
            .trim();
        let found = practitioners.iter().find(|p| {
            let have = p.name.to_lowercase();
            have.contains(wanted) || wanted.contains(have.as_str())
        });
        if found.is_some() {
            return found;
        }
    }
    if let Some(email) = default_email {
        let found = practitioners.iter().find(|p| {
            p.email
                .as_deref()
                .is_some_and(|e| e.eq_ignore_ascii_case(email))
        });
        if found.is_some() {
            return found;
        }
    }
    practitioners.first()
}

/// Priority: case-insensitive substring on the spoken service name, then
/// the configured default id, then the first one listed.
fn pick_service<'a>(
    services: &'a [Service],
    explicit: Option<&str>,
    default_id: Option<&str>,
) -> Option<&'a Service> {
    if let Some(name) = explicit {
        let wanted = name.to_lowercase();
        let found = services
            .iter()
            .find(|s| s.name.to_lowercase().contains(&wanted));
        if found.is_some() {
            return found;
        }
    }
    if let Some(id) = default_id {
        let found = services.iter().find(|s| s.id == id);
        if found.is_some() {
            return found;
        }
    }
    services.first()
}

/// Priority: case-insensitive substring on the spoken form name, then the
/// first template listed.
fn pick_template<'a>(
    templates: &'a [QuestionnaireTemplate],
    explicit: Option<&str>,
) -> Option<&'a QuestionnaireTemplate> {
    if let Some(name) = explicit {
        let wanted = name.to_lowercase();
        let found = templates
            .iter()
            .find(|t| t.name.to_lowercase().contains(&wanted));
        if found.is_some() {
            return found;
        }
    }
    templates.first()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn practitioners() -> Vec<Practitioner> {
        vec![
            Practitioner {
                id: "p1".to_string(),
                name: "Sara Patel".to_string(),
                email: Some("sara@example.com".to_string()),
            },
            Practitioner {
                id: "p2".to_string(),
                name: "James Wu".to_string(),
                email: Some("james@example.com".to_string()),
            },
        ]
    }

    fn services() -> Vec<Service> {
        vec![
            Service {
                id: "s1".to_string(),
                name: "Initial Consultation".to_string(),
            },
            Service {
                id: "s2".to_string(),
                name: "Deep Tissue Massage".to_string(),
            },
        ]
    }

    #[test]
    fn test_pick_practitioner_by_name() {
        let list = practitioners();
        let picked = pick_practitioner(&list, Some("Dr. Patel"), None).unwrap();
        assert_eq!(picked.id, "p1");
    }

    #[test]
    fn test_pick_practitioner_default_email_beats_first() {
        let list = practitioners();
        let picked = pick_practitioner(&list, None, Some("james@example.com")).unwrap();
        assert_eq!(picked.id, "p2");
    }

    #[test]
    fn test_pick_practitioner_falls_back_to_first() {
        let list = practitioners();
        let picked = pick_practitioner(&list, Some("Nguyen"), Some("nobody@example.com")).unwrap();
        assert_eq!(picked.id, "p1");
    }

    #[test]
    fn test_pick_practitioner_empty_list() {
        assert!(pick_practitioner(&[], None, None).is_none());
    }

    #[test]
    fn test_pick_service_substring() {
        let list = services();
        let picked = pick_service(&list, Some("massage"), None).unwrap();
        assert_eq!(picked.id, "s2");
    }

    #[test]
    fn test_pick_service_default_id() {
        let list = services();
        let picked = pick_service(&list, None, Some("s2")).unwrap();
        assert_eq!(picked.id, "s2");
    }

    #[test]
    fn test_pick_service_first_available() {
        let list = services();
        let picked = pick_service(&list, None, None).unwrap();
        assert_eq!(picked.id, "s1");
    }

    #[test]
    fn test_pick_template_substring_else_first() {
        let templates = vec![
            QuestionnaireTemplate {
                id: "t1".to_string(),
                name: "New Patient Intake".to_string(),
            },
            QuestionnaireTemplate {
                id: "t2".to_string(),
                name: "Consent Form".to_string(),
            },
        ];
        assert_eq!(pick_template(&templates, Some("consent")).unwrap().id, "t2");
        assert_eq!(pick_template(&templates, None).unwrap().id, "t1");
        assert_eq!(pick_template(&templates, Some("nope")).unwrap().id, "t1");
    }
}
