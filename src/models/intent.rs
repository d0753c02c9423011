use serde::{Deserialize, Serialize};

/// The closed set of operations the assistant understands, in classifier
/// priority order. The order is load-bearing: the classifier walks it top
/// to bottom and the first category with a trigger match wins.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IntentAction {
    ScheduleAppointment,
    CancelAppointment,
    RescheduleAppointment,
    FindClient,
    CheckAppointments,
    SendIntakeForm,
    CheckIntakeStatus,
    GetClientInfo,
    CheckAvailability,
    Unknown,
}

impl IntentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentAction::ScheduleAppointment => "schedule_appointment",
            IntentAction::CancelAppointment => "cancel_appointment",
            IntentAction::RescheduleAppointment => "reschedule_appointment",
            IntentAction::FindClient => "find_client",
            IntentAction::CheckAppointments => "check_appointments",
            IntentAction::SendIntakeForm => "send_intake_form",
            IntentAction::CheckIntakeStatus => "check_intake_status",
            IntentAction::GetClientInfo => "get_client_info",
            IntentAction::CheckAvailability => "check_availability",
            IntentAction::Unknown => "unknown",
        }
    }
}

/// Slots pulled out of the transcript. A slot is `Some` only when explicit
/// textual evidence matched; extraction never invents a value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IntentParams {
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub appointment_id: Option<String>,
    pub date_time: Option<String>,
    pub date: Option<String>,
    pub service_name: Option<String>,
    pub practitioner_name: Option<String>,
}

/// One classified transcript: the winning action, its extracted slots, and
/// a confidence score in [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    pub action: IntentAction,
    pub params: IntentParams,
    pub confidence: f32,
}
