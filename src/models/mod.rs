pub mod directory;
pub mod hours;
pub mod intent;
pub mod response;

pub use directory::{
    Appointment, AppointmentStatus, Client, CreateAppointmentRequest, DateRange, Location,
    Practitioner, QuestionnaireSend, QuestionnaireTemplate, SchedulingSettings, SendQuestionnaireRequest,
    Service,
};
pub use hours::BusinessHours;
pub use intent::{Intent, IntentAction, IntentParams};
pub use response::VoiceResponse;
