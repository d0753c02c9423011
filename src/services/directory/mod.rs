pub mod intakeq;

use async_trait::async_trait;

use crate::models::{
    Appointment, AppointmentStatus, Client, CreateAppointmentRequest, DateRange, Practitioner,
    QuestionnaireSend, QuestionnaireTemplate, SchedulingSettings, SendQuestionnaireRequest,
};

/// Failures crossing the collaborator boundary. The workflow engine catches
/// every one of these and degrades to an apologetic spoken response.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("directory request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("directory returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

/// The external client/appointment directory. All reads and mutations the
/// assistant performs go through this seam; tests substitute a recording
/// mock.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn search_clients(&self, query: &str) -> Result<Vec<Client>, DirectoryError>;

    async fn get_client_by_email(&self, email: &str) -> Result<Option<Client>, DirectoryError>;

    async fn list_appointments(
        &self,
        range: DateRange,
        status: Option<AppointmentStatus>,
    ) -> Result<Vec<Appointment>, DirectoryError>;

    async fn get_appointment(&self, id: &str) -> Result<Option<Appointment>, DirectoryError>;

    async fn create_appointment(
        &self,
        req: &CreateAppointmentRequest,
    ) -> Result<Appointment, DirectoryError>;

    async fn cancel_appointment(
        &self,
        id: &str,
        reason: Option<&str>,
    ) -> Result<(), DirectoryError>;

    async fn scheduling_settings(&self) -> Result<SchedulingSettings, DirectoryError>;

    async fn list_questionnaire_templates(
        &self,
    ) -> Result<Vec<QuestionnaireTemplate>, DirectoryError>;

    async fn list_questionnaire_practitioners(&self) -> Result<Vec<Practitioner>, DirectoryError>;

    async fn send_questionnaire(
        &self,
        req: &SendQuestionnaireRequest,
    ) -> Result<QuestionnaireSend, DirectoryError>;
}
