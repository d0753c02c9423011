use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Directory, DirectoryError};
use crate::models::{
    Appointment, AppointmentStatus, Client, CreateAppointmentRequest, DateRange, Practitioner,
    QuestionnaireSend, QuestionnaireTemplate, SchedulingSettings, SendQuestionnaireRequest,
};

/// REST client for the practice directory. One method per remote operation,
/// an `X-Auth-Key` header on every request, non-2xx mapped to
/// `DirectoryError::Api` with the response body preserved for logs.
pub struct IntakeQDirectory {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl IntakeQDirectory {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, DirectoryError> {
        let resp = self
            .client
            .get(format!("{}{path}", self.base_url))
            .header("X-Auth-Key", &self.api_key)
            .query(query)
            .send()
            .await?;
        Self::decode(resp).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, DirectoryError> {
        let resp = self
            .client
            .post(format!("{}{path}", self.base_url))
            .header("X-Auth-Key", &self.api_key)
            .json(body)
            .send()
            .await?;
        Self::decode(resp).await
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, DirectoryError> {
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(DirectoryError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl Directory for IntakeQDirectory {
    async fn search_clients(&self, query: &str) -> Result<Vec<Client>, DirectoryError> {
        self.get("/clients", &[("search", query.to_string())]).await
    }

    async fn get_client_by_email(&self, email: &str) -> Result<Option<Client>, DirectoryError> {
        let matches: Vec<Client> = self.get("/clients", &[("search", email.to_string())]).await?;
        Ok(matches.into_iter().find(|c| {
            c.email
                .as_deref()
                .is_some_and(|e| e.eq_ignore_ascii_case(email))
        }))
    }

    async fn list_appointments(
        &self,
        range: DateRange,
        status: Option<AppointmentStatus>,
    ) -> Result<Vec<Appointment>, DirectoryError> {
        let mut query = vec![
            ("startDate", range.start.format("%Y-%m-%d").to_string()),
            ("endDate", range.end.format("%Y-%m-%d").to_string()),
        ];
        if let Some(status) = &status {
            query.push(("status", status.as_str().to_string()));
        }
        self.get("/appointments", &query).await
    }

    async fn get_appointment(&self, id: &str) -> Result<Option<Appointment>, DirectoryError> {
        let resp = self
            .client
            .get(format!("{}/appointments/{id}", self.base_url))
            .header("X-Auth-Key", &self.api_key)
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(Self::decode(resp).await?))
    }

    async fn create_appointment(
        &self,
        req: &CreateAppointmentRequest,
    ) -> Result<Appointment, DirectoryError> {
        self.post("/appointments", req).await
    }

    async fn cancel_appointment(
        &self,
        id: &str,
        reason: Option<&str>,
    ) -> Result<(), DirectoryError> {
        let body = serde_json::json!({
            "appointmentId": id,
            "reason": reason,
        });
        let resp = self
            .client
            .post(format!("{}/appointments/cancellation", self.base_url))
            .header("X-Auth-Key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(DirectoryError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }

    async fn scheduling_settings(&self) -> Result<SchedulingSettings, DirectoryError> {
        self.get("/appointments/settings", &[]).await
    }

    async fn list_questionnaire_templates(
        &self,
    ) -> Result<Vec<QuestionnaireTemplate>, DirectoryError> {
        self.get("/questionnaires", &[]).await
    }

    async fn list_questionnaire_practitioners(&self) -> Result<Vec<Practitioner>, DirectoryError> {
        self.get("/questionnaires/practitioners", &[]).await
    }

    async fn send_questionnaire(
        &self,
        req: &SendQuestionnaireRequest,
    ) -> Result<QuestionnaireSend, DirectoryError> {
        self.post("/questionnaires/send", req).await
    }
}
