use std::env;

use crate::models::BusinessHours;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub webhook_secret: String,
    pub directory_api_url: String,
    pub directory_api_key: String,
    pub assistant: AssistantConfig,
}

/// The subset of configuration the workflow engine reads. Immutable once an
/// `Assistant` is constructed; a config change means building a new one.
#[derive(Clone, Debug, Default)]
pub struct AssistantConfig {
    pub default_practitioner_email: Option<String>,
    pub default_service_id: Option<String>,
    pub default_location_id: Option<String>,
    pub transfer_number: Option<String>,
    pub business_hours: BusinessHours,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            webhook_secret: env::var("WEBHOOK_SECRET").unwrap_or_default(),
            directory_api_url: env::var("DIRECTORY_API_URL")
                .unwrap_or_else(|_| "https://intakeq.com/api/v1".to_string()),
            directory_api_key: env::var("DIRECTORY_API_KEY").unwrap_or_default(),
            assistant: AssistantConfig::from_env(),
        }
    }
}

impl AssistantConfig {
    pub fn from_env() -> Self {
        Self {
            default_practitioner_email: non_empty(env::var("DEFAULT_PRACTITIONER_EMAIL").ok()),
            default_service_id: non_empty(env::var("DEFAULT_SERVICE_ID").ok()),
            default_location_id: non_empty(env::var("DEFAULT_LOCATION_ID").ok()),
            transfer_number: non_empty(env::var("TRANSFER_NUMBER").ok()),
            business_hours: business_hours_from_env(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn business_hours_from_env() -> BusinessHours {
    let start = env::var("BUSINESS_HOURS_START").unwrap_or_else(|_| "09:00".to_string());
    let end = env::var("BUSINESS_HOURS_END").unwrap_or_else(|_| "17:00".to_string());
    let days: Vec<u32> = env::var("BUSINESS_DAYS")
        .map(|v| {
            v.split(',')
                .filter_map(|d| d.trim().parse().ok())
                .collect()
        })
        .unwrap_or_else(|_| vec![1, 2, 3, 4, 5]);

    match BusinessHours::parse(&start, &end, &days) {
        Ok(hours) => hours,
        Err(e) => {
            tracing::warn!(error = %e, "invalid business hours configuration, using defaults");
            BusinessHours::default()
        }
    }
}
