use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha1::Sha1;

use crate::errors::AppError;
use crate::models::VoiceResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceWebhookPayload {
    pub transcript: String,
    #[serde(default)]
    pub call_id: Option<String>,
}

fn validate_signature(secret: &str, signature: &str, body: &str) -> bool {
    let mut mac = match Hmac::<Sha1>::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(body.as_bytes());
    let expected = base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes());
    expected == signature
}

/// The single inbound surface: a signed transcript in, one speech-ready
/// response out. The handler itself never produces an error response for a
/// well-formed, authenticated request — degraded paths are spoken, not
/// raised.
pub async fn voice_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<VoiceResponse>, AppError> {
    // Validate the signature (skip if no secret is configured — dev mode)
    if !state.config.webhook_secret.is_empty() {
        let signature = headers
            .get("x-webhook-signature")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if signature.is_empty() {
            tracing::warn!("missing X-Webhook-Signature header");
            return Err(AppError::Unauthorized);
        }
        if !validate_signature(&state.config.webhook_secret, signature, &body) {
            tracing::warn!("invalid webhook signature");
            return Err(AppError::Unauthorized);
        }
    }

    let payload: VoiceWebhookPayload = serde_json::from_str(&body)
        .map_err(|e| AppError::BadRequest(format!("invalid payload: {e}")))?;

    let call_id = payload
        .call_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    tracing::info!(
        call_id = %call_id,
        transcript = %payload.transcript,
        "incoming voice command"
    );

    let response = state.assistant.process_command(&payload.transcript).await;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_round_trip() {
        let secret = "test-secret";
        let body = r#"{"transcript":"hello"}"#;

        let mut mac = Hmac::<Sha1>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body.as_bytes());
        let signature =
            base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes());

        assert!(validate_signature(secret, &signature, body));
        assert!(!validate_signature(secret, &signature, "tampered body"));
        assert!(!validate_signature(secret, "bogus", body));
    }
}
