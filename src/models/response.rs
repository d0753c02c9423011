use serde::{Deserialize, Serialize};

/// The single speech-ready payload returned to the voice platform. Every
/// `process_command` invocation produces exactly one of these, whatever
/// happened along the way.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceResponse {
    pub message: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_call: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl VoiceResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: true,
            end_call: None,
            transfer_number: None,
            data: None,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: false,
            end_call: None,
            transfer_number: None,
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_transfer(mut self, number: Option<&str>) -> Self {
        self.transfer_number = number.map(|n| n.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_camel_case_and_omits_none() {
        let resp = VoiceResponse::ok("All set");
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["message"], "All set");
        assert_eq!(json["success"], true);
        assert!(json.get("transferNumber").is_none());
        assert!(json.get("endCall").is_none());
    }

    #[test]
    fn test_transfer_number_serialized_when_set() {
        let resp = VoiceResponse::fail("Let me transfer you").with_transfer(Some("+15551234567"));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["transferNumber"], "+15551234567");
        assert_eq!(json["success"], false);
    }
}
