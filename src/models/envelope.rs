use serde::{Deserialize, Serialize};

/// Wrapper the backend puts around every response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn ok_with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_data_is_none() {
        let env: Envelope<i64> =
            serde_json::from_str(r#"{"success":true,"message":"Review added successfully"}"#)
                .unwrap();
        assert!(env.success);
        assert!(env.data.is_none());
        assert_eq!(env.message.as_deref(), Some("Review added successfully"));
    }

    #[test]
    fn test_error_envelope_skips_data() {
        let json = serde_json::to_value(Envelope::<i64>::error("nope")).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "message": "nope"}));
    }
}
