//! The remote API's uniform response wrapper.

use serde::{Deserialize, Serialize};

use crate::remote::error::FetchError;

/// Comment reported when a FAILED envelope carries none.
pub const GENERIC_FAILURE: &str = "API Error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum EnvelopeStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "FAILED")]
    Failed,
}

/// `{"status": "OK", "result": ...}` or `{"status": "FAILED", "comment": ...}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Envelope<T> {
    pub status: EnvelopeStatus,
    pub result: Option<T>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl<T> Envelope<T> {
    pub fn into_result(self) -> Result<T, FetchError> {
        match (self.status, self.result) {
            (EnvelopeStatus::Ok, Some(result)) => Ok(result),
            (EnvelopeStatus::Ok, None) => {
                Err(FetchError::Transient("OK envelope without result".to_string()))
            }
            (EnvelopeStatus::Failed, _) => Err(FetchError::RemoteRejected(
                self.comment
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| GENERIC_FAILURE.to_string()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: serde_json::Value) -> Result<Vec<u32>, FetchError> {
        serde_json::from_value::<Envelope<Vec<u32>>>(value)
            .unwrap()
            .into_result()
    }

    #[test]
    fn test_ok_envelope() {
        assert_eq!(decode(json!({"status": "OK", "result": [1, 2]})), Ok(vec![1, 2]));
    }

    #[test]
    fn test_failed_envelope_comment() {
        assert_eq!(
            decode(json!({"status": "FAILED", "comment": "handles: User not found"})),
            Err(FetchError::RemoteRejected("handles: User not found".into()))
        );
    }

    #[test]
    fn test_failed_without_comment_uses_generic() {
        assert_eq!(
            decode(json!({"status": "FAILED"})),
            Err(FetchError::RemoteRejected(GENERIC_FAILURE.into()))
        );
    }

    #[test]
    fn test_ok_without_result_is_transient() {
        assert!(matches!(
            decode(json!({"status": "OK"})),
            Err(FetchError::Transient(_))
        ));
    }

    #[test]
    fn test_unknown_status_does_not_decode() {
        let parsed = serde_json::from_value::<Envelope<u32>>(json!({"status": "MAYBE"}));
        assert!(parsed.is_err());
    }
}
