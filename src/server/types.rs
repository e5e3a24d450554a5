use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptRequest {
    pub input: String,
}

impl PromptRequest {
    /// Decodes a request body. Only a JSON object is accepted: serde's
    /// derived struct visitor would otherwise take `["text"]` as a sequence.
    pub fn from_slice(body: &[u8]) -> Result<Self, String> {
        let value: Value = serde_json::from_slice(body).map_err(|e| e.to_string())?;
        match value {
            Value::Object(_) => serde_json::from_value(value).map_err(|e| e.to_string()),
            other => Err(format!(
                "invalid type: expected a JSON object, found {}",
                json_kind(&other)
            )),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptResponse {
    pub input: String,
    pub response: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_prompt_response_preserves_unicode_and_control_chars() {
        let original = PromptResponse {
            input: "héllo \u{1F600}\t\"quoted\"\n\u{0000}\u{001b}[0m".to_string(),
            response: "こんにちは\r\n\\ backslash \u{2028} line sep".to_string(),
        };

        let encoded = serde_json::to_string(&original).unwrap();
        let decoded: PromptResponse = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded, original);
        assert_eq!(decoded.input.as_bytes(), original.input.as_bytes());
    }

    #[test]
    fn test_prompt_request_rejects_non_objects() {
        for body in [r#"["hello"]"#, r#""hello""#, "42", "null", "true"] {
            let err = PromptRequest::from_slice(body.as_bytes()).unwrap_err();
            assert!(err.contains("expected a JSON object"), "{body}: {err}");
        }
    }

    #[test]
    fn test_prompt_request_from_object() {
        let request = PromptRequest::from_slice(br#"{"input": "hello"}"#).unwrap();
        assert_eq!(request.input, "hello");

        let err = PromptRequest::from_slice(b"{}").unwrap_err();
        assert!(err.contains("missing field `input`"));
    }

    #[test]
    fn test_prompt_request_ignores_unknown_fields() {
        let request: PromptRequest =
            serde_json::from_str(r#"{"input": "hi", "temperature": 0.2}"#).unwrap();
        assert_eq!(request.input, "hi");
    }
}
