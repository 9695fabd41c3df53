//! API-Football response envelope. Every endpoint wraps its payload in the
//! same shape; only `response` varies.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub get: String,
    #[serde(default)]
    pub parameters: Value,
    /// `[]` when the request was accepted, an object or array of messages otherwise.
    #[serde(default)]
    pub errors: Value,
    #[serde(default)]
    pub results: u32,
    #[serde(default)]
    pub paging: Paging,
    pub response: T,
}

#[derive(Debug, Deserialize, Default, Clone, Copy)]
pub struct Paging {
    #[serde(default)]
    pub current: u32,
    #[serde(default)]
    pub total: u32,
}

impl<T> Envelope<T> {
    /// Errors reported inside a 200 response (bad token, unknown parameter, rate limit...).
    pub fn error_message(&self) -> Option<String> {
        let messages: Vec<String> = match &self.errors {
            Value::Array(items) => items.iter().map(value_text).collect(),
            Value::Object(fields) => fields
                .iter()
                .map(|(k, v)| format!("{k}: {}", value_text(v)))
                .collect(),
            Value::String(s) if !s.is_empty() => vec![s.clone()],
            _ => Vec::new(),
        };
        if messages.is_empty() {
            None
        } else {
            Some(messages.join("; "))
        }
    }
}

fn value_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(errors: &str) -> Envelope<Value> {
        let raw = format!(r#"{{"get": "fixtures", "errors": {errors}, "results": 0, "response": []}}"#);
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn empty_errors_are_not_an_error() {
        assert_eq!(envelope("[]").error_message(), None);
        assert_eq!(envelope("{}").error_message(), None);
    }

    #[test]
    fn object_errors_join_key_and_message() {
        let env = envelope(r#"{"token": "Error/Missing application key.", "season": "bad"}"#);
        let message = env.error_message().unwrap();
        assert!(message.contains("token: Error/Missing application key."));
        assert!(message.contains("season: bad"));
        assert_eq!(message.matches("; ").count(), 1);
    }

    #[test]
    fn array_errors_are_listed() {
        let env = envelope(r#"["rate limit", 429]"#);
        assert_eq!(env.error_message().as_deref(), Some("rate limit; 429"));
    }

    #[test]
    fn missing_paging_defaults() {
        let env: Envelope<Vec<u8>> = serde_json::from_str(r#"{"response": []}"#).unwrap();
        assert_eq!(env.paging.total, 0);
        assert!(env.response.is_empty());
    }
}
