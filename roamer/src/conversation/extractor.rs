//! Field Extractor - one utterance in, explicitly stated trip fields out

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use super::error::ConversationError;
use super::fields::{TripField, TripFieldSet};
use crate::llm::{CompletionRequest, LlmClient, complete_json};
use crate::prompts::PromptLoader;

const SYSTEM_PROMPT: &str = "You are a data extractor. Return ONLY valid JSON. Never infer or provide defaults.";

/// Sampling temperature for extraction; low to keep the model literal
pub const EXTRACT_TEMPERATURE: f32 = 0.2;

/// Turns free text into a sparse [`TripFieldSet`]
pub struct FieldExtractor {
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptLoader>,
    max_tokens: u32,
}

impl FieldExtractor {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: Arc<PromptLoader>, max_tokens: u32) -> Self {
        Self {
            llm,
            prompts,
            max_tokens,
        }
    }

    /// Extract the fields the utterance states explicitly
    ///
    /// A missing location is not an error here; callers apply
    /// [`require_location`] after this returns.
    pub async fn extract(&self, utterance: &str) -> Result<TripFieldSet, ConversationError> {
        debug!(utterance_len = utterance.len(), "FieldExtractor::extract: called");
        let prompt = self
            .prompts
            .render("extract", &serde_json::json!({ "utterance": utterance }))
            .map_err(|e| ConversationError::Pipeline(e.to_string()))?;

        let request = CompletionRequest::single(SYSTEM_PROMPT, prompt)
            .with_temperature(EXTRACT_TEMPERATURE)
            .with_max_tokens(self.max_tokens);

        let value = complete_json(&self.llm, request).await.map_err(|e| {
            warn!(error = %e, "FieldExtractor::extract: parse error");
            ConversationError::from(e)
        })?;

        let fields = decode_fields(&value)?;
        debug!(summary = %fields.summary(), "FieldExtractor::extract: decoded");
        Ok(fields)
    }
}

/// Reject a field set without a destination
pub fn require_location(fields: TripFieldSet) -> Result<TripFieldSet, ConversationError> {
    match fields.location.as_deref() {
        Some(loc) if !loc.trim().is_empty() => Ok(fields),
        _ => {
            debug!("require_location: no location stated");
            Err(ConversationError::MissingLocation)
        }
    }
}

/// Decode and validate an extraction payload
///
/// `null` values and unknown keys are dropped; values of the wrong shape
/// make the whole payload malformed, so no partial result escapes.
pub fn decode_fields(value: &Value) -> Result<TripFieldSet, ConversationError> {
    let object = value
        .as_object()
        .ok_or_else(|| ConversationError::MalformedOutput(format!("expected a JSON object, got {}", kind_of(value))))?;

    let mut fields = TripFieldSet::new();
    for (key, raw) in object {
        let Ok(field) = key.parse::<TripField>() else {
            debug!(%key, "decode_fields: ignoring unknown key");
            continue;
        };

        match field {
            TripField::Location => fields.location = decode_text(field, raw)?,
            TripField::Duration => fields.duration = decode_duration(raw)?,
            TripField::Interests => fields.interests = decode_interests(raw)?,
            TripField::Budget => fields.budget = decode_text(field, raw)?,
            TripField::TravelType => fields.travel_type = decode_text(field, raw)?,
        }
    }

    Ok(fields)
}

fn decode_text(field: TripField, raw: &Value) -> Result<Option<String>, ConversationError> {
    match raw {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.trim().to_string()).filter(|s| !s.is_empty())),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(malformed(field, other)),
    }
}

fn decode_duration(raw: &Value) -> Result<Option<u32>, ConversationError> {
    match raw {
        Value::Null => Ok(None),
        Value::Number(n) => {
            if let Some(days) = n.as_u64() {
                return u32::try_from(days)
                    .map(Some)
                    .map_err(|_| ConversationError::MalformedOutput(format!("duration out of range: {}", days)));
            }
            match n.as_f64() {
                Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => Ok(Some(f as u32)),
                _ => Err(malformed(TripField::Duration, raw)),
            }
        }
        Value::String(s) => {
            // "5" or "5 days"
            let Some(token) = s.split_whitespace().next() else {
                return Ok(None);
            };
            token
                .parse::<u32>()
                .map(Some)
                .map_err(|_| malformed(TripField::Duration, raw))
        }
        other => Err(malformed(TripField::Duration, other)),
    }
}

fn decode_interests(raw: &Value) -> Result<Option<Vec<String>>, ConversationError> {
    let interests: Vec<String> = match raw {
        Value::Null => return Ok(None),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        other => return Err(malformed(TripField::Interests, other)),
    };

    Ok(Some(interests).filter(|i| !i.is_empty()))
}

fn malformed(field: TripField, raw: &Value) -> ConversationError {
    ConversationError::MalformedOutput(format!("unexpected {} for {}", kind_of(raw), field))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::error::ErrorKind;
    use crate::llm::client::mock::{MockLlmClient, MockReply};
    use proptest::prelude::*;
    use serde_json::{Map, json};

    /// Every key the extraction prompt asks for, all null
    fn expected_keys() -> Map<String, Value> {
        TripField::ALL
            .iter()
            .map(|f| (f.as_str().to_string(), Value::Null))
            .collect()
    }

    fn extractor(mock: Arc<MockLlmClient>) -> FieldExtractor {
        FieldExtractor::new(mock, Arc::new(PromptLoader::embedded_only()), 500)
    }

    #[tokio::test]
    async fn test_extract_location_only() {
        let mock = Arc::new(MockLlmClient::with_texts(&[
            r#"{"location": "Paris", "duration": null, "interests": null, "budget": null, "travel_type": null}"#,
        ]));
        let fields = extractor(mock.clone()).extract("Paris").await.unwrap();

        assert_eq!(fields, TripFieldSet::new().with_location("Paris"));

        let request = &mock.requests()[0];
        assert!(request.json_mode);
        assert!((request.temperature - EXTRACT_TEMPERATURE).abs() < f32::EPSILON);
        assert_eq!(request.max_tokens, 500);
        assert!(request.user_text().unwrap().contains("User input: 'Paris'"));
    }

    #[tokio::test]
    async fn test_extract_all_fields_when_provided() {
        let mock = Arc::new(MockLlmClient::with_texts(&[r#"```json
{"location": "Barcelona", "duration": 4, "interests": ["hiking", "food"], "budget": "high", "travel_type": "couple"}
```"#]));
        let fields = extractor(mock)
            .extract("Barcelona for 4 days, hiking and food, high budget, traveling with partner")
            .await
            .unwrap();

        assert_eq!(fields.location.as_deref(), Some("Barcelona"));
        assert_eq!(fields.duration, Some(4));
        assert_eq!(fields.interests, Some(vec!["hiking".to_string(), "food".to_string()]));
        assert_eq!(fields.budget.as_deref(), Some("high"));
        assert_eq!(fields.travel_type.as_deref(), Some("couple"));
    }

    #[tokio::test]
    async fn test_extract_service_failure_carries_no_fields() {
        let mock = Arc::new(MockLlmClient::new(vec![MockReply::Fail("API call failed".into())]));
        let err = extractor(mock).extract("Paris").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Service);
    }

    #[tokio::test]
    async fn test_extract_non_json_is_malformed() {
        let mock = Arc::new(MockLlmClient::with_texts(&["You should visit Paris!"]));
        let err = extractor(mock).extract("Paris").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedOutput);
    }

    #[test]
    fn test_decode_removes_null_values() {
        let fields = decode_fields(&json!({
            "location": "Rome", "duration": null, "interests": null, "budget": null
        }))
        .unwrap();
        assert_eq!(fields, TripFieldSet::new().with_location("Rome"));
    }

    #[test]
    fn test_decode_ignores_unknown_keys() {
        let fields = decode_fields(&json!({ "location": "Oslo", "weather": "cold" })).unwrap();
        assert_eq!(fields.present(), vec![TripField::Location]);
    }

    #[test]
    fn test_decode_duration_variants() {
        assert_eq!(decode_fields(&json!({ "duration": 3.0 })).unwrap().duration, Some(3));
        assert_eq!(decode_fields(&json!({ "duration": "5 days" })).unwrap().duration, Some(5));
        assert_eq!(decode_fields(&json!({ "duration": "" })).unwrap().duration, None);
        assert_eq!(decode_fields(&json!({ "duration": 0 })).unwrap().duration, Some(0));
        assert!(decode_fields(&json!({ "duration": -2 })).is_err());
        assert!(decode_fields(&json!({ "duration": 2.5 })).is_err());
        assert!(decode_fields(&json!({ "duration": "a week" })).is_err());
        assert!(decode_fields(&json!({ "duration": [3] })).is_err());
    }

    #[test]
    fn test_decode_interests_variants() {
        let fields = decode_fields(&json!({ "interests": ["hiking", "  ", 7, "food "] })).unwrap();
        assert_eq!(fields.interests, Some(vec!["hiking".to_string(), "food".to_string()]));

        let fields = decode_fields(&json!({ "interests": "museums, jazz" })).unwrap();
        assert_eq!(fields.interests, Some(vec!["museums".to_string(), "jazz".to_string()]));

        assert_eq!(decode_fields(&json!({ "interests": [] })).unwrap().interests, None);
        assert!(decode_fields(&json!({ "interests": true })).is_err());
    }

    #[test]
    fn test_decode_blank_location_is_dropped() {
        let fields = decode_fields(&json!({ "location": "   ", "duration": 2 })).unwrap();
        assert!(fields.location.is_none());
        assert_eq!(require_location(fields).unwrap_err().kind(), ErrorKind::MissingLocation);
    }

    #[test]
    fn test_decode_numeric_budget_is_stringified() {
        let fields = decode_fields(&json!({ "budget": 2000 })).unwrap();
        assert_eq!(fields.budget.as_deref(), Some("2000"));
    }

    #[test]
    fn test_decode_rejects_non_object() {
        let err = decode_fields(&json!(["Paris"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedOutput);
    }

    #[test]
    fn test_require_location() {
        let ok = require_location(TripFieldSet::new().with_location("Lima")).unwrap();
        assert_eq!(ok.location.as_deref(), Some("Lima"));

        let err = require_location(TripFieldSet::new().with_duration(3).with_interests(["museums"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingLocation);
    }

    proptest! {
        // No inference: a field the payload leaves null or omits never appears
        #[test]
        fn prop_absent_fields_never_appear(mask in proptest::collection::vec(any::<bool>(), 5)) {
            let mut payload = expected_keys();
            let samples = [
                json!("Paris"), json!(4), json!(["food"]), json!("medium"), json!("solo"),
            ];
            for (i, field) in TripField::ALL.iter().enumerate() {
                if mask[i] {
                    payload.insert(field.as_str().to_string(), samples[i].clone());
                } else if i % 2 == 0 {
                    payload.remove(field.as_str());
                }
            }

            let fields = decode_fields(&Value::Object(payload)).unwrap();
            for (i, field) in TripField::ALL.iter().enumerate() {
                prop_assert_eq!(fields.contains(*field), mask[i]);
            }
        }
    }
}
