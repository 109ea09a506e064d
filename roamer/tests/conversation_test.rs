//! Turn pipeline through the public API with a scripted model

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use roamer::config::TokenConfig;
use roamer::conversation::{
    AnalysisResult, Analyzer, ConversationState, ErrorKind, FALLBACK_QUESTION, FollowupComposer, SessionPhase,
    TripField, TripFieldSet, TurnResult,
};
use roamer::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError};
use roamer::prompts::PromptLoader;

type Script = dyn Fn(Agent, &str) -> Result<String, LlmError> + Send + Sync;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Agent {
    Extract,
    Analyze,
    Followup,
    Other,
}

/// Answers by which agent is calling, so call order does not matter
struct ScriptedClient {
    script: Box<Script>,
    calls: Mutex<Vec<Agent>>,
}

impl ScriptedClient {
    fn new(script: impl Fn(Agent, &str) -> Result<String, LlmError> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            script: Box::new(script),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<Agent> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let agent = if request.system_prompt.contains("data extractor") {
            Agent::Extract
        } else if request.system_prompt.contains("analyst") {
            Agent::Analyze
        } else if request.system_prompt.contains("friendly travel assistant") {
            Agent::Followup
        } else {
            Agent::Other
        };
        self.calls.lock().unwrap().push(agent);
        let prompt = request.user_text().unwrap_or_default().to_string();
        (self.script)(agent, &prompt).map(CompletionResponse::text)
    }
}

fn service_down() -> LlmError {
    LlmError::ApiError {
        status: 503,
        message: "service unavailable".to_string(),
    }
}

fn state_for(client: Arc<ScriptedClient>) -> ConversationState {
    ConversationState::new(client, Arc::new(PromptLoader::embedded_only()), &TokenConfig::default())
}

#[tokio::test]
async fn scenario_destination_only_asks_a_question() {
    let client = ScriptedClient::new(|agent, _| {
        Ok(match agent {
            Agent::Extract => {
                r#"{"location": "Paris", "duration": null, "interests": null, "budget": null, "travel_type": null}"#
            }
            Agent::Analyze => r#"{"provided": ["location"], "missing": ["duration", "interests"], "unclear": {}, "confidence": 35}"#,
            Agent::Followup => r#"{"question": "How many days are you planning to spend in Paris?"}"#,
            Agent::Other => "{}",
        }
        .to_string())
    });
    let mut state = state_for(client.clone());

    match state.step("Paris").await {
        TurnResult::NeedsMoreInfo {
            details,
            followup_question,
            missing_fields,
            confidence,
        } => {
            assert_eq!(details, TripFieldSet::new().with_location("Paris"));
            assert!(!followup_question.trim().is_empty());
            assert!(missing_fields.contains(&TripField::Duration));
            assert!(missing_fields.contains(&TripField::Interests));
            assert_eq!(confidence, 35);
        }
        other => panic!("expected a follow-up, got {:?}", other),
    }

    assert_eq!(client.calls(), vec![Agent::Extract, Agent::Analyze, Agent::Followup]);
    assert_eq!(state.phase(), SessionPhase::Gathering);
    assert!(state.history().iter().any(|e| e.field == "question"));
}

#[tokio::test]
async fn scenario_complete_request_is_ready() {
    let client = ScriptedClient::new(|agent, _| {
        Ok(match agent {
            Agent::Extract => r#"```json
{"location": "Barcelona", "duration": 3, "interests": ["hiking"], "budget": null, "travel_type": null}
```"#,
            Agent::Analyze => r#"{"provided": ["location", "duration", "interests"], "missing": ["budget", "travel_type"], "unclear": {}, "confidence": 85}"#,
            _ => panic!("no follow-up expected"),
        }
        .to_string())
    });
    let mut state = state_for(client);

    let expected = TripFieldSet::new()
        .with_location("Barcelona")
        .with_duration(3)
        .with_interests(["hiking"]);

    assert_eq!(
        state.step("Barcelona, 3 days, love hiking").await,
        TurnResult::Ready {
            details: expected.clone(),
            confidence: 85
        }
    );
    assert_eq!(state.accumulated_fields(), Some(&expected));
}

#[tokio::test]
async fn scenario_missing_location_fails_without_accumulating() {
    let client = ScriptedClient::new(|agent, _| {
        Ok(match agent {
            Agent::Extract => {
                r#"{"location": null, "duration": null, "interests": ["museums"], "budget": null, "travel_type": null}"#
            }
            Agent::Analyze => r#"{"provided": ["interests"], "missing": ["location", "duration"], "confidence": 20}"#,
            _ => panic!("no follow-up expected"),
        }
        .to_string())
    });
    let mut state = state_for(client.clone());

    match state.step("Just interested in museums").await {
        TurnResult::Failed { kind, error } => {
            assert_eq!(kind, ErrorKind::MissingLocation);
            assert!(!error.contains("MissingLocationError"));
        }
        other => panic!("expected failure, got {:?}", other),
    }

    // the analyzer still ran
    assert_eq!(client.calls(), vec![Agent::Extract, Agent::Analyze]);
    assert!(state.accumulated().is_empty());
    assert!(state.accumulated_fields().is_none());
    assert!(state.history().is_empty());
    assert_eq!(state.phase(), SessionPhase::Gathering);
}

#[tokio::test]
async fn scenario_second_turn_overwrites_accumulated() {
    let client = ScriptedClient::new(|agent, prompt| {
        let second_turn = prompt.contains("temples");
        Ok(match (agent, second_turn) {
            (Agent::Extract, false) => r#"{"location": "Tokyo", "budget": "high"}"#,
            (Agent::Extract, true) => r#"{"location": "Tokyo", "duration": 5, "interests": ["temples"]}"#,
            (Agent::Analyze, false) => r#"{"provided": ["location", "budget"], "missing": ["duration", "interests"]}"#,
            (Agent::Analyze, true) => r#"{"provided": ["location", "duration", "interests"], "missing": []}"#,
            (Agent::Followup, _) => r#"{"question": "How long will you stay in Tokyo?"}"#,
            (Agent::Other, _) => "{}",
        }
        .to_string())
    });
    let mut state = state_for(client);

    let first = state.step("Tokyo").await;
    assert!(matches!(first, TurnResult::NeedsMoreInfo { .. }));
    assert!(state.accumulated().is_empty());
    assert_eq!(state.last_extracted().budget.as_deref(), Some("high"));

    let second = state.step("Tokyo\nTokyo for 5 days, temples").await;
    let expected = TripFieldSet::new()
        .with_location("Tokyo")
        .with_duration(5)
        .with_interests(["temples"]);
    assert_eq!(
        second,
        TurnResult::Ready {
            details: expected.clone(),
            confidence: 0
        }
    );
    // overwritten, not merged: the budget from the first turn is gone
    assert_eq!(state.accumulated_fields(), Some(&expected));
    assert_eq!(state.last_extracted(), &expected);
}

#[tokio::test]
async fn analyzer_failure_yields_exact_fallback() {
    let client = ScriptedClient::new(|_, _| Err(service_down()));
    let analyzer = Analyzer::new(client, Arc::new(PromptLoader::embedded_only()));

    let result = analyzer.analyze("Paris").await;
    assert!(result.provided.is_empty());
    assert_eq!(
        result.missing.iter().copied().collect::<Vec<_>>(),
        vec![TripField::Location, TripField::Duration, TripField::Interests]
    );
    assert!(result.unclear.is_empty());
    assert_eq!(result.confidence, 0);
    assert_eq!(result, AnalysisResult::fallback());
}

#[tokio::test]
async fn reset_is_idempotent() {
    let client = ScriptedClient::new(|agent, _| {
        Ok(match agent {
            Agent::Extract => r#"{"location": "Rome"}"#,
            Agent::Analyze => r#"{"missing": ["duration", "interests"]}"#,
            _ => r#"{"question": "How many days?"}"#,
        }
        .to_string())
    });
    let mut state = state_for(client);
    state.step("Rome").await;
    state.add_to_history("note", "extra");
    assert!(!state.history().is_empty());

    for _ in 0..2 {
        state.reset();
        assert!(state.history().is_empty());
        assert_eq!(state.accumulated(), &TripFieldSet::new());
        assert_eq!(state.phase(), SessionPhase::Gathering);
    }
}

#[tokio::test]
async fn followup_falls_back_on_error_or_blank() {
    let prompts = Arc::new(PromptLoader::embedded_only());
    let analysis = AnalysisResult {
        missing: [TripField::Duration].into_iter().collect(),
        ..AnalysisResult::default()
    };
    let fields = TripFieldSet::new().with_location("Rome");

    let failing = FollowupComposer::new(ScriptedClient::new(|_, _| Err(service_down())), prompts.clone());
    assert_eq!(failing.compose(&fields, &analysis, &[]).await, FALLBACK_QUESTION);

    let blank = FollowupComposer::new(
        ScriptedClient::new(|_, _| Ok(r#"{"question": "  "}"#.to_string())),
        prompts.clone(),
    );
    assert_eq!(blank.compose(&fields, &analysis, &[]).await, FALLBACK_QUESTION);

    let empty_body = FollowupComposer::new(ScriptedClient::new(|_, _| Ok(String::new())), prompts);
    assert_eq!(empty_body.compose(&fields, &analysis, &[]).await, "Could you tell me more about your trip?");
}

#[tokio::test]
async fn extraction_service_error_is_a_failed_turn() {
    let client = ScriptedClient::new(|agent, _| match agent {
        Agent::Extract => Err(service_down()),
        _ => Ok(r#"{"missing": ["location"]}"#.to_string()),
    });
    let mut state = state_for(client.clone());

    let result = state.step("Somewhere warm").await;
    assert!(matches!(result, TurnResult::Failed { kind: ErrorKind::Service, .. }));
    assert_eq!(client.calls(), vec![Agent::Extract, Agent::Analyze]);
    assert!(state.history().is_empty());
}
