//! Test doubles shared by the use-case tests.

use crate::ports::call_logger::{CallEvent, CallLogger};
use crate::ports::evaluation_repository::{EvaluationRepository, RepositoryError};
use crate::ports::model_client::{GatewayError, LlmGateway, ModelClient};
use crate::ports::profile_data::{ProfileDataError, ProfileDataSource};
use async_trait::async_trait;
use navigator_domain::{
    ChunkSpec, EvaluationReport, KeywordEntry, Model, ProfileId, ProfileSummary, QuestionId,
};
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Valid chunk response giving every question the same four scores
pub(crate) fn chunk_response(chunk: &ChunkSpec, scores: [u8; 4]) -> Value {
    chunk_response_by_question(chunk, |_| scores)
}

/// Valid chunk response with per-question scores, in canonical profile order
pub(crate) fn chunk_response_by_question(
    chunk: &ChunkSpec,
    scores: impl Fn(&QuestionId) -> [u8; 4],
) -> Value {
    let mut questions = serde_json::Map::new();
    for question in &chunk.question_ids {
        let mut row = serde_json::Map::new();
        for (profile, score) in ProfileId::ALL.iter().zip(scores(question)) {
            row.insert(
                profile.to_string(),
                json!({ "found": ["consensus"], "missing": [], "score": score }),
            );
        }
        questions.insert(question.to_string(), Value::Object(row));
    }
    json!({ "scores": questions })
}

pub(crate) fn final_response(profile: &str, confidence: &str) -> Value {
    json!({
        "recommendation": {
            "best_for_production": profile,
            "confidence": confidence,
            "reasoning": "Scored highest on most questions."
        }
    })
}

/// Model client replaying a script of responses
pub(crate) struct ScriptedClient {
    model: Model,
    script: Mutex<VecDeque<Result<Value, GatewayError>>>,
    latency: Duration,
    prompts: Mutex<Vec<String>>,
    call_times: Mutex<Vec<Instant>>,
}

impl ScriptedClient {
    pub(crate) fn new(model: &str, script: Vec<Result<Value, GatewayError>>) -> Self {
        Self {
            model: model.parse().unwrap(),
            script: Mutex::new(script.into()),
            latency: Duration::ZERO,
            prompts: Mutex::new(Vec::new()),
            call_times: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub(crate) fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub(crate) fn call_times(&self) -> Vec<Instant> {
        self.call_times.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    fn model(&self) -> &Model {
        &self.model
    }

    async fn call(&self, prompt: &str, _system_prompt: &str) -> Result<Value, GatewayError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.call_times.lock().unwrap().push(Instant::now());
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(GatewayError::Transport("script exhausted".into())))
    }
}

/// Gateway handing out scripted clients by model id
#[derive(Default)]
pub(crate) struct ScriptedGateway {
    clients: HashMap<String, Arc<ScriptedClient>>,
    creation_errors: HashMap<String, GatewayError>,
}

impl ScriptedGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_client(mut self, client: Arc<ScriptedClient>) -> Self {
        self.clients.insert(client.model().to_string(), client);
        self
    }

    pub(crate) fn with_creation_error(mut self, model: &str, error: GatewayError) -> Self {
        self.creation_errors.insert(model.to_string(), error);
        self
    }
}

#[async_trait]
impl LlmGateway for ScriptedGateway {
    async fn create_client(&self, model: &Model) -> Result<Arc<dyn ModelClient>, GatewayError> {
        let id = model.to_string();
        if let Some(err) = self.creation_errors.get(&id) {
            return Err(err.clone());
        }
        self.clients
            .get(&id)
            .map(|c| Arc::clone(c) as Arc<dyn ModelClient>)
            .ok_or(GatewayError::ModelNotAvailable(id))
    }
}

/// Small in-memory keyword data for all four profiles
pub(crate) struct StaticProfiles {
    missing: Option<ProfileId>,
}

impl StaticProfiles {
    pub(crate) fn new() -> Self {
        Self { missing: None }
    }

    pub(crate) fn without(mut self, profile: ProfileId) -> Self {
        self.missing = Some(profile);
        self
    }
}

impl ProfileDataSource for StaticProfiles {
    fn load(&self, profile: ProfileId) -> Result<ProfileSummary, ProfileDataError> {
        if self.missing == Some(profile) {
            return Err(ProfileDataError::NotFound {
                profile,
                location: format!("memory://{}", profile),
            });
        }
        Ok(ProfileSummary {
            profile,
            document_count: 3,
            keywords: ["consensus", "replication", "quorum"]
                .iter()
                .enumerate()
                .map(|(i, term)| KeywordEntry {
                    term: term.to_string(),
                    frequency: (i + 1) as u32,
                })
                .collect(),
        })
    }
}

/// Repository keeping every saved snapshot
#[derive(Default)]
pub(crate) struct InMemoryRepository {
    saves: Mutex<Vec<EvaluationReport>>,
}

impl InMemoryRepository {
    pub(crate) fn with_report(report: EvaluationReport) -> Self {
        Self {
            saves: Mutex::new(vec![report]),
        }
    }

    pub(crate) fn save_count(&self) -> usize {
        self.saves.lock().unwrap().len()
    }

    pub(crate) fn last(&self) -> Option<EvaluationReport> {
        self.saves.lock().unwrap().last().cloned()
    }
}

impl EvaluationRepository for InMemoryRepository {
    fn load(&self) -> Result<Option<EvaluationReport>, RepositoryError> {
        Ok(self.last())
    }

    fn save(&self, report: &EvaluationReport) -> Result<(), RepositoryError> {
        self.saves.lock().unwrap().push(report.clone());
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct RecordingCallLogger {
    events: Mutex<Vec<(String, Value)>>,
}

impl RecordingCallLogger {
    pub(crate) fn events(&self) -> Vec<(String, Value)> {
        self.events.lock().unwrap().clone()
    }
}

impl CallLogger for RecordingCallLogger {
    fn log(&self, event: CallEvent) {
        self.events
            .lock()
            .unwrap()
            .push((event.event_type.to_string(), event.payload));
    }
}
