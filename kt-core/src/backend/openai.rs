use serde::Deserialize;
use serde_json::json;
use tracing::*;

use super::*;
use crate::actions::ActionType;
use crate::config::BackendConfig;

const SYSTEM_PROMPT: &str = "\
You are a Kubernetes debugging assistant working inside an interactive terminal session. The \
session is focused on a single pod that is not ready. You can gather more evidence by requesting \
one or more read-only actions against the cluster (DESCRIBE_POD, DESCRIBE_DEPLOYMENT, LOGS, \
GET_CONFIGMAP, GET_EVENTS); their output will be sent back to you. Leave namespace or name null to \
target the focused pod. Once you have enough evidence, conclude with a final analysis giving the \
root cause and concrete remediation steps, one step per line. Always answer with JSON that \
matches the response schema.";

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
    refusal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ChatError {
    error: ChatErrorBody,
}

#[derive(Debug, Deserialize)]
struct WireAction {
    #[serde(rename = "type")]
    action_type: ActionType,
    namespace: Option<String>,
    name: Option<String>,
    container: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum WireResponse {
    Actions { actions: Vec<WireAction> },
    Final { root_cause: String, remediation: String },
}

#[derive(Debug, Deserialize)]
struct WireEnvelope {
    response: WireResponse,
}

// The strict response schema the model is held to; the top-level object has to be an object, so
// the actual tagged response lives under `response`.
fn response_format() -> serde_json::Value {
    let action_types: Vec<_> = ActionType::ALL.iter().map(|at| at.as_str()).collect();
    let nullable_string = json!({"type": ["string", "null"]});
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "triage_response",
            "strict": true,
            "schema": {
                "type": "object",
                "additionalProperties": false,
                "required": ["response"],
                "properties": {
                    "response": {
                        "anyOf": [
                            {
                                "type": "object",
                                "additionalProperties": false,
                                "required": ["kind", "actions"],
                                "properties": {
                                    "kind": {"type": "string", "enum": ["actions"]},
                                    "actions": {
                                        "type": "array",
                                        "items": {
                                            "type": "object",
                                            "additionalProperties": false,
                                            "required": ["type", "namespace", "name", "container"],
                                            "properties": {
                                                "type": {"type": "string", "enum": action_types},
                                                "namespace": nullable_string,
                                                "name": nullable_string,
                                                "container": nullable_string,
                                            },
                                        },
                                    },
                                },
                            },
                            {
                                "type": "object",
                                "additionalProperties": false,
                                "required": ["kind", "root_cause", "remediation"],
                                "properties": {
                                    "kind": {"type": "string", "enum": ["final"]},
                                    "root_cause": {"type": "string"},
                                    "remediation": {"type": "string"},
                                },
                            },
                        ],
                    },
                },
            },
        },
    })
}

// Turn the model's structured reply into a BackendResponse; anything that doesn't fit the schema
// (including an empty action list, which would leave the session with nothing to do) is malformed.
pub(super) fn parse_content(content: &str) -> anyhow::Result<BackendResponse> {
    let envelope: WireEnvelope = serde_json::from_str(content)
        .map_err(|err| BackendError::malformed_response(&format!("{err}: {content}")))?;

    match envelope.response {
        WireResponse::Actions { actions } => {
            if actions.is_empty() {
                bail!(BackendError::malformed_response("no actions in action response"));
            }
            let reqs = actions
                .into_iter()
                .map(|wa| ActionRequest {
                    action_type: wa.action_type,
                    namespace: wa.namespace.unwrap_or_default(),
                    name: wa.name.unwrap_or_default(),
                    container: wa.container.filter(|c| !c.is_empty()),
                })
                .collect();
            Ok(BackendResponse::Actions(reqs))
        },
        WireResponse::Final { root_cause, remediation } => {
            if root_cause.trim().is_empty() {
                bail!(BackendError::malformed_response("final analysis has no root cause"));
            }
            Ok(BackendResponse::Final(FinalAnalysis { root_cause, remediation }))
        },
    }
}

pub struct OpenAiBackend {
    client: reqwest::Client,
    url: String,
    model: String,
    api_key: String,
    temperature: Option<f32>,
}

impl OpenAiBackend {
    pub fn new(config: &BackendConfig, api_key: &str) -> OpenAiBackend {
        OpenAiBackend {
            client: reqwest::Client::new(),
            url: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key: api_key.into(),
            temperature: config.temperature,
        }
    }

    fn build_body(&self, transcript: &[TranscriptMessage]) -> serde_json::Value {
        let mut messages = vec![TranscriptMessage::system(SYSTEM_PROMPT)];
        messages.extend_from_slice(transcript);

        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "response_format": response_format(),
        });
        if let Some(t) = self.temperature {
            body["temperature"] = json!(t);
        }
        body
    }
}

#[async_trait]
impl ReasoningBackend for OpenAiBackend {
    async fn submit(&self, transcript: &[TranscriptMessage]) -> anyhow::Result<BackendResponse> {
        debug!("submitting {} transcript message(s) to {}", transcript.len(), self.url);
        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&self.build_body(transcript))
            .send()
            .await
            .map_err(|err| BackendError::unavailable(&format!("request failed: {err}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|err| BackendError::unavailable(&format!("could not read response: {err}")))?;

        if !status.is_success() {
            let msg = match serde_json::from_str::<ChatError>(&body) {
                Ok(e) => e.error.message,
                Err(_) => body,
            };
            bail!(BackendError::unavailable(&format!("{status}: {msg}")));
        }

        let chat: ChatResponse = serde_json::from_str(&body)
            .map_err(|err| BackendError::malformed_response(&format!("could not parse response: {err}")))?;
        let Some(message) = chat.choices.into_iter().next().map(|c| c.message) else {
            bail!(BackendError::malformed_response("response has no choices"));
        };

        match (message.content, message.refusal) {
            (Some(content), _) if !content.is_empty() => parse_content(&content),
            (_, Some(refusal)) => bail!(BackendError::malformed_response(&format!("model refused: {refusal}"))),
            _ => bail!(BackendError::malformed_response("response has no content")),
        }
    }
}
