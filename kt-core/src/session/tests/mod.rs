mod command_test;

use std::collections::VecDeque;
use std::sync::{
    Arc,
    Mutex,
};

use kt_testutils::*;
use rstest::*;

use super::*;
use crate::actions::{
    ActionExecutor,
    ActionType,
};
use crate::backend::{
    BackendError,
    BackendResponse,
    MockReasoningBackend,
    TranscriptMessage,
};
use crate::config::ActionsConfig;
use crate::k8s::UnreadyReason;

enum Step {
    Line(&'static str),
    Switch,
    Eof,
}

// Plays back a fixed script of operator input; once the script runs out it blocks forever, the
// same way a real terminal would while waiting for the next line.
struct ScriptedOperator {
    steps: VecDeque<Step>,
    switch: SwitchSignal,
    events: Vec<SessionEvent>,
    prompts: Vec<String>,
}

impl ScriptedOperator {
    fn new(steps: Vec<Step>, switch: &SwitchSignal) -> ScriptedOperator {
        ScriptedOperator {
            steps: steps.into(),
            switch: switch.clone(),
            events: vec![],
            prompts: vec![],
        }
    }

    fn warnings(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Warning(msg) => Some(msg.clone()),
                _ => None,
            })
            .collect()
    }

    fn focused(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Focused(target) => Some(target.pod.name.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Operator for ScriptedOperator {
    async fn read_line(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        self.prompts.push(prompt.into());
        match self.steps.pop_front() {
            Some(Step::Line(line)) => Ok(Some(line.into())),
            Some(Step::Eof) => Ok(None),
            Some(Step::Switch) => {
                self.switch.raise();
                std::future::pending().await
            },
            None => std::future::pending().await,
        }
    }

    fn show(&mut self, event: SessionEvent) {
        self.events.push(event);
    }
}

type SeenTranscripts = Arc<Mutex<Vec<Vec<TranscriptMessage>>>>;

// A backend that answers with `responses` in order and records every transcript it was sent
fn scripted_backend(responses: Vec<anyhow::Result<BackendResponse>>) -> (MockReasoningBackend, SeenTranscripts) {
    let seen: SeenTranscripts = Arc::new(Mutex::new(vec![]));
    let seen_inner = seen.clone();
    let mut responses = VecDeque::from(responses);

    let mut backend = MockReasoningBackend::new();
    backend.expect_submit().times(responses.len()).returning(move |transcript| {
        seen_inner.lock().unwrap().push(transcript.to_vec());
        responses.pop_front().unwrap()
    });
    (backend, seen)
}

fn build_executor(client: kube::Client) -> ActionExecutor {
    ActionExecutor::new(client, &ActionsConfig { retry_delay_ms: 1, ..Default::default() })
}

fn unready(ns: &str, name: &str) -> UnreadyPod {
    UnreadyPod {
        pod: PodRef::new(ns, name),
        unready_reason: UnreadyReason::CrashLoopBackOff,
        controller: Some(ControllerRef::new(ControllerKind::Deployment, ns, TEST_DEPLOYMENT)),
    }
}

fn final_analysis() -> BackendResponse {
    BackendResponse::Final(FinalAnalysis {
        root_cause: "The app cannot reach its database".into(),
        remediation: "1. Fix DATABASE_URL in the configmap\n2. Restart the deployment".into(),
    })
}
