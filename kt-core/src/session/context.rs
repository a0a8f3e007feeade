use super::*;
use crate::backend::TranscriptMessage;

#[derive(Clone, Debug, PartialEq)]
pub enum Turn {
    UserMessage(String),
    ActionRequested(ActionRequest),
    ActionCompleted(ActionResult),
    AssistantFinal(FinalAnalysis),
}

// The append-only record of one focus period.  Nothing here is ever truncated; whatever the
// operator is shown may be abbreviated, but the backend always sees full action output.
#[derive(Clone, Debug)]
pub struct SessionContext {
    target: UnreadyPod,
    turns: Vec<Turn>,
}

impl SessionContext {
    pub fn new(target: UnreadyPod) -> SessionContext {
        SessionContext { target, turns: vec![] }
    }

    pub fn target(&self) -> &UnreadyPod {
        &self.target
    }

    pub fn focus(&self) -> &PodRef {
        &self.target.pod
    }

    pub fn controller(&self) -> Option<&ControllerRef> {
        self.target.controller.as_ref()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    fn preamble(&self) -> String {
        let pod = &self.target.pod;
        let mut preamble = format!(
            "Pod {} in namespace {} is failing: {}",
            pod.name, pod.namespace, self.target.unready_reason
        );
        if let Some(c) = self.controller() {
            preamble += &format!("\nIt is managed by {} {}/{}.", c.kind, c.namespace, c.name);
        }
        preamble
    }

    pub fn render_for_backend(&self) -> Vec<TranscriptMessage> {
        let mut transcript = vec![TranscriptMessage::user(&self.preamble())];
        for turn in &self.turns {
            let msg = match turn {
                Turn::UserMessage(text) => TranscriptMessage::user(text),
                Turn::ActionRequested(req) => TranscriptMessage::assistant(&format!("Requested action: {req}")),
                Turn::ActionCompleted(res) => TranscriptMessage::user(&render_result(res)),
                Turn::AssistantFinal(analysis) => TranscriptMessage::assistant(&analysis.to_string()),
            };
            transcript.push(msg);
        }
        transcript
    }
}

fn render_result(res: &ActionResult) -> String {
    match res.error_detail.as_ref() {
        _ if res.succeeded => format!("# Result of {}\n{}", res.request, res.output),
        Some(detail) => format!("# {} failed\n{detail}", res.request),
        None => format!("# {} failed", res.request),
    }
}
