mod context;
mod controller;
mod machine;

use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use tokio::sync::Notify;
use tracing::*;

pub use context::{
    SessionContext,
    Turn,
};
pub use controller::{
    InteractiveController,
    ScanScope,
};
pub use machine::{
    SessionExit,
    SessionMachine,
    SessionState,
};

use crate::actions::{
    ActionRequest,
    ActionResult,
};
use crate::backend::FinalAnalysis;
use crate::k8s::UnreadyPod;
use crate::prelude::*;

pub const USER_PROMPT: &str = "👤 You: ";
pub const NAMESPACE_PROMPT: &str = "Select a namespace (number): ";
pub const POD_PROMPT: &str = "Select a pod (number): ";
pub const CONTAINER_PROMPT: &str = "Select a container (number): ";

// Everything the session wants the operator to see; how it's rendered is up to the Operator.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    NamespaceList(Vec<String>),
    PodList(Vec<UnreadyPod>),
    Focused(UnreadyPod),
    ActionRequested(ActionRequest),
    ActionCompleted(ActionResult),
    ContainerChoice(Vec<String>),
    FinalAnalysis(FinalAnalysis),
    Warning(String),
    Notice(String),
}

// The operator-facing side of a session.  `read_line` must be cancel-safe: the session drops the
// in-flight future whenever the switch signal fires, and a later call has to pick up cleanly.
#[async_trait]
pub trait Operator: Send {
    // Ok(None) means the operator's input is closed
    async fn read_line(&mut self, prompt: &str) -> anyhow::Result<Option<String>>;
    fn show(&mut self, event: SessionEvent);
}

// Single-slot "switch to the next pod" signal; raising it more than once before anyone waits on it
// still only delivers one switch.
#[derive(Clone, Debug, Default)]
pub struct SwitchSignal(Arc<Notify>);

impl SwitchSignal {
    pub fn new() -> SwitchSignal {
        SwitchSignal::default()
    }

    pub fn raise(&self) {
        self.0.notify_one();
    }

    pub async fn raised(&self) {
        self.0.notified().await
    }

    pub fn clear(&self) {
        if self.0.notified().now_or_never().is_some() {
            debug!("discarded stale switch request");
        }
    }
}

pub(crate) enum Command {
    Empty,
    Exit,
    SwitchTo(usize),
    Invalid(String),
    Message(String),
}

pub(crate) fn is_exit(line: &str) -> bool {
    EXIT_COMMANDS.iter().any(|cmd| line.trim().eq_ignore_ascii_case(cmd))
}

// 1-based selection into a list of `len` items, returned as a 0-based index
pub fn parse_selection(line: &str, len: usize) -> Option<usize> {
    line.trim().parse::<usize>().ok().filter(|n| (1..=len).contains(n)).map(|n| n - 1)
}

pub(crate) fn parse_command(line: &str, pod_count: usize) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Empty;
    } else if is_exit(trimmed) {
        return Command::Exit;
    }

    let mut words = trimmed.split_whitespace();
    if words.next().is_some_and(|w| w.eq_ignore_ascii_case(SWITCH_COMMAND)) {
        let args: Vec<_> = words.collect();
        return match args.as_slice() {
            [n] => match parse_selection(n, pod_count) {
                Some(idx) => Command::SwitchTo(idx),
                None => Command::Invalid(format!("Invalid choice {n}; pick a pod between 1 and {pod_count}.")),
            },
            _ => Command::Invalid("Invalid switch command. Use 'switch <number>'.".into()),
        };
    }

    Command::Message(trimmed.into())
}

#[cfg(test)]
mod tests;
