use super::*;
use crate::actions::ActionExecutor;
use crate::backend::ReasoningBackend;
use crate::config::SessionConfig;
use crate::k8s::FailureScanner;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ScanScope {
    // Ask the operator to pick one of the cluster's namespaces (or all of them) first
    Prompt,
    AllNamespaces,
    Namespace(String),
}

impl ScanScope {
    pub fn namespace(&self) -> Option<&str> {
        match self {
            ScanScope::Namespace(ns) => Some(ns),
            _ => None,
        }
    }
}

// Top-level loop: scan once, let the operator pick a pod, then run one session after another,
// moving through the scan results (cyclically) whenever the operator asks to switch.
pub struct InteractiveController<'a> {
    scanner: FailureScanner,
    backend: &'a dyn ReasoningBackend,
    executor: &'a ActionExecutor,
    switch: SwitchSignal,
    config: SessionConfig,
}

impl<'a> InteractiveController<'a> {
    pub fn new(
        scanner: FailureScanner,
        backend: &'a dyn ReasoningBackend,
        executor: &'a ActionExecutor,
        switch: SwitchSignal,
        config: SessionConfig,
    ) -> InteractiveController<'a> {
        InteractiveController { scanner, backend, executor, switch, config }
    }

    pub async fn run(&mut self, scope: &ScanScope, operator: &mut dyn Operator) -> EmptyResult {
        let scope = match scope {
            ScanScope::Prompt => match self.pick_namespace(operator).await? {
                Some(picked) => picked,
                None => return Ok(()),
            },
            given => given.clone(),
        };

        let pods = match self.scanner.scan(scope.namespace()).await {
            Ok(pods) => pods,
            Err(err) => {
                error!("scan failed: {err}");
                operator.show(SessionEvent::Warning(format!("Could not scan the cluster: {err}")));
                return Ok(());
            },
        };

        if pods.is_empty() {
            operator.show(SessionEvent::Notice("No failing pods detected.".into()));
            return Ok(());
        }

        operator.show(SessionEvent::PodList(pods.clone()));
        let Some(mut idx) = select_pod(pods.len(), operator).await? else {
            return Ok(());
        };
        self.switch.clear();

        loop {
            let target = pods[idx].clone();
            operator.show(SessionEvent::Focused(target.clone()));

            let mut ctx = SessionContext::new(target);
            let mut machine = SessionMachine::new(
                self.backend,
                self.executor,
                self.switch.clone(),
                self.config.max_action_rounds,
                pods.len(),
            );

            idx = match machine.run(&mut ctx, operator).await {
                SessionExit::Exited => return Ok(()),
                SessionExit::SwitchRequested => (idx + 1) % pods.len(),
                SessionExit::SwitchTo(next) => next,
            };
        }
    }

    // None if the namespaces couldn't be listed or the operator gave up; "0" means all namespaces
    async fn pick_namespace(&mut self, operator: &mut dyn Operator) -> anyhow::Result<Option<ScanScope>> {
        let namespaces = match self.scanner.list_namespaces().await {
            Ok(namespaces) => namespaces,
            Err(err) => {
                error!("namespace listing failed: {err}");
                operator.show(SessionEvent::Warning(format!("Could not scan the cluster: {err}")));
                return Ok(None);
            },
        };

        operator.show(SessionEvent::NamespaceList(namespaces.clone()));
        loop {
            let Some(line) = operator.read_line(NAMESPACE_PROMPT).await? else {
                return Ok(None);
            };
            if is_exit(&line) {
                return Ok(None);
            } else if line.trim() == "0" {
                return Ok(Some(ScanScope::AllNamespaces));
            }

            match parse_selection(&line, namespaces.len()) {
                Some(idx) => return Ok(Some(ScanScope::Namespace(namespaces[idx].clone()))),
                None => operator.show(SessionEvent::Warning("Invalid choice, try again.".into())),
            }
        }
    }
}

// None if the operator gave up (closed input or typed exit) instead of choosing
async fn select_pod(count: usize, operator: &mut dyn Operator) -> anyhow::Result<Option<usize>> {
    loop {
        let Some(line) = operator.read_line(POD_PROMPT).await? else {
            return Ok(None);
        };
        if is_exit(&line) {
            return Ok(None);
        }

        match parse_selection(&line, count) {
            Some(idx) => return Ok(Some(idx)),
            None => operator.show(SessionEvent::Warning("Invalid choice, try again.".into())),
        }
    }
}
