use super::*;
use crate::actions::{
    ActionExecutor,
    ActionOutcome,
};
use crate::backend::{
    BackendResponse,
    ReasoningBackend,
    is_backend_error,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionState {
    AwaitingInput,
    BackendRoundTrip,
    ActionPending,
    ActionExecuting,
    AwaitingContainerChoice,
    SwitchRequested,
    Exited,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionExit {
    // Move on to the next pod in the scan
    SwitchRequested,

    // Jump straight to the pod at this (0-based) index in the scan
    SwitchTo(usize),
    Exited,
}

// Waits on `$fut`, unless the switch signal fires first; in that case the in-flight future is
// dropped (and whatever it would have returned is discarded) and we bail out of the session.
macro_rules! or_switch {
    ($self:ident, $fut:expr) => {
        tokio::select! {
            biased;
            _ = $self.switch.raised() => return Err($self.switch_requested()),
            res = $fut => res,
        }
    };
}

pub struct SessionMachine<'a> {
    backend: &'a dyn ReasoningBackend,
    executor: &'a ActionExecutor,
    switch: SwitchSignal,
    max_action_rounds: usize,
    pod_count: usize,
    state: SessionState,
}

impl<'a> SessionMachine<'a> {
    pub fn new(
        backend: &'a dyn ReasoningBackend,
        executor: &'a ActionExecutor,
        switch: SwitchSignal,
        max_action_rounds: usize,
        pod_count: usize,
    ) -> SessionMachine<'a> {
        SessionMachine {
            backend,
            executor,
            switch,
            max_action_rounds,
            pod_count,
            state: SessionState::AwaitingInput,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub async fn run(&mut self, ctx: &mut SessionContext, operator: &mut dyn Operator) -> SessionExit {
        info!("starting session for {}", ctx.focus());
        match self.run_until_exit(ctx, operator).await {
            Ok(exit) | Err(exit) => {
                info!("session for {} ended: {exit:?}", ctx.focus());
                exit
            },
        }
    }

    // Err means the session was interrupted by the switch signal; Ok is an exit the operator asked
    // for explicitly.
    async fn run_until_exit(
        &mut self,
        ctx: &mut SessionContext,
        operator: &mut dyn Operator,
    ) -> Result<SessionExit, SessionExit> {
        loop {
            self.transition(SessionState::AwaitingInput);
            let line = match or_switch!(self, operator.read_line(USER_PROMPT)) {
                Ok(Some(line)) => line,
                Ok(None) => {
                    self.transition(SessionState::Exited);
                    return Ok(SessionExit::Exited);
                },
                Err(err) => {
                    warn!("could not read operator input: {err}");
                    self.transition(SessionState::Exited);
                    return Ok(SessionExit::Exited);
                },
            };

            match parse_command(&line, self.pod_count) {
                Command::Empty => continue,
                Command::Exit => {
                    self.transition(SessionState::Exited);
                    return Ok(SessionExit::Exited);
                },
                Command::SwitchTo(idx) => {
                    self.transition(SessionState::SwitchRequested);
                    return Ok(SessionExit::SwitchTo(idx));
                },
                Command::Invalid(msg) => operator.show(SessionEvent::Warning(msg)),
                Command::Message(text) => {
                    ctx.append(Turn::UserMessage(text));
                    if let Some(exit) = self.converse(ctx, operator).await? {
                        return Ok(exit);
                    }
                },
            }
        }
    }

    // Round-trip with the backend until it reaches a conclusion (or fails, or runs out of rounds);
    // returns Some(exit) only if the operator exited while picking a container.
    async fn converse(
        &mut self,
        ctx: &mut SessionContext,
        operator: &mut dyn Operator,
    ) -> Result<Option<SessionExit>, SessionExit> {
        for round in 0..=self.max_action_rounds {
            self.transition(SessionState::BackendRoundTrip);
            let transcript = ctx.render_for_backend();
            let reqs = match or_switch!(self, self.backend.submit(&transcript)) {
                Ok(BackendResponse::Final(analysis)) => {
                    ctx.append(Turn::AssistantFinal(analysis.clone()));
                    operator.show(SessionEvent::FinalAnalysis(analysis));
                    return Ok(None);
                },
                Ok(BackendResponse::Actions(reqs)) => reqs,
                Err(err) => {
                    let msg = if is_backend_error(&err) {
                        warn!("reasoning backend round trip failed: {err}");
                        format!("Error from reasoning backend: {err}")
                    } else {
                        error!("unexpected failure during reasoning backend round trip: {err}");
                        format!("Unexpected error while talking to the reasoning backend: {err}")
                    };
                    operator.show(SessionEvent::Warning(msg));
                    return Ok(None);
                },
            };

            if round == self.max_action_rounds {
                break;
            }

            for req in reqs {
                self.transition(SessionState::ActionPending);
                let req = req.with_defaults(ctx.focus(), ctx.controller());
                ctx.append(Turn::ActionRequested(req.clone()));
                operator.show(SessionEvent::ActionRequested(req.clone()));

                let Some(res) = self.execute(req, operator).await? else {
                    return Ok(Some(SessionExit::Exited));
                };
                operator.show(SessionEvent::ActionCompleted(res.clone()));
                ctx.append(Turn::ActionCompleted(res));
            }
        }

        operator.show(SessionEvent::Warning(format!(
            "The reasoning backend did not reach a conclusion after {} rounds of actions; ask again or rephrase.",
            self.max_action_rounds
        )));
        Ok(None)
    }

    // Ok(None) means the operator closed their input (or typed exit) instead of choosing a container
    async fn execute(
        &mut self,
        mut req: ActionRequest,
        operator: &mut dyn Operator,
    ) -> Result<Option<ActionResult>, SessionExit> {
        loop {
            self.transition(SessionState::ActionExecuting);
            let candidates = match or_switch!(self, self.executor.execute(&req)) {
                ActionOutcome::Completed(res) => return Ok(Some(res)),
                ActionOutcome::ContainerSelectionRequired(candidates) => candidates,
            };

            self.transition(SessionState::AwaitingContainerChoice);
            operator.show(SessionEvent::ContainerChoice(candidates.clone()));
            match self.choose_container(&candidates, operator).await? {
                Some(container) => req.container = Some(container),
                None => {
                    self.transition(SessionState::Exited);
                    return Ok(None);
                },
            }
        }
    }

    async fn choose_container(
        &mut self,
        candidates: &[String],
        operator: &mut dyn Operator,
    ) -> Result<Option<String>, SessionExit> {
        loop {
            let line = match or_switch!(self, operator.read_line(CONTAINER_PROMPT)) {
                Ok(Some(line)) if !is_exit(&line) => line,
                Ok(_) => return Ok(None),
                Err(err) => {
                    warn!("could not read operator input: {err}");
                    return Ok(None);
                },
            };

            match parse_selection(&line, candidates.len()) {
                Some(idx) => return Ok(Some(candidates[idx].clone())),
                None => operator.show(SessionEvent::Warning("Invalid choice, try again.".into())),
            }
        }
    }

    fn switch_requested(&mut self) -> SessionExit {
        self.transition(SessionState::SwitchRequested);
        SessionExit::SwitchRequested
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            debug!("session state {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }
}
