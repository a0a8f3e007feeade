mod describe;
mod events;
mod executor;

use std::fmt;

pub use events::format_age;
pub use executor::ActionExecutor;
use serde::{
    Deserialize,
    Serialize,
};

use crate::errors::*;
use crate::k8s::ClusterError;
use crate::prelude::*;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    DescribePod,
    DescribeDeployment,
    Logs,
    GetConfigmap,
    GetEvents,
}

impl ActionType {
    pub const ALL: [ActionType; 5] = [
        ActionType::DescribePod,
        ActionType::DescribeDeployment,
        ActionType::Logs,
        ActionType::GetConfigmap,
        ActionType::GetEvents,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::DescribePod => "DESCRIBE_POD",
            ActionType::DescribeDeployment => "DESCRIBE_DEPLOYMENT",
            ActionType::Logs => "LOGS",
            ActionType::GetConfigmap => "GET_CONFIGMAP",
            ActionType::GetEvents => "GET_EVENTS",
        }
    }

    // GET_EVENTS without a name lists every event in the namespace
    fn requires_name(&self) -> bool {
        !matches!(self, ActionType::GetEvents)
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// An empty namespace or name means the backend didn't supply one; see `with_defaults`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub namespace: String,
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
}

impl ActionRequest {
    pub fn new(action_type: ActionType, namespace: &str, name: &str) -> ActionRequest {
        ActionRequest {
            action_type,
            namespace: namespace.into(),
            name: name.into(),
            container: None,
        }
    }

    pub fn with_container(mut self, container: &str) -> ActionRequest {
        self.container = Some(container.into());
        self
    }

    // Fill in whatever the backend left out from the session's focus pod (and its controller, for
    // deployments); fields the backend did supply are never overwritten.
    pub fn with_defaults(mut self, focus: &PodRef, controller: Option<&ControllerRef>) -> ActionRequest {
        match self.action_type {
            ActionType::DescribePod | ActionType::Logs | ActionType::GetEvents => {
                if self.namespace.is_empty() {
                    self.namespace.clone_from(&focus.namespace);
                }
                if self.name.is_empty() && self.namespace == focus.namespace {
                    self.name.clone_from(&focus.name);
                }
            },
            ActionType::DescribeDeployment => {
                let depl = controller.filter(|c| c.kind == ControllerKind::Deployment);
                if self.namespace.is_empty() {
                    self.namespace = depl.map_or_else(|| focus.namespace.clone(), |c| c.namespace.clone());
                }
                if self.name.is_empty()
                    && let Some(d) = depl.filter(|d| d.namespace == self.namespace)
                {
                    self.name.clone_from(&d.name);
                }
            },
            ActionType::GetConfigmap => {
                if self.namespace.is_empty() {
                    self.namespace.clone_from(&focus.namespace);
                }
            },
        }
        self
    }

    pub(crate) fn validate(&self) -> EmptyResult {
        if self.namespace.is_empty() {
            bail!(ClusterError::invalid(&format!("{} request is missing a namespace", self.action_type)));
        }
        if self.action_type.requires_name() && self.name.is_empty() {
            bail!(ClusterError::invalid(&format!("{} request is missing a name", self.action_type)));
        }
        Ok(())
    }
}

impl fmt::Display for ActionRequest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({}/{})", self.action_type, self.namespace, self.name)?;
        if let Some(c) = self.container.as_ref() {
            write!(f, " [container={c}]")?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub request: ActionRequest,
    pub output: String,
    pub succeeded: bool,
    pub error_detail: Option<String>,
}

impl ActionResult {
    pub fn ok(request: ActionRequest, output: String) -> ActionResult {
        ActionResult { request, output, succeeded: true, error_detail: None }
    }

    pub fn failed(request: ActionRequest, err: &anyhow::Error) -> ActionResult {
        ActionResult {
            request,
            output: String::new(),
            succeeded: false,
            error_detail: Some(format!("{err}")),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ActionOutcome {
    Completed(ActionResult),

    // Not an error: the request can't run until the operator picks one of these containers
    ContainerSelectionRequired(Vec<String>),
}

#[cfg(test)]
mod tests;
