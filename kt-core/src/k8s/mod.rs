mod container_state;
mod owners;
mod pod_ext;
mod scanner;

use std::fmt;

pub use container_state::ContainerStateExt;
pub use owners::ControllerResolver;
pub use pod_ext::PodExt;
pub use scanner::{
    FailureScanner,
    UnreadyPod,
    UnreadyReason,
};
use serde::{
    Deserialize,
    Serialize,
};

use crate::errors::*;
use crate::prelude::*;

err_impl! {ClusterError,
    #[error("cluster unreachable: {0}")]
    ClusterUnreachable(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("transient cluster error: {0}")]
    Transient(String),

    #[error("cluster request failed: {0}")]
    RequestFailed(String),

    #[error("invalid request: {0}")]
    Invalid(String),
}

err_impl! {KubernetesError,
    #[error("field not found in struct: {0}")]
    FieldNotFound(String),
}

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct PodRef {
    pub namespace: String,
    pub name: String,
}

impl PodRef {
    pub fn new(namespace: &str, name: &str) -> PodRef {
        PodRef { namespace: namespace.into(), name: name.into() }
    }
}

impl fmt::Display for PodRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum ControllerKind {
    Deployment,
    StatefulSet,
    DaemonSet,
    Job,
    ReplicaSet,
    Unknown,
}

impl ControllerKind {
    pub fn from_kind(kind: &str) -> ControllerKind {
        match kind {
            DEPLOYMENT_KIND => ControllerKind::Deployment,
            STATEFULSET_KIND => ControllerKind::StatefulSet,
            DAEMONSET_KIND => ControllerKind::DaemonSet,
            JOB_KIND => ControllerKind::Job,
            REPLICASET_KIND => ControllerKind::ReplicaSet,
            _ => ControllerKind::Unknown,
        }
    }
}

impl fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self {
            ControllerKind::Deployment => DEPLOYMENT_KIND,
            ControllerKind::StatefulSet => STATEFULSET_KIND,
            ControllerKind::DaemonSet => DAEMONSET_KIND,
            ControllerKind::Job => JOB_KIND,
            ControllerKind::ReplicaSet => REPLICASET_KIND,
            ControllerKind::Unknown => "Unknown",
        };
        f.write_str(kind)
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct ControllerRef {
    pub kind: ControllerKind,
    pub namespace: String,
    pub name: String,
}

impl ControllerRef {
    pub fn new(kind: ControllerKind, namespace: &str, name: &str) -> ControllerRef {
        ControllerRef { kind, namespace: namespace.into(), name: name.into() }
    }

    // A pod with no owner references at all resolves to an anonymous Unknown controller
    pub fn unknown(namespace: &str) -> ControllerRef {
        ControllerRef::new(ControllerKind::Unknown, namespace, "")
    }

    pub fn is_anonymous(&self) -> bool {
        self.kind == ControllerKind::Unknown && self.name.is_empty()
    }
}

impl fmt::Display for ControllerRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}={}", self.kind, self.name)
    }
}

pub trait KubeResourceExt {
    fn namespaced_name(&self) -> String;
}

impl<T: kube::Resource> KubeResourceExt for T {
    fn namespaced_name(&self) -> String {
        match self.namespace() {
            Some(ns) => format!("{}/{}", ns, self.name_any()),
            None => self.name_any().clone(),
        }
    }
}

// Map a kube client error onto the cluster error taxonomy; `what` names the object we were
// trying to read so that the message is useful to the operator (and the reasoning backend).
pub fn classify_kube_error(err: kube::Error, what: &str) -> anyhow::Error {
    match &err {
        kube::Error::Api(kube::core::ErrorResponse { code: 404, .. }) => ClusterError::not_found(what),
        kube::Error::Api(kube::core::ErrorResponse { code, .. }) if *code >= 500 || *code == 429 => {
            ClusterError::transient(&format!("{what}: {err}"))
        },
        kube::Error::HyperError(_) | kube::Error::Service(_) => ClusterError::transient(&format!("{what}: {err}")),
        _ => ClusterError::request_failed(&format!("{what}: {err}")),
    }
}

pub fn is_transient(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<ClusterError>(), Some(ClusterError::Transient(_)))
}

#[cfg(test)]
pub mod tests;
