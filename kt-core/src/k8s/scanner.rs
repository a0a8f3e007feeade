use kube::Api;
use kube::api::ListParams;
use tracing::*;

use super::container_state::status_failure_reason;
use super::*;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum UnreadyReason {
    ContainersNotReady,
    PodInitializing,
    ImagePullBackOff,
    CrashLoopBackOff,
    Pending,
    Unschedulable,
    Other(String),
}

impl From<&str> for UnreadyReason {
    fn from(reason: &str) -> UnreadyReason {
        match reason {
            "ContainersNotReady" => UnreadyReason::ContainersNotReady,
            "PodInitializing" => UnreadyReason::PodInitializing,
            "ImagePullBackOff" => UnreadyReason::ImagePullBackOff,
            "CrashLoopBackOff" => UnreadyReason::CrashLoopBackOff,
            POD_PHASE_PENDING => UnreadyReason::Pending,
            UNSCHEDULABLE_REASON => UnreadyReason::Unschedulable,
            other => UnreadyReason::Other(other.into()),
        }
    }
}

impl fmt::Display for UnreadyReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UnreadyReason::Other(reason) => f.write_str(reason),
            known => write!(f, "{known:?}"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct UnreadyPod {
    pub pod: PodRef,
    pub unready_reason: UnreadyReason,
    pub controller: Option<ControllerRef>,
}

impl fmt::Display for UnreadyPod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} (ns={}, reason={}", self.pod.name, self.pod.namespace, self.unready_reason)?;
        if let Some(controller) = self.controller.as_ref() {
            write!(f, ", {controller}")?;
        }
        write!(f, ")")
    }
}

pub struct FailureScanner {
    client: kube::Client,
    resolver: ControllerResolver,
}

impl FailureScanner {
    pub fn new(client: kube::Client) -> FailureScanner {
        let resolver = ControllerResolver::new(client.clone());
        FailureScanner { client, resolver }
    }

    // List every pod in one pass (optionally restricted to a single namespace) and return the
    // ones that aren't ready, sorted by namespace and then name.  If the list call itself fails
    // there's nothing meaningful to return, so the whole scan fails; per-pod controller lookups
    // can't fail the scan (see ControllerResolver).
    pub async fn scan(&mut self, namespace: Option<&str>) -> anyhow::Result<Vec<UnreadyPod>> {
        let pods_api: Api<corev1::Pod> = match namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        };

        let pods = match pods_api.list(&ListParams::default()).await {
            Ok(list) => list.items,
            Err(err) => bail!(ClusterError::cluster_unreachable(&format!("could not list pods: {err}"))),
        };
        info!("scanned {} pod(s)", pods.len());

        let mut not_ready: Vec<&corev1::Pod> =
            pods.iter().filter(|p| p.is_not_ready() && !p.is_completed()).collect();
        not_ready.sort_by_cached_key(|p| p.pod_ref());

        let mut unready = Vec::with_capacity(not_ready.len());
        for pod in not_ready {
            let controller = self.resolver.resolve_for(pod).await;
            unready.push(UnreadyPod {
                pod: pod.pod_ref(),
                unready_reason: unready_reason(pod),
                controller: (!controller.is_anonymous()).then_some(controller),
            });
        }

        info!("found {} unready pod(s)", unready.len());
        Ok(unready)
    }

    pub async fn list_namespaces(&self) -> anyhow::Result<Vec<String>> {
        let ns_api: Api<corev1::Namespace> = Api::all(self.client.clone());
        let list = match ns_api.list(&ListParams::default()).await {
            Ok(list) => list,
            Err(err) => bail!(ClusterError::cluster_unreachable(&format!("could not list namespaces: {err}"))),
        };

        let mut names: Vec<_> = list.items.iter().map(|ns| ns.name_any()).collect();
        names.sort();
        Ok(names)
    }
}

// Init-container failures block the rest of the pod, so they take precedence over anything the
// app containers report; after that we fall back to scheduling, the Ready condition, and finally
// the pod phase.
pub fn unready_reason(pod: &corev1::Pod) -> UnreadyReason {
    let Ok(status) = pod.status() else {
        return UnreadyReason::Other("unknown".into());
    };

    if let Some(reason) = status.init_container_statuses.iter().flatten().find_map(status_failure_reason) {
        return reason.as_str().into();
    }

    let containers = status.container_statuses.as_deref().unwrap_or_default();
    let waiting = containers
        .iter()
        .filter(|cs| !cs.ready)
        .find_map(|cs| cs.state.as_ref()?.waiting.as_ref()?.reason.clone());
    if let Some(reason) = waiting.or_else(|| containers.iter().find_map(status_failure_reason)) {
        return reason.as_str().into();
    }

    if pod
        .condition(POD_SCHEDULED_CONDITION)
        .is_some_and(|c| c.status != CONDITION_TRUE && c.reason.as_deref() == Some(UNSCHEDULABLE_REASON))
    {
        return UnreadyReason::Unschedulable;
    }

    if let Some(reason) = pod.condition(POD_READY_CONDITION).and_then(|c| c.reason.as_deref()) {
        return reason.into();
    }

    match status.phase.as_deref() {
        Some(phase) => phase.into(),
        None => UnreadyReason::Other("unknown".into()),
    }
}
