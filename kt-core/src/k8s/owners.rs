use std::collections::HashMap;

use kube::Api;
use tracing::*;

use super::*;

// The ControllerResolver walks (at most) one level of indirection from a pod to the workload
// that's ultimately responsible for it: Pod -> ReplicaSet -> Deployment gets collapsed to the
// Deployment, everything else is returned as-is.  Controller ownership is never deeper than
// that for the built-in workload types, so there's no need for a general graph walk (and no
// way to get stuck following a cycle in inconsistent owner metadata).
pub struct ControllerResolver {
    client: kube::Client,
    replicaset_owners: HashMap<String, ControllerRef>,
}

impl ControllerResolver {
    pub fn new(client: kube::Client) -> ControllerResolver {
        ControllerResolver { client, replicaset_owners: HashMap::new() }
    }

    pub async fn resolve(&mut self, pod_ref: &PodRef) -> ControllerRef {
        let pods = Api::<corev1::Pod>::namespaced(self.client.clone(), &pod_ref.namespace);
        match pods.get(&pod_ref.name).await {
            Ok(pod) => self.resolve_for(&pod).await,
            Err(err) => {
                warn!("could not look up pod {pod_ref} to resolve its controller: {err}");
                ControllerRef::unknown(&pod_ref.namespace)
            },
        }
    }

    pub async fn resolve_for(&mut self, pod: &corev1::Pod) -> ControllerRef {
        let ns = pod.namespace().unwrap_or_default();
        let Some(owner) = pick_owner(pod.owner_references(), None) else {
            debug!("pod {} has no owners", pod.namespaced_name());
            return ControllerRef::unknown(&ns);
        };

        match ControllerKind::from_kind(&owner.kind) {
            ControllerKind::ReplicaSet => self.resolve_replicaset(&ns, &owner.name).await,
            kind => ControllerRef::new(kind, &ns, &owner.name),
        }
    }

    // A failure on this second hop is deliberately non-fatal; the ReplicaSet is still
    // diagnostically useful, so we hand that back instead of an error.
    async fn resolve_replicaset(&mut self, ns: &str, rs_name: &str) -> ControllerRef {
        let rs_ref = ControllerRef::new(ControllerKind::ReplicaSet, ns, rs_name);
        let key = format!("{ns}/{rs_name}");
        if let Some(cached) = self.replicaset_owners.get(&key) {
            debug!("found controller {cached} for replicaset {key} in cache");
            return cached.clone();
        }

        let replicasets = Api::<appsv1::ReplicaSet>::namespaced(self.client.clone(), ns);
        let rs = match replicasets.get(rs_name).await {
            Ok(rs) => rs,
            Err(err) => {
                warn!("could not look up replicaset {key}, falling back to it as the controller: {err}");
                return rs_ref;
            },
        };

        let controller = match pick_owner(rs.owner_references(), Some(DEPLOYMENT_KIND)) {
            Some(depl) => ControllerRef::new(ControllerKind::Deployment, ns, &depl.name),
            None => rs_ref,
        };

        debug!("resolved replicaset {key} to {controller}");
        self.replicaset_owners.insert(key, controller.clone());
        controller
    }
}

// Prefer the owner reference flagged as the managing controller, falling back to the first one;
// if `kind` is given, only owners of that kind are considered.
fn pick_owner<'a>(owners: &'a [metav1::OwnerReference], kind: Option<&str>) -> Option<&'a metav1::OwnerReference> {
    let mut candidates = owners.iter().filter(|rf| kind.is_none_or(|k| rf.kind == k));
    let first = candidates.clone().next();
    candidates.find(|rf| rf.controller == Some(true)).or(first)
}
