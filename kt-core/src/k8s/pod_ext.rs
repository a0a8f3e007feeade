use super::*;

// Helper functions to get at the bits of a pod's spec and status that matter for triage
pub trait PodExt {
    fn spec(&self) -> anyhow::Result<&corev1::PodSpec>;
    fn status(&self) -> anyhow::Result<&corev1::PodStatus>;
    fn pod_ref(&self) -> PodRef;
    fn phase(&self) -> Option<&str>;
    fn condition(&self, type_: &str) -> Option<&corev1::PodCondition>;
    fn is_ready(&self) -> bool;
    fn is_not_ready(&self) -> bool;
    fn is_completed(&self) -> bool;
    fn container_names(&self) -> anyhow::Result<Vec<String>>;
}

impl PodExt for corev1::Pod {
    fn spec(&self) -> anyhow::Result<&corev1::PodSpec> {
        match self.spec.as_ref() {
            None => bail!(KubernetesError::field_not_found("pod spec")),
            Some(ps) => Ok(ps),
        }
    }

    fn status(&self) -> anyhow::Result<&corev1::PodStatus> {
        match self.status.as_ref() {
            None => bail!(KubernetesError::field_not_found("pod status")),
            Some(ps) => Ok(ps),
        }
    }

    fn pod_ref(&self) -> PodRef {
        PodRef::new(&self.namespace().unwrap_or_default(), &self.name_any())
    }

    fn phase(&self) -> Option<&str> {
        self.status.as_ref()?.phase.as_deref()
    }

    fn condition(&self, type_: &str) -> Option<&corev1::PodCondition> {
        self.status.as_ref()?.conditions.as_ref()?.iter().find(|c| c.type_ == type_)
    }

    fn is_ready(&self) -> bool {
        self.condition(POD_READY_CONDITION).is_some_and(|c| c.status == CONDITION_TRUE)
    }

    // A pod is "not ready" if it isn't passing readiness, or if it hasn't made it to
    // Running/Succeeded; the second clause catches pods that have no conditions yet.
    fn is_not_ready(&self) -> bool {
        let settled = matches!(self.phase(), Some(POD_PHASE_RUNNING | POD_PHASE_SUCCEEDED));
        !self.is_ready() || !settled
    }

    fn is_completed(&self) -> bool {
        self.phase() == Some(POD_PHASE_SUCCEEDED)
            && self
                .condition(POD_READY_CONDITION)
                .is_some_and(|c| c.reason.as_deref() == Some(POD_COMPLETED_REASON))
    }

    // Init containers first, then app containers, in definition order and without duplicates
    fn container_names(&self) -> anyhow::Result<Vec<String>> {
        let spec = self.spec()?;
        let mut names: Vec<String> = vec![];
        let all = spec.init_containers.iter().flatten().chain(spec.containers.iter());
        for c in all {
            if !names.contains(&c.name) {
                names.push(c.name.clone());
            }
        }
        Ok(names)
    }
}
