use super::*;

// Per the Kubernetes spec at most one of `running`, `terminated`, or `waiting` is set on a
// ContainerState, so the helpers below just report whichever one is present.
pub trait ContainerStateExt {
    fn reason(&self) -> Option<&str>;
    fn summary(&self) -> String;
}

impl ContainerStateExt for corev1::ContainerState {
    fn reason(&self) -> Option<&str> {
        match self {
            corev1::ContainerState { waiting: Some(w), .. } => w.reason.as_deref(),
            corev1::ContainerState { terminated: Some(t), .. } => t.reason.as_deref(),
            _ => None,
        }
    }

    fn summary(&self) -> String {
        match self {
            corev1::ContainerState { waiting: Some(w), .. } => {
                let mut s = format!("Waiting ({})", w.reason.as_deref().unwrap_or("unknown"));
                if let Some(msg) = w.message.as_ref() {
                    s += &format!(": {msg}");
                }
                s
            },
            corev1::ContainerState { terminated: Some(t), .. } => {
                let mut s = format!("Terminated ({}), exit code {}", t.reason.as_deref().unwrap_or("unknown"), t.exit_code);
                if let Some(msg) = t.message.as_ref() {
                    s += &format!(": {msg}");
                }
                s
            },
            corev1::ContainerState { running: Some(r), .. } => match r.started_at.as_ref() {
                Some(ts) => format!("Running since {}", ts.0.to_rfc3339()),
                None => "Running".into(),
            },
            _ => "Unknown".into(),
        }
    }
}

// The waiting reason of a container that isn't ready yet, falling back to the terminated reason
pub(super) fn status_failure_reason(cs: &corev1::ContainerStatus) -> Option<String> {
    if cs.ready {
        return None;
    }
    cs.state.as_ref()?.reason().map(String::from)
}
