use std::time::Duration;

use chrono::Utc;
use kube::Api;
use kube::api::LogParams;
use tracing::*;

use super::describe::{
    render_deployment,
    render_pod,
};
use super::events::{
    list_events,
    render_events,
};
use super::*;
use crate::config::ActionsConfig;
use crate::k8s::{
    PodExt,
    classify_kube_error,
    is_transient,
};

enum Execution {
    Output(String),
    NeedsContainer(Vec<String>),
}

// The ActionExecutor runs exactly one read-only diagnostic request against the cluster.  It never
// returns an error: anything that goes wrong (after a single retry for transient failures) is
// reported back as a failed ActionResult so that the session can carry on.
pub struct ActionExecutor {
    client: kube::Client,
    log_tail_lines: i64,
    retry_delay: Duration,
}

impl ActionExecutor {
    pub fn new(client: kube::Client, config: &ActionsConfig) -> ActionExecutor {
        ActionExecutor {
            client,
            log_tail_lines: config.log_tail_lines,
            retry_delay: config.retry_delay(),
        }
    }

    pub async fn execute(&self, req: &ActionRequest) -> ActionOutcome {
        debug!("executing {req}");
        let res = match self.try_execute(req).await {
            Err(err) if is_transient(&err) => {
                warn!("transient error executing {req}, retrying in {:?}: {err}", self.retry_delay);
                tokio::time::sleep(self.retry_delay).await;
                self.try_execute(req).await
            },
            res => res,
        };

        match res {
            Ok(Execution::Output(output)) => ActionOutcome::Completed(ActionResult::ok(req.clone(), output)),
            Ok(Execution::NeedsContainer(candidates)) => {
                debug!("{req} needs a container choice from {candidates:?}");
                ActionOutcome::ContainerSelectionRequired(candidates)
            },
            Err(err) => {
                warn!("{req} failed: {err}");
                ActionOutcome::Completed(ActionResult::failed(req.clone(), &err))
            },
        }
    }

    async fn try_execute(&self, req: &ActionRequest) -> anyhow::Result<Execution> {
        req.validate()?;
        let (ns, name) = (req.namespace.as_str(), req.name.as_str());
        let output = match req.action_type {
            ActionType::DescribePod => self.describe_pod(ns, name).await?,
            ActionType::DescribeDeployment => self.describe_deployment(ns, name).await?,
            ActionType::GetConfigmap => self.get_configmap(ns, name).await?,
            ActionType::GetEvents => render_events(&list_events(&self.client, ns, name).await?, Utc::now()),
            ActionType::Logs => return self.logs(ns, name, req.container.as_deref()).await,
        };
        Ok(Execution::Output(output))
    }

    async fn describe_pod(&self, ns: &str, name: &str) -> anyhow::Result<String> {
        let pods_api = Api::<corev1::Pod>::namespaced(self.client.clone(), ns);
        let pod = pods_api.get(name).await.map_err(|err| classify_kube_error(err, &format!("pod {ns}/{name}")))?;

        // A failure to fetch events shouldn't hide the rest of the description
        let events = list_events(&self.client, ns, name).await;
        render_pod(&pod, &events, Utc::now())
    }

    async fn describe_deployment(&self, ns: &str, name: &str) -> anyhow::Result<String> {
        let depl_api = Api::<appsv1::Deployment>::namespaced(self.client.clone(), ns);
        let depl = depl_api
            .get(name)
            .await
            .map_err(|err| classify_kube_error(err, &format!("deployment {ns}/{name}")))?;

        let events = list_events(&self.client, ns, name).await;
        render_deployment(&depl, &events, Utc::now())
    }

    async fn get_configmap(&self, ns: &str, name: &str) -> anyhow::Result<String> {
        let cm_api = Api::<corev1::ConfigMap>::namespaced(self.client.clone(), ns);
        let mut cm = cm_api
            .get(name)
            .await
            .map_err(|err| classify_kube_error(err, &format!("configmap {ns}/{name}")))?;

        cm.metadata.managed_fields = None;
        Ok(serde_yaml::to_string(&cm)?)
    }

    async fn logs(&self, ns: &str, name: &str, container: Option<&str>) -> anyhow::Result<Execution> {
        let pods_api = Api::<corev1::Pod>::namespaced(self.client.clone(), ns);
        let pod = pods_api.get(name).await.map_err(|err| classify_kube_error(err, &format!("pod {ns}/{name}")))?;

        let candidates = pod.container_names()?;
        let container = match container {
            Some(c) if candidates.iter().any(|cand| cand == c) => c.to_string(),
            Some(c) => bail!(ClusterError::invalid(&format!(
                "container {c} not found in pod {ns}/{name}; valid containers are: {}",
                candidates.join(", ")
            ))),
            None if candidates.len() > 1 => return Ok(Execution::NeedsContainer(candidates)),
            None => match candidates.first() {
                Some(c) => c.clone(),
                None => bail!(ClusterError::invalid(&format!("pod {ns}/{name} has no containers"))),
            },
        };

        let lp = LogParams {
            container: Some(container.clone()),
            tail_lines: Some(self.log_tail_lines),
            ..Default::default()
        };
        let logs = pods_api
            .logs(name, &lp)
            .await
            .map_err(|err| classify_kube_error(err, &format!("logs for {ns}/{name} [{container}]")))?;
        Ok(Execution::Output(logs))
    }
}
