use assertables::*;
use chrono::DateTime;

use crate::actions::describe::{
    render_deployment,
    render_pod,
};
use super::*;

fn now() -> chrono::DateTime<chrono::Utc> {
    DateTime::from_timestamp(10_000, 0).unwrap()
}

#[rstest]
fn test_render_pod(mut test_multi_container_pod: corev1::Pod) {
    let status = test_multi_container_pod.status.as_mut().unwrap();
    status.init_container_statuses = Some(vec![running_status(TEST_INIT_CONTAINER)]);
    let events = Ok(vec![build_event(TEST_POD, "BackOff", "Back-off restarting failed container", 12, 9_000)]);

    let output = render_pod(&test_multi_container_pod, &events, now()).unwrap();

    assert_starts_with!(output, format!("Name:           {TEST_POD}\n"));
    assert!(output.contains("Status:         Running\n"));
    assert!(output.contains("Ready           False   ContainersNotReady"));
    assert!(output.contains("Init Containers:\n  init-db:\n"));
    assert!(output.contains("State:          Waiting (CrashLoopBackOff): back-off 5m0s restarting failed container"));
    assert!(output.contains("Restart Count:  7"));
    assert!(output.contains("Requests:       cpu=100m, memory=128Mi"));
    assert!(output.contains("Limits:         memory=256Mi"));
    assert!(output.contains("(x12): Back-off restarting failed container"));

    // init containers are described before app containers
    let init_pos = output.find("  init-db:").unwrap();
    let app_pos = output.find("  app:").unwrap();
    let sidecar_pos = output.find("  sidecar:").unwrap();
    assert!(init_pos < app_pos && app_pos < sidecar_pos);
}

#[rstest]
fn test_render_pod_events_unavailable(test_pod: corev1::Pod) {
    let events = Err(anyhow!("events are forbidden"));
    let output = render_pod(&test_pod, &events, now()).unwrap();

    assert_ends_with!(output, "Events:\n  <could not fetch events: events are forbidden>\n");
}

#[rstest]
fn test_render_pod_no_events(test_pod: corev1::Pod) {
    let output = render_pod(&test_pod, &Ok(vec![]), now()).unwrap();
    assert_ends_with!(output, "Events:\n  <none>\n");
}

#[rstest]
fn test_render_deployment(test_deployment: appsv1::Deployment) {
    let output = render_deployment(&test_deployment, &Ok(vec![]), now()).unwrap();

    assert!(output.contains(&format!("Name:           {TEST_DEPLOYMENT}\n")));
    assert!(output.contains(&format!("Selector:       app={TEST_DEPLOYMENT}\n")));
    assert!(output.contains("3 desired | 3 updated | 3 total | 1 available | 2 unavailable"));
    assert!(output.contains("StrategyType:   RollingUpdate"));
    assert!(
        output.contains("Available       False   MinimumReplicasUnavailable: Deployment does not have minimum availability.")
    );
    assert!(output.contains("Pod Template Containers:\n  app:\n"));
}
