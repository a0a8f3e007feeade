use assertables::*;

use super::*;
use crate::config::ActionsConfig;

fn pod_path(name: &str) -> String {
    format!("/api/v1/namespaces/{TEST_NAMESPACE}/pods/{name}")
}

fn events_path() -> String {
    format!("/api/v1/namespaces/{TEST_NAMESPACE}/events")
}

fn build_executor(client: kube::Client) -> ActionExecutor {
    let config = ActionsConfig { retry_delay_ms: 1, ..Default::default() };
    ActionExecutor::new(client, &config)
}

fn unwrap_completed(outcome: ActionOutcome) -> ActionResult {
    match outcome {
        ActionOutcome::Completed(res) => res,
        other => panic!("expected a completed action, got {other:?}"),
    }
}

#[rstest]
#[tokio::test]
async fn test_logs_single_container(test_pod: corev1::Pod) {
    let (mut fake_apiserver, client) = make_fake_apiserver();
    fake_apiserver
        .handle(move |when, then| {
            when.path(pod_path(TEST_POD));
            then.json_body_obj(&test_pod);
        })
        .handle(|when, then| {
            when.path(format!("{}/log", pod_path(TEST_POD)))
                .query_param("container", TEST_CONTAINER)
                .query_param("tailLines", "100");
            then.body("starting up\npanic: could not connect to database\n");
        });

    let req = ActionRequest::new(ActionType::Logs, TEST_NAMESPACE, TEST_POD);
    let res = unwrap_completed(build_executor(client).execute(&req).await);

    assert!(res.succeeded);
    assert_eq!(res.request, req);
    assert_eq!(res.output, "starting up\npanic: could not connect to database\n");
    fake_apiserver.assert();
}

#[rstest]
#[tokio::test]
async fn test_logs_multi_container_needs_selection(test_multi_container_pod: corev1::Pod) {
    let (mut fake_apiserver, client) = make_fake_apiserver();
    fake_apiserver.handle(move |when, then| {
        when.path(pod_path(TEST_POD));
        then.json_body_obj(&test_multi_container_pod);
    });

    let req = ActionRequest::new(ActionType::Logs, TEST_NAMESPACE, TEST_POD);
    let outcome = build_executor(client).execute(&req).await;

    assert_eq!(
        outcome,
        ActionOutcome::ContainerSelectionRequired(vec![
            TEST_INIT_CONTAINER.into(),
            TEST_CONTAINER.into(),
            TEST_SIDECAR.into()
        ])
    );
    fake_apiserver.assert();
}

#[rstest]
#[tokio::test]
async fn test_logs_chosen_container(test_multi_container_pod: corev1::Pod) {
    let (mut fake_apiserver, client) = make_fake_apiserver();
    fake_apiserver
        .handle(move |when, then| {
            when.path(pod_path(TEST_POD));
            then.json_body_obj(&test_multi_container_pod);
        })
        .handle(|when, then| {
            when.path(format!("{}/log", pod_path(TEST_POD))).query_param("container", TEST_SIDECAR);
            then.body("proxy listening on :15001\n");
        });

    let req = ActionRequest::new(ActionType::Logs, TEST_NAMESPACE, TEST_POD).with_container(TEST_SIDECAR);
    let res = unwrap_completed(build_executor(client).execute(&req).await);

    assert!(res.succeeded);
    assert_eq!(res.output, "proxy listening on :15001\n");
    fake_apiserver.assert();
}

#[rstest]
#[tokio::test]
async fn test_logs_unknown_container(test_multi_container_pod: corev1::Pod) {
    let (mut fake_apiserver, client) = make_fake_apiserver();
    fake_apiserver.handle(move |when, then| {
        when.path(pod_path(TEST_POD));
        then.json_body_obj(&test_multi_container_pod);
    });

    let req = ActionRequest::new(ActionType::Logs, TEST_NAMESPACE, TEST_POD).with_container("nginx");
    let res = unwrap_completed(build_executor(client).execute(&req).await);

    assert!(!res.succeeded);
    assert_ends_with!(res.error_detail.unwrap(), "valid containers are: init-db, app, sidecar");
    fake_apiserver.assert();
}

#[rstest]
#[tokio::test]
async fn test_logs_pod_without_spec(mut test_pod: corev1::Pod) {
    test_pod.spec = None;
    let (mut fake_apiserver, client) = make_fake_apiserver();
    fake_apiserver.handle(move |when, then| {
        when.path(pod_path(TEST_POD));
        then.json_body_obj(&test_pod);
    });

    let req = ActionRequest::new(ActionType::Logs, TEST_NAMESPACE, TEST_POD);
    let res = unwrap_completed(build_executor(client).execute(&req).await);

    assert!(!res.succeeded);
    assert_eq!(res.error_detail.as_deref(), Some("field not found in struct: pod spec"));
    fake_apiserver.assert();
}

#[rstest]
#[tokio::test]
async fn test_describe_pod(test_pod: corev1::Pod) {
    let (mut fake_apiserver, client) = make_fake_apiserver();
    let events = vec![serde_json::to_value(build_event(TEST_POD, "BackOff", "Back-off restarting", 4, 100)).unwrap()];
    fake_apiserver
        .handle(move |when, then| {
            when.path(pod_path(TEST_POD));
            then.json_body_obj(&test_pod);
        })
        .handle(move |when, then| {
            when.path(events_path());
            then.json_body(list_of(events));
        });

    let req = ActionRequest::new(ActionType::DescribePod, TEST_NAMESPACE, TEST_POD);
    let res = unwrap_completed(build_executor(client).execute(&req).await);

    assert!(res.succeeded);
    assert!(res.output.contains("Waiting (CrashLoopBackOff): back-off 5m0s restarting failed container"));
    assert!(res.output.contains(&format!("Pod/{TEST_POD} (x4): Back-off restarting")));
    fake_apiserver.assert();
}

#[rstest]
#[tokio::test]
async fn test_describe_pod_events_fail(test_pod: corev1::Pod) {
    let (mut fake_apiserver, client) = make_fake_apiserver();
    fake_apiserver
        .handle(move |when, then| {
            when.path(pod_path(TEST_POD));
            then.json_body_obj(&test_pod);
        })
        .handle_not_found(events_path());

    let req = ActionRequest::new(ActionType::DescribePod, TEST_NAMESPACE, TEST_POD);
    let res = unwrap_completed(build_executor(client).execute(&req).await);

    assert!(res.succeeded);
    assert!(res.output.contains("<could not fetch events:"));
    fake_apiserver.assert();
}

#[rstest]
#[tokio::test]
async fn test_describe_pod_not_found() {
    let (mut fake_apiserver, client) = make_fake_apiserver();
    fake_apiserver.handle_not_found(pod_path("missing"));

    let req = ActionRequest::new(ActionType::DescribePod, TEST_NAMESPACE, "missing");
    let res = unwrap_completed(build_executor(client).execute(&req).await);

    assert!(!res.succeeded);
    assert!(res.output.is_empty());
    assert_starts_with!(res.error_detail.unwrap(), "not found: pod");
    fake_apiserver.assert();
}

#[rstest]
#[tokio::test]
async fn test_transient_error_retried_once() {
    let (mut fake_apiserver, client) = make_fake_apiserver();
    fake_apiserver.handle_server_error(pod_path(TEST_POD));

    let req = ActionRequest::new(ActionType::DescribePod, TEST_NAMESPACE, TEST_POD);
    let res = unwrap_completed(build_executor(client).execute(&req).await);

    assert!(!res.succeeded);
    assert_starts_with!(res.error_detail.unwrap(), "transient cluster error");
    assert_eq!(fake_apiserver.hits(0), 2);
}

#[rstest]
#[tokio::test]
async fn test_describe_deployment(test_deployment: appsv1::Deployment) {
    let (mut fake_apiserver, client) = make_fake_apiserver();
    fake_apiserver
        .handle(move |when, then| {
            when.path(format!("/apis/apps/v1/namespaces/{TEST_NAMESPACE}/deployments/{TEST_DEPLOYMENT}"));
            then.json_body_obj(&test_deployment);
        })
        .handle(|when, then| {
            when.path(events_path());
            then.json_body(list_of(vec![]));
        });

    let req = ActionRequest::new(ActionType::DescribeDeployment, TEST_NAMESPACE, TEST_DEPLOYMENT);
    let res = unwrap_completed(build_executor(client).execute(&req).await);

    assert!(res.succeeded);
    assert!(res.output.contains("MinimumReplicasUnavailable"));
    fake_apiserver.assert();
}

#[rstest]
#[tokio::test]
async fn test_get_configmap(test_configmap: corev1::ConfigMap) {
    let (mut fake_apiserver, client) = make_fake_apiserver();
    fake_apiserver.handle(move |when, then| {
        when.path(format!("/api/v1/namespaces/{TEST_NAMESPACE}/configmaps/{TEST_CONFIGMAP}"));
        then.json_body_obj(&test_configmap);
    });

    let req = ActionRequest::new(ActionType::GetConfigmap, TEST_NAMESPACE, TEST_CONFIGMAP);
    let res = unwrap_completed(build_executor(client).execute(&req).await);

    assert!(res.succeeded);
    let cm: corev1::ConfigMap = serde_yaml::from_str(&res.output).unwrap();
    assert_eq!(cm.data.unwrap()["LOG_LEVEL"], "debug");
    assert!(cm.metadata.managed_fields.is_none());
    assert!(!res.output.contains("managedFields"));
    fake_apiserver.assert();
}

#[rstest]
#[tokio::test]
async fn test_get_events_sorted() {
    let (mut fake_apiserver, client) = make_fake_apiserver();
    let events = vec![
        serde_json::to_value(build_event(TEST_POD, "Third", "c", 1, 300)).unwrap(),
        serde_json::to_value(build_event(TEST_POD, "First", "a", 1, 100)).unwrap(),
        serde_json::to_value(build_event(TEST_POD, "Second", "b", 1, 200)).unwrap(),
    ];
    fake_apiserver.handle(move |when, then| {
        when.path(events_path());
        then.json_body(list_of(events));
    });

    let req = ActionRequest::new(ActionType::GetEvents, TEST_NAMESPACE, TEST_POD);
    let res = unwrap_completed(build_executor(client).execute(&req).await);

    assert!(res.succeeded);
    let lines: Vec<_> = res.output.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[1].contains("First"));
    assert!(lines[2].contains("Second"));
    assert!(lines[3].contains("Third"));
    fake_apiserver.assert();
}

#[rstest]
#[tokio::test]
async fn test_invalid_request_never_calls_cluster() {
    let (fake_apiserver, client) = make_fake_apiserver();

    let req = ActionRequest::new(ActionType::DescribeDeployment, TEST_NAMESPACE, "");
    let res = unwrap_completed(build_executor(client).execute(&req).await);

    assert!(!res.succeeded);
    assert_eq!(res.error_detail.unwrap(), "invalid request: DESCRIBE_DEPLOYMENT request is missing a name");
    fake_apiserver.assert();
}
