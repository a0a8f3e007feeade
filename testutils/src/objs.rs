use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1 as appsv1;
use k8s_openapi::api::core::v1 as corev1;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
use rstest::fixture;

use crate::constants::*;

pub fn owner_ref(kind: &str, name: &str, controller: bool) -> metav1::OwnerReference {
    let api_version = if kind == "Job" { "batch/v1" } else { "apps/v1" };
    metav1::OwnerReference {
        api_version: api_version.into(),
        kind: kind.into(),
        name: name.into(),
        uid: format!("{name}-uid"),
        controller: Some(controller),
        ..Default::default()
    }
}

pub fn build_container(name: &str) -> corev1::Container {
    corev1::Container {
        name: name.into(),
        image: Some(TEST_IMAGE.into()),
        resources: Some(corev1::ResourceRequirements {
            requests: Some(BTreeMap::from([
                ("cpu".into(), Quantity("100m".into())),
                ("memory".into(), Quantity("128Mi".into())),
            ])),
            limits: Some(BTreeMap::from([("memory".into(), Quantity("256Mi".into()))])),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn ready_condition(ready: bool, reason: Option<&str>) -> corev1::PodCondition {
    corev1::PodCondition {
        type_: "Ready".into(),
        status: if ready { "True".into() } else { "False".into() },
        reason: reason.map(String::from),
        ..Default::default()
    }
}

pub fn waiting_status(name: &str, reason: &str, message: &str) -> corev1::ContainerStatus {
    corev1::ContainerStatus {
        name: name.into(),
        image: TEST_IMAGE.into(),
        ready: false,
        restart_count: 7,
        state: Some(corev1::ContainerState {
            waiting: Some(corev1::ContainerStateWaiting {
                reason: Some(reason.into()),
                message: Some(message.into()),
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn running_status(name: &str) -> corev1::ContainerStatus {
    corev1::ContainerStatus {
        name: name.into(),
        image: TEST_IMAGE.into(),
        ready: true,
        state: Some(corev1::ContainerState {
            running: Some(corev1::ContainerStateRunning::default()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

// Build a pod in the given namespace with one container per entry in `containers`; the pod is
// Running, and its readiness is controlled by `ready`.
pub fn build_pod(ns: &str, name: &str, containers: &[&str], ready: bool) -> corev1::Pod {
    corev1::Pod {
        metadata: metav1::ObjectMeta {
            namespace: Some(ns.into()),
            name: Some(name.into()),
            ..Default::default()
        },
        spec: Some(corev1::PodSpec {
            containers: containers.iter().map(|c| build_container(c)).collect(),
            node_name: Some("node-1".into()),
            ..Default::default()
        }),
        status: Some(corev1::PodStatus {
            phase: Some("Running".into()),
            conditions: Some(vec![ready_condition(ready, (!ready).then_some("ContainersNotReady"))]),
            container_statuses: Some(
                containers
                    .iter()
                    .map(|c| {
                        if ready {
                            running_status(c)
                        } else {
                            waiting_status(c, "CrashLoopBackOff", "back-off 5m0s restarting failed container")
                        }
                    })
                    .collect(),
            ),
            ..Default::default()
        }),
    }
}

#[fixture]
pub fn test_pod(#[default(TEST_POD)] name: &str) -> corev1::Pod {
    build_pod(TEST_NAMESPACE, name, &[TEST_CONTAINER], false)
}

#[fixture]
pub fn test_multi_container_pod(#[default(TEST_POD)] name: &str) -> corev1::Pod {
    let mut pod = build_pod(TEST_NAMESPACE, name, &[TEST_CONTAINER, TEST_SIDECAR], false);
    if let Some(spec) = pod.spec.as_mut() {
        spec.init_containers = Some(vec![build_container(TEST_INIT_CONTAINER)]);
    }
    pod
}

#[fixture]
pub fn test_replicaset(#[default(TEST_REPLICASET)] name: &str) -> appsv1::ReplicaSet {
    appsv1::ReplicaSet {
        metadata: metav1::ObjectMeta {
            namespace: Some(TEST_NAMESPACE.into()),
            name: Some(name.into()),
            owner_references: Some(vec![owner_ref("Deployment", TEST_DEPLOYMENT, true)]),
            ..Default::default()
        },
        ..Default::default()
    }
}

#[fixture]
pub fn test_deployment(#[default(TEST_DEPLOYMENT)] name: &str) -> appsv1::Deployment {
    appsv1::Deployment {
        metadata: metav1::ObjectMeta {
            namespace: Some(TEST_NAMESPACE.into()),
            name: Some(name.into()),
            ..Default::default()
        },
        spec: Some(appsv1::DeploymentSpec {
            replicas: Some(3),
            selector: metav1::LabelSelector {
                match_labels: Some(BTreeMap::from([("app".into(), name.into())])),
                ..Default::default()
            },
            strategy: Some(appsv1::DeploymentStrategy { type_: Some("RollingUpdate".into()), ..Default::default() }),
            template: corev1::PodTemplateSpec {
                spec: Some(corev1::PodSpec { containers: vec![build_container(TEST_CONTAINER)], ..Default::default() }),
                ..Default::default()
            },
            ..Default::default()
        }),
        status: Some(appsv1::DeploymentStatus {
            replicas: Some(3),
            updated_replicas: Some(3),
            ready_replicas: Some(1),
            available_replicas: Some(1),
            unavailable_replicas: Some(2),
            conditions: Some(vec![appsv1::DeploymentCondition {
                type_: "Available".into(),
                status: "False".into(),
                reason: Some("MinimumReplicasUnavailable".into()),
                message: Some("Deployment does not have minimum availability.".into()),
                ..Default::default()
            }]),
            ..Default::default()
        }),
    }
}

#[fixture]
pub fn test_configmap(#[default(TEST_CONFIGMAP)] name: &str) -> corev1::ConfigMap {
    corev1::ConfigMap {
        metadata: metav1::ObjectMeta {
            namespace: Some(TEST_NAMESPACE.into()),
            name: Some(name.into()),
            managed_fields: Some(vec![Default::default()]),
            ..Default::default()
        },
        data: Some(BTreeMap::from([
            ("DATABASE_URL".into(), "postgres://db.test-namespace:5432/app".into()),
            ("LOG_LEVEL".into(), "debug".into()),
        ])),
        ..Default::default()
    }
}

pub fn build_event(object: &str, reason: &str, message: &str, count: i32, ts: i64) -> corev1::Event {
    let time = metav1::Time(chrono::DateTime::from_timestamp(ts, 0).unwrap());
    corev1::Event {
        metadata: metav1::ObjectMeta {
            namespace: Some(TEST_NAMESPACE.into()),
            name: Some(format!("{object}.{ts}")),
            ..Default::default()
        },
        involved_object: corev1::ObjectReference {
            kind: Some("Pod".into()),
            namespace: Some(TEST_NAMESPACE.into()),
            name: Some(object.into()),
            ..Default::default()
        },
        reason: Some(reason.into()),
        message: Some(message.into()),
        count: Some(count),
        type_: Some("Warning".into()),
        first_timestamp: Some(time.clone()),
        last_timestamp: Some(time),
        ..Default::default()
    }
}
