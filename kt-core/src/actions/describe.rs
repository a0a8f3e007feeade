use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::{
    DateTime,
    Utc,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

use super::events::render_event;
use super::*;
use crate::k8s::{
    ContainerStateExt,
    PodExt,
};

const LABEL_WIDTH: usize = 16;

macro_rules! field {
    ($out:expr, $indent:expr, $label:expr, $($arg:tt)*) => {
        writeln!($out, "{}{:<width$}{}", $indent, format!("{}:", $label), format_args!($($arg)*), width = LABEL_WIDTH)
    };
}

fn format_quantities(quantities: Option<&BTreeMap<String, Quantity>>) -> String {
    match quantities {
        Some(q) if !q.is_empty() => q.iter().map(|(k, v)| format!("{k}={}", v.0)).collect::<Vec<_>>().join(", "),
        _ => "<none>".into(),
    }
}

fn format_labels(labels: Option<&BTreeMap<String, String>>) -> String {
    match labels {
        Some(l) if !l.is_empty() => l.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join(","),
        _ => "<none>".into(),
    }
}

fn write_container(
    out: &mut String,
    container: &corev1::Container,
    status: Option<&corev1::ContainerStatus>,
) -> std::fmt::Result {
    let indent = "    ";
    writeln!(out, "  {}:", container.name)?;
    field!(out, indent, "Image", "{}", container.image.as_deref().unwrap_or("<none>"))?;

    if let Some(cs) = status {
        let state = cs.state.as_ref().map_or_else(|| "Unknown".into(), |s| s.summary());
        field!(out, indent, "State", "{state}")?;
        if let Some(last) = cs.last_state.as_ref().filter(|s| s.terminated.is_some()) {
            field!(out, indent, "Last State", "{}", last.summary())?;
        }
        field!(out, indent, "Ready", "{}", cs.ready)?;
        field!(out, indent, "Restart Count", "{}", cs.restart_count)?;
    }

    let resources = container.resources.as_ref();
    field!(out, indent, "Requests", "{}", format_quantities(resources.and_then(|r| r.requests.as_ref())))?;
    field!(out, indent, "Limits", "{}", format_quantities(resources.and_then(|r| r.limits.as_ref())))?;
    Ok(())
}

fn write_events(
    out: &mut String,
    events: &anyhow::Result<Vec<corev1::Event>>,
    now: DateTime<Utc>,
) -> std::fmt::Result {
    writeln!(out, "Events:")?;
    match events {
        Ok(evs) if evs.is_empty() => writeln!(out, "  <none>"),
        Ok(evs) => {
            for ev in evs {
                writeln!(out, "  {}", render_event(ev, now))?;
            }
            Ok(())
        },
        Err(err) => writeln!(out, "  <could not fetch events: {err}>"),
    }
}

pub(super) fn render_pod(
    pod: &corev1::Pod,
    events: &anyhow::Result<Vec<corev1::Event>>,
    now: DateTime<Utc>,
) -> anyhow::Result<String> {
    let mut out = String::new();
    let spec = pod.spec().ok();
    let status = pod.status().ok();

    field!(out, "", "Name", "{}", pod.name_any())?;
    field!(out, "", "Namespace", "{}", pod.namespace().unwrap_or_default())?;
    field!(out, "", "Node", "{}", spec.and_then(|s| s.node_name.as_deref()).unwrap_or("<none>"))?;
    field!(out, "", "Labels", "{}", format_labels(pod.metadata.labels.as_ref()))?;
    field!(out, "", "Status", "{}", status.and_then(|s| s.phase.as_deref()).unwrap_or("Unknown"))?;
    if let Some(reason) = status.and_then(|s| s.reason.as_deref()) {
        field!(out, "", "Reason", "{reason}")?;
    }
    if let Some(message) = status.and_then(|s| s.message.as_deref()) {
        field!(out, "", "Message", "{message}")?;
    }
    for owner in pod.owner_references() {
        field!(out, "", "Controlled By", "{}/{}", owner.kind, owner.name)?;
    }

    writeln!(out, "Conditions:")?;
    match status.and_then(|s| s.conditions.as_ref()) {
        Some(conds) if !conds.is_empty() => {
            for c in conds {
                write!(out, "  {:<16}{:<8}", c.type_, c.status)?;
                if let Some(reason) = c.reason.as_ref() {
                    write!(out, "{reason}")?;
                }
                if let Some(message) = c.message.as_ref() {
                    write!(out, ": {message}")?;
                }
                writeln!(out)?;
            }
        },
        _ => writeln!(out, "  <none>")?,
    }

    let init_statuses = status.and_then(|s| s.init_container_statuses.as_deref()).unwrap_or_default();
    let statuses = status.and_then(|s| s.container_statuses.as_deref()).unwrap_or_default();
    let find_status = |list: &[corev1::ContainerStatus], name: &str| list.iter().find(|cs| cs.name == name).cloned();

    if let Some(init_containers) = spec.and_then(|s| s.init_containers.as_ref()).filter(|ic| !ic.is_empty()) {
        writeln!(out, "Init Containers:")?;
        for c in init_containers {
            write_container(&mut out, c, find_status(init_statuses, &c.name).as_ref())?;
        }
    }

    writeln!(out, "Containers:")?;
    for c in spec.map(|s| s.containers.as_slice()).unwrap_or_default() {
        write_container(&mut out, c, find_status(statuses, &c.name).as_ref())?;
    }

    write_events(&mut out, events, now)?;
    Ok(out)
}

pub(super) fn render_deployment(
    depl: &appsv1::Deployment,
    events: &anyhow::Result<Vec<corev1::Event>>,
    now: DateTime<Utc>,
) -> anyhow::Result<String> {
    let mut out = String::new();
    let spec = depl.spec.as_ref();
    let status = depl.status.as_ref();

    field!(out, "", "Name", "{}", depl.name_any())?;
    field!(out, "", "Namespace", "{}", depl.namespace().unwrap_or_default())?;
    field!(out, "", "Selector", "{}", format_labels(spec.and_then(|s| s.selector.match_labels.as_ref())))?;
    field!(
        out,
        "",
        "Replicas",
        "{} desired | {} updated | {} total | {} available | {} unavailable",
        spec.and_then(|s| s.replicas).unwrap_or(1),
        status.and_then(|s| s.updated_replicas).unwrap_or(0),
        status.and_then(|s| s.replicas).unwrap_or(0),
        status.and_then(|s| s.available_replicas).unwrap_or(0),
        status.and_then(|s| s.unavailable_replicas).unwrap_or(0),
    )?;
    field!(
        out,
        "",
        "StrategyType",
        "{}",
        spec.and_then(|s| s.strategy.as_ref()).and_then(|s| s.type_.as_deref()).unwrap_or("RollingUpdate")
    )?;

    writeln!(out, "Conditions:")?;
    match status.and_then(|s| s.conditions.as_ref()) {
        Some(conds) if !conds.is_empty() => {
            for c in conds {
                write!(out, "  {:<16}{:<8}{}", c.type_, c.status, c.reason.as_deref().unwrap_or(""))?;
                if let Some(message) = c.message.as_ref() {
                    write!(out, ": {message}")?;
                }
                writeln!(out)?;
            }
        },
        _ => writeln!(out, "  <none>")?,
    }

    writeln!(out, "Pod Template Containers:")?;
    let template_containers = spec.and_then(|s| s.template.spec.as_ref()).map(|ps| ps.containers.as_slice());
    for c in template_containers.unwrap_or_default() {
        write_container(&mut out, c, None)?;
    }

    write_events(&mut out, events, now)?;
    Ok(out)
}
