use chrono::{
    DateTime,
    TimeDelta,
    Utc,
};
use kube::Api;
use kube::api::ListParams;

use super::*;
use crate::k8s::classify_kube_error;

pub(super) async fn list_events(client: &kube::Client, ns: &str, name: &str) -> anyhow::Result<Vec<corev1::Event>> {
    let events_api = Api::<corev1::Event>::namespaced(client.clone(), ns);
    let mut lp = ListParams::default();
    if !name.is_empty() {
        lp = lp.fields(&format!("involvedObject.name={name}"));
    }

    let mut events = events_api
        .list(&lp)
        .await
        .map_err(|err| classify_kube_error(err, &format!("events for {ns}/{name}")))?
        .items;
    events.sort_by_key(event_timestamp);
    Ok(events)
}

// Events carry up to four different timestamps depending on which API version and reporter
// produced them; use the most specific one that's set.
fn event_timestamp(ev: &corev1::Event) -> Option<DateTime<Utc>> {
    ev.last_timestamp
        .as_ref()
        .map(|t| t.0)
        .or_else(|| ev.event_time.as_ref().map(|t| t.0))
        .or_else(|| ev.first_timestamp.as_ref().map(|t| t.0))
        .or_else(|| ev.metadata.creation_timestamp.as_ref().map(|t| t.0))
}

// kubectl-style compact ages: 45s, 12m, 3h, 2d
pub fn format_age(age: TimeDelta) -> String {
    let secs = age.num_seconds().max(0);
    match secs {
        s if s < 60 => format!("{s}s"),
        s if s < 60 * 60 => format!("{}m", s / 60),
        s if s < 24 * 60 * 60 => format!("{}h", s / (60 * 60)),
        s => format!("{}d", s / (24 * 60 * 60)),
    }
}

pub(super) fn render_event(ev: &corev1::Event, now: DateTime<Utc>) -> String {
    let age = event_timestamp(ev).map_or_else(|| "<unknown>".into(), |ts| format_age(now - ts));
    let obj = &ev.involved_object;
    format!(
        "{:<8} {:<8} {:<24} {}/{} (x{}): {}",
        age,
        ev.type_.as_deref().unwrap_or("Normal"),
        ev.reason.as_deref().unwrap_or(""),
        obj.kind.as_deref().unwrap_or("Unknown"),
        obj.name.as_deref().unwrap_or(""),
        ev.count.unwrap_or(1),
        ev.message.as_deref().unwrap_or("").trim_end(),
    )
}

pub(super) fn render_events(events: &[corev1::Event], now: DateTime<Utc>) -> String {
    if events.is_empty() {
        return "No events found.".into();
    }

    let mut lines = vec![format!("{:<8} {:<8} {:<24} {}", "AGE", "TYPE", "REASON", "OBJECT (COUNT): MESSAGE")];
    lines.extend(events.iter().map(|ev| render_event(ev, now)));
    lines.join("\n")
}
