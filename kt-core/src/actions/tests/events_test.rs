use chrono::{
    DateTime,
    TimeDelta,
};

use crate::actions::events::{
    render_event,
    render_events,
};
use super::*;

#[rstest]
#[case::negative(-5, "0s")]
#[case::zero(0, "0s")]
#[case::seconds(59, "59s")]
#[case::one_minute(60, "1m")]
#[case::minutes(3599, "59m")]
#[case::one_hour(3600, "1h")]
#[case::hours(86399, "23h")]
#[case::days(3 * 86400 + 5, "3d")]
fn test_format_age(#[case] secs: i64, #[case] expected: &str) {
    assert_eq!(format_age(TimeDelta::seconds(secs)), expected);
}

#[rstest]
fn test_render_event() {
    let ev = build_event(TEST_POD, "BackOff", "Back-off restarting failed container\n", 3, 1_000);
    let now = DateTime::from_timestamp(1_300, 0).unwrap();

    let line = render_event(&ev, now);

    assert!(line.starts_with("5m "));
    assert!(line.contains("Warning"));
    assert!(line.ends_with(&format!("Pod/{TEST_POD} (x3): Back-off restarting failed container")));
}

#[rstest]
fn test_render_no_events() {
    let now = DateTime::from_timestamp(0, 0).unwrap();
    assert_eq!(render_events(&[], now), "No events found.");
}
