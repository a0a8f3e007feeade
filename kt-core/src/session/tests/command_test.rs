use super::*;

#[rstest]
#[case::one("1", 3, Some(0))]
#[case::last(" 3 ", 3, Some(2))]
#[case::zero("0", 3, None)]
#[case::too_big("4", 3, None)]
#[case::negative("-1", 3, None)]
#[case::not_a_number("two", 3, None)]
#[case::empty_list("1", 0, None)]
fn test_parse_selection(#[case] line: &str, #[case] len: usize, #[case] expected: Option<usize>) {
    assert_eq!(parse_selection(line, len), expected);
}

#[rstest]
#[case::exit("exit")]
#[case::quit("quit")]
#[case::shouting("QUIT")]
#[case::padded("  Exit ")]
fn test_parse_exit(#[case] line: &str) {
    assert!(matches!(parse_command(line, 3), Command::Exit));
}

#[rstest]
fn test_parse_switch() {
    assert!(matches!(parse_command("switch 2", 3), Command::SwitchTo(1)));
    assert!(matches!(parse_command("SWITCH 3", 3), Command::SwitchTo(2)));
    assert!(matches!(parse_command("switch 4", 3), Command::Invalid(_)));
    assert!(matches!(parse_command("switch", 3), Command::Invalid(_)));
    assert!(matches!(parse_command("switch to 2", 3), Command::Invalid(_)));
}

#[rstest]
fn test_parse_message() {
    assert!(matches!(parse_command("   ", 3), Command::Empty));
    assert!(matches!(parse_command("exiting soon?", 3), Command::Message(m) if m == "exiting soon?"));
    assert!(matches!(parse_command(" why is it crashing ", 3), Command::Message(m) if m == "why is it crashing"));
}

#[rstest]
#[tokio::test]
async fn test_switch_signal_single_slot() {
    let switch = SwitchSignal::new();
    switch.raise();
    switch.raise();

    // two raises with nobody waiting collapse into one
    assert!(switch.raised().now_or_never().is_some());
    assert!(switch.raised().now_or_never().is_none());

    switch.raise();
    switch.clear();
    assert!(switch.raised().now_or_never().is_none());
}
