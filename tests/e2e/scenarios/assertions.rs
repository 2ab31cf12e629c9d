use crate::harness::{init_tracing, require_sorted, run_case, Entry, RecordingHost};
use std::cell::Cell;
use toast::{format_message, NoLocation, TestFileLocator, Toast, Toaster};

fn lenient(host: &RecordingHost) -> Toast<'_, RecordingHost> {
    let mut t = Toast::new(host);
    t.fail_fast = false;
    t
}

#[test]
fn test_passing_assert_is_silent_under_any_policy() {
    init_tracing();
    for fail_fast in [true, false] {
        let host = RecordingHost::default();
        let mut t = Toast::new(&host);
        t.fail_fast = fail_fast;

        let outcome = run_case(|| t.assert(2 + 2 == 4, &[&"arithmetic"]));

        assert!(outcome.completed());
        assert!(host.entries().is_empty());
        assert_eq!(host.aborts(), 0);
        assert!(!host.has_failed());
    }
}

#[test]
fn test_failing_assert_records_once_without_abort() {
    let host = RecordingHost::default();
    let t = lenient(&host);

    let outcome = run_case(|| t.assert(false, &[]));

    assert!(outcome.completed());
    assert_eq!(host.failures().len(), 1);
    assert!(host.failures()[0].contains("assertion failed"));
    assert_eq!(host.aborts(), 0);
    assert!(host.has_failed());
}

#[test]
fn test_self_test_mode_routes_to_log() {
    let host = RecordingHost::default();
    let mut t = Toast::new(&host).self_test();
    t.fail_fast = false;

    let outcome = run_case(|| t.assert(1 + 1 == 3, &[]));

    assert!(outcome.completed());
    let entries = host.entries();
    assert_eq!(entries.len(), 1);
    assert!(matches!(&entries[0], Entry::Log(msg) if msg.contains("assertion failed")));
    assert!(!host.has_failed());
}

#[test]
fn test_fail_fast_aborts_exactly_once() {
    let host = RecordingHost::default();
    let t = Toast::new(&host);
    let after = Cell::new(false);

    let outcome = run_case(|| {
        t.assert(false, &[]);
        after.set(true);
    });

    assert!(outcome.aborted);
    assert!(!after.get());
    assert_eq!(host.aborts(), 1);
    assert_eq!(host.failures().len(), 1);
}

#[test]
fn test_policy_can_change_mid_test() {
    let host = RecordingHost::default();
    let mut t = lenient(&host);

    t.assert(false, &[&"first"]);
    t.fail_fast = true;
    let outcome = run_case(|| t.assert(false, &[&"second"]));

    assert!(outcome.aborted);
    assert_eq!(host.failures().len(), 2);
    assert_eq!(host.aborts(), 1);
}

#[test]
fn test_message_prefixed_with_call_site() {
    let host = RecordingHost::default();
    let t = lenient(&host);

    let line = line!() + 1;
    t.assert(false, &[&"x was", &7]);

    let failure = &host.failures()[0];
    assert!(failure.starts_with("    "));
    assert!(failure.contains(&format!("assertions.rs:{}:", line)));
    assert!(failure.ends_with("assertion failed x was 7"));
}

#[test]
fn test_test_file_locator_accepts_scenarios() {
    let host = RecordingHost::default();
    let t = lenient(&host).with_locator(TestFileLocator::new(["scenarios"]));

    t.error(&[&"in a scenario file"]);

    let failure = &host.failures()[0];
    assert!(failure.contains("assertions.rs:"));
    assert!(failure.ends_with("in a scenario file"));
}

#[test]
fn test_test_file_locator_walks_past_plain_helpers() {
    let host = RecordingHost::default();
    let t = lenient(&host).with_locator(TestFileLocator::new(["scenarios"]));

    require_sorted(&t, &[1, 2, 3]);
    assert!(host.entries().is_empty());

    require_sorted(&t, &[3, 1, 2]);

    let failure = &host.failures()[0];
    assert!(failure.contains("assertions.rs:"), "{}", failure);
    assert!(!failure.contains("checks.rs:"), "{}", failure);
    assert!(failure.ends_with("assertion failed values are not sorted"));
}

#[test]
fn test_caller_locator_stops_at_plain_helpers() {
    let host = RecordingHost::default();
    let t = lenient(&host);

    require_sorted(&t, &[2, 1]);

    assert!(host.failures()[0].contains("checks.rs:"));
}

#[test]
fn test_test_file_locator_absence_leaves_bare_message() {
    let host = RecordingHost::default();
    let t = lenient(&host).with_locator(TestFileLocator::new(["_bench.rs"]));

    t.error(&[&"no match"]);

    assert_eq!(host.failures(), vec!["no match".to_string()]);
}

#[test]
fn test_assert_eq_shows_both_sides() {
    let host = RecordingHost::default();
    let t = lenient(&host).with_locator(NoLocation);

    t.assert_eq(vec![1, 2], vec![1, 2], &[]);
    t.assert_eq("left", "right", &[&"names differ"]);

    assert_eq!(
        host.failures(),
        vec![
            "assertion failed: left == right (left: \"left\", right: \"right\") names differ"
                .to_string()
        ]
    );
}

#[test]
fn test_error_and_errorf() {
    let host = RecordingHost::default();
    let t = lenient(&host).with_locator(NoLocation);

    t.error(&[&"plain", &1]);
    t.errorf(format_args!("formatted {:03}", 7));

    assert_eq!(
        host.failures(),
        vec!["plain 1".to_string(), "formatted 007".to_string()]
    );
}

#[test]
fn test_error_aborts_when_fail_fast() {
    let host = RecordingHost::default();
    let t = Toast::new(&host);

    let outcome = run_case(|| t.error(&[&"unconditional"]));

    assert!(outcome.aborted);
    assert_eq!(host.aborts(), 1);
}

#[test]
fn test_log_never_fails() {
    let host = RecordingHost::default();
    let t = Toast::new(&host).with_locator(NoLocation);

    t.log(&[&"step", &3, &"of", &5]);
    t.logf(format_args!("{}%", 60));

    assert_eq!(host.logs(), vec!["step 3 of 5".to_string(), "60%".to_string()]);
    assert!(!host.has_failed());
    assert_eq!(host.aborts(), 0);
}

#[test]
fn test_formatter_keeps_every_value_in_order() {
    let words = ["alpha", "beta", "gamma", "delta"];
    for n in 1..=words.len() {
        let values: Vec<&dyn std::fmt::Display> =
            words[..n].iter().map(|w| w as &dyn std::fmt::Display).collect();
        let msg = format_message("fallback", &values, None);

        let mut from = 0;
        for word in &words[..n] {
            let at = msg[from..].find(word).expect("value missing from message");
            from += at + word.len();
        }
        assert!(!msg.contains("fallback"));
    }
}
