use crate::harness::{run_case, RecordingHost};
use anyhow::Context;
use thiserror::Error;
use toast::{NoLocation, Toast};

#[derive(Error, Debug, PartialEq)]
enum StoreError {
    #[error("key not found: {0}")]
    NotFound(String),
    #[error("store is read-only")]
    ReadOnly,
}

#[derive(Error, Debug)]
enum ServiceError {
    #[error("lookup failed")]
    Lookup(#[source] StoreError),
    #[error("timed out")]
    Timeout,
}

fn lenient(host: &RecordingHost) -> Toast<'_, RecordingHost> {
    let mut t = Toast::new(host).with_locator(NoLocation);
    t.fail_fast = false;
    t
}

fn lookup(key: &str) -> Result<u32, ServiceError> {
    Err(ServiceError::Lookup(StoreError::NotFound(key.to_string())))
}

#[test]
fn test_check_err_ok_is_noop() {
    let host = RecordingHost::default();
    let t = Toast::new(&host);

    let value = t.check_err::<_, ServiceError>(Ok(3));

    assert_eq!(value, Some(3));
    assert!(host.entries().is_empty());
}

#[test]
fn test_check_err_records_error_text() {
    let host = RecordingHost::default();
    let t = lenient(&host);

    let value = t.check_err(lookup("user:7"));

    assert_eq!(value, None);
    assert_eq!(host.failures(), vec!["lookup failed".to_string()]);
}

#[test]
fn test_check_err_aborts_when_fail_fast() {
    let host = RecordingHost::default();
    let t = Toast::new(&host);

    let outcome = run_case(|| t.check_err(lookup("user:7")));

    assert!(outcome.aborted);
    assert_eq!(host.aborts(), 1);
}

#[test]
fn test_check_err_renders_anyhow_context() {
    let host = RecordingHost::default();
    let t = lenient(&host);

    let result = lookup("user:7").context("loading profile");
    t.check_err(result);

    assert_eq!(
        host.failures(),
        vec!["loading profile: lookup failed: key not found: user:7".to_string()]
    );
}

#[test]
fn test_expect_err_finds_target_in_chain() {
    let host = RecordingHost::default();
    let t = Toast::new(&host);
    let err = lookup("user:7").unwrap_err();

    let outcome = run_case(|| {
        t.expect_err(Some(&err), Some(&StoreError::NotFound("user:7".to_string())));
    });

    assert!(outcome.completed());
    assert!(host.entries().is_empty());
}

#[test]
fn test_expect_err_is_identity_not_type() {
    let host = RecordingHost::default();
    let t = lenient(&host);
    let err = lookup("user:7").unwrap_err();

    t.expect_err(Some(&err), Some(&StoreError::NotFound("user:8".to_string())));
    t.expect_err(Some(&err), Some(&StoreError::ReadOnly));

    assert_eq!(
        host.failures(),
        vec![
            "expecting key not found: user:8 got lookup failed".to_string(),
            "expecting store is read-only got lookup failed".to_string(),
        ]
    );
}

#[test]
fn test_expect_err_through_anyhow() {
    let host = RecordingHost::default();
    let t = lenient(&host);
    let err = lookup("user:7").context("loading profile").unwrap_err();

    t.expect_err(Some(&*err), Some(&StoreError::NotFound("user:7".to_string())));

    assert!(host.entries().is_empty());
}

#[test]
fn test_expect_err_absence_rules() {
    let host = RecordingHost::default();
    let t = lenient(&host);
    let err = ServiceError::Timeout;

    t.expect_err::<StoreError>(None, None);
    assert!(host.entries().is_empty());

    t.expect_err::<StoreError>(Some(&err), None);
    t.expect_err(None, Some(&StoreError::ReadOnly));

    assert_eq!(
        host.failures(),
        vec![
            "expecting <none> got timed out".to_string(),
            "expecting store is read-only got <none>".to_string(),
        ]
    );
}

#[test]
fn test_expect_err_type() {
    let host = RecordingHost::default();
    let t = lenient(&host);
    let err = lookup("user:7").unwrap_err();
    let as_dyn: &(dyn std::error::Error + 'static) = &err;

    t.expect_err_type::<StoreError>(Some(as_dyn));
    t.expect_err_type::<ServiceError>(Some(as_dyn));
    assert!(host.entries().is_empty());

    t.expect_err_type::<std::io::Error>(Some(as_dyn));
    t.expect_err_type::<StoreError>(None);

    let failures = host.failures();
    assert_eq!(failures.len(), 2);
    assert!(failures[0].starts_with("expecting error of type std::io::error::Error got lookup failed"));
    assert!(failures[1].ends_with("got <none>"));
}
