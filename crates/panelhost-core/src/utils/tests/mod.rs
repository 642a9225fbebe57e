use std::collections::HashMap;

use crate::utils::{error_chain, merge_config, panic_message};

#[derive(Debug, thiserror::Error)]
#[error("outer failure")]
struct Outer {
    #[source]
    source: Inner,
}

#[derive(Debug, thiserror::Error)]
#[error("inner cause")]
struct Inner;

#[test]
fn test_panic_message_variants() {
    let static_str = std::panic::catch_unwind(|| panic!("boom")).unwrap_err();
    assert_eq!(panic_message(static_str.as_ref()), "boom");

    let owned = std::panic::catch_unwind(|| panic!("code {}", 7)).unwrap_err();
    assert_eq!(panic_message(owned.as_ref()), "code 7");

    let opaque = std::panic::catch_unwind(|| std::panic::panic_any(42u8)).unwrap_err();
    assert_eq!(panic_message(opaque.as_ref()), "Unknown panic reason");
}

#[test]
fn test_error_chain_walks_sources() {
    let err = Outer { source: Inner };
    assert_eq!(error_chain(&err), vec!["outer failure".to_string(), "inner cause".to_string()]);
}

#[test]
fn test_merge_config_overwrites_only_given_keys() {
    let base: HashMap<String, String> = [("a".into(), "1".into()), ("b".into(), "old".into())].into();
    let partial: HashMap<String, String> = [("b".into(), "new".into()), ("c".into(), "3".into())].into();

    let merged = merge_config(&base, &partial);
    assert_eq!(merged.len(), 3);
    assert_eq!(merged["a"], "1");
    assert_eq!(merged["b"], "new");
    assert_eq!(merged["c"], "3");
}
