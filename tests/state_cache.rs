use std::sync::Arc;
use serde_json::{json, Value};
use prima_state::{cache_key, AppContext, ErrorType, ManualClock, Page, StateContainer, System};


fn container(ttl_ms: i64) -> (StateContainer, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    (StateContainer::new(ttl_ms, clock.clone()), clock)
}


#[test]
fn entry_expires_and_can_be_refilled() {
    let (state, clock) = container(100);

    state.set_cached_data("k", json!({"x": 1}));
    assert_eq!(state.get_cached_data("k"), Some(json!({"x": 1})));

    clock.advance(150);
    assert_eq!(state.get_cached_data("k"), None);
    assert_eq!(state.get_cached_data("k"), None);

    state.set_cached_data("k", json!({"x": 2}));
    assert_eq!(state.get_cached_data("k"), Some(json!({"x": 2})));
}


#[test]
fn ttl_boundary_is_still_fresh() {
    let (state, clock) = container(100);
    state.set_cached_data("k", json!(true));

    clock.advance(100);
    assert_eq!(state.get_cached_data("k"), Some(json!(true)));
    clock.advance(1);
    assert_eq!(state.get_cached_data("k"), None);
}


#[test]
fn filtered_and_unfiltered_clear() {
    let (state, _clock) = container(60_000);
    for key in ["a_1", "a_2", "b_1"] {
        state.set_cached_data(key, json!(key));
    }

    assert_eq!(state.clear_cache(Some("a_")), 2);
    assert_eq!(state.get_cached_data("b_1"), Some(json!("b_1")));

    state.set_cached_data("a_1", json!(1));
    assert_eq!(state.clear_cache(None), 2);
    assert_eq!(state.get_cached_data("a_1"), None);
    assert_eq!(state.get_cached_data("b_1"), None);
}


#[test]
fn scoped_keys_can_be_invalidated_per_org() {
    let (state, _clock) = container(60_000);
    state.set_cached_data(&cache_key("leads", "org1", "7d"), json!([1]));
    state.set_cached_data(&cache_key("leads", "org1", "30d"), json!([1, 2]));
    state.set_cached_data(&cache_key("leads", "org2", "7d"), json!([3]));

    assert_eq!(state.clear_cache(Some("_org1_")), 2);
    assert_eq!(state.get_cached_data("leads_org2_7d"), Some(json!([3])));
}


#[test]
fn nested_objects_are_replaced_not_patched() {
    let (mut state, _clock) = container(60_000);
    state.set_state(json!({"profile": {"name": "A"}})).unwrap();
    state.set_state(json!({"profile": {"email": "x"}})).unwrap();

    assert_eq!(state.get_state("profile"), Some(json!({"email": "x"})));
}


#[test]
fn rejected_updates_leave_state_untouched() {
    let (mut state, _clock) = container(60_000);
    state.set_state(json!({"filters": {"status": "open"}})).unwrap();
    let before = state.get_state_all();

    for bad in [Value::Null, json!("not an object"), json!(3), json!([{"a": 1}])] {
        let result = state.set_state(bad);
        assert!(matches!(result, Err(ErrorType::InvalidArgument(_))));
    }

    assert_eq!(state.get_state_all(), before);
    assert_eq!(state.errors().len(), 4);
}


#[test]
fn whole_state_reads_are_copies() {
    let (mut state, _clock) = container(60_000);
    state.set_state(json!({"selected": [1, 2]})).unwrap();

    let mut snapshot = state.get_state_all();
    if let Some(Value::Array(selected)) = snapshot.fields.get_mut("selected") {
        selected.clear();
    }

    assert_eq!(state.get_state("selected"), Some(json!([1, 2])));
}


#[test]
fn hit_counter_ignores_misses_and_expiries() {
    let (state, clock) = container(1_000);
    state.set_cached_data("dashboard_org1_today", json!({"leads": 12}));

    for _ in 0..5 {
        assert!(state.get_cached_data("dashboard_org1_today").is_some());
    }
    for _ in 0..3 {
        assert!(state.get_cached_data("unknown").is_none());
    }
    clock.advance(1_001);
    assert!(state.get_cached_data("dashboard_org1_today").is_none());

    assert_eq!(state.cache_hits(), 5);
    assert_eq!(state.cache().metrics().misses, 4);
}


#[tokio::test]
async fn page_controller_flow() {
    let clock = Arc::new(ManualClock::new(0));
    let ctx = AppContext::with_clock(System::default(), clock.clone());
    let mut reports = ctx.new_container(Page::Reports);
    let key = cache_key("revenue", "org7", "30d");

    reports.set_state(json!({"is_loading": true})).unwrap();
    let data = ctx.fetcher
        .get_or_fetch(reports.cache(), &key, || async { Ok::<_, String>(json!({"total": 1500})) })
        .await
        .unwrap();
    reports.set_state(json!({"is_loading": false, "revenue": data})).unwrap();

    assert_eq!(reports.get_state("revenue"), Some(json!({"total": 1500})));
    assert_eq!(reports.get_cached_data(&key), Some(json!({"total": 1500})));

    let err = ctx.fetcher
        .get_or_fetch(reports.cache(), "pipeline_org7_30d", || async { Err::<Value, _>("503") })
        .await
        .unwrap_err();
    reports.set_state(json!({"last_error": err.to_string()})).unwrap();

    assert!(matches!(err, ErrorType::FetchFailure(_)));
    assert!(reports.errors().is_empty());
}
