use super::*;
use serde_json::json;

const MINUTE: Duration = Duration::from_secs(60);

fn cache() -> QueryCache {
    QueryCache::new(CachePolicy::default())
}

#[test]
fn default_policy_is_five_and_ten_minutes() {
    let policy = CachePolicy::default();
    assert_eq!(policy.stale_time, 5 * MINUTE);
    assert_eq!(policy.gc_time, 10 * MINUTE);
}

#[test]
fn unknown_key_misses() {
    let mut c = cache();
    assert_eq!(c.lookup_at("k", Instant::now()), CacheLookup::Miss);
}

#[test]
fn young_entry_is_fresh() {
    let mut c = cache();
    let t0 = Instant::now();
    c.insert_at("k".into(), json!(1), t0);
    assert_eq!(c.lookup_at("k", t0 + 4 * MINUTE), CacheLookup::Fresh(json!(1)));
}

#[test]
fn entry_exactly_at_stale_time_is_still_fresh() {
    let mut c = cache();
    let t0 = Instant::now();
    c.insert_at("k".into(), json!(1), t0);
    assert_eq!(c.lookup_at("k", t0 + 5 * MINUTE), CacheLookup::Fresh(json!(1)));
}

#[test]
fn old_entry_is_stale_but_served() {
    let mut c = cache();
    let t0 = Instant::now();
    c.insert_at("k".into(), json!("v"), t0);
    assert_eq!(c.lookup_at("k", t0 + 6 * MINUTE), CacheLookup::Stale(json!("v")));
}

#[test]
fn reads_keep_stale_entry_alive() {
    let mut c = cache();
    let t0 = Instant::now();
    c.insert_at("k".into(), json!(1), t0);
    // Touched every 9 minutes: stale, never evicted.
    for step in 1..=3 {
        let now = t0 + step * 9 * MINUTE;
        assert_eq!(c.lookup_at("k", now), CacheLookup::Stale(json!(1)));
    }
    assert_eq!(c.evict_expired_at(t0 + 27 * MINUTE + MINUTE), 0);
}

#[test]
fn idle_entry_is_evicted_by_sweep() {
    let mut c = cache();
    let t0 = Instant::now();
    c.insert_at("old".into(), json!(1), t0);
    c.insert_at("new".into(), json!(2), t0 + 5 * MINUTE);
    assert_eq!(c.evict_expired_at(t0 + 10 * MINUTE), 1);
    assert_eq!(c.len(), 1);
    assert_eq!(c.lookup_at("new", t0 + 11 * MINUTE), CacheLookup::Stale(json!(2)));
}

#[test]
fn idle_entry_misses_before_sweep() {
    let mut c = cache();
    let t0 = Instant::now();
    c.insert_at("k".into(), json!(1), t0);
    assert_eq!(c.lookup_at("k", t0 + 10 * MINUTE), CacheLookup::Miss);
    assert!(c.is_empty());
}

#[test]
fn invalidate_marks_entry_stale_until_rewritten() {
    let mut c = cache();
    let t0 = Instant::now();
    c.insert_at("k".into(), json!(1), t0);
    assert!(c.invalidate("k"));
    assert_eq!(c.lookup_at("k", t0), CacheLookup::Stale(json!(1)));
    c.insert_at("k".into(), json!(2), t0);
    assert_eq!(c.lookup_at("k", t0), CacheLookup::Fresh(json!(2)));
    assert!(!c.invalidate("missing"));
}

#[test]
fn refresh_claim_is_exclusive() {
    let mut c = cache();
    let t0 = Instant::now();
    c.insert_at("k".into(), json!(1), t0);
    assert!(c.begin_refresh("k"));
    assert!(!c.begin_refresh("k"));
    c.end_refresh("k");
    assert!(c.begin_refresh("k"));
    // A new result clears the claim.
    c.insert_at("k".into(), json!(2), t0);
    assert!(c.begin_refresh("k"));
    assert!(!c.begin_refresh("missing"));
}

#[test]
fn remove_drops_entry() {
    let mut c = cache();
    c.insert_at("k".into(), json!(1), Instant::now());
    assert!(c.remove("k"));
    assert!(!c.remove("k"));
}
