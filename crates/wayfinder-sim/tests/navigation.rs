//! End-to-end navigation scenarios.
//!
//! A real [`NavigationSession`] drives a [`SimEngine`] through complete
//! trips: preview, guidance playback, terminal banners, preference-driven
//! avoidances, and sync recovery. Playback runs at a millisecond tick so
//! whole trips finish in test time.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use wayfinder::preferences::store::{MemoryPreferenceStore, PreferenceStore};
use wayfinder::preferences::keys;
use wayfinder::route::RouteEventKind;
use wayfinder::{Config, Engine, NavigationSession, PreferenceAdapter};
use wayfinder_sim::{SimConfig, SimEngine, SimVenue};

fn fast_sim(sync_failures: u32) -> SimConfig {
    SimConfig {
        tick: Duration::from_millis(1),
        stride_m: 5.0,
        sync_failures,
        ..SimConfig::default()
    }
}

fn accepted_adapter(store: MemoryPreferenceStore) -> PreferenceAdapter {
    let adapter = PreferenceAdapter::new(store);
    adapter.set_policy_accepted(true).unwrap();
    adapter
}

async fn start_session(sim: SimConfig, adapter: PreferenceAdapter) -> NavigationSession {
    let mut config = Config::default();
    config.routing.sync_retry_delay_secs = 0;
    let engine: Arc<dyn Engine> = Arc::new(SimEngine::with_config(sim));
    NavigationSession::start(&config, engine, adapter)
        .await
        .unwrap()
}

async fn session() -> NavigationSession {
    start_session(fast_sim(0), accepted_adapter(MemoryPreferenceStore::new())).await
}

/// Pump engine events into the session until `pred` holds.
async fn drive_until<F>(session: &mut NavigationSession, mut pred: F)
where
    F: FnMut(&NavigationSession) -> bool,
{
    timeout(Duration::from_secs(5), async {
        while !pred(session) {
            session
                .next_event()
                .await
                .expect("engine event stream ended");
        }
    })
    .await
    .expect("session never reached the expected state");
}

#[tokio::test]
async fn test_full_trip_reaches_destination() {
    let mut session = session().await;

    session.preview_route("poi-cafe").await.unwrap();
    drive_until(&mut session, |s| s.navigation().route().is_some()).await;
    assert_eq!(
        session.navigation().route().unwrap().destination.title,
        "Cafe Aurora"
    );
    assert!(!session.navigation().started());

    session.start_navigation().unwrap();
    drive_until(&mut session, |s| s.navigation().started()).await;
    assert!(session.navigation().instruction().unwrap().starts_with("Head "));

    drive_until(&mut session, |s| s.navigation().has_terminal_banner()).await;
    let banner = session.navigation().last_update().unwrap();
    assert_eq!(banner.kind, RouteEventKind::Finished);
    assert!(banner.text.contains("Cafe Aurora"));
    assert!(session.navigation().route().is_none());

    // Advisories picked up along the way survive the trip.
    assert_eq!(session.navigation().hazard().unwrap().id, "hz-wet-floor");
    assert_eq!(session.navigation().segment().unwrap().id, "seg-east-wing");

    // The map followed the walker to the cafe.
    let cafe = SimVenue::demo().feature("poi-cafe").unwrap().position;
    assert!(session.map().position().unwrap().distance_m(&cafe) < 1.0);
    assert_eq!(session.map().map_level(), 0);

    // Back dismisses the banner but keeps the advisory overlays.
    assert!(session.back_press().unwrap());
    assert!(!session.navigation().has_terminal_banner());
    assert!(session.navigation().hazard().is_some());
}

#[tokio::test]
async fn test_cancel_mid_trip_leaves_canceled_banner() {
    let mut session = session().await;

    session.preview_route("poi-cafe").await.unwrap();
    drive_until(&mut session, |s| s.navigation().route().is_some()).await;
    session.start_navigation().unwrap();
    drive_until(&mut session, |s| s.navigation().started()).await;

    // Back during guidance asks the engine to cancel; the banner arrives
    // with the engine's acknowledgement.
    assert!(session.back_press().unwrap());
    drive_until(&mut session, |s| s.navigation().has_terminal_banner()).await;
    assert_eq!(
        session.navigation().last_update().unwrap().kind,
        RouteEventKind::Canceled
    );
    assert!(!session.navigation().started());

    assert!(session.back_press().unwrap());
    assert!(session.navigation().last_update().is_none());
    assert!(!session.back_press().unwrap());
}

#[tokio::test]
async fn test_avoid_stairs_routes_through_elevator() {
    let store = MemoryPreferenceStore::new();
    store.set(keys::AVOID_STAIRS, "true").unwrap();
    let mut session = start_session(fast_sim(0), accepted_adapter(store)).await;
    assert!(session.preferences().route_options().avoid_stairs);

    session.preview_route("poi-pharmacy").await.unwrap();
    drive_until(&mut session, |s| s.navigation().route().is_some()).await;
    let route = session.navigation().route().unwrap();
    assert!(route.steps.iter().any(|s| s.direction.is_elevator()));
    assert!(!route.steps.iter().any(|s| s.direction.is_stairs()));

    session.start_navigation().unwrap();
    drive_until(&mut session, |s| s.navigation().has_terminal_banner()).await;
    assert_eq!(
        session.navigation().last_update().unwrap().kind,
        RouteEventKind::Finished
    );
    // The elevator ride moved the map to the pharmacy's floor.
    assert_eq!(session.map().user_level(), 1);
    assert_eq!(session.map().map_level(), 1);
}

#[tokio::test]
async fn test_unreachable_destination_shows_route_not_found() {
    let store = MemoryPreferenceStore::new();
    store.set(keys::AVOID_STAIRS, "true").unwrap();
    let mut session = start_session(fast_sim(0), accepted_adapter(store)).await;

    // The clinic floor is served by stairs only.
    session.preview_route("poi-clinic").await.unwrap();
    drive_until(&mut session, |s| s.navigation().has_terminal_banner()).await;
    assert_eq!(
        session.navigation().last_update().unwrap().kind,
        RouteEventKind::RouteNotFound
    );
    assert!(session.navigation().route().is_none());

    assert!(session.back_press().unwrap());
    assert!(!session.navigation().has_terminal_banner());
}

#[tokio::test]
async fn test_initial_sync_failure_retries_and_recovers() {
    let mut session = start_session(
        fast_sim(1),
        accepted_adapter(MemoryPreferenceStore::new()),
    )
    .await;

    // The first sync failed, so nothing is known yet.
    assert_eq!(session.search().result_count(), 0);
    assert!(session.map().position().is_none());

    // The failure event schedules a retry; the retry succeeds and delivers
    // venue data plus the first position fix.
    drive_until(&mut session, |s| s.search().result_count() > 0).await;
    drive_until(&mut session, |s| s.map().position().is_some()).await;
    assert!(session.map().in_covered_area());

    session.preview_route("poi-cafe").await.unwrap();
    drive_until(&mut session, |s| s.navigation().route().is_some()).await;
}
