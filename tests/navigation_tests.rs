use refugeroute::config::GuidanceConfig;
use refugeroute::error::LocationError;
use refugeroute::map::{select_map_view, WebMapOutbox};
use refugeroute::models::{Coordinates, LocationSample, MapSettings, RefugeZone, RouteSource};
use refugeroute::services::guidance::GuidanceState;
use refugeroute::services::location::{FixedLocationProvider, LocationProvider, LocationStatus};
use refugeroute::services::navigation::{
    spawn_session, NavigationController, SessionHandle, SessionServices,
};
use refugeroute::services::registry::RefugeRegistry;
use refugeroute::services::route_provider::{RouteProvider, StraightLineRouteProvider};
use std::sync::Arc;

mod common;

use common::{
    km_per_lng_degree, wait_for_routes, GatedRouteProvider, RecordingControl, RecordingSink,
};

const LAT: f64 = 43.6047;
const REFUGE_LNG: f64 = 1.4500;

fn single_refuge_registry() -> Arc<RefugeRegistry> {
    Arc::new(
        RefugeRegistry::new(vec![RefugeZone::new(
            "refuge-east",
            "Refuge Est",
            LAT,
            REFUGE_LNG,
            10.0,
        )
        .unwrap()])
        .unwrap(),
    )
}

/// A sample due west of the refuge, `distance_km` away.
fn west_of_refuge(distance_km: f64) -> LocationSample {
    let lng = REFUGE_LNG - distance_km / km_per_lng_degree(LAT);
    LocationSample::at(Coordinates::new(LAT, lng).unwrap())
}

struct Harness {
    handle: SessionHandle,
    speech: RecordingSink,
    map: RecordingControl,
}

fn start_session(
    registry: Arc<RefugeRegistry>,
    routes: Arc<dyn RouteProvider>,
    location: Option<Arc<dyn LocationProvider>>,
) -> Harness {
    let speech = RecordingSink::default();
    let map = RecordingControl::default();

    let controller = NavigationController::new(
        registry,
        select_map_view(Some(Box::new(map.clone())), WebMapOutbox::new()),
        Box::new(speech.clone()),
        MapSettings::default(),
        GuidanceConfig::default(),
    );
    let handle = spawn_session(controller, SessionServices { routes, location });

    Harness { handle, speech, map }
}

#[tokio::test]
async fn test_full_approach_announces_every_threshold() {
    let h = start_session(
        single_refuge_registry(),
        Arc::new(StraightLineRouteProvider),
        None,
    );

    h.handle.location_update(west_of_refuge(0.73)).unwrap();
    assert!(h.handle.start_navigation().await.unwrap());

    for distance in [0.73, 0.6, 0.45, 0.18, 0.08, 0.04, 0.01] {
        h.handle.location_update(west_of_refuge(distance)).unwrap();
    }
    let snapshot = wait_for_routes(&h.handle).await;

    assert_eq!(
        h.speech.spoken(),
        vec![
            "Démarrage de la navigation vers Refuge Est",
            "Vous êtes à 500 mètres du refuge",
            "Vous êtes à 200 mètres du refuge",
            "Vous êtes à 100 mètres du refuge. Vous êtes presque arrivé",
            "Vous êtes à 50 mètres. Le refuge est juste devant vous",
            "Vous êtes arrivé au refuge. Vous êtes en sécurité",
        ]
    );
    // Speech is cut right before the arrival line
    let events = h.speech.events.lock().unwrap().clone();
    assert_eq!(events[events.len() - 2], "<stop>");

    assert!(snapshot.is_navigating);
    assert!(!snapshot.voice_guidance_active);
    assert_eq!(snapshot.guidance_state, GuidanceState::Arrived);
    assert_eq!(snapshot.route.len(), 21);
    assert_eq!(snapshot.route_source, Some(RouteSource::Fallback));
}

#[tokio::test]
async fn test_backing_away_after_arrival_stays_silent() {
    let h = start_session(
        single_refuge_registry(),
        Arc::new(StraightLineRouteProvider),
        None,
    );

    h.handle.location_update(west_of_refuge(0.03)).unwrap();
    h.handle.start_navigation().await.unwrap();
    h.handle.location_update(west_of_refuge(0.03)).unwrap();
    h.handle.location_update(west_of_refuge(0.01)).unwrap();
    let spoken_at_arrival = h.speech.spoken().len();

    for distance in [0.1, 0.6, 0.3, 0.01] {
        h.handle.location_update(west_of_refuge(distance)).unwrap();
    }
    h.handle.snapshot().await.unwrap();
    assert_eq!(h.speech.spoken().len(), spoken_at_arrival);

    // Re-enabling guidance resumes it
    assert!(h.handle.toggle_voice_guidance().await.unwrap());
    let snapshot = h.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.guidance_state, GuidanceState::Active);
}

#[tokio::test]
async fn test_route_resolving_after_stop_is_discarded() {
    let routes = Arc::new(GatedRouteProvider::new());
    let gate = routes.gate.clone();
    let h = start_session(single_refuge_registry(), routes, None);

    h.handle.location_update(west_of_refuge(0.73)).unwrap();
    assert!(h.handle.start_navigation().await.unwrap());
    h.handle.stop_navigation().unwrap();

    let before = h.handle.snapshot().await.unwrap();
    assert_eq!(before.pending_route_fetches, 1);

    gate.add_permits(1);
    let after = wait_for_routes(&h.handle).await;

    assert!(!after.is_navigating);
    assert!(!after.voice_guidance_active);
    assert!(after.route.is_empty());
    assert_eq!(after.last_announced_distance_km, None);
    // Cleared on stop and never redrawn
    assert_eq!(h.map.routes.lock().unwrap().last(), Some(&vec![]));
}

#[tokio::test]
async fn test_only_the_latest_start_installs_its_route() {
    let routes = Arc::new(GatedRouteProvider::new());
    let gate = routes.gate.clone();
    let h = start_session(single_refuge_registry(), routes, None);

    h.handle.location_update(west_of_refuge(0.73)).unwrap();
    h.handle.start_navigation().await.unwrap();
    h.handle.location_update(west_of_refuge(0.6)).unwrap();
    h.handle.start_navigation().await.unwrap();

    gate.add_permits(2);
    let snapshot = wait_for_routes(&h.handle).await;

    assert!(snapshot.is_navigating);
    assert_eq!(snapshot.route.len(), 21);
    // The surviving route starts where the second start was issued
    assert_eq!(snapshot.route[0], west_of_refuge(0.6).coordinates);
}

#[tokio::test]
async fn test_new_nearest_refuge_gets_its_own_route() {
    let registry = Arc::new(
        RefugeRegistry::new(vec![
            RefugeZone::new("refuge-east", "Refuge Est", LAT, REFUGE_LNG, 10.0).unwrap(),
            RefugeZone::new("refuge-south", "Refuge Sud", 43.5844, 1.4390, 10.0).unwrap(),
        ])
        .unwrap(),
    );
    let routes = Arc::new(GatedRouteProvider::new());
    let gate = routes.gate.clone();
    let h = start_session(registry, routes, None);

    h.handle
        .location_update(LocationSample::at(Coordinates::new(LAT, 1.4410).unwrap()))
        .unwrap();
    assert!(h.handle.start_navigation().await.unwrap());

    // Walking south: the nearest refuge, and so the target, changes
    let south = Coordinates::new(43.5850, 1.4390).unwrap();
    h.handle.location_update(LocationSample::at(south)).unwrap();
    let before = h.handle.snapshot().await.unwrap();
    assert_eq!(before.effective_target.unwrap().id, "refuge-south");
    assert_eq!(before.pending_route_fetches, 2);

    gate.add_permits(2);
    let snapshot = wait_for_routes(&h.handle).await;

    assert!(snapshot.is_navigating);
    assert_eq!(snapshot.route.len(), 21);
    assert_eq!(snapshot.route[0], south);
    assert_eq!(
        snapshot.route[20],
        Coordinates::new(43.5844, 1.4390).unwrap()
    );
}

#[tokio::test]
async fn test_stop_resets_session() {
    let h = start_session(
        single_refuge_registry(),
        Arc::new(StraightLineRouteProvider),
        None,
    );

    h.handle.location_update(west_of_refuge(0.73)).unwrap();
    h.handle.start_navigation().await.unwrap();
    h.handle.location_update(west_of_refuge(0.7)).unwrap();
    wait_for_routes(&h.handle).await;

    h.handle.stop_navigation().unwrap();
    let snapshot = h.handle.snapshot().await.unwrap();

    assert!(!snapshot.is_navigating);
    assert!(!snapshot.voice_guidance_active);
    assert!(snapshot.route.is_empty());
    assert_eq!(snapshot.last_announced_distance_km, None);
    assert_eq!(h.speech.events.lock().unwrap().last().unwrap(), "<stop>");
}

#[tokio::test]
async fn test_first_fix_animates_native_map_to_user() {
    let h = start_session(
        Arc::new(RefugeRegistry::toulouse()),
        Arc::new(StraightLineRouteProvider),
        None,
    );

    let capitole = Coordinates::new(43.6047, 1.4410).unwrap();
    h.handle.location_update(LocationSample::at(capitole)).unwrap();
    let snapshot = h.handle.snapshot().await.unwrap();

    assert_eq!(snapshot.nearest_refuge.unwrap().id, "refuge-29");

    let regions = h.map.regions.lock().unwrap();
    let (region, duration_ms) = regions.last().unwrap();
    assert_eq!(region.center, capitole);
    assert_eq!(region.latitude_delta, 0.05);
    assert_eq!(*duration_ms, 1000);

    // Current position plus all 35 refuges
    assert_eq!(h.map.markers.lock().unwrap().last().unwrap().len(), 36);
}

#[tokio::test]
async fn test_location_request_uses_provider() {
    let capitole = Coordinates::new(43.6047, 1.4410).unwrap();
    let provider: Arc<dyn LocationProvider> =
        Arc::new(FixedLocationProvider::at(LocationSample::at(capitole)));
    let h = start_session(
        Arc::new(RefugeRegistry::toulouse()),
        Arc::new(StraightLineRouteProvider),
        Some(provider),
    );

    h.handle.request_location().unwrap();
    let mut snapshot = h.handle.snapshot().await.unwrap();
    for _ in 0..100 {
        if snapshot.current_location.is_some() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        snapshot = h.handle.snapshot().await.unwrap();
    }

    assert_eq!(snapshot.location_status, LocationStatus::Available);
    assert_eq!(snapshot.current_location.unwrap().coordinates, capitole);
}

#[tokio::test]
async fn test_permission_denied_is_a_distinct_state() {
    let provider: Arc<dyn LocationProvider> =
        Arc::new(FixedLocationProvider::failing(LocationError::PermissionDenied));
    let h = start_session(
        Arc::new(RefugeRegistry::toulouse()),
        Arc::new(StraightLineRouteProvider),
        Some(provider),
    );

    h.handle.request_location().unwrap();
    let mut snapshot = h.handle.snapshot().await.unwrap();
    for _ in 0..100 {
        if snapshot.location_status != LocationStatus::Locating {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        snapshot = h.handle.snapshot().await.unwrap();
    }

    assert_eq!(snapshot.location_status, LocationStatus::PermissionDenied);
    assert!(snapshot.current_location.is_none());

    // Navigation cannot start without a fix
    assert!(!h.handle.start_navigation().await.unwrap());
}

#[tokio::test]
async fn test_marker_press_selects_refuge() {
    let h = start_session(
        Arc::new(RefugeRegistry::toulouse()),
        Arc::new(StraightLineRouteProvider),
        None,
    );

    let capitole = Coordinates::new(43.6047, 1.4410).unwrap();
    h.handle.location_update(LocationSample::at(capitole)).unwrap();

    assert!(h.handle.focus_refuge("refuge-1".to_string()).await.unwrap());
    let snapshot = h.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.effective_target.unwrap().name, "Centre Labège");

    assert!(!h.handle.focus_refuge("current-location".to_string()).await.unwrap());
    let snapshot = h.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.target_refuge.unwrap().id, "refuge-1");
}
