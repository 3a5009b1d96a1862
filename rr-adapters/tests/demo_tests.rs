//! Integration tests for the DemoOptimizer

use rr_adapters::DemoOptimizer;
use rr_core::model::{Algorithm, Location, OptimizationRequest, Point, Route, RETURN_TO_START};
use rr_core::optimizer::{OptimizeError, RouteOptimizer};
use rr_core::units::Minutes;
use rr_core::CoreError;

fn location(id: &str, x: f64, y: f64, loading: f64, penalty_time: f64, rate: f64) -> Location {
    Location {
        id: id.to_string(),
        x,
        y,
        loading_time: Minutes(loading),
        penalty_time: Minutes(penalty_time),
        penalty_rate: rate,
    }
}

fn two_stop_request() -> OptimizationRequest {
    OptimizationRequest {
        locations: vec![
            location("L1", 3.0, 4.0, 2.0, 4.0, 2.0),
            location("L2", 3.0, 0.0, 1.0, 100.0, 1.0),
        ],
        algorithm: Algorithm::Aco,
    }
}

#[test]
fn test_demo_optimizer_name() {
    assert_eq!(DemoOptimizer::new().name(), "demo");
}

#[test]
fn test_demo_optimizer_visits_in_submission_order() {
    let response = DemoOptimizer::new().plan(&two_stop_request()).unwrap();

    assert_eq!(response.route, vec!["L1", "L2"]);
    assert_eq!(
        response.coordinates,
        vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 4.0),
            Point::new(3.0, 0.0),
            Point::new(0.0, 0.0),
        ]
    );
    assert_eq!(
        response.route_sequence,
        vec!["Start (0,0)", "L1", "L2", RETURN_TO_START]
    );
    assert_eq!(response.algorithm_used, "Demo (Ant Colony Optimization)");
}

#[test]
fn test_demo_optimizer_cost_breakdown() {
    let response = DemoOptimizer::new().plan(&two_stop_request()).unwrap();

    assert_eq!(response.total_distance.0, 12.0);
    assert_eq!(response.total_loading_time.0, 3.0);
    assert_eq!(response.total_penalty, 2.0);
    assert_eq!(response.grand_total_cost, 17.0);
    assert_eq!(response.penalties.get("L1"), Some(&2.0));
    assert!(!response.penalties.contains_key("L2"));

    let first = &response.location_details[0];
    assert_eq!(first.arrival_time.0, 5.0);
    assert!(first.penalty_applied);
    assert_eq!(first.distance.0, 5.0);

    let second = &response.location_details[1];
    assert_eq!(second.arrival_time.0, 11.0);
    assert!(!second.penalty_applied);
    assert_eq!(second.penalty, 0.0);
}

#[test]
fn test_demo_response_is_a_playable_route() {
    let response = DemoOptimizer::new().plan(&two_stop_request()).unwrap();
    let route = Route::from_response(&response).unwrap();
    assert_eq!(route.segment_count(), 3);
    assert_eq!(route.stops(), &["L1", "L2", RETURN_TO_START]);
}

#[test]
fn test_demo_optimizer_rejects_invalid_request() {
    let mut request = two_stop_request();
    request.locations.truncate(1);

    match DemoOptimizer::new().plan(&request) {
        Err(OptimizeError::Invalid(CoreError::TooFewLocations(1))) => {}
        other => panic!("expected TooFewLocations, got {other:?}"),
    }
}

#[tokio::test]
async fn test_demo_optimizer_through_trait_object() {
    let optimizer: Box<dyn RouteOptimizer> = Box::new(DemoOptimizer::new());
    let request = two_stop_request();
    let response = optimizer.optimize(&request).await.unwrap();
    assert_eq!(response.evaluations_used, 1);
}
