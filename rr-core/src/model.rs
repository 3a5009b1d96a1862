//! Route data model and the optimization service contract
//!
//! Coordinate system: warehouse floor plan, depot at the origin.
//! - X: grid units to the right
//! - Y: grid units up
//!
//! Field names on the wire are camelCase to match the optimization service.

use crate::error::{CoreError, CoreResult};
use crate::units::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Stop identifier the service uses for the final leg back to the depot.
pub const RETURN_TO_START: &str = "Return to Start";

/// Point on the warehouse floor, serialized as `[x, y]`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation towards `other`; `t = 0` is `self`, `t = 1` is `other`.
    pub fn lerp(self, other: Point, t: f64) -> Point {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// Direction of travel from `self` to `other`
    pub fn heading_to(self, other: Point) -> Degrees {
        Degrees::from_vector(other.x - self.x, other.y - self.y)
    }

    /// Euclidean distance
    pub fn distance_to(self, other: Point) -> GridUnits {
        GridUnits((other.x - self.x).hypot(other.y - self.y))
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Polyline of a computed route plus the stop reached at the end of each segment.
///
/// Segment `i` runs from `coordinates[i]` to `coordinates[i + 1]` and ends at
/// `stops[i]`, so there is always exactly one stop fewer than coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    coordinates: Vec<Point>,
    #[serde(rename = "stopSequence")]
    stops: Vec<String>,
}

impl Route {
    /// Build a route, checking that coordinates and stops line up.
    ///
    /// Routes with fewer than two coordinates are allowed here; they replay
    /// as a stationary robot.
    pub fn new(coordinates: Vec<Point>, stops: Vec<String>) -> CoreResult<Self> {
        let expected = coordinates.len().saturating_sub(1);
        if stops.len() != expected {
            return Err(CoreError::InconsistentRoute {
                coordinates: coordinates.len(),
                stops: stops.len(),
                expected,
            });
        }
        Ok(Self { coordinates, stops })
    }

    /// Accept a service response as a playable route.
    ///
    /// The service reports only the visited locations in `route`; when the
    /// return leg is missing it is named [`RETURN_TO_START`].
    pub fn from_response(response: &OptimizationResponse) -> CoreResult<Self> {
        let coordinates = response.coordinates.clone();
        if coordinates.len() < 2 {
            return Err(CoreError::DegenerateRoute {
                coordinates: coordinates.len(),
            });
        }

        let segments = coordinates.len() - 1;
        let mut stops = response.route.clone();
        if stops.len() + 1 == segments {
            stops.push(RETURN_TO_START.to_string());
        }

        Self::new(coordinates, stops)
    }

    pub fn coordinates(&self) -> &[Point] {
        &self.coordinates
    }

    pub fn stops(&self) -> &[String] {
        &self.stops
    }

    pub fn segment_count(&self) -> usize {
        self.coordinates.len().saturating_sub(1)
    }

    /// True when there is no segment to travel along
    pub fn is_degenerate(&self) -> bool {
        self.segment_count() == 0
    }

    /// Total polyline length
    pub fn length(&self) -> GridUnits {
        GridUnits(
            self.coordinates
                .windows(2)
                .map(|w| w[0].distance_to(w[1]).0)
                .sum(),
        )
    }
}

/// Optimization algorithm offered by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum Algorithm {
    #[default]
    Ga,
    Sa,
    Pso,
    Aco,
    Ts,
    De,
    Abc,
    Mabc,
}

impl Algorithm {
    pub const ALL: [Algorithm; 8] = [
        Algorithm::Ga,
        Algorithm::Sa,
        Algorithm::Pso,
        Algorithm::Aco,
        Algorithm::Ts,
        Algorithm::De,
        Algorithm::Abc,
        Algorithm::Mabc,
    ];

    /// Wire code, e.g. `"PSO"`
    pub fn code(&self) -> &'static str {
        match self {
            Algorithm::Ga => "GA",
            Algorithm::Sa => "SA",
            Algorithm::Pso => "PSO",
            Algorithm::Aco => "ACO",
            Algorithm::Ts => "TS",
            Algorithm::De => "DE",
            Algorithm::Abc => "ABC",
            Algorithm::Mabc => "MABC",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Algorithm::Ga => "Genetic Algorithm",
            Algorithm::Sa => "Simulated Annealing",
            Algorithm::Pso => "Particle Swarm Optimization",
            Algorithm::Aco => "Ant Colony Optimization",
            Algorithm::Ts => "Tabu Search",
            Algorithm::De => "Differential Evolution",
            Algorithm::Abc => "Artificial Bee Colony",
            Algorithm::Mabc => "Modified Artificial Bee Colony",
        }
    }
}

impl FromStr for Algorithm {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        if code == "TABU" {
            return Ok(Algorithm::Ts);
        }
        Algorithm::ALL
            .into_iter()
            .find(|a| a.code() == code)
            .ok_or_else(|| CoreError::UnknownAlgorithm(s.to_string()))
    }
}

impl TryFrom<String> for Algorithm {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Delivery location submitted for optimization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    pub x: f64,
    pub y: f64,
    /// Dwell time at the location
    pub loading_time: Minutes,
    /// Arrival later than this accrues a penalty
    pub penalty_time: Minutes,
    /// Penalty per minute late
    pub penalty_rate: f64,
}

impl Location {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn validate(&self) -> CoreResult<()> {
        let invalid = |reason: &str| {
            Err(CoreError::InvalidLocation {
                id: self.id.clone(),
                reason: reason.to_string(),
            })
        };

        if self.id.trim().is_empty() {
            return invalid("location id must not be empty");
        }
        let fields = [
            self.x,
            self.y,
            self.loading_time.0,
            self.penalty_time.0,
            self.penalty_rate,
        ];
        if fields.iter().any(|v| !v.is_finite()) {
            return invalid("all fields must contain valid numbers");
        }
        if self.x < 0.0 || self.y < 0.0 {
            return invalid("coordinates must not be negative");
        }
        if self.loading_time.0 <= 0.0 {
            return invalid("loading time must be greater than 0");
        }
        if self.penalty_time.0 <= 0.0 {
            return invalid("penalty time must be greater than 0");
        }
        if self.penalty_rate < 0.0 {
            return invalid("penalty rate cannot be negative");
        }
        Ok(())
    }
}

/// Body of `POST /optimize`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRequest {
    pub locations: Vec<Location>,
    #[serde(default)]
    pub algorithm: Algorithm,
}

impl OptimizationRequest {
    pub fn validate(&self) -> CoreResult<()> {
        if self.locations.len() < 2 {
            return Err(CoreError::TooFewLocations(self.locations.len()));
        }

        let mut seen = HashSet::new();
        for location in &self.locations {
            location.validate()?;
            if !seen.insert(location.id.as_str()) {
                return Err(CoreError::DuplicateLocation(location.id.clone()));
            }
        }
        Ok(())
    }
}

/// Per-stop breakdown reported by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationDetail {
    pub id: String,
    pub arrival_time: Minutes,
    pub loading_time: Minutes,
    pub penalty: f64,
    pub penalty_applied: bool,
    pub distance: GridUnits,
    pub travel_time: Minutes,
    pub x: f64,
    pub y: f64,
}

/// Response of `POST /optimize`
///
/// Only `route` and `coordinates` drive playback; the remaining fields are
/// passed through for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResponse {
    pub route: Vec<String>,
    pub coordinates: Vec<Point>,
    #[serde(default)]
    pub total_distance: GridUnits,
    #[serde(default)]
    pub total_loading_time: Minutes,
    #[serde(default)]
    pub total_penalty: f64,
    #[serde(default)]
    pub grand_total_cost: f64,
    #[serde(default)]
    pub route_sequence: Vec<String>,
    #[serde(default)]
    pub penalties: HashMap<String, f64>,
    #[serde(default)]
    pub algorithm_used: String,
    #[serde(default)]
    pub location_details: Vec<LocationDetail>,
    #[serde(default)]
    pub evaluations_used: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(id: &str, x: f64, y: f64) -> Location {
        Location {
            id: id.to_string(),
            x,
            y,
            loading_time: Minutes(2.0),
            penalty_time: Minutes(30.0),
            penalty_rate: 1.5,
        }
    }

    fn response(route: &[&str], coordinates: &[[f64; 2]]) -> OptimizationResponse {
        serde_json::from_value(serde_json::json!({
            "route": route,
            "coordinates": coordinates,
        }))
        .unwrap()
    }

    #[test]
    fn test_point_serializes_as_pair() {
        let json = serde_json::to_string(&Point::new(3.0, 4.5)).unwrap();
        assert_eq!(json, "[3.0,4.5]");

        let p: Point = serde_json::from_str("[1, 2]").unwrap();
        assert_eq!(p, Point::new(1.0, 2.0));
    }

    #[test]
    fn test_point_lerp_and_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 20.0);
        assert_eq!(a.lerp(b, 0.25), Point::new(2.5, 5.0));
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(Point::new(0.0, 0.0).distance_to(Point::new(3.0, 4.0)).0, 5.0);
    }

    #[test]
    fn test_route_new_rejects_mismatched_stops() {
        let err = Route::new(
            vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)],
            vec!["A".into(), "B".into()],
        )
        .unwrap_err();
        assert_eq!(
            err,
            CoreError::InconsistentRoute {
                coordinates: 2,
                stops: 2,
                expected: 1
            }
        );
    }

    #[test]
    fn test_route_new_allows_degenerate() {
        let route = Route::new(vec![Point::new(4.0, 4.0)], vec![]).unwrap();
        assert!(route.is_degenerate());
        assert_eq!(route.segment_count(), 0);

        let empty = Route::new(vec![], vec![]).unwrap();
        assert!(empty.is_degenerate());
    }

    #[test]
    fn test_route_from_response_appends_return_leg() {
        let resp = response(&["L1", "L2"], &[[0.0, 0.0], [3.0, 0.0], [3.0, 4.0], [0.0, 0.0]]);
        let route = Route::from_response(&resp).unwrap();
        assert_eq!(route.stops(), &["L1", "L2", RETURN_TO_START]);
        assert_eq!(route.segment_count(), 3);
        assert_eq!(route.length().0, 12.0);
    }

    #[test]
    fn test_route_from_response_keeps_complete_stop_list() {
        let resp = response(&["A", "B"], &[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0]]);
        let route = Route::from_response(&resp).unwrap();
        assert_eq!(route.stops(), &["A", "B"]);
    }

    #[test]
    fn test_route_from_response_rejects_degenerate_and_inconsistent() {
        let single = response(&[], &[[0.0, 0.0]]);
        assert_eq!(
            Route::from_response(&single).unwrap_err(),
            CoreError::DegenerateRoute { coordinates: 1 }
        );

        let wrong = response(&["A"], &[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [0.0, 0.0]]);
        assert!(matches!(
            Route::from_response(&wrong),
            Err(CoreError::InconsistentRoute { .. })
        ));
    }

    #[test]
    fn test_route_serializes_stop_sequence() {
        let route = Route::new(
            vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)],
            vec!["A".into()],
        )
        .unwrap();
        let json = serde_json::to_value(&route).unwrap();
        assert_eq!(json["stopSequence"][0], "A");
        assert_eq!(json["coordinates"][1][0], 1.0);
    }

    #[test]
    fn test_algorithm_parse() {
        assert_eq!("GA".parse::<Algorithm>().unwrap(), Algorithm::Ga);
        assert_eq!("mabc".parse::<Algorithm>().unwrap(), Algorithm::Mabc);
        assert_eq!("TABU".parse::<Algorithm>().unwrap(), Algorithm::Ts);
        assert_eq!(
            "HYPER".parse::<Algorithm>().unwrap_err(),
            CoreError::UnknownAlgorithm("HYPER".into())
        );
    }

    #[test]
    fn test_algorithm_serialization() {
        assert_eq!(serde_json::to_string(&Algorithm::Pso).unwrap(), "\"PSO\"");
        let a: Algorithm = serde_json::from_str("\"aco\"").unwrap();
        assert_eq!(a, Algorithm::Aco);
        assert!(serde_json::from_str::<Algorithm>("\"XYZ\"").is_err());
        assert_eq!(Algorithm::De.label(), "Differential Evolution");
    }

    #[test]
    fn test_request_defaults_algorithm_and_uses_camel_case() {
        let req: OptimizationRequest = serde_json::from_value(serde_json::json!({
            "locations": [
                {"id": "L1", "x": 1, "y": 2, "loadingTime": 3, "penaltyTime": 10, "penaltyRate": 0},
            ]
        }))
        .unwrap();
        assert_eq!(req.algorithm, Algorithm::Ga);
        assert_eq!(req.locations[0].loading_time, Minutes(3.0));
    }

    #[test]
    fn test_request_validation() {
        let mut req = OptimizationRequest {
            locations: vec![location("L1", 1.0, 1.0)],
            algorithm: Algorithm::Sa,
        };
        assert_eq!(req.validate().unwrap_err(), CoreError::TooFewLocations(1));

        req.locations.push(location("L2", 5.0, 2.0));
        assert!(req.validate().is_ok());

        req.locations.push(location("L2", 6.0, 2.0));
        assert_eq!(
            req.validate().unwrap_err(),
            CoreError::DuplicateLocation("L2".into())
        );
    }

    #[test]
    fn test_location_validation_messages() {
        let mut loc = location("L1", -1.0, 0.0);
        assert!(loc.validate().unwrap_err().to_string().contains("negative"));

        loc.x = 1.0;
        loc.loading_time = Minutes(0.0);
        assert!(loc.validate().unwrap_err().to_string().contains("loading time"));

        loc.loading_time = Minutes(1.0);
        loc.penalty_time = Minutes(-2.0);
        assert!(loc.validate().unwrap_err().to_string().contains("penalty time"));

        loc.penalty_time = Minutes(5.0);
        loc.penalty_rate = -0.1;
        assert!(loc.validate().unwrap_err().to_string().contains("penalty rate"));

        loc.penalty_rate = f64::NAN;
        assert!(loc.validate().unwrap_err().to_string().contains("valid numbers"));
    }

    #[test]
    fn test_response_presentation_fields_default() {
        let resp = response(&["L1"], &[[0.0, 0.0], [1.0, 1.0], [0.0, 0.0]]);
        assert_eq!(resp.total_penalty, 0.0);
        assert!(resp.location_details.is_empty());
        assert_eq!(resp.evaluations_used, 0);
    }
}
