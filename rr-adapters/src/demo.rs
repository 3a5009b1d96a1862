//! Demo optimizer that answers without a remote service
//!
//! Visits the locations in the order they were submitted, starting and
//! ending at the depot, and fills in the same cost breakdown the service
//! reports. It does not search for a better order; it exists so the replay
//! server can run offline and in tests.

use futures::future::{self, BoxFuture};
use rr_core::model::{
    LocationDetail, OptimizationRequest, OptimizationResponse, Point, RETURN_TO_START,
};
use rr_core::optimizer::{OptimizeError, RouteOptimizer};
use rr_core::units::{GridUnits, Minutes};
use std::collections::HashMap;

/// Robot travel speed in grid units per minute
const TRAVEL_SPEED: f64 = 1.0;

/// Label of the leading depot entry in `routeSequence`
const START_LABEL: &str = "Start (0,0)";

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub struct DemoOptimizer;

impl DemoOptimizer {
    pub fn new() -> Self {
        Self
    }

    /// Build the response for visiting `request.locations` in order.
    pub fn plan(&self, request: &OptimizationRequest) -> Result<OptimizationResponse, OptimizeError> {
        request.validate()?;

        let mut coordinates = vec![Point::ORIGIN];
        let mut details = Vec::with_capacity(request.locations.len());
        let mut penalties = HashMap::new();
        let mut current = Point::ORIGIN;
        let mut clock = 0.0;
        let mut total_distance = 0.0;
        let mut total_loading = 0.0;
        let mut total_penalty = 0.0;

        for location in &request.locations {
            let target = location.position();
            let distance = current.distance_to(target).0;
            let travel_time = distance / TRAVEL_SPEED;
            clock += travel_time;

            let late = clock > location.penalty_time.0;
            let penalty = if late {
                (clock - location.penalty_time.0) * location.penalty_rate
            } else {
                0.0
            };
            if late {
                penalties.insert(location.id.clone(), round2(penalty));
                total_penalty += penalty;
            }

            details.push(LocationDetail {
                id: location.id.clone(),
                arrival_time: Minutes(round2(clock)),
                loading_time: location.loading_time,
                penalty: round2(penalty),
                penalty_applied: late,
                distance: GridUnits(round2(distance)),
                travel_time: Minutes(round2(travel_time)),
                x: location.x,
                y: location.y,
            });

            clock += location.loading_time.0;
            total_distance += distance;
            total_loading += location.loading_time.0;
            coordinates.push(target);
            current = target;
        }

        let return_distance = current.distance_to(Point::ORIGIN).0;
        total_distance += return_distance;
        coordinates.push(Point::ORIGIN);

        let route: Vec<String> = request.locations.iter().map(|l| l.id.clone()).collect();
        let route_sequence = std::iter::once(START_LABEL.to_string())
            .chain(route.iter().cloned())
            .chain(std::iter::once(RETURN_TO_START.to_string()))
            .collect();

        Ok(OptimizationResponse {
            route,
            coordinates,
            total_distance: GridUnits(round2(total_distance)),
            total_loading_time: Minutes(round2(total_loading)),
            total_penalty: round2(total_penalty),
            grand_total_cost: round2(clock + return_distance / TRAVEL_SPEED + total_penalty),
            route_sequence,
            penalties,
            algorithm_used: format!("Demo ({})", request.algorithm.label()),
            location_details: details,
            evaluations_used: 1,
        })
    }
}

impl Default for DemoOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteOptimizer for DemoOptimizer {
    fn name(&self) -> &str {
        "demo"
    }

    fn optimize<'a>(
        &'a self,
        request: &'a OptimizationRequest,
    ) -> BoxFuture<'a, Result<OptimizationResponse, OptimizeError>> {
        Box::pin(future::ready(self.plan(request)))
    }
}
