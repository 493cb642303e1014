//! Shipment-level planning: geocode, optimize, write the order back.

use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::constraints::DeliveryConstraints;
use crate::error::OptimizeError;
use crate::geocode::Geocoder;
use crate::google::GoogleDistanceMatrix;
use crate::model::{Destination, GeoPoint, OptimizedDestination, Shipment};
use crate::optimizer::{OptimizeOptions, optimize_local, optimize_route};
use crate::traits::DistanceMatrixProvider;

/// Which optimizer produced a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Regional clustering over the provider distance matrix.
    Regional,
    /// Great-circle nearest neighbour.
    Geometric,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationReport {
    pub strategy: Strategy,
    pub route: Vec<OptimizedDestination>,
    /// Partial-success notes: unresolved addresses, degradations taken.
    pub warnings: Vec<String>,
}

impl OptimizationReport {
    pub fn message(&self) -> String {
        if self.route.is_empty() {
            "no destinations to optimize".to_string()
        } else if self.warnings.is_empty() {
            format!("delivery order optimized ({} stops)", self.route.len())
        } else {
            format!(
                "delivery order optimized ({} stops, {} warnings)",
                self.route.len(),
                self.warnings.len()
            )
        }
    }
}

/// Writes each stop's sequence number onto the destination with the same id.
/// Returns how many destinations were updated.
pub fn apply_sequence(destinations: &mut [Destination], route: &[OptimizedDestination]) -> usize {
    let mut updated = 0;
    for stop in route {
        if let Some(dest) = destinations.iter_mut().find(|dest| dest.id == stop.id) {
            dest.sequence = Some(stop.sequence);
            updated += 1;
        }
    }
    updated
}

#[derive(Debug)]
pub struct RoutePlanner<M> {
    geocoder: Geocoder,
    matrix: M,
    options: OptimizeOptions,
}

impl RoutePlanner<GoogleDistanceMatrix> {
    /// Nominatim + Google geocoding and the Google distance matrix.
    pub fn from_config(config: &EngineConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            Geocoder::from_config(config)?,
            GoogleDistanceMatrix::new(config.google.clone())?,
        ))
    }
}

impl<M: DistanceMatrixProvider> RoutePlanner<M> {
    pub fn new(geocoder: Geocoder, matrix: M) -> Self {
        Self {
            geocoder,
            matrix,
            options: OptimizeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: OptimizeOptions) -> Self {
        self.options = options;
        self
    }

    /// Matrix-based optimization. Fails if the matrix cannot be obtained.
    pub fn optimize_route(
        &self,
        origin_address: &str,
        destinations: &[Destination],
        constraints: Option<&DeliveryConstraints>,
    ) -> Result<Vec<OptimizedDestination>, OptimizeError> {
        Ok(optimize_route(
            origin_address,
            destinations,
            &self.matrix,
            constraints,
            &self.options,
        )?)
    }

    /// Geocodes every destination without coordinates, in place.
    /// Returns one warning per address that stayed unresolved.
    pub fn resolve_missing(&self, destinations: &mut [Destination]) -> Vec<String> {
        let mut warnings = Vec::new();
        for dest in destinations.iter_mut().filter(|dest| !dest.is_resolved()) {
            match self.geocoder.resolve(&dest.address) {
                Ok(point) => dest.location = Some(point),
                Err(reason) => {
                    warn!(id = dest.id, address = %dest.address, %reason, "destination left unresolved");
                    warnings.push(format!(
                        "destination {} ({}) could not be geocoded: {reason}",
                        dest.id, dest.address
                    ));
                }
            }
        }
        warnings
    }

    fn resolve_origin(&self, origin_address: &str) -> Result<GeoPoint, OptimizeError> {
        self.geocoder
            .resolve(origin_address)
            .map_err(|reason| OptimizeError::OriginUnresolved {
                address: origin_address.to_string(),
                reason,
            })
    }

    /// Geometric optimization: geocodes the origin and any unresolved
    /// destinations first, then orders by great-circle distance.
    pub fn optimize_local(
        &self,
        origin_address: &str,
        destinations: &mut [Destination],
        constraints: Option<&DeliveryConstraints>,
    ) -> Result<(Vec<OptimizedDestination>, Vec<String>), OptimizeError> {
        if destinations.is_empty() {
            return Ok((Vec::new(), Vec::new()));
        }
        let origin = self.resolve_origin(origin_address)?;
        let warnings = self.resolve_missing(destinations);
        let route = optimize_local(origin, destinations, constraints, &self.options);
        Ok((route, warnings))
    }

    /// Full run for one shipment.
    ///
    /// Resolves missing coordinates, tries the regional optimizer and falls
    /// back to the geometric one when the matrix is unavailable. The chosen
    /// order is written onto the shipment's destinations.
    pub fn optimize_shipment(&self, shipment: &mut Shipment) -> Result<OptimizationReport, OptimizeError> {
        if shipment.destinations.is_empty() {
            return Ok(OptimizationReport {
                strategy: Strategy::Regional,
                route: Vec::new(),
                warnings: Vec::new(),
            });
        }

        let mut warnings = self.resolve_missing(&mut shipment.destinations);

        let (strategy, route) = match self.optimize_route(
            &shipment.origin_address,
            &shipment.destinations,
            None,
        ) {
            Ok(route) => (Strategy::Regional, route),
            Err(err) => {
                warn!(shipment = shipment.id, error = %err, "matrix unavailable, using geometric optimizer");
                warnings.push(format!("distance matrix unavailable ({err}); ordered by straight-line distance"));
                let origin = self.resolve_origin(&shipment.origin_address)?;
                let route = optimize_local(origin, &shipment.destinations, None, &self.options);
                (Strategy::Geometric, route)
            }
        };

        apply_sequence(&mut shipment.destinations, &route);
        info!(shipment = shipment.id, ?strategy, stops = route.len(), "shipment optimized");

        Ok(OptimizationReport {
            strategy,
            route,
            warnings,
        })
    }
}
