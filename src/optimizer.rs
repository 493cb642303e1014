//! Route optimizers: regional (distance matrix) and geometric (Haversine).

use tracing::{info, warn};

use crate::constraints::{ConstraintRules, DeliveryConstraints, DestinationConstraints};
use crate::error::MatrixError;
use crate::haversine::HaversineMatrix;
use crate::model::{Destination, GeoPoint, OptimizedDestination};
use crate::region::{RegionKey, region_key};
use crate::route::{assemble, fallback_route};
use crate::sequencer::{Cursor, ensure_complete, sequence_nearest, sequence_regional};
use crate::traits::DistanceMatrixProvider;

#[derive(Debug, Default)]
pub struct OptimizeOptions {
    /// Clock settings used when the caller passes none.
    pub delivery: DeliveryConstraints,
    pub rules: ConstraintRules,
    /// Speed model for the geometric optimizer.
    pub haversine: HaversineMatrix,
}

/// Regional clustering over a provider distance matrix.
///
/// One matrix request covers the origin and every destination. A non-OK
/// matrix fails the run; any sequencing failure after that degrades to the
/// input-order fallback route instead.
pub fn optimize_route<M>(
    origin_address: &str,
    destinations: &[Destination],
    provider: &M,
    constraints: Option<&DeliveryConstraints>,
    options: &OptimizeOptions,
) -> Result<Vec<OptimizedDestination>, MatrixError>
where
    M: DistanceMatrixProvider + ?Sized,
{
    if destinations.is_empty() {
        return Ok(Vec::new());
    }
    info!(origin = origin_address, destinations = destinations.len(), "optimizing route");

    let addresses: Vec<String> = std::iter::once(origin_address.to_string())
        .chain(destinations.iter().map(|dest| dest.address.clone()))
        .collect();
    let matrix = provider.matrix_for(&addresses, &addresses)?;
    if !matrix.is_ok() {
        return Err(MatrixError::Status(matrix.status));
    }

    let delivery = constraints.unwrap_or(&options.delivery);
    let derived: Vec<DestinationConstraints> = destinations
        .iter()
        .map(|dest| options.rules.extract(dest))
        .collect();
    let keys: Vec<RegionKey> = destinations
        .iter()
        .map(|dest| region_key(&dest.address))
        .collect();

    let route = match sequence_regional(&matrix, &keys, &derived, delivery) {
        Ok(visits) => assemble(destinations, &visits, &matrix, delivery.service_time()),
        Err(err) => {
            warn!(error = %err, "regional sequencing failed, using input order");
            fallback_route(destinations)
        }
    };

    info!(stops = route.len(), "route optimized");
    Ok(route)
}

/// Distance-greedy ordering by great-circle distance from `origin`.
///
/// No time windows or priorities. Destinations without coordinates have no
/// legs, so they end up after every resolved stop, in input order.
pub fn optimize_local(
    origin: GeoPoint,
    destinations: &[Destination],
    constraints: Option<&DeliveryConstraints>,
    options: &OptimizeOptions,
) -> Vec<OptimizedDestination> {
    if destinations.is_empty() {
        return Vec::new();
    }

    let points: Vec<Option<GeoPoint>> = std::iter::once(Some(origin))
        .chain(destinations.iter().map(|dest| dest.location))
        .collect();
    let costs = options.haversine.costs(&points);

    let delivery = constraints.unwrap_or(&options.delivery);
    let candidates: Vec<usize> = (0..destinations.len()).collect();
    let unconstrained = vec![DestinationConstraints::default(); destinations.len()];
    let (visits, _) = sequence_nearest(
        &costs,
        &candidates,
        &unconstrained,
        Cursor::start(delivery.departure),
        delivery.service_time(),
    );

    match ensure_complete(&visits, destinations.len()) {
        Ok(()) => assemble(destinations, &visits, &costs, delivery.service_time()),
        Err(err) => {
            warn!(error = %err, "geometric sequencing incomplete, using input order");
            fallback_route(destinations)
        }
    }
}
