//! Output construction shared by every optimizer variant.

use chrono::Duration;

use crate::model::{Destination, OptimizedDestination};
use crate::sequencer::{ORIGIN, Visit, node_of};
use crate::traits::TravelCosts;

/// Shown when a leg has no distance or duration data.
pub const UNKNOWN: &str = "unknown";

/// Time slot of a stop in the fallback route.
pub const ALL_DAY: &str = "all day";

fn echo(destination: &Destination, sequence: u32) -> OptimizedDestination {
    OptimizedDestination {
        id: destination.id,
        sequence,
        customer_name: destination.customer_name.clone(),
        address: destination.address.clone(),
        product_info: destination.product_info.clone(),
        note: destination.note.clone(),
        skip_reason: destination.skip_reason.clone(),
        distance_text: UNKNOWN.to_string(),
        duration_text: UNKNOWN.to_string(),
        distance_m: None,
        duration_s: None,
        time_slot: ALL_DAY.to_string(),
        estimated_arrival: None,
        arrival_day: 0,
    }
}

/// Turns sequenced visits into numbered stops with leg and arrival details.
///
/// Sequence numbers are 1..=n in visit order; each leg is read from the
/// previous stop (the origin for the first one).
pub fn assemble<C>(
    destinations: &[Destination],
    visits: &[Visit],
    costs: &C,
    service: Duration,
) -> Vec<OptimizedDestination>
where
    C: TravelCosts + ?Sized,
{
    let mut previous = ORIGIN;
    let mut route = Vec::with_capacity(visits.len());

    for (sequence, visit) in (1u32..).zip(visits) {
        let node = node_of(visit.index);
        let leg = costs.leg(previous, node);
        let text = costs.leg_text(previous, node);
        let departure = visit.arrival.plus(service);

        route.push(OptimizedDestination {
            distance_text: text.distance.unwrap_or_else(|| UNKNOWN.to_string()),
            duration_text: text.duration.unwrap_or_else(|| UNKNOWN.to_string()),
            distance_m: leg.map(|leg| leg.distance_m),
            duration_s: leg.and_then(|leg| leg.duration_s),
            time_slot: format!("{}-{departure}", visit.arrival),
            estimated_arrival: Some(visit.arrival.time),
            arrival_day: visit.arrival.day,
            ..echo(&destinations[visit.index], sequence)
        });
        previous = node;
    }

    route
}

/// Input order, positional sequence numbers, no leg data.
pub fn fallback_route(destinations: &[Destination]) -> Vec<OptimizedDestination> {
    (1u32..)
        .zip(destinations)
        .map(|(sequence, destination)| echo(destination, sequence))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::clock;
    use crate::matrix::{CellStatus, DistanceMatrix, MatrixCell};
    use crate::sequencer::RouteTime;

    fn destinations() -> Vec<Destination> {
        vec![
            Destination::new(10, "Chen", "高雄市前鎮區中華五路789號").with_note("晚上"),
            Destination::new(11, "Lin", "高雄市前鎮區成功二路39號").with_product("冷藏牛奶"),
        ]
    }

    #[test]
    fn test_assemble_reads_leg_from_previous_stop() {
        let costs = DistanceMatrix::from_fn(3, |from, to| {
            if from == 0 && to == 2 {
                MatrixCell::reachable(1200, 300)
            } else if from == 2 && to == 1 {
                MatrixCell::unreachable(CellStatus::NotFound)
            } else {
                MatrixCell::reachable(9999, 9999)
            }
        });
        let visits = vec![
            Visit {
                index: 1,
                arrival: RouteTime::departure(clock(9, 5)),
            },
            Visit {
                index: 0,
                arrival: RouteTime {
                    day: 0,
                    time: clock(23, 50),
                },
            },
        ];

        let route = assemble(&destinations(), &visits, &costs, Duration::minutes(15));

        assert_eq!(route[0].id, 11);
        assert_eq!(route[0].sequence, 1);
        assert_eq!(route[0].distance_m, Some(1200));
        assert_eq!(route[0].distance_text, "1.2 km");
        assert_eq!(route[0].duration_s, Some(300));
        assert_eq!(route[0].time_slot, "09:05-09:20");
        assert_eq!(route[0].product_info.as_deref(), Some("冷藏牛奶"));

        assert_eq!(route[1].id, 10);
        assert_eq!(route[1].sequence, 2);
        assert_eq!(route[1].distance_m, None);
        assert_eq!(route[1].distance_text, UNKNOWN);
        assert_eq!(route[1].duration_text, UNKNOWN);
        assert_eq!(route[1].estimated_arrival, Some(clock(23, 50)));
        assert_eq!(route[1].arrival_day, 0);
        assert_eq!(route[1].time_slot, "23:50-00:05+1d");
        assert_eq!(route[1].note.as_deref(), Some("晚上"));
    }

    #[test]
    fn test_fallback_route_is_input_order() {
        let route = fallback_route(&destinations());
        let ids: Vec<u64> = route.iter().map(|stop| stop.id).collect();
        let sequences: Vec<u32> = route.iter().map(|stop| stop.sequence).collect();
        assert_eq!(ids, vec![10, 11]);
        assert_eq!(sequences, vec![1, 2]);
        assert!(route.iter().all(|stop| stop.time_slot == ALL_DAY));
        assert!(route.iter().all(|stop| stop.distance_text == UNKNOWN && stop.distance_m.is_none()));
        assert!(route.iter().all(|stop| stop.estimated_arrival.is_none()));
    }

    #[test]
    fn test_empty_inputs() {
        let costs = DistanceMatrix::from_fn(1, |_, _| MatrixCell::reachable(0, 0));
        assert!(assemble(&[], &[], &costs, Duration::minutes(15)).is_empty());
        assert!(fallback_route(&[]).is_empty());
    }
}
