//! Regional clustering and constrained nearest-neighbour sequencing.
//!
//! Destinations are grouped by region, regions are visited greedily by
//! proximity, and inside each region stops are picked nearest-first among
//! those whose simulated arrival fits their time slots. All position/clock
//! state travels in an explicit [`Cursor`].

use std::fmt;

use chrono::{Duration, NaiveTime};
use tracing::debug;

use crate::constraints::{DeliveryConstraints, DestinationConstraints};
use crate::error::SequenceError;
use crate::region::RegionKey;
use crate::traits::{Leg, TravelCosts};

/// Node index of the origin in any [`TravelCosts`] source.
pub const ORIGIN: usize = 0;

/// Node index of destination `index`.
pub fn node_of(index: usize) -> usize {
    index + 1
}

const SECONDS_PER_DAY: i64 = 86_400;

/// Simulated clock reading: time of day plus midnights passed since departure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RouteTime {
    pub day: u32,
    pub time: NaiveTime,
}

impl RouteTime {
    pub fn departure(time: NaiveTime) -> Self {
        Self { day: 0, time }
    }

    /// Advances the clock; crossing midnight bumps `day` instead of wrapping.
    pub fn plus(self, by: Duration) -> Self {
        let (time, carried) = self.time.overflowing_add_signed(by);
        let days = u32::try_from(carried.div_euclid(SECONDS_PER_DAY)).unwrap_or(u32::MAX);
        Self {
            day: self.day.saturating_add(days),
            time,
        }
    }
}

/// `HH:MM`, suffixed with `+Nd` once the route has run past midnight.
impl fmt::Display for RouteTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.time.format("%H:%M"))?;
        if self.day > 0 {
            write!(f, "+{}d", self.day)?;
        }
        Ok(())
    }
}

/// Vehicle position and simulated clock between two legs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub node: usize,
    pub clock: RouteTime,
}

impl Cursor {
    pub fn start(departure: NaiveTime) -> Self {
        Self {
            node: ORIGIN,
            clock: RouteTime::departure(departure),
        }
    }

    /// Arrival after driving `leg`. Travel counts in whole minutes; an
    /// unknown duration costs nothing.
    pub fn arrival_via(&self, leg: Option<Leg>) -> RouteTime {
        let minutes = leg.and_then(|leg| leg.duration_s).unwrap_or(0) / 60;
        self.clock.plus(Duration::minutes(i64::from(minutes)))
    }

    /// Cursor after serving `node`, reached at `arrival`.
    pub fn after_service(self, node: usize, arrival: RouteTime, service: Duration) -> Self {
        Self {
            node,
            clock: arrival.plus(service),
        }
    }
}

/// One sequenced stop: index into the destination list plus arrival time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visit {
    pub index: usize,
    pub arrival: RouteTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionGroup {
    pub key: RegionKey,
    /// Destination indices in encounter order.
    pub members: Vec<usize>,
}

/// Groups destination indices by exact key equality, keeping first-seen order.
pub fn group_by_region(keys: &[RegionKey]) -> Vec<RegionGroup> {
    let mut groups: Vec<RegionGroup> = Vec::new();
    for (index, key) in keys.iter().enumerate() {
        match groups.iter_mut().find(|group| &group.key == key) {
            Some(group) => group.members.push(index),
            None => groups.push(RegionGroup {
                key: key.clone(),
                members: vec![index],
            }),
        }
    }
    groups
}

/// Greedy nearest-region walk starting at the origin.
///
/// A region's distance is that of its nearest member from the reference
/// node; after a region is chosen the reference moves to its first member.
/// Returns indices into `groups`.
pub fn order_regions<C>(costs: &C, groups: &[RegionGroup]) -> Vec<usize>
where
    C: TravelCosts + ?Sized,
{
    let mut unvisited: Vec<usize> = (0..groups.len()).collect();
    let mut order = Vec::with_capacity(groups.len());
    let mut reference = ORIGIN;

    while !unvisited.is_empty() {
        let mut best: Option<(usize, u32)> = None;
        for (position, &group) in unvisited.iter().enumerate() {
            let nearest = groups[group]
                .members
                .iter()
                .filter_map(|&member| costs.leg(reference, node_of(member)))
                .map(|leg| leg.distance_m)
                .min();
            if let Some(distance) = nearest {
                if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                    best = Some((position, distance));
                }
            }
        }

        let group = unvisited.remove(best.map_or(0, |(position, _)| position));
        debug!(
            region = %groups[group].key,
            distance_m = best.map(|(_, distance)| distance),
            "next region"
        );
        order.push(group);

        if let Some(&first) = groups[group].members.first() {
            reference = node_of(first);
        }
    }

    order
}

/// Constrained members first (highest priority first, stable), then the rest.
pub fn prioritize(members: &[usize], constraints: &[DestinationConstraints]) -> Vec<usize> {
    let (mut constrained, open): (Vec<usize>, Vec<usize>) = members
        .iter()
        .copied()
        .partition(|&index| constraints[index].is_constrained());
    constrained.sort_by(|a, b| constraints[*b].priority.cmp(&constraints[*a].priority));
    constrained.extend(open);
    constrained
}

fn nearest<C>(
    costs: &C,
    cursor: Cursor,
    remaining: &[usize],
    accept: impl Fn(usize, RouteTime) -> bool,
) -> Option<usize>
where
    C: TravelCosts + ?Sized,
{
    let mut best: Option<(usize, u32)> = None;
    for (position, &index) in remaining.iter().enumerate() {
        let Some(leg) = costs.leg(cursor.node, node_of(index)) else {
            continue;
        };
        if !accept(index, cursor.arrival_via(Some(leg))) {
            continue;
        }
        if best.is_none_or(|(_, best_distance)| leg.distance_m < best_distance) {
            best = Some((position, leg.distance_m));
        }
    }
    best.map(|(position, _)| position)
}

/// Nearest-neighbour pass over `candidates` starting from `cursor`.
///
/// Picks the nearest stop whose arrival satisfies its constraints; if none
/// does, the nearest reachable one; if nothing is reachable, the first
/// remaining candidate. Every candidate is visited exactly once.
pub fn sequence_nearest<C>(
    costs: &C,
    candidates: &[usize],
    constraints: &[DestinationConstraints],
    mut cursor: Cursor,
    service: Duration,
) -> (Vec<Visit>, Cursor)
where
    C: TravelCosts + ?Sized,
{
    let mut remaining = candidates.to_vec();
    let mut visits = Vec::with_capacity(remaining.len());

    while !remaining.is_empty() {
        let position = nearest(costs, cursor, &remaining, |index, arrival| {
            constraints[index].accepts_on(arrival.day, arrival.time)
        })
        .or_else(|| {
            debug!(node = cursor.node, "no stop fits its time slots, taking nearest");
            nearest(costs, cursor, &remaining, |_, _| true)
        })
        .unwrap_or(0);

        let index = remaining.remove(position);
        let node = node_of(index);
        let leg = costs.leg(cursor.node, node);
        let arrival = cursor.arrival_via(leg);
        debug!(
            destination = index,
            distance_m = leg.map(|leg| leg.distance_m),
            %arrival,
            "stop sequenced"
        );

        visits.push(Visit { index, arrival });
        cursor = cursor.after_service(node, arrival, service);
    }

    (visits, cursor)
}

/// Full regional run: group, order regions, sequence each region in turn.
///
/// `keys` and `constraints` are aligned with the destination list; `costs`
/// must cover the origin plus every destination.
pub fn sequence_regional<C>(
    costs: &C,
    keys: &[RegionKey],
    constraints: &[DestinationConstraints],
    delivery: &DeliveryConstraints,
) -> Result<Vec<Visit>, SequenceError>
where
    C: TravelCosts + ?Sized,
{
    if keys.len() != constraints.len() {
        return Err(SequenceError::Misaligned {
            destinations: keys.len(),
            annotations: constraints.len(),
        });
    }
    let expected = keys.len() + 1;
    if costs.dimension() < expected {
        return Err(SequenceError::MatrixShape {
            expected,
            actual: costs.dimension(),
        });
    }

    let groups = group_by_region(keys);
    debug!(regions = groups.len(), "destinations grouped");

    let mut cursor = Cursor::start(delivery.departure);
    let mut visits = Vec::with_capacity(keys.len());
    for group in order_regions(costs, &groups) {
        let candidates = prioritize(&groups[group].members, constraints);
        let (region_visits, next) =
            sequence_nearest(costs, &candidates, constraints, cursor, delivery.service_time());
        cursor = next;
        visits.extend(region_visits);
    }

    ensure_complete(&visits, keys.len())?;
    Ok(visits)
}

/// Checks that `visits` is a permutation of `0..expected`.
pub fn ensure_complete(visits: &[Visit], expected: usize) -> Result<(), SequenceError> {
    let mut seen = vec![false; expected];
    let mut visited = 0;
    for visit in visits {
        if let Some(slot) = seen.get_mut(visit.index) {
            if !*slot {
                *slot = true;
                visited += 1;
            }
        }
    }
    if visited == expected && visits.len() == expected {
        Ok(())
    } else {
        Err(SequenceError::Incomplete { expected, visited })
    }
}
