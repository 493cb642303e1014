//! Provider seams for the route engine.
//!
//! Geocoding strategies, distance-matrix sources and indexed travel-cost
//! lookups are kept behind small traits so the sequencing code never talks to
//! a network client directly.

use crate::error::{AttemptError, MatrixError};
use crate::matrix::DistanceMatrix;
use crate::model::GeoPoint;

/// A single geocoding strategy (one provider).
pub trait Resolver {
    /// Short provider name used in log lines.
    fn name(&self) -> &str;

    /// One attempt at resolving `address`. The first candidate is authoritative.
    fn resolve(&self, address: &str) -> Result<GeoPoint, AttemptError>;
}

/// Provides a distance/duration matrix for a set of addresses.
///
/// Rows follow `origins`, columns follow `destinations`. Implementations
/// return `MatrixError::Status` when the provider's overall status is not OK.
pub trait DistanceMatrixProvider {
    fn matrix_for(
        &self,
        origins: &[String],
        destinations: &[String],
    ) -> Result<DistanceMatrix, MatrixError>;
}

/// Travel cost of one directed leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leg {
    pub distance_m: u32,
    pub duration_s: Option<u32>,
}

/// Human-readable form of a leg. `None` means the source had nothing to say.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegText {
    pub distance: Option<String>,
    pub duration: Option<String>,
}

impl From<Leg> for LegText {
    fn from(leg: Leg) -> Self {
        Self {
            distance: Some(describe_distance(leg.distance_m)),
            duration: leg.duration_s.map(describe_duration),
        }
    }
}

/// Indexed travel costs over `[origin, dest_1 .. dest_n]`.
///
/// Node 0 is the origin; node `i + 1` is destination `i`.
pub trait TravelCosts {
    /// Number of nodes every row is guaranteed to cover.
    fn dimension(&self) -> usize;

    /// `None` when the pair is unreachable or unknown.
    fn leg(&self, from: usize, to: usize) -> Option<Leg>;

    fn leg_text(&self, from: usize, to: usize) -> LegText {
        self.leg(from, to).map(LegText::from).unwrap_or_default()
    }
}

pub fn describe_distance(meters: u32) -> String {
    if meters < 1000 {
        format!("{meters} m")
    } else {
        format!("{:.1} km", f64::from(meters) / 1000.0)
    }
}

pub fn describe_duration(seconds: u32) -> String {
    let minutes = seconds.saturating_add(30) / 60;
    if minutes <= 1 {
        "1 min".to_string()
    } else {
        format!("{minutes} mins")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_distance() {
        assert_eq!(describe_distance(850), "850 m");
        assert_eq!(describe_distance(3240), "3.2 km");
    }

    #[test]
    fn test_describe_duration_rounds_to_minutes() {
        assert_eq!(describe_duration(20), "1 min");
        assert_eq!(describe_duration(420), "7 mins");
        assert_eq!(describe_duration(449), "7 mins");
        assert_eq!(describe_duration(u32::MAX), format!("{} mins", u32::MAX / 60));
    }

    #[test]
    fn test_leg_text_without_duration() {
        let text = LegText::from(Leg {
            distance_m: 1500,
            duration_s: None,
        });
        assert_eq!(text.distance.as_deref(), Some("1.5 km"));
        assert_eq!(text.duration, None);
    }
}
