//! Shipment and destination records consumed and produced by the engine.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// A resolved WGS-84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Interprets a stored coordinate pair.
    ///
    /// Legacy rows use (0, 0) to mean "geocoding failed"; that pair and any
    /// out-of-range pair map to `None` instead of a real position.
    pub fn from_raw(lat: f64, lon: f64) -> Option<Self> {
        if lat == 0.0 && lon == 0.0 {
            return None;
        }
        let point = Self { lat, lon };
        point.is_valid().then_some(point)
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryStatus {
    #[default]
    Pending,
    Delivered,
    Skipped,
}

/// One delivery stop belonging to a shipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub id: u64,
    pub customer_name: String,
    pub address: String,
    /// `None` until the address has been geocoded.
    pub location: Option<GeoPoint>,
    pub product_info: Option<String>,
    pub note: Option<String>,
    /// 1-based visiting order written back by the last optimization run.
    pub sequence: Option<u32>,
    pub status: DeliveryStatus,
    pub skip_reason: Option<String>,
}

impl Destination {
    pub fn new(id: u64, customer_name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id,
            customer_name: customer_name.into(),
            address: address.into(),
            location: None,
            product_info: None,
            note: None,
            sequence: None,
            status: DeliveryStatus::Pending,
            skip_reason: None,
        }
    }

    pub fn with_location(mut self, lat: f64, lon: f64) -> Self {
        self.location = GeoPoint::from_raw(lat, lon);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_product(mut self, product_info: impl Into<String>) -> Self {
        self.product_info = Some(product_info.into());
        self
    }

    pub fn is_resolved(&self) -> bool {
        self.location.is_some()
    }

    pub fn mark_delivered(&mut self) {
        self.status = DeliveryStatus::Delivered;
    }

    pub fn skip(&mut self, reason: impl Into<String>) {
        self.status = DeliveryStatus::Skipped;
        self.skip_reason = Some(reason.into());
    }

    /// Returns the stop to `Pending` and forgets any skip reason.
    pub fn reset(&mut self) {
        self.status = DeliveryStatus::Pending;
        self.skip_reason = None;
    }
}

/// A delivery job: one origin, many destinations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    pub id: u64,
    pub name: String,
    pub origin_address: String,
    pub product_info: Option<String>,
    pub created_at: NaiveDateTime,
    pub delivery_date: NaiveDate,
    pub destinations: Vec<Destination>,
}

impl Shipment {
    /// Destinations in visiting order. Unsequenced stops follow, in stored order.
    pub fn ordered_destinations(&self) -> Vec<&Destination> {
        let mut ordered: Vec<&Destination> = self.destinations.iter().collect();
        ordered.sort_by_key(|dest| dest.sequence.unwrap_or(u32::MAX));
        ordered
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &Destination> {
        self.destinations.iter().filter(|dest| !dest.is_resolved())
    }
}

/// One stop of an optimized route.
///
/// Distance and duration describe the leg from the previous stop (the origin
/// for the first stop). `None` values mean the provider had no usable data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizedDestination {
    pub id: u64,
    pub sequence: u32,
    pub customer_name: String,
    pub address: String,
    pub product_info: Option<String>,
    pub note: Option<String>,
    pub skip_reason: Option<String>,
    pub distance_text: String,
    pub duration_text: String,
    pub distance_m: Option<u32>,
    pub duration_s: Option<u32>,
    /// `HH:MM-HH:MM`; either end carries a `+Nd` suffix past midnight.
    pub time_slot: String,
    /// Time of day of the arrival, on the day given by `arrival_day`.
    pub estimated_arrival: Option<NaiveTime>,
    /// Midnights passed between departure and arrival.
    pub arrival_day: u32,
}
