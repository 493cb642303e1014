//! shipment-router: delivery route optimization engine
//!
//! Geocodes shipment destinations, derives time-window and priority hints
//! from free-text notes, and orders stops by regional clustering over a
//! provider distance matrix or by great-circle nearest neighbour.

pub mod config;
pub mod constraints;
pub mod error;
pub mod geocode;
pub mod google;
pub mod haversine;
pub mod matrix;
pub mod model;
pub mod nominatim;
pub mod optimizer;
pub mod planner;
pub mod region;
pub mod route;
pub mod sequencer;
pub mod traits;

pub use config::EngineConfig;
pub use constraints::{ConstraintRules, DeliveryConstraints, DestinationConstraints, Priority, TimeSlot};
pub use error::{MatrixError, OptimizeError, ResolutionFailure};
pub use geocode::Geocoder;
pub use model::{DeliveryStatus, Destination, GeoPoint, OptimizedDestination, Shipment};
pub use optimizer::{OptimizeOptions, optimize_local, optimize_route};
pub use planner::{OptimizationReport, RoutePlanner, Strategy, apply_sequence};
