//! Address resolution over an ordered chain of resolvers.
//!
//! Each link is tried up to its attempt budget with a fixed pause between
//! attempts; the first success wins. Failures of individual attempts are
//! logged and never fatal on their own.

use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::error::{AttemptError, ResolutionFailure};
use crate::google::GoogleGeocoder;
use crate::model::GeoPoint;
use crate::nominatim::NominatimGeocoder;
use crate::traits::Resolver;

struct Link {
    resolver: Box<dyn Resolver + Send + Sync>,
    attempts: u32,
}

pub struct Geocoder {
    links: Vec<Link>,
    retry_delay: Duration,
}

impl std::fmt::Debug for Geocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let chain: Vec<(&str, u32)> = self
            .links
            .iter()
            .map(|link| (link.resolver.name(), link.attempts))
            .collect();
        f.debug_struct("Geocoder")
            .field("chain", &chain)
            .field("retry_delay", &self.retry_delay)
            .finish()
    }
}

impl Geocoder {
    pub fn new(retry_delay: Duration) -> Self {
        Self {
            links: Vec::new(),
            retry_delay,
        }
    }

    /// Appends a resolver that is tried up to `attempts` times.
    pub fn with_resolver(
        mut self,
        resolver: impl Resolver + Send + Sync + 'static,
        attempts: u32,
    ) -> Self {
        self.links.push(Link {
            resolver: Box::new(resolver),
            attempts,
        });
        self
    }

    /// Nominatim with the configured retry budget, then Google once.
    pub fn from_config(config: &EngineConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(config.retry_delay())
            .with_resolver(
                NominatimGeocoder::new(config.nominatim.clone())?,
                config.geocode_retries,
            )
            .with_resolver(GoogleGeocoder::new(config.google.clone())?, 1))
    }

    /// Resolves `address` using each link's own attempt budget.
    pub fn resolve(&self, address: &str) -> Result<GeoPoint, ResolutionFailure> {
        self.run(address, None)
    }

    /// Resolves `address`, giving the primary resolver `max_retries` attempts.
    pub fn resolve_with_retries(
        &self,
        address: &str,
        max_retries: u32,
    ) -> Result<GeoPoint, ResolutionFailure> {
        self.run(address, Some(max_retries))
    }

    fn run(&self, address: &str, primary_attempts: Option<u32>) -> Result<GeoPoint, ResolutionFailure> {
        let address = address.trim();
        if address.is_empty() {
            warn!("refusing to geocode an empty address");
            return Err(ResolutionFailure::EmptyAddress);
        }

        let mut last_error = None;
        let link_count = self.links.len();

        for (position, link) in self.links.iter().enumerate() {
            let attempts = match (position, primary_attempts) {
                (0, Some(attempts)) => attempts,
                _ => link.attempts,
            };
            let is_last_link = position + 1 == link_count;

            for attempt in 1..=attempts {
                match link.resolver.resolve(address) {
                    Ok(point) => {
                        info!(provider = link.resolver.name(), address, %point, "address resolved");
                        return Ok(point);
                    }
                    Err(AttemptError::MissingCredential) => {
                        warn!(provider = link.resolver.name(), "no API key, skipping provider");
                        last_error = Some(AttemptError::MissingCredential);
                        break;
                    }
                    Err(err) => {
                        warn!(
                            provider = link.resolver.name(),
                            address,
                            attempt,
                            error = %err,
                            "geocoding attempt failed"
                        );
                        last_error = Some(err);
                    }
                }

                let out_of_attempts = attempt == attempts;
                if !(is_last_link && out_of_attempts) && !self.retry_delay.is_zero() {
                    thread::sleep(self.retry_delay);
                }
            }
        }

        match last_error {
            Some(AttemptError::MissingCredential) => Err(ResolutionFailure::NoFallbackCredential),
            _ => Err(ResolutionFailure::AllProvidersExhausted),
        }
    }
}
