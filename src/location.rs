//! User location providers.
//!
//! The session asks for a location once. A failing provider is not an
//! error for the application: it only leaves facility ranking disabled.

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::config::Config;
use crate::models::Coordinate;

#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn locate(&self) -> Result<Coordinate>;
}

/// A coordinate known up front (config file or command-line flags).
pub struct FixedLocation(pub Coordinate);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn locate(&self) -> Result<Coordinate> {
        if !self.0.is_valid() {
            bail!(
                "coordinate ({}, {}) is out of range",
                self.0.lat,
                self.0.lng
            );
        }
        Ok(self.0)
    }
}

/// No location source configured.
pub struct Unavailable;

#[async_trait]
impl LocationProvider for Unavailable {
    async fn locate(&self) -> Result<Coordinate> {
        bail!("location unavailable: set [location] in config or pass --lat/--lng")
    }
}

/// Pick a provider: explicit override first, then config, else unavailable.
pub fn resolve_provider(
    config: &Config,
    override_coord: Option<Coordinate>,
) -> Box<dyn LocationProvider> {
    match override_coord.or_else(|| config.location.map(|l| l.coordinate())) {
        Some(coord) => Box::new(FixedLocation(coord)),
        None => Box::new(Unavailable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_location() {
        let c = Coordinate::new(1.0, 2.0);
        assert_eq!(FixedLocation(c).locate().await.unwrap(), c);
    }

    #[tokio::test]
    async fn test_fixed_location_out_of_range_fails() {
        assert!(FixedLocation(Coordinate::new(200.0, 0.0)).locate().await.is_err());
    }

    #[tokio::test]
    async fn test_unavailable_fails() {
        assert!(Unavailable.locate().await.is_err());
    }

    #[tokio::test]
    async fn test_override_wins_over_config() {
        let mut cfg = Config::minimal();
        cfg.location = Some(crate::config::LocationConfig { lat: 5.0, lng: 5.0 });

        let from_cfg = resolve_provider(&cfg, None).locate().await.unwrap();
        assert_eq!(from_cfg, Coordinate::new(5.0, 5.0));

        let overridden = resolve_provider(&cfg, Some(Coordinate::new(-1.0, 1.0)))
            .locate()
            .await
            .unwrap();
        assert_eq!(overridden, Coordinate::new(-1.0, 1.0));

        assert!(resolve_provider(&Config::minimal(), None).locate().await.is_err());
    }
}
