//! Application state for one user session.
//!
//! A [`Session`] owns the per-user state a front-end would otherwise keep in
//! component state: the history log, the tips from the latest submission,
//! the history entry currently selected for replay, and the user's
//! location. Handlers borrow the session mutably, so at most one
//! submission is in flight and each call commits exactly one record.

use anyhow::{bail, Result};
use std::time::Duration;

use crate::config::Config;
use crate::directory::FacilityDirectory;
use crate::history::HistoryStore;
use crate::location::LocationProvider;
use crate::models::{Coordinate, RankedFacility, SymptomRecord};
use crate::proximity::rank_by_distance;
use crate::storage::Storage;
use crate::tips::generate_tips;

pub struct Session<S: Storage> {
    history: HistoryStore<S>,
    current_tips: Vec<String>,
    selected: Option<String>,
    location: Option<Coordinate>,
    location_requested: bool,
    delay: Duration,
}

impl<S: Storage> Session<S> {
    /// Load history from `storage` and apply session settings from `config`.
    pub fn start(storage: S, config: &Config) -> Self {
        Self {
            history: HistoryStore::load(storage),
            current_tips: Vec::new(),
            selected: None,
            location: None,
            location_requested: false,
            delay: Duration::from_millis(config.tips.simulated_delay_ms),
        }
    }

    /// Generate tips for `symptoms` and record the submission.
    ///
    /// Blank input is rejected before any work happens. The returned record
    /// is already at index 0 of the history.
    pub async fn submit(&mut self, symptoms: &str) -> Result<SymptomRecord> {
        if symptoms.trim().is_empty() {
            bail!("symptoms must not be empty");
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let tips = generate_tips(symptoms);
        let record = SymptomRecord::new(symptoms, tips);
        tracing::info!(id = %record.id, tips = record.tips.len(), "symptoms logged");

        self.current_tips = record.tips.clone();
        self.selected = None;
        self.history.append(record.clone())?;
        Ok(record)
    }

    /// Select a past entry so [`display_tips`](Self::display_tips) shows it.
    pub fn select(&mut self, id: &str) -> Result<&SymptomRecord> {
        match self.history.select_for_replay(id) {
            Some(record) => {
                self.selected = Some(record.id.clone());
                Ok(record)
            }
            None => bail!("history entry not found: {}", id),
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&SymptomRecord> {
        self.selected
            .as_deref()
            .and_then(|id| self.history.select_for_replay(id))
    }

    /// Tips of the selected entry, otherwise those of the latest submission.
    pub fn display_tips(&self) -> &[String] {
        match self.selected() {
            Some(record) => &record.tips,
            None => &self.current_tips,
        }
    }

    pub fn history(&self) -> &HistoryStore<S> {
        &self.history
    }

    /// Ask `provider` for the user's coordinate, once per session.
    ///
    /// Later calls return the cached answer without asking again. A failure
    /// is logged and leaves the location unset.
    pub async fn acquire_location(&mut self, provider: &dyn LocationProvider) -> Option<Coordinate> {
        if !self.location_requested {
            self.location_requested = true;
            match provider.locate().await {
                Ok(coord) => {
                    tracing::debug!(lat = coord.lat, lng = coord.lng, "location acquired");
                    self.location = Some(coord);
                }
                Err(e) => tracing::warn!(error = %e, "could not get location"),
            }
        }
        self.location
    }

    pub fn location(&self) -> Option<Coordinate> {
        self.location
    }

    /// Facilities near the session location, nearest first.
    ///
    /// Empty when the location is unknown or the directory fails.
    pub async fn nearby_facilities(&self, directory: &dyn FacilityDirectory) -> Vec<RankedFacility> {
        match self.location {
            Some(origin) => nearby_facilities_from(origin, directory).await,
            None => Vec::new(),
        }
    }
}

/// Fetch and rank facilities around `origin`, degrading to empty on failure.
pub async fn nearby_facilities_from(
    origin: Coordinate,
    directory: &dyn FacilityDirectory,
) -> Vec<RankedFacility> {
    match directory.nearby(origin).await {
        Ok(facilities) => rank_by_distance(origin, facilities),
        Err(e) => {
            tracing::warn!(directory = directory.name(), error = %e, "error fetching nearby clinics");
            Vec::new()
        }
    }
}
