//! # Health Buddy
//!
//! A local-first symptom log with canned health tips, history replay, and
//! nearby clinic ranking.
//!
//! Health Buddy turns a free-text symptom description into a list of
//! advice strings, keeps every submission in a persisted newest-first
//! history, and ranks nearby medical facilities by great-circle distance
//! from the user's location. It is exposed through a CLI and a small JSON
//! HTTP API.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌────────────┐   ┌──────────────┐
//! │ CLI/HTTP │──▶│  Session   │──▶│ HistoryStore │──▶ Storage (file/memory)
//! └──────────┘   │            │   └──────────────┘
//!                │            │──▶ TipEngine
//!                │            │──▶ LocationProvider
//!                └─────┬──────┘
//!                      ▼
//!            FacilityDirectory ──▶ ProximityRanker
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! buddy tips "I have a headache and fever"
//! buddy history
//! buddy show <id>
//! buddy clinics --lat 40.71 --lng -74.00
//! buddy emergency
//! buddy serve
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`tips`] | Keyword tip engine |
//! | [`proximity`] | Haversine distance, formatting, ranking |
//! | [`history`] | Versioned, write-through history log |
//! | [`storage`] | Key-value slot backends |
//! | [`directory`] | Facility directory backends |
//! | [`location`] | User location providers |
//! | [`session`] | Per-user application state |
//! | [`share`] | Share text and sinks |
//! | [`contacts`] | Emergency numbers and map links |
//! | [`display`] | Timestamp and count formatting |
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`server`] | JSON HTTP API |

pub mod config;
pub mod contacts;
pub mod directory;
pub mod display;
pub mod history;
pub mod location;
pub mod models;
pub mod proximity;
pub mod server;
pub mod session;
pub mod share;
pub mod storage;
pub mod tips;
