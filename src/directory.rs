//! Facility directory backends.
//!
//! A directory answers one question: which facilities are near this
//! origin? It makes no promise about order; [`crate::proximity`] ranks
//! the result.
//!
//! | Provider | Source |
//! |----------|--------|
//! | `mock` | [`MockDirectory`]: five fixed offsets around the origin |
//! | `http` | [`HttpDirectory`]: `GET <url>?lat=..&lng=..` returning a JSON array |

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::config::DirectoryConfig;
use crate::models::{Coordinate, Facility};

/// Source of facility records near an origin.
#[async_trait]
pub trait FacilityDirectory: Send + Sync {
    /// Short identifier used in logs (`"mock"`, `"http"`).
    fn name(&self) -> &str;

    /// Facilities near `origin`, in no particular order.
    async fn nearby(&self, origin: Coordinate) -> Result<Vec<Facility>>;
}

/// (id, name, address, phone, Δlat, Δlng)
const MOCK_FACILITIES: [(&str, &str, &str, &str, f64, f64); 5] = [
    ("1", "City General Hospital", "123 Main St", "(555) 123-4567", 0.01, -0.01),
    ("2", "Westside Urgent Care", "456 Oak Ave", "(555) 987-6543", -0.008, 0.015),
    ("3", "Community Health Center", "789 Pine Blvd", "(555) 456-7890", 0.02, 0.02),
    ("4", "Downtown Medical Plaza", "101 Center St", "(555) 222-3333", -0.015, -0.018),
    ("5", "Riverside Clinic", "222 River Rd", "(555) 777-8888", 0.025, -0.005),
];

/// Stand-in directory that places five clinics at fixed offsets.
pub struct MockDirectory;

#[async_trait]
impl FacilityDirectory for MockDirectory {
    fn name(&self) -> &str {
        "mock"
    }

    async fn nearby(&self, origin: Coordinate) -> Result<Vec<Facility>> {
        Ok(MOCK_FACILITIES
            .iter()
            .map(|&(id, name, address, phone, d_lat, d_lng)| Facility {
                id: id.to_string(),
                name: name.to_string(),
                address: address.to_string(),
                phone: phone.to_string(),
                coordinate: origin.offset(d_lat, d_lng),
            })
            .collect())
    }
}

/// Directory backed by an HTTP endpoint.
pub struct HttpDirectory {
    url: String,
    client: reqwest::Client,
}

impl HttpDirectory {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl FacilityDirectory for HttpDirectory {
    fn name(&self) -> &str {
        "http"
    }

    async fn nearby(&self, origin: Coordinate) -> Result<Vec<Facility>> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("lat", origin.lat), ("lng", origin.lng)])
            .send()
            .await
            .with_context(|| format!("facility directory request to {} failed", self.url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("facility directory error {}: {}", status, body);
        }

        response
            .json::<Vec<Facility>>()
            .await
            .context("facility directory returned an unexpected payload")
    }
}

/// Instantiate the directory named by `directory.provider`.
pub fn create_directory(config: &DirectoryConfig) -> Result<Box<dyn FacilityDirectory>> {
    match config.provider.as_str() {
        "mock" => Ok(Box::new(MockDirectory)),
        "http" => {
            let url = config
                .url
                .clone()
                .ok_or_else(|| anyhow::anyhow!("directory.url required for http provider"))?;
            Ok(Box::new(HttpDirectory::new(
                url,
                Duration::from_secs(config.timeout_secs),
            )?))
        }
        other => bail!("Unknown directory provider: {}", other),
    }
}
