use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::metrics::CompanyMetricsSnapshot;
use crate::period::DateRange;

/// Company identity and segmentation attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub id: String,
    pub name: String,
    pub industry: String,
    /// Size segment, e.g. `small` / `medium` / `large`.
    pub size: String,
    pub status: String,
}

/// Source of raw metric snapshots.
///
/// The engine never retries a failed fetch; retry and timeout policy belong
/// to the implementation behind this trait. `NotFound` means the company id
/// is unknown, `Unavailable` means the backing store could not answer.
#[async_trait]
pub trait MetricsProvider: Send + Sync {
    /// Fetch one company's snapshot for a concrete window.
    async fn fetch_snapshot(
        &self,
        company_id: &str,
        range: &DateRange,
    ) -> Result<CompanyMetricsSnapshot>;

    /// Fetch a company's identity record.
    async fn fetch_company_info(&self, company_id: &str) -> Result<CompanyInfo>;

    /// Enumerate every known company. Used to build the peer universe for
    /// comparison sections.
    async fn list_companies(&self) -> Result<Vec<CompanyInfo>>;
}

/// In-memory provider over pre-registered companies and snapshots.
///
/// The default snapshot registered for a company answers any window; exact
/// windows can be overridden with [`StaticProvider::insert_ranged_snapshot`]
/// to model history for trend analysis. Fetch counters make cache behavior
/// observable in tests.
#[derive(Default)]
pub struct StaticProvider {
    companies: Mutex<Vec<CompanyInfo>>,
    snapshots: Mutex<HashMap<String, CompanyMetricsSnapshot>>,
    ranged: Mutex<HashMap<(String, String), CompanyMetricsSnapshot>>,
    snapshot_fetches: AtomicUsize,
    info_fetches: AtomicUsize,
}

fn range_key(range: &DateRange) -> String {
    format!("{}..{}", range.start.to_rfc3339(), range.end.to_rfc3339())
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a company with the snapshot it returns for any window.
    pub fn insert_company(&self, info: CompanyInfo, snapshot: CompanyMetricsSnapshot) {
        let mut companies = self.companies.lock().unwrap_or_else(|p| p.into_inner());
        companies.retain(|c| c.id != info.id);
        let mut snapshots = self.snapshots.lock().unwrap_or_else(|p| p.into_inner());
        snapshots.insert(info.id.clone(), snapshot);
        companies.push(info);
    }

    /// Register a company with no snapshot behind it; fetches for it fail
    /// with `NotFound`.
    pub fn insert_company_info(&self, info: CompanyInfo) {
        let mut companies = self.companies.lock().unwrap_or_else(|p| p.into_inner());
        companies.retain(|c| c.id != info.id);
        companies.push(info);
    }

    /// Override the snapshot returned for one exact window.
    pub fn insert_ranged_snapshot(
        &self,
        company_id: &str,
        range: &DateRange,
        snapshot: CompanyMetricsSnapshot,
    ) {
        let mut ranged = self.ranged.lock().unwrap_or_else(|p| p.into_inner());
        ranged.insert((company_id.to_string(), range_key(range)), snapshot);
    }

    /// Number of snapshot fetches served so far.
    pub fn snapshot_fetches(&self) -> usize {
        self.snapshot_fetches.load(Ordering::SeqCst)
    }

    /// Number of company-info fetches served so far.
    pub fn info_fetches(&self) -> usize {
        self.info_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetricsProvider for StaticProvider {
    async fn fetch_snapshot(
        &self,
        company_id: &str,
        range: &DateRange,
    ) -> Result<CompanyMetricsSnapshot> {
        self.snapshot_fetches.fetch_add(1, Ordering::SeqCst);

        {
            let ranged = self.ranged.lock().unwrap_or_else(|p| p.into_inner());
            if let Some(snapshot) = ranged.get(&(company_id.to_string(), range_key(range))) {
                return Ok(snapshot.clone());
            }
        }

        let snapshots = self.snapshots.lock().unwrap_or_else(|p| p.into_inner());
        snapshots
            .get(company_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(company_id.to_string()))
    }

    async fn fetch_company_info(&self, company_id: &str) -> Result<CompanyInfo> {
        self.info_fetches.fetch_add(1, Ordering::SeqCst);

        let companies = self.companies.lock().unwrap_or_else(|p| p.into_inner());
        companies
            .iter()
            .find(|c| c.id == company_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(company_id.to_string()))
    }

    async fn list_companies(&self) -> Result<Vec<CompanyInfo>> {
        let companies = self.companies.lock().unwrap_or_else(|p| p.into_inner());
        Ok(companies.clone())
    }
}
