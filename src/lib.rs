pub mod cache;
pub mod clock;
pub mod compare;
pub mod date_util;
pub mod error;
pub mod kpi;
pub mod metrics;
pub mod period;
pub mod provider;
pub mod recommend;
pub mod report;
pub mod stats;
pub mod trend;

pub use cache::ReportCache;
pub use clock::{Clock, FixedClock, SystemClock};
pub use compare::{ComparativeMetricStats, Metric, MetricStanding, Peer, RankEntry, Ranking};
pub use error::{Error, Result};
pub use kpi::KpiSet;
pub use metrics::{CompanyMetricsSnapshot, EmployeeMetric, EmployeeRollup};
pub use period::{DateRange, PeriodSlice, RangeLabel};
pub use provider::{CompanyInfo, MetricsProvider, StaticProvider};
pub use recommend::{Priority, Recommendation, RecommendationThresholds};
pub use report::{
    CompanyReport, CompanyReportRequest, ComparativeReport, ComparativeReportRequest,
};

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures::future;

use crate::report::{
    CommunicationSummary, ComparativeCompany, ComparisonSection, ReportPeriod, TrendSection,
};
use crate::trend::TrendPoint;

/// How many entries a leader/laggard list carries.
const STANDINGS_TOP_N: usize = 3;

/// Main entry point: builds company and comparative communication reports.
///
/// The engine owns no data. Snapshots come from the injected
/// `MetricsProvider`; the only state is a TTL-bounded cache of assembled
/// reports, keyed by request fingerprint. All time-dependent behavior goes
/// through the injected clock.
pub struct ReportEngine {
    provider: Arc<dyn MetricsProvider>,
    clock: Arc<dyn Clock>,
    thresholds: RecommendationThresholds,
    ttl: Duration,
    company_cache: ReportCache<CompanyReport>,
    comparative_cache: ReportCache<ComparativeReport>,
}

impl ReportEngine {
    /// Engine with the system clock, default thresholds, and the default
    /// cache TTL.
    pub fn new(provider: Arc<dyn MetricsProvider>) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let ttl = cache::default_ttl();
        Self {
            company_cache: ReportCache::new(ttl, clock.clone()),
            comparative_cache: ReportCache::new(ttl, clock.clone()),
            provider,
            clock,
            thresholds: RecommendationThresholds::default(),
            ttl,
        }
    }

    /// Replace the time source. Resets the report caches, which judge
    /// expiry against the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self.rebuild_caches();
        self
    }

    /// Replace the cache freshness window. Resets the report caches.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self.rebuild_caches();
        self
    }

    pub fn with_thresholds(mut self, thresholds: RecommendationThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    fn rebuild_caches(&mut self) {
        self.company_cache = ReportCache::new(self.ttl, self.clock.clone());
        self.comparative_cache = ReportCache::new(self.ttl, self.clock.clone());
    }

    // ── Report generation ──────────────────────────────────────────

    /// Build (or serve from cache) a single-company report.
    ///
    /// Fails only when the company's own data cannot be fetched. A peer
    /// fetch failure drops the comparison section with a warning instead of
    /// failing the report.
    pub async fn company_report(&self, req: &CompanyReportRequest) -> Result<CompanyReport> {
        let key = req.fingerprint();
        if let Some(report) = self.company_cache.get(&key) {
            log::debug!("report cache hit: {key}");
            return Ok(report);
        }
        log::debug!("report cache miss: {key}");

        let now = self.clock.now();
        let range = req.date_range_label.resolve(now);
        let company = self.provider.fetch_company_info(&req.company_id).await?;
        let snapshot = self.provider.fetch_snapshot(&req.company_id, &range).await?;
        let kpis = KpiSet::from_snapshot(&snapshot);

        let comparison = if req.include_comparison {
            match self.build_comparison(&company, &snapshot, &kpis, &range).await {
                Ok(section) => Some(section),
                Err(e) => {
                    log::warn!("comparison section skipped for {}: {e}", company.id);
                    None
                }
            }
        } else {
            None
        };

        let trends = if req.include_trends {
            Some(
                self.build_trends(&req.company_id, req.date_range_label, now)
                    .await?,
            )
        } else {
            None
        };

        let insights = report::company_insights(comparison.as_ref(), trends.as_ref());
        let extra = trends
            .as_ref()
            .map(report::trend_recommendations)
            .unwrap_or_default();
        let recommendations = recommend::evaluate(&kpis, &extra, &self.thresholds);

        let employees = if req.include_employee_details {
            snapshot.employees.clone()
        } else {
            None
        };

        let report = CompanyReport {
            company,
            report_period: ReportPeriod {
                label: req.date_range_label,
                range,
            },
            communication: CommunicationSummary::from_snapshot(&snapshot),
            employees,
            comparison,
            insights,
            trends,
            kpis,
            recommendations,
        };
        self.company_cache.put(&key, report.clone());
        Ok(report)
    }

    /// Build (or serve from cache) a multi-company comparative report.
    ///
    /// Rankings and percentiles are only meaningful over the complete
    /// declared peer set, so any single fetch failure fails the whole
    /// report; peers are never silently dropped.
    pub async fn comparative_report(
        &self,
        req: &ComparativeReportRequest,
    ) -> Result<ComparativeReport> {
        if req.company_ids.is_empty() {
            return Err(Error::InvalidInput(
                "comparative report requires at least one company".to_string(),
            ));
        }

        let key = req.fingerprint();
        if let Some(report) = self.comparative_cache.get(&key) {
            log::debug!("report cache hit: {key}");
            return Ok(report);
        }
        log::debug!("report cache miss: {key}");

        let metrics = req.resolved_metrics();
        let range = req.date_range_label.resolve(self.clock.now());

        let peers = future::try_join_all(req.company_ids.iter().map(|id| async move {
            let info = self.provider.fetch_company_info(id).await?;
            let snapshot = self.provider.fetch_snapshot(id, &range).await?;
            Ok::<Peer, Error>(Peer {
                id: info.id,
                name: info.name,
                snapshot,
            })
        }))
        .await?;
        log::debug!("comparative report over {} companies", peers.len());

        let companies: Vec<ComparativeCompany> = peers
            .iter()
            .map(|peer| ComparativeCompany {
                id: peer.id.clone(),
                name: peer.name.clone(),
                metrics: metrics
                    .iter()
                    .map(|m| (*m, compare::metric_value(&peer.snapshot, *m)))
                    .collect(),
                kpis: KpiSet::from_snapshot(&peer.snapshot),
            })
            .collect();

        let mut comparisons = BTreeMap::new();
        let mut rankings = BTreeMap::new();
        let mut leaders = BTreeMap::new();
        let mut laggards = BTreeMap::new();
        for metric in &metrics {
            comparisons.insert(*metric, compare::comparative_stats(&peers, *metric));
            rankings.insert(*metric, compare::rank(&peers, *metric));
            leaders.insert(*metric, compare::leaders(&peers, *metric, STANDINGS_TOP_N));
            laggards.insert(*metric, compare::laggards(&peers, *metric, STANDINGS_TOP_N));
        }

        let insights = report::comparative_insights(&companies, &metrics);

        let report = ComparativeReport {
            comparison_period: ReportPeriod {
                label: req.date_range_label,
                range,
            },
            companies,
            comparisons,
            rankings,
            leaders,
            laggards,
            insights,
        };
        self.comparative_cache.put(&key, report.clone());
        Ok(report)
    }

    // ── Cache control ──────────────────────────────────────────────

    /// Drop cached reports for one company. Comparative fingerprints join
    /// sorted id lists, so those are cleared wholesale.
    pub fn invalidate_company(&self, company_id: &str) {
        self.company_cache
            .invalidate_prefix(&format!("company:{company_id}:"));
        self.comparative_cache.clear();
    }

    pub fn clear_cache(&self) {
        self.company_cache.clear();
        self.comparative_cache.clear();
    }

    // ── Section builders ───────────────────────────────────────────

    async fn build_comparison(
        &self,
        company: &CompanyInfo,
        snapshot: &CompanyMetricsSnapshot,
        kpis: &KpiSet,
        range: &DateRange,
    ) -> Result<ComparisonSection> {
        let peer_infos: Vec<CompanyInfo> = self
            .provider
            .list_companies()
            .await?
            .into_iter()
            .filter(|c| c.industry == company.industry && c.id != company.id)
            .collect();
        log::debug!(
            "comparing {} against {} industry peers",
            company.id,
            peer_infos.len()
        );

        let snapshots = future::try_join_all(
            peer_infos
                .iter()
                .map(|peer| self.provider.fetch_snapshot(&peer.id, range)),
        )
        .await?;

        let peers: Vec<Peer> = peer_infos
            .into_iter()
            .zip(snapshots)
            .map(|(info, snapshot)| Peer {
                id: info.id,
                name: info.name,
                snapshot,
            })
            .collect();

        let industry = compare::industry_average(&peers);
        let benchmarks = industry
            .as_ref()
            .map(|avg| compare::benchmark(kpis, avg))
            .unwrap_or_default();

        let mut percentiles = BTreeMap::new();
        for metric in Metric::ALL {
            let population: Vec<f64> = peers
                .iter()
                .map(|p| compare::metric_value(&p.snapshot, metric))
                .collect();
            percentiles.insert(
                metric,
                compare::percentile(compare::metric_value(snapshot, metric), &population),
            );
        }

        Ok(ComparisonSection {
            industry,
            benchmarks,
            percentiles,
            peer_count: peers.len(),
        })
    }

    async fn build_trends(
        &self,
        company_id: &str,
        label: RangeLabel,
        now: DateTime<Utc>,
    ) -> Result<TrendSection> {
        let slices = label.history_slices(now);
        let snapshots = future::try_join_all(
            slices
                .iter()
                .map(|slice| self.provider.fetch_snapshot(company_id, &slice.range)),
        )
        .await?;

        let series: Vec<TrendPoint> = slices
            .into_iter()
            .zip(snapshots)
            .map(|(slice, snapshot)| TrendPoint {
                period_label: slice.key,
                range: slice.range,
                total_messages: snapshot.overview.total_messages,
                delivery_rate: snapshot.delivery.delivery_rate,
                engagement_rate: snapshot.engagement.overall_engagement,
            })
            .collect();

        let growth = trend::growth_analysis(&series)?;
        let seasonality = trend::seasonality(&series);
        Ok(TrendSection {
            series,
            growth,
            seasonality,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;

    fn fixed_clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 7, 15, 12, 0, 0).unwrap(),
        ))
    }

    fn info(id: &str, industry: &str) -> CompanyInfo {
        CompanyInfo {
            id: id.to_string(),
            name: format!("Company {id}"),
            industry: industry.to_string(),
            size: "medium".to_string(),
            status: "active".to_string(),
        }
    }

    fn snapshot(volume: u64, delivery: f64, engagement: f64, score: f64, efficiency: f64) -> CompanyMetricsSnapshot {
        let mut snapshot = CompanyMetricsSnapshot::default();
        snapshot.overview.total_messages = volume;
        snapshot.delivery.delivery_rate = delivery;
        snapshot.engagement.overall_engagement = engagement;
        snapshot.performance.performance_score = score;
        snapshot.performance.efficiency = efficiency;
        snapshot
    }

    /// acme/globex/initech share an industry; umbrella is elsewhere.
    fn seeded_provider() -> Arc<StaticProvider> {
        let provider = StaticProvider::new();
        provider.insert_company(
            info("acme", "technology"),
            snapshot(500, 90.0, 40.0, 75.0, 80.0),
        );
        provider.insert_company(
            info("globex", "technology"),
            snapshot(300, 80.0, 55.0, 70.0, 75.0),
        );
        provider.insert_company(
            info("initech", "technology"),
            snapshot(100, 60.0, 30.0, 50.0, 60.0),
        );
        provider.insert_company(
            info("umbrella", "pharma"),
            snapshot(900, 95.0, 70.0, 90.0, 85.0),
        );
        Arc::new(provider)
    }

    fn engine(provider: Arc<StaticProvider>) -> ReportEngine {
        ReportEngine::new(provider).with_clock(fixed_clock())
    }

    fn bare_request(id: &str) -> CompanyReportRequest {
        CompanyReportRequest {
            company_id: id.to_string(),
            date_range_label: RangeLabel::ThirtyDays,
            include_comparison: false,
            include_employee_details: false,
            include_trends: false,
        }
    }

    #[tokio::test]
    async fn test_company_report_kpis_and_recommendations() {
        let engine = engine(seeded_provider());
        let report = engine.company_report(&bare_request("acme")).await.unwrap();

        assert_eq!(report.company.name, "Company acme");
        assert_eq!(report.kpis.engagement_quality, 40.0);
        assert_eq!(report.kpis.overall_score, 157.0);

        // Engagement below 50 fires the high-priority rule.
        let engagement = report
            .recommendations
            .iter()
            .find(|r| r.category == "engagement")
            .expect("engagement recommendation");
        assert_eq!(engagement.priority, Priority::High);
        assert!(report.comparison.is_none());
        assert!(report.trends.is_none());
        assert!(report.employees.is_none());
    }

    #[tokio::test]
    async fn test_company_report_full_sections() {
        let engine = engine(seeded_provider());
        let req = CompanyReportRequest::new("acme", RangeLabel::ThirtyDays);
        let report = engine.company_report(&req).await.unwrap();

        let comparison = report.comparison.expect("comparison section");
        assert_eq!(comparison.peer_count, 2); // globex + initech, not umbrella
        let industry = comparison.industry.expect("industry average");
        assert_eq!(industry.sample_size, 2);
        assert_eq!(industry.delivery_rate, 70.0); // (80 + 60) / 2
        // acme's 90 beats both peers.
        assert_eq!(comparison.percentiles[&Metric::Delivery], 100.0);

        let trends = report.trends.expect("trends section");
        assert_eq!(trends.series.len(), 6); // monthly slices
        assert_eq!(trends.series[0].period_label, "2025-02");
        // Identical history for every slice reads as flat.
        assert_eq!(
            trends.growth.trend_direction,
            trend::TrendDirection::Stable
        );
        assert!(!report.insights.is_empty());
    }

    #[tokio::test]
    async fn test_company_report_employee_section() {
        let provider = StaticProvider::new();
        let mut snap = snapshot(500, 90.0, 40.0, 75.0, 80.0);
        snap.employees = Some(EmployeeRollup::from_employees(vec![
            EmployeeMetric::from_counts("e1", "Alice", "eng", 300, 280, 150, 40, 120.0, None),
            EmployeeMetric::from_counts("e2", "Bob", "sales", 200, 190, 80, 10, 300.0, None),
        ]));
        provider.insert_company(info("acme", "technology"), snap);

        let engine = engine(Arc::new(provider));
        let mut req = bare_request("acme");
        req.include_employee_details = true;

        let report = engine.company_report(&req).await.unwrap();
        let employees = report.employees.expect("employee section");
        assert_eq!(employees.employee_count, 2);
        assert_eq!(report.kpis.active_participation, Some(100.0));
    }

    #[tokio::test]
    async fn test_company_report_cached_within_ttl() {
        let provider = seeded_provider();
        let clock = fixed_clock();
        let engine = ReportEngine::new(provider.clone()).with_clock(clock.clone());
        let req = bare_request("acme");

        let first = engine.company_report(&req).await.unwrap();
        let fetches_after_first = provider.snapshot_fetches();

        clock.advance(Duration::minutes(9));
        let second = engine.company_report(&req).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(provider.snapshot_fetches(), fetches_after_first);

        // Past the TTL the engine recomputes.
        clock.advance(Duration::minutes(1));
        engine.company_report(&req).await.unwrap();
        assert!(provider.snapshot_fetches() > fetches_after_first);
    }

    #[tokio::test]
    async fn test_company_report_idempotent_serialization() {
        let req = CompanyReportRequest::new("acme", RangeLabel::ThirtyDays);

        let a = engine(seeded_provider())
            .company_report(&req)
            .await
            .unwrap();
        let b = engine(seeded_provider())
            .company_report(&req)
            .await
            .unwrap();

        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[tokio::test]
    async fn test_company_report_degrades_comparison_on_peer_failure() {
        let provider = StaticProvider::new();
        provider.insert_company(
            info("acme", "technology"),
            snapshot(500, 90.0, 40.0, 75.0, 80.0),
        );
        // A registered peer with no snapshot behind it breaks peer fetches.
        provider.insert_company_info(info("ghost", "technology"));

        let engine = engine(Arc::new(provider));
        let mut req = bare_request("acme");
        req.include_comparison = true;

        let report = engine.company_report(&req).await.unwrap();
        assert!(report.comparison.is_none());
    }

    #[tokio::test]
    async fn test_company_report_unknown_company() {
        let engine = engine(seeded_provider());
        let err = engine
            .company_report(&bare_request("ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_comparative_report_rankings() {
        let engine = engine(seeded_provider());
        let req = ComparativeReportRequest {
            company_ids: vec![
                "initech".to_string(),
                "globex".to_string(),
                "acme".to_string(),
            ],
            date_range_label: RangeLabel::ThirtyDays,
            metrics: vec![Metric::Delivery],
        };

        let report = engine.comparative_report(&req).await.unwrap();
        assert_eq!(report.companies.len(), 3);

        let ranking = &report.rankings[&Metric::Delivery];
        assert_eq!(ranking[0].company_id, "acme"); // 90.0
        assert_eq!(ranking[0].rank, 1);
        assert_eq!(ranking[0].percentile, 100.0);
        assert_eq!(ranking[2].company_id, "initech"); // 60.0
        assert_eq!(ranking[2].rank, 3);
        assert_eq!(ranking[2].percentile, 33.3);

        let stats = &report.comparisons[&Metric::Delivery];
        assert!((stats.average - 76.6667).abs() < 0.001);
        assert_eq!(stats.max, 90.0);
        assert_eq!(stats.min, 60.0);

        assert_eq!(report.leaders[&Metric::Delivery][0].company_id, "acme");
        assert_eq!(report.laggards[&Metric::Delivery][0].company_id, "initech");
        assert!(!report.insights.is_empty());
    }

    #[tokio::test]
    async fn test_comparative_report_empty_ids_fails_before_fetch() {
        let provider = seeded_provider();
        let engine = ReportEngine::new(provider.clone()).with_clock(fixed_clock());
        let req = ComparativeReportRequest::new(Vec::new(), RangeLabel::SevenDays);

        let err = engine.comparative_report(&req).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(provider.snapshot_fetches(), 0);
        assert_eq!(provider.info_fetches(), 0);
    }

    #[tokio::test]
    async fn test_comparative_report_fails_fast_on_missing_peer() {
        let engine = engine(seeded_provider());
        let req = ComparativeReportRequest::new(
            vec!["acme".to_string(), "ghost".to_string()],
            RangeLabel::ThirtyDays,
        );

        let err = engine.comparative_report(&req).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_comparative_report_cached() {
        let provider = seeded_provider();
        let clock = fixed_clock();
        let engine = ReportEngine::new(provider.clone()).with_clock(clock.clone());
        let req = ComparativeReportRequest::new(
            vec!["acme".to_string(), "globex".to_string()],
            RangeLabel::SevenDays,
        );

        engine.comparative_report(&req).await.unwrap();
        let fetches = provider.snapshot_fetches();

        // Same peer set in a different order hits the same entry.
        let reordered = ComparativeReportRequest::new(
            vec!["globex".to_string(), "acme".to_string()],
            RangeLabel::SevenDays,
        );
        engine.comparative_report(&reordered).await.unwrap();
        assert_eq!(provider.snapshot_fetches(), fetches);
    }

    #[tokio::test]
    async fn test_invalidate_company_refetches() {
        let provider = seeded_provider();
        let engine = ReportEngine::new(provider.clone()).with_clock(fixed_clock());
        let req = bare_request("acme");

        engine.company_report(&req).await.unwrap();
        let fetches = provider.snapshot_fetches();

        engine.invalidate_company("acme");
        engine.company_report(&req).await.unwrap();
        assert!(provider.snapshot_fetches() > fetches);
    }

    /// Provider whose snapshot fetches always fail.
    struct BrokenProvider;

    #[async_trait]
    impl MetricsProvider for BrokenProvider {
        async fn fetch_snapshot(
            &self,
            _company_id: &str,
            _range: &DateRange,
        ) -> Result<CompanyMetricsSnapshot> {
            Err(Error::Unavailable("metrics store offline".to_string()))
        }

        async fn fetch_company_info(&self, company_id: &str) -> Result<CompanyInfo> {
            Ok(CompanyInfo {
                id: company_id.to_string(),
                name: company_id.to_string(),
                industry: "technology".to_string(),
                size: "small".to_string(),
                status: "active".to_string(),
            })
        }

        async fn list_companies(&self) -> Result<Vec<CompanyInfo>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_failed_reports_are_not_cached() {
        let engine = ReportEngine::new(Arc::new(BrokenProvider)).with_clock(fixed_clock());
        let req = bare_request("acme");

        let err = engine.company_report(&req).await.unwrap_err();
        assert!(matches!(err, Error::Unavailable(_)));
        assert!(engine.company_cache.is_empty());
    }

    #[tokio::test]
    async fn test_report_json_shape() {
        let engine = engine(seeded_provider());
        let req = CompanyReportRequest::new("acme", RangeLabel::ThirtyDays);
        let report = engine.company_report(&req).await.unwrap();

        let json = serde_json::to_value(&report).unwrap();
        for field in [
            "company",
            "report_period",
            "communication",
            "comparison",
            "insights",
            "trends",
            "kpis",
            "recommendations",
        ] {
            assert!(json.get(field).is_some(), "missing field: {field}");
        }
        // Employee details were not requested, so the key is absent.
        assert!(json.get("employees").is_none());
        assert_eq!(json["report_period"]["label"], "30d");
        assert_eq!(json["kpis"]["overall_score"], 157.0);
    }
}
