use crate::aggregate::{Activity, Labeled, Metric, Peak};
use crate::quality::DataQualityWarning;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which table of the dataset a metric or diagnostic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSet {
    Monthly,
    Hourly,
    Countries,
    Clients,
    Failures,
}

impl fmt::Display for RecordSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Monthly => "monthly",
            Self::Hourly => "hourly",
            Self::Countries => "countries",
            Self::Clients => "clients",
            Self::Failures => "failures",
        };
        f.write_str(name)
    }
}

/// One time bucket (month, day, hour slot). A `None` success rate means the
/// rate is undefined, not zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRecord {
    pub label: String,
    pub transaction_count: u64,
    pub volume: f64,
    #[serde(default)]
    pub success_rate: Option<f64>,
    #[serde(default)]
    pub unique_senders: u64,
    #[serde(default)]
    pub unique_recipients: u64,
}

impl PeriodRecord {
    pub fn month(
        label: &str,
        transaction_count: u64,
        volume: f64,
        success_rate: f64,
        unique_senders: u64,
        unique_recipients: u64,
    ) -> Self {
        Self {
            label: label.to_string(),
            transaction_count,
            volume,
            success_rate: Some(success_rate),
            unique_senders,
            unique_recipients,
        }
    }

    /// An intraday bucket, which only carries volume and count.
    pub fn slot(label: &str, volume: f64, transaction_count: u64) -> Self {
        Self {
            label: label.to_string(),
            transaction_count,
            volume,
            success_rate: None,
            unique_senders: 0,
            unique_recipients: 0,
        }
    }
}

impl Labeled for PeriodRecord {
    fn label(&self) -> &str {
        &self.label
    }
}

impl Activity for PeriodRecord {
    fn is_active(&self) -> bool {
        self.transaction_count > 0
    }
}

impl PeriodRecord {
    /// Active, yet no success rate was recorded.
    pub fn rate_missing(&self) -> bool {
        self.is_active() && self.success_rate.is_none()
    }
}

/// Periods that success-rate aggregations may read. Active periods without a
/// recorded rate are left out rather than counted as 0%.
pub fn rated_periods(periods: &[PeriodRecord]) -> Vec<&PeriodRecord> {
    periods.iter().filter(|period| !period.rate_missing()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodField {
    TransactionCount,
    Volume,
    SuccessRate,
}

impl PeriodField {
    /// An undefined success rate reads as 0, which is how the "all periods"
    /// mean treats inactive periods.
    pub fn of(self, record: &PeriodRecord) -> f64 {
        match self {
            Self::TransactionCount => record.transaction_count as f64,
            Self::Volume => record.volume,
            Self::SuccessRate => record.success_rate.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRecord {
    pub country_code: String,
    pub volume: f64,
    pub transaction_count: u64,
    pub market_share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub client_name: String,
    pub volume: f64,
    pub transaction_count: u64,
    pub market_share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub reason: String,
    pub count: u64,
    pub percentage: f64,
}

/// Rows of a market-share table (countries, clients).
pub trait ShareRecord: Labeled {
    fn volume(&self) -> f64;
    fn transaction_count(&self) -> u64;
    fn recorded_share(&self) -> f64;
}

impl Labeled for CountryRecord {
    fn label(&self) -> &str {
        &self.country_code
    }
}

impl ShareRecord for CountryRecord {
    fn volume(&self) -> f64 {
        self.volume
    }

    fn transaction_count(&self) -> u64 {
        self.transaction_count
    }

    fn recorded_share(&self) -> f64 {
        self.market_share
    }
}

impl Labeled for ClientRecord {
    fn label(&self) -> &str {
        &self.client_name
    }
}

impl ShareRecord for ClientRecord {
    fn volume(&self) -> f64 {
        self.volume
    }

    fn transaction_count(&self) -> u64 {
        self.transaction_count
    }

    fn recorded_share(&self) -> f64 {
        self.market_share
    }
}

impl Labeled for FailureRecord {
    fn label(&self) -> &str {
        &self.reason
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareField {
    Volume,
}

impl ShareField {
    pub fn of<R: ShareRecord>(self, record: &R) -> f64 {
        match self {
            Self::Volume => record.volume(),
        }
    }
}

/// Every record set the dashboard shows. Built once at startup and shared
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub monthly: Vec<PeriodRecord>,
    #[serde(default)]
    pub hourly: Vec<PeriodRecord>,
    #[serde(default)]
    pub countries: Vec<CountryRecord>,
    #[serde(default)]
    pub clients: Vec<ClientRecord>,
    #[serde(default)]
    pub failures: Vec<FailureRecord>,
}

fn default_currency() -> String {
    "KES".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeltaPoint {
    pub previous: String,
    pub current: String,
    pub absolute: f64,
    pub relative: Metric<f64>,
    pub decline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodMetrics {
    pub series: RecordSet,
    pub periods: usize,
    pub active_periods: usize,
    pub total_transactions: Metric<u64>,
    pub total_volume: Metric<f64>,
    pub mean_transactions_all: Metric<f64>,
    pub mean_transactions_active: Metric<f64>,
    pub mean_volume_all: Metric<f64>,
    pub mean_volume_active: Metric<f64>,
    pub success_rate_all: Metric<f64>,
    pub success_rate_active: Metric<f64>,
    pub success_rate_weighted: Metric<f64>,
    pub peak_success_rate: Metric<Peak<f64>>,
    pub peak_volume: Metric<Peak<f64>>,
    pub peak_transactions: Metric<Peak<u64>>,
    pub total_unique_senders: Metric<u64>,
    pub total_unique_recipients: Metric<u64>,
    pub volume_deltas: Vec<DeltaPoint>,
    pub transaction_deltas: Vec<DeltaPoint>,
    pub latest_volume_delta: Metric<DeltaPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareRow {
    pub label: String,
    pub volume: f64,
    pub transaction_count: u64,
    pub recorded_share: f64,
    pub computed_share: Metric<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareMetrics {
    pub set: RecordSet,
    pub ranked_by: ShareField,
    pub total_volume: Metric<f64>,
    pub total_transactions: Metric<u64>,
    pub known_entities: usize,
    pub leader: Metric<String>,
    pub significant: Vec<String>,
    pub ranked: Vec<ShareRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureRow {
    pub reason: String,
    pub count: u64,
    pub recorded_percentage: f64,
    pub computed_percentage: Metric<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureMetrics {
    pub total_failures: Metric<u64>,
    pub dominant_reason: Metric<String>,
    pub reasons: Vec<FailureRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub currency: String,
    pub monthly: PeriodMetrics,
    pub hourly: PeriodMetrics,
    pub countries: ShareMetrics,
    pub clients: ShareMetrics,
    pub failures: FailureMetrics,
    pub warnings: Vec<DataQualityWarning>,
}
