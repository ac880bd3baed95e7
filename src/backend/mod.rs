//! Backend synchronisation policy
//!
//! Two independent behaviours share the network transport:
//!
//! - **Report-type sync**: one eager fetch when the network comes up, then a
//!   retry every `report_types_retry_ms` until a fetch succeeds. The loaded
//!   list is frozen afterwards.
//! - **Submission**: a blocking POST of the help request followed by one
//!   best-effort read of the average response time.

mod parse;
mod report;

pub use parse::{normalize_label, parse_report_type_names, parse_wait_minutes, MetricReading};
pub use report::ReportSubmission;

use crate::config::{ApiConfig, KioskConfig};
use crate::error::BackendError;
use crate::hal::{HttpResponse, NetworkTransport};

/// Options shown before the backend list arrives
pub const DEFAULT_REPORT_TYPES: &[&str] = &["Wideo", "Bank", "E-recepta", "Aplikacje", "Inne"];

/// Upper bound (exclusive) for a believable wait, one day
pub const MAX_WAIT_MINUTES: u32 = 24 * 60;

/// Join a base URL and a path with exactly one slash between them
pub fn join_url(base: &str, path: &str) -> String {
    if path.is_empty() {
        return base.to_string();
    }
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}

/// Absolute URLs of the endpoints the kiosk uses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    pub reports: String,
    pub report_types: String,
    pub avg_response_time: String,
}

impl ApiEndpoints {
    pub fn new(base_url: &str) -> Self {
        Self {
            reports: join_url(base_url, "/api/v1/reports/"),
            report_types: join_url(base_url, "/api/v1/types/report_types"),
            avg_response_time: join_url(base_url, "/api/v1/reports/metrics/avg-response-time"),
        }
    }
}

/// Predicted wait shown after submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitEstimate {
    Minutes(u32),
    /// No trustworthy figure; rendered as `--`
    #[default]
    Unknown,
}

impl WaitEstimate {
    /// Round and accept only 0 < minutes < [`MAX_WAIT_MINUTES`]
    pub fn from_minutes(minutes: f64) -> Self {
        if !minutes.is_finite() {
            return WaitEstimate::Unknown;
        }
        let rounded = (minutes + 0.5).floor();
        if rounded > 0.0 && rounded < MAX_WAIT_MINUTES as f64 {
            WaitEstimate::Minutes(rounded as u32)
        } else {
            WaitEstimate::Unknown
        }
    }

    pub fn from_reading(reading: MetricReading) -> Self {
        match reading {
            MetricReading::Value(v) => Self::from_minutes(v),
            MetricReading::Null | MetricReading::Malformed => WaitEstimate::Unknown,
        }
    }

    pub fn minutes(&self) -> Option<u32> {
        match self {
            WaitEstimate::Minutes(m) => Some(*m),
            WaitEstimate::Unknown => None,
        }
    }
}

/// Result of the send action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub submitted: bool,
    pub wait: WaitEstimate,
}

/// Report-type sync state plus the submission calls
#[derive(Debug)]
pub struct BackendSyncPolicy {
    endpoints: ApiEndpoints,
    api: ApiConfig,
    retry_interval_ms: u64,
    report_types: Vec<String>,
    loaded: bool,
    requested: bool,
    last_attempt_ms: Option<u64>,
    attempts: u32,
}

impl BackendSyncPolicy {
    pub fn new(config: &KioskConfig) -> Self {
        Self {
            endpoints: ApiEndpoints::new(&config.api.base_url),
            api: config.api.clone(),
            retry_interval_ms: config.timing.report_types_retry_ms,
            report_types: Vec::new(),
            loaded: false,
            requested: false,
            last_attempt_ms: None,
            attempts: 0,
        }
    }

    pub fn endpoints(&self) -> &ApiEndpoints {
        &self.endpoints
    }

    /// Backend-provided labels, once loaded
    pub fn report_types(&self) -> Option<&[String]> {
        self.loaded.then_some(self.report_types.as_slice())
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_fetch_in_flight(&self) -> bool {
        self.requested
    }

    /// Number of fetch attempts made so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Eager first attempt right after the network phase
    pub fn on_network_ready(&mut self, net: &mut dyn NetworkTransport, now_ms: u64) {
        if let Err(e) = self.fetch_report_types_once(net, now_ms) {
            log::warn!("Report types not loaded yet: {} (retrying in {} ms)", e, self.retry_interval_ms);
        }
    }

    /// Periodic retry; does nothing once loaded or without a network
    pub fn poll(&mut self, net: Option<&mut dyn NetworkTransport>, now_ms: u64) {
        let Some(net) = net else {
            return;
        };
        if self.loaded {
            return;
        }
        let due = match self.last_attempt_ms {
            Some(last) => now_ms.saturating_sub(last) >= self.retry_interval_ms,
            None => true,
        };
        if due {
            if let Err(e) = self.fetch_report_types_once(net, now_ms) {
                log::warn!("Report types retry failed: {}", e);
            }
        }
    }

    /// Single-flight fetch of the report-type list
    ///
    /// Returns the number of labels loaded. Once a fetch has succeeded this
    /// is a no-op returning the frozen count.
    pub fn fetch_report_types_once(
        &mut self,
        net: &mut dyn NetworkTransport,
        now_ms: u64,
    ) -> Result<usize, BackendError> {
        if !self.begin_report_types_fetch(now_ms)? {
            return Ok(self.report_types.len());
        }
        let response = self.get_ok(net, &self.endpoints.report_types, self.api.report_types_timeout());
        self.finish_report_types_fetch(response)
    }

    /// Claim the fetch slot
    ///
    /// `Ok(false)` once the list is loaded, `Err(InFlight)` while an
    /// earlier fetch has not been finished.
    pub fn begin_report_types_fetch(&mut self, now_ms: u64) -> Result<bool, BackendError> {
        if self.loaded {
            return Ok(false);
        }
        if self.requested {
            return Err(BackendError::InFlight);
        }
        self.requested = true;
        self.last_attempt_ms = Some(now_ms);
        self.attempts += 1;
        Ok(true)
    }

    /// Release the fetch slot and keep the list if the response parsed
    pub fn finish_report_types_fetch(
        &mut self,
        response: Result<HttpResponse, BackendError>,
    ) -> Result<usize, BackendError> {
        self.requested = false;

        let names = response
            .and_then(|resp| parse_report_type_names(&resp.body).ok_or(BackendError::Unparsable))?;
        log::info!("Loaded {} report types from backend", names.len());
        self.report_types = names;
        self.loaded = true;
        Ok(self.report_types.len())
    }

    /// POST the help request
    pub fn submit_report(
        &self,
        net: &mut dyn NetworkTransport,
        report: &ReportSubmission,
    ) -> Result<HttpResponse, BackendError> {
        let body = report.to_json()?;
        let resp = net.post(&self.endpoints.reports, &body, "application/json", self.api.submit_timeout())?;
        if !resp.is_success() {
            return Err(BackendError::Status {
                status: resp.status,
                body: resp.body,
            });
        }
        Ok(resp)
    }

    /// Read the average response time; every failure becomes `Unknown`
    pub fn fetch_wait_estimate(&self, net: &mut dyn NetworkTransport) -> WaitEstimate {
        match self.get_ok(net, &self.endpoints.avg_response_time, self.api.metric_timeout()) {
            Ok(resp) => {
                let reading = parse_wait_minutes(&resp.body);
                let estimate = WaitEstimate::from_reading(reading);
                log::info!("Average response time {:?} -> {:?}", reading, estimate);
                estimate
            }
            Err(e) => {
                log::warn!("Average response time unavailable: {}", e);
                WaitEstimate::Unknown
            }
        }
    }

    /// Blocking send followed by the metric read (only after a successful send)
    pub fn submit_and_estimate(
        &self,
        net: Option<&mut dyn NetworkTransport>,
        report: &ReportSubmission,
    ) -> SubmissionOutcome {
        let Some(net) = net else {
            log::warn!("Report not submitted: {}", BackendError::NoNetwork);
            return SubmissionOutcome {
                submitted: false,
                wait: WaitEstimate::Unknown,
            };
        };

        match self.submit_report(net, report) {
            Ok(_) => {
                log::info!("Report submitted successfully");
                SubmissionOutcome {
                    submitted: true,
                    wait: self.fetch_wait_estimate(net),
                }
            }
            Err(e) => {
                log::warn!("Report submit failed: {}", e);
                SubmissionOutcome {
                    submitted: false,
                    wait: WaitEstimate::Unknown,
                }
            }
        }
    }

    fn get_ok(
        &self,
        net: &mut dyn NetworkTransport,
        url: &str,
        timeout: std::time::Duration,
    ) -> Result<HttpResponse, BackendError> {
        let resp = net.get(url, timeout)?;
        if resp.is_success() {
            Ok(resp)
        } else {
            Err(BackendError::Status {
                status: resp.status,
                body: resp.body,
            })
        }
    }
}
