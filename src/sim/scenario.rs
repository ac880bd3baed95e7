//! Scripted kiosk sessions (TOML)
//!
//! ```toml
//! name = "help-request"
//! duration_ms = 14000
//! fail = ["card"]                 # collaborators that fail to open
//!
//! [[touch]]                       # tap at 160,200 for 100 ms
//! at_ms = 6000
//! x = 160
//! y = 200
//!
//! [[card]]
//! at_ms = 9000
//! uid = "04:A1:B2:C3"
//!
//! [[http]]                        # canned backend answer
//! method = "GET"
//! path = "/api/v1/types/report_types"
//! status = 200
//! body = '[{"name":"Zakupy"}]'
//!
//! [expect]
//! screen = "genlink_flow"
//! reports = 1
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use super::{
    CannedTransport, DisplayLog, FailPoint, RequestLog, ScriptedCardReader, ScriptedTouch, SimPlatform,
    TerminalDisplay,
};
use crate::backend::join_url;
use crate::card::parse_uid;
use crate::config::KioskConfig;
use crate::hal::{TransportError, TOUCH_DEBOUNCE_MS};
use crate::kiosk::Kiosk;

const BUILTIN_DEMO: &str = include_str!("../../scenarios/help_request.toml");

/// A touch held at one point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchStep {
    pub at_ms: u64,
    pub x: i16,
    pub y: i16,
    #[serde(default = "default_touch_hold")]
    pub hold_ms: u64,
}

fn default_touch_hold() -> u64 {
    100
}

/// A card held on the reader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardStep {
    pub at_ms: u64,
    pub uid: String,
    #[serde(default = "default_card_hold")]
    pub hold_ms: u64,
}

fn default_card_hold() -> u64 {
    500
}

/// Canned backend answer for one endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpRoute {
    pub method: String,
    /// Path relative to `api.base_url`
    pub path: String,
    #[serde(default = "default_status")]
    pub status: u16,
    #[serde(default)]
    pub body: String,
    /// Transport failure instead of a response (`"timeout"` or any message)
    #[serde(default)]
    pub error: Option<String>,
}

fn default_status() -> u16 {
    200
}

/// Conditions checked after the run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Expectations {
    /// Active screen at the end
    pub screen: Option<String>,
    /// Number of reports posted
    pub reports: Option<usize>,
    /// Strings that must have been drawn at some point
    pub texts: Vec<String>,
    /// Prefix of the startup failure reason
    pub failure: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub name: String,
    pub duration_ms: u64,
    pub fail: Vec<FailPoint>,
    /// Network phase answers "not ready" this many times first
    pub network_ready_after: u32,
    pub preferences: BTreeMap<String, String>,
    pub touch: Vec<TouchStep>,
    pub card: Vec<CardStep>,
    pub http: Vec<HttpRoute>,
    pub expect: Expectations,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: "unnamed".to_string(),
            duration_ms: 10_000,
            fail: Vec::new(),
            network_ready_after: 0,
            preferences: BTreeMap::new(),
            touch: Vec::new(),
            card: Vec::new(),
            http: Vec::new(),
            expect: Expectations::default(),
        }
    }
}

/// State of the kiosk at the end of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub active_screen: Option<String>,
    pub phase: &'static str,
    pub failure: Option<String>,
    pub reports_posted: usize,
    pub frames: usize,
    pub texts: Vec<String>,
    pub restart_requested: bool,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid scenario: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML")
    }

    /// The bundled help-request session
    pub fn demo() -> Result<Self> {
        Self::parse(BUILTIN_DEMO)
    }

    /// Simulated platform carrying this scenario's script
    pub fn build_platform(&self, config: &KioskConfig, echo: bool) -> Result<SimPlatform> {
        let mut touch = ScriptedTouch::new().with_debounce(TOUCH_DEBOUNCE_MS);
        for step in &self.touch {
            touch.press(step.at_ms, step.at_ms + step.hold_ms, step.x, step.y);
        }

        let mut reader = ScriptedCardReader::new();
        for step in &self.card {
            let Some(uid) = parse_uid(&step.uid) else {
                bail!("card at {} ms: invalid UID '{}'", step.at_ms, step.uid);
            };
            reader.tap(step.at_ms, step.at_ms + step.hold_ms, &uid);
        }

        let mut network = CannedTransport::new();
        for route in &self.http {
            let url = join_url(&config.api.base_url, &route.path);
            let error = route.error.as_deref().map(|e| match e {
                "timeout" => TransportError::Timeout {
                    url: url.clone(),
                    timeout_ms: config.api.submit_timeout_ms,
                },
                other => TransportError::Other(other.to_string()),
            });
            match (route.method.to_ascii_uppercase().as_str(), error) {
                ("GET", None) => network.respond_get(&url, route.status, &route.body),
                ("GET", Some(e)) => network.fail_get(&url, e),
                ("POST", None) => network.respond_post(&url, route.status, &route.body),
                ("POST", Some(e)) => network.fail_post(&url, e),
                (other, _) => bail!("unsupported HTTP method '{}' for {}", other, route.path),
            }
        }

        let mut platform = SimPlatform::new()
            .with_display(TerminalDisplay::new().with_echo(echo))
            .with_touch(touch)
            .with_card_reader(reader)
            .with_network(network)
            .network_ready_after(self.network_ready_after);
        for (key, value) in &self.preferences {
            platform = platform.with_preference(key, value);
        }
        for point in &self.fail {
            platform = platform.failing(*point);
        }
        Ok(platform)
    }

    /// Run the whole scenario on virtual time
    pub fn run(&self, config: KioskConfig, echo: bool) -> Result<RunSummary> {
        let tick_ms = config.timing.tick_interval_ms;
        let platform = self.build_platform(&config, echo)?;
        let display = platform.display_log();
        let requests = platform.request_log();
        let mut kiosk = Kiosk::new(config, Box::new(platform));

        let mut now = 0;
        let mut ticks = 0;
        while now <= self.duration_ms {
            kiosk.tick(now);
            now += tick_ms;
            ticks += 1;
        }
        Ok(summarize(&kiosk, ticks, &display, &requests))
    }

    /// Human-readable list of unmet expectations
    pub fn verify(&self, summary: &RunSummary) -> Vec<String> {
        let mut problems = Vec::new();
        let expect = &self.expect;

        if let Some(screen) = &expect.screen {
            if summary.active_screen.as_deref() != Some(screen.as_str()) {
                problems.push(format!(
                    "expected screen '{}', got {:?}",
                    screen, summary.active_screen
                ));
            }
        }
        if let Some(reports) = expect.reports {
            if summary.reports_posted != reports {
                problems.push(format!(
                    "expected {} report(s), {} posted",
                    reports, summary.reports_posted
                ));
            }
        }
        for text in &expect.texts {
            if !summary.texts.iter().any(|t| t.contains(text.as_str())) {
                problems.push(format!("text '{}' never drawn", text));
            }
        }
        if let Some(prefix) = &expect.failure {
            match &summary.failure {
                Some(f) if f.starts_with(prefix.as_str()) => {}
                other => problems.push(format!("expected failure '{}...', got {:?}", prefix, other)),
            }
        }
        problems
    }
}

/// Snapshot a kiosk plus its simulated collaborators
pub fn summarize(kiosk: &Kiosk, ticks: u64, display: &DisplayLog, requests: &RequestLog) -> RunSummary {
    let ctx = kiosk.context();
    RunSummary {
        ticks,
        active_screen: kiosk.active_screen().map(str::to_string),
        phase: ctx.init.phase_name(),
        failure: ctx.init.failure.clone(),
        reports_posted: requests
            .posts()
            .iter()
            .filter(|r| r.url == ctx.backend.endpoints().reports)
            .count(),
        frames: display.frame_count(),
        texts: display.texts(),
        restart_requested: ctx.restart_requested(),
    }
}
