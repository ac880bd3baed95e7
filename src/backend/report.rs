//! Help-request payload posted to the backend

use serde::Serialize;

use crate::card::ResidentProfile;
use crate::config::{ReportConfig, SiteConfig};

/// JSON body of `POST /api/v1/reports/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSubmission {
    pub full_name: String,
    pub phone: String,
    pub age: u32,
    pub address: String,
    pub city: String,
    pub problem: String,
    pub contact_ok: bool,
    pub report_type_id: u32,
    pub report_details: String,
}

impl ReportSubmission {
    /// Build the report for `profile` asking for help with `issue`
    pub fn new(profile: &ResidentProfile, issue: &str, site: &SiteConfig, report: &ReportConfig) -> Self {
        let report_details = if issue.is_empty() {
            report.details.clone()
        } else {
            format!("{}: {}", report.details, issue)
        };

        Self {
            full_name: profile.name.clone(),
            phone: profile.phone.clone(),
            age: report.age,
            address: site.building_address.clone(),
            city: site.city.clone(),
            problem: report.problem_tag.clone(),
            contact_ok: true,
            report_type_id: report.report_type_id,
            report_details,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_fields() {
        let profile = ResidentProfile {
            name: "Jan Kowalski".to_string(),
            phone: "600000001".to_string(),
            apartment: Some(12),
        };
        let report = ReportSubmission::new(&profile, "Bank", &SiteConfig::default(), &ReportConfig::default());

        assert_eq!(report.full_name, "Jan Kowalski");
        assert_eq!(report.city, "Krakow");
        assert_eq!(report.problem, "[GenLink Kiosk]");
        assert!(report.report_details.ends_with(": Bank"));

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["phone"], "600000001");
        assert_eq!(json["contact_ok"], true);
        assert_eq!(json["report_type_id"], 1);
    }

    #[test]
    fn test_empty_issue_keeps_plain_details() {
        let report = ReportSubmission::new(
            &ResidentProfile::anonymous(),
            "",
            &SiteConfig::default(),
            &ReportConfig::default(),
        );
        assert_eq!(report.report_details, ReportConfig::default().details);
    }
}
