//! Optimization request payload.
//!
//! Wire names are camelCase to match the form client. Unknown fields
//! are ignored; absent fields default to empty and fail the length
//! checks with the same message as a too-short value.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Bounds for the two long text fields (job description, resume).
pub const TEXT_MIN: usize = 50;
pub const TEXT_MAX: usize = 20_000;

/// Bounds for the two role fields.
pub const ROLE_MIN: usize = 2;
pub const ROLE_MAX: usize = 200;

/// Client-submitted optimization request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptimizeRequest {
    pub job_description: String,
    pub current_role: String,
    pub target_role: String,
    pub resume_text: String,

    /// Honeypot. The form hides this input; humans leave it empty.
    pub website: String,

    /// Client-reported form-open timestamp, milliseconds since epoch.
    /// Telemetry signal only; no hard threshold is enforced.
    pub form_started_at: Option<i64>,
}

impl OptimizeRequest {
    /// Check length bounds on the four text fields, collecting every
    /// violation keyed by wire field name.
    pub fn validate(&self) -> Result<(), BTreeMap<String, String>> {
        let mut errors = BTreeMap::new();

        check_length(
            &mut errors,
            "jobDescription",
            &self.job_description,
            TEXT_MIN,
            TEXT_MAX,
            "Please provide a longer job description.",
            "Job description is too long.",
        );
        check_length(
            &mut errors,
            "currentRole",
            &self.current_role,
            ROLE_MIN,
            ROLE_MAX,
            "Current role is required.",
            "Current role is too long.",
        );
        check_length(
            &mut errors,
            "targetRole",
            &self.target_role,
            ROLE_MIN,
            ROLE_MAX,
            "Target role is required.",
            "Target role is too long.",
        );
        check_length(
            &mut errors,
            "resumeText",
            &self.resume_text,
            TEXT_MIN,
            TEXT_MAX,
            "Please paste your resume text.",
            "Resume text is too long.",
        );

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Milliseconds between form open and submission, when reported.
    /// Clamped at zero; client clocks are not trusted to be sane.
    pub fn time_to_submit_ms(&self, now_ms: i64) -> Option<i64> {
        self.form_started_at
            .map(|started| now_ms.saturating_sub(started).max(0))
    }
}

fn check_length(
    errors: &mut BTreeMap<String, String>,
    field: &str,
    value: &str,
    min: usize,
    max: usize,
    too_short: &str,
    too_long: &str,
) {
    let len = value.chars().count();
    if len < min {
        errors.insert(field.to_string(), too_short.to_string());
    } else if len > max {
        errors.insert(field.to_string(), too_long.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_payload() -> OptimizeRequest {
        OptimizeRequest {
            job_description: "j".repeat(60),
            current_role: "Backend Engineer".to_string(),
            target_role: "Staff Engineer".to_string(),
            resume_text: "r".repeat(60),
            website: String::new(),
            form_started_at: None,
        }
    }

    #[test]
    fn test_valid_payload_passes() {
        assert!(valid_payload().validate().is_ok());
    }

    #[test]
    fn test_short_fields_reported_by_wire_name() {
        let mut payload = valid_payload();
        payload.job_description = "too short".to_string();
        payload.current_role = "x".to_string();

        let errors = payload.validate().unwrap_err();
        assert_eq!(
            errors["jobDescription"],
            "Please provide a longer job description."
        );
        assert_eq!(errors["currentRole"], "Current role is required.");
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_long_fields_rejected() {
        let mut payload = valid_payload();
        payload.resume_text = "r".repeat(TEXT_MAX + 1);
        payload.target_role = "t".repeat(ROLE_MAX + 1);

        let errors = payload.validate().unwrap_err();
        assert_eq!(errors["resumeText"], "Resume text is too long.");
        assert_eq!(errors["targetRole"], "Target role is too long.");
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let mut payload = valid_payload();
        payload.job_description = "j".repeat(TEXT_MIN);
        payload.resume_text = "r".repeat(TEXT_MAX);
        payload.current_role = "c".repeat(ROLE_MIN);
        payload.target_role = "t".repeat(ROLE_MAX);

        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_camel_case_and_unknown_fields() {
        let payload: OptimizeRequest = serde_json::from_value(json!({
            "jobDescription": "j".repeat(60),
            "currentRole": "Backend Engineer",
            "targetRole": "Staff Engineer",
            "resumeText": "r".repeat(60),
            "website": "",
            "formStartedAt": 1_700_000_000_000_i64,
            "someUnknownField": "ignored",
        }))
        .unwrap();

        assert!(payload.validate().is_ok());
        assert_eq!(payload.form_started_at, Some(1_700_000_000_000));
    }

    #[test]
    fn test_missing_fields_default_and_fail_validation() {
        let payload: OptimizeRequest = serde_json::from_value(json!({})).unwrap();

        assert_eq!(payload.website, "");
        assert_eq!(payload.form_started_at, None);

        let errors = payload.validate().unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_time_to_submit() {
        let mut payload = valid_payload();
        assert_eq!(payload.time_to_submit_ms(5_000), None);

        payload.form_started_at = Some(4_000);
        assert_eq!(payload.time_to_submit_ms(5_000), Some(1_000));
        // Clock skew must not underflow.
        assert_eq!(payload.time_to_submit_ms(3_000), Some(0));
    }
}
