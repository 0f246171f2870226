use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::config::GeminiConfig;
use crate::reports::normalize::normalize_extracted;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const ANALYSIS_PROMPT: &str = r#"You are a health advisor analyzing a patient's lab report.

Tasks:
1. Extract EVERY health parameter you find, with its numeric value, unit and reference range
2. Identify parameters outside their reference range
3. Assess overall health status and score it from 0 to 100
4. Provide dietary recommendations: suggestions, foods to include, foods to avoid
5. Suggest lifestyle modifications
6. Indicate if doctor consultation is recommended

Respond in STRICT JSON format matching this schema:
{
    "extracted_data": {
        "parameter_name": {"value": 13.2, "unit": "g/dL", "reference_range": "13-17"}
    },
    "analysis": {
        "summary": "brief overview",
        "health_score": 85,
        "abnormal_parameters": ["param1"],
        "dietary_suggestions": ["suggestion1"],
        "foods_to_include": ["food1"],
        "foods_to_avoid": ["food1"],
        "lifestyle_tips": ["tip1"],
        "doctor_consultation": false
    }
}

Do not include markdown formatting (like ```json), just the raw JSON string."#;

/// Why an analysis came back degraded instead of complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradeReason {
    /// The remote call itself failed (network, auth, quota).
    ServiceUnavailable,
    /// The service answered, but the payload did not satisfy the schema.
    MalformedResponse,
}

impl DegradeReason {
    pub fn summary(self) -> &'static str {
        match self {
            DegradeReason::ServiceUnavailable => {
                "Automated analysis was unavailable for this report. \
                 Please review the values with your doctor."
            }
            DegradeReason::MalformedResponse => {
                "Automated analysis returned an unreadable result for this report. \
                 Please review the values with your doctor."
            }
        }
    }
}

/// Closed-schema assessment stored on every report. Every field is required;
/// a response missing any of them routes to the fallback path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportAnalysis {
    pub summary: String,
    pub health_score: i64,
    pub abnormal_parameters: Vec<String>,
    pub dietary_suggestions: Vec<String>,
    pub foods_to_include: Vec<String>,
    pub foods_to_avoid: Vec<String>,
    pub lifestyle_tips: Vec<String>,
    pub doctor_consultation: bool,
}

impl ReportAnalysis {
    /// Well-formed degraded stand-in: score 0, empty guidance, and
    /// doctor_consultation forced true so a failed analysis errs toward
    /// caution rather than silence.
    pub fn fallback(reason: DegradeReason) -> Self {
        Self {
            summary: reason.summary().into(),
            health_score: 0,
            abnormal_parameters: Vec::new(),
            dietary_suggestions: Vec::new(),
            foods_to_include: Vec::new(),
            foods_to_avoid: Vec::new(),
            lifestyle_tips: Vec::new(),
            doctor_consultation: true,
        }
    }
}

/// Outcome of one analysis call. There is no error variant: every failure
/// mode collapses into `Degraded`, and call sites must match on the tag.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Complete {
        extracted_data: Map<String, Value>,
        analysis: ReportAnalysis,
    },
    Degraded {
        reason: DegradeReason,
        analysis: ReportAnalysis,
    },
}

impl AnalysisOutcome {
    pub fn degraded(reason: DegradeReason) -> Self {
        Self::Degraded {
            reason,
            analysis: ReportAnalysis::fallback(reason),
        }
    }

    /// Extracted map plus analysis, with degradation folded into content:
    /// a degraded outcome contributes an empty map and its fallback object.
    pub fn into_parts(self) -> (Map<String, Value>, ReportAnalysis) {
        match self {
            Self::Complete {
                extracted_data,
                analysis,
            } => (extracted_data, analysis),
            Self::Degraded { analysis, .. } => (Map::new(), analysis),
        }
    }
}

#[async_trait]
pub trait AnalysisClient: Send + Sync {
    /// Submit raw document bytes for extraction + assessment. Infallible by
    /// contract: upstream failures come back as a degraded outcome.
    async fn analyze_document(&self, pdf_bytes: &[u8]) -> AnalysisOutcome;
}

/// Interpret the model's response text against the expected schema.
///
/// Tolerates leading/trailing markdown fences the model may still emit
/// despite instructions. An `extracted_data` of the wrong shape never blocks
/// a structurally valid analysis; a broken or missing `analysis` object
/// degrades the whole result.
pub fn interpret_response(text: &str) -> AnalysisOutcome {
    let cleaned = strip_code_fences(text);

    let parsed: Value = match serde_json::from_str(cleaned) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "analysis response is not valid JSON");
            return AnalysisOutcome::degraded(DegradeReason::MalformedResponse);
        }
    };

    let Some(raw_analysis) = parsed.get("analysis") else {
        warn!("analysis response is missing the analysis object");
        return AnalysisOutcome::degraded(DegradeReason::MalformedResponse);
    };

    let mut analysis: ReportAnalysis = match serde_json::from_value(raw_analysis.clone()) {
        Ok(a) => a,
        Err(e) => {
            warn!(error = %e, "analysis object failed schema validation");
            return AnalysisOutcome::degraded(DegradeReason::MalformedResponse);
        }
    };
    analysis.health_score = analysis.health_score.clamp(0, 100);

    let extracted_data = normalize_extracted(parsed.get("extracted_data"));
    AnalysisOutcome::Complete {
        extracted_data,
        analysis,
    }
}

fn strip_code_fences(text: &str) -> &str {
    let mut s = text.trim();
    if let Some(rest) = s.strip_prefix("```json") {
        s = rest;
    } else if let Some(rest) = s.strip_prefix("```") {
        s = rest;
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

// --- Gemini wire types (only the fields we read) ---

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// One long-lived client per process, constructed from config at startup.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(cfg: &GeminiConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
        })
    }

    fn request_body(pdf_bytes: &[u8]) -> Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [
                    { "text": ANALYSIS_PROMPT },
                    { "inline_data": {
                        "mime_type": "application/pdf",
                        "data": BASE64.encode(pdf_bytes)
                    }}
                ]
            }],
            "generationConfig": {
                "temperature": 0.1,
                "responseMimeType": "application/json"
            }
        })
    }
}

#[async_trait]
impl AnalysisClient for GeminiClient {
    async fn analyze_document(&self, pdf_bytes: &[u8]) -> AnalysisOutcome {
        let url = format!(
            "{}/{}:generateContent?key={}",
            GEMINI_BASE_URL, self.model, self.api_key
        );
        let body = Self::request_body(pdf_bytes);

        // Single attempt. A failed call goes straight to the fallback.
        let response = match self.http.post(&url).json(&body).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "gemini request failed");
                return AnalysisOutcome::degraded(DegradeReason::ServiceUnavailable);
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "gemini returned an error status");
            return AnalysisOutcome::degraded(DegradeReason::ServiceUnavailable);
        }

        let envelope: GenerateContentResponse = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "gemini response envelope was unreadable");
                return AnalysisOutcome::degraded(DegradeReason::MalformedResponse);
            }
        };

        let text: String = envelope
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            warn!("gemini response contained no text parts");
            return AnalysisOutcome::degraded(DegradeReason::MalformedResponse);
        }

        debug!(chars = text.len(), "gemini responded");
        interpret_response(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_payload() -> Value {
        json!({
            "extracted_data": {
                "hemoglobin": {"value": 13.2, "unit": "g/dL", "reference_range": "13-17"}
            },
            "analysis": {
                "summary": "Overall healthy",
                "health_score": 85,
                "abnormal_parameters": [],
                "dietary_suggestions": ["more leafy greens"],
                "foods_to_include": ["spinach"],
                "foods_to_avoid": ["fried snacks"],
                "lifestyle_tips": ["sleep 8 hours"],
                "doctor_consultation": false
            }
        })
    }

    #[test]
    fn valid_response_is_complete() {
        let outcome = interpret_response(&valid_payload().to_string());
        match outcome {
            AnalysisOutcome::Complete {
                extracted_data,
                analysis,
            } => {
                assert!(extracted_data.contains_key("hemoglobin"));
                assert_eq!(analysis.health_score, 85);
                assert!(!analysis.doctor_consultation);
            }
            other => panic!("expected Complete, got {:?}", other),
        }
    }

    #[test]
    fn code_fences_are_tolerated() {
        let fenced = format!("```json\n{}\n```", valid_payload());
        assert!(matches!(
            interpret_response(&fenced),
            AnalysisOutcome::Complete { .. }
        ));
    }

    #[test]
    fn non_json_response_degrades_as_malformed() {
        let outcome = interpret_response("I am sorry, I cannot analyze this report.");
        assert_eq!(
            outcome,
            AnalysisOutcome::degraded(DegradeReason::MalformedResponse)
        );
    }

    #[test]
    fn missing_doctor_consultation_degrades_as_malformed() {
        let mut payload = valid_payload();
        payload["analysis"]
            .as_object_mut()
            .unwrap()
            .remove("doctor_consultation");
        let outcome = interpret_response(&payload.to_string());
        assert_eq!(
            outcome,
            AnalysisOutcome::degraded(DegradeReason::MalformedResponse)
        );
    }

    #[test]
    fn missing_analysis_key_degrades_as_malformed() {
        let outcome = interpret_response(r#"{"extracted_data": {}}"#);
        assert_eq!(
            outcome,
            AnalysisOutcome::degraded(DegradeReason::MalformedResponse)
        );
    }

    #[test]
    fn list_shaped_extracted_data_does_not_block_analysis() {
        let mut payload = valid_payload();
        payload["extracted_data"] = json!(["hemoglobin"]);
        match interpret_response(&payload.to_string()) {
            AnalysisOutcome::Complete { extracted_data, .. } => {
                assert!(extracted_data.is_empty());
            }
            other => panic!("expected Complete, got {:?}", other),
        }
    }

    #[test]
    fn health_score_is_clamped() {
        let mut payload = valid_payload();
        payload["analysis"]["health_score"] = json!(250);
        match interpret_response(&payload.to_string()) {
            AnalysisOutcome::Complete { analysis, .. } => {
                assert_eq!(analysis.health_score, 100);
            }
            other => panic!("expected Complete, got {:?}", other),
        }
    }

    #[test]
    fn fallback_fails_toward_caution() {
        let fb = ReportAnalysis::fallback(DegradeReason::ServiceUnavailable);
        assert_eq!(fb.health_score, 0);
        assert!(fb.doctor_consultation);
        assert!(fb.abnormal_parameters.is_empty());
        assert!(fb.dietary_suggestions.is_empty());
        assert!(fb.foods_to_include.is_empty());
        assert!(fb.foods_to_avoid.is_empty());
        assert!(fb.lifestyle_tips.is_empty());
    }

    #[test]
    fn unavailable_and_malformed_fallbacks_are_distinguishable() {
        let down = ReportAnalysis::fallback(DegradeReason::ServiceUnavailable);
        let garbage = ReportAnalysis::fallback(DegradeReason::MalformedResponse);
        assert_ne!(down.summary, garbage.summary);
    }
}
