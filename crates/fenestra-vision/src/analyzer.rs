//! Window image analysis with total fallback.

use serde_json::Value;
use tracing::{debug, warn};

use fenestra_core::models::truncate_description;
use fenestra_core::{
    AnalysisResult, Covering, Daytime, Error, Location, Material, OpenState, Panes, Result,
    WindowAttributes, WindowKind,
};

use crate::backend::{OpenAiVisionBackend, VisionBackend};
use crate::extract::extract_embedded_json;

/// Instruction sent alongside every image. Restricts each structured field to
/// its closed vocabulary so replies coerce cleanly.
pub const ANALYSIS_PROMPT: &str = "Analyze this window image. Return JSON with: description \
(short text) and structured_data with fields: daytime (day/night/unknown), location \
(interior/exterior/unknown), type (fixed/sliding/casement/awning/hung/pivot/unknown), material \
(wood/aluminum/pvc/unknown), panes (1/2/3/unknown), covering (curtains/blinds/none/unknown), \
openState (open/closed/ajar/unknown)";

/// Analyzer wrapping an optional vision backend.
///
/// With no backend configured every call short-circuits to the fallback
/// result without touching the network. With a backend, any error in the
/// request or in response parsing also yields the fallback; `analyze` cannot
/// fail and cannot panic.
pub struct WindowAnalyzer {
    backend: Option<Box<dyn VisionBackend>>,
}

impl WindowAnalyzer {
    /// Create an analyzer over the given backend.
    pub fn new(backend: impl VisionBackend + 'static) -> Self {
        Self {
            backend: Some(Box::new(backend)),
        }
    }

    /// Create an analyzer that always returns the fallback result.
    pub fn disabled() -> Self {
        Self { backend: None }
    }

    /// Build from environment configuration.
    ///
    /// Without an API key the analyzer runs disabled; backend construction
    /// failure is also downgraded to disabled since analysis must never block
    /// ingestion.
    pub fn from_env() -> Self {
        match OpenAiVisionBackend::from_env() {
            Some(Ok(backend)) => Self::new(backend),
            Some(Err(e)) => {
                warn!(
                    subsystem = "vision",
                    component = "analyzer",
                    error = %e,
                    "Vision backend construction failed, analysis disabled"
                );
                Self::disabled()
            }
            None => {
                warn!(
                    subsystem = "vision",
                    component = "analyzer",
                    "No vision API key configured, analysis disabled"
                );
                Self::disabled()
            }
        }
    }

    /// Whether a backend is configured.
    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Analyze an image, returning the fallback result on any failure.
    pub async fn analyze(&self, image_data: &[u8], mime_type: &str) -> AnalysisResult {
        let Some(backend) = self.backend.as_deref() else {
            debug!(
                subsystem = "vision",
                component = "analyzer",
                op = "analyze",
                "Analysis disabled, using fallback"
            );
            return AnalysisResult::fallback();
        };

        let reply = match backend
            .request_analysis(image_data, mime_type, ANALYSIS_PROMPT)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!(
                    subsystem = "vision",
                    component = "analyzer",
                    op = "analyze",
                    model = backend.model_name(),
                    error = %e,
                    "Vision request failed, using fallback"
                );
                return AnalysisResult::fallback();
            }
        };

        match parse_analysis_reply(&reply) {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    subsystem = "vision",
                    component = "analyzer",
                    op = "analyze",
                    model = backend.model_name(),
                    error = %e,
                    "Unparsable vision reply, using fallback"
                );
                AnalysisResult::fallback()
            }
        }
    }
}

/// Decode a raw model reply into an analysis result.
///
/// Extraction and decoding failures are explicit errors the caller maps to
/// the fallback. Out-of-domain attribute values are coerced to `unknown`
/// rather than rejected.
pub fn parse_analysis_reply(reply: &str) -> Result<AnalysisResult> {
    let json = extract_embedded_json(reply)
        .ok_or_else(|| Error::Analysis("No JSON object in model reply".to_string()))?;
    let value: Value = serde_json::from_str(json)
        .map_err(|e| Error::Analysis(format!("Embedded JSON failed to decode: {}", e)))?;

    let description = value
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let structured = value.get("structured_data");
    let attributes = WindowAttributes {
        daytime: Daytime::parse(&field_token(structured, "daytime")),
        location: Location::parse(&field_token(structured, "location")),
        kind: WindowKind::parse(&field_token(structured, "type")),
        material: Material::parse(&field_token(structured, "material")),
        panes: Panes::parse(&field_token(structured, "panes")),
        covering: Covering::parse(&field_token(structured, "covering")),
        open_state: OpenState::parse(&field_token(structured, "openState")),
    };

    Ok(AnalysisResult {
        description: truncate_description(description),
        attributes,
    })
}

/// Pull one attribute token out of the structured group. Models sometimes
/// answer `panes` as a bare number, so numbers stringify.
fn field_token(structured: Option<&Value>, field: &str) -> String {
    match structured.and_then(|s| s.get(field)) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}
