use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use ecomatch_core::{Anchor, Candidate, Coordinate, RadiusPolicy, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct MatchRequest {
    anchor: AnchorInput,
    #[serde(default)]
    candidates: Vec<CandidateInput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnchorInput {
    lat: f64,
    lon: f64,
    /// Kept loose so a non-numeric radius reaches the radius policy instead
    /// of failing deserialization.
    #[serde(default)]
    radius_km: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CandidateInput {
    id: Value,
    lat: f64,
    lon: f64,
    #[serde(flatten)]
    payload: Map<String, Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct MatchItem {
    pub id: Value,
    pub distance_km: f64,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AnchorEcho {
    pub lat: f64,
    pub lon: f64,
    pub radius_km: f64,
}

#[derive(Debug, Serialize)]
pub(super) struct MatchesData {
    pub anchor: AnchorEcho,
    pub matches: Vec<MatchItem>,
}

/// Response keys written by the server; a candidate payload may not carry them.
const RESERVED_PAYLOAD_KEYS: [&str; 1] = ["distanceKm"];

#[derive(Debug)]
enum RequestProblem {
    Invalid(ValidationError),
    TooManyCandidates { count: usize, max: usize },
    ReservedField { field: String },
}

impl From<ValidationError> for RequestProblem {
    fn from(e: ValidationError) -> Self {
        Self::Invalid(e)
    }
}

impl RequestProblem {
    fn into_api_error(self, request_id: String) -> ApiError {
        match self {
            RequestProblem::Invalid(e) => ApiError::from_validation(request_id, &e),
            RequestProblem::TooManyCandidates { count, max } => ApiError::validation(
                request_id,
                "candidates",
                format!("{count} candidates exceeds the limit of {max}"),
            ),
            RequestProblem::ReservedField { field } => {
                let message = format!("{field} is computed by the server and cannot be supplied");
                ApiError::validation(request_id, field, message)
            }
        }
    }
}

/// Accepts JSON numbers and numeric strings; anything else counts as absent.
fn radius_from_value(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn run_matches(
    request: MatchRequest,
    policy: RadiusPolicy,
    max_candidates: usize,
) -> Result<MatchesData, RequestProblem> {
    if request.candidates.len() > max_candidates {
        return Err(RequestProblem::TooManyCandidates {
            count: request.candidates.len(),
            max: max_candidates,
        });
    }

    let at = |prefix: &str| {
        let prefix = prefix.to_string();
        move |e: ecomatch_core::GeoError| {
            ValidationError::new(format!("{prefix}.{}", e.component()), e)
        }
    };

    let center = Coordinate::new(request.anchor.lat, request.anchor.lon).map_err(at("anchor"))?;
    let raw_radius = radius_from_value(request.anchor.radius_km.as_ref());
    let anchor = Anchor::resolve(center, raw_radius, policy).map_err(at("anchor"))?;

    let candidates = request
        .candidates
        .into_iter()
        .enumerate()
        .map(|(i, c)| {
            if let Some(key) = RESERVED_PAYLOAD_KEYS
                .iter()
                .find(|key| c.payload.contains_key(**key))
            {
                return Err(RequestProblem::ReservedField {
                    field: format!("candidates[{i}].{key}"),
                });
            }
            let coordinate =
                Coordinate::new(c.lat, c.lon).map_err(at(&format!("candidates[{i}]")))?;
            Ok(Candidate::new((c.id, c.payload), coordinate))
        })
        .collect::<Result<Vec<_>, RequestProblem>>()?;

    let matches = ecomatch_core::find_matches(&anchor, candidates)
        .into_iter()
        .map(|m| {
            let (id, payload) = m.identity;
            MatchItem {
                id,
                distance_km: m.distance_km,
                payload,
            }
        })
        .collect();

    Ok(MatchesData {
        anchor: AnchorEcho {
            lat: anchor.center().latitude(),
            lon: anchor.center().longitude(),
            radius_km: anchor.radius_km(),
        },
        matches,
    })
}

pub(super) async fn find_matches(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<MatchRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<MatchesData>>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        tracing::debug!(error = %e, "rejected match request body");
        ApiError::new(req_id.0.clone(), "bad_request", e.body_text())
    })?;

    let candidate_count = request.candidates.len();
    let data = run_matches(request, state.radius_policy, state.max_candidates).map_err(|p| {
        tracing::debug!(problem = ?p, "match request failed validation");
        p.into_api_error(req_id.0.clone())
    })?;

    tracing::debug!(
        candidates = candidate_count,
        matched = data.matches.len(),
        radius_km = data.anchor.radius_km,
        "proximity match"
    );

    Ok(Json(ApiResponse::new(data, req_id.0)))
}
