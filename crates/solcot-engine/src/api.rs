//! ---
//! ems_section: "02-quote-engine"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Solar sizing and cost-estimation routines."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use crate::{catalog::CatalogSnapshot, input::QuoteInput};

#[cfg(feature = "rest-api")]
pub use rest::router;

#[cfg(feature = "rest-api")]
mod rest {
    use axum::{http::StatusCode, routing::post, Json, Router};
    use tracing::warn;

    use crate::{compute_quote, errors::CalcEngineError, QuoteResult};

    use super::QuoteRequest;

    pub fn router() -> Router {
        Router::new().route("/api/quote", post(quote))
    }

    async fn quote(Json(payload): Json<QuoteRequest>) -> Result<Json<QuoteResult>, StatusCode> {
        payload.catalog.validate().map_err(map_err)?;
        compute_quote(&payload.catalog, &payload.input)
            .map(Json)
            .map_err(map_err)
    }

    fn map_err(err: CalcEngineError) -> StatusCode {
        warn!(kind = err.kind(), error = %err, "quote request rejected");
        match err {
            CalcEngineError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CalcEngineError::Configuration(_) => StatusCode::BAD_REQUEST,
            CalcEngineError::NoMatch(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct QuoteRequest {
    pub catalog: CatalogSnapshot,
    pub input: QuoteInput,
}
