use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::Value;
use tracing::{info, instrument};

use crate::models::{SearchRequest, SearchResponse};

use super::{error::ApiError, AppState};

pub async fn health() -> &'static str {
    "OK"
}

#[instrument(skip(state, payload))]
pub async fn search_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(body) = payload?;
    let request = parse_search_request(&body)?;

    info!("Searching for {:?}", request.product_name());
    let outcome = state.pipeline.run(request).await?;

    Ok(Json(SearchResponse {
        success: true,
        results: outcome.results.into_inner(),
    }))
}

/// Pull `title` and `description` out of a JSON body. Missing keys, falsy
/// values, and non-string values are all client errors.
pub fn parse_search_request(body: &Value) -> Result<SearchRequest, ApiError> {
    let (title, description) = match (body.get("title"), body.get("description")) {
        (Some(t), Some(d)) if body.is_object() => (t, d),
        _ => {
            return Err(ApiError::BadRequest(
                "Missing required fields: title and description".to_string(),
            ))
        }
    };

    if is_falsy(title) || is_falsy(description) {
        return Err(ApiError::BadRequest(
            "Title and description cannot be empty".to_string(),
        ));
    }

    match (title.as_str(), description.as_str()) {
        (Some(t), Some(d)) => {
            SearchRequest::new(t, d).map_err(|e| ApiError::BadRequest(e.to_string()))
        }
        _ => Err(ApiError::BadRequest(
            "Title and description must be strings".to_string(),
        )),
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(err: ApiError) -> String {
        match err {
            ApiError::BadRequest(m) => m,
            other => panic!("expected bad request, got {:?}", other),
        }
    }

    #[test]
    fn accepts_complete_body() {
        let request =
            parse_search_request(&json!({"title": "Pot Scrubber", "description": "steel"}))
                .unwrap();
        assert_eq!(request.product_name(), "Pot Scrubber");
        assert_eq!(request.description(), "steel");
    }

    #[test]
    fn missing_fields() {
        for body in [
            json!({"title": "Pot Scrubber"}),
            json!({"description": "steel"}),
            json!({}),
            json!(["title", "description"]),
        ] {
            assert_eq!(
                message(parse_search_request(&body).unwrap_err()),
                "Missing required fields: title and description"
            );
        }
    }

    #[test]
    fn falsy_fields() {
        for body in [
            json!({"title": "", "description": "steel"}),
            json!({"title": "Pot Scrubber", "description": null}),
            json!({"title": false, "description": "steel"}),
            json!({"title": "Pot Scrubber", "description": 0}),
        ] {
            assert_eq!(
                message(parse_search_request(&body).unwrap_err()),
                "Title and description cannot be empty"
            );
        }
    }

    #[test]
    fn non_string_fields() {
        let err = parse_search_request(&json!({"title": 42, "description": "steel"})).unwrap_err();
        assert_eq!(message(err), "Title and description must be strings");
    }
}
