use axum::http::StatusCode;

use hashshare::ModelError;

pub fn model_status(e: ModelError) -> (StatusCode, String) {
    let status = match e {
        ModelError::MissingInput(_) => StatusCode::SERVICE_UNAVAILABLE,
        ModelError::InvalidParameter { .. } | ModelError::InvalidShare(_) => {
            StatusCode::BAD_REQUEST
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

pub fn bad_request(msg: impl Into<String>) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, msg.into())
}
