//! Error responses.
//!
//! Hard errors are `{error, message}` with a matching status. Soft errors are
//! `200 {error_messages}`: restock and sale failures, and duplicates on
//! create paths.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use stockroom_core::DomainError;
use stockroom_infra::InfraError;

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn soft_error(message: impl Into<String>) -> Response {
    (
        StatusCode::OK,
        axum::Json(json!({ "error_messages": message.into() })),
    )
        .into_response()
}

pub fn store_not_found() -> Response {
    json_error(StatusCode::NOT_FOUND, "store_not_found", "User has no store!")
}

/// Status mapping for regular CRUD routes.
pub fn infra_error_to_response(err: InfraError) -> Response {
    match err {
        InfraError::Domain(e) => domain_error_to_response(e),
        InfraError::Integrity(msg) => json_error(StatusCode::CONFLICT, "integrity_error", msg),
        InfraError::Backend(msg) => {
            tracing::error!(error = %msg, "backend failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "backend_error", "internal error")
        }
    }
}

/// Create paths: duplicates answer softly, everything else as usual.
pub fn create_error_to_response(err: InfraError) -> Response {
    match err {
        InfraError::Domain(DomainError::Conflict(msg)) => soft_error(msg),
        other => infra_error_to_response(other),
    }
}

/// Restock and sale: any soft domain failure becomes `200 {error_messages}`.
pub fn batch_error_to_response(err: InfraError) -> Response {
    match err {
        InfraError::Domain(e) if e.is_soft() => soft_error(e.to_string()),
        other => infra_error_to_response(other),
    }
}

fn domain_error_to_response(err: DomainError) -> Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        DomainError::Computation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "computation_error", msg)
        }
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::Unauthorized => json_error(StatusCode::UNAUTHORIZED, "unauthorized", "unauthorized"),
        e @ (DomainError::CapacityExceeded { .. } | DomainError::InsufficientStock { .. }) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "stock_error", e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_core::MaterialId;

    #[test]
    fn crud_status_mapping() {
        let cases = [
            (DomainError::validation("bad").into(), StatusCode::BAD_REQUEST),
            (DomainError::not_found("gone").into(), StatusCode::NOT_FOUND),
            (DomainError::computation("div").into(), StatusCode::UNPROCESSABLE_ENTITY),
            (DomainError::Unauthorized.into(), StatusCode::UNAUTHORIZED),
            (InfraError::Integrity("dup".into()), StatusCode::CONFLICT),
            (InfraError::Backend("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(infra_error_to_response(err).status(), status);
        }
    }

    #[test]
    fn duplicates_on_create_are_soft() {
        let res = create_error_to_response(DomainError::conflict("Material existed!").into());
        assert_eq!(res.status(), StatusCode::OK);

        let res = create_error_to_response(DomainError::validation("bad").into());
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn batch_failures_are_soft_except_computation() {
        let exceeded = DomainError::CapacityExceeded {
            material_id: MaterialId::new(1),
            requested: 10,
            max_capacity: 5,
        };
        assert_eq!(batch_error_to_response(exceeded.into()).status(), StatusCode::OK);
        assert_eq!(
            batch_error_to_response(DomainError::not_found("Product doesn't exists!").into()).status(),
            StatusCode::OK
        );
        assert_eq!(
            batch_error_to_response(DomainError::computation("x").into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
