use crate::conflict::ConflictDetail;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::borrow::Cow;

pub enum AppError {
    /// Missing or invalid bearer token.
    Unauthorized,
    /// Role or eligibility mismatch.
    Forbidden(Cow<'static, str>),
    NotFound(Cow<'static, str>),
    /// Double-booking. Carries whatever the availability check already
    /// computed so the caller can see what it collided with.
    Conflict {
        message: Cow<'static, str>,
        conflicts: Vec<ConflictDetail>,
    },
    CapacityExceeded,
    /// Operation not valid for the entity's current lifecycle state.
    InvalidState(Cow<'static, str>),
    /// Malformed input, rejected before any persistence write.
    Validation(Cow<'static, str>),
    InternalServerError(anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct AppErrorResponse {
            status: u16,
            message: Cow<'static, str>,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            conflicts: Vec<ConflictDetail>,
        }

        fn respond(
            code: StatusCode,
            message: Cow<'static, str>,
            conflicts: Vec<ConflictDetail>,
        ) -> Response {
            (
                code,
                Json(AppErrorResponse {
                    status: code.as_u16(),
                    message,
                    conflicts,
                }),
            )
                .into_response()
        }

        match self {
            AppError::Unauthorized => respond(
                StatusCode::UNAUTHORIZED,
                "missing or invalid credentials".into(),
                vec![],
            ),
            AppError::Forbidden(msg) => respond(StatusCode::FORBIDDEN, msg, vec![]),
            AppError::NotFound(what) => respond(
                StatusCode::NOT_FOUND,
                format!("{what} not found").into(),
                vec![],
            ),
            AppError::Conflict { message, conflicts } => {
                respond(StatusCode::CONFLICT, message, conflicts)
            }
            AppError::CapacityExceeded => respond(
                StatusCode::CONFLICT,
                "event is at full capacity".into(),
                vec![],
            ),
            AppError::InvalidState(msg) => {
                respond(StatusCode::UNPROCESSABLE_ENTITY, msg, vec![])
            }
            AppError::Validation(msg) => respond(StatusCode::BAD_REQUEST, msg, vec![]),
            AppError::InternalServerError(err) => {
                tracing::error!(error = ?err, "internal server error");
                respond(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".into(),
                    vec![],
                )
            }
        }
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(e: E) -> AppError {
        AppError::InternalServerError(e.into())
    }
}

impl AppError {
    pub fn not_found(what: impl Into<Cow<'static, str>>) -> AppError {
        AppError::NotFound(what.into())
    }

    pub fn forbidden(msg: impl Into<Cow<'static, str>>) -> AppError {
        AppError::Forbidden(msg.into())
    }

    pub fn invalid_state(msg: impl Into<Cow<'static, str>>) -> AppError {
        AppError::InvalidState(msg.into())
    }

    pub fn validation(msg: impl Into<Cow<'static, str>>) -> AppError {
        AppError::Validation(msg.into())
    }

    pub fn conflict(
        msg: impl Into<Cow<'static, str>>,
        conflicts: Vec<ConflictDetail>,
    ) -> AppError {
        AppError::Conflict {
            message: msg.into(),
            conflicts,
        }
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Unauthorized => write!(f, "Unauthorized"),
            AppError::Forbidden(m) => write!(f, "Forbidden({m})"),
            AppError::NotFound(w) => write!(f, "NotFound({w})"),
            AppError::Conflict { message, conflicts } => {
                write!(f, "Conflict({message}, {} conflicting)", conflicts.len())
            }
            AppError::CapacityExceeded => write!(f, "CapacityExceeded"),
            AppError::InvalidState(m) => write!(f, "InvalidState({m})"),
            AppError::Validation(m) => write!(f, "Validation({m})"),
            AppError::InternalServerError(e) => write!(f, "InternalServerError({e})"),
        }
    }
}
