use lambda_http::http::StatusCode;
use serde_json::{json, Value};
use thiserror::Error;

pub const AVAILABLE_ACTIONS: [&str; 4] = ["get_guru_list", "login", "save_data", "query"];

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Method not allowed. Use POST.")]
    MethodNotAllowed,
    #[error("{0}")]
    BadRequest(&'static str),
    #[error("Action tidak dikenali")]
    UnknownAction,
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("Database error: {status}")]
    Database { status: u16 },
    #[error("Save failed: {status} - {body}")]
    SaveFailed { status: u16, body: String },
    #[error("Query failed: {status} - {body}")]
    QueryFailed { status: u16, body: String },
    #[error("NocoDB configuration missing in environment variables")]
    MissingConfiguration,
    #[error("Invalid request body: {0}")]
    InvalidBody(#[source] serde_json::Error),
    #[error("Invalid request body: null")]
    NullBody,
    #[error("Invalid response from database: {0}")]
    InvalidUpstreamBody(#[source] serde_json::Error),
    #[error("Database request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::BadRequest(_) | ProxyError::UnknownAction => StatusCode::BAD_REQUEST,
            ProxyError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ProxyError::Database { .. }
            | ProxyError::SaveFailed { .. }
            | ProxyError::QueryFailed { .. }
            | ProxyError::MissingConfiguration
            | ProxyError::InvalidBody(_)
            | ProxyError::NullBody
            | ProxyError::InvalidUpstreamBody(_)
            | ProxyError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// JSON body returned to the caller for this error.
    pub fn to_body(&self) -> Value {
        match self {
            ProxyError::UnknownAction => json!({
                "success": false,
                "message": self.to_string(),
                "availableActions": AVAILABLE_ACTIONS,
            }),
            _ if self.is_server_error() => json!({
                "success": false,
                "message": "Server error",
                "error": self.to_string(),
            }),
            _ => json!({
                "success": false,
                "message": self.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ProxyError;
    use serde_json::json;

    #[test]
    fn unknown_action_should_list_every_action() {
        let error = ProxyError::UnknownAction;

        assert_eq!(error.status_code(), 400);
        assert_eq!(
            error.to_body(),
            json!({
                "success": false,
                "message": "Action tidak dikenali",
                "availableActions": ["get_guru_list", "login", "save_data", "query"]
            })
        );
    }

    #[test]
    fn upstream_failure_should_embed_status_and_text() {
        let error = ProxyError::SaveFailed {
            status: 422,
            body: "{\"msg\":\"bad column\"}".into(),
        };

        assert_eq!(error.status_code(), 500);
        assert_eq!(
            error.to_body(),
            json!({
                "success": false,
                "message": "Server error",
                "error": "Save failed: 422 - {\"msg\":\"bad column\"}"
            })
        );
    }

    #[test]
    fn auth_failure_should_not_carry_error_field() {
        let error = ProxyError::Unauthorized("Password salah");

        assert_eq!(error.status_code(), 401);
        assert_eq!(
            error.to_body(),
            json!({ "success": false, "message": "Password salah" })
        );
    }
}
