use lambda_http::http::{Method, StatusCode};
use lambda_http::{tracing, Error, IntoResponse, Request};
use serde::Serialize;
use serde_json::json;
use shared::configuration::{ApiConfig, PublicConfig};
use shared::utils::{empty_response, json_response, raw_json_response};

#[derive(Serialize)]
struct ConfigResponse {
    success: bool,
    message: &'static str,
    config: PublicConfig,
}

#[tracing::instrument(skip(config, event), fields(method = %event.method()))]
pub(crate) async fn function_handler(
    config: &ApiConfig,
    event: Request,
) -> Result<impl IntoResponse, Error> {
    if event.method() == Method::OPTIONS {
        return empty_response(&StatusCode::OK);
    }

    config.log_presence();

    let response = ConfigResponse {
        success: true,
        message: "NocoDB configuration",
        config: config.public_view(),
    };

    match serde_json::to_string(&response) {
        Ok(body) => raw_json_response(&StatusCode::OK, body),
        Err(e) => {
            tracing::error!("Error in nocodb-config: {:?}", e);
            json_response(
                &StatusCode::INTERNAL_SERVER_ERROR,
                &json!({
                    "success": false,
                    "message": "Internal server error",
                    "error": e.to_string(),
                }),
            )
        }
    }
}
