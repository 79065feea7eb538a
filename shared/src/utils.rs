use lambda_http::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE,
};
use lambda_http::http::response::Builder;
use lambda_http::http::StatusCode;
use lambda_http::{Error, Response};
use serde::Serialize;

// Every response, preflight included, carries the same three headers.
fn response_builder(status: &StatusCode) -> Builder {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .header(ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .header(ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type")
}

pub fn empty_response(status: &StatusCode) -> Result<Response<String>, Error> {
    let response = response_builder(status)
        .body("".to_string())
        .map_err(Box::new)?;

    Ok(response)
}

pub fn json_response(
    status: &StatusCode,
    body: &impl Serialize,
) -> Result<Response<String>, Error> {
    raw_json_response(status, serde_json::to_string(body)?)
}

/// Body is sent as-is, already JSON text.
pub fn raw_json_response(status: &StatusCode, body: String) -> Result<Response<String>, Error> {
    let response = response_builder(status).body(body).map_err(Box::new)?;

    Ok(response)
}
