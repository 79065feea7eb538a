use lambda_http::http::{Method, StatusCode};
use lambda_http::{tracing, Error, IntoResponse, Request, Response};
use shared::core::{NocoDbProxy, ProxyResponse, UpstreamApi};
use shared::error::ProxyError;
use shared::utils::{empty_response, json_response, raw_json_response};

#[tracing::instrument(skip(proxy, event), fields(method = %event.method()))]
pub(crate) async fn function_handler<U: UpstreamApi>(
    proxy: &NocoDbProxy<U>,
    event: Request,
) -> Result<impl IntoResponse, Error> {
    tracing::info!("Received {} request for {}", event.method(), event.uri().path());

    if event.method() == Method::OPTIONS {
        return empty_response(&StatusCode::OK);
    }
    if event.method() != Method::POST {
        return error_response(&ProxyError::MethodNotAllowed);
    }

    match proxy.handle_body(event.body()).await {
        Ok(ProxyResponse::GuruList(response)) => json_response(&StatusCode::OK, &response),
        Ok(ProxyResponse::Login(response)) => json_response(&StatusCode::OK, &response),
        Ok(ProxyResponse::Saved(response)) => json_response(&StatusCode::OK, &response),
        Ok(ProxyResponse::Passthrough(body)) => raw_json_response(&StatusCode::OK, body),
        Err(e) => error_response(&e),
    }
}

fn error_response(error: &ProxyError) -> Result<Response<String>, Error> {
    if error.is_server_error() {
        tracing::error!("Proxy error: {}", error);
    }
    json_response(&error.status_code(), &error.to_body())
}
