use crate::{
    core::{UpstreamApi, UpstreamMethod, UpstreamRequest, UpstreamResponse},
    error::ProxyError,
};
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};

#[derive(Debug)]
pub struct HttpUpstreamApi {
    http_client: Client,
}

impl HttpUpstreamApi {
    pub fn new(http_client: Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl UpstreamApi for HttpUpstreamApi {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, ProxyError> {
        let builder = match request.method {
            UpstreamMethod::Get => self.http_client.get(&request.url),
            UpstreamMethod::Post => self.http_client.post(&request.url),
        };
        let mut builder = builder
            .header("xc-token", &request.token)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = &request.body {
            builder = builder.body(body.to_string());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(UpstreamResponse { status, body })
    }
}
