use http_handler::function_handler;
use lambda_http::{run, service_fn, tracing, Error};
use shared::adapters::HttpUpstreamApi;
use shared::configuration::ApiConfig;
use shared::core::NocoDbProxy;

mod http_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let config = ApiConfig::load();
    config.log_presence();

    let http_client = shared::Client::builder().build()?;
    let proxy = NocoDbProxy::new(config, HttpUpstreamApi::new(http_client));

    run(service_fn(|event| function_handler(&proxy, event))).await
}
