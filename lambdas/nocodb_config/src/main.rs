use http_handler::function_handler;
use lambda_http::{run, service_fn, tracing, Error};
use shared::configuration::ApiConfig;

mod http_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let config = ApiConfig::load();

    run(service_fn(|event| function_handler(&config, event))).await
}
