//! kbagent Lambda: knowledge-grounded question answering.
//!
//! Each invocation reads its configuration from the environment, fetches the
//! knowledge-base files from S3, and forwards the assembled prompt to Bedrock.

use aws_config::{BehaviorVersion, SdkConfig};
use kbagent_query::{BedrockModelClient, S3ObjectStore};
use kbagent_shared::{AppConfig, HandlerResponse, QueryConfig};
use lambda_runtime::{Error, LambdaEvent, service_fn};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let sdk_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
    let sdk_config = &sdk_config;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<serde_json::Value>| async move {
        function_handler(event, sdk_config).await
    }))
    .await
}

async fn function_handler(
    event: LambdaEvent<serde_json::Value>,
    sdk_config: &SdkConfig,
) -> Result<HandlerResponse, Error> {
    let (payload, context) = event.into_parts();
    info!(request_id = %context.request_id, "invocation received");

    let mut app = AppConfig::default();
    app.apply_env();
    let config = QueryConfig::from(&app);

    let store = S3ObjectStore::from_conf(sdk_config);
    let model = BedrockModelClient::from_conf(sdk_config, config.region.clone());

    Ok(kbagent_query::handle_raw(payload, &config, &store, &model).await)
}

/// JSON lines to stdout for CloudWatch.
fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kbagent=info"));

    fmt()
        .json()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_current_span(false)
        .init();
}
