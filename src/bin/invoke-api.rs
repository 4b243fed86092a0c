use anyhow::Context;
use burndown::config::InvokerConfig;
use burndown::invoker::SignedInvoker;
use burndown::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let config = InvokerConfig::from_env().context("invalid invoker configuration")?;
    telemetry::init(config.log_format);

    let invoker = SignedInvoker::from_environment(&config.invoke_api_region).await?;
    tracing::info!(
        endpoint = %config.invoke_api_endpoint,
        region = invoker.region(),
        "Invoking API Gateway endpoint"
    );

    let result = invoker.invoke(&config.invoke_api_endpoint).await;

    println!("Response Status Code: {}", result.status_code);
    println!(
        "Response Headers: {}",
        serde_json::to_string_pretty(&result.headers)?
    );
    println!("Response Body: {}", result.body);

    if let Some(upstream) = &result.upstream {
        println!(
            "Upstream Response Headers: {}",
            serde_json::to_string_pretty(&upstream.headers)?
        );
        println!("Upstream Response Body: {}", upstream.body);
    }

    Ok(())
}
