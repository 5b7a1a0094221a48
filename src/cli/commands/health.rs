use std::time::Duration;

use anyhow::bail;
use clap::Args;
use serde_json::Value;

use crate::cli::{output, OutputFormat};

#[derive(Args, Debug)]
pub struct HealthArgs {
    #[arg(long, default_value = "http://localhost:3000", help = "Server base URL")]
    pub url: String,

    #[arg(long, default_value_t = 5, help = "Request timeout in seconds")]
    pub timeout: u64,
}

pub async fn handle(args: HealthArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let endpoint = format!("{}/health", args.url.trim_end_matches('/'));
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.timeout))
        .build()?;

    let response = client.get(&endpoint).send().await?;
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    if !status.is_success() {
        output::print_error(output_format, &format!("{} returned {}", endpoint, status))?;
        bail!("Server is unhealthy");
    }

    let text = format!("{} is healthy", args.url);
    output::print(output_format, &text, body)
}
