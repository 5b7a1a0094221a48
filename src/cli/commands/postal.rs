use clap::Args;
use serde_json::Value;

use crate::cli::{output, OutputFormat};
use crate::client::{PostalLookup, ZipcloudApi};
use crate::config::AppConfig;

#[derive(Args, Debug)]
pub struct PostalArgs {
    #[arg(help = "Postal code, with or without hyphen (e.g. 100-0001)")]
    pub code: String,
}

pub async fn handle(args: PostalArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    let lookup = PostalLookup::new(ZipcloudApi::new(&config.postal)?);

    match lookup.lookup(&args.code).await {
        Some(address) => {
            let text = format!(
                "{} {}{}{}",
                address.zipcode, address.prefecture, address.city, address.town
            );
            output::print(output_format, &text, serde_json::to_value(&address)?)
        }
        None => match output_format {
            OutputFormat::Json => output::print(output_format, "", Value::Null),
            OutputFormat::Text => output::print_error(output_format, "No address found"),
        },
    }
}
