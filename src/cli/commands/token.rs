use anyhow::Context;
use clap::Args;
use serde_json::json;

use crate::auth::{JwtSessionStore, Role};
use crate::cli::{output, OutputFormat};
use crate::config::AppConfig;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(long, help = "User id placed in the token subject")]
    pub user_id: String,

    #[arg(long, help = "Display name")]
    pub name: String,

    #[arg(long, default_value = "staff", help = "Role: admin, manager or staff")]
    pub role: String,

    #[arg(long, help = "Expiry in hours (defaults to SESSION_EXPIRY_HOURS)")]
    pub expiry_hours: Option<u64>,
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    let expiry_hours = args.expiry_hours.unwrap_or(config.security.session_expiry_hours);
    let role = Role::parse(&args.role);
    let sessions = JwtSessionStore::new(config.security.session_secret, expiry_hours);

    let token = sessions
        .issue(&args.user_id, &args.name, role.as_str())
        .context("Failed to mint session token")?;

    output::print(
        output_format,
        &token,
        json!({
            "token": token,
            "userId": args.user_id,
            "role": role.as_str(),
            "expiresInHours": expiry_hours,
        }),
    )
}
