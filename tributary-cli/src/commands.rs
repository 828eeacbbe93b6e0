//! CLI command implementations

use std::net::IpAddr;

use anyhow::Context;
use clap::Subcommand;
use tributary_core::{MediaType, ProxyConfig, StreamRequest, TributaryConfig, UserConfig};
use tributary_wrappers::{ProwlarrOptions, WrapperContext, get_prowlarr_streams};

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Search a Prowlarr instance
    Prowlarr {
        /// Search term, usually an IMDb id or a title
        id: String,
        /// Prowlarr API key
        #[arg(long)]
        api_key: Option<String>,
        /// Prowlarr base URL (defaults to TRIBUTARY_PROWLARR_URL)
        #[arg(long)]
        url: Option<String>,
        /// Display name for this instance
        #[arg(long)]
        name: Option<String>,
        /// Request timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<String>,
        /// Forward this address as the originating client IP
        #[arg(long)]
        client_ip: Option<IpAddr>,
        /// Instance identifier reported with each stream
        #[arg(long, default_value = "prowlarr")]
        addon_id: String,
        /// Treat the id as a series rather than a movie
        #[arg(long)]
        series: bool,
        /// Forward proxy URL (overrides TRIBUTARY_ADDON_PROXY)
        #[arg(long)]
        proxy: Option<String>,
        /// Proxy rules such as `*:false,indexer.example.com:true`
        #[arg(long)]
        proxy_rules: Option<String>,
    },
}

/// Handle the CLI command
///
/// # Errors
/// Returns an error for invalid configuration; query failures are reported
/// in the printed `addonErrors` instead.
pub async fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Prowlarr {
            id,
            api_key,
            url,
            name,
            timeout_ms,
            client_ip,
            addon_id,
            series,
            proxy,
            proxy_rules,
        } => {
            let mut settings = TributaryConfig::from_env();
            if proxy.is_some() {
                settings.proxy.url = proxy;
            }
            if let Some(rules) = proxy_rules {
                settings.proxy.rules =
                    ProxyConfig::parse_rules(&rules).context("Invalid --proxy-rules")?;
            }

            let request = StreamRequest {
                id,
                media_type: if series {
                    MediaType::Series
                } else {
                    MediaType::Movie
                },
            };
            let options = ProwlarrOptions {
                url,
                api_key: api_key.unwrap_or_default(),
                name,
                timeout: timeout_ms,
            };
            let user = UserConfig {
                requesting_ip: client_ip.map(|ip| ip.to_string()),
            };

            search_prowlarr(settings, options, user, request, &addon_id).await
        }
    }
}

/// Run one Prowlarr search and print the collected results as JSON.
///
/// # Errors
/// - Configuration errors from the wrapper or transport setup
pub async fn search_prowlarr(
    settings: TributaryConfig,
    options: ProwlarrOptions,
    user: UserConfig,
    request: StreamRequest,
    addon_id: &str,
) -> anyhow::Result<()> {
    let context = WrapperContext::new(settings).context("Failed to set up HTTP transport")?;

    let results = get_prowlarr_streams(&user, options, &request, addon_id, &context).await?;

    for error in &results.addon_errors {
        tracing::warn!("{error}");
    }
    tracing::info!(
        "Found {} streams for {}",
        results.addon_streams.len(),
        request.id
    );

    println!("{}", serde_json::to_string_pretty(&results)?);

    Ok(())
}
