//! Connectivity check against a Jamf Pro instance.
//!
//! Authenticates, prints the server version and a few buildings and sites,
//! then invalidates the token.
//!
//! ```sh
//! export INSTANCE_DOMAIN=acme.jamfcloud.com AUTH_METHOD=oauth2
//! export CLIENT_ID=... CLIENT_SECRET=...
//! cargo run --bin jamfpro-check
//!
//! # or with a JSON config file
//! cargo run --bin jamfpro-check -- ./clientconfig.json
//! ```

use std::time::Duration;

use jamfpro_sdk::{JamfProClient, QueryParams, RequestContext};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    init_logging();

    let client = match std::env::args().nth(1) {
        Some(path) => JamfProClient::from_config_file(&path).await,
        None => JamfProClient::from_env().await,
    }
    .unwrap_or_else(|e| {
        eprintln!("Error: failed to create Jamf Pro client: {e}");
        eprintln!();
        eprintln!("  Set INSTANCE_DOMAIN, AUTH_METHOD and either CLIENT_ID/CLIENT_SECRET");
        eprintln!("  or BASIC_AUTH_USERNAME/BASIC_AUTH_PASSWORD, or pass a JSON config path.");
        std::process::exit(1);
    });

    let ctx = RequestContext::with_timeout(Duration::from_secs(60));
    println!("Connected to {}\n", client.transport().base_url());

    match client.jamf_pro_version.get(&ctx).await {
        Ok((version, response)) => {
            println!("  Jamf Pro version: {} ({:?})", version.version, response.duration)
        }
        Err(e) => fail(&e),
    }

    let mut query = QueryParams::new();
    query.insert("page-size".to_string(), "5".to_string());
    query.insert("sort".to_string(), "name:asc".to_string());
    match client.buildings.list(&ctx, Some(&query)).await {
        Ok((page, _)) => {
            println!("  Buildings: {} total", page.total_count);
            for building in page.results {
                println!("    - {}", building.name);
            }
        }
        Err(e) => fail(&e),
    }

    match client.sites.list(&ctx).await {
        Ok((list, _)) => {
            println!("  Sites: {}", list.size);
            for site in list.sites.iter().take(5) {
                println!("    - {}", site.name);
            }
        }
        Err(e) => fail(&e),
    }

    if let Err(e) = client.invalidate_token(&ctx).await {
        eprintln!("Warning: token invalidation failed: {e}");
    }
    println!("\nCheck complete.");
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

fn fail(err: &jamfpro_sdk::Error) -> ! {
    eprintln!("Error: {err}");
    if let Some(response) = err.response() {
        eprintln!("  HTTP {} {}", response.status_code, response.status);
    }
    std::process::exit(1);
}
