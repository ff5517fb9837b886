//! Site information demo
//!
//! Prints the server version, every site the token can see with its visit
//! count for a day, and the CSV summary of the first site.
//!
//! Configuration comes from the environment:
//! - `PIWIK_API_URL`: the API endpoint, e.g. `https://stats.example.org/index.php`
//! - `PIWIK_TOKEN_AUTH`: the auth token (defaults to `anonymous`)
//! - `RUST_LOG`: log filter, e.g. `piwik=debug`

#![allow(missing_docs)]
#![allow(clippy::print_stdout)]

use std::time::Duration;

use piwik::prelude::*;
use piwik::ANONYMOUS_TOKEN;
use tracing_subscriber::EnvFilter;

/// A site as listed by `SitesManager`.
#[derive(Debug, Clone, Deserialize)]
pub struct Site {
    pub idsite: String,
    pub name: String,
    pub main_url: String,
}

/// Build the report lines for every visible site.
async fn site_report<T: Transport>(
    client: &PiwikClient<T>,
    date: impl Into<ParamValue>,
) -> piwik::Result<Vec<String>> {
    let date = date.into();
    let mut lines = Vec::new();

    let version = client
        .call_php("API.getPiwikVersion", &Params::new())
        .await?;
    lines.push(format!("Piwik {}", version.as_str().unwrap_or("unknown")));

    let sites: Vec<Site> = client
        .call_as("SitesManager.getSitesWithAtLeastViewAccess", &Params::new())
        .await?;

    for site in &sites {
        let params = Params::new()
            .with("idSite", site.idsite.as_str())
            .with("period", "day")
            .with("date", date.clone());
        let visits = client.call_php("VisitsSummary.getVisits", &params).await?;
        lines.push(format!(
            "#{} {} ({}): {} visits",
            site.idsite,
            site.name,
            site.main_url,
            visits.as_i64().unwrap_or_default()
        ));
    }

    Ok(lines)
}

#[tokio::main]
async fn main() -> piwik::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let Ok(base_url) = std::env::var("PIWIK_API_URL") else {
        println!("Set PIWIK_API_URL to the API endpoint, e.g. https://stats.example.org/index.php");
        return Ok(());
    };
    let token = std::env::var("PIWIK_TOKEN_AUTH").unwrap_or_else(|_| ANONYMOUS_TOKEN.to_string());

    let client = PiwikClient::builder()
        .base_url(base_url)
        .token(token)
        .timeout(Duration::from_secs(20))
        .with_logging()
        .build()?;

    for line in site_report(&client, "yesterday").await? {
        println!("{line}");
    }

    let params = Params::new()
        .with("idSite", 1)
        .with("period", "day")
        .with("date", "yesterday");
    let csv = client
        .call_text("VisitsSummary.get", &params, Format::Csv)
        .await?;
    println!("\n{csv}");

    Ok(())
}
