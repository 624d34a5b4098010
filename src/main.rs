use anyhow::Context;
use google_gmail1::Gmail;
use google_sheets4::Sheets;
use jobsheet::auth::{self, Api};
use jobsheet::config::Config;
use jobsheet::gmail::GmailClient;
use jobsheet::sheets::SheetsClient;
use jobsheet::sync::Orchestrator;
use tracing::Level;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let debug_logging = args.iter().any(|arg| arg == "--debug");
    let dry_run = args.iter().any(|arg| arg == "--dry-run");
    let config_path = args
        .iter()
        .position(|arg| arg == "--config")
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
        .unwrap_or("settings.toml");

    tracing_subscriber::fmt()
        .with_max_level(if debug_logging { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(config_path)?;

    if args.iter().any(|arg| arg == "--reset-token") {
        auth::reset_tokens(&config.auth)?;
        println!("Tokens cleared. Run again without --reset-token to re-authenticate.");
        return Ok(());
    }

    // Checked before any network call.
    let sheet_id = config.require_sheet_id()?.to_string();

    let secret = auth::load_secret(&config.auth.client_secret).await?;
    let client = auth::https_client()?;
    let gmail_auth = auth::authorize(Api::Gmail, &secret, &config.auth).await?;
    let sheets_auth = auth::authorize(Api::Sheets, &secret, &config.auth).await?;

    let gmail = GmailClient::new(Gmail::new(client.clone(), gmail_auth));
    let sheets = SheetsClient::new(
        Sheets::new(client, sheets_auth),
        sheet_id,
        config.sheet_range.clone(),
    );

    let summary = Orchestrator::new(gmail, sheets, config.search_expression())
        .dry_run(dry_run)
        .sync()
        .await
        .context("Sync failed")?;

    if dry_run {
        for record in &summary.records {
            println!("{}", serde_json::to_string(record)?);
        }
        println!("Would add {} new confirmations.", summary.records.len());
    } else {
        println!("Added {} new confirmations.", summary.appended);
    }
    Ok(())
}
