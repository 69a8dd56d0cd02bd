use myaccount_lib::bootstrap::{build_flow, init_tracing_subscriber, resolve_config};
use myaccount_lib::console::Console;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = resolve_config()?;
    init_tracing_subscriber(config.log_dir.as_deref())?;
    info!(
        fixture = ?config.fixture_path,
        log_dir = ?config.log_dir,
        "configuration resolved"
    );

    let flow = build_flow(config)?;
    if let Err(err) = flow.start().await {
        error!(error = %err, "account flow could not start");
        return Err(err.into());
    }

    Console::new(flow, tokio::io::stdout()).run_stdin().await
}
