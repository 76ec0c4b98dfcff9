//! Dashboard binary: serve a searchable view of the success log.

use anyhow::Result;
use clap::Parser;
use permagent::dashboard::DashboardServer;
use permagent::logbook::Logbook;
use permagent::Config;

#[derive(Parser, Debug)]
#[command(name = "dashboard")]
#[command(about = "Browse and search files archived by the agent")]
struct Args {
    /// Port override (defaults to dashboard.port from config.toml)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info")).init();

    let args = Args::parse();

    let config = Config::load()?;
    let port = args.port.unwrap_or(config.dashboard.port);

    let logbook = Logbook::new(config.success_log(), config.failure_log());
    let server = DashboardServer::new(logbook);
    server.run(port).await?;

    Ok(())
}
