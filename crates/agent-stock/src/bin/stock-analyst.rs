//! Stock analyst command line
//!
//! ```bash
//! export OPENAI_API_KEY=sk-...
//!
//! # Web UI on STOCK_ANALYST_ADDR (default 127.0.0.1:8080)
//! stock-analyst serve
//!
//! # One request, printed to stdout and optionally saved as a report
//! stock-analyst analyze "Should I invest in MSFT based on recent trends?" --output msft.md
//!
//! # Headline metrics, no LLM involved
//! stock-analyst quick MSFT
//! ```

use agent_stock::report::render_markdown;
use agent_stock::web::{self, AppState};
use agent_stock::{ResultStore, StockAnalysisDesk, StockConfig, YahooFinanceClient, quick_metrics};
use agent_utils::{Config, init_tracing_with};
use anyhow::Context as _;
use clap::{Parser, Subcommand};
use comfy_table::{Table, presets::UTF8_FULL};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "stock-analyst")]
#[command(about = "Multi-agent stock analysis desk", long_about = None)]
struct Cli {
    /// OpenAI API key, overrides the environment
    #[arg(long, global = true, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the web UI
    Serve {
        /// Listen address, defaults to STOCK_ANALYST_ADDR
        #[arg(long)]
        addr: Option<SocketAddr>,
    },
    /// Run one analysis request
    Analyze {
        /// Free-text request, e.g. "Should I invest in MSFT?"
        query: String,
        /// Also write the markdown report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show headline metrics for a ticker
    Quick {
        ticker: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let app = Config::from_env()?.with_api_key(cli.api_key);
    init_tracing_with(app.log_format);

    let config = StockConfig::from_app_config(&app);
    let source = Arc::new(YahooFinanceClient::from_config(&config)?);

    match cli.command {
        Command::Serve { addr } => {
            let addr = match addr {
                Some(addr) => addr,
                None => app
                    .listen_addr
                    .parse()
                    .with_context(|| format!("invalid listen address '{}'", app.listen_addr))?,
            };
            let state = Arc::new(AppState::new(config, source)?);
            web::serve(addr, state).await?;
        }
        Command::Analyze { query, output } => {
            let desk = StockAnalysisDesk::new(config, source)?;
            let text = desk.analyze(&query).await;
            println!("{text}");

            if let Some(path) = output {
                let mut store = ResultStore::new();
                let report = render_markdown(store.record(&query, text));
                tokio::fs::write(&path, report)
                    .await
                    .with_context(|| format!("failed to write {}", path.display()))?;
                info!(path = %path.display(), "Report written");
            }
        }
        Command::Quick { ticker } => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_header(vec![format!("{} metric", ticker.trim().to_uppercase()), "Value".to_string()]);
            for (label, value) in quick_metrics(source.as_ref(), &ticker).await {
                table.add_row(vec![label, value]);
            }
            println!("{table}");
        }
    }

    Ok(())
}
