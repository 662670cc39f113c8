/*!
`atta` - run the adapter's HTTP control surface.

```text
atta --port 4119 --fixture demos/fixture.json --known-issues demos/known-issues.json
```

The bundled platform is the in-memory one; `--fixture` loads a document tree into
it at startup so a harness can be pointed at a known page.
*/

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use atta::{AttaBuilder, IssueRules, MemoryPlatform, NodeSpec};
use atta_http::{serve, ServerConfig, DEFAULT_PORT};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "atta", version, about = "Accessible Technology Test Adapter")]
struct Cli {
  /// Interface to bind.
  #[arg(long, default_value = "localhost")]
  host: String,

  #[arg(long, default_value_t = DEFAULT_PORT)]
  port: u16,

  /// Colour result lines in the log.
  #[arg(long)]
  ansi_formatting: bool,

  /// Seconds to wait for a test document, and for the `test` request after it.
  #[arg(long, default_value_t = 5)]
  timeout_secs: u64,

  /// JSON document tree to load at startup.
  #[arg(long)]
  fixture: Option<PathBuf>,

  /// JSON known-issue rules.
  #[arg(long)]
  known_issues: Option<PathBuf>,

  /// Log filter used when RUST_LOG is unset.
  #[arg(long, default_value = "info")]
  log_level: String,
}

#[tokio::main]
async fn main() -> ExitCode {
  let cli = Cli::parse();
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
    .init();

  match run(cli).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      log::error!("{e}");
      ExitCode::FAILURE
    }
  }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error + Send + Sync>> {
  let timeout = Duration::from_secs(cli.timeout_secs);

  let mut builder = AttaBuilder::new()
    .ready_timeout(timeout)
    .ansi_formatting(cli.ansi_formatting);
  if let Some(path) = &cli.known_issues {
    let rules = IssueRules::load(path)?;
    log::info!("[session] Loaded {} known-issue rules", rules.len());
    builder = builder.known_issues(rules);
  }

  let atta = builder.build(MemoryPlatform::new());
  if !atta.is_enabled() {
    return Err("accessibility is not enabled; tests must be run manually".into());
  }
  atta.start()?;

  if let Some(path) = &cli.fixture {
    let spec = NodeSpec::load(path)?;
    atta.platform().load_document(&spec);
    if let Some(document) = atta.current_document() {
      log::info!(
        "[document] Fixture {} with {} test elements",
        document.uri(),
        document.test_elements().len()
      );
    }
  }

  let config = ServerConfig {
    host: cli.host,
    port: cli.port,
    run_timeout: timeout,
  };
  serve(atta.clone(), config, ctrl_c()).await?;

  let results = atta.results();
  if !results.is_empty() {
    log::info!("[session] Results:\n{}", results.summary());
  }
  Ok(())
}

async fn ctrl_c() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    log::error!("[http] Cannot listen for Ctrl-C: {e}");
    std::future::pending::<()>().await;
  }
}
