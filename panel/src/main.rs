use livecast_panel::config::PanelConfig;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = PanelConfig::load(path.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::from(config.log_level).into())
                .from_env_lossy(),
        )
        .with_ansi(std::io::stdout().is_terminal())
        .init();

    livecast_panel::app::run(config).await
}
