#[cfg(feature = "native")]
#[tokio::main]
async fn main() -> anyhow::Result<std::process::ExitCode> {
    use clap::Parser;
    use leadcapture::cli::{Cli, run};
    use leadcapture::core::config::Config;
    use tracing_subscriber::EnvFilter;

    // Load .env file (if exists)
    let _ = dotenvy::dotenv();

    // Initialize tracing, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load application config from environment variables
    let config = Config::from_env();
    tracing::debug!(
        "Config loaded: endpoint={}, queue_dir={}, custom_endpoint={}",
        config.endpoint_url,
        config.queue_dir.display(),
        config.has_custom_endpoint()
    );

    let ok = run(cli, config).await?;
    Ok(if ok {
        std::process::ExitCode::SUCCESS
    } else {
        std::process::ExitCode::FAILURE
    })
}

#[cfg(not(feature = "native"))]
pub fn main() {
    // no native entry point; the browser build uses the library directly
}
