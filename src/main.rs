use anyhow::{Context, Result};
use topicpress::{Config, Mode};
use tracing::error;

fn run(config: &Config) -> Result<()> {
    config.validate().context("Invalid configuration")?;
    let project = config.project();

    match config.mode() {
        Mode::Build => {
            let report = topicpress::build_site(&project).context("Build failed")?;
            tracing::info!("Built {} pages", report.page_count());
            Ok(())
        }
        Mode::LiveReload => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("Failed to start async runtime")?;
            runtime.block_on(topicpress::serve(project, config.serve_options()))
        }
    }
}

fn main() -> std::process::ExitCode {
    let config = Config::parse();
    topicpress::logging::init_logging(config.verbose);

    match run(&config) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            std::process::ExitCode::FAILURE
        }
    }
}
