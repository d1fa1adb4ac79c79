use clap::Parser;
use grams_estimator::app::commands;
use grams_estimator::utils::error::{ErrorSeverity, GramsError};
use grams_estimator::utils::{logger, validation::Validate};
use grams_estimator::{CliConfig, Command, ServiceConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 載入 .env
    dotenvy::dotenv().ok();
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting grams v{}", env!("CARGO_PKG_VERSION"));
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(cli).await {
        tracing::error!("❌ {} (Severity: {:?})", e, e.severity());
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(cli: CliConfig) -> Result<(), GramsError> {
    let mut config = cli.load_service_config()?;
    let local = apply_overrides(&mut config, &cli.command);

    // 驗證配置
    config.validate()?;

    match cli.command {
        Command::ServeModel { .. } => commands::serve_model(&config).await,
        Command::ServeGrams { .. } => commands::serve_grams(&config, local).await,
        Command::Estimate {
            input,
            format,
            output,
        } => commands::run_estimate(&config, &input, format, output.as_deref()),
        Command::Fuse {
            input,
            format,
            output,
        } => commands::run_fuse(&input, format, output.as_deref()),
    }
}

/// Folds command-line and environment overrides into the file config.
/// Returns whether frames should be estimated in-process.
fn apply_overrides(config: &mut ServiceConfig, command: &Command) -> bool {
    match command {
        Command::ServeModel { port } => {
            if let Some(port) = port {
                config.server.model_port = *port;
            }
            false
        }
        Command::ServeGrams {
            port,
            segmentation_url,
            estimation_url,
            local_estimation,
        } => {
            if let Some(port) = port {
                config.server.grams_port = *port;
            }
            if let Some(url) = segmentation_url {
                config.upstream.segmentation_url = url.clone();
            }
            if let Some(url) = estimation_url {
                config.upstream.estimation_url = Some(url.clone());
            }
            *local_estimation
        }
        Command::Estimate { .. } | Command::Fuse { .. } => true,
    }
}
