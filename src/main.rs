use clap::Parser;
use harga_rumah::config::cli::{Cli, Command, PredictArgs, TrainArgs};
use harga_rumah::utils::error::{ErrorSeverity, PredictorError};
use harga_rumah::utils::format::format_rupiah;
use harga_rumah::utils::logger::{self, LogFormat};
use harga_rumah::utils::validation::Validate;
use harga_rumah::{
    ArtifactStore, LocalStorage, Predictor, TomlConfig, TrainingEngine, TrainingPipeline,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Command::Train(args) => train(&cli, args).await,
        Command::Predict(args) => predict(&cli, args).await,
    }
}

async fn train(cli: &Cli, args: &TrainArgs) -> anyhow::Result<()> {
    // 先載入配置，日誌設定可能來自檔案
    let mut config = match TomlConfig::from_file_or_default(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file is valid TOML format");
            std::process::exit(1);
        }
    };
    args.apply_overrides(&mut config);

    logger::init_cli_logger(
        cli.verbose || config.logging.verbose,
        cli.log_format.unwrap_or_else(|| config.logging.log_format()),
    );
    tracing::info!("🚀 Starting harga-rumah training");
    tracing::debug!("Training config: {:?}", config);

    if let Err(e) = config.validate() {
        fail(&e, "Configuration validation failed");
    }

    let storage = LocalStorage::new(config.artifacts.dir.clone());
    let pipeline = TrainingPipeline::new(storage, config);
    let engine = TrainingEngine::new(pipeline);

    match engine.run().await {
        Ok(outcome) => {
            let metrics = outcome.report.metrics;
            println!("✅ Model, scaler and imputer saved successfully!");
            println!("📁 Output saved to: {}", outcome.output_path);
            println!("Mean Absolute Error: {}", metrics.mae);
            println!("Mean Squared Error: {}", metrics.mse);
            println!("R-squared: {}", metrics.r2);
        }
        Err(e) => fail(&e, "Training failed"),
    }

    Ok(())
}

async fn predict(cli: &Cli, args: &PredictArgs) -> anyhow::Result<()> {
    logger::init_cli_logger(cli.verbose, cli.log_format.unwrap_or(LogFormat::Compact));

    if let Err(e) = args.validate() {
        fail(&e, "Input validation failed");
    }

    let input = args.feature_vector();
    let store = ArtifactStore::new(LocalStorage::new(args.artifacts_dir.clone()));

    let predictor = match Predictor::load(&store).await {
        Ok(predictor) => predictor,
        Err(e) => fail(&e, "Could not load artifacts"),
    };

    match predictor.predict(&input) {
        Ok(price) => {
            if args.json {
                let body = serde_json::json!({
                    "input": input,
                    "model": predictor.model().kind().as_str(),
                    "price_in_rp": price,
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("✅ Predicted house price: Rp {}", format_rupiah(price));
            }
        }
        Err(e) => fail(&e, "Prediction failed"),
    }

    Ok(())
}

fn fail(e: &PredictorError, context: &str) -> ! {
    tracing::error!(
        "❌ {}: {} (Category: {:?}, Severity: {:?})",
        context,
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}
