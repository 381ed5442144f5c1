use std::sync::Arc;

use clap::Parser;
use dalle_capture::capture::CaptureService;
use dalle_capture::config::setup_logging;
use dalle_capture::provider::OpenAiProvider;
use dalle_capture::web::AppState;
use tracing::{error, warn};

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = dalle_capture::cli::CliOptions::parse();

    if setup_logging(cli.debug).is_err() {
        return;
    }

    let http = reqwest::Client::new();

    let provider_config = cli.provider_config();
    if provider_config.api_key.is_none() {
        warn!(
            "No API key found in {}, generation requests will fail",
            cli.api_key_file.display()
        );
    }
    let provider = Arc::new(OpenAiProvider::new(http.clone(), provider_config));

    let store = match dalle_capture::storage::from_config(&cli.storage_config()) {
        Ok(store) => store,
        Err(err) => {
            error!("Object storage setup error: {}", err);
            return;
        }
    };
    let captures = CaptureService::new(http.clone(), store, cli.capture_config());

    let state = AppState::new(
        provider,
        captures,
        http,
        cli.balance_config(),
        cli.static_dir.clone(),
    );

    if let Err(err) = dalle_capture::web::setup_server(&cli.listen_address, cli.port, state).await {
        error!("Application error: {}", err);
    }
}
