use std::process::ExitCode;

use log::error;
use vocab_cards::source::DialogPicker;
use vocab_cards::tts::OpenAiSynthesizer;
use vocab_cards::{logger, AppConfig, CardGenerator, Result, RunSummary};

async fn run() -> Result<RunSummary> {
    let config = AppConfig::from_env()?;
    config.log_summary();

    let synthesizer = OpenAiSynthesizer::new(&config)?;
    let generator = CardGenerator::new(config, Box::new(synthesizer));

    generator.run(&DialogPicker).await
}

#[tokio::main]
async fn main() -> ExitCode {
    logger::init_logger();

    match run().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
