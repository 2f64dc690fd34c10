use log::{error, info, warn};
use poll_forecast::forecast::probability::UniformNoise;
use poll_forecast::source::PollSource;
use poll_forecast::{Error, ForecastConfig, run_forecast, units};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::process::ExitCode;

fn run() -> Result<(), Error> {
    let config = ForecastConfig::from_env()?;
    let source = PollSource::from_files(&config.polls_path, &config.weights_path)?;

    let rng = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => {
            warn!("FORECAST_SEED not set; win probabilities will vary between runs");
            ChaCha8Rng::from_entropy()
        }
    };
    let mut noise = UniformNoise::reference(rng);

    let request = config.request();
    let report = run_forecast(
        &source.records,
        &source.weights,
        units::presidential_2024(),
        &request,
        &mut noise,
    );

    if let Some((leader, votes)) = report.tally.leader() {
        info!("{} leads with {} of {} electoral votes", leader, votes, report.tally.allocated());
    }
    println!("{}", report);
    Ok(())
}

fn main() -> ExitCode {
    // Initialize logging
    dotenvy::dotenv().ok();
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Forecast failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
