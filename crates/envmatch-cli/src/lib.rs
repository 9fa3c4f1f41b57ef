//! Shared pieces of the envmatch command-line tools

pub mod output;

/// Initialise logging: `Info` with `--verbose`, silent otherwise so stdout
/// stays parseable JSON.
pub fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Off
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}
