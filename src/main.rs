use clap::Parser;
use std::process;
use twirl::{
    cli::{self, Args},
    config::Settings,
    logging, Backend,
};

fn main() {
    let args = parse_command_line_arguments();
    let settings = load_settings(&args);
    initialize_logging(&settings);

    if let Err(e) = cli::run(&args, &settings, Backend::default()) {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn parse_command_line_arguments() -> Args {
    Args::parse()
}

fn load_settings(args: &Args) -> Settings {
    match Settings::load(args.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            process::exit(1);
        }
    }
}

fn initialize_logging(settings: &Settings) {
    // Animations still work without a log file.
    if let Err(e) = logging::init_logger(logging::parse_level(&settings.log_level)) {
        eprintln!("Logging disabled: {}", e);
    }
    log::info!("Application starting");
}
