use crate::color::{background_code, foreground_code, NAMED_COLORS, RESET};
use crate::component::{
    render_bar, Appearance, Backend, BarStyle, Progress, ProgressOptions, Spinner,
    SpinnerOptions, SpinnerStyle,
};
use crate::config::Settings;
use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn};
use std::error::Error;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Settings file (defaults to ./twirl.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Show a spinner for a while, then finish it
    Spin {
        #[arg(long, default_value = "")]
        text: String,

        /// Named frame sequence (dots, line, arc, circle, arrow, bounce, star)
        #[arg(long, default_value = "dots")]
        style: String,

        /// Comma separated frames, overriding --style
        #[arg(long, value_delimiter = ',')]
        frames: Option<Vec<String>>,

        #[arg(long, default_value_t = 2000)]
        duration_ms: u64,

        #[arg(long, value_enum, default_value_t = Outcome::Succeed)]
        outcome: Outcome,

        #[command(flatten)]
        look: LookArgs,
    },

    /// Fill a progress bar step by step
    Progress {
        #[arg(long)]
        total: f64,

        #[arg(long, allow_hyphen_values = true)]
        current: Option<f64>,

        /// bar, blocks or dots
        #[arg(long, default_value = "bar")]
        style: String,

        #[arg(long, default_value_t = 1.0)]
        step: f64,

        #[arg(long, default_value_t = 50)]
        step_ms: u64,

        #[arg(long, default_value = "")]
        text: String,

        #[command(flatten)]
        look: LookArgs,
    },

    /// Print a sample of every named color
    Colors,

    /// List spinner and bar styles
    Styles,
}

/// How `spin` ends.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeed,
    Fail,
    Warn,
    Info,
    Stop,
}

/// Color and style flags shared by the animated commands.
#[derive(clap::Args, Debug, Clone, Default, PartialEq)]
pub struct LookArgs {
    /// Color name, #RRGGBB or R,G,B
    #[arg(long)]
    pub color: Option<String>,

    #[arg(long)]
    pub background: Option<String>,

    #[arg(long)]
    pub bold: bool,

    #[arg(long)]
    pub italic: bool,

    #[arg(long)]
    pub underline: bool,

    /// Render interval, at least 1
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_ms: Option<u64>,

    /// Run without drawing frames
    #[arg(long)]
    pub hide: bool,
}

impl LookArgs {
    /// Flags given on the command line win over settings.
    pub fn apply(&self, mut appearance: Appearance) -> Appearance {
        if let Some(color) = &self.color {
            appearance.color = color.clone();
        }
        if let Some(background) = &self.background {
            appearance.background_color = Some(background.clone());
        }
        if let Some(interval_ms) = self.interval_ms {
            appearance.interval = Duration::from_millis(interval_ms);
        }
        appearance.flags.bold |= self.bold;
        appearance.flags.italic |= self.italic;
        appearance.flags.underline |= self.underline;
        appearance.show &= !self.hide;
        appearance
    }
}

pub fn run(args: &Args, settings: &Settings, backend: Backend) -> Result<(), Box<dyn Error>> {
    match &args.command {
        Command::Spin {
            text,
            style,
            frames,
            duration_ms,
            outcome,
            look,
        } => {
            let options = SpinnerOptions {
                text: text.clone(),
                style: SpinnerStyle::lookup(style),
                frames: frames.clone(),
                appearance: look.apply(settings.appearance()),
            };
            run_spinner(options, Duration::from_millis(*duration_ms), *outcome, backend);
            Ok(())
        }
        Command::Progress {
            total,
            current,
            style,
            step,
            step_ms,
            text,
            look,
        } => {
            let options = ProgressOptions {
                text: text.clone(),
                total: *total,
                current: *current,
                style: style.parse::<BarStyle>()?,
                appearance: look.apply(settings.appearance()),
            };
            run_progress(options, *step, Duration::from_millis(*step_ms), backend)
        }
        Command::Colors => {
            print_colors(&backend);
            Ok(())
        }
        Command::Styles => {
            print_styles(&backend);
            Ok(())
        }
    }
}

fn run_spinner(options: SpinnerOptions, duration: Duration, outcome: Outcome, backend: Backend) {
    info!("Spinning for {:?}, then {:?}", duration, outcome);
    let spinner = Spinner::with_backend(options, backend);
    spinner.start(None);
    thread::sleep(duration);

    match outcome {
        Outcome::Succeed => spinner.succeed(None),
        Outcome::Fail => spinner.fail(None),
        Outcome::Warn => spinner.warn(None),
        Outcome::Info => spinner.info(None),
        Outcome::Stop => spinner.stop(),
    }
}

fn run_progress(
    options: ProgressOptions,
    step: f64,
    pause: Duration,
    backend: Backend,
) -> Result<(), Box<dyn Error>> {
    if !step.is_finite() || step <= 0.0 {
        return Err(format!("step must be a positive number, got {}", step).into());
    }

    let progress = Progress::with_backend(options, backend)?;
    info!(
        "Filling progress bar to {} in steps of {}",
        progress.total(),
        step
    );
    progress.start(None);
    while progress.current() < progress.total() {
        thread::sleep(pause);
        let before = progress.current();
        progress.increment(step);
        if progress.current() == before {
            // The step is below the float precision of `current`.
            warn!("Step {} no longer moves the bar at {}, completing", step, before);
            break;
        }
    }
    progress.complete();
    Ok(())
}

fn print_colors(backend: &Backend) {
    for (name, _) in NAMED_COLORS {
        backend.sink.write(&format!(
            "{}{:<14}{RESET} {}{:<14}{RESET}\n",
            foreground_code(name),
            name,
            background_code(name),
            name
        ));
    }
}

fn print_styles(backend: &Backend) {
    for style in SpinnerStyle::ALL {
        backend
            .sink
            .write(&format!("{:<8} {}\n", style.name(), style.frames().join(" ")));
    }
    for style in BarStyle::ALL {
        backend
            .sink
            .write(&format!("{:<8} {}\n", style.name(), render_bar(60.0, style)));
    }
}
