//! Configuration and CLI argument handling

use clap::{Args, Parser, Subcommand};
use std::time::Duration;

use crate::engine::SessionConfig;

/// Longest accepted phase, one week in minutes
pub const MAX_MINUTES: u64 = 7 * 24 * 60;

/// Largest cycle count whose total phase count still fits in a `u32`
pub const MAX_CYCLES: u32 = u32::MAX / 2 + 1;

const START_EXAMPLES: &str = "\
Examples:
  pomo start                    # Default: 50min work, 10min short, 30min long every 4
  pomo start -p 25 -s 5 -l 15   # Classic pomodoro: 25min work, 5min short, 15min long
  pomo start -e 0               # Disable long breaks
  pomo start -c 4               # Run exactly 4 work cycles";

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "pomo")]
#[command(about = "A CLI pomodoro timer")]
#[command(long_about = "A command-line pomodoro timer with configurable work and break durations.")]
#[command(version)]
pub struct Config {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start a pomodoro session
    #[command(after_help = START_EXAMPLES)]
    Start(StartArgs),
}

/// Flags for `pomo start`
#[derive(Args, Debug, Clone)]
pub struct StartArgs {
    /// Work duration in minutes
    #[arg(
        short = 'p',
        long = "pomodoro",
        default_value = "50",
        value_parser = clap::value_parser!(u64).range(..=MAX_MINUTES)
    )]
    pub work: u64,

    /// Short break duration in minutes
    #[arg(
        short = 's',
        long = "short",
        default_value = "10",
        value_parser = clap::value_parser!(u64).range(..=MAX_MINUTES)
    )]
    pub short_break: u64,

    /// Long break duration in minutes
    #[arg(
        short = 'l',
        long = "long",
        default_value = "30",
        value_parser = clap::value_parser!(u64).range(..=MAX_MINUTES)
    )]
    pub long_break: u64,

    /// Long break every N work cycles (0 = no long breaks)
    #[arg(short = 'e', long = "long-every", default_value = "4")]
    pub long_every: u32,

    /// Total work cycles (0 = infinite)
    #[arg(
        short,
        long,
        default_value = "0",
        value_parser = clap::value_parser!(u32).range(..=i64::from(MAX_CYCLES))
    )]
    pub cycles: u32,

    /// Progress update interval in milliseconds
    #[arg(
        long = "tick-ms",
        default_value = "200",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub tick_ms: u64,

    /// Print progress events as JSON lines instead of progress bars
    #[arg(long)]
    pub json: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "warn" }
    }
}

impl StartArgs {
    /// Engine configuration for these flags
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            work_duration: minutes(self.work),
            short_break_duration: minutes(self.short_break),
            long_break_duration: minutes(self.long_break),
            long_break_every: self.long_every,
            total_cycles: self.cycles,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// One-line description printed before the session starts
    pub fn banner(&self) -> String {
        let mut banner = format!(
            "Starting pomodoro: {}m work, {}m short break",
            self.work, self.short_break
        );
        if self.long_every > 0 {
            banner.push_str(&format!(
                ", {}m long break every {} cycles",
                self.long_break, self.long_every
            ));
        }
        if self.cycles > 0 {
            banner.push_str(&format!(" ({} cycles)", self.cycles));
        }
        banner
    }
}

fn minutes(count: u64) -> Duration {
    Duration::from_secs(count * 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start_args(args: &[&str]) -> StartArgs {
        let argv = ["pomo", "start"].into_iter().chain(args.iter().copied());
        match Config::try_parse_from(argv).expect("arguments should parse").command {
            Command::Start(start) => start,
        }
    }

    #[test]
    fn test_defaults() {
        let args = start_args(&[]);
        assert_eq!(args.session_config(), SessionConfig::default());
        assert_eq!(args.tick_interval(), Duration::from_millis(200));
        assert!(!args.json);
    }

    #[test]
    fn test_short_flags() {
        let args = start_args(&["-p", "25", "-s", "5", "-l", "15", "-e", "2", "-c", "4"]);
        let config = args.session_config();
        assert_eq!(config.work_duration, Duration::from_secs(25 * 60));
        assert_eq!(config.short_break_duration, Duration::from_secs(5 * 60));
        assert_eq!(config.long_break_duration, Duration::from_secs(15 * 60));
        assert_eq!(config.long_break_every, 2);
        assert_eq!(config.total_cycles, 4);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(Config::try_parse_from(["pomo", "start", "-p", "-5"]).is_err());
        assert!(Config::try_parse_from(["pomo", "start", "--tick-ms", "0"]).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_durations() {
        for flag in ["-p", "-s", "-l"] {
            let huge = ["pomo", "start", flag, "307445734561825861"];
            assert!(Config::try_parse_from(huge).is_err(), "{flag} accepted overflow");

            let too_long = ["pomo", "start", flag, "10081"];
            assert!(Config::try_parse_from(too_long).is_err(), "{flag} accepted over a week");
        }

        let week = start_args(&["-p", "10080"]).session_config();
        assert_eq!(week.work_duration, Duration::from_secs(MAX_MINUTES * 60));
    }

    #[test]
    fn test_rejects_out_of_range_cycles() {
        assert!(Config::try_parse_from(["pomo", "start", "-c", "4000000000"]).is_err());

        let largest = MAX_CYCLES.to_string();
        let config = start_args(&["-c", &largest, "-e", "0"]).session_config();
        assert_eq!(crate::engine::Session::new(config).total_phases(), u32::MAX);
    }

    #[test]
    fn test_verbose_is_global() {
        let config =
            Config::try_parse_from(["pomo", "start", "-v"]).expect("arguments should parse");
        assert!(config.verbose);
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn test_banner() {
        assert_eq!(
            start_args(&[]).banner(),
            "Starting pomodoro: 50m work, 10m short break, 30m long break every 4 cycles"
        );
        assert_eq!(
            start_args(&["-p", "25", "-s", "5", "-e", "0", "-c", "3"]).banner(),
            "Starting pomodoro: 25m work, 5m short break (3 cycles)"
        );
    }
}
