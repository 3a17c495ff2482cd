// FILE: src/cli/mod.rs

mod config;
mod handlers;

pub use config::ConfigFile;

use crate::error::Result;
use crate::types::BuildOptions;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::env;
use std::path::Path;

/// What a command line asks for once flags are stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// No arguments: run the build block and package
    Build,
    /// One argument: run the function with that name
    Function(String),
    /// Anything longer: print usage and do nothing
    Usage,
}

impl Invocation {
    pub fn from_args(args: &[String]) -> Self {
        match args {
            [] => Self::Build,
            [name] => Self::Function(name.clone()),
            _ => Self::Usage,
        }
    }
}

pub struct LightPathCli {
    config: ConfigFile,
}

impl LightPathCli {
    pub fn new() -> Self {
        Self {
            config: ConfigFile::default(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let matches = self.build_cli().get_matches();

        self.setup_logging(matches.get_count("verbose"));

        if let Some(config_path) = matches.get_one::<String>("config") {
            self.config = config::load(config_path)?;
        }

        let options = self.build_options();
        handlers::dispatch(invocation(&matches), &options)
    }

    fn build_cli(&self) -> Command {
        Command::new(crate::NAME)
            .version(crate::VERSION)
            .about(crate::DESCRIPTION)
            .author("LightPath Development Team")
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path (.toml or .json)")
                    .action(ArgAction::Set),
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .help("Increase verbosity (can be used multiple times)")
                    .action(ArgAction::Count),
            )
            .arg(
                Arg::new("args")
                    .value_name("FUNCTION")
                    .help("Custom function to run; builds the project when omitted")
                    .num_args(0..)
                    .action(ArgAction::Append),
            )
    }

    fn setup_logging(&self, verbose_count: u8) {
        let log_level = match verbose_count {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        env_logger::Builder::from_default_env()
            .filter_level(log_level)
            .format_timestamp_secs()
            .init();
    }

    pub fn build_options(&self) -> BuildOptions {
        self.config.build_options(Path::new("."), env::var("CC").ok())
    }
}

impl Default for LightPathCli {
    fn default() -> Self {
        Self::new()
    }
}

fn invocation(matches: &ArgMatches) -> Invocation {
    let args: Vec<String> = matches
        .get_many::<String>("args")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    Invocation::from_args(&args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Invocation {
        let cli = LightPathCli::new();
        let matches = cli.build_cli().try_get_matches_from(argv).unwrap();
        invocation(&matches)
    }

    #[test]
    fn test_no_arguments_builds() {
        assert_eq!(parse(&["lightpath"]), Invocation::Build);
        assert_eq!(parse(&["lightpath", "-vv"]), Invocation::Build);
    }

    #[test]
    fn test_single_argument_runs_function() {
        assert_eq!(
            parse(&["lightpath", "deploy"]),
            Invocation::Function("deploy".to_string())
        );
        assert_eq!(
            parse(&["lightpath", "-c", "lightpath.toml", "main"]),
            Invocation::Function("main".to_string())
        );
    }

    #[test]
    fn test_extra_arguments_show_usage() {
        assert_eq!(parse(&["lightpath", "deploy", "now"]), Invocation::Usage);
    }

    #[test]
    fn test_flags_are_parsed() {
        let cli = LightPathCli::new();
        let matches = cli
            .build_cli()
            .try_get_matches_from(["lightpath", "-v", "-v", "--config", "x.toml"])
            .unwrap();

        assert_eq!(matches.get_count("verbose"), 2);
        assert_eq!(matches.get_one::<String>("config").map(String::as_str), Some("x.toml"));
    }
}
