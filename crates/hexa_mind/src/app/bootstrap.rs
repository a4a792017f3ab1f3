use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::EnvFilter;

use super::level::{self, LoadedLevel};
use super::script::{self, ScriptStep};
use super::AppError;

const LEVEL_ENV_VAR: &str = "HEXA_MIND_LEVEL";

const USAGE: &str = "usage: hexa_mind [--level <path>] [--script <path>]";

pub(crate) struct AppWiring {
    pub(crate) level: LoadedLevel,
    pub(crate) script: Vec<ScriptStep>,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct CliArgs {
    level: Option<PathBuf>,
    script: Option<PathBuf>,
    help: bool,
}

/// Returns `Ok(None)` when the invocation only asked for help.
pub(crate) fn build_app(args: &[String]) -> Result<Option<AppWiring>, AppError> {
    init_tracing();
    info!("=== Hexa Mind Startup ===");

    let cli = parse_cli_args(args)?;
    if cli.help {
        println!("{USAGE}");
        return Ok(None);
    }

    let level_path = cli.level.or_else(level_path_from_env);
    let level = match &level_path {
        Some(path) => level::load_level_file(path)?,
        None => level::load_builtin_level()?,
    };
    let source = level_path
        .as_deref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "builtin".to_string());
    info!(
        source = %source,
        rows = level.grid.rows,
        cols = level.grid.cols,
        minds = level.minds.len(),
        "level_loaded"
    );

    let script = match &cli.script {
        Some(path) => script::load_script_file(path)?,
        None => Vec::new(),
    };
    info!(steps = script.len(), "script_loaded");

    Ok(Some(AppWiring { level, script }))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_cli_args(args: &[String]) -> Result<CliArgs, AppError> {
    let mut cli = CliArgs::default();
    let mut index = 0usize;
    while index < args.len() {
        match args[index].as_str() {
            "--level" => {
                let value = flag_value(args, index, "--level")?;
                cli.level = Some(PathBuf::from(value));
                index += 2;
            }
            "--script" => {
                let value = flag_value(args, index, "--script")?;
                cli.script = Some(PathBuf::from(value));
                index += 2;
            }
            "-h" | "--help" => {
                cli.help = true;
                index += 1;
            }
            other => {
                return Err(AppError::Usage(format!("unknown argument: {other}\n{USAGE}")));
            }
        }
    }
    Ok(cli)
}

fn flag_value<'a>(args: &'a [String], index: usize, flag: &str) -> Result<&'a str, AppError> {
    args.get(index + 1)
        .map(String::as_str)
        .filter(|value| !value.starts_with("--"))
        .ok_or_else(|| AppError::Usage(format!("missing value for {flag}\n{USAGE}")))
}

fn level_path_from_env() -> Option<PathBuf> {
    std::env::var(LEVEL_ENV_VAR)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn no_arguments_uses_defaults() {
        assert_eq!(parse_cli_args(&[]).expect("parse"), CliArgs::default());
    }

    #[test]
    fn level_and_script_flags_are_read_in_any_order() {
        let cli = parse_cli_args(&args(&["--script", "demo.txt", "--level", "a.json"]))
            .expect("parse");
        assert_eq!(cli.level, Some(PathBuf::from("a.json")));
        assert_eq!(cli.script, Some(PathBuf::from("demo.txt")));
        assert!(!cli.help);
    }

    #[test]
    fn help_flag_is_recognized() {
        assert!(parse_cli_args(&args(&["-h"])).expect("parse").help);
        assert!(parse_cli_args(&args(&["--help"])).expect("parse").help);
    }

    #[test]
    fn missing_flag_value_is_a_usage_error() {
        let error = parse_cli_args(&args(&["--level"])).expect_err("missing value");
        assert!(error.to_string().contains("missing value for --level"));

        let error =
            parse_cli_args(&args(&["--level", "--script", "x"])).expect_err("flag as value");
        assert!(error.to_string().contains("missing value for --level"));
    }

    #[test]
    fn unknown_argument_is_rejected() {
        let error = parse_cli_args(&args(&["--fast"])).expect_err("unknown");
        assert!(error.to_string().contains("unknown argument: --fast"));
        assert!(error.to_string().contains("usage: hexa_mind"));
    }
}
