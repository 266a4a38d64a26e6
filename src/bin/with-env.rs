use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{self, Command, ExitStatus};

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use withenv::{EnvLoader, Inference, LoadedEnv};

const DEFAULT_FILE: &str = ".env";
const LOG_ENV: &str = "WITH_ENV_LOG";

/// Run a command with variables loaded from dotenv files.
///
/// Without `--`, every argument is the command and `.env` is loaded.
#[derive(Debug, Parser)]
#[command(
    name = "with-env",
    version,
    override_usage = "with-env [OPTIONS] [FILES]... -- <COMMAND> [ARGS]..."
)]
struct Cli {
    /// Infer numbers and booleans, then render them back to canonical strings.
    #[arg(
        long,
        env = "WITH_ENV_INFER",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    infer: bool,

    /// Print loader diagnostics to stderr.
    #[arg(short, long)]
    verbose: bool,

    /// Dotenv files. Repeat or pass comma-separated paths.
    #[arg(value_name = "FILES")]
    files: Vec<OsString>,

    /// Command and arguments to execute.
    #[arg(last = true, value_name = "COMMAND")]
    command: Vec<OsString>,

    /// Whether a `--` separator was given, even with nothing after it.
    #[arg(skip)]
    separated: bool,
}

impl Cli {
    fn parse_args(args: Vec<OsString>) -> Result<Self, clap::Error> {
        let separated = args.iter().skip(1).any(|arg| arg == "--");
        let mut cli = Self::try_parse_from(args)?;
        cli.separated = separated;
        Ok(cli)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RunOptions {
    files: Vec<PathBuf>,
    inference: Inference,
    command: OsString,
    args: Vec<OsString>,
}

fn main() {
    process::exit(run(env::args_os()));
}

fn run(args: impl IntoIterator<Item = OsString>) -> i32 {
    let args: Vec<OsString> = args.into_iter().collect();
    if args.len() <= 1 {
        println!("{}", Cli::command().render_usage());
        return 1;
    }

    let cli = match Cli::parse_args(args) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return err.exit_code();
        }
    };

    init_tracing(cli.verbose);

    let result = env::current_dir()
        .context("failed to resolve the current directory")
        .and_then(|cwd| parse_run_options(cli, &cwd))
        .and_then(execute_run);
    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("with-env: {err:#}");
            1
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "withenv=debug,with_env=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn parse_run_options(cli: Cli, cwd: &Path) -> Result<RunOptions> {
    // An explicit `--` with no files before it loads nothing.
    let (raw_files, command_line) = if cli.separated {
        (cli.files, cli.command)
    } else {
        (vec![OsString::from(DEFAULT_FILE)], cli.files)
    };

    let mut files = Vec::new();
    for raw in &raw_files {
        parse_file_list(raw, cwd, &mut files)?;
    }

    let Some((command, args)) = command_line.split_first() else {
        bail!("missing command to execute");
    };

    Ok(RunOptions {
        files,
        inference: Inference::from(cli.infer),
        command: command.clone(),
        args: args.to_vec(),
    })
}

fn parse_file_list(raw: &OsStr, cwd: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let Some(text) = raw.to_str() else {
        files.push(cwd.join(raw));
        return Ok(());
    };

    let mut added = 0usize;
    for segment in text.split(',') {
        let trimmed = segment.trim();
        if trimmed.is_empty() {
            continue;
        }
        files.push(cwd.join(trimmed));
        added += 1;
    }
    if added == 0 {
        bail!("`{text}` does not name any dotenv file");
    }
    Ok(())
}

fn execute_run(options: RunOptions) -> Result<i32> {
    let env = load_env(&options)?;

    let mut command = Command::new(&options.command);
    command.args(&options.args);
    env.apply_to(&mut command);

    let status = command
        .status()
        .with_context(|| format!("failed to execute `{}`", options.command.to_string_lossy()))?;
    debug!(%status, "command finished");
    Ok(exit_code(status))
}

fn load_env(options: &RunOptions) -> Result<LoadedEnv> {
    if options.files.is_empty() {
        return Ok(LoadedEnv::default());
    }

    let env = EnvLoader::new()
        .paths(&options.files)
        .inference(options.inference)
        .load()?;
    let report = env.report();
    debug!(
        files = report.files_read,
        vars = env.len(),
        overridden = report.overridden,
        "loaded environment"
    );
    Ok(env)
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    status
        .code()
        .or_else(|| status.signal().map(|signal| 128 + signal))
        .unwrap_or(1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}
