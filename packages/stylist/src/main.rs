#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::{
    io::{Read as _, Write as _},
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use itertools::Itertools;
use serde::Serialize;
use stylist::{
    Config, KtfmtConfig, NpmConfig,
    files::{FileOutcome, Mode, format_files},
};
use stylist_env::{EnvProvider, standard::StandardEnv};
use stylist_ktfmt::{KtfmtLoader, KtfmtStep, Style, java::JavaCliLoader};
use stylist_npm::{NpmPathResolver, NpmrcResolver};
use stylist_step::{LocalRepositoryProvisioner, Provisioner, StepCache};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
#[clap(rename_all = "kebab_case")]
pub enum OutputType {
    Json,
    Raw,
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Config file. Defaults to `stylist.toml` in the working directory when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Format Kotlin sources with ktfmt. Reads stdin and writes stdout when no files are given.
    Ktfmt {
        /// ktfmt version to provision
        #[arg(long = "ktfmt-version")]
        version: Option<String>,

        #[arg(long)]
        style: Option<Style>,

        /// Local Maven repository root
        #[arg(long)]
        repository: Option<PathBuf>,

        #[arg(long)]
        java: Option<PathBuf>,

        /// Report files that would change instead of rewriting them
        #[arg(long)]
        check: bool,

        #[arg(index = 1)]
        files: Vec<PathBuf>,
    },
    /// Show which npm executable and npmrc would be used.
    Npm {
        #[arg(long)]
        executable: Option<PathBuf>,

        #[arg(long)]
        npmrc: Option<PathBuf>,

        #[arg(long = "npmrc-location")]
        npmrc_locations: Vec<PathBuf>,

        #[arg(short, long, value_enum, default_value_t=OutputType::Raw)]
        output: OutputType,
    },
}

#[derive(Debug, Serialize)]
struct NpmResolution {
    executable: PathBuf,
    npmrc: Option<PathBuf>,
    npmrc_length: Option<usize>,
}

fn init_logging(env: &dyn EnvProvider) {
    #[cfg(debug_assertions)]
    const DEFAULT_LOG_LEVEL: &str = "stylist=trace";
    #[cfg(not(debug_assertions))]
    const DEFAULT_LOG_LEVEL: &str = "stylist=info";

    let filter = env.var_or("STYLIST_LOG", &env.var_or("RUST_LOG", DEFAULT_LOG_LEVEL));

    env_logger::Builder::new()
        .parse_filters(&filter)
        .format_timestamp_millis()
        .init();
}

fn main() -> anyhow::Result<ExitCode> {
    let env = StandardEnv::new();
    init_logging(&env);

    let args = Args::parse();
    let cwd = std::env::current_dir()?;

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::discover(&cwd)?,
    };
    log::trace!("config={config:?}");

    match args.cmd {
        Commands::Ktfmt {
            version,
            style,
            repository,
            java,
            check,
            files,
        } => {
            let ktfmt = KtfmtConfig {
                version: version.or(config.ktfmt.version),
                style: style.map(|style| style.to_string()).or(config.ktfmt.style),
                repository: repository.or(config.ktfmt.repository),
                java: java.or(config.ktfmt.java),
            };
            run_ktfmt(&env, &ktfmt, &files, check)
        }
        Commands::Npm {
            executable,
            npmrc,
            npmrc_locations,
            output,
        } => {
            let npm = NpmConfig {
                executable: executable.or(config.npm.executable),
                npmrc: npmrc.or(config.npm.npmrc),
                npmrc_locations: if npmrc_locations.is_empty() {
                    config.npm.npmrc_locations
                } else {
                    npmrc_locations
                },
            };
            run_npm(&env, &cwd, npm, output)
        }
    }
}

fn run_ktfmt(
    env: &StandardEnv,
    config: &KtfmtConfig,
    files: &[PathBuf],
    check: bool,
) -> anyhow::Result<ExitCode> {
    let provisioner: Arc<dyn Provisioner> = Arc::new(match &config.repository {
        Some(root) => LocalRepositoryProvisioner::new(root),
        None => LocalRepositoryProvisioner::from_env(env)?,
    });

    let loader = config.java.as_ref().map_or_else(JavaCliLoader::new, |java| {
        JavaCliLoader::new().java(java)
    });

    let step = StepCache::global().get_or_insert(
        KtfmtStep::builder()
            .version(config.version())
            .style(config.style()?)
            .provisioner(provisioner)
            .loader(Arc::new(loader) as Arc<dyn KtfmtLoader>)
            .build()?,
    );

    if files.is_empty() {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read stdin")?;

        let formatted = step.format(&input)?;
        if check {
            return Ok(if formatted == input {
                ExitCode::SUCCESS
            } else {
                println!("<stdin>");
                ExitCode::FAILURE
            });
        }

        let mut stdout = std::io::stdout().lock();
        stdout.write_all(formatted.as_bytes())?;
        stdout.flush()?;
        return Ok(ExitCode::SUCCESS);
    }

    let mode = if check { Mode::Check } else { Mode::Write };
    let reports = format_files(&step, files, mode);

    let (succeeded, failed): (Vec<_>, Vec<_>) = reports
        .into_iter()
        .partition_map(|report| match report.outcome {
            Ok(outcome) => itertools::Either::Left((report.path, outcome)),
            Err(e) => itertools::Either::Right(e),
        });

    let failures = failed.len();
    for e in failed {
        log::error!("{:#}", anyhow::Error::new(e));
    }

    let changed = succeeded
        .iter()
        .filter(|(_, outcome)| outcome.is_changed())
        .map(|(path, _)| path)
        .sorted()
        .collect_vec();

    if check {
        for path in &changed {
            println!("{}", path.display());
        }
    } else {
        log::info!(
            "Formatted {} of {} file(s)",
            changed.len(),
            succeeded.len() + failures
        );
    }

    let would_change = check
        && succeeded
            .iter()
            .any(|(_, outcome)| *outcome == FileOutcome::WouldFormat);

    Ok(if failures == 0 && !would_change {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_npm(
    env: &StandardEnv,
    cwd: &Path,
    config: NpmConfig,
    output: OutputType,
) -> anyhow::Result<ExitCode> {
    let locations = if config.npmrc_locations.is_empty() {
        NpmrcResolver::default_locations(env, cwd)
    } else {
        config.npmrc_locations
    };

    let resolver = NpmPathResolver::new(config.executable, config.npmrc, locations);

    let resolution = NpmResolution {
        executable: resolver.resolve_npm_executable()?,
        npmrc: resolver.resolve_npmrc_file(),
        npmrc_length: resolver.resolve_npmrc_content()?.map(|content| content.len()),
    };

    match output {
        OutputType::Json => println!("{}", serde_json::to_string(&resolution)?),
        OutputType::Raw => {
            println!("npm: {}", resolution.executable.display());
            match &resolution.npmrc {
                Some(npmrc) => println!("npmrc: {}", npmrc.display()),
                None => println!("npmrc: none"),
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
