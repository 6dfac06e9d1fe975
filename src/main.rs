use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pydist::config::RuntimeConfig;
use pydist::control::{self, ControlError};
use pydist::dist::{DependencyCatalog, DependencyResolver, DpkgQuery, validate};
use pydist::version::{RequestSpec, Version, parse_range, parse_request, resolve_request};

#[derive(Parser)]
#[command(name = "pydist")]
#[command(version, about = "Runtime version and dependency resolution for packaging")]
struct Cli {
    /// Print bare X.Y numbers instead of pythonX.Y package names
    #[arg(short = 's', long, global = true)]
    short: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the default runtime version
    Default,
    /// Print the supported runtime versions
    Supported,
    /// Print the installed supported runtime versions
    Installed,
    /// Print the versions requested by a version expression or control file
    Requested {
        /// A qualifier expression (`all`, `current`, `>= 2.6`, …) or the
        /// path of a control file
        value: String,
        /// Restrict the result to installed versions
        #[arg(long)]
        installed_only: bool,
        /// Order for a dependency list: default version first
        #[arg(long)]
        debsort: bool,
    },
    /// Resolve one requirement to a system package
    Resolve {
        /// Upstream requirement, e.g. `Mako >= 0.2`
        requirement: String,
        /// Interpreter version context
        #[arg(long, value_name = "X.Y")]
        python: Option<Version>,
    },
    /// Resolve every requirement in an egg-info requires file
    Depends { path: PathBuf },
    /// Lint an override file
    Validate { path: PathBuf },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = RuntimeConfig::load().context("cannot load the runtime inventory")?;

    match cli.command {
        Command::Default => print_versions(&[config.default], cli.short),
        Command::Supported => {
            print_versions(&config.supported.iter().collect::<Vec<_>>(), cli.short)
        }
        Command::Installed => {
            print_versions(&config.installed().iter().collect::<Vec<_>>(), cli.short)
        }
        Command::Requested {
            value,
            installed_only,
            debsort,
        } => {
            let spec = requested_spec(&value)?;
            let installed = installed_only.then(|| config.installed());
            let versions = resolve_request(&spec, &config.supported, installed.as_ref(), config.default)
                .with_context(|| format!("cannot resolve version request {value:?}"))?;
            let ordered = if debsort {
                versions.debsorted(config.default)
            } else {
                versions.iter().collect()
            };
            print_versions(&ordered, cli.short);
        }
        Command::Resolve { requirement, python } => {
            let resolver = build_resolver()?;
            println!("{}", resolver.resolve(&requirement, python)?);
        }
        Command::Depends { path } => {
            let resolver = build_resolver()?;
            for dependency in resolver.resolve_requires_file(&path)? {
                println!("{dependency}");
            }
        }
        Command::Validate { path } => {
            if !validate(&path)? {
                bail!("invalid override records in {}", path.display());
            }
        }
    }
    Ok(())
}

fn build_resolver() -> anyhow::Result<DependencyResolver<DpkgQuery>> {
    let catalog = DependencyCatalog::load_default().context("cannot load the override catalog")?;
    Ok(DependencyResolver::new(catalog, DpkgQuery::new()))
}

/// A `requested` argument is either an expression or a control file. For a
/// file: the source version attribute first, then the sibling fallback
/// file, then every supported version.
fn requested_spec(value: &str) -> anyhow::Result<RequestSpec> {
    let path = Path::new(value);
    if !path.is_file() {
        return Ok(parse_request(value)?);
    }

    match control::extract_version_attribute(path, "Source") {
        Ok(expression) => Ok(parse_request(&expression)?),
        Err(ControlError::MissingAttribute { attribute, .. }) => {
            let fallback = path.with_file_name("pyversions");
            eprintln!(
                "missing {attribute}, falling back to {}",
                fallback.display()
            );
            match control::read_fallback_range(&fallback) {
                Ok(expression) => Ok(RequestSpec::from(parse_range(&expression)?)),
                Err(ControlError::Io { .. }) => {
                    eprintln!(
                        "missing {}, falling back to all supported versions",
                        fallback.display()
                    );
                    Ok(RequestSpec::All)
                }
                Err(err) => Err(err.into()),
            }
        }
        Err(err) => Err(err.into()),
    }
}

fn print_versions(versions: &[Version], short: bool) {
    let rendered: Vec<String> = versions
        .iter()
        .map(|v| if short { v.to_string() } else { v.package_name() })
        .collect();
    println!("{}", rendered.join(" "));
}
