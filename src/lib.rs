pub mod cli;
pub mod config;
pub mod filter;
pub mod package;
pub mod source;

use anyhow::{Context, bail};
use std::io::{self, BufWriter, IsTerminal, Write};

pub use cli::{Cli, ColorMode, cli_parse};
pub use config::SiftConfig;
pub use filter::{
    CombineMode, Criteria, Field, FilterError, MatchMode, filter_packages,
};
pub use package::{DepOp, Dependency, Package};

/// Root prefix stripped from --owns-file terms, normalized to end with
/// a separator so stripping yields a root-relative path.
fn root_prefix(config: &SiftConfig) -> String {
    let mut root = config.root.display().to_string();
    if !root.ends_with('/') {
        root.push('/');
    }
    root
}

fn gather_packages(cli: &Cli, config: &SiftConfig, want_files: bool) -> anyhow::Result<Vec<Package>> {
    let mut packages = Vec::new();

    // Default to installed plus sync packages when no source is named.
    let any_source = cli.local || cli.sync || cli.cache;
    let (local, sync) = if any_source {
        (cli.local, cli.sync)
    } else {
        (true, true)
    };

    if local {
        packages.extend(
            source::load_local(&config.db_path, want_files)
                .context("Failed to load local database")?,
        );
    }
    if sync {
        packages.extend(
            source::load_sync(&config.db_path, &config.repos, want_files)
                .context("Failed to load sync databases")?,
        );
    }
    if cli.cache {
        packages.extend(source::load_cache(&config.cache_dirs, want_files));
    }
    Ok(packages)
}

/// Pool used to resolve piped pkgspecs: everything the databases know.
fn gather_spec_pool(config: &SiftConfig, want_files: bool) -> anyhow::Result<Vec<Package>> {
    let mut pool = source::load_local(&config.db_path, want_files)
        .context("Failed to load local database")?;
    pool.extend(
        source::load_sync(&config.db_path, &config.repos, want_files)
            .context("Failed to load sync databases")?,
    );
    Ok(pool)
}

pub fn run() -> anyhow::Result<()> {
    let cli = cli_parse();

    // Set up color handling based on user preference
    match cli.color {
        ColorMode::Always => unsafe {
            std::env::set_var("CLICOLOR_FORCE", "1");
        },
        ColorMode::Never => unsafe {
            std::env::set_var("NO_COLOR", "1");
        },
        ColorMode::Auto => {}
    }

    let mut config =
        config::load_config(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(dbpath) = &cli.dbpath {
        config.db_path = dbpath.clone();
    }
    if let Some(root) = &cli.root {
        config.root = root.clone();
    }

    let criteria = cli.criteria();
    let sep = cli.separator();
    let want_files = criteria
        .active_fields()
        .any(|(field, _)| field == Field::OwnsFile);
    let root = root_prefix(&config);
    let piped = !io::stdin().is_terminal();

    if cli.verbose > 0 {
        eprintln!("Verbosity level: {}", cli.verbose);
        eprintln!("Database path: {}", config.db_path.display());
        eprintln!("Root: {root}");
        eprintln!("Match mode: {:?}", criteria.match_mode);
        eprintln!("Input: {}", if piped { "piped pkgspecs" } else { "databases" });
        if let Some(config_path) = &cli.config {
            eprintln!("Config file: {}", config_path.display());
        }
    }

    let pool: Vec<Package>;
    let haystack: Vec<&Package>;
    if piped {
        if cli.local || cli.sync || cli.cache {
            bail!("--local, --sync, and --cache cannot be used as filters for piped input");
        }
        pool = gather_spec_pool(&config, want_files)?;
        haystack = source::resolve_specs(io::stdin().lock(), sep, &pool)
            .context("Failed to read pkgspecs from stdin")?;
    } else {
        pool = gather_packages(&cli, &config, want_files)?;
        haystack = pool.iter().collect();
    }

    let matches = filter_packages(&haystack, &criteria, &root)?;

    if cli.verbose > 0 {
        eprintln!("Matched {} of {} packages", matches.len(), haystack.len());
    }

    let stdout = io::stdout().lock();
    let mut out = BufWriter::new(stdout);
    for pkg in matches {
        match pkg.specifier() {
            Some(spec) => {
                out.write_all(spec.as_bytes())
                    .and_then(|_| out.write_all(&[sep]))
                    .context("Failed to write output")?;
            }
            None => source::warn("skipping record without a name"),
        }
    }
    out.flush().context("Failed to write output")?;

    Ok(())
}
