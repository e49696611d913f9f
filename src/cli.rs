use crate::filter::{CombineMode, Criteria, Field, MatchMode};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// Filter packages against per-field search criteria
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Set an alternate configuration file
    #[arg(long, value_name = "PATH", env = "PKGSIFT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Set an alternate database location
    #[arg(long, value_name = "PATH")]
    pub dbpath: Option<PathBuf>,

    /// Set an alternate filesystem root
    #[arg(long, value_name = "PATH")]
    pub root: Option<PathBuf>,

    /// Use SEP's first byte to separate records (NUL if SEP is omitted)
    #[arg(long, value_name = "SEP", num_args = 0..=1, require_equals = true, default_missing_value = "")]
    pub null: Option<String>,

    /// Search installed packages
    #[arg(short = 'Q', long)]
    pub local: bool,

    /// Search packages in all sync repositories
    #[arg(short = 'S', long)]
    pub sync: bool,

    /// Search packages in cache directories
    #[arg(long)]
    pub cache: bool,

    /// Display packages which DO NOT match the search criteria
    #[arg(long)]
    pub invert: bool,

    /// Match fields by full case-insensitive equality
    #[arg(long)]
    pub exact: bool,

    /// Treat terms as case-insensitive regular expressions
    #[arg(long, conflicts_with = "exact")]
    pub regex: bool,

    /// OR the active fields instead of AND
    #[arg(long)]
    pub any: bool,

    /// Print diagnostic information (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// When to colorize warnings
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Search packages in repo NAME (field options given multiple times OR together)
    #[arg(long, value_name = "NAME")]
    pub repo: Vec<String>,

    /// Search package names
    #[arg(long, value_name = "NAME")]
    pub name: Vec<String>,

    /// Search package descriptions
    #[arg(long, value_name = "DESC")]
    pub description: Vec<String>,

    /// Search package packagers
    #[arg(long, value_name = "NAME")]
    pub packager: Vec<String>,

    /// Search packages in group NAME
    #[arg(long, value_name = "NAME")]
    pub group: Vec<String>,

    /// Search packages that own PATH
    #[arg(long = "owns-file", value_name = "PATH")]
    pub owns_file: Vec<String>,

    /// Search package provides
    #[arg(long, value_name = "DEP")]
    pub provides: Vec<String>,

    /// Search package dependencies
    #[arg(long, value_name = "DEP")]
    pub depends: Vec<String>,

    /// Search package conflicts
    #[arg(long, value_name = "DEP")]
    pub conflicts: Vec<String>,

    /// Search package replaces
    #[arg(long, value_name = "DEP")]
    pub replaces: Vec<String>,
}

impl Cli {
    pub fn match_mode(&self) -> MatchMode {
        if self.regex {
            MatchMode::Regex
        } else if self.exact {
            MatchMode::Exact
        } else {
            MatchMode::Substring
        }
    }

    pub fn combine_mode(&self) -> CombineMode {
        if self.any {
            CombineMode::AnyFieldMayMatch
        } else {
            CombineMode::AllFieldsMustMatch
        }
    }

    /// Collect the field flags and modifiers into one immutable
    /// criteria value.
    pub fn criteria(&self) -> Criteria {
        Criteria::new()
            .with_terms(Field::Repo, self.repo.iter().cloned())
            .with_terms(Field::Name, self.name.iter().cloned())
            .with_terms(Field::Description, self.description.iter().cloned())
            .with_terms(Field::Packager, self.packager.iter().cloned())
            .with_terms(Field::Group, self.group.iter().cloned())
            .with_terms(Field::OwnsFile, self.owns_file.iter().cloned())
            .with_terms(Field::Provides, self.provides.iter().cloned())
            .with_terms(Field::Depends, self.depends.iter().cloned())
            .with_terms(Field::Conflicts, self.conflicts.iter().cloned())
            .with_terms(Field::Replaces, self.replaces.iter().cloned())
            .match_mode(self.match_mode())
            .invert(self.invert)
            .combine(self.combine_mode())
    }

    /// Record separator for both input parsing and output emission:
    /// newline unless --null was given, NUL for a bare --null, else the
    /// first byte of its value.
    pub fn separator(&self) -> u8 {
        match &self.null {
            None => b'\n',
            Some(sep) => sep.bytes().next().unwrap_or(b'\0'),
        }
    }
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}
