use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Comparison operator carried by a dependency specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepOp {
    /// No version constraint.
    #[default]
    Any,
    Less,
    LessEq,
    Equal,
    GreaterEq,
    Greater,
}

impl DepOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepOp::Any => "",
            DepOp::Less => "<",
            DepOp::LessEq => "<=",
            DepOp::Equal => "=",
            DepOp::GreaterEq => ">=",
            DepOp::Greater => ">",
        }
    }
}

/// A dependency specifier: a package name with an optional version
/// constraint, e.g. `glibc`, `glibc=2.30`, `glibc>=2.30`.
///
/// Name comparison is byte-for-byte and case-sensitive. Version
/// comparison throughout this crate is string equality, never semantic
/// ordering: `foo>=2` and `foo>=1` are simply different specifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub name: String,
    pub op: DepOp,
    pub version: Option<String>,
}

impl Dependency {
    /// Specifier with a bare name and no version constraint.
    pub fn unversioned(name: impl Into<String>) -> Self {
        Dependency {
            name: name.into(),
            op: DepOp::Any,
            version: None,
        }
    }
}

#[derive(Debug, Error)]
#[error("invalid dependency '{0}'")]
pub struct InvalidDependency(pub String);

impl FromStr for Dependency {
    type Err = InvalidDependency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(idx) = s.find(['<', '>', '=']) else {
            if s.is_empty() {
                return Err(InvalidDependency(s.to_string()));
            }
            return Ok(Dependency::unversioned(s));
        };

        let (name, rest) = s.split_at(idx);
        let (op, version) = if let Some(v) = rest.strip_prefix("<=") {
            (DepOp::LessEq, v)
        } else if let Some(v) = rest.strip_prefix(">=") {
            (DepOp::GreaterEq, v)
        } else if let Some(v) = rest.strip_prefix('<') {
            (DepOp::Less, v)
        } else if let Some(v) = rest.strip_prefix('>') {
            (DepOp::Greater, v)
        } else if let Some(v) = rest.strip_prefix('=') {
            (DepOp::Equal, v)
        } else {
            return Err(InvalidDependency(s.to_string()));
        };

        if name.is_empty() || version.is_empty() {
            return Err(InvalidDependency(s.to_string()));
        }

        Ok(Dependency {
            name: name.to_string(),
            op,
            version: Some(version.to_string()),
        })
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}{}{}", self.name, self.op.as_str(), version),
            None => write!(f, "{}", self.name),
        }
    }
}

/// One software-package record, the unit being filtered.
///
/// Records are materialized by the `source` module and never mutated by
/// the filtering engine. Absent scalar fields can never match; an absent
/// `files` list means file ownership was not loaded for this record.
#[derive(Debug, Clone, Default)]
pub struct Package {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub packager: Option<String>,
    /// Name of the originating database (`"local"` for installed
    /// packages), or `None` for cache entries not tied to a repo.
    pub repo: Option<String>,
    /// On-disk origin for cache entries.
    pub path: Option<PathBuf>,
    pub groups: Vec<String>,
    /// Root-relative owned paths; `None` when the list was not loaded.
    pub files: Option<Vec<String>>,
    pub provides: Vec<Dependency>,
    pub depends: Vec<Dependency>,
    pub conflicts: Vec<Dependency>,
    pub replaces: Vec<Dependency>,
}

impl Package {
    /// Stable textual form used for output: `repo/name`, `file://path`
    /// for cache entries, or the bare name. `None` for nameless records.
    pub fn specifier(&self) -> Option<String> {
        let name = self.name.as_deref()?;
        Some(match (&self.repo, &self.path) {
            (Some(repo), _) => format!("{repo}/{name}"),
            (None, Some(path)) => format!("file://{}", path.display()),
            (None, None) => name.to_string(),
        })
    }
}
