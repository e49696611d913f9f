//! Package matching and filtering engine.
//!
//! A filter invocation takes an ordered sequence of package records and
//! a [`Criteria`] value describing what to keep:
//!
//! ```text
//! --name sh --repo core     different fields combine with AND
//! --name bash --name zsh    same-field terms combine with OR
//! --invert                  keep the records that did NOT match
//! --any                     OR fields instead of AND
//! ```
//!
//! Matching is case-insensitive substring by default; `--exact` and
//! `--regex` switch the comparison rule globally. Dependency fields
//! (provides/depends/conflicts/replaces) compare parsed specifiers by
//! identical operator and version, and `--owns-file` compares
//! root-relative paths against each record's file list.
//!
//! The engine performs no I/O and never mutates its input; a malformed
//! regex or dependency term fails the whole invocation before any
//! record is examined.

pub mod criteria;
pub mod error;
pub mod matcher;
pub mod pipeline;

pub use criteria::{CombineMode, Criteria, Field};
pub use error::FilterError;
pub use matcher::{FileMatcher, MatchMode, StringMatcher};
pub use pipeline::filter_packages;
