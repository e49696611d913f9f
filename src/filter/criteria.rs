use super::matcher::MatchMode;
use std::collections::BTreeMap;

/// Filterable record fields.
///
/// Declaration order is the pipeline's fixed processing order; the
/// derived `Ord` is what keeps [`Criteria`] iteration stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    Repo,
    Name,
    Description,
    Packager,
    Group,
    OwnsFile,
    Provides,
    Depends,
    Conflicts,
    Replaces,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Repo => "repo",
            Field::Name => "name",
            Field::Description => "description",
            Field::Packager => "packager",
            Field::Group => "group",
            Field::OwnsFile => "owns-file",
            Field::Provides => "provides",
            Field::Depends => "depends",
            Field::Conflicts => "conflicts",
            Field::Replaces => "replaces",
        }
    }
}

/// How matches from different active fields combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CombineMode {
    /// Sequential intersection: a record must match every active field.
    #[default]
    AllFieldsMustMatch,
    /// Union: a record may match any active field.
    AnyFieldMayMatch,
}

/// The full set of active field terms plus the global modifiers for one
/// filter invocation. Built once from user input, immutable afterwards.
#[derive(Debug, Clone, Default)]
pub struct Criteria {
    terms: BTreeMap<Field, Vec<String>>,
    pub match_mode: MatchMode,
    pub invert: bool,
    pub combine: CombineMode,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append terms for a field. Terms for the same field OR together;
    /// appending nothing leaves the field inactive.
    pub fn with_terms<I, S>(mut self, field: Field, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = terms.into_iter().map(Into::into).collect();
        if !values.is_empty() {
            self.terms.entry(field).or_default().extend(values);
        }
        self
    }

    pub fn match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    pub fn invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    pub fn combine(mut self, combine: CombineMode) -> Self {
        self.combine = combine;
        self
    }

    /// Active fields with their terms, in the fixed processing order.
    pub fn active_fields(&self) -> impl Iterator<Item = (Field, &[String])> {
        self.terms.iter().map(|(field, terms)| (*field, terms.as_slice()))
    }

    /// True when no field is active: the identity filter.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_iterate_in_processing_order() {
        let criteria = Criteria::new()
            .with_terms(Field::Depends, ["glibc"])
            .with_terms(Field::Name, ["bash"])
            .with_terms(Field::Repo, ["core"]);

        let order: Vec<Field> = criteria.active_fields().map(|(f, _)| f).collect();
        assert_eq!(order, vec![Field::Repo, Field::Name, Field::Depends]);
    }

    #[test]
    fn repeated_terms_accumulate() {
        let criteria = Criteria::new()
            .with_terms(Field::Name, ["bash"])
            .with_terms(Field::Name, ["zsh"]);

        let (_, terms) = criteria.active_fields().next().unwrap();
        assert_eq!(terms, ["bash", "zsh"]);
    }

    #[test]
    fn empty_term_list_keeps_field_inactive() {
        let criteria = Criteria::new().with_terms(Field::Name, Vec::<String>::new());
        assert!(criteria.is_empty());
    }
}
