use super::criteria::{CombineMode, Criteria, Field};
use super::error::FilterError;
use super::matcher::{FileMatcher, MatchMode, StringMatcher};
use crate::package::{Dependency, Package};

type ScalarAccessor = fn(&Package) -> Option<&str>;
type ListAccessor = fn(&Package) -> &[String];
type DepsAccessor = fn(&Package) -> &[Dependency];

/// One active field, compiled: the accessor paired with the field's
/// term matchers. A record matches the field when any matcher accepts.
enum FieldTest {
    Scalar {
        get: ScalarAccessor,
        matchers: Vec<StringMatcher>,
    },
    List {
        get: ListAccessor,
        matchers: Vec<StringMatcher>,
    },
    Deps {
        get: DepsAccessor,
        needles: Vec<Dependency>,
    },
    Files {
        matchers: Vec<FileMatcher>,
    },
}

/// Compile every active field's terms up front so that any bad regex or
/// dependency term fails the run before a single record is examined.
fn compile(criteria: &Criteria, root: &str) -> Result<Vec<FieldTest>, FilterError> {
    let mode = criteria.match_mode;
    let mut tests = Vec::new();

    for (field, terms) in criteria.active_fields() {
        let test = match field {
            Field::Repo => FieldTest::Scalar {
                get: |pkg| pkg.repo.as_deref(),
                matchers: string_matchers(mode, terms)?,
            },
            Field::Name => FieldTest::Scalar {
                get: |pkg| pkg.name.as_deref(),
                matchers: string_matchers(mode, terms)?,
            },
            Field::Description => FieldTest::Scalar {
                get: |pkg| pkg.description.as_deref(),
                matchers: string_matchers(mode, terms)?,
            },
            Field::Packager => FieldTest::Scalar {
                get: |pkg| pkg.packager.as_deref(),
                matchers: string_matchers(mode, terms)?,
            },
            Field::Group => FieldTest::List {
                get: |pkg| &pkg.groups,
                matchers: string_matchers(mode, terms)?,
            },
            Field::OwnsFile => FieldTest::Files {
                matchers: terms
                    .iter()
                    .map(|term| FileMatcher::compile(mode, term, root))
                    .collect::<Result<_, _>>()?,
            },
            Field::Provides => FieldTest::Deps {
                get: |pkg| &pkg.provides,
                needles: dep_needles(terms)?,
            },
            Field::Depends => FieldTest::Deps {
                get: |pkg| &pkg.depends,
                needles: dep_needles(terms)?,
            },
            Field::Conflicts => FieldTest::Deps {
                get: |pkg| &pkg.conflicts,
                needles: dep_needles(terms)?,
            },
            Field::Replaces => FieldTest::Deps {
                get: |pkg| &pkg.replaces,
                needles: dep_needles(terms)?,
            },
        };
        tests.push(test);
    }

    Ok(tests)
}

fn string_matchers(mode: MatchMode, terms: &[String]) -> Result<Vec<StringMatcher>, FilterError> {
    terms
        .iter()
        .map(|term| StringMatcher::compile(mode, term))
        .collect()
}

fn dep_needles(terms: &[String]) -> Result<Vec<Dependency>, FilterError> {
    terms
        .iter()
        .map(|term| term.parse::<Dependency>().map_err(FilterError::from))
        .collect()
}

/// Specifier equality check, not range satisfaction: a recorded
/// `foo>=2` does not satisfy the needle `foo>=1`. An unversioned needle
/// matches any entry of that name unless the run is in exact mode.
fn dep_matches(dep: &Dependency, needle: &Dependency, exact: bool) -> bool {
    if dep.name != needle.name {
        return false;
    }
    if needle.version.is_none() && !exact {
        return true;
    }
    dep.op == needle.op && dep.version == needle.version
}

fn field_matches(test: &FieldTest, pkg: &Package, exact: bool) -> bool {
    match test {
        FieldTest::Scalar { get, matchers } => {
            matchers.iter().any(|m| m.matches_opt(get(pkg)))
        }
        FieldTest::List { get, matchers } => matchers
            .iter()
            .any(|m| get(pkg).iter().any(|value| m.matches(value))),
        FieldTest::Deps { get, needles } => needles
            .iter()
            .any(|needle| get(pkg).iter().any(|dep| dep_matches(dep, needle, exact))),
        FieldTest::Files { matchers } => pkg
            .files
            .as_deref()
            .is_some_and(|files| matchers.iter().any(|m| files.iter().any(|f| m.matches(f)))),
    }
}

/// Filter `packages` against `criteria`.
///
/// Fields are processed in the fixed [`Field`] order. With the default
/// combine mode each field narrows the selection (AND across fields);
/// with [`CombineMode::AnyFieldMayMatch`] every field is evaluated
/// against the original input and the matches union. Terms within a
/// field always OR. `invert` complements the selection against the
/// original input.
///
/// Selection is tracked per input position, so duplicate-valued but
/// distinct records stay independent and input order is preserved. With
/// no active field the input passes through unchanged (before
/// inversion). `root` is the filesystem root prefix stripped from
/// file-ownership terms.
pub fn filter_packages<'a>(
    packages: &[&'a Package],
    criteria: &Criteria,
    root: &str,
) -> Result<Vec<&'a Package>, FilterError> {
    let tests = compile(criteria, root)?;
    let exact = criteria.match_mode == MatchMode::Exact;

    let mut selected = match criteria.combine {
        CombineMode::AllFieldsMustMatch => {
            let mut selected = vec![true; packages.len()];
            for test in &tests {
                for (slot, pkg) in selected.iter_mut().zip(packages) {
                    if *slot {
                        *slot = field_matches(test, pkg, exact);
                    }
                }
            }
            selected
        }
        CombineMode::AnyFieldMayMatch => {
            // No active field still selects everything.
            let mut selected = vec![tests.is_empty(); packages.len()];
            for test in &tests {
                for (slot, pkg) in selected.iter_mut().zip(packages) {
                    if !*slot {
                        *slot = field_matches(test, pkg, exact);
                    }
                }
            }
            selected
        }
    };

    if criteria.invert {
        for slot in &mut selected {
            *slot = !*slot;
        }
    }

    Ok(packages
        .iter()
        .zip(&selected)
        .filter_map(|(pkg, &keep)| keep.then_some(*pkg))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::DepOp;

    fn named(name: &str) -> Package {
        Package {
            name: Some(name.to_string()),
            ..Package::default()
        }
    }

    fn dep(spec: &str) -> Dependency {
        spec.parse().unwrap()
    }

    fn names(matched: &[&Package]) -> Vec<String> {
        matched
            .iter()
            .map(|pkg| pkg.name.clone().unwrap_or_default())
            .collect()
    }

    fn run<'a>(packages: &[&'a Package], criteria: &Criteria) -> Vec<&'a Package> {
        filter_packages(packages, criteria, "/").unwrap()
    }

    #[test]
    fn substring_matches_both_shells_exact_matches_neither() {
        let bash = named("bash");
        let zsh = named("zsh");
        let packages = [&bash, &zsh];

        let criteria = Criteria::new().with_terms(Field::Name, ["sh"]);
        assert_eq!(names(&run(&packages, &criteria)), ["bash", "zsh"]);

        let criteria = criteria.match_mode(MatchMode::Exact);
        assert!(run(&packages, &criteria).is_empty());
    }

    #[test]
    fn group_membership_and_inversion_partition_the_input() {
        let mut a = named("a");
        a.groups = vec!["base".to_string(), "devel".to_string()];
        let mut b = named("b");
        b.groups = vec!["base".to_string()];
        let packages = [&a, &b];

        let criteria = Criteria::new().with_terms(Field::Group, ["devel"]);
        assert_eq!(names(&run(&packages, &criteria)), ["a"]);

        let inverted = criteria.clone().invert(true);
        assert_eq!(names(&run(&packages, &inverted)), ["b"]);
    }

    #[test]
    fn dependency_terms_require_identical_operator_and_version() {
        let mut a = named("a");
        a.depends = vec![dep("glibc>=2.30")];
        let mut b = named("b");
        b.depends = vec![dep("glibc>=2.28")];
        let packages = [&a, &b];

        let criteria = Criteria::new().with_terms(Field::Depends, ["glibc>=2.30"]);
        assert_eq!(names(&run(&packages, &criteria)), ["a"]);
    }

    #[test]
    fn unversioned_dependency_term_matches_any_version() {
        let mut a = named("a");
        a.depends = vec![dep("glibc>=2.30")];
        let packages = [&a];

        let criteria = Criteria::new().with_terms(Field::Depends, ["glibc"]);
        assert_eq!(names(&run(&packages, &criteria)), ["a"]);

        // Exact mode demands an identical specifier, so the bare name
        // no longer matches the versioned entry.
        let exact = criteria.match_mode(MatchMode::Exact);
        assert!(run(&packages, &exact).is_empty());
    }

    #[test]
    fn dependency_name_comparison_is_case_sensitive() {
        let mut a = named("a");
        a.provides = vec![dep("OpenSSL")];
        let packages = [&a];

        let criteria = Criteria::new().with_terms(Field::Provides, ["openssl"]);
        assert!(run(&packages, &criteria).is_empty());
    }

    #[test]
    fn two_fields_intersect_by_default() {
        let mut foo_core = named("foo");
        foo_core.repo = Some("core".to_string());
        let mut foo_extra = named("foo-tools");
        foo_extra.repo = Some("extra".to_string());
        let mut bar_core = named("bar");
        bar_core.repo = Some("core".to_string());
        let packages = [&foo_core, &foo_extra, &bar_core];

        let criteria = Criteria::new()
            .with_terms(Field::Name, ["foo"])
            .with_terms(Field::Repo, ["core"])
            .match_mode(MatchMode::Substring);
        assert_eq!(names(&run(&packages, &criteria)), ["foo"]);
    }

    #[test]
    fn any_mode_unions_fields_against_the_original_input() {
        let mut foo = named("foo");
        foo.repo = Some("extra".to_string());
        let mut bar = named("bar");
        bar.repo = Some("core".to_string());
        let baz = named("baz");
        let packages = [&foo, &bar, &baz];

        let criteria = Criteria::new()
            .with_terms(Field::Name, ["foo"])
            .with_terms(Field::Repo, ["core"])
            .combine(CombineMode::AnyFieldMayMatch);
        assert_eq!(names(&run(&packages, &criteria)), ["foo", "bar"]);
    }

    #[test]
    fn terms_within_a_field_union() {
        let bash = named("bash");
        let zsh = named("zsh");
        let fish = named("fish");
        let packages = [&bash, &zsh, &fish];

        let criteria = Criteria::new()
            .with_terms(Field::Name, ["bash", "zsh"])
            .match_mode(MatchMode::Exact);
        assert_eq!(names(&run(&packages, &criteria)), ["bash", "zsh"]);
    }

    #[test]
    fn no_active_fields_is_the_identity_filter() {
        let a = named("a");
        let b = named("b");
        let packages = [&a, &b];

        assert_eq!(names(&run(&packages, &Criteria::new())), ["a", "b"]);
        assert_eq!(
            names(&run(
                &packages,
                &Criteria::new().combine(CombineMode::AnyFieldMayMatch)
            )),
            ["a", "b"]
        );
        assert!(run(&packages, &Criteria::new().invert(true)).is_empty());
    }

    #[test]
    fn duplicate_valued_records_are_tracked_by_identity() {
        let first = named("bash");
        let second = named("bash");
        let packages = [&first, &second];

        let matched = run(&packages, &Criteria::new().with_terms(Field::Name, ["bash"]));
        assert_eq!(matched.len(), 2);
        assert!(std::ptr::eq(matched[0], packages[0]));
        assert!(std::ptr::eq(matched[1], packages[1]));
    }

    #[test]
    fn file_ownership_matches_only_loaded_lists() {
        let mut owns = named("coreutils");
        owns.files = Some(vec!["usr/bin/ls".to_string()]);
        let mut unloaded = named("mystery");
        unloaded.files = None;
        let packages = [&owns, &unloaded];

        let criteria = Criteria::new().with_terms(Field::OwnsFile, ["/usr/bin/ls"]);
        assert_eq!(names(&run(&packages, &criteria)), ["coreutils"]);
    }

    #[test]
    fn file_ownership_exact_membership_after_root_strip() {
        let mut pkg = named("coreutils");
        pkg.files = Some(vec!["usr/bin/ls".to_string(), "usr/bin/dir".to_string()]);
        let packages = [&pkg];

        let criteria = Criteria::new()
            .with_terms(Field::OwnsFile, ["/usr/bin/ls"])
            .match_mode(MatchMode::Exact);
        assert_eq!(names(&run(&packages, &criteria)), ["coreutils"]);

        let criteria = Criteria::new()
            .with_terms(Field::OwnsFile, ["/usr/bin/l"])
            .match_mode(MatchMode::Exact);
        assert!(run(&packages, &criteria).is_empty());
    }

    #[test]
    fn absent_scalar_fields_never_match() {
        let anonymous = Package::default();
        let packages = [&anonymous];

        let criteria = Criteria::new().with_terms(Field::Description, [""]);
        assert!(run(&packages, &criteria).is_empty());
    }

    #[test]
    fn bad_regex_in_a_later_field_fails_the_whole_run() {
        let bash = named("bash");
        let packages = [&bash];

        let criteria = Criteria::new()
            .with_terms(Field::Name, ["bash"])
            .with_terms(Field::Replaces, ["x"])
            .with_terms(Field::OwnsFile, ["["])
            .match_mode(MatchMode::Regex);
        let err = filter_packages(&packages, &criteria, "/").unwrap_err();
        assert!(matches!(err, FilterError::InvalidRegex { .. }));
    }

    #[test]
    fn bad_dependency_term_fails_the_whole_run() {
        let bash = named("bash");
        let packages = [&bash];

        let criteria = Criteria::new().with_terms(Field::Depends, ["glibc>="]);
        let err = filter_packages(&packages, &criteria, "/").unwrap_err();
        assert!(matches!(err, FilterError::InvalidDependency(_)));
    }

    #[test]
    fn exact_mode_with_unversioned_entries_matches_unversioned_term() {
        let mut pkg = named("a");
        pkg.provides = vec![Dependency::unversioned("libfoo")];
        let packages = [&pkg];

        let criteria = Criteria::new()
            .with_terms(Field::Provides, ["libfoo"])
            .match_mode(MatchMode::Exact);
        assert_eq!(names(&run(&packages, &criteria)), ["a"]);

        assert_eq!(packages[0].provides[0].op, DepOp::Any);
    }
}
