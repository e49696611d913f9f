use crate::package::{Dependency, Package};

/// A parsed desc-format entry. Dependency lines that fail to parse are
/// collected in `bad_deps` for the caller to warn about; they never
/// fail the load.
#[derive(Debug, Default)]
pub struct ParsedDesc {
    pub package: Package,
    pub bad_deps: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Name,
    Version,
    Desc,
    Packager,
    Groups,
    Provides,
    Depends,
    Conflicts,
    Replaces,
    Files,
    Unknown,
}

fn section_for(header: &str) -> Section {
    match header {
        "NAME" => Section::Name,
        "VERSION" => Section::Version,
        "DESC" => Section::Desc,
        "PACKAGER" => Section::Packager,
        "GROUPS" => Section::Groups,
        "PROVIDES" => Section::Provides,
        "DEPENDS" => Section::Depends,
        "CONFLICTS" => Section::Conflicts,
        "REPLACES" => Section::Replaces,
        "FILES" => Section::Files,
        _ => Section::Unknown,
    }
}

/// Parse a desc-format document: `%SECTION%` headers, one value per
/// line, sections terminated by a blank line. Unknown sections are
/// skipped; scalar sections keep their first value.
pub fn parse_desc(text: &str) -> ParsedDesc {
    let mut parsed = ParsedDesc::default();
    let mut section = Section::Unknown;

    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            section = Section::Unknown;
            continue;
        }
        if let Some(header) = line.strip_prefix('%').and_then(|rest| rest.strip_suffix('%')) {
            section = section_for(header);
            continue;
        }

        let package = &mut parsed.package;
        match section {
            Section::Name => set_scalar(&mut package.name, line),
            Section::Version => set_scalar(&mut package.version, line),
            Section::Desc => set_scalar(&mut package.description, line),
            Section::Packager => set_scalar(&mut package.packager, line),
            Section::Groups => package.groups.push(line.to_string()),
            Section::Provides => push_dep(&mut package.provides, line, &mut parsed.bad_deps),
            Section::Depends => push_dep(&mut package.depends, line, &mut parsed.bad_deps),
            Section::Conflicts => push_dep(&mut package.conflicts, line, &mut parsed.bad_deps),
            Section::Replaces => push_dep(&mut package.replaces, line, &mut parsed.bad_deps),
            Section::Files => package
                .files
                .get_or_insert_with(Vec::new)
                .push(line.to_string()),
            Section::Unknown => {}
        }
    }

    parsed
}

/// Parse a files-list document, keeping only the `%FILES%` entries.
pub fn parse_files(text: &str) -> Vec<String> {
    parse_desc(text).package.files.unwrap_or_default()
}

fn set_scalar(slot: &mut Option<String>, value: &str) {
    if slot.is_none() {
        *slot = Some(value.to_string());
    }
}

fn push_dep(deps: &mut Vec<Dependency>, line: &str, bad: &mut Vec<String>) {
    match line.parse::<Dependency>() {
        Ok(dep) => deps.push(dep),
        Err(_) => bad.push(line.to_string()),
    }
}
