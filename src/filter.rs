//! Include/exclude predicate over module identifiers, mirroring the filter
//! conventions of bundler plugin hosts.

use glob::Pattern;

/// Default include set: JS- and TS-suffixed files anywhere in the tree.
pub const DEFAULT_INCLUDE: &[&str] = &["**/*.js", "**/*.ts"];

/// Decides which source units get rewritten at all.
///
/// An identifier passes when it matches no exclude pattern and at least one
/// include pattern; an empty include list admits everything.
#[derive(Debug)]
pub struct SourceFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl SourceFilter {
    pub fn new<S: AsRef<str>>(
        include: &[S],
        exclude: &[S],
    ) -> std::result::Result<Self, glob::PatternError> {
        let compile = |patterns: &[S]| {
            patterns
                .iter()
                .map(|p| Pattern::new(p.as_ref()))
                .collect::<std::result::Result<Vec<_>, _>>()
        };
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    pub fn should_process(&self, id: &str) -> bool {
        let id = strip_virtual_marker(id);
        if self.exclude.iter().any(|p| p.matches(id)) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|p| p.matches(id))
    }
}

/// Bundlers mark synthetic modules with a leading NUL, usually followed by a
/// `scheme:` delimiter (`\0virtual:src/entry.js`). The filter is evaluated
/// against the plain identifier behind the marker.
fn strip_virtual_marker(id: &str) -> &str {
    let Some(rest) = id.strip_prefix('\0') else {
        return id;
    };
    match rest.split_once(':') {
        Some((scheme, tail))
            if !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') =>
        {
            tail
        }
        _ => rest,
    }
}
