//! Rewrites CSS embedded in tagged template literals.
//!
//! The purpose of this library is to let an external CSS transformer that
//! knows nothing about interpolation syntax process `css`-tagged template
//! blocks found in arbitrary source text. Each `${..}` marker is swapped for
//! a placeholder that parses as valid CSS at its position, the body goes
//! through the transformer, and the original expressions are restored
//! verbatim afterwards, even when the transformer reordered, reformatted or
//! dropped rules.
//!
//! Example:
//! ```rust
//! let mut plugin = template_css::TemplateCss::new(
//!     template_css::Options::default(),
//!     |css: &str| Ok(css.to_string()),
//! )
//! .unwrap();
//!
//! let code = "const s = css`div { color: ${color}; }`;";
//! let rewritten = plugin.transform(code, "src/app.js").unwrap();
//! assert_eq!(rewritten.as_deref(), Some(code));
//! assert_eq!(plugin.transform(code, "src/app.rs").unwrap(), None);
//! ```

pub mod filter;
pub mod interpolate;
pub mod rewrite;
pub mod scanner;

pub use filter::SourceFilter;
pub use interpolate::ExpressionSlot;
pub use rewrite::{rewrite, Error, Result, TransformError};
pub use scanner::{BlockScanner, TaggedBlock};

/// Host-facing configuration.
///
/// Defaults match the conventional plugin setup: JS/TS sources, nothing
/// excluded, a single `css` tag.
#[derive(Debug, Clone)]
pub struct Options {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub tags: Vec<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            include: filter::DEFAULT_INCLUDE
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exclude: Vec::new(),
            tags: vec!["css".to_string()],
        }
    }
}

/// Ordered sequence of CSS sub-transforms, applied first to last.
///
/// Stands in for the plugin list a real CSS processor is configured with. An
/// empty pipeline passes CSS through unchanged.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn FnMut(&str) -> std::result::Result<String, TransformError>>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage<F>(mut self, stage: F) -> Self
    where
        F: FnMut(&str) -> std::result::Result<String, TransformError> + 'static,
    {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn process(&mut self, css: &str) -> std::result::Result<String, TransformError> {
        let mut css = css.to_string();
        for stage in &mut self.stages {
            css = stage(&css)?;
        }
        Ok(css)
    }
}

/// The assembled plugin: inclusion filter plus block rewriting through one
/// transform callback.
pub struct TemplateCss<F> {
    filter: SourceFilter,
    scanner: BlockScanner,
    transform: F,
}

impl<F> TemplateCss<F>
where
    F: FnMut(&str) -> std::result::Result<String, TransformError>,
{
    pub fn new(options: Options, transform: F) -> Result<Self> {
        Ok(Self {
            filter: SourceFilter::new(&options.include, &options.exclude)?,
            scanner: BlockScanner::new(&options.tags),
            transform,
        })
    }

    /// Rewrites one source unit.
    ///
    /// `Ok(None)` means no change: the identifier was filtered out or the
    /// source holds no tagged blocks. No source map is produced.
    pub fn transform(&mut self, code: &str, id: &str) -> Result<Option<String>> {
        if !self.filter.should_process(id) {
            log::debug!("skipping filtered unit {id}");
            return Ok(None);
        }
        rewrite::rewrite(code, &self.scanner, &mut self.transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_options() {
        let options = Options::default();
        assert_eq!(options.include, vec!["**/*.js", "**/*.ts"]);
        assert!(options.exclude.is_empty());
        assert_eq!(options.tags, vec!["css"]);
    }

    #[test]
    fn empty_pipeline_is_identity() {
        let mut pipeline = Pipeline::new();
        assert_eq!(pipeline.process(".a{}").unwrap(), ".a{}");
    }

    #[test]
    fn pipeline_applies_stages_in_order() {
        let mut pipeline = Pipeline::new()
            .stage(|css: &str| Ok(format!("{css}b")))
            .stage(|css: &str| Ok(format!("{css}c")));
        assert_eq!(pipeline.process("a").unwrap(), "abc");
    }

    #[test]
    fn pipeline_stops_on_failing_stage() {
        let mut pipeline = Pipeline::new()
            .stage(|_: &str| Err(TransformError("stage failed".into())))
            .stage(|css: &str| Ok(css.to_string()));
        assert!(pipeline.process(".a{}").is_err());
    }

    #[test]
    fn filtered_unit_is_untouched() {
        let mut plugin =
            TemplateCss::new(Options::default(), |css: &str| Ok(css.to_string())).unwrap();
        let code = "const s = css`div { color: ${c}; }`;";
        assert_eq!(plugin.transform(code, "src/app.css").unwrap(), None);
    }

    #[test]
    fn included_unit_is_rewritten() {
        let mut plugin =
            TemplateCss::new(Options::default(), |css: &str| Ok(css.to_string())).unwrap();
        let code = "const s = css`div { color: ${c}; }`;";
        let rewritten = plugin.transform(code, "src/app.js").unwrap();
        assert_eq!(rewritten.as_deref(), Some(code));
    }
}
