//! Orchestrates one source unit through substitute, external transform and
//! restore, then splices every rewritten block back over its original span.

use thiserror::Error;

use crate::interpolate::{self, ExpressionSlot};
use crate::scanner::BlockScanner;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure reported by the external CSS transformer for one block body.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct TransformError(pub String);

#[derive(Error, Debug)]
pub enum Error {
    /// The external CSS transformer rejected a substituted block body.
    /// Fatal for the whole source unit; no replacement is applied.
    #[error("css transform failed for `{tag}` block: {source}")]
    Transform {
        tag: String,
        source: TransformError,
    },
    #[error("invalid filter pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

struct BlockResult<'a> {
    tag: &'a str,
    full_match: &'a str,
    processed: String,
    slots: Vec<ExpressionSlot>,
}

/// Rewrites every tagged block of `source` through `transform`.
///
/// Returns `Ok(None)` when the scanner finds no blocks, so callers can skip
/// downstream work. Each block is independent: substitution counters restart
/// per block and transforms see only the substituted body, with no file
/// context attached.
///
/// Every block is run even after one fails, but any failure makes the whole
/// unit fail and nothing is spliced back. Replacements are applied by exact
/// full-match text once all blocks have resolved, which keeps the
/// block-to-output correspondence whatever order results arrive in.
pub fn rewrite<F>(source: &str, scanner: &BlockScanner, mut transform: F) -> Result<Option<String>>
where
    F: FnMut(&str) -> std::result::Result<String, TransformError>,
{
    let mut results = Vec::new();
    let mut first_error = None;
    for block in scanner.scan(source) {
        let (substituted, slots) = interpolate::substitute(block.body);
        match transform(&substituted) {
            Ok(processed) => results.push(BlockResult {
                tag: block.tag,
                full_match: block.full_match,
                processed,
                slots,
            }),
            Err(source) => {
                log::error!("css transform failed for `{}` block: {source}", block.tag);
                if first_error.is_none() {
                    first_error = Some(Error::Transform {
                        tag: block.tag.to_string(),
                        source,
                    });
                }
            }
        }
    }
    if let Some(error) = first_error {
        return Err(error);
    }
    if results.is_empty() {
        return Ok(None);
    }
    log::debug!("rewriting {} tagged block(s)", results.len());

    let mut code = String::from(source);
    for result in results {
        let restored = interpolate::restore(&result.processed, &result.slots);
        let rebuilt = format!("{}`{}`", result.tag, restored);
        code = code.replacen(result.full_match, &rebuilt, 1);
    }
    Ok(Some(code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn identity(css: &str) -> std::result::Result<String, TransformError> {
        Ok(css.to_string())
    }

    #[test]
    fn identity_transform_round_trips_source() {
        let source = "\nconst styles = css`\n  div { color: ${color}; }\n  .${part} { border: ${b} solid #000; }\n`;\n";
        let scanner = BlockScanner::new(&["css"]);
        let rewritten = rewrite(source, &scanner, identity).unwrap();
        assert_eq!(rewritten.as_deref(), Some(source));
    }

    #[test]
    fn no_blocks_reports_no_change() {
        let scanner = BlockScanner::new(&["css"]);
        let rewritten = rewrite("const x = 1;", &scanner, identity).unwrap();
        assert_eq!(rewritten, None);
    }

    #[test]
    fn transform_sees_substituted_body() {
        let source = "css`div { color: ${c}; }`";
        let scanner = BlockScanner::new(&["css"]);
        let mut seen = Vec::new();
        let rewritten = rewrite(source, &scanner, |css| {
            seen.push(css.to_string());
            Ok(css.to_string())
        })
        .unwrap();
        assert_eq!(
            seen,
            vec!["div { color: var(--rollup-css-placeholder-0); }".to_string()]
        );
        assert_eq!(rewritten.as_deref(), Some(source));
    }

    #[test]
    fn transform_output_replaces_block_body() {
        let source = "const s = css`  div { color: ${c}; }  `;";
        let scanner = BlockScanner::new(&["css"]);
        // Minifier stand-in with a fixed output.
        let rewritten = rewrite(source, &scanner, |_| {
            Ok("div{color:var(--rollup-css-placeholder-0)}".to_string())
        })
        .unwrap();
        assert_eq!(
            rewritten.as_deref(),
            Some("const s = css`div{color:${c}}`;")
        );
    }

    #[test]
    fn failed_transform_is_unit_fatal() {
        let source = "css`div { color: ${c}; }`";
        let scanner = BlockScanner::new(&["css"]);
        let error = rewrite(source, &scanner, |_| {
            Err(TransformError("unexpected token".into()))
        })
        .unwrap_err();
        match error {
            Error::Transform { tag, source } => {
                assert_eq!(tag, "css");
                assert_eq!(source.to_string(), "unexpected token");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn remaining_blocks_still_run_after_a_failure() {
        let source = "css`.a { color: red; }` css`.b { color: blue; }`";
        let scanner = BlockScanner::new(&["css"]);
        let mut calls = 0;
        let result = rewrite(source, &scanner, |_| {
            calls += 1;
            Err(TransformError("boom".into()))
        });
        assert!(result.is_err());
        assert_eq!(calls, 2);
    }

    #[test]
    fn dropped_rule_is_tolerated() {
        let source = "css`.dead { color: ${gone}; } .live { margin: ${m}; }`";
        let scanner = BlockScanner::new(&["css"]);
        // The transformer eliminated the first rule entirely.
        let rewritten = rewrite(source, &scanner, |_| {
            Ok(".live { margin: var(--rollup-css-placeholder-1); }".to_string())
        })
        .unwrap();
        assert_eq!(
            rewritten.as_deref(),
            Some("css`.live { margin: ${m}; }`")
        );
    }
}
