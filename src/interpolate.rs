//! Placeholder substitution for `${..}` interpolation markers inside a CSS
//! template body.
//!
//! An external CSS transformer has no notion of interpolation syntax, so each
//! marker is swapped for a token that parses as plain CSS at its position,
//! the body is handed to the transformer, and afterwards every token is
//! replaced back with the original marker text verbatim.
//! The marker contents are opaque: nothing inside `${..}` is ever parsed or
//! re-scanned.

/// One replaced interpolation marker.
///
/// `expression` is the original `${..}` text, delimiters included, captured
/// verbatim. `placeholder` is unique within one CSS body and valid CSS syntax
/// at the position it replaced. Slots are created by [`substitute`] in scan
/// order and consumed by [`restore`]; they are never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionSlot {
    pub placeholder: String,
    pub expression: String,
}

/// Pseudo-classes whose functional argument keeps selector syntax.
/// Each puts a `:` right before its `(`, which would otherwise look like the
/// start of a declaration value to the classifier below.
const GUARDED_PSEUDO: &[&str] = &[
    ":is",
    ":where",
    ":not",
    ":has",
    ":nth-child",
    ":nth-last-child",
    ":nth-of-type",
    ":nth-last-of-type",
    ":lang",
];

/// Replaces every `${..}` marker in `source` with a placeholder and records
/// the slots in scan order.
///
/// A marker in declaration-value position becomes
/// `var(--rollup-css-placeholder-N)`, legal anywhere a value token is, even
/// nested in `url(..)` or glued to a unit. A marker in selector position
/// becomes `.ROLLUP-CSS-PLACEHOLDER-N`, a bare class selector; the leading `.`
/// is omitted when the marker already chains onto one (`.foo.${x}`). The two
/// counters are independent and both start at 0, so no two slots of one body
/// share a placeholder.
pub fn substitute(source: &str) -> (String, Vec<ExpressionSlot>) {
    let mut slots = Vec::new();
    let mut result = String::with_capacity(source.len());
    let mut selector_index = 0usize;
    let mut value_index = 0usize;

    let mut rest = source;
    while let Some(start) = rest.find("${") {
        // A marker body may not contain `}`. With no closing brace left in
        // the text there is nothing more to match.
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        let marker = &rest[start..start + len + 1];
        result.push_str(&rest[..start]);

        // Classify against the substituted prefix: earlier markers are
        // already placeholders there, so their `${` braces can no longer
        // shadow the declaration's own `:`.
        let placeholder = if is_value_context(&result) {
            let placeholder = format!("var(--rollup-css-placeholder-{value_index})");
            value_index += 1;
            placeholder
        } else {
            let mut placeholder = format!("ROLLUP-CSS-PLACEHOLDER-{selector_index}");
            selector_index += 1;
            if !result.trim_end().ends_with('.') {
                placeholder.insert(0, '.');
            }
            placeholder
        };
        result.push_str(&placeholder);
        slots.push(ExpressionSlot {
            placeholder,
            expression: marker.to_string(),
        });

        rest = &rest[start + len + 1..];
    }
    result.push_str(rest);
    (result, slots)
}

/// Replaces each slot's placeholder back with its original expression.
///
/// Folds over the slots in creation order and substitutes the first remaining
/// literal occurrence of each placeholder. Restoration is plain text replace,
/// so it works no matter how the transformer reordered or reformatted the
/// body. A placeholder the transformer dropped entirely (dead rule
/// elimination) is skipped, never an error. If the transformer duplicated a
/// rule, only the first copy of its placeholder is restored.
pub fn restore(processed: &str, slots: &[ExpressionSlot]) -> String {
    let mut result = String::from(processed);
    for slot in slots {
        if result.contains(&slot.placeholder) {
            result = result.replacen(&slot.placeholder, &slot.expression, 1);
        } else {
            log::warn!(
                "placeholder {} missing from transformed css, expression {} dropped",
                slot.placeholder,
                slot.expression
            );
        }
    }
    result
}

/// Does a marker placed right after `preceding` sit in declaration-value
/// position?
///
/// Value position means the last `:` comes after the last `;`/`{` and the
/// prefix does not end inside an unclosed guarded pseudo-class argument list,
/// where a `:` still belongs to the selector. Open parens are tracked as an
/// explicit stack so nesting like `:is(:not(..))` stays guarded.
fn is_value_context(preceding: &str) -> bool {
    let mut last_colon = None;
    let mut last_break = None;
    // One entry per unclosed paren: does it open a guarded pseudo argument?
    let mut parens: Vec<bool> = Vec::new();
    for (i, ch) in preceding.char_indices() {
        match ch {
            ':' => last_colon = Some(i),
            ';' | '{' => last_break = Some(i),
            '(' => parens.push(ends_with_guarded_pseudo(&preceding[..i])),
            ')' => {
                parens.pop();
            }
            _ => {}
        }
    }
    !parens.contains(&true) && last_colon > last_break
}

fn ends_with_guarded_pseudo(text: &str) -> bool {
    GUARDED_PSEUDO.iter().any(|name| {
        text.len() >= name.len()
            && text
                .get(text.len() - name.len()..)
                .is_some_and(|tail| tail.eq_ignore_ascii_case(name))
    })
}
