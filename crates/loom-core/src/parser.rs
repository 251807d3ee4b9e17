//! Directive protocol parser
//!
//! Model replies interleave prose with marker-delimited directive blocks:
//!
//! ```text
//! <<<FILE_OP>>>
//! TYPE: CREATE
//! PATH: index.html
//! DESCRIPTION: Landing page with a hero section
//! <<<END_FILE_OP>>>
//! ```
//!
//! Parsing is deliberately forgiving. Blocks without a `TYPE` or `PATH` are
//! dropped, unterminated blocks are left as prose, and nothing here fails.

use loom_types::{Operation, OperationKind};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Opening marker of a directive block
pub const BEGIN_MARKER: &str = "<<<FILE_OP>>>";
/// Closing marker of a directive block
pub const END_MARKER: &str = "<<<END_FILE_OP>>>";

static BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<<<FILE_OP>>>(.*?)<<<END_FILE_OP>>>").expect("block regex is valid")
});

static TYPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)TYPE:\s*(CREATE|MODIFY|DELETE)").expect("type regex is valid")
});

static PATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)PATH:[ \t]*([^\r\n]*)").expect("path regex is valid"));

static DESCRIPTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)DESCRIPTION:").expect("description regex is valid"));

/// A label at the start of a later line ends the description
static NEXT_LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\n[ \t]*(?:TYPE|PATH|DESCRIPTION):").expect("label regex is valid")
});

/// Result of parsing a planning reply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPlan {
    /// Prose with every directive block removed, trimmed
    pub narrative: String,
    /// Operations in the order their blocks appeared
    pub operations: Vec<Operation>,
}

/// Extract the ordered operation list from raw model text
pub fn parse(text: &str) -> Vec<Operation> {
    BLOCK_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let block = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let op = parse_block(block);
            if op.is_none() {
                debug!("Dropping malformed directive block ({} bytes)", block.len());
            }
            op
        })
        .collect()
}

/// Remove exactly the matched directive blocks, leaving all other text as is
pub fn strip_directives(text: &str) -> String {
    BLOCK_RE.replace_all(text, "").into_owned()
}

/// Parse operations and the user-visible narrative in one pass
pub fn parse_plan(text: &str) -> ParsedPlan {
    ParsedPlan {
        narrative: strip_directives(text).trim().to_string(),
        operations: parse(text),
    }
}

fn parse_block(block: &str) -> Option<Operation> {
    let kind = TYPE_RE
        .captures(block)
        .and_then(|c| c.get(1))
        .and_then(|m| OperationKind::parse(m.as_str()))?;

    let path = PATH_RE
        .captures(block)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|p| !p.is_empty())?;

    let description = DESCRIPTION_RE
        .find(block)
        .map(|m| {
            let rest = &block[m.end()..];
            let end = NEXT_LABEL_RE
                .find(rest)
                .map(|next| next.start())
                .unwrap_or(rest.len());
            rest[..end].trim().to_string()
        })
        .unwrap_or_default();

    Some(Operation::new(kind, path, description))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn block(kind: &str, path: &str, description: &str) -> String {
        format!(
            "{}\nTYPE: {}\nPATH: {}\nDESCRIPTION: {}\n{}",
            BEGIN_MARKER, kind, path, description, END_MARKER
        )
    }

    #[test]
    fn test_prose_only_text_is_untouched() {
        let samples = [
            "",
            "Just chatting, nothing to build.",
            "  leading and trailing whitespace \n\n",
            "TYPE: CREATE\nPATH: fake.js\nDESCRIPTION: this is prose, not a directive",
        ];
        for text in samples {
            assert!(parse(text).is_empty(), "unexpected ops for {:?}", text);
            assert_eq!(strip_directives(text), text);
        }
    }

    #[test]
    fn test_blocks_parse_in_order() {
        let inputs = [
            ("CREATE", OperationKind::Create, "index.html", "Landing page"),
            ("modify", OperationKind::Modify, "src/app.ts", "Add a counter\nand a reset button"),
            ("Delete", OperationKind::Delete, "old/legacy.css", ""),
            ("CREATE", OperationKind::Create, "styles.css", "Dark theme, CSS variables"),
        ];

        let text: String = inputs
            .iter()
            .map(|(kw, _, path, desc)| block(kw, path, desc))
            .collect::<Vec<_>>()
            .join("\n\nSome prose between blocks.\n\n");

        let ops = parse(&text);
        assert_eq!(ops.len(), inputs.len());
        for (op, (_, kind, path, desc)) in ops.iter().zip(inputs.iter()) {
            assert_eq!(op.kind, *kind);
            assert_eq!(op.path, *path);
            assert_eq!(op.description, *desc);
            assert!(op.content.is_none());
        }
    }

    #[test]
    fn test_unterminated_block_is_prose() {
        let text = format!("Here we go\n{}\nTYPE: CREATE\nPATH: a.js\n", BEGIN_MARKER);
        assert!(parse(&text).is_empty());
        assert_eq!(strip_directives(&text), text);
    }

    #[test]
    fn test_missing_fields_are_dropped() {
        let text = format!(
            "{b}\nPATH: a.js\n{e}\n{b}\nTYPE: CREATE\n{e}\n{b}\nTYPE: RENAME\nPATH: c.js\n{e}\n{b}\nTYPE: CREATE\nPATH:   \n{e}\n{ok}",
            b = BEGIN_MARKER,
            e = END_MARKER,
            ok = block("CREATE", "b.js", "kept"),
        );
        let ops = parse(&text);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].path, "b.js");
    }

    #[test]
    fn test_labels_are_case_insensitive_and_path_is_trimmed() {
        let text = format!(
            "{}\ntype: modify\npath:   src/main.ts   \ndescription: tweak\n{}",
            BEGIN_MARKER, END_MARKER
        );
        let ops = parse(&text);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].kind, OperationKind::Modify);
        assert_eq!(ops[0].path, "src/main.ts");
        assert_eq!(ops[0].description, "tweak");
    }

    #[test]
    fn test_description_stops_at_next_label() {
        let text = format!(
            "{}\nDESCRIPTION: first line\nsecond line\nTYPE: CREATE\nPATH: x.css\n{}",
            BEGIN_MARKER, END_MARKER
        );
        let ops = parse(&text);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].description, "first line\nsecond line");
        assert_eq!(ops[0].path, "x.css");
    }

    #[test]
    fn test_single_line_block_is_tolerated() {
        let text = format!("{}TYPE: DELETE PATH: gone.js{}", BEGIN_MARKER, END_MARKER);
        let ops = parse(&text);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].kind, OperationKind::Delete);
        assert_eq!(ops[0].path, "gone.js");
    }

    #[test]
    fn test_matching_is_non_greedy() {
        let text = format!(
            "{}\nmiddle prose\n{}",
            block("CREATE", "a.js", "one"),
            block("CREATE", "b.js", "two")
        );
        let ops = parse(&text);
        assert_eq!(ops.len(), 2);
        assert_eq!(strip_directives(&text), "\nmiddle prose\n");
    }

    #[test]
    fn test_parse_plan_narrative() {
        let text = format!(
            "I'll build a landing page.\n\n{}\n\nDone.",
            block("CREATE", "index.html", "Page")
        );
        let plan = parse_plan(&text);
        assert_eq!(plan.operations.len(), 1);
        assert_eq!(plan.narrative, "I'll build a landing page.\n\n\n\nDone.");
    }
}
