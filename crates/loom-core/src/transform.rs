//! Best-effort type-annotation stripper
//!
//! A handful of regex rewrites that turn simple typed script into something a
//! plain script host will run. This is not a parser: it misreads constructs
//! such as object literals whose values are capitalised identifiers, and
//! nothing guarantees the output is valid for arbitrary typed input. It is
//! only ever applied to preview output, never to stored file content.

use once_cell::sync::Lazy;
use regex::Regex;

/// `interface Foo { ... }` / `export type Foo = { ... }` up to a column-0 `}`
static DECLARATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?ms)^(?:export\s+)?(?:interface|type)\s+\w+.*?^\}")
        .expect("declaration regex is valid")
});

/// `: Foo` or `: Foo[]` followed by `=`, `,`, `)` or `{`
static ANNOTATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r":\s*[A-Z]\w*(?:\[\])?(\s*[=,)\{])").expect("annotation regex is valid")
});

/// `<Foo>` or `<Foo, Bar>`
static GENERIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<[A-Z]\w*(?:\s*,\s*[A-Z]\w*)*>").expect("generic regex is valid")
});

/// ` as Foo`
static ASSERTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+as\s+\w+").expect("assertion regex is valid"));

/// `import type { Foo } from './foo';`
static TYPE_IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^import\s+type\s+.*;\s*$").expect("type import regex is valid")
});

/// Strip static-typing syntax from `source`
///
/// Every rewrite only ever deletes text, so the pipeline is repeated until a
/// pass changes nothing. That makes the function idempotent:
/// `strip_types(&strip_types(s)) == strip_types(s)` for every input.
pub fn strip_types(source: &str) -> String {
    let mut current = single_pass(source);
    loop {
        let next = single_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn single_pass(source: &str) -> String {
    let out = DECLARATION_RE.replace_all(source, "");
    let out = ANNOTATION_RE.replace_all(&out, "$1");
    let out = GENERIC_RE.replace_all(&out, "");
    let out = ASSERTION_RE.replace_all(&out, "");
    let out = TYPE_IMPORT_RE.replace_all(&out, "");
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_removes_interface_blocks() {
        let src = "interface User {\n  name: string;\n  age: number;\n}\nconst a = 1;";
        assert_eq!(strip_types(src), "const a = 1;");

        let src = "export type Point = {\n  x: number;\n}\n\nlet p = 2;";
        assert_eq!(strip_types(src), "let p = 2;");
    }

    #[test]
    fn test_removes_capitalised_annotations() {
        assert_eq!(
            strip_types("function greet(user: User, list: Item[]) {"),
            "function greet(user, list) {"
        );
        assert_eq!(strip_types("const el: HTMLElement = q;"), "const el = q;");
    }

    #[test]
    fn test_removes_generics_and_assertions() {
        assert_eq!(
            strip_types("const m = new Map<String, Number>();"),
            "const m = new Map();"
        );
        assert_eq!(
            strip_types("const btn = document.querySelector('#b') as HTMLButtonElement;"),
            "const btn = document.querySelector('#b');"
        );
    }

    #[test]
    fn test_removes_type_only_imports() {
        let src = "import type { Foo } from './foo';\nimport { bar } from './bar';\nbar();";
        assert_eq!(strip_types(src), "import { bar } from './bar';\nbar();");
    }

    #[test]
    fn test_plain_script_passes_through() {
        let src = "const x = 1;\nfunction add(a, b) {\n  return a + b;\n}";
        assert_eq!(strip_types(src), src);
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "",
            "   ",
            "a: B: C,",
            "x as as y as z",
            "interface A {\n}\ninterface B {\n}\nlet v: V = 1;",
            "const f = (a: Foo[], b: Bar) => a;\nimport type X from 'x';",
            "type Weird = string;\nfunction f() {\n  return 1;\n}\nconsole.log(f());",
            "<A<B>>",
        ];
        for s in samples {
            let once = strip_types(s);
            assert_eq!(strip_types(&once), once, "not idempotent for {:?}", s);
        }
    }

    #[test]
    fn test_chained_annotations_reach_fixed_point() {
        // a single pass would only strip the inner annotation
        assert_eq!(strip_types("a: B: C,"), "a,");
    }
}
