//! Renders flagged tests into a pytest `conftest.py` skip-list.

use crate::model::FlakinessRecord;
use std::collections::HashSet;
use std::fmt::Write as _;

pub const SKIP_SET_NAME: &str = "QUARANTINED";
pub const HOOK_NAME: &str = "pytest_collection_modifyitems";
pub const SKIP_REASON: &str = "FlakyGuard quarantine";

/// Builds the conftest artifact. History is never touched.
pub fn emit_quarantine(records: &[FlakinessRecord]) -> String {
    let mut seen = HashSet::new();
    let entries: Vec<&FlakinessRecord> = records
        .iter()
        .filter(|r| seen.insert(r.test_name.as_str()))
        .collect();

    let mut out = String::from("import pytest\n\n");
    if entries.is_empty() {
        let _ = writeln!(out, "{} = set()", SKIP_SET_NAME);
    } else {
        let _ = writeln!(out, "{} = {{", SKIP_SET_NAME);
        for r in entries {
            let _ = writeln!(
                out,
                "    {},  # flip={:.0}% {}",
                python_str(&r.test_name),
                r.flip_rate * 100.0,
                r.root_cause
            );
        }
        out.push_str("}\n");
    }

    out.push_str("\n\n");
    let _ = writeln!(out, "def {}(items):", HOOK_NAME);
    out.push_str("    for item in items:\n");
    out.push_str("        fqn = f\"{item.module.__name__}.{item.name}\"\n");
    let _ = writeln!(out, "        if fqn in {}:", SKIP_SET_NAME);
    let _ = writeln!(
        out,
        "            item.add_marker(pytest.mark.skip(reason={}))",
        python_str(SKIP_REASON)
    );
    out
}

/// Double-quoted Python string literal with escapes.
fn python_str(s: &str) -> String {
    let mut lit = String::with_capacity(s.len() + 2);
    lit.push('"');
    for c in s.chars() {
        match c {
            '\\' => lit.push_str("\\\\"),
            '"' => lit.push_str("\\\""),
            '\n' => lit.push_str("\\n"),
            '\r' => lit.push_str("\\r"),
            '\t' => lit.push_str("\\t"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                let _ = write!(lit, "\\x{:02x}", c as u32);
            }
            c => lit.push(c),
        }
    }
    lit.push('"');
    lit
}
