//! Typed parse of JUnit XML reports.

use crate::model::TestStatus;

/// One `<testcase>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCase {
    pub name: String,
    pub status: TestStatus,
    pub duration: f64,
    pub message: String,
}

/// Parses a `<testsuite>` or `<testsuites>` document.
///
/// Returns the reason on failure; callers attach the file path.
pub fn parse_junit(xml: &str) -> Result<Vec<ParsedCase>, String> {
    let doc = roxmltree::Document::parse(xml).map_err(|e| e.to_string())?;
    let root = doc.root_element();
    match root.tag_name().name() {
        "testsuite" | "testsuites" => {}
        other => {
            return Err(format!(
                "expected <testsuite> or <testsuites> root, found <{}>",
                other
            ))
        }
    }

    root.descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "testcase")
        .map(parse_case)
        .collect()
}

fn parse_case(node: roxmltree::Node<'_, '_>) -> Result<ParsedCase, String> {
    let pos = node.document().text_pos_at(node.range().start);
    let local = node
        .attribute("name")
        .filter(|n| !n.is_empty())
        .ok_or_else(|| format!("<testcase> at {} has no name attribute", pos))?;
    let name = match node.attribute("classname").filter(|c| !c.is_empty()) {
        Some(class) => format!("{}.{}", class, local),
        None => local.to_string(),
    };

    let duration = match node.attribute("time").map(str::trim) {
        None | Some("") => 0.0,
        Some(raw) => {
            let secs: f64 = raw
                .parse()
                .map_err(|_| format!("testcase '{}' has invalid time '{}'", name, raw))?;
            if !secs.is_finite() || secs < 0.0 {
                return Err(format!("testcase '{}' has invalid time '{}'", name, raw));
            }
            secs
        }
    };

    let child = |tag: &str| {
        node.children()
            .find(|c| c.is_element() && c.tag_name().name() == tag)
    };
    let (status, outcome) = match (child("failure"), child("error")) {
        (Some(el), _) => (TestStatus::Fail, Some(el)),
        (None, Some(el)) => (TestStatus::Error, Some(el)),
        (None, None) => (TestStatus::Pass, None),
    };
    let message = outcome.map(outcome_message).unwrap_or_default();

    Ok(ParsedCase {
        name,
        status,
        duration,
        message,
    })
}

fn outcome_message(el: roxmltree::Node<'_, '_>) -> String {
    match el.attribute("message").filter(|m| !m.is_empty()) {
        Some(m) => m.to_string(),
        None => el.text().map(str::trim).unwrap_or_default().to_string(),
    }
}
