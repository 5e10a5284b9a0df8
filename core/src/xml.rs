//! Thin adapter over `roxmltree` for reading MGF response documents.
//!
//! MGF responses declare a default namespace (`http://services.mobilegiving.org`)
//! that carries no information for us, so every lookup here matches on the
//! local tag name only. Text values are trimmed and blank text is treated as
//! absent.

use roxmltree::{Document, Node};

use crate::error::{MgfError, Result};

pub(crate) fn parse_document(body: &str) -> Result<Document<'_>> {
    Document::parse(body).map_err(|e| MgfError::parse(format!("invalid XML: {e}")))
}

/// Return the document root, or a `Parse` error if its tag is not `expected`.
pub(crate) fn expect_root<'a, 'input>(
    doc: &'a Document<'input>,
    expected: &str,
) -> Result<Node<'a, 'input>> {
    let root = doc.root_element();
    if root.tag_name().name() != expected {
        return Err(MgfError::parse(format!(
            "expected <{expected}> root, found <{}>",
            root.tag_name().name()
        )));
    }
    Ok(root)
}

pub(crate) fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == name)
}

pub(crate) fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |c| c.is_element() && c.tag_name().name() == name)
}

pub(crate) fn child_text<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    child(node, name)
        .and_then(|c| c.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub(crate) fn child_string(node: Node<'_, '_>, name: &str) -> Option<String> {
    child_text(node, name).map(str::to_string)
}

/// Absent or blank is `None`; present but non-numeric is an error.
pub(crate) fn child_int(node: Node<'_, '_>, name: &str) -> Result<Option<i64>> {
    child_text(node, name)
        .map(|raw| {
            raw.parse::<i64>()
                .map_err(|_| MgfError::parse(format!("<{name}> is not an integer: {raw:?}")))
        })
        .transpose()
}
