//! XML rendering of payload values
//!
//! `serialize` turns a JSON value into a standalone `MarkupNode` tree; the
//! caller composes subtrees and renders the document once at the end.

use courier_common::scalar_text;
use serde_json::Value;

/// Name of the document root element
pub const ROOT_TAG: &str = "data";

/// Prefix that turns numeric keys into valid element names
pub const NUMERIC_KEY_PREFIX: &str = "item";

/// An XML element with either text content or child elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupNode {
    pub name: String,
    pub text: Option<String>,
    pub children: Vec<MarkupNode>,
}

impl MarkupNode {
    /// Element without content
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Leaf element holding unescaped text
    pub fn leaf(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: Some(text.into()),
            children: Vec::new(),
        }
    }

    /// Append a child element
    pub fn child(mut self, node: MarkupNode) -> Self {
        self.children.push(node);
        self
    }

    /// Render this element (and its subtree) without a declaration
    pub fn render(&self, out: &mut String) {
        let text = self.text.as_deref().filter(|t| !t.is_empty());

        if text.is_none() && self.children.is_empty() {
            out.push('<');
            out.push_str(&self.name);
            out.push_str("/>");
            return;
        }

        out.push('<');
        out.push_str(&self.name);
        out.push('>');
        if let Some(text) = text {
            out.push_str(&escape_xml(text));
        }
        for child in &self.children {
            child.render(out);
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }

    /// Render as a complete XML 1.0 document
    pub fn to_document(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\"?>\n");
        self.render(&mut out);
        out.push('\n');
        out
    }
}

/// Build the element for `value` under the given tag.
///
/// Objects and arrays produce one child per entry (array entries are keyed
/// by position); scalars produce a leaf with their text form.
pub fn serialize(value: &Value, tag: &str) -> MarkupNode {
    match value {
        Value::Object(map) => map
            .iter()
            .fold(MarkupNode::new(tag), |node, (key, item)| {
                node.child(serialize(item, &tag_name(key)))
            }),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .fold(MarkupNode::new(tag), |node, (index, item)| {
                node.child(serialize(item, &tag_name(&index.to_string())))
            }),
        scalar => MarkupNode::leaf(tag, scalar_text(scalar)),
    }
}

/// Element name for a payload key; numeric keys get the `item` prefix.
pub fn tag_name(key: &str) -> String {
    if is_numeric(key) {
        format!("{}{}", NUMERIC_KEY_PREFIX, key)
    } else {
        key.to_string()
    }
}

/// Serialize a value as an XML document with a `<data>` root
pub fn to_xml(value: &Value) -> String {
    serialize(value, ROOT_TAG).to_document()
}

/// Decimal number check: optional sign, digits with an optional fraction,
/// optional exponent.
fn is_numeric(key: &str) -> bool {
    let body = key.strip_prefix(['+', '-']).unwrap_or(key);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(pos) => (&body[..pos], Some(&body[pos + 1..])),
        None => (body, None),
    };

    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if whole.is_empty() && fraction.is_empty() {
        return false;
    }
    if !all_digits(whole) || !all_digits(fraction) {
        return false;
    }

    match exponent {
        None => true,
        Some(exp) => {
            let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !digits.is_empty() && all_digits(digits)
        }
    }
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_keys_get_prefix() {
        let xml = to_xml(&json!({"0": "a", "name": "bob"}));
        assert_eq!(
            xml,
            "<?xml version=\"1.0\"?>\n<data><item0>a</item0><name>bob</name></data>\n"
        );
    }

    #[test]
    fn test_leaf_text_is_escaped() {
        let xml = to_xml(&json!({"note": "<b>Tom & \"Jerry\"</b>"}));
        assert!(xml.contains("<note>&lt;b&gt;Tom &amp; &quot;Jerry&quot;&lt;/b&gt;</note>"));
    }

    #[test]
    fn test_nested_structures() {
        let value = json!({"user": {"name": "bob", "roles": ["admin", "ops"]}});
        let node = serialize(&value, "data");

        let expected = MarkupNode::new("data").child(
            MarkupNode::new("user")
                .child(MarkupNode::leaf("name", "bob"))
                .child(
                    MarkupNode::new("roles")
                        .child(MarkupNode::leaf("item0", "admin"))
                        .child(MarkupNode::leaf("item1", "ops")),
                ),
        );
        assert_eq!(node, expected);
    }

    #[test]
    fn test_scalars_and_empty_values() {
        let xml = to_xml(&json!({"n": 3, "yes": true, "no": false, "nothing": null, "list": []}));
        assert_eq!(
            xml,
            "<?xml version=\"1.0\"?>\n<data><n>3</n><yes>1</yes><no/><nothing/><list/></data>\n"
        );
    }

    #[test]
    fn test_tag_name() {
        assert_eq!(tag_name("12"), "item12");
        assert_eq!(tag_name("-1.5"), "item-1.5");
        assert_eq!(tag_name("1e3"), "item1e3");
        assert_eq!(tag_name("name"), "name");
        assert_eq!(tag_name("1a"), "1a");
        assert_eq!(tag_name("."), ".");
        assert_eq!(tag_name(""), "");
    }

    #[test]
    fn test_top_level_array() {
        let xml = to_xml(&json!(["x", "y"]));
        assert!(xml.ends_with("<data><item0>x</item0><item1>y</item1></data>\n"));
    }
}
