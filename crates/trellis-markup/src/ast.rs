// ── Attribute ─────────────────────────────────────────────────────────────

/// A single `name="value"` pair on an opening tag.
///
/// Values are kept raw: no entity decoding, no trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

// ── Content ───────────────────────────────────────────────────────────────

/// One piece of a tag body, kept in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// A non-blank run of character data, raw (may span several lines).
    Text(String),
    /// A nested tag.
    Tag(TagNode),
}

// ── TagNode ───────────────────────────────────────────────────────────────

/// One element of the tag tree.
///
/// ```tml
/// <window style="dark" text="Settings">
///     Pick a theme.
///     <button text="OK" on_click="confirm"/>
/// </window>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagNode {
    /// Tag name as written: `"window"`, `"button"`.
    pub name: String,
    /// Attributes in declaration order. Names are unique per tag.
    pub attributes: Vec<Attribute>,
    /// Text runs and nested tags, interleaved as written.
    pub content: Vec<Content>,
    /// 1-based line of the opening `<`.
    pub line: usize,
}

impl TagNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), attributes: Vec::new(), content: Vec::new(), line: 1 }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.content.push(Content::Text(text.into()));
        self
    }

    pub fn child(mut self, child: TagNode) -> Self {
        self.content.push(Content::Tag(child));
        self
    }

    /// Nested tags only, in document order.
    pub fn children(&self) -> impl Iterator<Item = &TagNode> {
        self.content.iter().filter_map(|c| match c {
            Content::Tag(node) => Some(node),
            Content::Text(_) => None,
        })
    }

    /// Look up an attribute value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes.iter().find(|a| a.name == name).map(|a| a.value.as_str())
    }
}

// ── Document ──────────────────────────────────────────────────────────────

/// The top-level parse result: every root tag in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub roots: Vec<TagNode>,
}
