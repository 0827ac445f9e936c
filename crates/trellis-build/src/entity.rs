use std::any::Any;

// ── AsAny ─────────────────────────────────────────────────────────────────

/// Object-safe access to [`Any`], so handlers registered for a concrete type
/// can recover it from `dyn Entity` / `dyn Builder`.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

// ── Entity trait ──────────────────────────────────────────────────────────

/// The runtime object a tag constructs.
///
/// Only [`type_name`](Entity::type_name) is required. The remaining methods
/// are optional capabilities the tag state machine and the assembler match on:
///
/// | Capability | Method | Effect |
/// |------------|--------|--------|
/// | composite | [`components`](Entity::components) | attributes are also tried on each component |
/// | hierarchical node | [`hierarchy`](Entity::hierarchy) | children are wrapped in [`TreeNode`]s |
/// | attachable | [`is_attachable`](Entity::is_attachable) | bypasses the parent's child rules |
pub trait Entity: AsAny {
    /// Registry key for binding-handler lookup and the name used in errors.
    fn type_name(&self) -> &'static str;

    /// Sub-entities that receive attribute binding independently.
    ///
    /// `None` means "not composite". `Some` must never be empty; an empty
    /// list is reported as `MissingComponents`.
    fn components(&mut self) -> Option<Vec<&mut dyn Entity>> {
        None
    }

    /// Child node list for hierarchical-node containers.
    fn hierarchy(&mut self) -> Option<&mut Vec<TreeNode>> {
        None
    }

    /// Whether this entity attaches to any parent instead of being placed
    /// as a structural child.
    fn is_attachable(&self) -> bool {
        false
    }

    /// Consume this entity into `target`. Only called when
    /// [`is_attachable`](Entity::is_attachable) returns `true`.
    fn attach_to(self: Box<Self>, target: &mut dyn Entity) -> anyhow::Result<()> {
        anyhow::bail!("{} cannot be attached to {}", self.type_name(), target.type_name())
    }
}

impl dyn Entity {
    pub fn is<T: Entity>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Entity>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Entity>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

// ── Built-in entities ─────────────────────────────────────────────────────

/// Label-like leaf holding one line of plain text.
///
/// Hierarchical-node containers turn each line of inner text into one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLeaf {
    pub text: String,
}

impl TextLeaf {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Entity for TextLeaf {
    fn type_name(&self) -> &'static str {
        "text"
    }
}

/// Node wrapper used by hierarchical-node containers.
///
/// A `TreeNode` is itself an entity, so a tag can produce one directly; the
/// assembler reuses it as the wrapper instead of nesting a second node.
pub struct TreeNode {
    pub entity: Box<dyn Entity>,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(entity: Box<dyn Entity>) -> Self {
        Self { entity, children: Vec::new() }
    }

    /// A childless node around a [`TextLeaf`].
    pub fn leaf(text: impl Into<String>) -> Self {
        Self::new(Box::new(TextLeaf::new(text)))
    }

    /// Wrap `entity` in a node, reusing it when it already is one.
    pub fn wrap(entity: Box<dyn Entity>) -> Self {
        if !entity.is::<TreeNode>() {
            return Self::new(entity);
        }
        match entity.into_any().downcast::<TreeNode>() {
            Ok(node) => *node,
            Err(_) => unreachable!("type checked above"),
        }
    }
}

impl Entity for TreeNode {
    fn type_name(&self) -> &'static str {
        "node"
    }

    fn hierarchy(&mut self) -> Option<&mut Vec<TreeNode>> {
        Some(&mut self.children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_creates_a_node_for_plain_entities() {
        let node = TreeNode::wrap(Box::new(TextLeaf::new("a")));
        let leaf = node.entity.downcast_ref::<TextLeaf>().unwrap();
        assert_eq!(leaf.text, "a");
        assert!(node.children.is_empty());
    }

    #[test]
    fn wrap_reuses_an_existing_node() {
        let mut inner = TreeNode::leaf("root");
        inner.children.push(TreeNode::leaf("child"));
        let node = TreeNode::wrap(Box::new(inner));
        assert!(node.entity.is::<TextLeaf>());
        assert_eq!(node.children.len(), 1);
    }

    #[test]
    fn plain_entities_have_no_capabilities() {
        let mut leaf = TextLeaf::new("x");
        assert!(leaf.components().is_none());
        assert!(leaf.hierarchy().is_none());
        assert!(!leaf.is_attachable());
    }

    #[test]
    fn default_attach_refuses() {
        let mut target = TextLeaf::new("t");
        let err = Box::new(TextLeaf::new("x")).attach_to(&mut target).unwrap_err();
        assert_eq!(err.to_string(), "text cannot be attached to text");
    }
}
