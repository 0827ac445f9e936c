//! Document walk and child placement.
//!
//! Tags are processed depth-first in document order. Each child tag is fully
//! constructed and closed before its entity is handed to the parent.

use log::debug;
use trellis_markup::{Content, Document, TagNode};

use crate::config::BuildConfig;
use crate::entity::{Entity, TreeNode};
use crate::error::{BuildError, Result};
use crate::lifecycle::Actions;
use crate::syntax::Syntax;
use crate::tag::{Scope, Tag};

/// One parse session over a shared [`Syntax`].
///
/// ```rust
/// use trellis_build::{scene, Assembler};
///
/// let syntax = scene::standard_syntax().unwrap();
/// let roots = Assembler::new(&syntax)
///     .parse_str(r#"<label text="Hello"/>"#)
///     .unwrap();
/// assert_eq!(scene::outline(&*roots[0]), "label \"Hello\"\n");
/// ```
pub struct Assembler<'s> {
    syntax: &'s Syntax,
    config: BuildConfig,
    actions: Actions,
}

impl<'s> Assembler<'s> {
    /// Strict mode, no named actions.
    pub fn new(syntax: &'s Syntax) -> Self {
        Self { syntax, config: BuildConfig::default(), actions: Actions::new() }
    }

    pub fn with_config(mut self, config: BuildConfig) -> Self {
        self.config = config;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.config.strict = strict;
        self
    }

    /// Register an action markup can name in `on_create` / `on_close`.
    pub fn with_action(mut self, name: impl Into<String>, action: impl Fn(&mut dyn Entity) + 'static) -> Self {
        self.actions.insert(name, action);
        self
    }

    pub fn with_actions(mut self, actions: Actions) -> Self {
        self.actions = actions;
        self
    }

    pub fn config(&self) -> BuildConfig {
        self.config
    }

    /// Parse markup and build every root tag.
    pub fn parse_str(&self, src: &str) -> Result<Vec<Box<dyn Entity>>> {
        let document = trellis_markup::parse_str(src)?;
        self.build_document(&document)
    }

    /// Build every root tag, returning the root entities in document order.
    pub fn build_document(&self, document: &Document) -> Result<Vec<Box<dyn Entity>>> {
        let mut roots = Vec::with_capacity(document.roots.len());
        for node in &document.roots {
            let mut tag = build_tag(self.scope(), node, None)?;
            roots.extend(tag.take_entity());
        }
        Ok(roots)
    }

    /// Build a single tag tree.
    pub fn build(&self, node: &TagNode) -> Result<Box<dyn Entity>> {
        let mut tag = build_tag(self.scope(), node, None)?;
        tag.take_entity().ok_or_else(|| BuildError::HandlerFailure {
            attribute: crate::tag::BUILD_STEP.to_string(),
            entity_type: tag.kind().entity_type().to_string(),
            phase: crate::error::Phase::Building,
            source: anyhow::anyhow!("<{}> produced no entity", tag.name()),
        })
    }

    fn scope(&self) -> Scope<'_> {
        Scope { syntax: self.syntax, config: self.config, actions: &self.actions }
    }
}

/// Open, fill, and close one tag. The returned tag is closed and still owns
/// its entity.
///
/// Text runs and child tags reach the entity interleaved, exactly as written.
fn build_tag<'a>(scope: Scope<'a>, node: &TagNode, parent: Option<&str>) -> Result<Tag<'a>> {
    let mut tag = Tag::open(scope, node, parent)?;

    for content in &node.content {
        match content {
            Content::Text(text) => tag.handle_text(text)?,
            Content::Tag(child_node) => {
                let mut child = build_tag(scope, child_node, Some(node.name.as_str()))?;
                attach_child(&mut tag, &mut child)?;
            }
        }
    }

    tag.close()?;
    Ok(tag)
}

/// Hand a closed child's entity to its parent.
///
/// Attachable children attach themselves, hierarchical parents wrap the child
/// in a [`TreeNode`], and everything else goes to the parent's tag kind.
fn attach_child(parent: &mut Tag<'_>, child: &mut Tag<'_>) -> Result<()> {
    let Some(entity) = child.take_entity() else {
        debug!("<{}> has no entity left; nothing to attach to <{}>", child.name(), parent.name());
        return Ok(());
    };
    let kind = parent.kind();
    let parent_name = parent.name().to_string();
    let Some(target) = parent.entity_mut() else {
        debug!("<{}> has no entity; dropping child <{}>", parent_name, child.name());
        return Ok(());
    };
    let described = format!("<{}> ({})", child.name(), entity.type_name());

    let placed = if entity.is_attachable() {
        debug!("attaching {} to <{}>", described, parent_name);
        entity.attach_to(&mut *target)
    } else if let Some(nodes) = target.hierarchy() {
        debug!("wrapping {} as a node of <{}>", described, parent_name);
        nodes.push(TreeNode::wrap(entity));
        Ok(())
    } else {
        debug!("adding {} as a child of <{}>", described, parent_name);
        kind.handle_valid_child(&mut *target, entity)
    };

    placed.map_err(|source| BuildError::InvalidChildPlacement {
        parent_type: target.type_name().to_string(),
        child: described,
        source,
    })
}
