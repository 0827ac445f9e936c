//! The per-node lifecycle controller.
//!
//! A [`Tag`] drives exactly one entity through
//! `building → instantiated → bound → (text, children) → closed`.
//! What differs between tag names (which entity, which builder, how children
//! and text are placed) lives behind [`TagKind`].

use std::collections::HashSet;

use log::{debug, trace, warn};
use trellis_markup::{Attribute, TagNode};

use crate::builder::{Builder, EntityBuilder};
use crate::config::BuildConfig;
use crate::entity::{Entity, TreeNode};
use crate::error::{BuildError, Phase, Result};
use crate::lifecycle::{self, Action, Actions, Lifecycle};
use crate::syntax::Syntax;

/// Attribute name reported when instantiation or `finish_building` fails.
pub const BUILD_STEP: &str = "<build>";
/// Attribute name reported when a tag kind's close hook fails.
pub const CLOSE_STEP: &str = "<close>";

// ── TagKind ───────────────────────────────────────────────────────────────

/// Per-tag-name behaviour registered in the [`Syntax`].
///
/// # Implementing a tag kind
///
/// ```rust
/// use trellis_build::{Builder, Entity, EntityBuilder, TagKind, TextLeaf};
///
/// struct Caption;
///
/// impl TagKind for Caption {
///     fn entity_type(&self) -> &str { "text" }
///
///     fn instantiate(&self, builder: &mut dyn Builder) -> anyhow::Result<Box<dyn Entity>> {
///         let text = builder
///             .downcast_ref::<EntityBuilder>()
///             .and_then(|b| b.text.clone())
///             .unwrap_or_default();
///         Ok(Box::new(TextLeaf::new(text)))
///     }
/// }
/// ```
pub trait TagKind: Send + Sync {
    /// Declared entity type, used for building-handler lookup before the
    /// entity exists.
    fn entity_type(&self) -> &str;

    /// Fresh builder for one tag.
    fn new_builder(&self) -> Box<dyn Builder> {
        Box::new(EntityBuilder::default())
    }

    /// Create the entity from the fully populated builder.
    fn instantiate(&self, builder: &mut dyn Builder) -> anyhow::Result<Box<dyn Entity>>;

    /// Attach a structural child. Called only for children that are neither
    /// attachable nor placed into a node hierarchy.
    fn handle_valid_child(&self, parent: &mut dyn Entity, child: Box<dyn Entity>) -> anyhow::Result<()> {
        anyhow::bail!("{} accepts no children (got {})", parent.type_name(), child.type_name())
    }

    /// Handle one trimmed, non-empty line of inner text.
    fn handle_plain_text(&self, entity: &mut dyn Entity, _line: &str) -> anyhow::Result<()> {
        anyhow::bail!("{} does not accept plain text", entity.type_name())
    }

    /// Runs on tag close, before any close callbacks.
    fn on_close(&self, _entity: &mut dyn Entity) -> anyhow::Result<()> {
        Ok(())
    }
}

// ── Binding ───────────────────────────────────────────────────────────────

/// The tag-side context handed to binding handlers.
///
/// Gives access to the action table and to the lifecycle record of the
/// entity (or component) currently being bound.
pub struct Binding<'a> {
    tag: &'a str,
    actions: &'a Actions,
    lifecycle: &'a mut Option<Lifecycle>,
}

impl<'a> Binding<'a> {
    /// Name of the tag being processed.
    pub fn tag_name(&self) -> &str {
        self.tag
    }

    /// Look up a named action; unknown names are [`BuildError::UnknownAction`].
    pub fn action(&self, name: &str) -> Result<Action> {
        self.actions.resolve(name)
    }

    /// Run `action` once the entity is bound, before children are attached.
    /// Component actions run before the entity's own.
    pub fn on_create(&mut self, action: Action) {
        self.lifecycle.get_or_insert_with(Lifecycle::default).push_on_create(action);
    }

    /// Run `action` when the tag closes.
    pub fn on_close(&mut self, action: Action) {
        self.lifecycle.get_or_insert_with(Lifecycle::default).push_on_close(action);
    }
}

// ── Scope ─────────────────────────────────────────────────────────────────

/// Everything a tag reads but does not own, shared by one parse.
#[derive(Clone, Copy)]
pub(crate) struct Scope<'a> {
    pub syntax: &'a Syntax,
    pub config: BuildConfig,
    pub actions: &'a Actions,
}

/// Which lifecycle record a binding pass writes to.
#[derive(Clone, Copy)]
enum Slot {
    Entity,
    Component(usize),
}

// ── Tag ───────────────────────────────────────────────────────────────────

pub(crate) struct Tag<'a> {
    name: String,
    kind: &'a dyn TagKind,
    attributes: Vec<Attribute>,
    processed: HashSet<String>,
    entity: Option<Box<dyn Entity>>,
    lifecycle: Option<Lifecycle>,
    component_lifecycles: Vec<Option<Lifecycle>>,
    closed: bool,
}

impl<'a> Tag<'a> {
    /// Resolve the tag kind and construct the entity: building attributes,
    /// instantiation, `finish_building`, binding, then on-create callbacks.
    pub(crate) fn open(scope: Scope<'a>, node: &TagNode, parent: Option<&str>) -> Result<Self> {
        let kind = scope.syntax.tag_kind(&node.name).ok_or_else(|| BuildError::UnknownTag {
            name: node.name.clone(),
            line: node.line,
        })?;
        match parent {
            Some(parent) => debug!("opening <{}> as {} inside <{}> (line {})", node.name, kind.entity_type(), parent, node.line),
            None => debug!("opening <{}> as {} (line {})", node.name, kind.entity_type(), node.line),
        }

        let mut tag = Tag {
            name: node.name.clone(),
            kind,
            attributes: node.attributes.clone(),
            processed: HashSet::new(),
            entity: None,
            lifecycle: None,
            component_lifecycles: Vec::new(),
            closed: false,
        };
        tag.prepare_entity(scope)?;
        Ok(tag)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &'a dyn TagKind {
        self.kind
    }

    pub fn entity_mut(&mut self) -> Option<&mut dyn Entity> {
        self.entity.as_deref_mut()
    }

    /// Detach the entity, leaving the tag without one.
    pub fn take_entity(&mut self) -> Option<Box<dyn Entity>> {
        self.entity.take()
    }

    #[cfg(test)]
    pub fn is_processed(&self, attribute: &str) -> bool {
        self.processed.contains(attribute)
    }

    // ── construction ──────────────────────────────────────────────────────

    fn prepare_entity(&mut self, scope: Scope<'_>) -> Result<()> {
        let mut builder = self.kind.new_builder();
        self.process_building_attributes(scope.syntax, &mut *builder)?;

        let declared = self.kind.entity_type().to_string();
        let mut entity = self.kind
            .instantiate(&mut *builder)
            .map_err(|source| build_failure(BUILD_STEP, &declared, Phase::Building, source))?;
        builder
            .finish_building(&mut *entity)
            .map_err(|source| build_failure(BUILD_STEP, entity.type_name(), Phase::Building, source))?;
        drop(builder);

        self.process_tag_attributes(scope, &mut *entity)?;
        if let Some(components) = entity.components() {
            for (component, record) in components.into_iter().zip(&self.component_lifecycles) {
                lifecycle::invoke_on_create(record.as_ref(), component);
            }
        }
        lifecycle::invoke_on_create(self.lifecycle.as_ref(), &mut *entity);
        self.entity = Some(entity);
        Ok(())
    }

    fn process_building_attributes(&mut self, syntax: &Syntax, builder: &mut dyn Builder) -> Result<()> {
        let declared = self.kind.entity_type();
        for attribute in &self.attributes {
            let Some(handler) = syntax.building_handler(declared, &attribute.name) else {
                continue;
            };
            trace!("<{}> building {}={:?}", self.name, attribute.name, attribute.value);
            let consumed = handler(&mut *builder, &attribute.value).map_err(|source| {
                build_failure(&attribute.name, declared, Phase::Building, source)
            })?;
            // `false` leaves the attribute for a binding handler.
            if consumed {
                self.processed.insert(attribute.name.clone());
            }
        }
        Ok(())
    }

    /// Composite entities get lenient passes over the entity and each
    /// component first; the final strict pass always targets the entity so
    /// unknown attributes are reported against the outer type.
    fn process_tag_attributes(&mut self, scope: Scope<'_>, entity: &mut dyn Entity) -> Result<()> {
        let owner = entity.type_name();
        if let Some(count) = entity.components().map(|components| components.len()) {
            if count == 0 {
                return Err(BuildError::MissingComponents { entity_type: owner.to_string() });
            }
            self.component_lifecycles.resize_with(count, || None);

            self.bind_pass(scope, owner, entity, Slot::Entity, false)?;
            if let Some(components) = entity.components() {
                for (index, component) in components.into_iter().enumerate() {
                    self.bind_pass(scope, owner, component, Slot::Component(index), false)?;
                }
            }
        }
        self.bind_pass(scope, owner, entity, Slot::Entity, true)
    }

    fn bind_pass(
        &mut self,
        scope: Scope<'_>,
        owner: &str,
        target: &mut dyn Entity,
        slot: Slot,
        strict: bool,
    ) -> Result<()> {
        for attribute in &self.attributes {
            if self.processed.contains(&attribute.name) {
                continue;
            }
            let Some(handler) = scope.syntax.binding_handler(&*target, &attribute.name) else {
                if strict {
                    reject_unknown(scope.config, &self.name, owner, &attribute.name)?;
                }
                continue;
            };
            trace!(
                "<{}> binding {}={:?} on {}",
                self.name, attribute.name, attribute.value, target.type_name()
            );

            let lifecycle = match slot {
                Slot::Entity => &mut self.lifecycle,
                Slot::Component(index) => {
                    if self.component_lifecycles.len() <= index {
                        self.component_lifecycles.resize_with(index + 1, || None);
                    }
                    &mut self.component_lifecycles[index]
                }
            };
            let mut binding = Binding { tag: &self.name, actions: scope.actions, lifecycle };
            handler(&mut *target, &mut binding, &attribute.value)
                .map_err(|source| build_failure(&attribute.name, owner, Phase::Binding, source))?;
            self.processed.insert(attribute.name.clone());
        }
        Ok(())
    }

    // ── content ───────────────────────────────────────────────────────────

    /// Split inner text into trimmed, non-empty lines and place each one.
    pub(crate) fn handle_text(&mut self, raw: &str) -> Result<()> {
        if raw.trim().is_empty() {
            return Ok(());
        }
        let Some(entity) = self.entity.as_deref_mut() else {
            return Ok(());
        };
        for line in raw.split('\n').map(str::trim).filter(|line| !line.is_empty()) {
            if let Some(nodes) = entity.hierarchy() {
                nodes.push(TreeNode::leaf(line));
                continue;
            }
            self.kind.handle_plain_text(entity, line).map_err(|source| {
                BuildError::InvalidChildPlacement {
                    parent_type: entity.type_name().to_string(),
                    child: format!("text {:?}", line),
                    source,
                }
            })?;
        }
        Ok(())
    }

    // ── closing ───────────────────────────────────────────────────────────

    /// Close hook first, then component close callbacks, then the entity's.
    pub(crate) fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let Some(entity) = self.entity.as_deref_mut() else {
            return Ok(());
        };
        debug!("closing <{}>", self.name);

        self.kind
            .on_close(entity)
            .map_err(|source| build_failure(CLOSE_STEP, entity.type_name(), Phase::Binding, source))?;
        if let Some(components) = entity.components() {
            for (component, record) in components.into_iter().zip(&self.component_lifecycles) {
                lifecycle::invoke_on_close(record.as_ref(), component);
            }
        }
        lifecycle::invoke_on_close(self.lifecycle.as_ref(), entity);
        Ok(())
    }
}

fn build_failure(attribute: &str, entity_type: &str, phase: Phase, source: anyhow::Error) -> BuildError {
    BuildError::HandlerFailure {
        attribute: attribute.to_string(),
        entity_type: entity_type.to_string(),
        phase,
        source,
    }
}

fn reject_unknown(config: BuildConfig, tag: &str, owner: &str, attribute: &str) -> Result<()> {
    if config.strict {
        return Err(BuildError::UnknownAttribute {
            attribute: attribute.to_string(),
            entity_type: owner.to_string(),
        });
    }
    warn!("<{}>: ignoring unknown attribute {:?} for {}", tag, attribute, owner);
    Ok(())
}
