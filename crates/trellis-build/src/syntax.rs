//! The syntax registry: tag kinds plus attribute handlers keyed by
//! (entity type, attribute name).
//!
//! Handlers are registered per type name. Types form an explicit ancestry
//! declared with [`SyntaxBuilder::declare`]; [`SyntaxBuilder::finish`]
//! flattens it once into a most-specific-first chain per type, and every
//! lookup is a walk over that precomputed chain. A handler registered for a
//! supertype therefore applies to all subtypes until one of them registers
//! the same attribute name.

use std::collections::{HashMap, HashSet};
use std::fmt;

use log::debug;

use crate::builder::Builder;
use crate::entity::Entity;
use crate::error::{BuildError, Phase, Result};
use crate::tag::{Binding, TagKind};

/// Implicit ancestor of every type. Handlers registered here apply to all entities.
pub const ROOT_TYPE: &str = "entity";

/// Pre-construction handler. Returns `true` when the attribute is fully
/// consumed, `false` when a binding handler must still process it.
pub type BuildingFn = dyn Fn(&mut dyn Builder, &str) -> anyhow::Result<bool> + Send + Sync;

/// Post-construction handler, applied directly to the entity.
pub type BindingFn = dyn Fn(&mut dyn Entity, &mut Binding<'_>, &str) -> anyhow::Result<()> + Send + Sync;

type Table<H> = HashMap<String, HashMap<String, Box<H>>>;

// ── AttributeInfo ─────────────────────────────────────────────────────────

/// One row of [`Syntax::describe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeInfo {
    pub name: String,
    pub phase: Phase,
    /// The type the handler was registered for (the type itself or an ancestor).
    pub declared_by: String,
}

// ── SyntaxBuilder ─────────────────────────────────────────────────────────

/// Mutable population phase of the registry.
///
/// ```rust
/// use trellis_build::{EntityBuilder, Syntax};
///
/// let syntax = Syntax::builder()
///     .declare("label", "widget")
///     .declare("widget", "entity")
///     .building::<EntityBuilder, _>("widget", "style", |b, v| {
///         b.style = v.to_string();
///         Ok(true)
///     })
///     .finish()
///     .unwrap();
///
/// assert!(syntax.building_handler("label", "style").is_some());
/// ```
pub struct SyntaxBuilder {
    parents: HashMap<String, String>,
    tags: HashMap<String, Box<dyn TagKind>>,
    building: Table<BuildingFn>,
    binding: Table<BindingFn>,
}

impl SyntaxBuilder {
    /// An empty registry with the lifecycle attributes (`on_create`,
    /// `on_close`) registered on [`ROOT_TYPE`].
    pub fn new() -> Self {
        let builder = Self {
            parents: HashMap::new(),
            tags: HashMap::new(),
            building: HashMap::new(),
            binding: HashMap::new(),
        };
        builder
            .binding_any(ROOT_TYPE, "on_create", |_, binding, value| {
                let action = binding.action(value.trim())?;
                binding.on_create(action);
                Ok(())
            })
            .binding_any(ROOT_TYPE, "on_close", |_, binding, value| {
                let action = binding.action(value.trim())?;
                binding.on_close(action);
                Ok(())
            })
    }

    /// Declare `ty` as a subtype of `parent`. Use [`ROOT_TYPE`] for top-level types.
    pub fn declare(mut self, ty: impl Into<String>, parent: impl Into<String>) -> Self {
        self.parents.insert(ty.into(), parent.into());
        self
    }

    /// Register the tag kind handling `<name>`.
    pub fn tag(mut self, name: impl Into<String>, kind: impl TagKind + 'static) -> Self {
        let name = name.into();
        if self.tags.insert(name.clone(), Box::new(kind)).is_some() {
            debug!("tag <{}> re-registered; keeping the latest kind", name);
        }
        self
    }

    /// Register a building handler operating on builder type `B`.
    ///
    /// The handler fails if the tag supplies a different builder type.
    pub fn building<B, F>(self, ty: &str, attribute: &str, handler: F) -> Self
    where
        B: Builder,
        F: Fn(&mut B, &str) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        let handler: Box<BuildingFn> = Box::new(move |builder: &mut dyn Builder, value: &str| {
            let Some(builder) = builder.downcast_mut::<B>() else {
                anyhow::bail!("expected builder {}", std::any::type_name::<B>());
            };
            handler(builder, value)
        });
        self.insert_building(ty, attribute, handler)
    }

    /// Register a binding handler operating on entity type `E`.
    ///
    /// The handler fails if the entity bound under `ty` is not an `E`; use
    /// [`binding_any`](SyntaxBuilder::binding_any) for supertypes shared by
    /// several concrete entity types.
    pub fn binding<E, F>(self, ty: &str, attribute: &str, handler: F) -> Self
    where
        E: Entity,
        F: Fn(&mut E, &mut Binding<'_>, &str) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.binding_any(ty, attribute, move |entity, binding, value| {
            let found = entity.type_name();
            let Some(entity) = entity.downcast_mut::<E>() else {
                anyhow::bail!("expected {}, found {}", std::any::type_name::<E>(), found);
            };
            handler(entity, binding, value)
        })
    }

    /// Register a binding handler working on any entity.
    pub fn binding_any<F>(mut self, ty: &str, attribute: &str, handler: F) -> Self
    where
        F: Fn(&mut dyn Entity, &mut Binding<'_>, &str) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let previous = self.binding
            .entry(ty.to_string())
            .or_default()
            .insert(attribute.to_string(), Box::new(handler));
        if previous.is_some() {
            debug!("binding handler {}.{} replaced", ty, attribute);
        }
        self
    }

    fn insert_building(mut self, ty: &str, attribute: &str, handler: Box<BuildingFn>) -> Self {
        let previous = self.building
            .entry(ty.to_string())
            .or_default()
            .insert(attribute.to_string(), handler);
        if previous.is_some() {
            debug!("building handler {}.{} replaced", ty, attribute);
        }
        self
    }

    /// Resolve every declared type's ancestry and freeze the registry.
    pub fn finish(self) -> Result<Syntax> {
        if self.parents.contains_key(ROOT_TYPE) {
            return Err(BuildError::InvalidSyntax(format!("{ROOT_TYPE:?} cannot be redeclared")));
        }

        let mut ancestry = HashMap::with_capacity(self.parents.len() + 1);
        ancestry.insert(ROOT_TYPE.to_string(), vec![ROOT_TYPE.to_string()]);

        for ty in self.parents.keys() {
            let mut chain = vec![ty.clone()];
            let mut seen: HashSet<&str> = HashSet::from([ty.as_str()]);
            let mut current = ty.as_str();
            while let Some(parent) = self.parents.get(current) {
                if !seen.insert(parent.as_str()) {
                    return Err(BuildError::InvalidSyntax(format!(
                        "type ancestry of {ty:?} contains a cycle through {parent:?}"
                    )));
                }
                chain.push(parent.clone());
                current = parent.as_str();
            }
            if current != ROOT_TYPE {
                return Err(BuildError::InvalidSyntax(format!(
                    "{current:?} (ancestor of {ty:?}) was never declared"
                )));
            }
            ancestry.insert(ty.clone(), chain);
        }

        debug!(
            "syntax ready: {} tags, {} types",
            self.tags.len(),
            ancestry.len()
        );
        Ok(Syntax {
            ancestry,
            tags: self.tags,
            building: self.building,
            binding: self.binding,
        })
    }
}

impl Default for SyntaxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ── Syntax ────────────────────────────────────────────────────────────────

/// Immutable registry consulted while parsing.
///
/// Populated once through [`SyntaxBuilder`] and then only read, so one
/// `Syntax` can serve any number of independent parses, including across
/// threads.
pub struct Syntax {
    ancestry: HashMap<String, Vec<String>>,
    tags: HashMap<String, Box<dyn TagKind>>,
    building: Table<BuildingFn>,
    binding: Table<BindingFn>,
}

impl Syntax {
    pub fn builder() -> SyntaxBuilder {
        SyntaxBuilder::new()
    }

    /// `ty` followed by its ancestors, most specific first, ending at [`ROOT_TYPE`].
    ///
    /// Undeclared types are treated as direct children of the root.
    pub fn ancestry<'a>(&'a self, ty: &'a str) -> Vec<&'a str> {
        match self.ancestry.get(ty) {
            Some(chain) => chain.iter().map(String::as_str).collect(),
            None => vec![ty, ROOT_TYPE],
        }
    }

    /// Most specific building handler for the tag's declared entity type.
    pub fn building_handler(&self, ty: &str, attribute: &str) -> Option<&BuildingFn> {
        self.resolve(&self.building, ty, attribute)
    }

    /// Most specific binding handler for the entity's concrete type.
    pub fn binding_handler(&self, entity: &dyn Entity, attribute: &str) -> Option<&BindingFn> {
        self.resolve(&self.binding, entity.type_name(), attribute)
    }

    pub fn tag_kind(&self, name: &str) -> Option<&dyn TagKind> {
        self.tags.get(name).map(|kind| &**kind)
    }

    /// Registered tag names, sorted.
    pub fn tag_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tags.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Every attribute that applies to `ty`, with the type that declares it.
    ///
    /// Shadowed supertype handlers are omitted. Sorted by name, building
    /// before binding.
    pub fn describe(&self, ty: &str) -> Vec<AttributeInfo> {
        let mut rows = Vec::new();
        for (phase, names) in [
            (Phase::Building, self.visible(&self.building, ty)),
            (Phase::Binding, self.visible(&self.binding, ty)),
        ] {
            rows.extend(names.into_iter().map(|(name, declared_by)| AttributeInfo {
                name: name.to_string(),
                phase,
                declared_by: declared_by.to_string(),
            }));
        }
        rows.sort_by(|a, b| a.name.cmp(&b.name).then(phase_rank(a.phase).cmp(&phase_rank(b.phase))));
        rows
    }

    // ── internal ──────────────────────────────────────────────────────────

    /// The single resolver: first hit along the precomputed ancestry chain.
    fn resolve<'s, H: ?Sized>(&'s self, table: &'s Table<H>, ty: &str, attribute: &str) -> Option<&'s H> {
        self.ancestry(ty)
            .into_iter()
            .find_map(|t| table.get(t)?.get(attribute))
            .map(|handler| &**handler)
    }

    fn visible<'s, H: ?Sized>(&'s self, table: &'s Table<H>, ty: &'s str) -> Vec<(&'s str, &'s str)> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for t in self.ancestry(ty) {
            let Some(handlers) = table.get(t) else { continue };
            for name in handlers.keys() {
                if seen.insert(name.as_str()) {
                    out.push((name.as_str(), t));
                }
            }
        }
        out
    }
}

fn phase_rank(phase: Phase) -> u8 {
    match phase {
        Phase::Building => 0,
        Phase::Binding  => 1,
    }
}

impl fmt::Debug for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Syntax")
            .field("tags", &self.tag_names())
            .field("types", &self.ancestry.len())
            .finish()
    }
}
