use crate::entity::{AsAny, Entity};

// ── Builder trait ─────────────────────────────────────────────────────────

/// Building-phase state for one tag, filled before the entity exists.
///
/// A builder belongs to exactly one tag and is dropped right after
/// [`finish_building`](Builder::finish_building).
pub trait Builder: AsAny {
    /// Transfer builder-only state onto the freshly instantiated entity.
    ///
    /// Called exactly once per builder.
    fn finish_building(&mut self, _entity: &mut dyn Entity) -> anyhow::Result<()> {
        Ok(())
    }
}

impl dyn Builder {
    pub fn downcast_mut<T: Builder>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    pub fn downcast_ref<T: Builder>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

// ── EntityBuilder ─────────────────────────────────────────────────────────

/// Default builder: a style name and optional initial text.
///
/// Tag kinds that need more construction-time state supply their own
/// [`Builder`] from `TagKind::new_builder`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityBuilder {
    pub style: String,
    pub text: Option<String>,
}

impl EntityBuilder {
    pub const DEFAULT_STYLE: &'static str = "default";
}

impl Default for EntityBuilder {
    fn default() -> Self {
        Self { style: Self::DEFAULT_STYLE.to_string(), text: None }
    }
}

impl Builder for EntityBuilder {}
