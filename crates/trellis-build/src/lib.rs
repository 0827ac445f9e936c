//! Trellis build: turns tags of Trellis markup into live entities.
//!
//! Each tag is constructed in two phases. **Building** handlers run before
//! the entity exists and write into a [`Builder`]; the tag kind then
//! instantiates the entity. **Binding** handlers run afterwards and mutate
//! the entity directly. Handlers are registered per entity type in a
//! [`Syntax`] and inherited along a declared type ancestry.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`syntax`] | `SyntaxBuilder`, `Syntax`: handler registry and ancestry |
//! | [`tag`] | `TagKind`, `Binding`: per-tag behaviour and handler context |
//! | [`assemble`] | `Assembler`: document walk and child placement |
//! | [`entity`] | `Entity` capabilities, `TreeNode`, `TextLeaf` |
//! | [`builder`] | `Builder`, `EntityBuilder` |
//! | [`lifecycle`] | named `Actions`, on-create / on-close callbacks |
//! | [`config`] | `BuildConfig` (strict or lenient) |
//! | [`error`] | `BuildError` |
//! | [`logging`] | `init_logging` for binaries |
//! | [`scene`] | reference widget set and `standard_syntax` |
//!
//! # Quick start
//!
//! ```rust
//! use trellis_build::{scene, Assembler};
//!
//! let syntax = scene::standard_syntax().unwrap();
//! let roots = Assembler::new(&syntax)
//!     .strict(false)
//!     .parse_str(r#"<group spacing="8"><label text="Hi" glow="1"/></group>"#)
//!     .unwrap();
//! print!("{}", scene::outline(&*roots[0]));
//! ```
//!
//! # Custom entities
//!
//! Implement [`Entity`] for the runtime object and [`TagKind`] for the tag
//! that creates it, then register both plus any attributes:
//!
//! ```rust
//! use trellis_build::{Builder, Entity, Syntax, TagKind, ROOT_TYPE};
//!
//! struct Gauge { max: u32 }
//! impl Entity for Gauge {
//!     fn type_name(&self) -> &'static str { "gauge" }
//! }
//!
//! struct GaugeTag;
//! impl TagKind for GaugeTag {
//!     fn entity_type(&self) -> &str { "gauge" }
//!     fn instantiate(&self, _: &mut dyn Builder) -> anyhow::Result<Box<dyn Entity>> {
//!         Ok(Box::new(Gauge { max: 100 }))
//!     }
//! }
//!
//! let syntax = Syntax::builder()
//!     .declare("gauge", ROOT_TYPE)
//!     .tag("gauge", GaugeTag)
//!     .binding::<Gauge, _>("gauge", "max", |g, _, v| {
//!         g.max = v.parse()?;
//!         Ok(())
//!     })
//!     .finish()
//!     .unwrap();
//! # let _ = syntax;
//! ```

pub mod assemble;
pub mod builder;
pub mod config;
pub mod entity;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod scene;
pub mod syntax;
pub mod tag;

#[cfg(test)]
mod fixtures;

pub use assemble::Assembler;
pub use builder::{Builder, EntityBuilder};
pub use config::BuildConfig;
pub use entity::{AsAny, Entity, TextLeaf, TreeNode};
pub use error::{BuildError, Phase, Result};
pub use lifecycle::{Action, Actions, Lifecycle};
pub use syntax::{AttributeInfo, Syntax, SyntaxBuilder, ROOT_TYPE};
pub use tag::{Binding, TagKind};
