//! Lexer, parser, and tag tree for **Trellis markup** (`.tml`).
//!
//! This crate only turns source text into a [`Document`] of [`TagNode`]s.
//! Resolving tags and attributes into live objects is the job of
//! `trellis-build`; keeping the two apart lets editors and linters read
//! markup without linking any entity types.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`ast`] | `Document`, `TagNode`, `Content`, `Attribute` |
//! | [`error`] | `ParseError`, `ErrorKind`, `Position` |
//! | [`lexer`] | `Lexer`, `Token` |
//! | [`parser`] | `parse_str` entry point |
//!
//! # Quick start
//!
//! ```rust
//! use trellis_markup::parse_str;
//!
//! let src = r#"
//!     <window text="Settings">
//!         <label text="Hello"/>
//!     </window>
//! "#;
//!
//! let doc = parse_str(src).unwrap();
//! assert_eq!(doc.roots[0].name, "window");
//! assert_eq!(doc.roots[0].children().next().unwrap().get("text"), Some("Hello"));
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;

pub use ast::{Attribute, Content, Document, TagNode};
pub use error::{ErrorKind, ParseError, Position};
pub use parser::parse_str;
