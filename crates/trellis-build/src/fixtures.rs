//! Entity types and a syntax shared by the crate's scenario tests.
//!
//! Every handler writes a line into a [`Journal`] so tests can assert on
//! exactly which handlers ran, and in which order.

use std::sync::{Arc, Mutex};

use crate::builder::{Builder, EntityBuilder};
use crate::entity::{Entity, TreeNode};
use crate::syntax::{Syntax, ROOT_TYPE};
use crate::tag::TagKind;

pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn record(journal: &Journal, entry: impl Into<String>) {
    journal.lock().unwrap().push(entry.into());
}

pub fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

fn style_of(builder: &mut dyn Builder) -> String {
    builder
        .downcast_ref::<EntityBuilder>()
        .map(|b| b.style.clone())
        .unwrap_or_default()
}

// ── Entities ──────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct Widget {
    pub built_style: String,
    pub text: Option<String>,
    pub tone: Option<String>,
    pub caption: Option<String>,
    pub width: Option<u32>,
    pub lines: Vec<String>,
    pub children: Vec<Box<dyn Entity>>,
}

impl Widget {
    pub fn styled(style: &str) -> Self {
        Self { built_style: style.to_string(), ..Self::default() }
    }
}

impl Entity for Widget {
    fn type_name(&self) -> &'static str { "widget" }
}

/// Composite of two widgets.
pub struct Panel {
    pub parts: [Widget; 2],
    pub text: Option<String>,
    pub title: Option<String>,
    pub closed: bool,
}

impl Entity for Panel {
    fn type_name(&self) -> &'static str { "panel" }

    fn components(&mut self) -> Option<Vec<&mut dyn Entity>> {
        Some(self.parts.iter_mut().map(|w| w as &mut dyn Entity).collect())
    }
}

/// Claims to be composite but has nothing inside.
pub struct Hollow;

impl Entity for Hollow {
    fn type_name(&self) -> &'static str { "hollow" }

    fn components(&mut self) -> Option<Vec<&mut dyn Entity>> {
        Some(Vec::new())
    }
}

#[derive(Default)]
pub struct TreeHolder {
    pub label: Option<String>,
    pub nodes: Vec<TreeNode>,
    pub direct: Vec<Box<dyn Entity>>,
}

impl Entity for TreeHolder {
    fn type_name(&self) -> &'static str { "holder" }

    fn hierarchy(&mut self) -> Option<&mut Vec<TreeNode>> {
        Some(&mut self.nodes)
    }
}

#[derive(Default)]
pub struct Leaf {
    pub text: String,
    pub tip: Option<String>,
}

impl Entity for Leaf {
    fn type_name(&self) -> &'static str { "leaf" }
}

pub struct Tip {
    pub text: String,
}

impl Entity for Tip {
    fn type_name(&self) -> &'static str { "tip" }

    fn is_attachable(&self) -> bool { true }

    fn attach_to(self: Box<Self>, target: &mut dyn Entity) -> anyhow::Result<()> {
        let found = target.type_name();
        let Some(leaf) = target.downcast_mut::<Leaf>() else {
            anyhow::bail!("tips only attach to leaves, not {found}");
        };
        leaf.tip = Some(self.text);
        Ok(())
    }
}

// ── Tag kinds ─────────────────────────────────────────────────────────────

struct WidgetKind {
    journal: Journal,
}

impl TagKind for WidgetKind {
    fn entity_type(&self) -> &str { "widget" }

    fn instantiate(&self, builder: &mut dyn Builder) -> anyhow::Result<Box<dyn Entity>> {
        Ok(Box::new(Widget::styled(&style_of(builder))))
    }

    fn handle_valid_child(&self, parent: &mut dyn Entity, child: Box<dyn Entity>) -> anyhow::Result<()> {
        let Some(widget) = parent.downcast_mut::<Widget>() else {
            anyhow::bail!("expected a widget");
        };
        record(&self.journal, format!("valid child {}", child.type_name()));
        widget.children.push(child);
        Ok(())
    }

    fn handle_plain_text(&self, entity: &mut dyn Entity, line: &str) -> anyhow::Result<()> {
        let Some(widget) = entity.downcast_mut::<Widget>() else {
            anyhow::bail!("expected a widget");
        };
        record(&self.journal, format!("text {line}"));
        widget.lines.push(line.to_string());
        Ok(())
    }
}

struct PanelKind {
    journal: Journal,
}

impl TagKind for PanelKind {
    fn entity_type(&self) -> &str { "panel" }

    fn instantiate(&self, _builder: &mut dyn Builder) -> anyhow::Result<Box<dyn Entity>> {
        Ok(Box::new(Panel {
            parts: [Widget::styled("first"), Widget::styled("second")],
            text: None,
            title: None,
            closed: false,
        }))
    }

    fn on_close(&self, entity: &mut dyn Entity) -> anyhow::Result<()> {
        record(&self.journal, "panel hook");
        if let Some(panel) = entity.downcast_mut::<Panel>() {
            panel.closed = true;
        }
        Ok(())
    }
}

struct HollowKind;

impl TagKind for HollowKind {
    fn entity_type(&self) -> &str { "hollow" }

    fn instantiate(&self, _builder: &mut dyn Builder) -> anyhow::Result<Box<dyn Entity>> {
        Ok(Box::new(Hollow))
    }
}

struct HolderKind {
    journal: Journal,
}

impl TagKind for HolderKind {
    fn entity_type(&self) -> &str { "holder" }

    fn instantiate(&self, _builder: &mut dyn Builder) -> anyhow::Result<Box<dyn Entity>> {
        Ok(Box::new(TreeHolder::default()))
    }

    fn handle_valid_child(&self, parent: &mut dyn Entity, child: Box<dyn Entity>) -> anyhow::Result<()> {
        record(&self.journal, format!("valid child {}", child.type_name()));
        if let Some(holder) = parent.downcast_mut::<TreeHolder>() {
            holder.direct.push(child);
        }
        Ok(())
    }
}

struct LeafKind;

impl TagKind for LeafKind {
    fn entity_type(&self) -> &str { "leaf" }

    fn instantiate(&self, _builder: &mut dyn Builder) -> anyhow::Result<Box<dyn Entity>> {
        Ok(Box::new(Leaf::default()))
    }
}

struct TipKind;

impl TagKind for TipKind {
    fn entity_type(&self) -> &str { "tip" }

    fn instantiate(&self, builder: &mut dyn Builder) -> anyhow::Result<Box<dyn Entity>> {
        let text = builder
            .downcast_ref::<EntityBuilder>()
            .and_then(|b| b.text.clone())
            .unwrap_or_default();
        Ok(Box::new(Tip { text }))
    }
}

struct NodeKind;

impl TagKind for NodeKind {
    fn entity_type(&self) -> &str { "node" }

    fn instantiate(&self, _builder: &mut dyn Builder) -> anyhow::Result<Box<dyn Entity>> {
        Ok(Box::new(TreeNode::leaf("")))
    }
}

// ── Syntax ────────────────────────────────────────────────────────────────

pub fn fixture_syntax() -> (Syntax, Journal) {
    let journal = Journal::default();
    let syntax = Syntax::builder()
        .declare("widget", ROOT_TYPE)
        .declare("panel", ROOT_TYPE)
        .declare("hollow", ROOT_TYPE)
        .declare("holder", ROOT_TYPE)
        .declare("leaf", ROOT_TYPE)
        .declare("tip", ROOT_TYPE)
        .tag("widget", WidgetKind { journal: journal.clone() })
        .tag("panel", PanelKind { journal: journal.clone() })
        .tag("hollow", HollowKind)
        .tag("holder", HolderKind { journal: journal.clone() })
        .tag("leaf", LeafKind)
        .tag("tip", TipKind)
        .tag("node", NodeKind)
        .building::<EntityBuilder, _>("widget", "style", {
            let journal = journal.clone();
            move |b, v| {
                anyhow::ensure!(!v.is_empty(), "style must not be empty");
                b.style = v.to_string();
                record(&journal, format!("build style={v}"));
                Ok(true)
            }
        })
        .building::<EntityBuilder, _>("widget", "tone", {
            let journal = journal.clone();
            move |_, v| {
                record(&journal, format!("build tone={v} (declined)"));
                Ok(false)
            }
        })
        .binding::<Widget, _>("widget", "tone", {
            let journal = journal.clone();
            move |w, _, v| {
                w.tone = Some(v.to_string());
                record(&journal, format!("bind tone={v} on widget"));
                Ok(())
            }
        })
        .binding::<Widget, _>("widget", "text", {
            let journal = journal.clone();
            move |w, _, v| {
                w.text = Some(v.to_string());
                record(&journal, format!("bind text={v} on widget"));
                Ok(())
            }
        })
        .binding::<Widget, _>("widget", "caption", {
            let journal = journal.clone();
            move |w, _, v| {
                w.caption = Some(v.to_string());
                record(&journal, format!("bind caption={v} on widget"));
                Ok(())
            }
        })
        .binding::<Widget, _>("widget", "width", |w, _, v| {
            w.width = Some(v.parse::<u32>()?);
            Ok(())
        })
        .binding_any("widget", "part_close", |_, binding, v| {
            let action = binding.action(v)?;
            binding.on_close(action);
            Ok(())
        })
        .binding_any("widget", "part_create", {
            let journal = journal.clone();
            move |_, binding, v| {
                record(&journal, format!("bind part_create={v} in <{}>", binding.tag_name()));
                let action = binding.action(v)?;
                binding.on_create(action);
                Ok(())
            }
        })
        .binding::<Panel, _>("panel", "text", {
            let journal = journal.clone();
            move |p, _, v| {
                p.text = Some(v.to_string());
                record(&journal, format!("bind text={v} on panel"));
                Ok(())
            }
        })
        .binding::<Panel, _>("panel", "title", {
            let journal = journal.clone();
            move |p, _, v| {
                p.title = Some(v.to_string());
                record(&journal, format!("bind title={v} on panel"));
                Ok(())
            }
        })
        .binding::<TreeHolder, _>("holder", "label", {
            let journal = journal.clone();
            move |h, _, v| {
                h.label = Some(v.to_string());
                record(&journal, format!("bind label={v} on holder"));
                Ok(())
            }
        })
        .binding::<Leaf, _>("leaf", "text", {
            let journal = journal.clone();
            move |l, _, v| {
                l.text = v.to_string();
                record(&journal, format!("bind text={v} on leaf"));
                Ok(())
            }
        })
        .building::<EntityBuilder, _>("tip", "text", |b, v| {
            b.text = Some(v.to_string());
            Ok(true)
        })
        .finish()
        .unwrap();

    (syntax, journal)
}
