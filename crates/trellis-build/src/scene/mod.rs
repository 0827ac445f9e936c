//! A small reference widget set wired into a ready-made [`Syntax`].
//!
//! | Tag | Type | Notes |
//! |-----|------|-------|
//! | `label` | `label` ← `widget` | inner text appends to `text` |
//! | `button` | `button` ← `label` | `on_click` names an event |
//! | `group` | `group` ← `widget` | structural children; loose text becomes labels |
//! | `window` | `window` ← `group` | composite: the title bar is a label component |
//! | `tree` | `tree` ← `widget` | hierarchical: children and text become nodes |
//! | `node` | `node` | a tree node carrying a text leaf |
//! | `tooltip` | `tooltip` | attachable to any widget |

mod tags;
mod widget;

use std::fmt;

pub use widget::{Align, Tooltip, Widget, WidgetKind};

use crate::builder::EntityBuilder;
use crate::entity::{Entity, TextLeaf, TreeNode};
use crate::error::Result;
use crate::syntax::{Syntax, SyntaxBuilder, ROOT_TYPE};
use tags::{NodeTag, TooltipTag, WidgetTag};

/// The reference widget syntax, finished and ready to share.
pub fn standard_syntax() -> Result<Syntax> {
    register(Syntax::builder()).finish()
}

/// Add the reference types, tags and attributes to `builder`.
pub fn register(builder: SyntaxBuilder) -> SyntaxBuilder {
    let builder = builder
        .declare("widget", ROOT_TYPE)
        .declare("label", "widget")
        .declare("button", "label")
        .declare("group", "widget")
        .declare("window", "group")
        .declare("tree", "widget")
        .declare("node", ROOT_TYPE)
        .declare("tooltip", ROOT_TYPE);

    let builder = [
        WidgetKind::Label,
        WidgetKind::Button,
        WidgetKind::Group,
        WidgetKind::Window,
        WidgetKind::Tree,
    ]
    .into_iter()
    .fold(builder, |b, kind| b.tag(kind.type_name(), WidgetTag { kind }));

    builder
        .tag("node", NodeTag)
        .tag("tooltip", TooltipTag)
        // ── building ──
        .building::<EntityBuilder, _>("widget", "style", |b, v| {
            anyhow::ensure!(!v.trim().is_empty(), "style must not be blank");
            b.style = v.trim().to_string();
            Ok(true)
        })
        .building::<EntityBuilder, _>("label", "text", set_text)
        .building::<EntityBuilder, _>("node", "text", set_text)
        .building::<EntityBuilder, _>("tooltip", "text", set_text)
        // ── binding ──
        .binding::<Widget, _>("widget", "visible", |w, _, v| {
            w.visible = parse_bool(v)?;
            Ok(())
        })
        .binding::<Widget, _>("widget", "tooltip", |w, _, v| {
            w.tooltip = Some(v.to_string());
            Ok(())
        })
        .binding::<Widget, _>("label", "align", |w, _, v| {
            w.align = Align::parse(v)?;
            Ok(())
        })
        .binding::<Widget, _>("button", "on_click", |w, _, v| {
            anyhow::ensure!(!v.trim().is_empty(), "event name must not be blank");
            w.on_click = Some(v.trim().to_string());
            Ok(())
        })
        .binding::<Widget, _>("group", "spacing", |w, _, v| {
            let spacing: f32 = v.trim().parse()?;
            anyhow::ensure!(spacing >= 0.0, "spacing must not be negative");
            w.spacing = spacing;
            Ok(())
        })
        .binding::<Widget, _>("window", "title", |w, _, v| {
            if let Some(title) = w.title.as_deref_mut() {
                title.text = Some(v.to_string());
            }
            Ok(())
        })
}

fn set_text(builder: &mut EntityBuilder, value: &str) -> anyhow::Result<bool> {
    builder.text = Some(value.to_string());
    Ok(true)
}

fn parse_bool(value: &str) -> anyhow::Result<bool> {
    match value.trim() {
        "true"  => Ok(true),
        "false" => Ok(false),
        other   => anyhow::bail!("expected true or false, got {other:?}"),
    }
}

// ── Outline ───────────────────────────────────────────────────────────────

/// Indented one-line-per-entity dump of a built tree.
pub fn outline(entity: &dyn Entity) -> String {
    Outline(entity).to_string()
}

struct Outline<'a>(&'a dyn Entity);

impl fmt::Display for Outline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_entity(f, self.0, 0)
    }
}

fn write_entity(f: &mut fmt::Formatter<'_>, entity: &dyn Entity, depth: usize) -> fmt::Result {
    if let Some(widget) = entity.downcast_ref::<Widget>() {
        return write_widget(f, widget, depth);
    }
    if let Some(node) = entity.downcast_ref::<TreeNode>() {
        return write_node(f, node, depth);
    }
    indent(f, depth)?;
    match entity.downcast_ref::<TextLeaf>() {
        Some(leaf) => writeln!(f, "{:?}", leaf.text),
        None => writeln!(f, "{}", entity.type_name()),
    }
}

fn write_widget(f: &mut fmt::Formatter<'_>, widget: &Widget, depth: usize) -> fmt::Result {
    indent(f, depth)?;
    f.write_str(widget.kind().type_name())?;
    if let Some(text) = &widget.text {
        write!(f, " {text:?}")?;
    }
    if widget.style != EntityBuilder::DEFAULT_STYLE {
        write!(f, " [{}]", widget.style)?;
    }
    if widget.align != Align::Start {
        write!(f, " align={}", widget.align.as_str())?;
    }
    if widget.spacing != 0.0 {
        write!(f, " spacing={}", widget.spacing)?;
    }
    if !widget.visible {
        f.write_str(" hidden")?;
    }
    if let Some(tooltip) = &widget.tooltip {
        write!(f, " tooltip={tooltip:?}")?;
    }
    if let Some(event) = &widget.on_click {
        write!(f, " on_click={event}")?;
    }
    if widget.packed {
        f.write_str(" packed")?;
    }
    writeln!(f)?;

    if let Some(title) = &widget.title {
        if title.text.is_some() || title.align != Align::Start {
            indent(f, depth + 1)?;
            f.write_str("title: ")?;
            write_widget(f, title, 0)?;
        }
    }
    for child in &widget.children {
        write_entity(f, &**child, depth + 1)?;
    }
    for node in &widget.nodes {
        write_node(f, node, depth + 1)?;
    }
    Ok(())
}

fn write_node(f: &mut fmt::Formatter<'_>, node: &TreeNode, depth: usize) -> fmt::Result {
    write_entity(f, &*node.entity, depth)?;
    for child in &node.children {
        write_node(f, child, depth + 1)?;
    }
    Ok(())
}

fn indent(f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    write!(f, "{:width$}", "", width = depth * 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::Assembler;
    use crate::error::{BuildError, Phase};

    fn build(src: &str) -> Result<Vec<Box<dyn Entity>>> {
        let syntax = standard_syntax().unwrap();
        Assembler::new(&syntax).parse_str(src)
    }

    fn widget(entity: &dyn Entity) -> &Widget {
        entity.downcast_ref::<Widget>().unwrap()
    }

    #[test]
    fn sample_document_outline() {
        let roots = build(
            r#"
            <window title="Settings" style="dark" spacing="4" align="center">
                <label text="Theme"/>
                <button text="Apply" on_click="apply">
                    <tooltip text="Saves the theme"/>
                </button>
                <tree>
                    Appearance
                    <node text="Fonts"><node text="Size"/></node>
                </tree>
            </window>
            "#,
        )
        .unwrap();
        assert_eq!(outline(&*roots[0]), concat!(
            "window [dark] spacing=4 packed\n",
            "  title: label \"Settings\" align=center\n",
            "  label \"Theme\"\n",
            "  button \"Apply\" tooltip=\"Saves the theme\" on_click=apply\n",
            "  tree\n",
            "    \"Appearance\"\n",
            "    \"Fonts\"\n",
            "      \"Size\"\n",
        ));
    }

    #[test]
    fn window_title_takes_what_the_window_does_not_know() {
        let roots = build(r#"<window align="end" visible="false"/>"#).unwrap();
        let window = widget(&*roots[0]);
        assert!(!window.visible);
        let title = window.title.as_deref().unwrap();
        assert_eq!(title.align, Align::End);
        assert!(title.visible);
    }

    #[test]
    fn windows_are_packed_on_close() {
        let roots = build("<window/>").unwrap();
        assert!(widget(&*roots[0]).packed);
        let roots = build("<group/>").unwrap();
        assert!(!widget(&*roots[0]).packed);
    }

    #[test]
    fn loose_text_in_groups_becomes_labels() {
        let roots = build("<group>\n  one\n  two\n</group>").unwrap();
        let group = widget(&*roots[0]);
        let texts: Vec<_> = group.children.iter().map(|c| widget(&**c).text.clone()).collect();
        assert_eq!(texts, [Some("one".to_string()), Some("two".to_string())]);
    }

    #[test]
    fn label_text_lines_are_joined() {
        let roots = build("<label>\n  Hello\n  world\n</label>").unwrap();
        assert_eq!(widget(&*roots[0]).text.as_deref(), Some("Hello\nworld"));
    }

    #[test]
    fn tooltip_attaches_to_a_label() {
        let roots = build(r#"<label text="x"><tooltip text="tip"/></label>"#).unwrap();
        assert_eq!(widget(&*roots[0]).tooltip.as_deref(), Some("tip"));
    }

    #[test]
    fn labels_refuse_structural_children() {
        let err = build(r#"<label text="x"><group/></label>"#).err().unwrap();
        assert!(matches!(err, BuildError::InvalidChildPlacement { ref parent_type, .. } if parent_type == "label"));
    }

    #[test]
    fn tooltip_needs_a_widget() {
        let err = build(r#"<tree><node text="n"><tooltip text="t"/></node></tree>"#).err().unwrap();
        assert!(matches!(err, BuildError::InvalidChildPlacement { ref parent_type, .. } if parent_type == "node"));
    }

    #[test]
    fn bad_values_are_handler_failures() {
        let err = build(r#"<label visible="maybe"/>"#).err().unwrap();
        assert!(matches!(
            err,
            BuildError::HandlerFailure { ref attribute, phase: Phase::Binding, .. } if attribute == "visible"
        ));
        assert!(build(r#"<group spacing="-1"/>"#).is_err());
        assert!(build(r#"<group style=" "/>"#).is_err());
    }

    #[test]
    fn button_inherits_label_attributes() {
        let syntax = standard_syntax().unwrap();
        let names: Vec<String> = syntax.describe("button").into_iter().map(|a| a.name).collect();
        assert_eq!(names, [
            "align", "on_click", "on_close", "on_create", "style", "text", "tooltip", "visible",
        ]);
    }

    #[test]
    fn text_stays_between_the_children_it_was_written_between() {
        let roots = build(r#"<group><button text="A"/>tail<label text="B"/></group>"#).unwrap();
        assert_eq!(outline(&*roots[0]), concat!(
            "group\n",
            "  button \"A\"\n",
            "  label \"tail\"\n",
            "  label \"B\"\n",
        ));
    }

    #[test]
    fn one_syntax_serves_parallel_parses() {
        let syntax = standard_syntax().unwrap();
        let outlines: Vec<String> = std::thread::scope(|scope| {
            let workers: Vec<_> = ["<label text=\"left\"/>", "<label text=\"right\"/>"]
                .into_iter()
                .map(|src| {
                    let syntax = &syntax;
                    scope.spawn(move || {
                        let roots = Assembler::new(syntax).parse_str(src).unwrap();
                        outline(&*roots[0])
                    })
                })
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });
        assert_eq!(outlines, ["label \"left\"\n", "label \"right\"\n"]);
    }

    #[test]
    fn text_attribute_is_not_known_to_groups() {
        let err = build(r#"<group text="x"/>"#).err().unwrap();
        assert!(matches!(err, BuildError::UnknownAttribute { ref entity_type, .. } if entity_type == "group"));
    }
}
