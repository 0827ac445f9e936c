use log::debug;

use super::widget::{Tooltip, Widget, WidgetKind};
use crate::builder::{Builder, EntityBuilder};
use crate::entity::{Entity, TreeNode};
use crate::tag::TagKind;

fn entity_builder(builder: &mut dyn Builder) -> anyhow::Result<&EntityBuilder> {
    builder
        .downcast_ref::<EntityBuilder>()
        .ok_or_else(|| anyhow::anyhow!("expected the default entity builder"))
}

fn as_widget(entity: &mut dyn Entity) -> anyhow::Result<&mut Widget> {
    let found = entity.type_name();
    entity
        .downcast_mut::<Widget>()
        .ok_or_else(|| anyhow::anyhow!("expected a widget, found {found}"))
}

// ── WidgetTag ─────────────────────────────────────────────────────────────

pub(super) struct WidgetTag {
    pub kind: WidgetKind,
}

impl TagKind for WidgetTag {
    fn entity_type(&self) -> &str {
        self.kind.type_name()
    }

    fn instantiate(&self, builder: &mut dyn Builder) -> anyhow::Result<Box<dyn Entity>> {
        Ok(Box::new(Widget::from_builder(self.kind, entity_builder(builder)?)))
    }

    fn handle_valid_child(&self, parent: &mut dyn Entity, child: Box<dyn Entity>) -> anyhow::Result<()> {
        anyhow::ensure!(self.kind.is_container(), "{} holds no children", self.kind.type_name());
        as_widget(parent)?.children.push(child);
        Ok(())
    }

    fn handle_plain_text(&self, entity: &mut dyn Entity, line: &str) -> anyhow::Result<()> {
        let widget = as_widget(entity)?;
        if self.kind.takes_text() {
            widget.push_text(line);
        } else if self.kind.is_container() {
            let mut label = Widget::new(WidgetKind::Label);
            label.text = Some(line.to_string());
            widget.children.push(Box::new(label));
        } else {
            anyhow::bail!("{} does not accept plain text", self.kind.type_name());
        }
        Ok(())
    }

    fn on_close(&self, entity: &mut dyn Entity) -> anyhow::Result<()> {
        if self.kind == WidgetKind::Window {
            let window = as_widget(entity)?;
            window.packed = true;
            debug!("packed window with {} children", window.children.len());
        }
        Ok(())
    }
}

// ── NodeTag ───────────────────────────────────────────────────────────────

pub(super) struct NodeTag;

impl TagKind for NodeTag {
    fn entity_type(&self) -> &str {
        "node"
    }

    fn instantiate(&self, builder: &mut dyn Builder) -> anyhow::Result<Box<dyn Entity>> {
        let text = entity_builder(builder)?.text.clone().unwrap_or_default();
        Ok(Box::new(TreeNode::leaf(text)))
    }
}

// ── TooltipTag ────────────────────────────────────────────────────────────

pub(super) struct TooltipTag;

impl TagKind for TooltipTag {
    fn entity_type(&self) -> &str {
        "tooltip"
    }

    fn instantiate(&self, builder: &mut dyn Builder) -> anyhow::Result<Box<dyn Entity>> {
        let text = entity_builder(builder)?.text.clone().unwrap_or_default();
        Ok(Box::new(Tooltip { text }))
    }

    fn handle_plain_text(&self, entity: &mut dyn Entity, line: &str) -> anyhow::Result<()> {
        let found = entity.type_name();
        let Some(tooltip) = entity.downcast_mut::<Tooltip>() else {
            anyhow::bail!("expected a tooltip, found {found}");
        };
        if !tooltip.text.is_empty() {
            tooltip.text.push(' ');
        }
        tooltip.text.push_str(line);
        Ok(())
    }
}
