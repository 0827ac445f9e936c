use crate::builder::EntityBuilder;
use crate::entity::{Entity, TreeNode};

// ── WidgetKind ────────────────────────────────────────────────────────────

/// Which widget a [`Widget`] is. Doubles as the registry type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    Label,
    Button,
    Group,
    Window,
    Tree,
}

impl WidgetKind {
    pub fn type_name(self) -> &'static str {
        match self {
            WidgetKind::Label  => "label",
            WidgetKind::Button => "button",
            WidgetKind::Group  => "group",
            WidgetKind::Window => "window",
            WidgetKind::Tree   => "tree",
        }
    }

    /// Groups and windows hold structural children.
    pub fn is_container(self) -> bool {
        matches!(self, WidgetKind::Group | WidgetKind::Window)
    }

    /// Labels and buttons collect inner text into their own text.
    pub fn takes_text(self) -> bool {
        matches!(self, WidgetKind::Label | WidgetKind::Button)
    }
}

// ── Align ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Start,
    Center,
    End,
}

impl Align {
    pub fn parse(value: &str) -> anyhow::Result<Self> {
        match value.trim() {
            "start"  => Ok(Align::Start),
            "center" => Ok(Align::Center),
            "end"    => Ok(Align::End),
            other    => anyhow::bail!("expected start, center or end, got {other:?}"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Align::Start  => "start",
            Align::Center => "center",
            Align::End    => "end",
        }
    }
}

// ── Widget ────────────────────────────────────────────────────────────────

/// The one entity type behind every widget tag.
///
/// A window is composite: its title bar is a label component that binds the
/// attributes the window itself does not know. A tree is a hierarchical-node
/// container.
pub struct Widget {
    kind: WidgetKind,
    pub style: String,
    pub text: Option<String>,
    pub visible: bool,
    pub tooltip: Option<String>,
    pub spacing: f32,
    pub align: Align,
    /// Event name pushed when the button is clicked.
    pub on_click: Option<String>,
    /// Set once the window has been laid out on close.
    pub packed: bool,
    pub children: Vec<Box<dyn Entity>>,
    pub title: Option<Box<Widget>>,
    pub nodes: Vec<TreeNode>,
}

impl Widget {
    pub fn new(kind: WidgetKind) -> Self {
        let title = (kind == WidgetKind::Window).then(|| Box::new(Widget::new(WidgetKind::Label)));
        Self {
            kind,
            style: EntityBuilder::DEFAULT_STYLE.to_string(),
            text: None,
            visible: true,
            tooltip: None,
            spacing: 0.0,
            align: Align::Start,
            on_click: None,
            packed: false,
            children: Vec::new(),
            title,
            nodes: Vec::new(),
        }
    }

    /// A widget initialized from building-phase state.
    pub fn from_builder(kind: WidgetKind, builder: &EntityBuilder) -> Self {
        let mut widget = Self::new(kind);
        widget.style = builder.style.clone();
        widget.text = builder.text.clone();
        widget
    }

    pub fn kind(&self) -> WidgetKind {
        self.kind
    }

    /// Append a line, keeping earlier lines.
    pub fn push_text(&mut self, line: &str) {
        match &mut self.text {
            Some(text) => {
                text.push('\n');
                text.push_str(line);
            }
            None => self.text = Some(line.to_string()),
        }
    }
}

impl Entity for Widget {
    fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    fn components(&mut self) -> Option<Vec<&mut dyn Entity>> {
        let title = self.title.as_deref_mut()?;
        Some(vec![title as &mut dyn Entity])
    }

    fn hierarchy(&mut self) -> Option<&mut Vec<TreeNode>> {
        (self.kind == WidgetKind::Tree).then_some(&mut self.nodes)
    }
}

// ── Tooltip ───────────────────────────────────────────────────────────────

/// Attaches to any widget, whatever that widget accepts as children.
pub struct Tooltip {
    pub text: String,
}

impl Entity for Tooltip {
    fn type_name(&self) -> &'static str {
        "tooltip"
    }

    fn is_attachable(&self) -> bool {
        true
    }

    fn attach_to(self: Box<Self>, target: &mut dyn Entity) -> anyhow::Result<()> {
        let found = target.type_name();
        let Some(widget) = target.downcast_mut::<Widget>() else {
            anyhow::bail!("a tooltip needs a widget, found {found}");
        };
        widget.tooltip = Some(self.text);
        Ok(())
    }
}
