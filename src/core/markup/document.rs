//=========================================================================
// Parsed Document
//=========================================================================
//
// Immutable result of parsing one line of dialogue markup.
//
// Layout:
//   text    → flat display string (tags removed, entities decoded)
//   delays  → char index → extra seconds before that char reveals
//   nodes   → arena mirroring the tag nesting, root at index 0
//   styles  → resolved style of every char
//   spans   → contiguous runs of chars sharing one style
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::collections::BTreeMap;
use std::ops::Range;

//=== External Dependencies ===============================================

use glam::Vec2;

//=== Color ===============================================================

/// RGBA text tint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    /// Parses `RRGGBB` or `RRGGBBAA`, with an optional leading `#`.
    pub fn from_hex(value: &str) -> Option<Self> {
        let hex = value.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
                a: byte(6)?,
            }),
            _ => None,
        }
    }

    /// Same color with its alpha scaled by `factor` (clamped to 0..=1).
    pub fn faded(self, factor: f32) -> Self {
        let factor = factor.clamp(0.0, 1.0);
        Self {
            a: (self.a as f32 * factor).round() as u8,
            ..self
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

//=== Tag =================================================================

/// Closed set of markup elements, resolved once at parse time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tag {
    /// `<left>` / `<right>`: a literal angle bracket.
    Escape(char),

    /// `<d time="S">`: extra delay before the char at `at`.
    Delay { seconds: f32, at: usize },

    /// `<c color="RRGGBB">`: tints enclosed text (`None` leaves it as is).
    Color(Option<Color>),

    /// `<wavy offset="C">`: vertical sine animation shifted by `phase`.
    Wave { phase: f32 },

    /// `<shake strength="N">`: fixed random offset scaled by `strength`.
    Shake { strength: f32, vector: Vec2 },
}

impl Tag {
    /// Markup name of the element.
    pub fn name(&self) -> &'static str {
        match self {
            Tag::Escape('<') => "left",
            Tag::Escape(_) => "right",
            Tag::Delay { .. } => "d",
            Tag::Color(_) => "c",
            Tag::Wave { .. } => "wavy",
            Tag::Shake { .. } => "shake",
        }
    }
}

//=== Nodes ===============================================================

/// Index of a node in the document arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Root,
    Text,
    Element(Tag),
}

/// One node of the style tree.
///
/// `range` is the span of flat-text chars the node covers.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub range: Range<usize>,
}

//=== Styles ==============================================================

/// Style resolved for a single char (innermost element wins).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlyphStyle {
    pub color: Option<Color>,

    /// Phase shift of the wave animation, in cycles.
    pub wave: Option<f32>,

    /// Strength and per-element random vector of the shake animation.
    pub shake: Option<(f32, Vec2)>,
}

impl GlyphStyle {
    pub fn is_plain(&self) -> bool {
        *self == GlyphStyle::default()
    }
}

/// Contiguous run of chars sharing one style.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSpan {
    pub range: Range<usize>,
    pub style: GlyphStyle,
}

//=== Document ============================================================

/// Parsed line of dialogue. Never mutated after parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub(crate) text: String,
    pub(crate) byte_offsets: Vec<usize>,
    pub(crate) delays: BTreeMap<usize, f32>,
    pub(crate) nodes: Vec<Node>,
    pub(crate) styles: Vec<GlyphStyle>,
    pub(crate) spans: Vec<StyleSpan>,
}

impl Document {
    //--- Text -------------------------------------------------------------

    /// Flat display text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of chars in the flat text.
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// The first `count` chars of the flat text.
    pub fn visible(&self, count: usize) -> &str {
        match self.byte_offsets.get(count) {
            Some(&end) => &self.text[..end],
            None => &self.text,
        }
    }

    /// Char at `index`, if any.
    pub fn char_at(&self, index: usize) -> Option<char> {
        let start = *self.byte_offsets.get(index)?;
        self.text[start..].chars().next()
    }

    //--- Delays -----------------------------------------------------------

    pub fn delays(&self) -> &BTreeMap<usize, f32> {
        &self.delays
    }

    /// Extra delay before the char at `index` reveals.
    pub fn delay_at(&self, index: usize) -> f32 {
        self.delays.get(&index).copied().unwrap_or(0.0)
    }

    /// Sum of every delay anchored at or before `index`.
    pub fn delays_up_to(&self, index: usize) -> f32 {
        self.delays.range(..=index).map(|(_, seconds)| seconds).sum()
    }

    /// Sum of every delay, including trailing ones.
    pub fn total_delay(&self) -> f32 {
        self.delays.values().sum()
    }

    /// Time from first reveal until the last char has fully eased in.
    pub fn total_duration(&self, interval: f32, ease_in: f32) -> f32 {
        self.len().saturating_sub(1) as f32 * interval + ease_in + self.total_delay()
    }

    //--- Styles -----------------------------------------------------------

    pub fn style(&self, index: usize) -> Option<&GlyphStyle> {
        self.styles.get(index)
    }

    pub fn spans(&self) -> &[StyleSpan] {
        &self.spans
    }

    //--- Tree -------------------------------------------------------------

    pub fn root(&self) -> &Node {
        &self.nodes[NodeId::ROOT.0]
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }

    /// Every element node, in document order.
    pub fn elements(&self) -> impl Iterator<Item = &Tag> {
        self.nodes.iter().filter_map(|node| match &node.kind {
            NodeKind::Element(tag) => Some(tag),
            _ => None,
        })
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
