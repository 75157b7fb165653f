//=========================================================================
// Markup Tree Builder
//=========================================================================
//
// Turns lexer tokens into a `Document`.
//
// Open elements are kept on a stack (root excluded). Every char appended
// to the flat text takes the style folded from the open elements, outer
// to inner, so the innermost element of each kind wins.
//
// `<left>` and `<right>` are void: they never open an element, and a
// stray `</left>` or `</right>` is ignored.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::collections::BTreeMap;

//=== External Dependencies ===============================================

use glam::Vec2;
use log::trace;
use rand::Rng;

//=== Internal Dependencies ===============================================

use super::document::{Color, Document, GlyphStyle, Node, NodeId, NodeKind, StyleSpan, Tag};
use super::lexer::Token;
use crate::core::error::MarkupError;

//=== Builder =============================================================

struct OpenElement {
    id: NodeId,
    name: String,
}

pub(crate) struct Builder<'r, R: Rng> {
    rng: &'r mut R,
    text: String,
    byte_offsets: Vec<usize>,
    delays: BTreeMap<usize, f32>,
    nodes: Vec<Node>,
    styles: Vec<GlyphStyle>,
    open: Vec<OpenElement>,
}

impl<'r, R: Rng> Builder<'r, R> {
    pub(crate) fn new(rng: &'r mut R) -> Self {
        Self {
            rng,
            text: String::new(),
            byte_offsets: Vec::new(),
            delays: BTreeMap::new(),
            nodes: vec![Node {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
                range: 0..0,
            }],
            styles: Vec::new(),
            open: Vec::new(),
        }
    }

    //--- Tokens -----------------------------------------------------------

    pub(crate) fn push(&mut self, token: Token) -> Result<(), MarkupError> {
        match token {
            Token::Text(text) => {
                self.text_node(&text);
                Ok(())
            }
            Token::Open { name, attributes, self_closing, offset } => {
                self.open_element(name, &attributes, self_closing, offset)
            }
            Token::Close { name, offset } => self.close_element(name, offset),
        }
    }

    pub(crate) fn finish(mut self) -> Result<Document, MarkupError> {
        if let Some(unclosed) = self.open.last() {
            return Err(MarkupError::UnclosedElement { tag: unclosed.name.clone() });
        }

        let len = self.styles.len();
        self.nodes[NodeId::ROOT.0].range = 0..len;
        let spans = build_spans(&self.styles);

        Ok(Document {
            text: self.text,
            byte_offsets: self.byte_offsets,
            delays: self.delays,
            nodes: self.nodes,
            styles: self.styles,
            spans,
        })
    }

    //--- Elements ---------------------------------------------------------

    fn text_node(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let id = self.add_node(NodeKind::Text);
        let style = self.current_style();
        for c in text.chars() {
            self.push_char(c, style);
        }
        self.nodes[id.0].range.end = self.styles.len();
    }

    fn open_element(
        &mut self,
        name: String,
        attributes: &[(String, String)],
        self_closing: bool,
        offset: usize,
    ) -> Result<(), MarkupError> {
        let tag = self.resolve(&name, attributes, offset)?;
        let id = self.add_node(NodeKind::Element(tag));

        match tag {
            Tag::Escape(c) => {
                let style = self.current_style();
                self.push_char(c, style);
                self.nodes[id.0].range.end = self.styles.len();
            }
            Tag::Delay { seconds, at } => {
                if seconds > 0.0 {
                    *self.delays.entry(at).or_insert(0.0) += seconds;
                }
                if !self_closing {
                    self.open.push(OpenElement { id, name });
                }
            }
            _ => {
                if !self_closing {
                    self.open.push(OpenElement { id, name });
                }
            }
        }

        Ok(())
    }

    fn close_element(&mut self, name: String, offset: usize) -> Result<(), MarkupError> {
        if name == "left" || name == "right" {
            trace!(target: "dialogue", "Ignoring closing tag of void element </{}>", name);
            return Ok(());
        }

        let Some(top) = self.open.pop() else {
            return Err(MarkupError::UnexpectedClose { tag: name, offset });
        };
        if top.name != name {
            return Err(MarkupError::MismatchedClose {
                expected: top.name,
                found: name,
                offset,
            });
        }

        self.nodes[top.id.0].range.end = self.styles.len();
        Ok(())
    }

    //--- Tag Resolution ---------------------------------------------------

    fn resolve(
        &mut self,
        name: &str,
        attributes: &[(String, String)],
        offset: usize,
    ) -> Result<Tag, MarkupError> {
        let attribute = |key: &str| {
            attributes
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        match name {
            "left" => Ok(Tag::Escape('<')),
            "right" => Ok(Tag::Escape('>')),
            "d" => {
                let seconds = number("d", "time", attribute("time"))?.unwrap_or(0.0);
                if seconds < 0.0 {
                    return Err(MarkupError::NegativeDelay { value: seconds });
                }
                Ok(Tag::Delay { seconds, at: self.styles.len() })
            }
            "c" => match attribute("color") {
                Some(value) => Color::from_hex(value)
                    .map(|color| Tag::Color(Some(color)))
                    .ok_or_else(|| MarkupError::InvalidColor { value: value.to_string() }),
                None => Ok(Tag::Color(None)),
            },
            "wavy" => {
                let phase = number("wavy", "offset", attribute("offset"))?.unwrap_or(0.0);
                Ok(Tag::Wave { phase })
            }
            "shake" => {
                let strength = number("shake", "strength", attribute("strength"))?.unwrap_or(1.0);
                let vector = Vec2::new(
                    self.rng.random_range(-1.0..1.0),
                    self.rng.random_range(-1.0..1.0),
                );
                Ok(Tag::Shake { strength, vector })
            }
            _ => Err(MarkupError::UnknownTag { tag: name.to_string(), offset }),
        }
    }

    //--- Internal Helpers -------------------------------------------------

    fn add_node(&mut self, kind: NodeKind) -> NodeId {
        let parent = self.open.last().map_or(NodeId::ROOT, |open| open.id);
        let id = NodeId(self.nodes.len());
        let at = self.styles.len();

        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
            range: at..at,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    fn push_char(&mut self, c: char, style: GlyphStyle) {
        self.byte_offsets.push(self.text.len());
        self.text.push(c);
        self.styles.push(style);
    }

    fn current_style(&self) -> GlyphStyle {
        let mut style = GlyphStyle::default();
        for open in &self.open {
            match self.nodes[open.id.0].kind {
                NodeKind::Element(Tag::Color(Some(color))) => style.color = Some(color),
                NodeKind::Element(Tag::Wave { phase }) => style.wave = Some(phase),
                NodeKind::Element(Tag::Shake { strength, vector }) => {
                    style.shake = Some((strength, vector))
                }
                _ => {}
            }
        }
        style
    }
}

//=== Helpers =============================================================

/// Parses an optional numeric attribute. Present but malformed is an error.
fn number(
    tag: &'static str,
    attribute: &'static str,
    value: Option<&str>,
) -> Result<Option<f32>, MarkupError> {
    let Some(value) = value else {
        return Ok(None);
    };
    match value.trim().parse::<f32>() {
        Ok(number) if number.is_finite() => Ok(Some(number)),
        _ => Err(MarkupError::InvalidNumber {
            tag,
            attribute,
            value: value.to_string(),
        }),
    }
}

fn build_spans(styles: &[GlyphStyle]) -> Vec<StyleSpan> {
    let mut spans: Vec<StyleSpan> = Vec::new();
    for (i, style) in styles.iter().enumerate() {
        match spans.last_mut() {
            Some(span) if span.style == *style => span.range.end = i + 1,
            _ => spans.push(StyleSpan { range: i..i + 1, style: *style }),
        }
    }
    spans
}
