//=========================================================================
// Markup Lexer
//=========================================================================
//
// Splits raw markup into text runs and tags.
//
//   "Hi <c color=\"ff0000\">there</c>&amp;" →
//     Text("Hi "), Open(c, [color]), Text("there"), Close(c), Text("&")
//
// Entities (`&lt;` `&gt;` `&amp;` `&quot;` `&apos;` `&#NN;` `&#xNN;`)
// are decoded inside text runs. Offsets are char offsets into the source.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::iter::Peekable;
use std::str::Chars;

//=== Internal Dependencies ===============================================

use crate::core::error::MarkupError;

//=== Token ===============================================================

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Text(String),
    Open {
        name: String,
        attributes: Vec<(String, String)>,
        self_closing: bool,
        offset: usize,
    },
    Close {
        name: String,
        offset: usize,
    },
}

//=== Lexer ===============================================================

pub(crate) struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    offset: usize,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            offset: 0,
        }
    }

    /// Lexes the whole source.
    pub(crate) fn tokenize(mut self) -> Result<Vec<Token>, MarkupError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    //--- Tokens -----------------------------------------------------------

    fn next_token(&mut self) -> Result<Option<Token>, MarkupError> {
        match self.chars.peek() {
            None => Ok(None),
            Some('<') => self.tag().map(Some),
            Some(_) => self.text().map(Some),
        }
    }

    fn text(&mut self) -> Result<Token, MarkupError> {
        let mut text = String::new();
        while let Some(&c) = self.chars.peek() {
            match c {
                '<' => break,
                '&' => text.push(self.entity()?),
                _ => {
                    self.bump();
                    text.push(c);
                }
            }
        }
        Ok(Token::Text(text))
    }

    fn tag(&mut self) -> Result<Token, MarkupError> {
        let start = self.offset;
        self.bump();

        let closing = self.eat('/');
        let name = self.identifier();
        if name.is_empty() {
            return Err(self.malformed_or_eof(start, name, "missing tag name"));
        }

        if closing {
            self.skip_whitespace();
            return match self.bump() {
                Some('>') => Ok(Token::Close { name, offset: start }),
                Some(_) => Err(MarkupError::MalformedTag {
                    tag: name,
                    offset: start,
                    reason: "closing tags take no attributes",
                }),
                None => Err(MarkupError::UnterminatedTag { offset: start }),
            };
        }

        let mut attributes: Vec<(String, String)> = Vec::new();
        loop {
            self.skip_whitespace();
            match self.chars.peek() {
                None => return Err(MarkupError::UnterminatedTag { offset: start }),
                Some('>') => {
                    self.bump();
                    return Ok(Token::Open { name, attributes, self_closing: false, offset: start });
                }
                Some('/') => {
                    self.bump();
                    return match self.bump() {
                        Some('>') => {
                            Ok(Token::Open { name, attributes, self_closing: true, offset: start })
                        }
                        Some(_) => Err(MarkupError::MalformedTag {
                            tag: name,
                            offset: start,
                            reason: "expected '>' after '/'",
                        }),
                        None => Err(MarkupError::UnterminatedTag { offset: start }),
                    };
                }
                Some(_) => {
                    let (key, value) = self.attribute(start, &name)?;
                    if attributes.iter().any(|(existing, _)| *existing == key) {
                        return Err(MarkupError::MalformedTag {
                            tag: name,
                            offset: start,
                            reason: "duplicate attribute",
                        });
                    }
                    attributes.push((key, value));
                }
            }
        }
    }

    fn attribute(&mut self, start: usize, tag: &str) -> Result<(String, String), MarkupError> {
        let key = self.identifier();
        if key.is_empty() {
            return Err(self.malformed_or_eof(start, tag.to_string(), "invalid attribute name"));
        }

        self.skip_whitespace();
        if !self.eat('=') {
            return Err(self.malformed_or_eof(start, tag.to_string(), "attribute without value"));
        }
        self.skip_whitespace();

        let quote = match self.chars.peek() {
            Some(&q) if q == '"' || q == '\'' => q,
            _ => return Err(self.malformed_or_eof(start, tag.to_string(), "unquoted attribute value")),
        };
        self.bump();

        let mut value = String::new();
        loop {
            match self.chars.peek() {
                None => return Err(MarkupError::UnterminatedTag { offset: start }),
                Some(&c) if c == quote => {
                    self.bump();
                    break;
                }
                Some('&') => value.push(self.entity()?),
                Some(&c) => {
                    self.bump();
                    value.push(c);
                }
            }
        }

        Ok((key, value))
    }

    //--- Entities ---------------------------------------------------------

    /// Decodes one `&...;` entity. The cursor sits on the `&`.
    fn entity(&mut self) -> Result<char, MarkupError> {
        let start = self.offset;
        self.bump();

        let mut name = String::new();
        loop {
            match self.chars.peek() {
                Some(';') => {
                    self.bump();
                    break;
                }
                Some(&c) if c.is_ascii_alphanumeric() || c == '#' => {
                    self.bump();
                    name.push(c);
                }
                _ => return Err(MarkupError::UnknownEntity { entity: name, offset: start }),
            }
        }

        let decoded = match name.as_str() {
            "lt" => Some('<'),
            "gt" => Some('>'),
            "amp" => Some('&'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => name.strip_prefix('#').and_then(|number| {
                let code = match number.strip_prefix(['x', 'X']) {
                    Some(hex) => u32::from_str_radix(hex, 16).ok(),
                    None => number.parse::<u32>().ok(),
                };
                code.and_then(char::from_u32)
            }),
        };

        decoded.ok_or(MarkupError::UnknownEntity { entity: name, offset: start })
    }

    //--- Internal Helpers -------------------------------------------------

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.offset += 1;
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.chars.peek() == Some(&expected) {
            self.bump();
            return true;
        }
        false
    }

    fn identifier(&mut self) -> String {
        let mut ident = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                self.bump();
                ident.push(c);
            } else {
                break;
            }
        }
        ident
    }

    fn skip_whitespace(&mut self) {
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.bump();
        }
    }

    /// Running out of input inside a tag always reports it as unterminated.
    fn malformed_or_eof(&mut self, offset: usize, tag: String, reason: &'static str) -> MarkupError {
        if self.chars.peek().is_none() {
            MarkupError::UnterminatedTag { offset }
        } else {
            MarkupError::MalformedTag { tag, offset, reason }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
