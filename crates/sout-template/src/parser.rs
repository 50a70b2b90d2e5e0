//! Template parser.
//!
//! Turns template text into a tree of [`Node`]s in a single left-to-right
//! pass over the characters. The grammar has four delimiter characters
//! (see [`Delimiters`]):
//!
//! ```text
//! container := ( text | name | nesting )*
//! name      := OPEN path CLOSE
//! nesting   := OPEN path SEPARATOR container ( SEPARATOR container )* CLOSE
//! ```
//!
//! The escape character makes the character after it literal. Every node
//! records the [`Position`] it was found at, so render errors can point back
//! into the template.

use std::fmt;

use sout_core::{Delimiters, Position, SoutError, SoutResult};

/// A single node in a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Literal text, written out unchanged.
    Text {
        /// The text with escapes already removed.
        text: String,
        /// Where the text ended.
        position: Position,
    },
    /// A name, replaced by the value it resolves to: `{path}`.
    Name {
        /// The (possibly dotted, possibly empty) path.
        path: String,
        /// The position of the closing delimiter.
        position: Position,
    },
    /// A name with parts: `{path|part|part}`.
    Nesting {
        /// The (possibly dotted, possibly empty) path.
        path: String,
        /// The parts, in order. There is always at least one.
        parts: Vec<Container>,
        /// The position of the first separator.
        position: Position,
    },
}

impl Node {
    /// Returns where this node was found.
    pub const fn position(&self) -> Position {
        match self {
            Self::Text { position, .. }
            | Self::Name { position, .. }
            | Self::Nesting { position, .. } => *position,
        }
    }
}

/// An ordered sequence of nodes: the whole template, or one part of a
/// nesting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Container {
    /// The nodes, in template order.
    pub children: Vec<Node>,
    /// Where the container starts.
    pub position: Position,
}

impl Container {
    /// Creates an empty container starting at `position`.
    pub const fn new(position: Position) -> Self {
        Self {
            children: Vec::new(),
            position,
        }
    }

    /// Counts the nodes in this container, including those inside nestings.
    pub fn node_count(&self) -> usize {
        self.children
            .iter()
            .map(|node| match node {
                Node::Nesting { parts, .. } => 1 + parts.iter().map(Self::node_count).sum::<usize>(),
                _ => 1,
            })
            .sum()
    }
}

/// Shows the tree in a bracketed notation, `❰name❚part❚part❱`, which is
/// handy in logs and test failures.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text { text, .. } => f.write_str(text),
            Self::Name { path, .. } => write!(f, "❰{path}❱"),
            Self::Nesting { path, parts, .. } => {
                write!(f, "❰{path}")?;
                for part in parts {
                    write!(f, "❚{part}")?;
                }
                f.write_str("❱")
            }
        }
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for child in &self.children {
            write!(f, "{child}")?;
        }
        Ok(())
    }
}

/// Parses template text into its root [`Container`].
///
/// # Errors
///
/// Returns [`SoutError::Parse`] when a name or nesting is left open at the
/// end of the text, when the open delimiter appears inside a name, or when
/// the close delimiter appears outside any nesting.
///
/// # Examples
///
/// ```
/// use sout_core::Delimiters;
/// use sout_template::parser::parse;
///
/// let root = parse("Hi {names|{}|, }!", &Delimiters::default()).unwrap();
/// assert_eq!(root.to_string(), "Hi ❰names❚❰❱❚, ❱!");
/// ```
pub fn parse(text: &str, delimiters: &Delimiters) -> SoutResult<Container> {
    let mut state = ParserState::new(text, *delimiters);
    let mut root = Container::new(state.position);
    // The root can only end at end of input; a stray close is an error.
    state.parse_container(&mut root, Level::Root)?;
    Ok(root)
}

/// Whether a container is the template itself or a part of a nesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Root,
    Part,
}

/// What ended a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum End {
    Input,
    Separator,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reading {
    Text,
    Name,
}

struct ParserState<'a> {
    chars: std::str::Chars<'a>,
    delimiters: Delimiters,
    position: Position,
}

impl<'a> ParserState<'a> {
    fn new(text: &'a str, delimiters: Delimiters) -> Self {
        Self {
            chars: text.chars(),
            delimiters,
            position: Position::START,
        }
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.position = self.position.advance(c);
        Some(c)
    }

    fn parse_container(&mut self, container: &mut Container, level: Level) -> SoutResult<End> {
        let Delimiters {
            open,
            separator,
            close,
            escape,
        } = self.delimiters;
        let mut reading = Reading::Text;
        let mut buffer = String::new();
        let mut escaped = false;

        loop {
            let Some(c) = self.next_char() else {
                if escaped {
                    // A dangling escape is kept as is.
                    buffer.push(escape);
                }
                return match reading {
                    Reading::Name => Err(SoutError::parse(
                        format!("Name `{buffer}` was not closed before end of file."),
                        self.position,
                    )),
                    Reading::Text => {
                        self.flush_text(container, &mut buffer);
                        Ok(End::Input)
                    }
                };
            };

            if escaped {
                escaped = false;
                if c != escape && c != open && c != separator && c != close {
                    buffer.push(escape);
                }
                buffer.push(c);
                continue;
            }
            if c == escape {
                escaped = true;
                continue;
            }

            match reading {
                Reading::Text => {
                    if c == open {
                        self.flush_text(container, &mut buffer);
                        reading = Reading::Name;
                    } else if c == separator && level == Level::Part {
                        self.flush_text(container, &mut buffer);
                        return Ok(End::Separator);
                    } else if c == close {
                        if level == Level::Root {
                            return Err(SoutError::parse(
                                format!("Unexpected close `{c}` at top level."),
                                self.position,
                            ));
                        }
                        self.flush_text(container, &mut buffer);
                        return Ok(End::Close);
                    } else {
                        buffer.push(c);
                    }
                }
                Reading::Name => {
                    if c == close {
                        container.children.push(Node::Name {
                            path: std::mem::take(&mut buffer),
                            position: self.position,
                        });
                        reading = Reading::Text;
                    } else if c == separator {
                        let path = std::mem::take(&mut buffer);
                        let position = self.position;
                        let parts = self.parse_parts(&path)?;
                        container.children.push(Node::Nesting {
                            path,
                            parts,
                            position,
                        });
                        reading = Reading::Text;
                    } else if c == open {
                        return Err(SoutError::parse(
                            format!("Unexpected open `{c}` in name `{buffer}`."),
                            self.position,
                        ));
                    } else {
                        buffer.push(c);
                    }
                }
            }
        }
    }

    fn parse_parts(&mut self, path: &str) -> SoutResult<Vec<Container>> {
        let mut parts = Vec::new();
        loop {
            let mut part = Container::new(self.position);
            let end = self.parse_container(&mut part, Level::Part)?;
            parts.push(part);
            match end {
                End::Separator => {}
                End::Close => return Ok(parts),
                End::Input => {
                    return Err(SoutError::parse(
                        format!("End of template while reading nesting `{path}`."),
                        self.position,
                    ))
                }
            }
        }
    }

    /// Emits the buffered text as a node; empty text is dropped.
    fn flush_text(&self, container: &mut Container, buffer: &mut String) {
        if !buffer.is_empty() {
            container.children.push(Node::Text {
                text: std::mem::take(buffer),
                position: self.position,
            });
        }
    }
}
