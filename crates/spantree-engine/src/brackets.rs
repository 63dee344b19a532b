//! # Balanced Bracket Scanning
//!
//! Finds the outermost, properly nested regions delimited by a bracket pair.
//! Unmatched delimiters are ordinary text: the scanner never fails on
//! malformed input, it just reports fewer regions.
//!
//! ## Shields
//!
//! A scanner can be told about other bracket pairs whose groups it must skip
//! as a whole. An *opaque* pair (such as a literal) additionally hides every
//! other delimiter inside it, so `(⟦)⟧)` is one parenthesised region.

use crate::tree::{Node, NodeError, Span};

/// A pair of delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bracket {
    pub open: char,
    pub close: char,
    /// Inside an opaque pair only its own delimiters nest.
    pub opaque: bool,
}

impl Bracket {
    pub const fn new(open: char, close: char) -> Self {
        Self {
            open,
            close,
            opaque: false,
        }
    }

    pub const fn opaque(open: char, close: char) -> Self {
        Self {
            open,
            close,
            opaque: true,
        }
    }

    /// The span between the delimiters of a region this bracket matched.
    pub fn inner(&self, region: Span) -> Span {
        Span {
            start: region.start + self.open.len_utf8(),
            stop: region.stop - self.close.len_utf8(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BracketScanner {
    target: Bracket,
    shields: Vec<Bracket>,
}

impl BracketScanner {
    pub fn new(target: Bracket) -> Self {
        Self {
            target,
            shields: vec![],
        }
    }

    /// Skips whole groups of `shield` while looking for the target.
    #[must_use]
    pub fn shielded_by(mut self, shield: Bracket) -> Self {
        self.shields.push(shield);
        self
    }

    pub fn target(&self) -> Bracket {
        self.target
    }

    /// Byte ranges of the outermost balanced target regions of `text`,
    /// delimiters included, in document order.
    pub fn regions(&self, text: &str) -> Vec<Span> {
        let mut scan = Scan {
            scanner: self,
            chars: text.char_indices().collect(),
            memo: vec![],
        };
        scan.memo = vec![None; scan.chars.len()];

        let mut out = vec![];
        let mut i = 0;
        while i < scan.chars.len() {
            let opened = scan.bracket_at(i);
            if let Some(bracket) = opened
                && let Some(j) = scan.close_of(i, bracket)
            {
                if bracket == self.target {
                    out.push(Span {
                        start: scan.chars[i].0,
                        stop: scan.chars[j].0 + bracket.close.len_utf8(),
                    });
                }
                i = j + 1;
                continue;
            }
            i += 1;
        }
        out
    }

    /// Clones every outermost target region of `node`, tagged `desc`.
    pub fn find(&self, node: &Node, desc: Option<&str>) -> Result<Vec<Node>, NodeError> {
        let base = node.start();
        self.regions(node.text())
            .into_iter()
            .map(|r| {
                let span = Span {
                    start: base + r.start,
                    stop: base + r.stop,
                };
                node.slice(span, desc)
            })
            .collect()
    }
}

/// The maximal balanced `open`/`close` regions of `node`, outermost first.
pub fn find_balanced(node: &Node, open: char, close: char) -> Result<Vec<Node>, NodeError> {
    BracketScanner::new(Bracket::new(open, close)).find(node, None)
}

struct Scan<'a> {
    scanner: &'a BracketScanner,
    chars: Vec<(usize, char)>,
    /// Matching close index per opener index, once computed.
    memo: Vec<Option<Option<usize>>>,
}

impl Scan<'_> {
    fn bracket_at(&self, i: usize) -> Option<Bracket> {
        let c = self.chars.get(i)?.1;
        std::iter::once(&self.scanner.target)
            .chain(&self.scanner.shields)
            .find(|b| b.open == c)
            .copied()
    }

    /// Index of the close matching the opener at `at`, if any.
    ///
    /// Openers still waiting for their close live on an explicit stack, so
    /// nesting depth is bounded by memory rather than the call stack.
    fn close_of(&mut self, at: usize, bracket: Bracket) -> Option<usize> {
        let mut pending = vec![Frame {
            at,
            bracket,
            next: at + 1,
        }];

        while let Some(frame) = pending.pop() {
            if self.memo[frame.at].is_some() {
                continue;
            }
            match self.advance(&frame) {
                Step::Closed(found) => self.memo[frame.at] = Some(found),
                Step::Nested { at: inner_at, bracket: inner } => {
                    pending.push(Frame {
                        next: inner_at,
                        ..frame
                    });
                    pending.push(Frame {
                        at: inner_at,
                        bracket: inner,
                        next: inner_at + 1,
                    });
                }
            }
        }

        self.memo[at].flatten()
    }

    /// Scans forward from `frame.next` until the frame's close is found, the
    /// text runs out, or a nested opener with no memoised answer turns up.
    fn advance(&self, frame: &Frame) -> Step {
        let bracket = frame.bracket;
        let mut j = frame.next;
        while j < self.chars.len() {
            let c = self.chars[j].1;
            if c == bracket.close {
                return Step::Closed(Some(j));
            }
            let nested = if bracket.opaque {
                (c == bracket.open).then_some(bracket)
            } else {
                self.bracket_at(j)
            };
            if let Some(inner) = nested {
                match self.memo[j] {
                    Some(Some(k)) => {
                        j = k + 1;
                        continue;
                    }
                    // The same bracket reopened and never closed: this one
                    // would see exactly the same text, so it cannot close either.
                    Some(None) if inner == bracket => return Step::Closed(None),
                    // Unmatched openers are plain text.
                    Some(None) => {}
                    None => {
                        return Step::Nested {
                            at: j,
                            bracket: inner,
                        };
                    }
                }
            }
            j += 1;
        }
        Step::Closed(None)
    }
}

#[derive(Clone, Copy)]
struct Frame {
    at: usize,
    bracket: Bracket,
    next: usize,
}

enum Step {
    Closed(Option<usize>),
    Nested { at: usize, bracket: Bracket },
}
