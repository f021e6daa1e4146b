//! Delimiter-balancing block scanner.
//!
//! Finds the first occurrence of a preamble and the first top-level delimiter
//! pair that follows it. The scan is purely lexical: delimiters inside string
//! literals or comments count like any other.

use serde::{Deserialize, Serialize};

/// Opening/closing delimiter pair. The two characters must differ.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delimiters {
    pub open: char,
    pub close: char,
}

impl Delimiters {
    pub const BRACES: Delimiters = Delimiters {
        open: '{',
        close: '}',
    };
    pub const PARENS: Delimiters = Delimiters {
        open: '(',
        close: ')',
    };
}

impl Default for Delimiters {
    fn default() -> Self {
        Self::BRACES
    }
}

/// Byte offsets of a matched block.
///
/// `start..end` covers the preamble through the closing delimiter,
/// `body_start..body_end` the interior without either delimiter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    pub start: usize,
    pub end: usize,
    pub body_start: usize,
    pub body_end: usize,
}

impl CodeBlock {
    pub fn body<'a>(&self, source: &'a str) -> &'a str {
        &source[self.body_start..self.body_end]
    }

    pub fn span<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    /// Source with the whole block removed
    pub fn remove_from(&self, source: &str) -> String {
        let mut remaining = String::with_capacity(source.len() - (self.end - self.start));
        remaining.push_str(&source[..self.start]);
        remaining.push_str(&source[self.end..]);
        remaining
    }
}

/// Outcome of a block scan
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockMatch {
    Found(CodeBlock),
    /// Preamble present at `start`, but no balanced delimiter pair follows it
    Unterminated { start: usize },
    NotFound,
}

impl BlockMatch {
    pub fn found(self) -> Option<CodeBlock> {
        match self {
            BlockMatch::Found(block) => Some(block),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, BlockMatch::Found(_))
    }
}

/// Locate `preamble` in `source` and the balanced block that follows it.
pub fn extract_block(source: &str, preamble: &str, delimiters: Delimiters) -> BlockMatch {
    let start = match source.find(preamble) {
        Some(start) => start,
        None => return BlockMatch::NotFound,
    };

    let mut depth = 0usize;
    let mut body_start = start;

    for (offset, ch) in source[start..].char_indices() {
        let pos = start + offset;

        if depth == 0 {
            body_start = pos + ch.len_utf8();
        }

        if ch == delimiters.open {
            depth += 1;
        } else if ch == delimiters.close && depth > 0 {
            depth -= 1;
            if depth == 0 {
                return BlockMatch::Found(CodeBlock {
                    start,
                    end: pos + ch.len_utf8(),
                    body_start,
                    body_end: pos,
                });
            }
        }
    }

    BlockMatch::Unterminated { start }
}
