//! Source extraction
//!
//! Lexical carving of snippets: a delimiter-balancing block scanner and the
//! splitter that turns a snippet into a [`source::SourceUnit`].

pub mod block;
pub mod source;

pub use block::{extract_block, BlockMatch, CodeBlock, Delimiters};
pub use source::{strip_line_comments, SourceExtractor, SourceUnit};
