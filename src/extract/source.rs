//! Splits a snippet into file-scope prerequisites and the measured body.

use crate::config::types::{BenchError, ExtractError, Result};
use crate::extract::block::{extract_block, BlockMatch, Delimiters};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Code split around the measured region
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceUnit {
    /// Directive lines in source order (not deduplicated)
    pub includes: Vec<String>,
    /// Everything outside the entry block and the directives
    pub additional_defs: String,
    /// Interior of the entry block
    pub body: String,
}

/// Extraction settings for one language
#[derive(Clone, Debug)]
pub struct SourceExtractor {
    entry_preamble: String,
    delimiters: Delimiters,
    directive: Regex,
    trailing_noop: Option<String>,
}

impl SourceExtractor {
    pub fn new(entry_preamble: impl Into<String>, directive_pattern: &str) -> Result<Self> {
        let directive = Regex::new(directive_pattern).map_err(|e| {
            BenchError::Config(format!(
                "invalid directive pattern {:?}: {}",
                directive_pattern, e
            ))
        })?;
        Ok(Self {
            entry_preamble: entry_preamble.into(),
            delimiters: Delimiters::BRACES,
            directive,
            trailing_noop: None,
        })
    }

    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    /// Statement dropped from the end of the body (e.g. `return 0;`)
    pub fn with_trailing_noop(mut self, statement: impl Into<String>) -> Self {
        self.trailing_noop = Some(statement.into());
        self
    }

    pub fn entry_preamble(&self) -> &str {
        &self.entry_preamble
    }

    pub fn extract(&self, source: &str) -> std::result::Result<SourceUnit, ExtractError> {
        let includes = self
            .directive
            .find_iter(source)
            .map(|m| m.as_str().trim().to_string())
            .collect();

        let block = match extract_block(source, &self.entry_preamble, self.delimiters) {
            BlockMatch::Found(block) => block,
            BlockMatch::Unterminated { start } => {
                return Err(ExtractError::Unterminated { start });
            }
            BlockMatch::NotFound => {
                return Err(ExtractError::EntryNotFound {
                    preamble: self.entry_preamble.clone(),
                });
            }
        };

        let mut body = block.body(source).trim();
        if let Some(noop) = self.trailing_noop.as_deref() {
            if let Some(stripped) = body.strip_suffix(noop) {
                body = stripped.trim_end();
            }
        }

        let remaining = block.remove_from(source);
        let additional_defs = self.directive.replace_all(&remaining, "").trim().to_string();

        Ok(SourceUnit {
            includes,
            additional_defs,
            body: body.to_string(),
        })
    }
}

/// Remove `//` comments through end of line.
///
/// Lexical like the block scanner: `//` inside a string literal is stripped too.
pub fn strip_line_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    for (i, line) in source.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        match line.find("//") {
            Some(pos) => out.push_str(&line[..pos]),
            None => out.push_str(line),
        }
    }
    out
}
