//! Candidate files from the browse dialog or a terminal drop
//!
//! Terminals deliver a dragged file as a bracketed paste of its path. The
//! exact form depends on the terminal: a bare path, a quoted path, a path with
//! backslash-escaped spaces, or a `file://` URI. Several files arrive
//! whitespace separated.

use crate::media;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeSource {
    Browse,
    Drop,
    CommandLine,
}

/// A file the user offered, before validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    pub name: String,
    pub media_type: String,
    pub source: IntakeSource,
}

impl Candidate {
    pub fn from_path(path: impl Into<PathBuf>, source: IntakeSource) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let media_type = media::declared_media_type(&path);

        Self {
            path,
            name,
            media_type,
            source,
        }
    }

    pub fn is_image(&self) -> bool {
        media::is_image(&self.media_type)
    }
}

/// The file a paste refers to, if any
///
/// The whole paste is tried first so unescaped paths containing spaces
/// still resolve; otherwise the first token naming an existing file wins.
pub fn dropped_file(text: &str) -> Option<PathBuf> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let whole = Path::new(trimmed);
    if whole.is_file() {
        return Some(whole.to_path_buf());
    }

    parse_dropped_paths(trimmed).into_iter().find(|p| p.is_file())
}

/// Split pasted text into paths, honouring quotes, backslash escapes and
/// `file://` URIs
pub fn parse_dropped_paths(text: &str) -> Vec<PathBuf> {
    split_shell_words(text)
        .into_iter()
        .filter_map(|token| {
            if token.starts_with("file://") {
                url::Url::parse(&token).ok()?.to_file_path().ok()
            } else {
                Some(PathBuf::from(token))
            }
        })
        .collect()
}

fn split_shell_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_word = false;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('"'), '\\') => match chars.next() {
                Some(next @ ('"' | '\\')) => current.push(next),
                Some(next) => {
                    current.push('\\');
                    current.push(next);
                }
                None => current.push('\\'),
            },
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                in_word = true;
            }
            (None, '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if in_word {
        words.push(current);
    }
    words
}
