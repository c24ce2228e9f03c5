//! Recursive character text splitting.
//!
//! Text is split on the first separator in the list that occurs in it.
//! Pieces still longer than the chunk size are split again with the
//! remaining separators, and small pieces are merged back into chunks of up
//! to `chunk_size` characters that overlap by up to `chunk_overlap`
//! characters. Lengths are measured in characters, not bytes.

use crate::types::{PageText, TextChunk};
use guide_core::{AppError, AppResult};
use sha2::{Digest, Sha256};
use std::collections::VecDeque;

/// Separators tried in order: paragraphs, lines, words, characters.
pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Splits text into overlapping chunks along natural boundaries.
#[derive(Debug, Clone)]
pub struct RecursiveCharacterSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveCharacterSplitter {
    /// Create a splitter with the default separators.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> AppResult<Self> {
        if chunk_size == 0 {
            return Err(AppError::Config(
                "chunk size must be greater than 0".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(AppError::Config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                chunk_overlap, chunk_size
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Split text into trimmed, non-empty chunks.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    /// Split every page, numbering chunks across the whole document.
    ///
    /// Each chunk keeps the page number it came from.
    pub fn split_pages(&self, pages: &[PageText]) -> Vec<TextChunk> {
        let mut chunks = Vec::new();

        for page in pages {
            let mut search_from = 0usize;

            for text in self.split_text(&page.text) {
                let byte_offset = match page.text[search_from..].find(text.as_str()) {
                    Some(found) => search_from + found,
                    None => page.text.find(text.as_str()).unwrap_or(search_from),
                };
                search_from = self.next_search_start(&page.text, byte_offset, text.len());

                chunks.push(TextChunk {
                    id: uuid::Uuid::new_v4().to_string(),
                    page: page.page,
                    position: chunks.len() as u32,
                    byte_offset,
                    char_count: text.chars().count(),
                    hash: content_hash(&text),
                    text,
                });
            }
        }

        tracing::debug!(
            "Split {} pages into {} chunks (size {}, overlap {})",
            pages.len(),
            chunks.len(),
            self.chunk_size,
            self.chunk_overlap
        );

        chunks
    }

    /// The next chunk cannot begin before the previous one's end minus the
    /// overlap, and always begins after the previous start.
    fn next_search_start(&self, text: &str, start: usize, len: usize) -> usize {
        let end = start + len;
        let back = if end > text.len() || !text.is_char_boundary(end) {
            start
        } else if self.chunk_overlap == 0 {
            end
        } else {
            text[..end]
                .char_indices()
                .rev()
                .nth(self.chunk_overlap - 1)
                .map(|(i, _)| i)
                .unwrap_or(0)
        };

        if back > start {
            back
        } else {
            text[start..]
                .chars()
                .next()
                .map(|c| start + c.len_utf8())
                .unwrap_or(start)
        }
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut final_chunks = Vec::new();

        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut remaining: &[String] = &[];
        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = "";
                break;
            }
            if text.contains(candidate.as_str()) {
                separator = candidate;
                remaining = &separators[i + 1..];
                break;
            }
        }

        let mut good_splits: Vec<&str> = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                good_splits.push(piece);
                continue;
            }

            if !good_splits.is_empty() {
                final_chunks.extend(self.merge_splits(&good_splits));
                good_splits.clear();
            }

            if remaining.is_empty() {
                final_chunks.push(piece.to_string());
            } else {
                final_chunks.extend(self.split_recursive(piece, remaining));
            }
        }

        if !good_splits.is_empty() {
            final_chunks.extend(self.merge_splits(&good_splits));
        }

        final_chunks
    }

    /// Merge small pieces into chunks, carrying the trailing overlap forward.
    ///
    /// Pieces already start with their separator, so they are joined as-is.
    fn merge_splits(&self, splits: &[&str]) -> Vec<String> {
        let mut docs = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for piece in splits {
            let len = char_len(piece);

            if total + len > self.chunk_size {
                if total > self.chunk_size {
                    tracing::warn!(
                        "Created a chunk of size {}, which is longer than the specified {}",
                        total,
                        self.chunk_size
                    );
                }

                if !current.is_empty() {
                    if let Some(doc) = join_docs(&current) {
                        docs.push(doc);
                    }

                    while total > self.chunk_overlap
                        || (total + len > self.chunk_size && total > 0)
                    {
                        match current.pop_front() {
                            Some(front) => total -= char_len(front),
                            None => break,
                        }
                    }
                }
            }

            current.push_back(piece);
            total += len;
        }

        if let Some(doc) = join_docs(&current) {
            docs.push(doc);
        }

        docs
    }
}

/// Split on `separator`, attaching each separator to the piece after it.
///
/// An empty separator splits into single characters. Empty pieces are dropped.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;

    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(&text[start..idx]);
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }

    pieces
}

fn join_docs(pieces: &VecDeque<&str>) -> Option<String> {
    let joined: String = pieces.iter().copied().collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Hex-encoded SHA-256 of the given text.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn alphabet(len: usize) -> String {
        (0..len).map(|i| (b'a' + (i % 26) as u8) as char).collect()
    }

    fn page(page: u32, text: &str) -> PageText {
        PageText {
            source: PathBuf::from("guide.pdf"),
            page,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_rejects_invalid_sizes() {
        assert!(RecursiveCharacterSplitter::new(0, 0).is_err());
        assert!(RecursiveCharacterSplitter::new(100, 100).is_err());
        assert!(RecursiveCharacterSplitter::new(100, 99).is_ok());
    }

    #[test]
    fn test_short_text_single_chunk() {
        let splitter = RecursiveCharacterSplitter::new(1000, 200).unwrap();
        let chunks = splitter.split_text("  To update your profile, open Settings.  ");
        assert_eq!(chunks, vec!["To update your profile, open Settings."]);
    }

    #[test]
    fn test_empty_and_whitespace_text() {
        let splitter = RecursiveCharacterSplitter::new(1000, 200).unwrap();
        assert!(splitter.split_text("").is_empty());
        assert!(splitter.split_text(" \n\n \n ").is_empty());
    }

    #[test]
    fn test_unbroken_text_chunk_count() {
        let splitter = RecursiveCharacterSplitter::new(1000, 200).unwrap();
        let text = alphabet(5000);

        let chunks = splitter.split_text(&text);

        // ceil((5000 - 200) / (1000 - 200))
        assert_eq!(chunks.len(), 6);
        assert!(chunks.iter().all(|c| c.chars().count() <= 1000));
    }

    #[test]
    fn test_unbroken_text_overlap_and_reassembly() {
        let splitter = RecursiveCharacterSplitter::new(1000, 200).unwrap();
        let text = alphabet(5000);

        let chunks = splitter.split_text(&text);

        for pair in chunks.windows(2) {
            let tail: String = pair[0].chars().skip(800).collect();
            assert!(pair[1].starts_with(&tail));
        }

        let mut rebuilt = chunks[0].clone();
        for chunk in &chunks[1..] {
            rebuilt.extend(chunk.chars().skip(200));
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_chunk_count_matches_formula() {
        for (len, size, overlap) in [(1200, 500, 100), (3001, 1000, 200), (999, 300, 50)] {
            let splitter = RecursiveCharacterSplitter::new(size, overlap).unwrap();
            let chunks = splitter.split_text(&alphabet(len));
            let expected = (len - overlap).div_ceil(size - overlap);
            assert_eq!(chunks.len(), expected, "len={len} size={size} overlap={overlap}");
        }
    }

    #[test]
    fn test_prefers_paragraph_boundaries() {
        let splitter = RecursiveCharacterSplitter::new(40, 0).unwrap();
        let text = "Profiles are edited under Settings.\n\nPasswords rotate every ninety days.";

        let chunks = splitter.split_text(text);
        assert_eq!(
            chunks,
            vec![
                "Profiles are edited under Settings.",
                "Passwords rotate every ninety days."
            ]
        );
    }

    #[test]
    fn test_word_text_respects_size_and_covers_words() {
        let splitter = RecursiveCharacterSplitter::new(100, 20).unwrap();
        let words: Vec<String> = (0..200).map(|i| format!("word{i}")).collect();
        let text = words.join(" ");

        let chunks = splitter.split_text(&text);

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 100));
        assert!(chunks.iter().all(|c| c == c.trim() && !c.is_empty()));
        for word in &words {
            assert!(
                chunks.iter().any(|c| c.split(' ').any(|w| w == word)),
                "{word} missing"
            );
        }
    }

    #[test]
    fn test_multibyte_lengths_in_chars() {
        let splitter = RecursiveCharacterSplitter::new(10, 2).unwrap();
        let text = "é".repeat(26);

        let chunks = splitter.split_text(&text);
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn test_split_keeping_separator() {
        assert_eq!(
            split_keeping_separator("a\n\nb\n\nc", "\n\n"),
            vec!["a", "\n\nb", "\n\nc"]
        );
        assert_eq!(split_keeping_separator("\n\n\n\n", "\n\n"), vec!["\n\n", "\n\n"]);
        assert_eq!(split_keeping_separator("ab", ""), vec!["a", "b"]);
    }

    #[test]
    fn test_split_pages_metadata() {
        let splitter = RecursiveCharacterSplitter::new(1000, 200).unwrap();
        let first = alphabet(1500);
        let pages = vec![page(0, &first), page(3, "Security policies apply to all staff.")];

        let chunks = splitter.split_pages(&pages);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].page, 0);
        assert_eq!(chunks[1].page, 0);
        assert_eq!(chunks[2].page, 3);
        assert_eq!(
            chunks.iter().map(|c| c.position).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(chunks[0].byte_offset, 0);
        assert_eq!(chunks[1].byte_offset, 800);
        assert_eq!(chunks[2].byte_offset, 0);
        assert_eq!(chunks[0].char_count, 1000);
        assert_eq!(chunks[2].hash, content_hash("Security policies apply to all staff."));
    }

    #[test]
    fn test_content_hash() {
        assert_eq!(
            content_hash(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_ne!(content_hash("a"), content_hash("b"));
    }
}
