//! Paragraph- and sentence-aware text chunking.
//!
//! Chunks are packed greedily from blank-line separated paragraphs; anything
//! still larger than `chunk_size` is re-split at sentence boundaries. Lengths
//! are counted in characters. A single sentence longer than `chunk_size` is
//! emitted whole. The overlap value travels with [`ChunkingConfig`] but no
//! text is repeated between adjacent chunks.

use crate::settings::ChunkingConfig;
use crate::types::Chunk;

pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> ChunkingConfig {
        self.config
    }

    pub fn split(&self, text: &str) -> Vec<Chunk> {
        let limit = self.config.chunk_size.max(1);
        let packed = pack(split_paragraphs(text), PARAGRAPH_SEPARATOR, limit);
        let first_pass: Vec<String> = packed.into_iter().flat_map(|c| split_oversized(c, limit)).collect();
        // A merged buffer can only exceed the limit through an unsplittable
        // sentence; re-run sentence splitting anyway so the bound holds.
        first_pass
            .into_iter()
            .flat_map(|c| split_oversized(c, limit))
            .enumerate()
            .map(|(ordinal, content)| Chunk { content, ordinal })
            .collect()
    }
}

/// Split `text` with an explicit size and overlap hint.
pub fn split(text: &str, chunk_size: usize, overlap_hint: usize) -> Vec<Chunk> {
    Chunker::new(ChunkingConfig { chunk_size, chunk_overlap: overlap_hint }).split(text)
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Paragraphs are runs of lines separated by lines that are empty after trimming.
fn split_paragraphs(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start: Option<usize> = None;
    let mut end = 0;
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        if line.trim().is_empty() {
            if let Some(s) = start.take() {
                out.push(text[s..end].trim());
            }
            continue;
        }
        if start.is_none() {
            start = Some(line_start);
        }
        end = offset;
    }
    if let Some(s) = start {
        out.push(text[s..end].trim());
    }
    out.retain(|p| !p.is_empty());
    out
}

/// Greedy packing: append while the joined length stays within `limit`.
fn pack<'a, I>(pieces: I, separator: &str, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let sep_len = char_len(separator);
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut buf_len = 0usize;
    for piece in pieces {
        let len = char_len(piece);
        if buf.is_empty() {
            buf.push_str(piece);
            buf_len = len;
        } else if buf_len + sep_len + len <= limit {
            buf.push_str(separator);
            buf.push_str(piece);
            buf_len += sep_len + len;
        } else {
            out.push(std::mem::take(&mut buf));
            buf.push_str(piece);
            buf_len = len;
        }
    }
    if !buf.is_empty() {
        out.push(buf);
    }
    out
}

fn split_oversized(chunk: String, limit: usize) -> Vec<String> {
    if char_len(&chunk) <= limit {
        return vec![chunk];
    }
    pack_sentences(split_sentences(&chunk), limit)
}

/// Greedy packing measured on the emitted text: a chunk never starts with the
/// whitespace carried by its first sentence, nor ends with trailing whitespace.
fn pack_sentences(sentences: Vec<&str>, limit: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut buf_len = 0usize;
    for sentence in sentences {
        if buf.is_empty() {
            buf.push_str(sentence.trim_start());
            buf_len = char_len(&buf);
        } else if buf_len + char_len(sentence.trim_end()) <= limit {
            buf.push_str(sentence);
            buf_len += char_len(sentence);
        } else {
            out.push(std::mem::take(&mut buf).trim_end().to_string());
            buf.push_str(sentence.trim_start());
            buf_len = char_len(&buf);
        }
    }
    if !buf.trim().is_empty() {
        out.push(buf.trim_end().to_string());
    }
    out.retain(|c| !c.is_empty());
    out
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '。' | '！' | '？')
}

/// Sentences keep their terminating punctuation; the whitespace after it
/// opens the next sentence. A run made only of ASCII periods ends a sentence
/// only before whitespace or at the end of the text, so decimals like `3.14`
/// stay intact.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0usize;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !is_terminator(c) {
            continue;
        }
        let mut end = i + c.len_utf8();
        let mut only_periods = c == '.';
        while let Some(&(j, n)) = chars.peek() {
            if !is_terminator(n) {
                break;
            }
            only_periods &= n == '.';
            end = j + n.len_utf8();
            chars.next();
        }
        let next = chars.peek().map(|&(_, n)| n);
        if only_periods && next.is_some_and(|n| !n.is_whitespace()) {
            continue;
        }
        out.push(&text[start..end]);
        start = end;
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}
