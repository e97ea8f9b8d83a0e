use super::types::{Chunker, TextChunk};

/// Character-window chunker for fact-sheet text.
/// Splits by paragraphs first, then by words for oversized paragraphs,
/// and packs the pieces into windows with a small trailing overlap.
pub struct CharacterChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl CharacterChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap: chunk_overlap.min(chunk_size.saturating_sub(1)),
        }
    }
}

impl Default for CharacterChunker {
    fn default() -> Self {
        Self::new(500, 50)
    }
}

impl Chunker for CharacterChunker {
    fn chunk(&self, text: &str) -> Vec<TextChunk> {
        let pieces = split_pieces(text, self.chunk_size);

        let mut chunks = Vec::new();
        let mut current = String::new();

        for piece in pieces {
            let joined_len = char_len(&current) + 1 + char_len(&piece);
            if !current.is_empty() && joined_len > self.chunk_size {
                let tail = overlap_tail(&current, self.chunk_overlap);
                push_chunk(&mut chunks, std::mem::take(&mut current));
                if !tail.is_empty() && char_len(&tail) + 1 + char_len(&piece) <= self.chunk_size {
                    current = tail;
                }
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&piece);
        }

        push_chunk(&mut chunks, current);
        chunks
    }
}

fn push_chunk(chunks: &mut Vec<TextChunk>, content: String) {
    let content = content.trim().to_string();
    if content.is_empty() {
        return;
    }
    chunks.push(TextChunk {
        content,
        chunk_index: chunks.len(),
    });
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Break text into pieces no longer than `max_chars`: whole paragraphs
/// when they fit, otherwise their individual words.
fn split_pieces(text: &str, max_chars: usize) -> Vec<String> {
    let mut pieces = Vec::new();

    for para in text.split("\n\n") {
        let para = para.split_whitespace().collect::<Vec<_>>().join(" ");
        if para.is_empty() {
            continue;
        }
        if char_len(&para) <= max_chars {
            pieces.push(para);
            continue;
        }
        for word in para.split(' ') {
            pieces.extend(hard_split(word, max_chars));
        }
    }

    pieces
}

/// Split a single overlong token at character boundaries.
fn hard_split(word: &str, max_chars: usize) -> Vec<String> {
    if char_len(word) <= max_chars {
        return vec![word.to_string()];
    }
    word.chars()
        .collect::<Vec<_>>()
        .chunks(max_chars)
        .map(|c| c.iter().collect())
        .collect()
}

/// The last `overlap` characters of `text`, starting on a word boundary when possible.
fn overlap_tail(text: &str, overlap: usize) -> String {
    if overlap == 0 {
        return String::new();
    }
    let chars: Vec<char> = text.chars().collect();
    let start = chars.len().saturating_sub(overlap);
    let tail: String = chars[start..].iter().collect();
    match tail.find(' ') {
        Some(pos) if start > 0 && pos + 1 < tail.len() => tail[pos + 1..].to_string(),
        _ => tail,
    }
}
