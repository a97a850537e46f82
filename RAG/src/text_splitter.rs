use std::collections::VecDeque;

/// Recursive character text splitter: splits on the coarsest separator
/// present in the text, recursing with finer separators into pieces that are
/// still too long, then merges neighbours back up to `chunk_size` characters
/// with `chunk_overlap` characters carried between consecutive chunks.
#[derive(Debug, Clone)]
pub struct RecursiveCharacterSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<&'static str>,
}

impl RecursiveCharacterSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap: chunk_overlap.min(chunk_size.saturating_sub(1)),
            separators: vec!["\n\n", "\n", " ", ""],
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[&'static str]) -> Vec<String> {
        let (separator, finer) = pick_separator(text, separators);

        let splits: Vec<String> = if separator.is_empty() {
            text.chars().map(String::from).collect()
        } else {
            text.split(separator)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        };

        let mut chunks = Vec::new();
        let mut small = Vec::new();

        for split in splits {
            if char_len(&split) < self.chunk_size {
                small.push(split);
                continue;
            }

            if !small.is_empty() {
                chunks.extend(self.merge_splits(&small, separator));
                small.clear();
            }

            if finer.is_empty() {
                let piece = split.trim();
                if !piece.is_empty() {
                    chunks.push(piece.to_string());
                }
            } else {
                chunks.extend(self.split_recursive(&split, finer));
            }
        }

        if !small.is_empty() {
            chunks.extend(self.merge_splits(&small, separator));
        }

        chunks
    }

    fn merge_splits(&self, splits: &[String], separator: &str) -> Vec<String> {
        let separator_len = char_len(separator);
        let mut docs = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for split in splits {
            let len = char_len(split);
            let joined = if current.is_empty() { 0 } else { separator_len };

            if total + len + joined > self.chunk_size {
                if let Some(doc) = join_pieces(&current, separator) {
                    docs.push(doc);
                }

                // Drop pieces from the front until what remains fits the
                // overlap budget and leaves room for the incoming piece.
                while total > self.chunk_overlap
                    || (total > 0 && total + len + separator_len > self.chunk_size)
                {
                    let trailing = if current.len() > 1 { separator_len } else { 0 };
                    match current.pop_front() {
                        Some(first) => total -= char_len(first) + trailing,
                        None => break,
                    }
                }
            }

            current.push_back(split);
            total += len + if current.len() > 1 { separator_len } else { 0 };
        }

        if let Some(doc) = join_pieces(&current, separator) {
            docs.push(doc);
        }

        docs
    }
}

fn pick_separator<'a>(
    text: &str,
    separators: &'a [&'static str],
) -> (&'static str, &'a [&'static str]) {
    for (i, &separator) in separators.iter().enumerate() {
        if separator.is_empty() || text.contains(separator) {
            return (separator, &separators[i + 1..]);
        }
    }
    ("", &[])
}

fn join_pieces(pieces: &VecDeque<&str>, separator: &str) -> Option<String> {
    let joined = pieces.iter().copied().collect::<Vec<_>>().join(separator);
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
