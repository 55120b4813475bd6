//! Fixed word-count pagination of long document text.
//!
//! A word is a maximal run of non-whitespace characters. Page `n` covers
//! words `[(n - 1) * 500, n * 500)`. Page boundaries sit at the start of the
//! first word of each page, with page 1 starting at byte 0 and the last page
//! running to the end of the text, so whitespace between words is kept and
//! the pages concatenate back to the original text byte for byte.

use std::ops::Range;

/// Words shown on one viewer page.
pub const WORDS_PER_PAGE: usize = 500;

/// Byte offsets of each word start, computed once per document.
#[derive(Debug, Clone)]
pub struct DocumentPager<'a> {
    text: &'a str,
    word_starts: Vec<usize>,
    words_per_page: usize,
}

impl<'a> DocumentPager<'a> {
    pub fn new(text: &'a str) -> Self {
        Self::with_page_size(text, WORDS_PER_PAGE)
    }

    /// A zero page size is treated as 1.
    pub fn with_page_size(text: &'a str, words_per_page: usize) -> Self {
        Self {
            text,
            word_starts: word_starts(text),
            words_per_page: words_per_page.max(1),
        }
    }

    pub fn word_count(&self) -> usize {
        self.word_starts.len()
    }

    /// `ceil(word_count / words_per_page)`; zero for text without words.
    pub fn total_pages(&self) -> usize {
        self.word_count().div_ceil(self.words_per_page)
    }

    /// Clamps into `[1, max(total_pages, 1)]`.
    pub fn clamp_page(&self, page: usize) -> usize {
        page.clamp(1, self.total_pages().max(1))
    }

    /// Byte range of page `page` (clamped).
    pub fn page_range(&self, page: usize) -> Range<usize> {
        let page = self.clamp_page(page);
        let first_word = (page - 1) * self.words_per_page;
        let next_page_word = page * self.words_per_page;

        let start = if page == 1 {
            0
        } else {
            self.word_starts
                .get(first_word)
                .copied()
                .unwrap_or(self.text.len())
        };
        let end = self
            .word_starts
            .get(next_page_word)
            .copied()
            .unwrap_or(self.text.len());
        start..end
    }

    /// Text of page `page` (clamped).
    pub fn page(&self, page: usize) -> &'a str {
        &self.text[self.page_range(page)]
    }

    /// 1-based page holding the byte at `offset`. Offsets before the first
    /// word map to page 1, offsets past the end to the last page.
    pub fn page_for_offset(&self, offset: usize) -> usize {
        let words_started = self.word_starts.partition_point(|&start| start <= offset);
        let word_index = words_started.saturating_sub(1);
        self.clamp_page(word_index / self.words_per_page + 1)
    }

    pub fn pages(&self) -> impl Iterator<Item = &'a str> + '_ {
        (1..=self.total_pages().max(1)).map(move |n| self.page(n))
    }
}

fn word_starts(text: &str) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut in_word = false;
    for (idx, ch) in text.char_indices() {
        if ch.is_whitespace() {
            in_word = false;
        } else if !in_word {
            starts.push(idx);
            in_word = true;
        }
    }
    starts
}
