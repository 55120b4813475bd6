//! Whitepaper chapters and hash-synchronised chapter navigation.
//!
//! Chapters are built from an ordered list of markdown file names. Each gets
//! a human title (`02-Health-Effects.md` → `02 Health Effects`) and a URL-safe
//! slug used as the location hash (`02-health-effects`).
//!
//! [`ChapterNavigator`] owns the single "active chapter" value. The browser
//! history is modelled as a [`HistorySink`] that only receives writes; it is
//! never read back as a source of truth.
//!
//! ```text
//!                 initialize(hash ∈ slugs)        ── no history write
//!   NoChapter ──▶ initialize(otherwise)           ── replace(first) once
//!                 select(slug)                    ── push(slug)
//!   Active(i) ──▶ on_hash_change(hash ∈ slugs)    ── no history write
//!                 on_hash_change(cleared/invalid) ── Active(0)
//! ```

use serde::Serialize;

use crate::error::NavigationError;

/// Converts a title to a URL-safe anchor id.
///
/// Lowercases, turns whitespace runs into `-`, drops everything that is not
/// an ASCII word character or `-`, collapses repeated `-`, and trims `-`
/// from both ends. `slugify(&slugify(x)) == slugify(x)`.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for ch in input.to_lowercase().chars() {
        let ch = if ch.is_whitespace() { '-' } else { ch };
        if ch == '-' {
            pending_hyphen = true;
        } else if ch.is_ascii_alphanumeric() || ch == '_' {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        }
    }
    slug
}

/// `01-Executive-Summary.md` → `01 Executive Summary`.
pub fn title_from_filename(file_name: &str) -> String {
    let stem = match file_name.rfind('.') {
        Some(dot) if dot > 0 => &file_name[..dot],
        _ => file_name,
    };
    stem.replace('-', " ")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chapter {
    /// Slug, also the location hash.
    pub id: String,
    pub title: String,
    pub file_name: String,
    /// Raw markdown; empty when the chapter failed to load.
    pub content: String,
}

impl Chapter {
    pub fn new(file_name: &str, content: String) -> Self {
        let title = title_from_filename(file_name);
        Self {
            id: slugify(&title),
            title,
            file_name: file_name.to_string(),
            content,
        }
    }

    /// Builds chapters in order, suffixing `-2`, `-3`, … onto slugs that
    /// would otherwise collide (including empty slugs, which become
    /// `chapter`).
    pub fn build_all<I>(files: I) -> Vec<Chapter>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut chapters: Vec<Chapter> = Vec::new();
        for (file_name, content) in files {
            let mut chapter = Chapter::new(&file_name, content);
            if chapter.id.is_empty() {
                chapter.id = "chapter".to_string();
            }
            let base = chapter.id.clone();
            let mut n = 2;
            while chapters.iter().any(|c| c.id == chapter.id) {
                chapter.id = format!("{}-{}", base, n);
                n += 1;
            }
            chapters.push(chapter);
        }
        chapters
    }
}

/// Where navigation writes history entries.
pub trait HistorySink {
    /// Adds a new entry (user navigation).
    fn push(&mut self, hash: &str);
    /// Rewrites the current entry without adding one.
    fn replace(&mut self, hash: &str);
}

/// A history write, as recorded by [`RecordingHistory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEntry {
    Push(String),
    Replace(String),
}

/// In-memory [`HistorySink`] that keeps every write.
#[derive(Debug, Default, Clone)]
pub struct RecordingHistory {
    pub entries: Vec<HistoryEntry>,
}

impl RecordingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The hash the location would show after all writes.
    pub fn current(&self) -> Option<&str> {
        self.entries.last().map(|e| match e {
            HistoryEntry::Push(h) | HistoryEntry::Replace(h) => h.as_str(),
        })
    }
}

impl HistorySink for RecordingHistory {
    fn push(&mut self, hash: &str) {
        self.entries.push(HistoryEntry::Push(hash.to_string()));
    }

    fn replace(&mut self, hash: &str) {
        self.entries.push(HistoryEntry::Replace(hash.to_string()));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    NoChapter,
    Active(usize),
}

/// State machine for the active whitepaper chapter.
#[derive(Debug)]
pub struct ChapterNavigator<H: HistorySink> {
    chapters: Vec<Chapter>,
    state: NavState,
    history: H,
}

fn normalize_hash(hash: Option<&str>) -> Option<&str> {
    hash.map(|h| h.trim_start_matches('#'))
        .filter(|h| !h.is_empty())
}

impl<H: HistorySink> ChapterNavigator<H> {
    pub fn new(chapters: Vec<Chapter>, history: H) -> Self {
        Self {
            chapters,
            state: NavState::NoChapter,
            history,
        }
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn active(&self) -> Option<&Chapter> {
        match self.state {
            NavState::Active(i) => self.chapters.get(i),
            NavState::NoChapter => None,
        }
    }

    fn position(&self, slug: &str) -> Option<usize> {
        self.chapters.iter().position(|c| c.id == slug)
    }

    /// Initial selection from the location hash at page load.
    pub fn initialize(&mut self, hash: Option<&str>) -> Option<&Chapter> {
        if self.chapters.is_empty() {
            self.state = NavState::NoChapter;
            return None;
        }
        match normalize_hash(hash).and_then(|h| self.position(h)) {
            Some(i) => self.state = NavState::Active(i),
            None => {
                self.state = NavState::Active(0);
                self.history.replace(&self.chapters[0].id);
            }
        }
        self.active()
    }

    /// User clicked a chapter in the table of contents.
    pub fn select(&mut self, slug: &str) -> Result<&Chapter, NavigationError> {
        if self.chapters.is_empty() {
            return Err(NavigationError::Empty);
        }
        let i = self
            .position(slug)
            .ok_or_else(|| NavigationError::UnknownChapter(slug.to_string()))?;
        self.state = NavState::Active(i);
        self.history.push(&self.chapters[i].id);
        Ok(&self.chapters[i])
    }

    /// The location hash changed underneath us (back/forward, manual edit).
    pub fn on_hash_change(&mut self, hash: Option<&str>) -> Option<&Chapter> {
        if self.chapters.is_empty() {
            return None;
        }
        let i = normalize_hash(hash)
            .and_then(|h| self.position(h))
            .unwrap_or(0);
        self.state = NavState::Active(i);
        self.active()
    }

    pub fn next(&self) -> Option<&Chapter> {
        match self.state {
            NavState::Active(i) => self.chapters.get(i + 1),
            NavState::NoChapter => None,
        }
    }

    pub fn previous(&self) -> Option<&Chapter> {
        match self.state {
            NavState::Active(i) if i > 0 => self.chapters.get(i - 1),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapters(names: &[&str]) -> Vec<Chapter> {
        Chapter::build_all(names.iter().map(|n| (n.to_string(), format!("# {}", n))))
    }

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("01 Executive Summary"), "01-executive-summary");
        assert_eq!(slugify("  Health & Safety!  "), "health-safety");
        assert_eq!(slugify("a -- b"), "a-b");
        assert_eq!(slugify("snake_case stays"), "snake_case-stays");
        assert_eq!(slugify("Café Menu"), "caf-menu");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_slugify_idempotent() {
        for s in [
            "01 Executive Summary",
            "  --Weird  -- Input__ ",
            "Ünïcödé Title",
            "tabs\tand\nnewlines",
            "",
            "already-a-slug",
        ] {
            let once = slugify(s);
            assert_eq!(slugify(&once), once, "input {:?}", s);
        }
    }

    #[test]
    fn test_title_from_filename() {
        assert_eq!(title_from_filename("01-Executive-Summary.md"), "01 Executive Summary");
        assert_eq!(title_from_filename("README"), "README");
        assert_eq!(title_from_filename(".hidden"), ".hidden");
        assert_eq!(title_from_filename("a.b.md"), "a.b");
    }

    #[test]
    fn test_build_all_unique_ids() {
        let list = chapters(&["Intro.md", "intro.md", "Intro.markdown", "!!!.md", "$$$.md"]);
        let ids: Vec<&str> = list.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["intro", "intro-2", "intro-3", "chapter", "chapter-2"]);
    }

    #[test]
    fn test_initialize_with_matching_hash_does_not_touch_history() {
        let mut nav = ChapterNavigator::new(
            chapters(&["01-Intro.md", "02-Methods.md"]),
            RecordingHistory::new(),
        );
        let active = nav.initialize(Some("#02-methods")).unwrap();
        assert_eq!(active.id, "02-methods");
        assert!(nav.history().entries.is_empty());
    }

    #[test]
    fn test_initialize_without_hash_replaces_once() {
        let mut nav = ChapterNavigator::new(
            chapters(&["01-Intro.md", "02-Methods.md"]),
            RecordingHistory::new(),
        );
        assert_eq!(nav.initialize(None).unwrap().id, "01-intro");
        assert_eq!(
            nav.history().entries,
            vec![HistoryEntry::Replace("01-intro".to_string())]
        );
    }

    #[test]
    fn test_initialize_with_unknown_hash_falls_back() {
        let mut nav = ChapterNavigator::new(chapters(&["01-Intro.md"]), RecordingHistory::new());
        assert_eq!(nav.initialize(Some("#missing")).unwrap().id, "01-intro");
        assert_eq!(nav.history().current(), Some("01-intro"));
    }

    #[test]
    fn test_select_pushes() {
        let mut nav = ChapterNavigator::new(
            chapters(&["01-Intro.md", "02-Methods.md", "03-Results.md"]),
            RecordingHistory::new(),
        );
        nav.initialize(Some("01-intro"));
        nav.select("03-results").unwrap();
        assert_eq!(nav.state(), NavState::Active(2));
        assert_eq!(
            nav.history().entries,
            vec![HistoryEntry::Push("03-results".to_string())]
        );
        assert_eq!(nav.previous().unwrap().id, "02-methods");
        assert!(nav.next().is_none());
    }

    #[test]
    fn test_select_unknown_is_rejected() {
        let mut nav = ChapterNavigator::new(chapters(&["01-Intro.md"]), RecordingHistory::new());
        nav.initialize(None);
        let err = nav.select("nope").unwrap_err();
        assert_eq!(err, NavigationError::UnknownChapter("nope".to_string()));
        assert_eq!(nav.state(), NavState::Active(0));
    }

    #[test]
    fn test_hash_change_resyncs_without_history() {
        let mut nav = ChapterNavigator::new(
            chapters(&["01-Intro.md", "02-Methods.md"]),
            RecordingHistory::new(),
        );
        nav.initialize(Some("01-intro"));
        assert_eq!(nav.on_hash_change(Some("#02-methods")).unwrap().id, "02-methods");
        assert_eq!(nav.on_hash_change(Some("")).unwrap().id, "01-intro");
        nav.on_hash_change(Some("02-methods"));
        assert_eq!(nav.on_hash_change(Some("#bogus")).unwrap().id, "01-intro");
        assert!(nav.history().entries.is_empty());
    }

    #[test]
    fn test_empty_navigator_stays_unselected() {
        let mut nav = ChapterNavigator::new(Vec::new(), RecordingHistory::new());
        assert!(nav.initialize(None).is_none());
        assert_eq!(nav.state(), NavState::NoChapter);
        assert!(nav.on_hash_change(Some("x")).is_none());
        assert_eq!(nav.select("x").unwrap_err(), NavigationError::Empty);
        assert!(nav.history().entries.is_empty());
    }
}
