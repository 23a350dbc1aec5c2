pub mod srt;

use crate::config::OutputMode;
use crate::error::{Result, TranslatorError};
use uuid::Uuid;

/// Stored translation for an entry whose vendor call failed.
pub const FAILED_SENTINEL: &str = "[translation failed]";
/// What the generator shows in place of [`FAILED_SENTINEL`].
pub const RETRY_SENTINEL: &str = "[translation failed, retry]";

/// Translation state of a single subtitle entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Translation {
    #[default]
    Pending,
    Failed(String),
    Done(String),
}

impl Translation {
    /// Interpret a raw value coming from a file, a manual edit or the wire.
    pub fn from_wire(value: Option<&str>) -> Self {
        match value {
            None | Some("") => Translation::Pending,
            Some(FAILED_SENTINEL) | Some(RETRY_SENTINEL) => {
                Translation::Failed("marked as failed".to_string())
            }
            Some(text) => Translation::Done(text.to_string()),
        }
    }

    /// Wire representation: absent for pending, the sentinel for failures.
    pub fn as_wire(&self) -> Option<&str> {
        match self {
            Translation::Pending => None,
            Translation::Failed(_) => Some(FAILED_SENTINEL),
            Translation::Done(text) => Some(text),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Translation::Done(_))
    }

    pub fn needs_work(&self) -> bool {
        !self.is_done()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    pub id: Uuid,
    pub index: u32,
    /// Time-code line, kept verbatim.
    pub time_range: String,
    pub text: String,
    pub translation: Translation,
}

impl SubtitleEntry {
    pub fn new(index: u32, time_range: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            index,
            time_range: time_range.into(),
            text: text.into(),
            translation: Translation::Pending,
        }
    }
}

/// Per-state counts over a set of entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TranslationStatus {
    pub total: usize,
    pub translated: usize,
    pub failed: usize,
    pub pending: usize,
}

pub fn check_status(entries: &[SubtitleEntry]) -> TranslationStatus {
    let mut status = TranslationStatus {
        total: entries.len(),
        ..Default::default()
    };

    for entry in entries {
        match entry.translation {
            Translation::Pending => status.pending += 1,
            Translation::Failed(_) => status.failed += 1,
            Translation::Done(_) => status.translated += 1,
        }
    }

    status
}

/// An in-memory subtitle document. Replaced wholesale on new input.
#[derive(Debug, Clone, Default)]
pub struct SrtDocument {
    entries: Vec<SubtitleEntry>,
}

impl SrtDocument {
    pub fn parse(content: &str) -> Self {
        Self {
            entries: srt::parse(content),
        }
    }

    pub fn from_entries(entries: Vec<SubtitleEntry>) -> Self {
        Self { entries }
    }

    pub fn generate(&self, mode: OutputMode) -> String {
        srt::generate(&self.entries, mode)
    }

    pub fn entries(&self) -> &[SubtitleEntry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [SubtitleEntry] {
        &mut self.entries
    }

    pub fn entry(&self, id: Uuid) -> Option<&SubtitleEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub(crate) fn entry_mut(&mut self, id: Uuid) -> Result<&mut SubtitleEntry> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| TranslatorError::Validation(format!("No subtitle entry with id {}", id)))
    }

    /// Manual edit of an entry's translation. Empty text resets it to pending.
    pub fn set_translation(&mut self, id: Uuid, text: &str) -> Result<()> {
        let entry = self.entry_mut(id)?;
        entry.translation = Translation::from_wire(Some(text));
        Ok(())
    }

    pub fn status(&self) -> TranslationStatus {
        check_status(&self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation_from_wire() {
        assert_eq!(Translation::from_wire(None), Translation::Pending);
        assert_eq!(Translation::from_wire(Some("")), Translation::Pending);
        assert!(matches!(
            Translation::from_wire(Some(FAILED_SENTINEL)),
            Translation::Failed(_)
        ));
        assert!(matches!(
            Translation::from_wire(Some(RETRY_SENTINEL)),
            Translation::Failed(_)
        ));
        assert_eq!(
            Translation::from_wire(Some("hello")),
            Translation::Done("hello".to_string())
        );
    }

    #[test]
    fn test_failed_serializes_to_sentinel() {
        let failed = Translation::Failed("timeout".to_string());
        assert_eq!(failed.as_wire(), Some(FAILED_SENTINEL));
        assert_eq!(Translation::Pending.as_wire(), None);
    }

    #[test]
    fn test_check_status() {
        let mut entries = vec![
            SubtitleEntry::new(1, "t", "a"),
            SubtitleEntry::new(2, "t", "b"),
            SubtitleEntry::new(3, "t", "c"),
        ];
        entries[1].translation = Translation::from_wire(Some(FAILED_SENTINEL));
        entries[2].translation = Translation::from_wire(Some("hello"));

        let status = check_status(&entries);
        assert_eq!(
            status,
            TranslationStatus {
                total: 3,
                translated: 1,
                failed: 1,
                pending: 1
            }
        );
    }

    #[test]
    fn test_set_translation() {
        let mut doc = SrtDocument::parse("1\n00:00:00,000 --> 00:00:01,000\nHi\n");
        let id = doc.entries()[0].id;

        doc.set_translation(id, "嗨").unwrap();
        assert!(doc.entry(id).unwrap().translation.is_done());

        doc.set_translation(id, "").unwrap();
        assert_eq!(doc.entry(id).unwrap().translation, Translation::Pending);
    }

    #[test]
    fn test_set_translation_unknown_id() {
        let mut doc = SrtDocument::default();
        let result = doc.set_translation(Uuid::new_v4(), "x");
        assert!(matches!(result, Err(TranslatorError::Validation(_))));
    }
}
