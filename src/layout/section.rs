//! Section tracking across the whole document.

/// The (section, sub-section) pair stamped onto content items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionSnapshot {
    /// Text of the most recent level-1 heading
    pub section: Option<String>,
    /// Text of the most recent deeper heading within the section
    pub sub_section: Option<String>,
}

/// Heading state carried across pages for one document conversion.
///
/// A level-1 heading opens a new section and clears the sub-section; any
/// deeper heading replaces the sub-section and leaves the section alone.
/// Create a fresh tracker per document.
#[derive(Debug, Clone, Default)]
pub struct SectionTracker {
    state: SectionSnapshot,
}

impl SectionTracker {
    /// Create a tracker with no active section.
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe an emitted heading.
    pub fn observe_heading(&mut self, level: u8, text: &str) {
        if level <= 1 {
            self.state.section = Some(text.to_string());
            self.state.sub_section = None;
        } else {
            self.state.sub_section = Some(text.to_string());
        }
    }

    /// Current active section.
    pub fn section(&self) -> Option<&str> {
        self.state.section.as_deref()
    }

    /// Current active sub-section.
    pub fn sub_section(&self) -> Option<&str> {
        self.state.sub_section.as_deref()
    }

    /// Copy of the current state, for stamping an item.
    pub fn snapshot(&self) -> SectionSnapshot {
        self.state.clone()
    }
}
