//! The DOM the page loader and the controls button write to.

use std::collections::{BTreeMap, BTreeSet};

/// Minimal DOM writes needed by page transitions.
///
/// Elements are addressed by CSS selector. Writes to a selector that
/// matches nothing are ignored, as with `document.querySelector` guards.
pub trait PageSurface {
    /// Add `class` to the element matching `selector`.
    fn add_class(&mut self, selector: &str, class: &str);
    /// Remove `class` from the element matching `selector`.
    fn remove_class(&mut self, selector: &str, class: &str);
    /// Replace the children of the element matching `selector`.
    fn set_inner_html(&mut self, selector: &str, html: &str);
    /// Set the inline background colour of the element matching `selector`.
    fn set_background_color(&mut self, selector: &str, color: &str);
}

/// One recorded write, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomOp {
    /// `classList.add`.
    AddClass {
        /// Target selector.
        selector: String,
        /// Class added.
        class: String,
    },
    /// `classList.remove`.
    RemoveClass {
        /// Target selector.
        selector: String,
        /// Class removed.
        class: String,
    },
    /// `innerHTML =`.
    SetInnerHtml {
        /// Target selector.
        selector: String,
        /// New markup.
        html: String,
    },
    /// `style.backgroundColor =`.
    SetBackgroundColor {
        /// Target selector.
        selector: String,
        /// New colour.
        color: String,
    },
}

/// Last known state of one element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementState {
    /// Current class list.
    pub classes: BTreeSet<String>,
    /// Last markup written, if any.
    pub inner_html: Option<String>,
    /// Last inline background colour written, if any.
    pub background_color: Option<String>,
}

/// In-memory [`PageSurface`] for headless runs and tests.
///
/// Every selector written to gets an element. Setting inner HTML does not
/// parse markup; nested elements are tracked by their own selector.
///
/// Only element state is kept unless the snapshot was created with
/// [`recording`](Self::recording), which also keeps every write in order.
#[derive(Debug, Clone, Default)]
pub struct DomSnapshot {
    elements: BTreeMap<String, ElementState>,
    log: Option<Vec<DomOp>>,
}

impl DomSnapshot {
    /// Empty snapshot that keeps element state only.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty snapshot that also records every write.
    #[must_use]
    pub fn recording() -> Self {
        Self {
            elements: BTreeMap::new(),
            log: Some(Vec::new()),
        }
    }

    /// State of the element at `selector`, if it was ever written.
    #[must_use]
    pub fn element(&self, selector: &str) -> Option<&ElementState> {
        self.elements.get(selector)
    }

    /// Whether the element at `selector` currently has `class`.
    #[must_use]
    pub fn has_class(&self, selector: &str, class: &str) -> bool {
        self.elements
            .get(selector)
            .is_some_and(|e| e.classes.contains(class))
    }

    /// Last markup written to `selector`.
    #[must_use]
    pub fn inner_html(&self, selector: &str) -> Option<&str> {
        self.elements
            .get(selector)
            .and_then(|e| e.inner_html.as_deref())
    }

    /// Last background colour written to `selector`.
    #[must_use]
    pub fn background_color(&self, selector: &str) -> Option<&str> {
        self.elements
            .get(selector)
            .and_then(|e| e.background_color.as_deref())
    }

    /// Every write so far, oldest first. Empty unless recording.
    #[must_use]
    pub fn log(&self) -> &[DomOp] {
        self.log.as_deref().unwrap_or_default()
    }

    fn record(&mut self, op: impl FnOnce() -> DomOp) {
        if let Some(log) = &mut self.log {
            log.push(op());
        }
    }

    fn element_mut(&mut self, selector: &str) -> &mut ElementState {
        self.elements.entry(selector.to_owned()).or_default()
    }
}

impl PageSurface for DomSnapshot {
    fn add_class(&mut self, selector: &str, class: &str) {
        let _ = self.element_mut(selector).classes.insert(class.to_owned());
        self.record(|| DomOp::AddClass {
            selector: selector.to_owned(),
            class: class.to_owned(),
        });
    }

    fn remove_class(&mut self, selector: &str, class: &str) {
        let _ = self.element_mut(selector).classes.remove(class);
        self.record(|| DomOp::RemoveClass {
            selector: selector.to_owned(),
            class: class.to_owned(),
        });
    }

    fn set_inner_html(&mut self, selector: &str, html: &str) {
        self.element_mut(selector).inner_html = Some(html.to_owned());
        self.record(|| DomOp::SetInnerHtml {
            selector: selector.to_owned(),
            html: html.to_owned(),
        });
    }

    fn set_background_color(&mut self, selector: &str, color: &str) {
        self.element_mut(selector).background_color = Some(color.to_owned());
        self.record(|| DomOp::SetBackgroundColor {
            selector: selector.to_owned(),
            color: color.to_owned(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_tracks_classes_and_log() {
        let mut dom = DomSnapshot::recording();
        dom.add_class("#page-container", "hide");
        assert!(dom.has_class("#page-container", "hide"));
        dom.set_inner_html("#page-container", "<p>hi</p>");
        dom.remove_class("#page-container", "hide");
        assert!(!dom.has_class("#page-container", "hide"));
        assert_eq!(dom.inner_html("#page-container"), Some("<p>hi</p>"));
        assert_eq!(dom.log().len(), 3);
        assert!(!dom.has_class("#missing", "hide"));
    }

    #[test]
    fn plain_snapshot_keeps_state_without_a_log() {
        let mut dom = DomSnapshot::new();
        for i in 0..100 {
            dom.add_class("#page-container", "hide");
            dom.set_inner_html("#page-container", &format!("<p>{i}</p>"));
            dom.remove_class("#page-container", "hide");
        }
        assert!(dom.log().is_empty());
        assert_eq!(dom.inner_html("#page-container"), Some("<p>99</p>"));
        assert!(!dom.has_class("#page-container", "hide"));
    }
}
