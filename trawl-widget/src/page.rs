use std::collections::HashMap;
use std::fmt;

use ratatui::layout::Rect;
use thiserror::Error;

/// Identifier of a fixed element in the host page layout.
///
/// Widgets are bound to elements by id; the host registers the id of every
/// region its layout provides. Ids are compared verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(&'static str);

impl ElementId {
    pub const fn new(id: &'static str) -> Self {
        ElementId(id)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PageError {
    #[error("element '{0}' is not present in the page layout")]
    MissingElement(ElementId),
}

/// The host page: a registry of named screen regions.
///
/// The application rebuilds this from its layout on every frame and hands
/// it to the widgets for rendering. At startup the same layout function is
/// run once so [`Page::require`] can reject a host that is missing an
/// element a widget is bound to, instead of failing at first paint.
#[derive(Debug, Default)]
pub struct Page {
    areas: HashMap<ElementId, Rect>,
}

impl Page {
    pub fn new() -> Self {
        Page::default()
    }

    pub fn register(&mut self, id: ElementId, area: Rect) {
        self.areas.insert(id, area);
    }

    pub fn area(&self, id: ElementId) -> Option<Rect> {
        self.areas.get(&id).copied()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.areas.contains_key(&id)
    }

    /// Verify that every id in `required` has been registered.
    pub fn require(&self, required: &[ElementId]) -> Result<(), PageError> {
        for id in required {
            if !self.contains(*id) {
                return Err(PageError::MissingElement(*id));
            }
        }
        Ok(())
    }
}
