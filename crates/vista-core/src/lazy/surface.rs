//! Rendering surface abstraction.
//!
//! The core never lays anything out; it only asks the renderer to swap
//! attributes on elements and to toggle their visibility.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::store::lock;

/// Opaque handle to a rendered element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

/// DOM-like mutations the core performs.
pub trait RenderSurface: Send + Sync {
    fn set_attribute(&self, element: ElementId, name: &str, value: &str);

    fn remove_attribute(&self, element: ElementId, name: &str);

    fn set_visible(&self, element: ElementId, visible: bool);
}

#[derive(Default)]
struct MemoryElement {
    attributes: HashMap<String, String>,
    visible: bool,
    mutations: usize,
}

/// In-memory surface for headless hosts and tests.
///
/// Records the current attributes and visibility of each element, plus the
/// number of mutations applied to it.
#[derive(Default)]
pub struct MemorySurface {
    elements: Mutex<HashMap<ElementId, MemoryElement>>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        lock(&self.elements)
            .get(&element)
            .and_then(|e| e.attributes.get(name).cloned())
    }

    pub fn is_visible(&self, element: ElementId) -> bool {
        lock(&self.elements)
            .get(&element)
            .map(|e| e.visible)
            .unwrap_or(false)
    }

    /// Total mutations applied to `element`.
    pub fn mutation_count(&self, element: ElementId) -> usize {
        lock(&self.elements)
            .get(&element)
            .map(|e| e.mutations)
            .unwrap_or(0)
    }
}

impl RenderSurface for MemorySurface {
    fn set_attribute(&self, element: ElementId, name: &str, value: &str) {
        let mut elements = lock(&self.elements);
        let entry = elements.entry(element).or_default();
        entry.attributes.insert(name.to_string(), value.to_string());
        entry.mutations += 1;
    }

    fn remove_attribute(&self, element: ElementId, name: &str) {
        let mut elements = lock(&self.elements);
        let entry = elements.entry(element).or_default();
        entry.attributes.remove(name);
        entry.mutations += 1;
    }

    fn set_visible(&self, element: ElementId, visible: bool) {
        let mut elements = lock(&self.elements);
        let entry = elements.entry(element).or_default();
        entry.visible = visible;
        entry.mutations += 1;
    }
}
