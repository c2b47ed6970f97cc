//! The source-layer trait and an in-memory implementation.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::governor::GovernorDetails;

/// Capability set the engine needs from whatever parses user declarations.
pub trait SourceLayer {
    /// Returns the governor named `qualified_name` under `path`, if it exists.
    fn governor(&self, qualified_name: &str, path: &str) -> Option<Rc<GovernorDetails>>;

    /// Returns `true` if `governor` carries `marker`.
    fn governor_has_marker(&self, governor: &GovernorDetails, marker: &str) -> bool {
        governor.has_marker(marker)
    }
}

/// A [`SourceLayer`] backed by an in-memory map.
///
/// Mutation goes through `&self` so a layer shared with the engine can be
/// edited between notifications.
#[derive(Default)]
pub struct MemorySourceLayer {
    governors: RefCell<BTreeMap<(String, String), Rc<GovernorDetails>>>,
}

impl MemorySourceLayer {
    /// Creates an empty layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a governor, returning the previous one.
    pub fn insert(&self, governor: GovernorDetails) -> Option<Rc<GovernorDetails>> {
        let key = (governor.path.clone(), governor.qualified_name.clone());
        self.governors.borrow_mut().insert(key, Rc::new(governor))
    }

    /// Removes a governor, returning it if it existed.
    pub fn remove(&self, path: &str, qualified_name: &str) -> Option<Rc<GovernorDetails>> {
        self.governors
            .borrow_mut()
            .remove(&(path.to_string(), qualified_name.to_string()))
    }

    /// Returns every governor, ordered by `(path, qualified_name)`.
    pub fn governors(&self) -> Vec<Rc<GovernorDetails>> {
        self.governors.borrow().values().cloned().collect()
    }

    /// Returns the number of governors.
    pub fn len(&self) -> usize {
        self.governors.borrow().len()
    }

    /// Returns `true` if the layer holds no governors.
    pub fn is_empty(&self) -> bool {
        self.governors.borrow().is_empty()
    }
}

impl SourceLayer for MemorySourceLayer {
    fn governor(&self, qualified_name: &str, path: &str) -> Option<Rc<GovernorDetails>> {
        self.governors
            .borrow()
            .get(&(path.to_string(), qualified_name.to_string()))
            .cloned()
    }
}
