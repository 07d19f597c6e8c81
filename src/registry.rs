use crate::widgets::EntryHandle;
use std::collections::HashMap;

/// Name-keyed lookup of live entry controls, so a row's entry can be found
/// without walking the visual list.
#[derive(Debug, Default)]
pub struct WidgetRegistry {
    widgets: HashMap<String, EntryHandle>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        WidgetRegistry::default()
    }

    /// Registers `handle` under `key`, replacing any previous handle.
    pub fn register(&mut self, key: impl Into<String>, handle: EntryHandle) {
        self.widgets.insert(key.into(), handle);
    }

    pub fn lookup(&self, key: &str) -> Option<EntryHandle> {
        self.widgets.get(key).cloned()
    }

    pub fn unregister(&mut self, key: &str) -> Option<EntryHandle> {
        self.widgets.remove(key)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn clear(&mut self) {
        self.widgets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::Entry;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn handle(name: &str, text: &str) -> EntryHandle {
        Rc::new(RefCell::new(Entry::new(name, text)))
    }

    #[test]
    fn register_overwrites_existing_key() {
        let mut registry = WidgetRegistry::new();
        registry.register("Entry_a", handle("Entry_a", "first"));
        registry.register("Entry_a", handle("Entry_a", "second"));
        assert_eq!(registry.len(), 1);
        let found = registry.lookup("Entry_a").unwrap();
        assert_eq!(found.borrow().text(), "second");
    }

    #[test]
    fn lookup_shares_the_live_handle() {
        let mut registry = WidgetRegistry::new();
        let entry = handle("Entry_b", "text");
        registry.register("Entry_b", Rc::clone(&entry));
        registry
            .lookup("Entry_b")
            .unwrap()
            .borrow_mut()
            .style
            .add_class("done");
        assert!(entry.borrow().style.has_class("done"));
    }

    #[test]
    fn unregister_prunes_entry() {
        let mut registry = WidgetRegistry::new();
        registry.register("Entry_c", handle("Entry_c", ""));
        assert!(registry.unregister("Entry_c").is_some());
        assert!(registry.lookup("Entry_c").is_none());
        assert!(registry.is_empty());
        assert!(registry.unregister("Entry_c").is_none());
    }
}
