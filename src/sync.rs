//! Keeps the visual list in step with the to-do list.
//!
//! Rows are built from records, and control activations are routed back into
//! record mutations followed by a style refresh on the affected row. Every
//! control is named `<Control>_<item id>`; the id is parsed back out of the
//! name on activation, so a control can never act on a different record than
//! the one it was built for.

use crate::model::{ItemId, ListError, Todo, TodoList};
use crate::registry::WidgetRegistry;
use crate::widgets::{
    control_name, Button, CheckButton, Control, Entry, EntryHandle, FieldValue, ListBox, Row,
    DONE_CLASS, EDITING_CLASS,
};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SyncError {
    #[error("malformed control name: {0}")]
    MalformedName(String),
    #[error("unknown control in name: {0}")]
    UnknownControl(String),
    #[error("no entry registered for {0}")]
    MissingEntry(String),
    #[error(transparent)]
    List(#[from] ListError),
}

/// Keys an editable entry reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKey {
    Enter,
    Escape,
    Char(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
}

/// What an interaction did, for the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Added { index: usize },
    Deleted(Todo),
    EditStarted,
    Toggled { done: bool },
    Committed,
    Canceled,
    Typed,
    Ignored,
}

pub struct ListView {
    model: TodoList,
    list_box: ListBox,
    registry: WidgetRegistry,
}

impl ListView {
    pub fn new(model: TodoList) -> Self {
        ListView {
            model,
            list_box: ListBox::new(),
            registry: WidgetRegistry::new(),
        }
    }

    pub fn model(&self) -> &TodoList {
        &self.model
    }

    pub fn list_box(&self) -> &ListBox {
        &self.list_box
    }

    pub fn list_box_mut(&mut self) -> &mut ListBox {
        &mut self.list_box
    }

    #[cfg(test)]
    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    /// Drops every row and rebuilds the visual list from the model.
    pub fn build_all(&mut self) -> Result<(), SyncError> {
        self.list_box.clear();
        self.registry.clear();
        let ids: Vec<ItemId> = self.model.ids().cloned().collect();
        for id in &ids {
            self.build_row(id)?;
        }
        Ok(())
    }

    pub fn build_row(&mut self, id: &ItemId) -> Result<(), SyncError> {
        let todo = self.model.get(id)?;

        let delete = Button {
            name: control_name(Control::Delete, id),
            label: "✕",
            tooltip: "Delete this thing",
        };
        let edit = Button {
            name: control_name(Control::Edit, id),
            label: "✎",
            tooltip: "Edit this thing",
        };
        let check = CheckButton {
            name: control_name(Control::Check, id),
            active: todo.done,
            tooltip: "Check as done",
        };
        let entry_name = control_name(Control::Entry, id);
        let mut entry = Entry::new(entry_name.clone(), &todo.text);
        entry.style.set_class(DONE_CLASS, todo.done);
        let entry = Rc::new(RefCell::new(entry));
        self.registry.register(entry_name, Rc::clone(&entry));

        self.list_box.insert(Row {
            id: id.clone(),
            delete,
            edit,
            check,
            entry,
        });
        self.list_box.queue_draw();
        Ok(())
    }

    /// Appends the field's contents as a new record, builds its row and
    /// clears the field.
    pub fn add(&mut self, field: &mut FieldValue) -> Result<Outcome, SyncError> {
        let text = field.value().to_string();
        let index = self.model.append(text.as_str());
        let id = self.model.id_at(index)?.clone();
        self.build_row(&id)?;
        field.clear();
        tracing::info!(%id, index, text = %text, "added item");
        Ok(Outcome::Added { index })
    }

    /// Activates the control called `name`.
    pub fn activate(&mut self, name: &str) -> Result<Outcome, SyncError> {
        let (control, id) = parse_name(name)?;
        match control {
            Control::Delete => self.delete(&id),
            Control::Edit | Control::Entry => self.start_edit(&id),
            Control::Check => self.toggle(&id),
        }
    }

    /// Feeds a key press to the entry called `name`. Only editable entries
    /// react; ENTER commits the text to the record, ESC restores it.
    pub fn entry_key(&mut self, name: &str, key: EntryKey) -> Result<Outcome, SyncError> {
        let (_, id) = parse_name(name)?;
        let entry = self.entry_for(&id)?;
        let mut entry = entry.borrow_mut();
        if !entry.editable {
            return Ok(Outcome::Ignored);
        }
        let outcome = match key {
            EntryKey::Enter => {
                self.model.set_text(&id, entry.text())?;
                entry.editable = false;
                entry.style.remove_class(EDITING_CLASS);
                tracing::info!(%id, text = %entry.text(), "committed item text");
                Outcome::Committed
            }
            EntryKey::Escape => {
                let text = self.model.get(&id)?.text.clone();
                entry.field.set(&text);
                entry.editable = false;
                entry.style.remove_class(EDITING_CLASS);
                Outcome::Canceled
            }
            EntryKey::Char(ch) => {
                entry.field.insert_char(ch);
                Outcome::Typed
            }
            EntryKey::Backspace => {
                entry.field.backspace();
                Outcome::Typed
            }
            EntryKey::Delete => {
                entry.field.delete();
                Outcome::Typed
            }
            EntryKey::Left => {
                entry.field.move_left();
                Outcome::Typed
            }
            EntryKey::Right => {
                entry.field.move_right();
                Outcome::Typed
            }
            EntryKey::Home => {
                entry.field.home();
                Outcome::Typed
            }
            EntryKey::End => {
                entry.field.end();
                Outcome::Typed
            }
        };
        self.list_box.queue_draw();
        Ok(outcome)
    }

    /// The record whose entry is currently editable, if any.
    pub fn editing(&self) -> Option<ItemId> {
        self.list_box
            .rows()
            .iter()
            .find(|row| row.entry.borrow().editable)
            .map(|row| row.id.clone())
    }

    fn delete(&mut self, id: &ItemId) -> Result<Outcome, SyncError> {
        let removed = self.model.remove(id)?;
        self.list_box.remove(id);
        self.registry.unregister(&control_name(Control::Entry, id));
        self.list_box.queue_draw();
        tracing::info!(%id, text = %removed.text, "removed item");
        Ok(Outcome::Deleted(removed))
    }

    fn start_edit(&mut self, id: &ItemId) -> Result<Outcome, SyncError> {
        self.model.get(id)?;
        let entry = self.entry_for(id)?;
        let mut entry = entry.borrow_mut();
        entry.editable = true;
        entry.field.end();
        entry.style.add_class(EDITING_CLASS);
        self.list_box.queue_draw();
        Ok(Outcome::EditStarted)
    }

    fn toggle(&mut self, id: &ItemId) -> Result<Outcome, SyncError> {
        let done = self.model.toggle_done(id)?;
        self.entry_for(id)?
            .borrow_mut()
            .style
            .set_class(DONE_CLASS, done);
        if let Some(row) = self.list_box.row_mut(id) {
            row.check.active = done;
        }
        self.list_box.queue_draw();
        tracing::debug!(%id, done, "toggled item");
        Ok(Outcome::Toggled { done })
    }

    fn entry_for(&self, id: &ItemId) -> Result<EntryHandle, SyncError> {
        let name = control_name(Control::Entry, id);
        self.registry
            .lookup(&name)
            .ok_or(SyncError::MissingEntry(name))
    }
}

/// Splits `Check_k3Xq9a` into its control and record id.
pub fn parse_name(name: &str) -> Result<(Control, ItemId), SyncError> {
    let (prefix, id) = name
        .split_once('_')
        .filter(|(_, id)| !id.is_empty())
        .ok_or_else(|| SyncError::MalformedName(name.to_string()))?;
    let control =
        Control::from_prefix(prefix).ok_or_else(|| SyncError::UnknownControl(name.to_string()))?;
    Ok((control, ItemId::from(id)))
}
