//! Retained controls making up the visual list. The renderer in `ui` draws
//! them; the synchronizer in `sync` builds, patches and reacts to them.

use crate::model::ItemId;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

pub const DONE_CLASS: &str = "done";
pub const EDITING_CLASS: &str = "editing";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleContext {
    classes: BTreeSet<String>,
}

impl StyleContext {
    pub fn add_class(&mut self, class: &str) {
        self.classes.insert(class.to_string());
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.remove(class);
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    /// Adds or removes `class` depending on `on`.
    pub fn set_class(&mut self, class: &str, on: bool) {
        if on {
            self.add_class(class);
        } else {
            self.remove_class(class);
        }
    }
}

#[derive(Debug, Clone)]
pub struct Button {
    pub name: String,
    pub label: &'static str,
    pub tooltip: &'static str,
}

#[derive(Debug, Clone)]
pub struct CheckButton {
    pub name: String,
    pub active: bool,
    pub tooltip: &'static str,
}

/// Single-line text buffer with a byte cursor kept on char boundaries.
#[derive(Debug, Clone, Default)]
pub struct FieldValue {
    value: String,
    cursor: usize,
}

impl FieldValue {
    pub fn new(value: &str) -> Self {
        FieldValue {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set(&mut self, value: &str) {
        self.value = value.to_string();
        self.cursor = self.value.len();
    }

    pub fn clear(&mut self) {
        self.set("");
    }

    pub fn move_left(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor = prev_char(self.cursor, &self.value);
    }

    pub fn move_right(&mut self) {
        if self.cursor >= self.value.len() {
            return;
        }
        self.cursor = next_char(self.cursor, &self.value);
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.value.len();
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = prev_char(self.cursor, &self.value);
        self.value.drain(prev..self.cursor);
        self.cursor = prev;
    }

    pub fn delete(&mut self) {
        if self.cursor >= self.value.len() {
            return;
        }
        let next = next_char(self.cursor, &self.value);
        self.value.drain(self.cursor..next);
    }

    pub fn insert_char(&mut self, ch: char) {
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    pub fn with_caret(&self) -> String {
        let mut text = self.value.clone();
        text.insert_str(self.cursor, "▌");
        text
    }
}

#[derive(Debug, Clone)]
pub struct Entry {
    pub name: String,
    pub field: FieldValue,
    pub editable: bool,
    pub style: StyleContext,
}

impl Entry {
    pub fn new(name: impl Into<String>, text: &str) -> Self {
        Entry {
            name: name.into(),
            field: FieldValue::new(text),
            editable: false,
            style: StyleContext::default(),
        }
    }

    pub fn text(&self) -> &str {
        self.field.value()
    }
}

/// Shared handle to a live entry, held by its row and by the widget registry.
pub type EntryHandle = Rc<RefCell<Entry>>;

/// Controls of a row, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Delete,
    Edit,
    Check,
    Entry,
}

impl Control {
    pub const ALL: [Control; 4] = [Control::Delete, Control::Edit, Control::Check, Control::Entry];

    pub fn prefix(&self) -> &'static str {
        match self {
            Control::Delete => "Delete",
            Control::Edit => "Edit",
            Control::Check => "Check",
            Control::Entry => "Entry",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Control::ALL.into_iter().find(|c| c.prefix() == prefix)
    }

    pub fn next(&self) -> Self {
        match self {
            Control::Delete => Control::Edit,
            Control::Edit => Control::Check,
            Control::Check => Control::Entry,
            Control::Entry => Control::Entry,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Control::Delete => Control::Delete,
            Control::Edit => Control::Delete,
            Control::Check => Control::Edit,
            Control::Entry => Control::Check,
        }
    }
}

/// Synthetic control name, e.g. `Entry_a8Kz01`.
pub fn control_name(control: Control, id: &ItemId) -> String {
    format!("{}_{}", control.prefix(), id)
}

/// Horizontal container for one record.
#[derive(Debug, Clone)]
pub struct Row {
    pub id: ItemId,
    pub delete: Button,
    pub edit: Button,
    pub check: CheckButton,
    pub entry: EntryHandle,
}

impl Row {
    pub fn control_name(&self, control: Control) -> String {
        match control {
            Control::Delete => self.delete.name.clone(),
            Control::Edit => self.edit.name.clone(),
            Control::Check => self.check.name.clone(),
            Control::Entry => self.entry.borrow().name.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ListBox {
    rows: Vec<Row>,
    needs_redraw: bool,
}

impl ListBox {
    pub fn new() -> Self {
        ListBox::default()
    }

    pub fn insert(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn remove(&mut self, id: &ItemId) -> Option<Row> {
        let idx = self.position(id)?;
        Some(self.rows.remove(idx))
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn position(&self, id: &ItemId) -> Option<usize> {
        self.rows.iter().position(|row| &row.id == id)
    }

    pub fn row_mut(&mut self, id: &ItemId) -> Option<&mut Row> {
        self.rows.iter_mut().find(|row| &row.id == id)
    }

    pub fn row_at(&self, idx: usize) -> Option<&Row> {
        self.rows.get(idx)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn queue_draw(&mut self) {
        self.needs_redraw = true;
    }

    /// Returns whether a redraw was requested since the last call.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }
}

fn prev_char(cursor: usize, text: &str) -> usize {
    text[..cursor]
        .char_indices()
        .next_back()
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}

fn next_char(cursor: usize, text: &str) -> usize {
    text[cursor..]
        .chars()
        .next()
        .map(|ch| cursor + ch.len_utf8())
        .unwrap_or(text.len())
}
