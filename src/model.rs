use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Todo {
    pub done: bool,
    pub text: String,
}

/// Stable in-memory identity of a record. Never persisted; reassigned on load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(String);

#[derive(Debug, Clone)]
struct Item {
    id: ItemId,
    todo: Todo,
}

/// Ordered list of records. Insertion order is display order.
#[derive(Debug, Clone, Default)]
pub struct TodoList {
    items: Vec<Item>,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ListError {
    #[error("index {index} out of range (list has {len} items)")]
    OutOfRange { index: usize, len: usize },
    #[error("item not found: {0}")]
    NotFound(ItemId),
}

impl Todo {
    pub fn new(text: impl Into<String>) -> Self {
        Todo {
            done: false,
            text: text.into(),
        }
    }
}

impl ItemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        ItemId(value.to_string())
    }
}

impl TodoList {
    pub fn new() -> Self {
        TodoList::default()
    }

    pub fn from_todos(todos: Vec<Todo>) -> Self {
        let mut list = TodoList::new();
        for todo in todos {
            list.push(todo);
        }
        list
    }

    pub fn todos(&self) -> Vec<Todo> {
        self.items.iter().map(|item| item.todo.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &ItemId> + '_ {
        self.items.iter().map(|item| &item.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, &Todo)> + '_ {
        self.items.iter().map(|item| (&item.id, &item.todo))
    }

    /// Appends a not-done record and returns its index.
    pub fn append(&mut self, text: impl Into<String>) -> usize {
        self.push(Todo::new(text));
        self.items.len() - 1
    }

    pub fn push(&mut self, todo: Todo) -> ItemId {
        let id = self.fresh_id();
        self.items.push(Item {
            id: id.clone(),
            todo,
        });
        id
    }

    pub fn at(&self, index: usize) -> Result<&Todo, ListError> {
        self.items
            .get(index)
            .map(|item| &item.todo)
            .ok_or(self.out_of_range(index))
    }

    pub fn id_at(&self, index: usize) -> Result<&ItemId, ListError> {
        self.items
            .get(index)
            .map(|item| &item.id)
            .ok_or(self.out_of_range(index))
    }

    pub fn delete_at(&mut self, index: usize) -> Result<Todo, ListError> {
        self.check_index(index)?;
        Ok(self.items.remove(index).todo)
    }

    pub fn toggle_done_at(&mut self, index: usize) -> Result<bool, ListError> {
        self.check_index(index)?;
        let todo = &mut self.items[index].todo;
        todo.done = !todo.done;
        Ok(todo.done)
    }

    pub fn set_text_at(&mut self, index: usize, text: impl Into<String>) -> Result<(), ListError> {
        self.check_index(index)?;
        self.items[index].todo.text = text.into();
        Ok(())
    }

    pub fn position(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    pub fn get(&self, id: &ItemId) -> Result<&Todo, ListError> {
        let index = self.locate(id)?;
        Ok(&self.items[index].todo)
    }

    pub fn remove(&mut self, id: &ItemId) -> Result<Todo, ListError> {
        let index = self.locate(id)?;
        self.delete_at(index)
    }

    pub fn toggle_done(&mut self, id: &ItemId) -> Result<bool, ListError> {
        let index = self.locate(id)?;
        self.toggle_done_at(index)
    }

    pub fn set_text(&mut self, id: &ItemId, text: impl Into<String>) -> Result<(), ListError> {
        let index = self.locate(id)?;
        self.set_text_at(index, text)
    }

    fn locate(&self, id: &ItemId) -> Result<usize, ListError> {
        self.position(id)
            .ok_or_else(|| ListError::NotFound(id.clone()))
    }

    fn check_index(&self, index: usize) -> Result<(), ListError> {
        if index < self.items.len() {
            Ok(())
        } else {
            Err(self.out_of_range(index))
        }
    }

    fn out_of_range(&self, index: usize) -> ListError {
        ListError::OutOfRange {
            index,
            len: self.items.len(),
        }
    }

    fn fresh_id(&self) -> ItemId {
        loop {
            let candidate = ItemId(generate_id());
            if self.position(&candidate).is_none() {
                return candidate;
            }
        }
    }
}

fn generate_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn list_of(texts: &[&str]) -> TodoList {
        let mut list = TodoList::new();
        for text in texts {
            list.append(*text);
        }
        list
    }

    #[test]
    fn append_keeps_order_and_length() {
        let texts = ["milk", "eggs", "bread", "coffee"];
        let list = list_of(&texts);
        assert_eq!(list.len(), texts.len());
        for (idx, text) in texts.iter().enumerate() {
            assert_eq!(list.at(idx).unwrap(), &Todo::new(*text));
        }
    }

    #[test]
    fn append_returns_new_index() {
        let mut list = list_of(&["a"]);
        assert_eq!(list.append("b"), 1);
        assert_eq!(list.append("c"), 2);
    }

    #[test]
    fn delete_shifts_following_records() {
        let before = list_of(&["a", "b", "c", "d"]);
        for i in 0..before.len() {
            let mut list = before.clone();
            list.delete_at(i).unwrap();
            assert_eq!(list.len(), before.len() - 1);
            for j in 0..list.len() {
                let expected = if j < i { j } else { j + 1 };
                assert_eq!(list.at(j).unwrap(), before.at(expected).unwrap());
            }
        }
    }

    #[test]
    fn toggle_twice_restores_done() {
        let mut list = list_of(&["a", "b"]);
        assert!(list.toggle_done_at(1).unwrap());
        assert!(!list.toggle_done_at(1).unwrap());
        assert!(!list.at(1).unwrap().done);
    }

    #[test]
    fn toggle_second_of_two() {
        let mut list = TodoList::from_todos(vec![Todo::new("X"), Todo::new("Y")]);
        list.toggle_done_at(1).unwrap();
        assert_eq!(
            list.todos(),
            vec![
                Todo {
                    done: false,
                    text: "X".into()
                },
                Todo {
                    done: true,
                    text: "Y".into()
                },
            ]
        );
    }

    #[test]
    fn out_of_range_is_reported() {
        let mut list = list_of(&["a"]);
        let err = ListError::OutOfRange { index: 3, len: 1 };
        assert_eq!(list.at(3).unwrap_err(), err);
        assert_eq!(list.delete_at(3).unwrap_err(), err);
        assert_eq!(list.toggle_done_at(3).unwrap_err(), err);
        assert_eq!(list.set_text_at(3, "x").unwrap_err(), err);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn ids_survive_deletion_of_other_items() {
        let mut list = list_of(&["a", "b", "c"]);
        let c_id = list.id_at(2).unwrap().clone();
        list.delete_at(0).unwrap();
        assert_eq!(list.position(&c_id), Some(1));
        list.set_text(&c_id, "changed").unwrap();
        assert_eq!(list.at(1).unwrap().text, "changed");
    }

    #[test]
    fn removed_id_is_not_found() {
        let mut list = list_of(&["a", "b"]);
        let id = list.id_at(0).unwrap().clone();
        list.remove(&id).unwrap();
        assert_eq!(list.toggle_done(&id).unwrap_err(), ListError::NotFound(id));
    }

    #[test]
    fn ids_are_unique() {
        let list = list_of(&["a"; 50]);
        let mut ids: Vec<_> = list.ids().cloned().collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 50);
    }
}
