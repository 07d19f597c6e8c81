use crate::model::TodoList;
use crate::storage::{list_path, load_config, load_list, save_list, Config};
use crate::ui;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub fn list(config_path: &Path) -> Result<()> {
    let (config, list, _) = load_current_list(config_path)?;
    println!("{}", config.current_list);
    if list.is_empty() {
        println!("  (empty)");
    }
    for (idx, (_, todo)) in list.iter().enumerate() {
        let mark = if todo.done { "x" } else { " " };
        println!("  [{}] {}: {}", mark, idx, todo.text);
    }
    Ok(())
}

pub fn add(config_path: &Path, text: String) -> Result<()> {
    let (_, mut list, path) = load_current_list(config_path)?;
    let index = list.append(text.as_str());
    save_list(&path, &list.todos())?;
    tracing::info!(index, text = %text, "added item from command line");
    println!("Added {}: {}", index, text);
    Ok(())
}

pub fn toggle(config_path: &Path, index: usize) -> Result<()> {
    let (_, mut list, path) = load_current_list(config_path)?;
    let done = list
        .toggle_done_at(index)
        .with_context(|| format!("toggling item {}", index))?;
    save_list(&path, &list.todos())?;
    let todo = list.at(index)?;
    tracing::info!(index, done, "toggled item from command line");
    println!(
        "Marked {} as {}: {}",
        index,
        if done { "done" } else { "not done" },
        todo.text
    );
    Ok(())
}

pub fn remove(config_path: &Path, index: usize) -> Result<()> {
    let (_, mut list, path) = load_current_list(config_path)?;
    let removed = list
        .delete_at(index)
        .with_context(|| format!("removing item {}", index))?;
    save_list(&path, &list.todos())?;
    tracing::info!(index, text = %removed.text, "removed item from command line");
    println!("Removed {}: {}", index, removed.text);
    Ok(())
}

/// Opens the window. Unreadable files fall back to defaults so the window
/// always comes up.
pub fn tui(config_path: &Path) -> Result<()> {
    let config = load_config(config_path).unwrap_or_else(|err| {
        tracing::warn!("config unreadable, using defaults: {:#}", err);
        Config::fallback()
    });
    let path = list_path(config_path, &config);
    let todos = load_list(&path).unwrap_or_else(|err| {
        tracing::warn!("list unreadable, starting empty: {:#}", err);
        Vec::new()
    });
    ui::run(
        config,
        TodoList::from_todos(todos),
        ui::Paths {
            config: config_path.to_path_buf(),
            list: path,
        },
    )
}

/// Command-line edits refuse to run over unreadable files, since they save
/// straight away.
fn load_current_list(config_path: &Path) -> Result<(Config, TodoList, PathBuf)> {
    let config = load_config(config_path)?;
    let path = list_path(config_path, &config);
    let todos = load_list(&path)?;
    Ok((config, TodoList::from_todos(todos), path))
}
