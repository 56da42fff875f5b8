//! Plain-text board rendering.

use todolist_core::view::{BoardView, TaskRegionView};
use uuid::Uuid;

/// First block of the hyphenated id; enough to address a task in practice.
pub fn short_id(id: Uuid) -> String {
    id.to_string().chars().take(8).collect()
}

pub fn board_text(view: &BoardView) -> String {
    let mut lines = Vec::new();
    lines.push(format!("# {}", view.header));

    let names: Vec<String> = view
        .switcher
        .entries
        .iter()
        .map(|entry| {
            let marker = if entry.active { "*" } else { " " };
            format!("{marker}{} ({}) [{}]", entry.name, entry.task_count, short_id(entry.id))
        })
        .collect();
    lines.push(format!(
        "Listen {}: {}",
        view.switcher.count_indicator,
        names.join("  ")
    ));
    lines.push(String::new());

    lines.push(format!(
        "Offene Aufgaben: {} / {}",
        view.stats.open, view.stats.total
    ));
    push_region(&mut lines, &view.open);
    lines.push(String::new());

    lines.push(format!(
        "Erledigt ({} / {})",
        view.stats.done, view.stats.total
    ));
    push_region(&mut lines, &view.done);
    lines.join("\n")
}

fn push_region(lines: &mut Vec<String>, region: &TaskRegionView) {
    if let Some(message) = region.empty_message {
        lines.push(format!("  {message}"));
        return;
    }
    for item in &region.items {
        let check = if item.done { "x" } else { " " };
        lines.push(format!("  [{check}] {}  {}", item.text, short_id(item.id)));
    }
}

#[cfg(test)]
mod tests {
    use super::board_text;
    use todolist_core::{render_board, ListRegistry, OrderingPolicy};

    #[test]
    fn renders_header_regions_and_markers() {
        let mut registry = ListRegistry::default();
        let todos = &mut registry.resolve_active_mut().todos;
        let milk = todos.add_task("Buy milk").unwrap();
        todos.add_task("Call mom").unwrap();
        todos.toggle_task(milk.id, OrderingPolicy::Stable);

        let text = board_text(&render_board(&registry));
        assert!(text.starts_with("# Meine Todos"));
        assert!(text.contains("Listen 1/5: *Meine Todos (2)"));
        assert!(text.contains("Offene Aufgaben: 1 / 2"));
        assert!(text.contains("  [ ] Call mom"));
        assert!(text.contains("  [x] Buy milk"));
    }

    #[test]
    fn renders_empty_state_messages() {
        let text = board_text(&render_board(&ListRegistry::default()));
        assert!(text.contains("Keine offenen Todos."));
        assert!(text.contains("Noch nichts erledigt."));
    }
}
