//! Read-only projection of lab state for front ends.
//!
//! A [`LabView`] is computed from the controller's state and never read
//! back; front ends render it however they like. [`render_text`] is the
//! plain-terminal rendering used by the CLI.

use serde::Serialize;

use crate::catalog::Catalog;
use crate::editor::EditorState;
use crate::state::LabProgress;
use crate::terminal::TerminalLog;

pub const LAB_TITLE: &str = "DevOps Microservice Deployment Lab";
pub const LAB_SUBTITLE: &str = "Production-Ready Deployment Practices for DevOps Engineers";

/// One entry of the step sidebar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SidebarItem {
    /// 1-based position.
    pub number: usize,
    pub title: &'static str,
    pub description: &'static str,
    pub active: bool,
    /// Passed a progress check.
    pub completed: bool,
    /// Comes before the selected step.
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskItem {
    pub text: &'static str,
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabItem {
    pub name: String,
    pub active: bool,
}

/// Everything a front end needs to draw the lab.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabView {
    pub progress_percent: f64,
    pub steps: Vec<SidebarItem>,
    pub step_title: &'static str,
    /// `"<n> / <total>"`.
    pub step_counter: String,
    pub instructions_html: &'static str,
    pub tasks: Vec<TaskItem>,
    pub prev_enabled: bool,
    pub next_enabled: bool,
    pub tabs: Vec<TabItem>,
    pub editor: String,
    pub terminal: Vec<String>,
}

impl LabView {
    /// Projects the given state. The progress must belong to `catalog`.
    pub fn project(
        catalog: &Catalog,
        progress: &LabProgress,
        editor: &EditorState,
        terminal: &TerminalLog,
    ) -> Self {
        let current = progress.current_step_index();
        let step = catalog
            .get(current)
            .expect("progress index is always inside the catalog");
        let step_done = progress.is_completed(current);

        Self {
            progress_percent: progress.progress_percent(),
            steps: catalog
                .iter()
                .enumerate()
                .map(|(index, item)| SidebarItem {
                    number: index + 1,
                    title: item.title,
                    description: item.description,
                    active: index == current,
                    completed: progress.is_completed(index),
                    passed: index < current,
                })
                .collect(),
            step_title: step.title,
            step_counter: format!("{} / {}", current + 1, catalog.len()),
            instructions_html: step.instructions_html,
            tasks: step
                .tasks
                .iter()
                .map(|&text| TaskItem {
                    text,
                    done: step_done,
                })
                .collect(),
            prev_enabled: progress.can_go_prev(),
            next_enabled: progress.can_go_next(),
            tabs: editor
                .tabs()
                .iter()
                .map(|name| TabItem {
                    name: name.clone(),
                    active: editor.active_file() == Some(name.as_str()),
                })
                .collect(),
            editor: editor.buffer().to_string(),
            terminal: terminal.lines().to_vec(),
        }
    }
}

/// Converts the instructional markup to plain text.
///
/// Handles the small tag set the catalog uses: list items become `- `
/// bullets, block tags become line breaks, everything else is dropped.
pub fn html_to_text(html: &str) -> String {
    fn break_line(raw: &mut String) {
        if !raw.is_empty() && !raw.ends_with('\n') {
            raw.push('\n');
        }
    }

    let mut raw = String::with_capacity(html.len());
    let mut in_pre = false;
    let mut rest = html;

    loop {
        let start = rest.find('<').unwrap_or(rest.len());
        let text = &rest[..start];
        if in_pre {
            raw.push_str(text);
        } else {
            raw.push_str(text.trim());
        }

        let Some(len) = rest[start..].find('>') else {
            break;
        };
        let tag = &rest[start + 1..start + len];
        let closing = tag.starts_with('/');
        let name = tag
            .trim_start_matches('/')
            .split_whitespace()
            .next()
            .unwrap_or("");

        match name {
            "li" if !closing => {
                break_line(&mut raw);
                raw.push_str("- ");
            }
            "pre" => {
                break_line(&mut raw);
                in_pre = !closing;
            }
            "h4" | "h5" | "p" | "div" | "ul" | "li" => break_line(&mut raw),
            _ => {}
        }
        rest = &rest[start + len + 1..];
    }

    let raw = raw
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");

    let mut lines: Vec<&str> = Vec::new();
    for line in raw.lines().map(str::trim) {
        if line.is_empty() && lines.last().map_or(true, |prev| prev.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.last() == Some(&"") {
        lines.pop();
    }
    lines.join("\n")
}

fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Renders everything except the terminal, which front ends stream live.
pub fn render_text(view: &LabView) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{}  {} {:.0}%\n{}\n\n",
        LAB_TITLE,
        progress_bar(view.progress_percent, 24),
        view.progress_percent,
        LAB_SUBTITLE
    ));

    out.push_str("Lab Steps\n");
    for item in &view.steps {
        let marker = if item.active { '>' } else { ' ' };
        let status = if item.completed { "✔" } else { "○" };
        out.push_str(&format!(
            " {} {} {}. {} - {}\n",
            marker, status, item.number, item.title, item.description
        ));
    }

    out.push_str(&format!("\n{}  ({})\n\n", view.step_title, view.step_counter));
    out.push_str(&html_to_text(view.instructions_html));

    out.push_str("\n\nTasks to Complete:\n");
    for task in &view.tasks {
        let mark = if task.done { 'x' } else { ' ' };
        out.push_str(&format!("  [{}] {}\n", mark, task.text));
    }

    let nav = |enabled: bool, label: &str| {
        if enabled {
            format!("[{}]", label)
        } else {
            format!("({})", label)
        }
    };
    out.push_str(&format!(
        "\n{} {} [:check]\n",
        nav(view.prev_enabled, ":prev"),
        nav(view.next_enabled, ":next")
    ));

    let tabs: Vec<String> = view
        .tabs
        .iter()
        .map(|tab| {
            if tab.active {
                format!("[{}]", tab.name)
            } else {
                tab.name.clone()
            }
        })
        .collect();
    out.push_str(&format!("\nFiles: {}\n", tabs.join("  ")));
    out.push_str("----\n");
    out.push_str(&view.editor);
    out.push_str("\n----\n");

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view_at(index: usize, completed: &[usize]) -> LabView {
        let catalog = Catalog::standard();
        let mut progress = LabProgress::new(catalog.len());
        for &done in completed {
            progress.mark_completed(done).unwrap();
        }
        progress.go_to_step(index).unwrap();
        let mut editor = EditorState::new();
        editor.load_step(catalog.get(index).unwrap());
        let mut terminal = TerminalLog::new();
        terminal.append("ready");

        LabView::project(&catalog, &progress, &editor, &terminal)
    }

    #[test]
    fn projection_reflects_selected_step() {
        let view = view_at(2, &[]);

        assert_eq!(view.step_title, "Local Deployment with Docker Compose");
        assert_eq!(view.step_counter, "3 / 6");
        assert_eq!(view.progress_percent, 50.0);
        assert!(view.prev_enabled);
        assert!(view.next_enabled);
        assert!(view.steps[2].active);
        assert!(view.steps[0].passed && view.steps[1].passed);
        assert!(!view.steps[3].passed);
        assert_eq!(view.terminal, vec!["ready".to_string()]);
    }

    #[test]
    fn navigation_flags_at_the_ends() {
        let first = view_at(0, &[]);
        assert!(!first.prev_enabled);
        assert!(first.next_enabled);

        let last = view_at(5, &[]);
        assert!(last.prev_enabled);
        assert!(!last.next_enabled);
    }

    #[test]
    fn completed_step_checks_its_tasks() {
        let view = view_at(1, &[1, 4]);

        assert!(view.tasks.iter().all(|task| task.done));
        assert!(view.steps[1].completed);
        assert!(view.steps[4].completed);
        assert!(!view.steps[0].completed);
    }

    #[test]
    fn tabs_mark_the_active_file() {
        let view = view_at(0, &[]);
        let active: Vec<_> = view.tabs.iter().filter(|tab| tab.active).collect();

        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "app.js");
    }

    #[test]
    fn projecting_twice_is_identical() {
        assert_eq!(view_at(3, &[0]), view_at(3, &[0]));
    }

    #[test]
    fn view_serializes_to_json() {
        let json = serde_json::to_value(view_at(0, &[])).unwrap();

        assert_eq!(json["step_counter"], "1 / 6");
        assert_eq!(json["steps"].as_array().unwrap().len(), 6);
    }

    #[test]
    fn html_to_text_renders_lists_and_entities() {
        let text = html_to_text(
            "<h4>Title</h4>\n<ul>\n  <li>One</li>\n  <li>Two</li>\n</ul>\n<pre><code>git remote add origin &lt;url&gt;</code></pre>",
        );

        assert_eq!(text, "Title\n- One\n- Two\ngit remote add origin <url>");
    }

    #[test]
    fn html_to_text_keeps_single_blank_lines_in_code() {
        let text = html_to_text("<pre><code># a\nrun a\n\n\n# b\nrun b</code></pre>");
        assert_eq!(text, "# a\nrun a\n\n# b\nrun b");
    }

    #[test]
    fn render_text_shows_step_tasks_and_editor() {
        let text = render_text(&view_at(0, &[0]));

        assert!(text.starts_with(LAB_TITLE));
        assert!(text.contains("DevOps Environment Setup  (1 / 6)"));
        assert!(text.contains("  [x] Initialize Git repository"));
        assert!(text.contains("(:prev) [:next]"));
        assert!(text.contains("Files: [app.js]  Dockerfile  docker-compose.yml"));
        assert!(text.contains("// Welcome to the Microservice Lab!"));
    }
}
