use colored::Colorize;
use reconcile::{Action, ActionKind};

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

// ============================================================================
// Action Formatting
// ============================================================================

/// Diff-style marker for an action kind
pub fn symbol(kind: ActionKind) -> &'static str {
    match kind {
        ActionKind::NoChange => "=",
        ActionKind::Update => "~",
        ActionKind::Create => "+",
        ActionKind::Delete => "-",
    }
}

/// Report line for an action, colored by kind
///
/// The text is exactly the action's `Display`; only the styling differs.
pub fn action_line(action: &Action) -> String {
    let line = action.to_string();
    match action.kind() {
        ActionKind::NoChange => line.dimmed().to_string(),
        ActionKind::Update => line.yellow().to_string(),
        ActionKind::Create => line.green().to_string(),
        ActionKind::Delete => line.red().to_string(),
    }
}

/// Pluralize a count: `1 file`, `2 files`
pub fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

// ============================================================================
// Tests
// ============================================================================
