//! Keyboard shortcuts and the commands they trigger.

use crate::input::Modifiers;
use crate::tools::ToolKind;
use serde::{Deserialize, Serialize};

/// Board-level commands reachable from the keyboard or toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    Undo,
    Redo,
    /// Store the drawing as the one restored on the next start.
    Save,
    Clear,
    SelectTool(ToolKind),
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    /// Ctrl, or Cmd on macOS.
    pub command_key: bool,
    pub shift: bool,
    pub command: Command,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        command_key: bool,
        shift: bool,
        command: Command,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            command_key,
            shift,
            command,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Shift+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.command_key {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }

    fn matches(&self, key: &str, modifiers: Modifiers) -> bool {
        self.key.eq_ignore_ascii_case(key)
            && self.command_key == modifiers.command()
            && self.shift == modifiers.shift
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Z", true, false, Command::Undo, "Undo"),
            Shortcut::new("Z", true, true, Command::Redo, "Redo"),
            Shortcut::new("Y", true, false, Command::Redo, "Redo"),
            Shortcut::new("S", true, false, Command::Save, "Save drawing"),
            Shortcut::new("P", false, false, Command::SelectTool(ToolKind::Pen), "Pen"),
            Shortcut::new("E", false, false, Command::SelectTool(ToolKind::Eraser), "Eraser"),
            Shortcut::new(
                "R",
                false,
                false,
                Command::SelectTool(ToolKind::Rectangle),
                "Rectangle",
            ),
        ]
    }

    /// Command bound to a key press, if any. `key` is the key's text as the
    /// host reports it; letter case is ignored.
    pub fn command_for(key: &str, modifiers: Modifiers) -> Option<Command> {
        Self::all()
            .into_iter()
            .find(|s| s.matches(key, modifiers))
            .map(|s| s.command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctrl() -> Modifiers {
        Modifiers {
            ctrl: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_undo_redo_chords() {
        assert_eq!(ShortcutRegistry::command_for("z", ctrl()), Some(Command::Undo));

        let ctrl_shift = Modifiers {
            shift: true,
            ..ctrl()
        };
        // Shift turns the reported key upper case in browsers.
        assert_eq!(ShortcutRegistry::command_for("Z", ctrl_shift), Some(Command::Redo));
        assert_eq!(ShortcutRegistry::command_for("y", ctrl()), Some(Command::Redo));
    }

    #[test]
    fn test_cmd_works_like_ctrl() {
        let cmd = Modifiers {
            meta: true,
            ..Default::default()
        };
        assert_eq!(ShortcutRegistry::command_for("z", cmd), Some(Command::Undo));
        assert_eq!(ShortcutRegistry::command_for("s", cmd), Some(Command::Save));
    }

    #[test]
    fn test_plain_keys() {
        assert_eq!(ShortcutRegistry::command_for("z", Modifiers::default()), None);
        assert_eq!(
            ShortcutRegistry::command_for("e", Modifiers::default()),
            Some(Command::SelectTool(ToolKind::Eraser))
        );
        assert_eq!(ShortcutRegistry::command_for("e", ctrl()), None);
    }

    #[test]
    fn test_format() {
        let redo = &ShortcutRegistry::all()[1];
        assert_eq!(redo.format(), "Ctrl+Shift+Z");
    }
}
