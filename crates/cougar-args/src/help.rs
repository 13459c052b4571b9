//! Usage and help text rendering.
//!
//! A command keeps no link to its parents, so callers pass the chain of
//! ancestor commands (root first) to build the full usage line.

use crate::command::Command;

impl Command {
    /// `swift package edit [options] <pkg>`
    pub fn usage(&self, super_commands: &[&Command]) -> String {
        let mut parts: Vec<String> = super_commands.iter().map(|c| c.name.clone()).collect();
        parts.push(self.name.clone());
        if !self.options.is_empty() {
            parts.push("[options]".to_string());
        }
        parts.extend(self.parameters.iter().map(|p| p.to_string()));
        if !self.subcommands.is_empty() {
            parts.push("<subcommand>".to_string());
        }
        parts.join(" ")
    }

    /// Render the help menu: `OVERVIEW`, `USAGE`, then `SUBCOMMANDS` and
    /// `OPTIONS` when there are any.
    pub fn help(&self, super_commands: &[&Command]) -> String {
        let mut out = format!(
            "OVERVIEW: {}\n\nUSAGE: {}\n",
            self.overview.trim(),
            self.usage(super_commands)
        );

        if !self.subcommands.is_empty() {
            let rows: Vec<(String, &str)> = self
                .subcommands
                .iter()
                .map(|c| (c.name.clone(), c.overview.as_str()))
                .collect();
            out.push_str("\nSUBCOMMANDS:\n");
            self.push_rows(&mut out, &rows);
        }

        if !self.options.is_empty() {
            let rows: Vec<(String, &str)> = self
                .options
                .iter()
                .map(|o| (o.to_string(), o.overview.as_str()))
                .collect();
            out.push_str("\nOPTIONS:\n");
            self.push_rows(&mut out, &rows);
        }

        out
    }

    fn push_rows(&self, out: &mut String, rows: &[(String, &str)]) {
        let longest = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
        let width = self.help_padding.max(longest + 2);
        for (left, help) in rows {
            let line = format!("   {left:width$}{}", help.trim());
            out.push_str(line.trim_end());
            out.push('\n');
        }
    }
}
