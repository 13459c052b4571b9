use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::evaluation::Evaluation;
use crate::flag::FlagLookup;
use crate::option::OptionDescriptor;
use crate::parameter::Parameter;

/// Invoked by [`Evaluation::perform_callbacks`] with the evaluation of the
/// command it is attached to.
pub type Callback = Arc<dyn Fn(&Evaluation<'_>) -> anyhow::Result<()> + Send + Sync>;

const DEFAULT_HELP_PADDING: usize = 30;

/// One node of the grammar: a command, the options it accepts and either the
/// positional parameters or the sub-commands that may follow it.
///
/// Fields are public so a tree can be edited between evaluations; any edit is
/// picked up by the next evaluation since nothing derived is cached.
#[derive(Clone)]
pub struct Command {
    pub name: String,
    pub overview: String,
    pub options: Vec<OptionDescriptor>,
    pub parameters: Vec<Parameter>,
    pub subcommands: Vec<Command>,
    pub callback: Option<Callback>,
    /// Column width used for names in the help text.
    pub help_padding: usize,
}

impl Command {
    /// A leaf command taking positional parameters.
    pub fn with_parameters(
        name: impl Into<String>,
        overview: impl Into<String>,
        options: Vec<OptionDescriptor>,
        parameters: Vec<Parameter>,
    ) -> Self {
        Self::raw(name.into(), overview.into(), options, parameters, Vec::new())
    }

    /// A command dispatching to sub-commands.
    pub fn with_subcommands(
        name: impl Into<String>,
        overview: impl Into<String>,
        options: Vec<OptionDescriptor>,
        subcommands: Vec<Command>,
    ) -> Self {
        Self::raw(name.into(), overview.into(), options, Vec::new(), subcommands)
    }

    pub fn builder(name: impl Into<String>) -> CommandBuilder {
        CommandBuilder::new(name)
    }

    fn raw(
        name: String,
        overview: String,
        mut options: Vec<OptionDescriptor>,
        parameters: Vec<Parameter>,
        subcommands: Vec<Command>,
    ) -> Self {
        options.push(OptionDescriptor::help());
        Self {
            name,
            overview,
            options,
            parameters,
            subcommands,
            callback: None,
            help_padding: DEFAULT_HELP_PADDING,
        }
    }

    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Evaluation<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.set_callback(callback);
        self
    }

    pub fn set_callback<F>(&mut self, callback: F)
    where
        F: Fn(&Evaluation<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback));
    }

    pub fn min_parameter_count(&self) -> usize {
        self.parameters.iter().filter(|p| p.is_required()).count()
    }

    pub fn max_parameter_count(&self) -> usize {
        self.parameters.len()
    }

    /// Look up an option by its short or long name.
    pub fn option(&self, name: &str) -> Option<&OptionDescriptor> {
        self.options.find_flag(name)
    }

    pub fn option_mut(&mut self, name: &str) -> Option<&mut OptionDescriptor> {
        self.options.find_flag_mut(name)
    }

    /// Direct child by name.
    pub fn subcommand(&self, name: &str) -> Option<&Command> {
        self.subcommands.iter().find(|c| c.name == name)
    }

    /// Resolve a space-separated path of sub-command names, e.g. `"package update"`.
    ///
    /// The path does not include this command's own name.
    pub fn find(&self, path: &str) -> Option<&Command> {
        let (head, rest) = split_path(path);
        let child = self.subcommand(head)?;
        match rest {
            Some(rest) => child.find(rest),
            None => Some(child),
        }
    }

    pub fn find_mut(&mut self, path: &str) -> Option<&mut Command> {
        let (head, rest) = split_path(path);
        let child = self.subcommands.iter_mut().find(|c| c.name == head)?;
        match rest {
            Some(rest) => child.find_mut(rest),
            None => Some(child),
        }
    }

    /// Replace the child called `name` with `command` and return the old child.
    ///
    /// If there is no such child, `command` is appended and `None` is returned.
    pub fn replace_child(&mut self, name: &str, command: Command) -> Option<Command> {
        match self.subcommands.iter_mut().find(|c| c.name == name) {
            Some(slot) => Some(std::mem::replace(slot, command)),
            None => {
                self.subcommands.push(command);
                None
            }
        }
    }

    pub fn remove_child(&mut self, name: &str) -> Option<Command> {
        let idx = self.subcommands.iter().position(|c| c.name == name)?;
        Some(self.subcommands.remove(idx))
    }

    pub fn push_child(&mut self, command: Command) {
        self.subcommands.push(command);
    }

    /// Check this command's own grammar (not its descendants').
    ///
    /// Fails when:
    /// - the name is empty or contains whitespace (paths are space-separated)
    /// - both parameters and sub-commands are declared
    /// - two sub-commands share a name
    /// - an option name is empty or contains `=`
    /// - two options share a short name, or two options share a long name
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() || self.name.contains(char::is_whitespace) {
            return Err(Error::grammar(
                &self.name,
                "command names must be non-empty and contain no whitespace",
            ));
        }

        if !self.parameters.is_empty() && !self.subcommands.is_empty() {
            return Err(Error::grammar(
                &self.name,
                "a command can not have both subcommands and parameters",
            ));
        }

        let mut names = HashSet::new();
        for sub in &self.subcommands {
            if !names.insert(sub.name.as_str()) {
                return Err(Error::grammar(
                    &self.name,
                    format!("duplicate subcommand '{}'", sub.name),
                ));
            }
        }

        let mut shorts = HashSet::new();
        let mut longs = HashSet::new();
        for option in &self.options {
            if let Some(bad) = option.flag.malformed_name() {
                return Err(Error::grammar(
                    &self.name,
                    format!("invalid option name {bad:?}"),
                ));
            }
            let dup_short = option.flag.short_name().is_some_and(|s| !shorts.insert(s));
            let dup_long = option.flag.long_name().is_some_and(|l| !longs.insert(l));
            if dup_short || dup_long {
                return Err(Error::grammar(
                    &self.name,
                    format!("duplicate option flag {}", option.flag),
                ));
            }
        }

        Ok(())
    }

    /// Check this command and every descendant.
    pub fn validate_tree(&self) -> Result<()> {
        self.validate()?;
        self.subcommands.iter().try_for_each(Command::validate_tree)
    }

    /// Evaluate a full argv (including the program name at index 0).
    pub fn evaluate<S: AsRef<str>>(&self, argv: &[S]) -> Result<Evaluation<'_>> {
        crate::evaluate::evaluate(self, argv)
    }
}

fn split_path(path: &str) -> (&str, Option<&str>) {
    match path.split_once(' ') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("overview", &self.overview)
            .field("options", &self.options)
            .field("parameters", &self.parameters)
            .field("subcommands", &self.subcommands)
            .field("callback", &self.callback.as_ref().map(|_| "<callback>"))
            .field("help_padding", &self.help_padding)
            .finish()
    }
}

/// Incremental construction of a [`Command`].
///
/// Parameters and sub-commands may both be added; [`CommandBuilder::build`]
/// rejects the result if they were.
#[derive(Default)]
pub struct CommandBuilder {
    name: String,
    overview: String,
    options: Vec<OptionDescriptor>,
    parameters: Vec<Parameter>,
    subcommands: Vec<Command>,
    callback: Option<Callback>,
}

impl CommandBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn overview(mut self, overview: impl Into<String>) -> Self {
        self.overview = overview.into();
        self
    }

    pub fn option(mut self, option: OptionDescriptor) -> Self {
        self.options.push(option);
        self
    }

    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn subcommand(mut self, command: Command) -> Self {
        self.subcommands.push(command);
        self
    }

    pub fn callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Evaluation<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback));
        self
    }

    pub fn build(self) -> Result<Command> {
        if !self.parameters.is_empty() && !self.subcommands.is_empty() {
            return Err(Error::grammar(
                &self.name,
                "a command can not have both subcommands and parameters",
            ));
        }
        let mut command = Command::raw(
            self.name,
            self.overview,
            self.options,
            self.parameters,
            self.subcommands,
        );
        command.callback = self.callback;
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::Command;
    use crate::error::Error;
    use crate::flag::Flag;
    use crate::option::OptionDescriptor;
    use crate::parameter::Parameter;

    fn swift() -> Command {
        Command::with_subcommands(
            "swift",
            "Swift Program",
            vec![],
            vec![Command::with_subcommands(
                "package",
                "Perform operations on Swift packages",
                vec![OptionDescriptor::new(Flag::both("v", "verbose"), "Increase verbosity")],
                vec![
                    Command::with_parameters(
                        "edit",
                        "Put a package in editable mode",
                        vec![OptionDescriptor::with_value(Flag::long("revision"), "The revision to edit", "R")],
                        vec![Parameter::required("pkg")],
                    ),
                    Command::with_parameters(
                        "update",
                        "Update package dependencies",
                        vec![OptionDescriptor::new(Flag::long("repin"), "Repin the updated versions")],
                        vec![],
                    ),
                ],
            )],
        )
    }

    #[test]
    fn help_option_is_appended() {
        let cmd = Command::with_parameters("edit", "", vec![], vec![]);
        assert_eq!(cmd.options.len(), 1);
        assert!(cmd.option("help").is_some());
        assert!(cmd.option("h").is_some());
    }

    #[test]
    fn find_resolves_nested_paths() {
        let swift = swift();
        assert!(swift.find("package").unwrap().option("v").is_some());
        assert!(swift.find("package update").unwrap().option("repin").is_some());
        assert_eq!(swift.find("package edit").unwrap().max_parameter_count(), 1);
        assert_eq!(swift.find("package edit").unwrap().min_parameter_count(), 1);
        assert!(swift.find("package build").is_none());
        assert!(swift.find("update").is_none());
        assert!(swift.find("").is_none());
        assert!(swift.find("package  update").is_none());
    }

    #[test]
    fn find_mut_edits_in_place() {
        let mut swift = swift();
        swift
            .find_mut("package update")
            .unwrap()
            .parameters
            .push(Parameter::optional("dep"));
        assert_eq!(swift.find("package update").unwrap().max_parameter_count(), 1);
        assert_eq!(swift.find("package update").unwrap().min_parameter_count(), 0);
    }

    #[test]
    fn replace_and_remove_children() {
        let mut swift = swift();
        let package = swift.find_mut("package").unwrap();

        let replacement = Command::with_parameters("update", "Replaced", vec![], vec![]);
        let old = package.replace_child("update", replacement).unwrap();
        assert_eq!(old.overview, "Update package dependencies");
        assert_eq!(package.subcommand("update").unwrap().overview, "Replaced");

        let added = Command::with_parameters("resolve", "Resolve", vec![], vec![]);
        assert!(package.replace_child("resolve", added).is_none());
        assert!(package.subcommand("resolve").is_some());

        assert!(package.remove_child("edit").is_some());
        assert!(package.remove_child("edit").is_none());
        assert!(swift.find("package edit").is_none());
    }

    #[test]
    fn validate_accepts_well_formed_tree() {
        swift().validate_tree().unwrap();
    }

    #[test]
    fn validate_rejects_duplicate_subcommands() {
        let cmd = Command::with_subcommands(
            "root",
            "",
            vec![],
            vec![
                Command::with_parameters("a", "", vec![], vec![]),
                Command::with_parameters("a", "", vec![], vec![]),
            ],
        );
        let err = cmd.validate().unwrap_err();
        match err {
            Error::Grammar { command, reason } => {
                assert_eq!(command, "root");
                assert!(reason.contains("duplicate subcommand"));
            }
            other => panic!("expected Grammar, got: {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_parameters_and_subcommands() {
        let mut cmd = swift();
        cmd.parameters.push(Parameter::required("x"));
        assert!(cmd.validate().unwrap_err().is_grammar());
    }

    #[test]
    fn validate_rejects_either_duplicate_flag_name() {
        // Only the short name collides.
        let cmd = Command::with_parameters(
            "cmd",
            "",
            vec![
                OptionDescriptor::new(Flag::both("v", "verbose"), ""),
                OptionDescriptor::new(Flag::both("v", "version"), ""),
            ],
            vec![],
        );
        assert!(cmd.validate().unwrap_err().is_grammar());

        // Only the long name collides.
        let cmd = Command::with_parameters(
            "cmd",
            "",
            vec![
                OptionDescriptor::new(Flag::short("q"), ""),
                OptionDescriptor::new(Flag::long("help"), ""),
            ],
            vec![],
        );
        assert!(cmd.validate().unwrap_err().is_grammar());
    }

    #[test]
    fn validate_rejects_bad_names() {
        let cmd = Command::with_parameters(
            "cmd",
            "",
            vec![OptionDescriptor::new(Flag::long("a=b"), "")],
            vec![],
        );
        assert!(cmd.validate().unwrap_err().is_grammar());

        let cmd = Command::with_parameters("two words", "", vec![], vec![]);
        assert!(cmd.validate().unwrap_err().is_grammar());
    }

    #[test]
    fn validate_tree_reaches_descendants() {
        let mut swift = swift();
        swift
            .find_mut("package edit")
            .unwrap()
            .options
            .push(OptionDescriptor::new(Flag::long("revision"), ""));
        swift.validate().unwrap();
        assert!(swift.validate_tree().unwrap_err().is_grammar());
    }

    #[test]
    fn builder_rejects_parameters_with_subcommands() {
        let err = Command::builder("bad")
            .parameter(Parameter::required("x"))
            .subcommand(Command::with_parameters("sub", "", vec![], vec![]))
            .build()
            .unwrap_err();
        assert!(err.is_grammar());

        let ok = Command::builder("good")
            .overview("Fine")
            .option(OptionDescriptor::new(Flag::short("q"), "Quiet"))
            .parameter(Parameter::optional("x"))
            .callback(|_| Ok(()))
            .build()
            .unwrap();
        assert_eq!(ok.options.len(), 2);
        assert!(ok.callback.is_some());
    }
}
