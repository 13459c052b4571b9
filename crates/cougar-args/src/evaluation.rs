use crate::command::Command;
use crate::error::{Error, Result};
use crate::flag::FlagLookup;
use crate::option::OptionOccurrence;

/// The result of matching argv against one [`Command`]: the options and
/// parameters found for it, and the evaluation of the sub-command that
/// followed it, if any.
#[derive(Debug, Clone)]
pub struct Evaluation<'a> {
    /// The command this evaluation was matched against.
    pub describer: &'a Command,
    pub options: Vec<OptionOccurrence>,
    pub parameters: Vec<String>,
    pub sub_evaluation: Option<Box<Evaluation<'a>>>,
}

impl<'a> Evaluation<'a> {
    pub fn new(describer: &'a Command) -> Self {
        Self {
            describer,
            options: Vec::new(),
            parameters: Vec::new(),
            sub_evaluation: None,
        }
    }

    pub fn name(&self) -> &'a str {
        &self.describer.name
    }

    pub fn sub_evaluation(&self) -> Option<&Evaluation<'a>> {
        self.sub_evaluation.as_deref()
    }

    /// Resolve a space-separated path of sub-command names below this node.
    pub fn find(&self, path: &str) -> Option<&Evaluation<'a>> {
        let (head, rest) = match path.split_once(' ') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        let sub = self.sub_evaluation().filter(|sub| sub.name() == head)?;
        match rest {
            Some(rest) => sub.find(rest),
            None => Some(sub),
        }
    }

    /// This node followed by every sub-evaluation down to the leaf.
    pub fn chain(&self) -> Vec<&Evaluation<'a>> {
        let mut out = vec![self];
        let mut current = self;
        while let Some(next) = current.sub_evaluation() {
            out.push(next);
            current = next;
        }
        out
    }

    /// The deepest evaluation on the path.
    pub fn leaf(&self) -> &Evaluation<'a> {
        let mut current = self;
        while let Some(next) = current.sub_evaluation() {
            current = next;
        }
        current
    }

    /// Occurrence of the option with the given short or long name.
    pub fn option(&self, name: &str) -> Option<&OptionOccurrence> {
        self.options.find_flag(name)
    }

    /// The value attached to the named option, if it occurred with one.
    pub fn option_value(&self, name: &str) -> Option<&str> {
        self.option(name).and_then(|o| o.value.as_deref())
    }

    /// Options of this node and of every sub-evaluation, root first.
    pub fn all_options(&self) -> Vec<&OptionOccurrence> {
        self.chain()
            .into_iter()
            .flat_map(|node| node.options.iter())
            .collect()
    }

    pub fn parameter(&self, index: usize) -> Result<&str> {
        self.parameters
            .get(index)
            .map(String::as_str)
            .ok_or(Error::ParameterAccess(index))
    }

    /// Whether `-h`/`--help` was given anywhere along the evaluated path.
    pub fn help_requested(&self) -> bool {
        self.all_options().iter().any(|o| o.flag.is_help())
    }

    /// Help text for the deepest command on the path that was given
    /// `-h`/`--help`, with usage built from its ancestors.
    pub fn help_request(&self) -> Option<String> {
        let chain = self.chain();
        let idx = chain
            .iter()
            .rposition(|node| node.options.iter().any(|o| o.flag.is_help()))?;
        let ancestors: Vec<&Command> = chain[..idx].iter().map(|node| node.describer).collect();
        Some(chain[idx].describer.help(&ancestors))
    }

    /// Check the options and parameters collected for this node against its describer.
    ///
    /// Occurrences are checked in order, each for an unknown flag, a missing
    /// value and an unexpected value; the parameter count is checked last.
    pub fn validate(&self) -> Result<()> {
        let describer = self.describer;
        for occurrence in &self.options {
            let Some(option) = describer.options.find_matching(&occurrence.flag) else {
                tracing::debug!(command = %describer.name, flag = %occurrence.flag, "unknown flag");
                return Err(Error::UnknownFlag(occurrence.flag.to_string()));
            };
            match (option.requires_value(), occurrence.value.is_some()) {
                (true, false) => return Err(Error::MissingValue(occurrence.flag.to_string())),
                (false, true) => return Err(Error::UnexpectedValue(occurrence.flag.to_string())),
                _ => {}
            }
        }

        let min = describer.min_parameter_count();
        let max = describer.max_parameter_count();
        let found = self.parameters.len();
        if found < min || found > max {
            return Err(Error::InvalidParameterCount {
                command: describer.name.clone(),
                min,
                max,
                found,
            });
        }
        Ok(())
    }

    /// Run the callback of each command on the path, root first.
    ///
    /// Nothing runs if help was requested anywhere on the path. The first
    /// failing callback stops the walk and its error is returned as is.
    pub fn perform_callbacks(&self) -> Result<()> {
        if self.help_requested() {
            tracing::debug!(command = %self.name(), "help requested, skipping callbacks");
            return Ok(());
        }
        for node in self.chain() {
            if let Some(callback) = &node.describer.callback {
                tracing::trace!(command = %node.name(), "running callback");
                callback(node)?;
            }
        }
        Ok(())
    }
}
