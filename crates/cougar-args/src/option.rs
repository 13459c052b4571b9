use std::fmt;

use crate::flag::{Flag, FlagIndexed};

/// An option a command accepts: its flag, help text, and the name of the value
/// it takes (if any).
#[derive(Debug, Clone)]
pub struct OptionDescriptor {
    pub flag: Flag,
    pub overview: String,
    /// `None` for switches like `-v`; `Some("R")` for `--revision=R`.
    pub value_name: Option<String>,
}

impl OptionDescriptor {
    pub fn new(flag: Flag, overview: impl Into<String>) -> Self {
        Self {
            flag,
            overview: overview.into(),
            value_name: None,
        }
    }

    /// An option that must be written as `--name=value`.
    pub fn with_value(flag: Flag, overview: impl Into<String>, value_name: impl Into<String>) -> Self {
        Self {
            flag,
            overview: overview.into(),
            value_name: Some(value_name.into()),
        }
    }

    /// The implicit `-h, --help` option every command carries.
    pub fn help() -> Self {
        Self::new(Flag::help(), "The help menu")
    }

    pub fn requires_value(&self) -> bool {
        self.value_name.is_some()
    }
}

impl FlagIndexed for OptionDescriptor {
    fn flag(&self) -> &Flag {
        &self.flag
    }
}

impl fmt::Display for OptionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value_name {
            Some(value) => write!(f, "{}={value}", self.flag),
            None => write!(f, "{}", self.flag),
        }
    }
}

/// One option token as found in argv.
#[derive(Debug, Clone)]
pub struct OptionOccurrence {
    pub flag: Flag,
    pub value: Option<String>,
}

impl OptionOccurrence {
    /// Classify a single argv token.
    ///
    /// `--name[=value]` yields a long flag, `-name[=value]` a short one. The
    /// name must be non-empty, and so must the value when `=` is present.
    /// Anything else (including `--` and `-`) is not an option.
    pub fn parse(token: &str) -> Option<Self> {
        let (rest, long) = if let Some(rest) = token.strip_prefix("--") {
            (rest, true)
        } else if let Some(rest) = token.strip_prefix('-') {
            (rest, false)
        } else {
            return None;
        };

        let (name, value) = match rest.split_once('=') {
            Some((_, "")) => return None,
            Some((name, value)) => (name, Some(value.to_string())),
            None => (rest, None),
        };
        if name.is_empty() {
            return None;
        }

        let flag = if long {
            Flag::long(name)
        } else {
            Flag::short(name)
        };
        Some(Self { flag, value })
    }
}

impl FlagIndexed for OptionOccurrence {
    fn flag(&self) -> &Flag {
        &self.flag
    }
}

impl fmt::Display for OptionOccurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={value}", self.flag),
            None => write!(f, "{}", self.flag),
        }
    }
}
