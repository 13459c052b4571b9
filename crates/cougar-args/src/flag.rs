use std::fmt;

/// The name(s) an option answers to, without leading dashes.
///
/// Flags compare by name, not structurally: `-v` and `-v, --verbose` are the
/// same option. Because that relation is not a strict equivalence, `Flag` does
/// not implement `PartialEq`; use [`Flag::matches`] instead.
#[derive(Debug, Clone)]
pub enum Flag {
    ShortOnly(String),
    LongOnly(String),
    Both { short: String, long: String },
}

impl Flag {
    pub fn short(name: impl Into<String>) -> Self {
        Self::ShortOnly(name.into())
    }

    pub fn long(name: impl Into<String>) -> Self {
        Self::LongOnly(name.into())
    }

    pub fn both(short: impl Into<String>, long: impl Into<String>) -> Self {
        Self::Both {
            short: short.into(),
            long: long.into(),
        }
    }

    /// The built-in `-h, --help` flag attached to every command.
    pub fn help() -> Self {
        Self::both("h", "help")
    }

    pub fn short_name(&self) -> Option<&str> {
        match self {
            Self::ShortOnly(s) | Self::Both { short: s, .. } => Some(s),
            Self::LongOnly(_) => None,
        }
    }

    pub fn long_name(&self) -> Option<&str> {
        match self {
            Self::LongOnly(l) | Self::Both { long: l, .. } => Some(l),
            Self::ShortOnly(_) => None,
        }
    }

    /// Two flags match when both have a short name and those are equal, or
    /// both have a long name and those are equal.
    pub fn matches(&self, other: &Flag) -> bool {
        let same = |a: Option<&str>, b: Option<&str>| matches!((a, b), (Some(a), Some(b)) if a == b);
        same(self.short_name(), other.short_name()) || same(self.long_name(), other.long_name())
    }

    /// Whether either name of this flag is exactly `name`.
    pub fn matches_name(&self, name: &str) -> bool {
        self.short_name() == Some(name) || self.long_name() == Some(name)
    }

    pub fn is_help(&self) -> bool {
        self.matches(&Flag::help())
    }

    /// Names must be non-empty and must not contain `=`.
    pub(crate) fn malformed_name(&self) -> Option<&str> {
        [self.short_name(), self.long_name()]
            .into_iter()
            .flatten()
            .find(|name| name.is_empty() || name.contains('='))
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShortOnly(s) => write!(f, "-{s}"),
            Self::LongOnly(l) => write!(f, "--{l}"),
            Self::Both { short, long } => write!(f, "-{short}, --{long}"),
        }
    }
}

/// Something addressable by its [`Flag`].
pub trait FlagIndexed {
    fn flag(&self) -> &Flag;
}

/// Name-based lookups over a list of flag-carrying items.
pub trait FlagLookup<T: FlagIndexed> {
    /// First item whose flag has `name` as its short or long name.
    fn find_flag(&self, name: &str) -> Option<&T>;

    fn find_flag_mut(&mut self, name: &str) -> Option<&mut T>;

    /// First item whose flag matches `flag`.
    fn find_matching(&self, flag: &Flag) -> Option<&T>;

    fn contains_flag(&self, flag: &Flag) -> bool {
        self.find_matching(flag).is_some()
    }

    /// Swap the item named `name` for `item`, returning the old one.
    fn replace_flag(&mut self, name: &str, item: T) -> Option<T>;
}

impl<T: FlagIndexed> FlagLookup<T> for Vec<T> {
    fn find_flag(&self, name: &str) -> Option<&T> {
        self.iter().find(|it| it.flag().matches_name(name))
    }

    fn find_flag_mut(&mut self, name: &str) -> Option<&mut T> {
        self.iter_mut().find(|it| it.flag().matches_name(name))
    }

    fn find_matching(&self, flag: &Flag) -> Option<&T> {
        self.iter().find(|it| it.flag().matches(flag))
    }

    fn replace_flag(&mut self, name: &str, item: T) -> Option<T> {
        let slot = self.find_flag_mut(name)?;
        Some(std::mem::replace(slot, item))
    }
}

#[cfg(test)]
mod tests {
    use super::Flag;

    #[test]
    fn matches_is_reflexive() {
        for flag in [Flag::short("v"), Flag::long("verbose"), Flag::both("v", "verbose")] {
            assert!(flag.matches(&flag), "{flag} should match itself");
        }
    }

    #[test]
    fn partial_overlap_matches_both_directions() {
        let both = Flag::both("v", "verbose");
        let short = Flag::short("v");
        let long = Flag::long("verbose");

        assert!(both.matches(&short));
        assert!(short.matches(&both));
        assert!(both.matches(&long));
        assert!(long.matches(&both));
    }

    #[test]
    fn missing_names_never_match() {
        // A short-only and a long-only flag share no name, even if the text is equal.
        assert!(!Flag::short("v").matches(&Flag::long("v")));
        assert!(!Flag::long("repin").matches(&Flag::long("revision")));
        assert!(!Flag::short("a").matches(&Flag::short("b")));
    }

    #[test]
    fn overlap_on_one_side_is_enough() {
        // Same short name, different long names.
        assert!(Flag::both("v", "verbose").matches(&Flag::both("v", "version")));
        // Not transitive: -v matches both of these, they do not match each other.
        assert!(!Flag::both("v", "verbose").matches(&Flag::both("V", "version")));
    }

    #[test]
    fn help_detection() {
        assert!(Flag::short("h").is_help());
        assert!(Flag::long("help").is_help());
        assert!(!Flag::long("h").is_help());
        assert!(!Flag::short("help").is_help());
    }

    #[test]
    fn display() {
        assert_eq!(Flag::short("v").to_string(), "-v");
        assert_eq!(Flag::long("repin").to_string(), "--repin");
        assert_eq!(Flag::both("v", "verbose").to_string(), "-v, --verbose");
    }

    #[test]
    fn malformed_names() {
        assert_eq!(Flag::short("").malformed_name(), Some(""));
        assert_eq!(Flag::both("v", "a=b").malformed_name(), Some("a=b"));
        assert_eq!(Flag::both("v", "verbose").malformed_name(), None);
    }
}
