use std::fmt;

/// A positional parameter slot. Parameters are matched by position, never by name;
/// the name only shows up in usage text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parameter {
    Required(String),
    Optional(String),
}

impl Parameter {
    pub fn required(name: impl Into<String>) -> Self {
        Self::Required(name.into())
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self::Optional(name.into())
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Required(n) | Self::Optional(n) => n,
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, Self::Required(_))
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required(n) => write!(f, "<{n}>"),
            Self::Optional(n) => write!(f, "[{n}]"),
        }
    }
}
