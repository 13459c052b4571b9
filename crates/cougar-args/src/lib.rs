//! Declarative command-tree argument parsing.
//!
//! Describe a tree of [`Command`]s once, then [`evaluate`] argv against it:
//!
//! ```
//! use cougar_args::{Command, Flag, OptionDescriptor, Parameter};
//!
//! let git = Command::with_subcommands(
//!     "git",
//!     "The stupid content tracker",
//!     vec![],
//!     vec![Command::with_parameters(
//!         "clone",
//!         "Clone a repository",
//!         vec![OptionDescriptor::with_value(Flag::long("depth"), "Shallow clone", "N")],
//!         vec![Parameter::required("url"), Parameter::optional("dir")],
//!     )],
//! );
//!
//! let eval = git.evaluate(&["git", "clone", "--depth=1", "https://example.com/r.git"])?;
//! let clone = eval.find("clone").unwrap();
//! assert_eq!(clone.option_value("depth"), Some("1"));
//! assert_eq!(clone.parameter(0)?, "https://example.com/r.git");
//! # Ok::<(), cougar_args::Error>(())
//! ```
//!
//! The library never prints or exits: help is reported through
//! [`Evaluation::help_request`], everything else through [`Error`].

mod command;
mod error;
mod evaluate;
mod evaluation;
mod flag;
mod help;
mod option;
mod parameter;

pub use command::{Callback, Command, CommandBuilder};
pub use error::{Error, Result};
pub use evaluate::{evaluate, evaluate_tokens};
pub use evaluation::Evaluation;
pub use flag::{Flag, FlagIndexed, FlagLookup};
pub use option::{OptionDescriptor, OptionOccurrence};
pub use parameter::Parameter;
