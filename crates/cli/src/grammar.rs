use anyhow::{Context, Result, bail};
use cougar_args::{Command, Flag, OptionDescriptor, Parameter};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_GRAMMAR_NAME: &str = "cougar.json";
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GrammarFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<u32>,

    pub command: CommandSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CommandSpec {
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub overview: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionSpec>,

    /// Positional parameters, in order. Mutually exclusive with `subcommands`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcommands: Vec<CommandSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OptionSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long: Option<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub overview: String,

    /// When set, the option must be given as `--name=VALUE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ParameterSpec {
    pub name: String,

    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone)]
pub struct LoadedGrammar {
    pub path: PathBuf,
    pub grammar: GrammarFile,
}

impl GrammarFile {
    /// Build the command tree. Grammar rules themselves are checked by the
    /// library, at evaluation time or through `validate_tree`.
    pub fn to_command(&self) -> Result<Command> {
        if let Some(version) = self.schema_version
            && version != SCHEMA_VERSION
        {
            bail!("unsupported grammar schema-version {version} (expected {SCHEMA_VERSION})");
        }
        self.command.to_command()
    }
}

impl CommandSpec {
    pub fn to_command(&self) -> Result<Command> {
        let mut builder = Command::builder(&self.name).overview(&self.overview);
        for option in &self.options {
            let descriptor = option
                .to_descriptor()
                .with_context(|| format!("invalid option in command '{}'", self.name))?;
            builder = builder.option(descriptor);
        }
        for parameter in &self.parameters {
            builder = builder.parameter(parameter.to_parameter());
        }
        for subcommand in &self.subcommands {
            builder = builder.subcommand(subcommand.to_command()?);
        }
        builder
            .build()
            .with_context(|| format!("failed to build command '{}'", self.name))
    }
}

impl OptionSpec {
    pub fn to_descriptor(&self) -> Result<OptionDescriptor> {
        let flag = match (&self.short, &self.long) {
            (Some(short), Some(long)) => Flag::both(short, long),
            (Some(short), None) => Flag::short(short),
            (None, Some(long)) => Flag::long(long),
            (None, None) => bail!("option needs a `short` or `long` name"),
        };
        Ok(match &self.value_name {
            Some(value_name) => OptionDescriptor::with_value(flag, &self.overview, value_name),
            None => OptionDescriptor::new(flag, &self.overview),
        })
    }
}

impl ParameterSpec {
    pub fn to_parameter(&self) -> Parameter {
        if self.required {
            Parameter::required(&self.name)
        } else {
            Parameter::optional(&self.name)
        }
    }
}

pub fn load_grammar(grammar_path: Option<&Path>) -> Result<LoadedGrammar> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    let path = match grammar_path {
        Some(p) => resolve_against(&cwd, p),
        None => cwd.join(DEFAULT_GRAMMAR_NAME),
    };

    if !path.exists() {
        bail!("grammar not found: {}", path.display());
    }

    let contents = fs::read_to_string(&path)
        .with_context(|| format!("failed to read grammar: {}", path.display()))?;
    let grammar: GrammarFile = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse grammar JSON: {}", path.display()))?;

    tracing::debug!(path = %path.display(), root = %grammar.command.name, "loaded grammar");
    Ok(LoadedGrammar { path, grammar })
}

pub fn write_default_grammar(project_dir: &Path) -> Result<PathBuf> {
    let dest = project_dir.join(DEFAULT_GRAMMAR_NAME);
    if dest.exists() {
        bail!("{DEFAULT_GRAMMAR_NAME} already exists in {}", project_dir.display());
    }

    let bytes =
        serde_json::to_vec_pretty(&default_grammar()).context("failed to serialize grammar")?;
    let mut out = String::from_utf8(bytes).context("grammar is not valid UTF-8")?;
    out.push('\n');

    let tmp = dest.with_extension("tmp");
    fs::write(&tmp, out.as_bytes())
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, &dest)
        .with_context(|| format!("failed to move {} into place", dest.display()))?;
    Ok(dest)
}

/// `swift package [-v] [--enable-prefetching] {edit <pkg> [--revision=R], update [--repin]}`
pub fn default_grammar() -> GrammarFile {
    let option = |short: Option<&str>, long: &str, overview: &str, value_name: Option<&str>| {
        OptionSpec {
            short: short.map(str::to_string),
            long: Some(long.to_string()),
            overview: overview.to_string(),
            value_name: value_name.map(str::to_string),
        }
    };

    GrammarFile {
        schema_version: Some(SCHEMA_VERSION),
        command: CommandSpec {
            name: "swift".to_string(),
            overview: "Swift Program".to_string(),
            subcommands: vec![CommandSpec {
                name: "package".to_string(),
                overview: "Perform operations on Swift packages".to_string(),
                options: vec![
                    option(Some("v"), "verbose", "Increase verbosity of informational output", None),
                    option(None, "enable-prefetching", "Enable prefetching in resolver", None),
                ],
                subcommands: vec![
                    CommandSpec {
                        name: "edit".to_string(),
                        overview: "Put a package in editable mode".to_string(),
                        options: vec![option(None, "revision", "The revision to edit", Some("R"))],
                        parameters: vec![ParameterSpec {
                            name: "pkg".to_string(),
                            required: true,
                        }],
                        ..Default::default()
                    },
                    CommandSpec {
                        name: "update".to_string(),
                        overview: "Update package dependencies".to_string(),
                        options: vec![option(
                            None,
                            "repin",
                            "Update without applying pins and repin the updated versions.",
                            None,
                        )],
                        ..Default::default()
                    },
                ],
                ..Default::default()
            }],
            ..Default::default()
        },
    }
}

fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn make_temp_dir(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock is before UNIX_EPOCH")
            .as_nanos();
        let pid = std::process::id();
        let dir = std::env::temp_dir().join(format!("cougar-{prefix}-{pid}-{nanos}"));
        fs::create_dir_all(&dir).expect("failed to create temp dir");
        dir
    }

    #[test]
    fn parses_kebab_case_grammar() {
        let json = r#"{
            "schema-version": 1,
            "command": {
                "name": "tool",
                "options": [{ "short": "q", "overview": "Quiet" }],
                "subcommands": [{
                    "name": "copy",
                    "options": [{ "long": "mode", "value-name": "MODE" }],
                    "parameters": [{ "name": "from", "required": true }, { "name": "to" }]
                }]
            }
        }"#;
        let grammar: GrammarFile = serde_json::from_str(json).unwrap();
        let tool = grammar.to_command().unwrap();

        let copy = tool.find("copy").unwrap();
        assert!(copy.option("mode").unwrap().requires_value());
        assert_eq!(copy.min_parameter_count(), 1);
        assert_eq!(copy.max_parameter_count(), 2);
        // The help option is added to every command.
        assert!(tool.option("help").is_some());
        assert!(tool.option("q").is_some());
    }

    #[test]
    fn option_without_names_is_rejected() {
        let json = r#"{ "command": { "name": "tool", "options": [{ "overview": "nameless" }] } }"#;
        let grammar: GrammarFile = serde_json::from_str(json).unwrap();
        let err = grammar.to_command().unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("invalid option in command 'tool'"), "{msg}");
        assert!(msg.contains("`short` or `long`"), "{msg}");
    }

    #[test]
    fn parameters_and_subcommands_are_rejected() {
        let json = r#"{ "command": {
            "name": "tool",
            "parameters": [{ "name": "x" }],
            "subcommands": [{ "name": "sub" }]
        } }"#;
        let grammar: GrammarFile = serde_json::from_str(json).unwrap();
        assert!(grammar.to_command().is_err());
    }

    #[test]
    fn unknown_schema_version_is_rejected() {
        let json = r#"{ "schema-version": 7, "command": { "name": "tool" } }"#;
        let grammar: GrammarFile = serde_json::from_str(json).unwrap();
        let err = grammar.to_command().unwrap_err();
        assert!(err.to_string().contains("schema-version 7"));
    }

    #[test]
    fn default_grammar_round_trips_through_disk() {
        let dir = make_temp_dir("grammar-default");
        let path = write_default_grammar(&dir).unwrap();
        assert_eq!(path, dir.join(DEFAULT_GRAMMAR_NAME));
        assert!(!dir.join("cougar.tmp").exists());

        let loaded = load_grammar(Some(&path)).unwrap();
        let swift = loaded.grammar.to_command().unwrap();
        swift.validate_tree().unwrap();
        assert!(swift.find("package edit").unwrap().option("revision").is_some());

        let err = write_default_grammar(&dir).unwrap_err();
        assert!(err.to_string().contains("already exists"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_grammar_is_an_error() {
        let dir = make_temp_dir("grammar-missing");
        let err = load_grammar(Some(&dir.join("nope.json"))).unwrap_err();
        assert!(err.to_string().contains("grammar not found"));
        let _ = fs::remove_dir_all(&dir);
    }
}
