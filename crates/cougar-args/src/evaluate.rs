use crate::command::Command;
use crate::error::Result;
use crate::evaluation::Evaluation;
use crate::option::OptionOccurrence;

/// Evaluate a full argv against `command`.
///
/// `argv[0]` is the program name and is skipped; see [`evaluate_tokens`].
pub fn evaluate<'a, S: AsRef<str>>(command: &'a Command, argv: &[S]) -> Result<Evaluation<'a>> {
    let tokens = argv.get(1..).unwrap_or_default();
    evaluate_tokens(command, tokens)
}

/// Match `tokens` against `command`, left to right, without backtracking.
///
/// - A token equal to a sub-command name hands every remaining token to that
///   sub-command. This wins over option or parameter classification.
/// - `-x`, `--name` and `--name=value` become option occurrences. `-h`/`--help`
///   stops evaluation right there.
/// - Anything else is a positional parameter.
///
/// The command's grammar is checked before any token is consumed, and the
/// resulting node is validated once its tokens are collected. Any error
/// aborts the whole evaluation.
pub fn evaluate_tokens<'a, S: AsRef<str>>(
    command: &'a Command,
    tokens: &[S],
) -> Result<Evaluation<'a>> {
    command.validate()?;

    let mut evaluation = Evaluation::new(command);
    for (idx, token) in tokens.iter().enumerate() {
        let token = token.as_ref();

        if let Some(sub) = command.subcommand(token) {
            tracing::trace!(command = %command.name, subcommand = %sub.name, "descending");
            let sub_evaluation = evaluate_tokens(sub, &tokens[idx + 1..])?;
            evaluation.sub_evaluation = Some(Box::new(sub_evaluation));
            evaluation.validate()?;
            return Ok(evaluation);
        }

        if let Some(occurrence) = OptionOccurrence::parse(token) {
            tracing::trace!(command = %command.name, option = %occurrence, "option");
            let help = occurrence.flag.is_help();
            evaluation.options.push(occurrence);
            if help {
                return Ok(evaluation);
            }
            continue;
        }

        tracing::trace!(command = %command.name, parameter = token, "parameter");
        evaluation.parameters.push(token.to_string());
    }

    evaluation.validate()?;
    Ok(evaluation)
}
