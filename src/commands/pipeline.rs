//! The pipeline evaluator.
//!
//! One input line is tokenized, the base command is resolved (or answered
//! with inline help), the handler runs, and the result flows through the
//! stages left to right before being rendered:
//!
//! ```text
//! s ~WOLF            substring filter
//! a ~~^#[0-9]+ $L    regex filter, then page
//! sv?                help listing
//! ```
//!
//! The stage chain is parsed and validated before the handler runs, so a
//! malformed pipeline never executes its command.

use super::handlers::HandlerError;
use super::help::{self, HelpRequest};
use super::output::OutputSink;
use super::registry::Registry;
use super::result::{ResultLine, ResultValue};
use super::tokenizer::{tokenize, StageKind, Token};
use crate::external;
use crate::session::Session;
use regex::Regex;
use std::io;
use thiserror::Error;
use tracing::{debug, error, warn};

/// A malformed pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The same delimiter twice with no argument between them.
    #[error("Invalid command")]
    DuplicateStage(StageKind),

    /// A delimiter at the end of the line with no argument.
    #[error("Invalid command")]
    DanglingStage(StageKind),

    /// Text where no stage is pending.
    #[error("Invalid command (bad regex)")]
    OrphanArgument(String),

    /// A regex stage whose pattern does not compile.
    #[error("Invalid command (bad regex)")]
    BadRegex(#[source] regex::Error),

    /// A modifier other than `L`.
    #[error("Invalid command (unknown modifier '{0}')")]
    UnknownModifier(String),

    /// `name?` or `name??` followed by stages.
    #[error("Invalid command (help takes no pipeline stages)")]
    HelpWithStages,
}

/// Why an input line produced no output.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("Unknown command: {0}. Type 'help' or '?' for available commands.")]
    UnknownCommand(String),

    #[error("Error executing '{command}' ({}): {source}", .source.code())]
    Handler {
        command: String,
        source: HandlerError,
    },

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Pager failed: {0}")]
    Pager(#[source] io::Error),
}

impl EvalError {
    /// Returns true for failures whose full trace is shown in debug mode.
    fn has_trace(&self) -> bool {
        matches!(self, Self::Handler { .. } | Self::Pipeline(_))
    }
}

/// What to do with an evaluated line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// Print the lines.
    Display(ResultValue),
    /// Hand the lines to the pager; nothing is printed.
    Page(ResultValue),
}

/// One validated stage.
#[derive(Debug)]
enum Stage {
    Substring(String),
    Regex(Regex),
    Page,
}

/// A stage delimiter that has been seen but whose argument is incomplete.
struct Pending {
    kind: StageKind,
    argument: String,
}

/// Parses the tokens after the base command into stages.
///
/// Parsing stops at a page stage: nothing after it runs.
fn parse_stages(tokens: &[Token], modifier: char) -> Result<Vec<Stage>, PipelineError> {
    let mut stages = Vec::new();
    let mut pending: Option<Pending> = None;

    for token in tokens {
        match token {
            Token::Delimiter(kind) => match pending {
                Some(ref mut p) => {
                    if *kind == p.kind && p.argument.is_empty() {
                        return Err(PipelineError::DuplicateStage(*kind));
                    }
                    // A different delimiter is literal text of the pending argument.
                    p.argument.push_str(&kind.delimiter(modifier));
                }
                None => {
                    pending = Some(Pending {
                        kind: *kind,
                        argument: String::new(),
                    });
                }
            },
            Token::Text(text) => {
                let Some(Pending { kind, mut argument }) = pending.take() else {
                    return Err(PipelineError::OrphanArgument(text.clone()));
                };
                argument.push_str(text);
                let stage = build_stage(kind, argument)?;
                let is_page = matches!(stage, Stage::Page);
                stages.push(stage);
                if is_page {
                    return Ok(stages);
                }
            }
        }
    }

    match pending {
        Some(p) => Err(PipelineError::DanglingStage(p.kind)),
        None => Ok(stages),
    }
}

fn build_stage(kind: StageKind, argument: String) -> Result<Stage, PipelineError> {
    match kind {
        StageKind::Substring => Ok(Stage::Substring(argument)),
        StageKind::Regex => Regex::new(&argument)
            .map(Stage::Regex)
            .map_err(PipelineError::BadRegex),
        StageKind::Modifier if argument == "L" => Ok(Stage::Page),
        StageKind::Modifier => Err(PipelineError::UnknownModifier(argument)),
    }
}

/// Keeps the lines that pass `matches` or carry the ignore marker.
///
/// A group is kept (with its surviving lines) only when at least one
/// surviving, non-blank line genuinely matches; a passthrough header alone
/// does not keep its group.
pub fn filter_value(value: ResultValue, matches: impl Fn(&str) -> bool) -> ResultValue {
    let passes = |line: &ResultLine| line.is_passthrough() || matches(&line.plain());

    match value {
        ResultValue::Flat(lines) => ResultValue::Flat(lines.into_iter().filter(passes).collect()),
        ResultValue::Grouped(groups) => ResultValue::Grouped(
            groups
                .into_iter()
                .map(|group| group.into_iter().filter(passes).collect::<Vec<_>>())
                .filter(|group| {
                    group.iter().any(|line| {
                        let plain = line.plain();
                        !plain.trim().is_empty() && matches(&plain)
                    })
                })
                .collect(),
        ),
    }
}

fn apply_stage(value: ResultValue, stage: &Stage) -> ResultValue {
    match stage {
        Stage::Substring(pattern) => filter_value(value, |plain| plain.contains(pattern.as_str())),
        Stage::Regex(regex) => filter_value(value, |plain| regex.is_match(plain.trim())),
        Stage::Page => value,
    }
}

/// Evaluates input lines against a registry and a session.
pub struct Evaluator {
    registry: Registry,
    session: Session,
    output: OutputSink,
    modifier: char,
}

impl Evaluator {
    /// Creates an evaluator; fails if the configured modifier is unusable.
    pub fn new(
        registry: Registry,
        session: Session,
        output: OutputSink,
    ) -> crate::error::Result<Self> {
        let modifier = session.config().modifier_char()?;
        Ok(Self {
            registry,
            session,
            output,
            modifier,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Evaluates one line up to, but not including, rendering.
    ///
    /// The "no documentation" warning is the only output written here.
    pub async fn evaluate(&mut self, line: &str) -> Result<Evaluation, EvalError> {
        let tokens = tokenize(line, self.modifier);
        if tokens.is_empty() {
            return Ok(Evaluation::Display(ResultValue::empty()));
        }

        let (base, rest) = match tokens.split_first() {
            Some((Token::Text(base), rest)) => (base.as_str(), rest),
            _ => ("", tokens.as_slice()),
        };

        if let Some(request) = HelpRequest::parse(base) {
            if !rest.is_empty() {
                return Err(PipelineError::HelpWithStages.into());
            }
            return Ok(Evaluation::Display(help::render(&self.registry, request)));
        }

        let stages = parse_stages(rest, self.modifier)?;

        let (name, arg_text) = base.split_once(' ').unwrap_or((base, ""));
        let args: Vec<String> = arg_text.split_whitespace().map(String::from).collect();

        let command = self
            .registry
            .lookup(name)
            .ok_or_else(|| EvalError::UnknownCommand(name.to_string()))?;

        if command.summary.is_empty() {
            warn!("Command '{}' has no documentation", command.name);
            self.output
                .line(&format!("Warning: '{}' has no documentation", command.name));
        }

        debug!("Running '{name}' with {} argument(s)", args.len());
        let mut value = command
            .handler()
            .call(&mut self.session, args)
            .await
            .map_err(|source| EvalError::Handler {
                command: name.to_string(),
                source,
            })?;

        for stage in &stages {
            if matches!(stage, Stage::Page) {
                return Ok(Evaluation::Page(value));
            }
            value = apply_stage(value, stage);
        }

        Ok(Evaluation::Display(value))
    }

    /// Evaluates, renders and reports one line. Returns false on failure.
    pub async fn run_line(&mut self, line: &str) -> bool {
        let result = match self.evaluate(line).await {
            Ok(Evaluation::Display(value)) => {
                self.render(&value);
                Ok(())
            }
            Ok(Evaluation::Page(value)) => external::page(&value, &self.session.config().pager)
                .await
                .map_err(EvalError::Pager),
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                self.report(&e);
                false
            }
        }
    }

    /// Writes every line in order, marker stripped, colors intact.
    pub fn render(&self, value: &ResultValue) {
        for line in value.lines() {
            self.output.line(line.display());
        }
    }

    fn report(&self, e: &EvalError) {
        error!("{e}");
        self.output.line(&e.to_string());
        if self.session.debug() && e.has_trace() {
            for line in format!("{e:#?}").lines() {
                self.output.line(line);
            }
        }
    }
}
