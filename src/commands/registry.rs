//! Command registry and metadata.
//!
//! Maps command names to handlers plus the metadata used by help listings.
//! Feature modules populate it once at startup; re-registering a name replaces
//! the previous command, which is how aliases are installed.

use super::handlers::HandlerError;
use super::result::ResultValue;
use crate::session::Session;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound;
use std::sync::Arc;

/// What a handler call yields.
pub type HandlerResult = std::result::Result<ResultValue, HandlerError>;

/// The single capability every command implements.
///
/// Arguments arrive already split on whitespace; arity and type checks are the
/// handler's own business.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Runs the command against the session.
    async fn call(&self, session: &mut Session, args: Vec<String>) -> HandlerResult;
}

#[async_trait]
impl<F> Handler for F
where
    F: for<'a> Fn(&'a mut Session, Vec<String>) -> BoxFuture<'a, HandlerResult> + Send + Sync,
{
    async fn call(&self, session: &mut Session, args: Vec<String>) -> HandlerResult {
        (self)(session, args).await
    }
}

/// A registered command.
#[derive(Clone)]
pub struct Command {
    /// Name typed at the prompt.
    pub name: String,
    /// Argument placeholder shown in help, e.g. `<codename> [note]`.
    pub args: String,
    /// One-line summary; empty means undocumented.
    pub summary: String,
    /// Key into the long-form documentation table.
    pub doc_tag: String,
    handler: Arc<dyn Handler>,
}

impl Command {
    /// Returns the command's handler.
    pub fn handler(&self) -> &dyn Handler {
        self.handler.as_ref()
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("args", &self.args)
            .field("summary", &self.summary)
            .field("doc_tag", &self.doc_tag)
            .finish_non_exhaustive()
    }
}

/// Name-ordered table of commands.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    commands: BTreeMap<String, Command>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a command, replacing any command of the same name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        args: impl Into<String>,
        summary: impl Into<String>,
        doc_tag: impl Into<String>,
        handler: impl Handler + 'static,
    ) {
        let name = name.into();
        let command = Command {
            name: name.clone(),
            args: args.into(),
            summary: summary.into(),
            doc_tag: doc_tag.into(),
            handler: Arc::new(handler),
        };
        self.commands.insert(name, command);
    }

    /// Registers `alias` as another name for `target`.
    ///
    /// Returns false (and registers nothing) if `target` is unknown.
    pub fn alias(&mut self, alias: impl Into<String>, target: &str) -> bool {
        let Some(command) = self.commands.get(target) else {
            return false;
        };
        let alias = alias.into();
        let command = Command {
            name: alias.clone(),
            ..command.clone()
        };
        self.commands.insert(alias, command);
        true
    }

    /// Looks up a command by exact name.
    pub fn lookup(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    /// All commands, ordered by name.
    pub fn all(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Commands named `prefix` or `prefix` plus one character, ordered by name.
    pub fn children<'a>(&'a self, prefix: &'a str) -> Vec<&'a Command> {
        let limit = prefix.chars().count() + 1;
        self.with_prefix(prefix)
            .filter(|c| c.name.chars().count() <= limit)
            .collect()
    }

    /// Returns true if more than one registered name starts with `name`.
    pub fn has_descendants(&self, name: &str) -> bool {
        self.with_prefix(name).nth(1).is_some()
    }

    fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a Command> + 'a {
        self.commands
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(move |(name, _)| name.starts_with(prefix))
            .map(|(_, command)| command)
    }
}
