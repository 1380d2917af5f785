//! System commands: help, debug, q.

use crate::commands::help;
use crate::commands::registry::{Handler, HandlerResult, Registry};
use crate::commands::result::ResultValue;
use crate::session::Session;
use async_trait::async_trait;
use futures::future::BoxFuture;

pub fn register(registry: &mut Registry) {
    registry.register("debug", "", "toggle failure traces", "system", toggle_debug);
    registry.register("q", "", "quit", "system", quit);
}

/// Installs `help`. Must run after every other command is registered, since
/// the listing is rendered once.
pub fn register_help(registry: &mut Registry) {
    let summary = "list every command";
    registry.register("help", "", summary, "system", HelpListing(ResultValue::empty()));
    let listing = help::render_all(registry);
    registry.register("help", "", summary, "system", HelpListing(listing));
}

/// Replies with a listing rendered at registration time.
struct HelpListing(ResultValue);

#[async_trait]
impl Handler for HelpListing {
    async fn call(&self, _session: &mut Session, _args: Vec<String>) -> HandlerResult {
        Ok(self.0.clone())
    }
}

fn toggle_debug(session: &mut Session, _args: Vec<String>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let debug = !session.debug();
        session.set_debug(debug);
        let state = if debug { "on" } else { "off" };
        Ok(ResultValue::message(format!("Debug mode {state}")))
    })
}

fn quit(session: &mut Session, _args: Vec<String>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        session.request_quit();
        Ok(ResultValue::empty())
    })
}
