//! Information commands: i, ia, iab, iac, ie, id.
//!
//! All of them work on the selected subject.

use super::{arg, id_list, parse_id, rest, HandlerError};
use crate::commands::registry::{HandlerResult, Registry};
use crate::commands::result::{ResultLine, ResultValue};
use crate::external;
use crate::persistence::{information, InfoKind, Information};
use crate::session::Session;
use futures::future::BoxFuture;
use sqlx::SqlitePool;
use tracing::info;

pub fn register(registry: &mut Registry) {
    registry.register("i", "", "list information", "information", list);
    registry.register("ia", "<name> <value>", "add text information", "information", add_text);
    registry.register(
        "iab",
        "<name> <path>",
        "add binary information from a file",
        "information",
        add_binary,
    );
    registry.register(
        "iac",
        "<name> <ids>",
        "add composite information",
        "information",
        add_composite,
    );
    registry.register("ie", "<id>", "edit text information", "information", edit);
    registry.register("id", "<ids>", "delete information", "information", delete);
}

/// Fetches an entry and checks it belongs to `subject_id`.
async fn entry_of_subject(
    pool: &SqlitePool,
    id: i64,
    subject_id: i64,
) -> Result<Option<Information>, HandlerError> {
    Ok(information::get_information(pool, id)
        .await?
        .filter(|entry| entry.subject_id == subject_id))
}

fn list(session: &mut Session, _args: Vec<String>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let subject_id = session.require_subject()?.id;
        let formatter = session.formatter();
        let entries = information::list_information(session.pool()?, subject_id).await?;
        Ok(ResultValue::flat(
            entries.iter().map(|entry| formatter.information(entry)),
        ))
    })
}

async fn create(
    session: &Session,
    kind: InfoKind,
    name: &str,
    value: &[u8],
) -> HandlerResult {
    let subject_id = session.require_subject()?.id;
    let id =
        information::create_information(session.pool()?, subject_id, kind, name, value, "").await?;
    info!("Created {} information {id} for subject {subject_id}", kind.as_str());
    Ok(ResultValue::message(format!(
        "Created information #{id} {name}"
    )))
}

fn add_text(session: &mut Session, args: Vec<String>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let usage = "ia <name> <value>";
        let name = arg(&args, 0, usage)?;
        arg(&args, 1, usage)?;
        let value = rest(&args, 1);
        create(session, InfoKind::Text, name, value.as_bytes()).await
    })
}

fn add_binary(session: &mut Session, args: Vec<String>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let usage = "iab <name> <path>";
        let name = arg(&args, 0, usage)?;
        let path = arg(&args, 1, usage)?;
        session.require_subject()?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| HandlerError::bad_request(format!("cannot read '{path}': {e}")))?;
        create(session, InfoKind::Binary, name, &bytes).await
    })
}

fn add_composite(session: &mut Session, args: Vec<String>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let usage = "iac <name> <ids>";
        let name = arg(&args, 0, usage)?;
        let ids = id_list(&args, 1, usage)?;
        let subject_id = session.require_subject()?.id;
        for id in &ids {
            if entry_of_subject(session.pool()?, *id, subject_id).await?.is_none() {
                return Err(HandlerError::no_data(format!(
                    "no information with id {id} for this subject"
                )));
            }
        }
        let value = ids
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        create(session, InfoKind::Composite, name, value.as_bytes()).await
    })
}

fn edit(session: &mut Session, args: Vec<String>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let id = parse_id(arg(&args, 0, "ie <id>")?, "information")?;
        let subject_id = session.require_subject()?.id;
        let entry = entry_of_subject(session.pool()?, id, subject_id)
            .await?
            .ok_or_else(|| HandlerError::no_data(format!("no information with id {id}")))?;
        if entry.kind != InfoKind::Text {
            return Err(HandlerError::bad_request(format!(
                "information #{id} is {}, only text can be edited",
                entry.kind.as_str()
            )));
        }

        let initial = String::from_utf8_lossy(&entry.value);
        let edited = external::edit_text(&initial, &session.config().editor).await?;
        let edited = edited.strip_suffix('\n').unwrap_or(&edited);
        if edited == initial {
            return Ok(ResultValue::message(format!("Information #{id} unchanged")));
        }

        information::update_information_value(session.pool()?, id, edited.as_bytes()).await?;
        info!("Edited information {id}");
        Ok(ResultValue::message(format!("Updated information #{id}")))
    })
}

fn delete(session: &mut Session, args: Vec<String>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let ids = id_list(&args, 0, "id <ids>")?;
        let subject_id = session.require_subject()?.id;
        let pool = session.pool()?;
        let mut lines = Vec::with_capacity(ids.len());
        for id in ids {
            if entry_of_subject(pool, id, subject_id).await?.is_some() {
                information::delete_information(pool, id).await?;
                lines.push(ResultLine::new(format!("Deleted information #{id}")));
            } else {
                lines.push(ResultLine::new(format!("No information with id {id}")));
            }
        }
        Ok(ResultValue::Flat(lines))
    })
}
