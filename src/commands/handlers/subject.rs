//! Subject commands: s, sa, ss, sd, sv.

use super::{arg, id_list, parse_id, rest, HandlerError};
use crate::commands::registry::{HandlerResult, Registry};
use crate::commands::result::{ResultLine, ResultValue};
use crate::commands::sequence::parse_ids;
use crate::persistence::{information, subjects, Subject};
use crate::session::Session;
use futures::future::BoxFuture;
use sqlx::SqlitePool;
use tracing::info;

pub fn register(registry: &mut Registry) {
    registry.register("s", "", "list subjects", "subjects", list);
    registry.register("sa", "<codename> [note]", "add a subject", "subjects", add);
    registry.register("ss", "<id>", "select a subject", "subjects", select);
    registry.register("sd", "<ids>", "delete subjects", "subjects", delete);
    registry.register(
        "sv",
        "[ids]",
        "view subjects with their information",
        "subjects",
        view,
    );
}

/// Fetches a subject and checks it belongs to `ring_id`.
async fn subject_in_ring(
    pool: &SqlitePool,
    id: i64,
    ring_id: i64,
) -> Result<Option<Subject>, HandlerError> {
    Ok(subjects::get_subject(pool, id)
        .await?
        .filter(|s| s.ring_id == ring_id))
}

fn list(session: &mut Session, _args: Vec<String>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let ring_id = session.require_ring()?.id;
        let formatter = session.formatter();
        let selected = session.subject().map(|s| s.id);
        let subjects = subjects::list_subjects(session.pool()?, ring_id).await?;
        Ok(ResultValue::flat(
            subjects
                .iter()
                .map(|s| formatter.subject(s, Some(s.id) == selected)),
        ))
    })
}

fn add(session: &mut Session, args: Vec<String>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let ring_id = session.require_ring()?.id;
        let codename = arg(&args, 0, "sa <codename> [note]")?;
        let note = rest(&args, 1);
        let id = subjects::create_subject(session.pool()?, ring_id, codename, &note).await?;
        info!("Created subject {id} ({codename}) in ring {ring_id}");
        Ok(ResultValue::message(format!(
            "Created subject #{id} {codename}"
        )))
    })
}

fn select(session: &mut Session, args: Vec<String>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let ring_id = session.require_ring()?.id;
        let id = parse_id(arg(&args, 0, "ss <id>")?, "subject")?;
        let subject = subject_in_ring(session.pool()?, id, ring_id)
            .await?
            .ok_or_else(|| HandlerError::no_data(format!("no subject with id {id} in this ring")))?;
        let message = format!("Selected subject #{} {}", subject.id, subject.codename);
        session.select_subject(Some(subject));
        Ok(ResultValue::message(message))
    })
}

fn delete(session: &mut Session, args: Vec<String>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let ring_id = session.require_ring()?.id;
        let ids = id_list(&args, 0, "sd <ids>")?;
        let mut lines = Vec::with_capacity(ids.len());
        for id in ids {
            let pool = session.pool()?;
            if subject_in_ring(pool, id, ring_id).await?.is_none() {
                lines.push(ResultLine::new(format!("No subject with id {id}")));
                continue;
            }
            subjects::delete_subject(pool, id).await?;
            info!("Deleted subject {id}");
            if session.subject().is_some_and(|s| s.id == id) {
                session.select_subject(None);
            }
            lines.push(ResultLine::new(format!("Deleted subject #{id}")));
        }
        Ok(ResultValue::Flat(lines))
    })
}

/// One group per subject: the subject line as a passthrough header, then
/// its information entries.
fn view(session: &mut Session, args: Vec<String>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let ring_id = session.require_ring()?.id;
        let formatter = session.formatter();
        let pool = session.pool()?;

        let chosen = match args.first() {
            Some(text) => {
                let mut chosen = Vec::new();
                for id in parse_ids(text) {
                    if let Some(subject) = subject_in_ring(pool, id, ring_id).await? {
                        chosen.push(subject);
                    }
                }
                chosen
            }
            None => subjects::list_subjects(pool, ring_id).await?,
        };
        if chosen.is_empty() {
            return Err(HandlerError::no_data("no matching subjects"));
        }

        let mut groups = Vec::with_capacity(chosen.len());
        for subject in &chosen {
            let mut group = vec![ResultLine::passthrough(formatter.subject(subject, false))];
            for entry in information::list_information(pool, subject.id).await? {
                group.push(ResultLine::new(format!("  {}", formatter.information(&entry))));
            }
            groups.push(group);
        }
        Ok(ResultValue::Grouped(groups))
    })
}
