//! Ring commands: r, ra, rs, rn, rd.

use super::{arg, id_list, parse_id, rest, HandlerError};
use crate::commands::registry::{HandlerResult, Registry};
use crate::commands::result::{ResultLine, ResultValue};
use crate::persistence::rings;
use crate::session::Session;
use futures::future::BoxFuture;
use tracing::info;

pub fn register(registry: &mut Registry) {
    registry.register("r", "", "list rings", "rings", list);
    registry.register("ra", "<name> [note]", "add a ring", "rings", add);
    registry.register("rs", "<id>", "select a ring", "rings", select);
    registry.register("rn", "<id> <note>", "set a ring's note", "rings", set_note);
    registry.register("rd", "<ids>", "delete rings", "rings", delete);
}

fn list(session: &mut Session, _args: Vec<String>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let formatter = session.formatter();
        let selected = session.ring().map(|r| r.id);
        let rings = rings::list_rings(session.pool()?).await?;
        Ok(ResultValue::flat(
            rings
                .iter()
                .map(|ring| formatter.ring(ring, Some(ring.id) == selected)),
        ))
    })
}

fn add(session: &mut Session, args: Vec<String>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let name = arg(&args, 0, "ra <name> [note]")?;
        let note = rest(&args, 1);
        let id = rings::create_ring(session.pool()?, name, &note).await?;
        info!("Created ring {id} ({name})");
        Ok(ResultValue::message(format!("Created ring #{id} {name}")))
    })
}

fn select(session: &mut Session, args: Vec<String>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let id = parse_id(arg(&args, 0, "rs <id>")?, "ring")?;
        let ring = rings::get_ring(session.pool()?, id)
            .await?
            .ok_or_else(|| HandlerError::no_data(format!("no ring with id {id}")))?;
        let message = format!("Selected ring #{} {}", ring.id, ring.name);
        session.select_ring(Some(ring));
        Ok(ResultValue::message(message))
    })
}

fn set_note(session: &mut Session, args: Vec<String>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let usage = "rn <id> <note>";
        let id = parse_id(arg(&args, 0, usage)?, "ring")?;
        arg(&args, 1, usage)?;
        let note = rest(&args, 1);
        if !rings::set_ring_note(session.pool()?, id, &note).await? {
            return Err(HandlerError::no_data(format!("no ring with id {id}")));
        }
        if let Some(ring) = rings::get_ring(session.pool()?, id).await? {
            session.refresh_ring(ring);
        }
        Ok(ResultValue::message(format!("Updated ring #{id}")))
    })
}

fn delete(session: &mut Session, args: Vec<String>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let ids = id_list(&args, 0, "rd <ids>")?;
        let mut lines = Vec::with_capacity(ids.len());
        for id in ids {
            if rings::delete_ring(session.pool()?, id).await? {
                info!("Deleted ring {id}");
                if session.ring().is_some_and(|r| r.id == id) {
                    session.select_ring(None);
                }
                lines.push(ResultLine::new(format!("Deleted ring #{id}")));
            } else {
                lines.push(ResultLine::new(format!("No ring with id {id}")));
            }
        }
        Ok(ResultValue::Flat(lines))
    })
}
