//! Location commands: l, la, ld.

use super::{arg, id_list, rest, HandlerError};
use crate::commands::registry::{HandlerResult, Registry};
use crate::commands::result::{ResultLine, ResultValue};
use crate::persistence::associations::entity_in_ring;
use crate::persistence::{locations, EntityKind};
use crate::session::Session;
use futures::future::BoxFuture;
use tracing::info;

const ADD_USAGE: &str = "la <lat> <lon> <name> [note]";

pub fn register(registry: &mut Registry) {
    registry.register("l", "", "list locations", "locations", list);
    registry.register("la", "<lat> <lon> <name> [note]", "add a location", "locations", add);
    registry.register("ld", "<ids>", "delete locations", "locations", delete);
}

/// Parses a coordinate and checks it lies within `-limit..=limit`.
fn coordinate(text: &str, what: &str, limit: f64) -> Result<f64, HandlerError> {
    let value: f64 = text
        .parse()
        .map_err(|_| HandlerError::bad_request(format!("invalid {what} '{text}'")))?;
    if !value.is_finite() || value.abs() > limit {
        return Err(HandlerError::bad_request(format!(
            "{what} must be between -{limit} and {limit}"
        )));
    }
    Ok(value)
}

fn list(session: &mut Session, _args: Vec<String>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let ring_id = session.require_ring()?.id;
        let formatter = session.formatter();
        let locations = locations::list_locations(session.pool()?, ring_id).await?;
        Ok(ResultValue::flat(
            locations.iter().map(|location| formatter.location(location)),
        ))
    })
}

fn add(session: &mut Session, args: Vec<String>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let ring_id = session.require_ring()?.id;
        let latitude = coordinate(arg(&args, 0, ADD_USAGE)?, "latitude", 90.0)?;
        let longitude = coordinate(arg(&args, 1, ADD_USAGE)?, "longitude", 180.0)?;
        let name = arg(&args, 2, ADD_USAGE)?;
        let note = rest(&args, 3);
        let id = locations::create_location(session.pool()?, ring_id, name, latitude, longitude, &note)
            .await?;
        info!("Created location {id} ({name}) in ring {ring_id}");
        Ok(ResultValue::message(format!("Created location #{id} {name}")))
    })
}

fn delete(session: &mut Session, args: Vec<String>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let ring_id = session.require_ring()?.id;
        let ids = id_list(&args, 0, "ld <ids>")?;
        let pool = session.pool()?;
        let mut lines = Vec::with_capacity(ids.len());
        for id in ids {
            if entity_in_ring(pool, EntityKind::Location, id, ring_id).await? {
                locations::delete_location(pool, id).await?;
                lines.push(ResultLine::new(format!("Deleted location #{id}")));
            } else {
                lines.push(ResultLine::new(format!("No location with id {id}")));
            }
        }
        Ok(ResultValue::Flat(lines))
    })
}
