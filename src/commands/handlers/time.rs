//! Time entry commands: t, ta, td.

use super::{arg, id_list, rest, HandlerError};
use crate::commands::registry::{HandlerResult, Registry};
use crate::commands::result::{ResultLine, ResultValue};
use crate::persistence::associations::entity_in_ring;
use crate::persistence::{times, EntityKind};
use crate::session::Session;
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use futures::future::BoxFuture;
use tracing::info;

pub fn register(registry: &mut Registry) {
    registry.register("t", "", "list time entries", "times", list);
    registry.register("ta", "<moment> [note]", "add a time entry", "times", add);
    registry.register("td", "<ids>", "delete time entries", "times", delete);
}

/// Validates a moment and returns its stored form.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM` and `YYYY-MM-DDTHH:MM:SS`. Stored
/// forms sort chronologically as text.
fn normalize_moment(text: &str) -> Result<String, HandlerError> {
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(date.format("%Y-%m-%d").to_string());
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(moment) = NaiveDateTime::parse_from_str(text, pattern) {
            let stored = if moment.second() == 0 {
                moment.format("%Y-%m-%d %H:%M")
            } else {
                moment.format("%Y-%m-%d %H:%M:%S")
            };
            return Ok(stored.to_string());
        }
    }
    Err(HandlerError::bad_request(format!(
        "invalid moment '{text}' (expected YYYY-MM-DD or YYYY-MM-DDTHH:MM[:SS])"
    )))
}

fn list(session: &mut Session, _args: Vec<String>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let ring_id = session.require_ring()?.id;
        let formatter = session.formatter();
        let entries = times::list_times(session.pool()?, ring_id).await?;
        Ok(ResultValue::flat(
            entries.iter().map(|entry| formatter.time(entry)),
        ))
    })
}

fn add(session: &mut Session, args: Vec<String>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let ring_id = session.require_ring()?.id;
        let moment = normalize_moment(arg(&args, 0, "ta <moment> [note]")?)?;
        let note = rest(&args, 1);
        let id = times::create_time(session.pool()?, ring_id, &moment, &note).await?;
        info!("Created time entry {id} in ring {ring_id}");
        Ok(ResultValue::message(format!("Created time entry #{id} {moment}")))
    })
}

fn delete(session: &mut Session, args: Vec<String>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let ring_id = session.require_ring()?.id;
        let ids = id_list(&args, 0, "td <ids>")?;
        let pool = session.pool()?;
        let mut lines = Vec::with_capacity(ids.len());
        for id in ids {
            if entity_in_ring(pool, EntityKind::Time, id, ring_id).await? {
                times::delete_time(pool, id).await?;
                lines.push(ResultLine::new(format!("Deleted time entry #{id}")));
            } else {
                lines.push(ResultLine::new(format!("No time entry with id {id}")));
            }
        }
        Ok(ResultValue::Flat(lines))
    })
}

#[cfg(test)]
mod tests {
    use super::super::testing::{evaluator, failure, lines};
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_moment() {
        assert_eq!(normalize_moment("2024-01-03").unwrap(), "2024-01-03");
        assert_eq!(normalize_moment("2024-01-03T14:00").unwrap(), "2024-01-03 14:00");
        assert_eq!(
            normalize_moment("2024-01-03T14:00:30").unwrap(),
            "2024-01-03 14:00:30"
        );
        assert!(normalize_moment("2024-02-30").is_err());
        assert!(normalize_moment("yesterday").is_err());
    }

    #[tokio::test]
    async fn test_entries_list_chronologically() {
        let (mut ev, _) = evaluator().await;
        lines(&mut ev, "ra berlin").await;
        lines(&mut ev, "rs 1").await;
        lines(&mut ev, "ta 2024-03-01 handover").await;
        lines(&mut ev, "ta 2024-01-03T14:00 meeting").await;
        assert_eq!(
            lines(&mut ev, "t").await,
            vec![
                "    2  2024-01-03 14:00  meeting",
                "    1  2024-03-01  handover",
            ]
        );
        assert_eq!(lines(&mut ev, "td 2").await, vec!["Deleted time entry #2"]);
        assert_eq!(lines(&mut ev, "t").await.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_moment() {
        let (mut ev, _) = evaluator().await;
        lines(&mut ev, "ra berlin").await;
        lines(&mut ev, "rs 1").await;
        assert!(failure(&mut ev, "ta tomorrow")
            .await
            .starts_with("Error executing 'ta' (bad-request): invalid moment 'tomorrow'"));
    }
}
