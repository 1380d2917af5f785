//! Association commands: a, aa, aas, aai, aal, aat, ad.
//!
//! `a` returns one group per association. The header line carries the ignore
//! marker, so `a ~WOLF` shows only the associations WOLF takes part in, each
//! with its header.

use super::{arg, id_list, parse_id, rest, HandlerError};
use crate::commands::registry::{HandlerResult, Registry};
use crate::commands::result::{ResultLine, ResultValue};
use crate::persistence::associations::{self, entity_in_ring, member_label};
use crate::persistence::{Association, EntityKind};
use crate::session::Session;
use futures::future::BoxFuture;
use sqlx::SqlitePool;
use tracing::info;

pub fn register(registry: &mut Registry) {
    let doc = "associations";
    registry.register("a", "", "list associations", doc, list);
    registry.register("aa", "<level> <description>", "add an association", doc, add);
    registry.register("aas", "<assoc> <ids>", "link subjects", doc, link_subjects);
    registry.register("aai", "<assoc> <ids>", "link information", doc, link_information);
    registry.register("aal", "<assoc> <ids>", "link locations", doc, link_locations);
    registry.register("aat", "<assoc> <ids>", "link time entries", doc, link_times);
    registry.register("ad", "<ids>", "delete associations", doc, delete);
}

/// Fetches an association and checks it belongs to `ring_id`.
async fn association_in_ring(
    pool: &SqlitePool,
    id: i64,
    ring_id: i64,
) -> Result<Option<Association>, HandlerError> {
    Ok(associations::get_association(pool, id)
        .await?
        .filter(|a| a.ring_id == ring_id))
}

fn list(session: &mut Session, _args: Vec<String>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let ring_id = session.require_ring()?.id;
        let formatter = session.formatter();
        let pool = session.pool()?;

        let mut groups = Vec::new();
        for association in associations::list_associations(pool, ring_id).await? {
            let mut group = vec![ResultLine::passthrough(formatter.association(&association))];
            for member in associations::list_members(pool, association.id).await? {
                let label = member_label(pool, member.kind, member.target_id).await?;
                group.push(ResultLine::new(formatter.member(&member, label.as_deref())));
            }
            groups.push(group);
        }
        Ok(ResultValue::Grouped(groups))
    })
}

fn add(session: &mut Session, args: Vec<String>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let usage = "aa <level> <description>";
        let ring_id = session.require_ring()?.id;
        let level_text = arg(&args, 0, usage)?;
        let level: i64 = level_text
            .parse()
            .map_err(|_| HandlerError::bad_request(format!("invalid level '{level_text}'")))?;
        arg(&args, 1, usage)?;
        let description = rest(&args, 1);
        let id = associations::create_association(session.pool()?, ring_id, level, &description)
            .await?;
        info!("Created association {id} in ring {ring_id}");
        Ok(ResultValue::message(format!("Created association #{id}")))
    })
}

async fn link(session: &Session, args: Vec<String>, kind: EntityKind) -> HandlerResult {
    let usage = match kind {
        EntityKind::Subject => "aas <assoc> <ids>",
        EntityKind::Information => "aai <assoc> <ids>",
        EntityKind::Location => "aal <assoc> <ids>",
        EntityKind::Time => "aat <assoc> <ids>",
    };
    let ring_id = session.require_ring()?.id;
    let association_id = parse_id(arg(&args, 0, usage)?, "association")?;
    let ids = id_list(&args, 1, usage)?;
    let pool = session.pool()?;

    if association_in_ring(pool, association_id, ring_id).await?.is_none() {
        return Err(HandlerError::no_data(format!(
            "no association with id {association_id} in this ring"
        )));
    }

    let mut lines = Vec::with_capacity(ids.len());
    for id in ids {
        if entity_in_ring(pool, kind, id, ring_id).await? {
            associations::add_member(pool, association_id, kind, id).await?;
            lines.push(ResultLine::new(format!(
                "Linked {} #{id} to association #{association_id}",
                kind.as_str()
            )));
        } else {
            lines.push(ResultLine::new(format!(
                "No {} with id {id} in this ring",
                kind.as_str()
            )));
        }
    }
    Ok(ResultValue::Flat(lines))
}

fn link_subjects(session: &mut Session, args: Vec<String>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(link(session, args, EntityKind::Subject))
}

fn link_information(session: &mut Session, args: Vec<String>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(link(session, args, EntityKind::Information))
}

fn link_locations(session: &mut Session, args: Vec<String>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(link(session, args, EntityKind::Location))
}

fn link_times(session: &mut Session, args: Vec<String>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(link(session, args, EntityKind::Time))
}

fn delete(session: &mut Session, args: Vec<String>) -> BoxFuture<'_, HandlerResult> {
    Box::pin(async move {
        let ring_id = session.require_ring()?.id;
        let ids = id_list(&args, 0, "ad <ids>")?;
        let pool = session.pool()?;
        let mut lines = Vec::with_capacity(ids.len());
        for id in ids {
            if association_in_ring(pool, id, ring_id).await?.is_some() {
                associations::delete_association(pool, id).await?;
                lines.push(ResultLine::new(format!("Deleted association #{id}")));
            } else {
                lines.push(ResultLine::new(format!("No association with id {id}")));
            }
        }
        Ok(ResultValue::Flat(lines))
    })
}

#[cfg(test)]
mod tests {
    use super::super::testing::{evaluator, failure, lines, run};
    use crate::commands::pipeline::Evaluator;
    use crate::commands::result::ResultValue;
    use pretty_assertions::assert_eq;

    async fn populated() -> Evaluator {
        let (mut ev, _) = evaluator().await;
        for line in [
            "ra berlin",
            "rs 1",
            "sa WOLF",
            "sa HAWK",
            "la 52.52 13.405 CafeLuna",
            "ta 2024-01-03",
            "aa 1 met at the cafe",
            "aa 3 shared courier",
            "aas 1 1",
            "aal 1 1",
            "aat 1 1",
            "aas 2 2",
        ] {
            lines(&mut ev, line).await;
        }
        ev
    }

    #[tokio::test]
    async fn test_list_orders_by_level_and_groups_members() {
        let mut ev = populated().await;
        match run(&mut ev, "a").await {
            ResultValue::Grouped(groups) => {
                assert_eq!(groups.len(), 2);
                assert_eq!(groups[0][0].display(), "#2 [level 3] shared courier");
                assert!(groups[0][0].is_passthrough());
                assert_eq!(groups[1].len(), 4);
            }
            other => panic!("expected groups, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_filter_keeps_only_matching_associations() {
        let mut ev = populated().await;
        assert_eq!(
            lines(&mut ev, "assocs ~WOLF").await,
            vec![
                "#1 [level 1] met at the cafe",
                "    subject         1  WOLF",
            ]
        );
        assert!(lines(&mut ev, "a ~nobody").await.is_empty());
    }

    #[tokio::test]
    async fn test_link_checks_ring_membership() {
        let mut ev = populated().await;
        assert_eq!(
            lines(&mut ev, "aas 2 1,9").await,
            vec![
                "Linked subject #1 to association #2",
                "No subject with id 9 in this ring",
            ]
        );
        assert_eq!(
            failure(&mut ev, "aai 7 1").await,
            "Error executing 'aai' (no-data): no association with id 7 in this ring"
        );
        assert_eq!(
            failure(&mut ev, "aa high stakes").await,
            "Error executing 'aa' (bad-request): invalid level 'high'"
        );
    }

    #[tokio::test]
    async fn test_deleting_a_subject_unlinks_it() {
        let mut ev = populated().await;
        lines(&mut ev, "sd 2").await;
        match run(&mut ev, "a").await {
            ResultValue::Grouped(groups) => assert_eq!(groups[0].len(), 1),
            other => panic!("expected groups, got {other:?}"),
        }
        assert_eq!(
            lines(&mut ev, "ad 1-2").await,
            vec!["Deleted association #1", "Deleted association #2"]
        );
        assert!(run(&mut ev, "a").await.is_empty());
    }
}
