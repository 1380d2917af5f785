//! End-to-end tests: input lines through the evaluator to rendered output.

use dossier::commands::output::SharedBuffer;
use dossier::commands::{
    register_all, Evaluation, Evaluator, OutputSink, Registry, ResultLine, ResultValue,
};
use dossier::config::Config;
use dossier::persistence::Store;
use dossier::repl;
use dossier::session::Session;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

async fn evaluator_at(path: &std::path::Path) -> (Evaluator, SharedBuffer) {
    let config = Config {
        color: false,
        ..Config::default()
    };
    let store = Store::open(path).await.unwrap();
    let mut registry = Registry::new();
    register_all(&mut registry);
    let buffer = SharedBuffer::new();
    let evaluator = Evaluator::new(
        registry,
        Session::new(config, store),
        OutputSink::new(buffer.clone()),
    )
    .unwrap();
    (evaluator, buffer)
}

async fn run_all(evaluator: &mut Evaluator, lines: &[&str]) {
    let lines: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
    assert_eq!(repl::run_lines(evaluator, &lines).await, 0);
}

#[tokio::test]
async fn test_investigation_session() {
    let dir = tempdir().unwrap();
    let (mut ev, buffer) = evaluator_at(&dir.path().join("dossier.db")).await;

    run_all(
        &mut ev,
        &[
            "ra berlin",
            "rs 1",
            "sa WOLF courier",
            "sa HAWK",
            "sa OWL",
            "ss 1",
            "ia phone 555 0100",
            "ia address 5 Main St",
            "ss 2",
            "ia address 9 Side St",
        ],
    )
    .await;
    buffer.clear();

    assert!(ev.run_line("sv ~Main").await);
    assert_eq!(
        buffer.lines(),
        vec!["    1  WOLF  courier", "      2  [text] address: 5 Main St"]
    );

    buffer.clear();
    assert!(ev.run_line("sv ~~address ~Side").await);
    assert_eq!(
        buffer.lines(),
        vec!["    2  HAWK", "      3  [text] address: 9 Side St"]
    );

    buffer.clear();
    assert!(ev.run_line("s ~~^\\s*[0-9]+\\s+(WOLF|OWL)").await);
    assert_eq!(buffer.lines(), vec!["    1  WOLF  courier", "    3  OWL"]);
}

#[tokio::test]
async fn test_state_persists_across_sessions() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dossier.db");

    {
        let (mut ev, _) = evaluator_at(&path).await;
        run_all(&mut ev, &["ra berlin", "rs 1", "sa WOLF"]).await;
        ev.session().store().unwrap().close().await;
    }

    let (mut ev, buffer) = evaluator_at(&path).await;
    run_all(&mut ev, &["rs 1", "s"]).await;
    assert_eq!(
        buffer.lines(),
        vec!["Selected ring #1 berlin", "    1  WOLF"]
    );
}

#[tokio::test]
async fn test_help_and_errors_through_real_registry() {
    let dir = tempdir().unwrap();
    let (mut ev, buffer) = evaluator_at(&dir.path().join("dossier.db")).await;

    assert!(ev.run_line("r?").await);
    let listing = buffer.lines();
    assert!(listing.iter().any(|l| l.starts_with("ra <name> [note]")));
    assert!(listing.iter().all(|l| !l.starts_with("rings")));

    buffer.clear();
    assert!(!ev.run_line("rs 1 ~x ~").await);
    assert_eq!(buffer.lines(), vec!["Invalid command"]);

    buffer.clear();
    assert!(!ev.run_line("zz").await);
    assert_eq!(
        buffer.lines(),
        vec!["Unknown command: zz. Type 'help' or '?' for available commands."]
    );
}

#[tokio::test]
async fn test_page_flattens_groups() {
    let dir = tempdir().unwrap();
    let (mut ev, _) = evaluator_at(&dir.path().join("dossier.db")).await;
    run_all(
        &mut ev,
        &["ra berlin", "rs 1", "sa WOLF", "aa 2 courier ring", "aas 1 1"],
    )
    .await;

    match ev.evaluate("a ~WOLF $L").await.unwrap() {
        Evaluation::Page(value) => {
            let text = dossier::external::flatten_plain(&value);
            assert_eq!(
                text,
                "#1 [level 2] courier ring\n    subject         1  WOLF\n"
            );
        }
        other => panic!("expected a paged result, got {other:?}"),
    }
}

#[test]
fn test_result_lines_keep_marker_until_render() {
    let value = ResultValue::flat([ResultLine::passthrough("HEADER"), "alpha".into()]);
    let raw: Vec<&str> = value.lines().map(ResultLine::raw).collect();
    assert_eq!(raw, vec!["{grepignore}HEADER", "alpha"]);
}
