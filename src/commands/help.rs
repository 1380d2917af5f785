//! Inline help for `name?` and `name??`.
//!
//! `name?` lists the commands one level below `name` in the command-name trie;
//! `name??` adds the long-form documentation for `name` itself.

use super::registry::Registry;
use super::result::{ResultLine, ResultValue};

/// Which help suffix was typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpForm {
    /// `name?`
    Listing,
    /// `name??`
    Documented,
}

/// A parsed help request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelpRequest<'a> {
    /// The command-name prefix with the suffix removed.
    pub prefix: &'a str,
    pub form: HelpForm,
}

impl<'a> HelpRequest<'a> {
    /// Recognizes exactly one or exactly two trailing `?`.
    pub fn parse(base: &'a str) -> Option<Self> {
        let stripped = base.trim_end_matches('?');
        let form = match base.len() - stripped.len() {
            1 => HelpForm::Listing,
            2 => HelpForm::Documented,
            _ => return None,
        };
        Some(Self {
            prefix: stripped.trim_end(),
            form,
        })
    }
}

/// Builds the help listing for a request.
pub fn render(registry: &Registry, request: HelpRequest<'_>) -> ResultValue {
    let children = registry.children(request.prefix);
    let mut lines = Vec::new();

    if children.is_empty() {
        lines.push(ResultLine::new(format!(
            "No commands start with '{}'",
            request.prefix
        )));
    } else {
        let heads: Vec<String> = children
            .iter()
            .map(|command| {
                let flag = if registry.has_descendants(&command.name) {
                    "+"
                } else {
                    ""
                };
                if command.args.is_empty() {
                    format!("{}{flag}", command.name)
                } else {
                    format!("{}{flag} {}", command.name, command.args)
                }
            })
            .collect();
        let width = heads.iter().map(|h| h.chars().count()).max().unwrap_or(0);

        for (head, command) in heads.iter().zip(&children) {
            lines.push(ResultLine::new(
                format!("{head:<width$}  {}", command.summary)
                    .trim_end()
                    .to_string(),
            ));
        }
    }

    if request.form == HelpForm::Documented {
        let doc = registry
            .lookup(request.prefix)
            .and_then(|command| documentation(&command.doc_tag));
        if let Some(doc) = doc {
            lines.push(ResultLine::passthrough(""));
            lines.extend(doc.lines().map(ResultLine::passthrough));
        }
    }

    ResultValue::Flat(lines)
}

/// The full `help` listing: every command with its summary.
pub fn render_all(registry: &Registry) -> ResultValue {
    let width = registry
        .all()
        .map(|c| c.name.chars().count() + 1 + c.args.chars().count())
        .max()
        .unwrap_or(0);
    let mut lines: Vec<ResultLine> = registry
        .all()
        .map(|command| {
            let head = format!("{} {}", command.name, command.args);
            ResultLine::new(
                format!("{head:<width$}  {}", command.summary)
                    .trim_end()
                    .to_string(),
            )
        })
        .collect();
    lines.push(ResultLine::passthrough(""));
    lines.extend(PIPELINE_HELP.lines().map(ResultLine::passthrough));
    ResultValue::Flat(lines)
}

/// Returns the documentation text for a doc tag.
pub fn documentation(tag: &str) -> Option<&'static str> {
    DOCS.iter().find(|(t, _)| *t == tag).map(|(_, doc)| *doc)
}

const PIPELINE_HELP: &str = r#"Pipelines:
  <command> ~text      keep lines containing text
  <command> ~~regex    keep lines matching a regular expression
  <command> $L         show the output in the pager
  <prefix>?            list commands one level below prefix (+ marks more below)
  <command>??          same, plus the command's documentation"#;

static DOCS: &[(&str, &str)] = &[
    (
        "rings",
        r#"Rings are investigation contexts. Everything else lives inside one.
  r                  list rings; * marks the selected ring
  ra <name> [note]   create a ring
  rs <id>            select a ring (clears the subject selection)
  rn <id> <note>     replace a ring's note
  rd <ids>           delete rings and everything in them, e.g. rd 2,4-6"#,
    ),
    (
        "subjects",
        r#"Subjects are people of interest in the selected ring.
  s                       list subjects
  sa <codename> [note]    create a subject
  ss <id>                 select a subject
  sv [ids]                view subjects with their information, one block each
  sd <ids>                delete subjects with their information"#,
    ),
    (
        "information",
        r#"Information entries belong to the selected subject.
  i                    list information
  ia <name> <value>    add a text entry
  iab <name> <path>    add a binary entry from a file
  iac <name> <ids>     add a composite of other entries
  ie <id>              edit a text entry in the external editor
  id <ids>             delete entries"#,
    ),
    (
        "locations",
        r#"Locations are named coordinates in the selected ring.
  l                              list locations
  la <lat> <lon> <name> [note]   add a location
  ld <ids>                       delete locations"#,
    ),
    (
        "times",
        r#"Time entries are dates or date-times in the selected ring.
  t                     list time entries in chronological order
  ta <moment> [note]    add an entry; moment is YYYY-MM-DD or YYYY-MM-DDTHH:MM[:SS]
  td <ids>              delete entries"#,
    ),
    (
        "associations",
        r#"Associations link subjects, information, locations and times.
  a                           list associations, one block each, highest level first
  aa <level> <description>    create an association
  aas <assoc> <ids>           link subjects
  aai <assoc> <ids>           link information entries
  aal <assoc> <ids>           link locations
  aat <assoc> <ids>           link time entries
  ad <ids>                    delete associations
Block headers always survive filters; a block is shown only if one of its
lines matches."#,
    ),
    (
        "system",
        r#"System commands.
  help     list every command
  debug    toggle printing of full failure traces
  q        leave dossier"#,
    ),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::registry::HandlerResult;
    use crate::session::Session;
    use futures::future::BoxFuture;
    use pretty_assertions::assert_eq;

    fn noop(_session: &mut Session, _args: Vec<String>) -> BoxFuture<'_, HandlerResult> {
        Box::pin(async { Ok(ResultValue::empty()) })
    }

    fn raw_lines(value: &ResultValue) -> Vec<String> {
        value.lines().map(|l| l.raw().to_string()).collect()
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register("ab", "<x>", "parent", "rings", noop);
        registry.register("abc", "", "child one", "", noop);
        registry.register("abd", "<y>", "child two", "", noop);
        registry.register("abcd", "", "grandchild", "", noop);
        registry
    }

    #[test]
    fn test_parse_help_forms() {
        assert_eq!(
            HelpRequest::parse("ab?"),
            Some(HelpRequest {
                prefix: "ab",
                form: HelpForm::Listing
            })
        );
        assert_eq!(
            HelpRequest::parse("ab??"),
            Some(HelpRequest {
                prefix: "ab",
                form: HelpForm::Documented
            })
        );
        assert_eq!(HelpRequest::parse("ab???"), None);
        assert_eq!(HelpRequest::parse("ab"), None);
        assert_eq!(HelpRequest::parse("?").map(|r| r.prefix), Some(""));
    }

    #[test]
    fn test_listing_shows_immediate_children() {
        let value = render(&registry(), HelpRequest::parse("ab?").unwrap());
        assert_eq!(
            raw_lines(&value),
            vec![
                "ab+ <x>  parent",
                "abc+     child one",
                "abd <y>  child two",
            ]
        );
    }

    #[test]
    fn test_documented_form_appends_passthrough_doc() {
        let value = render(&registry(), HelpRequest::parse("ab??").unwrap());
        let lines: Vec<ResultLine> = value.lines().cloned().collect();
        assert_eq!(lines.len(), 3 + 1 + DOCS[0].1.lines().count());
        assert!(lines[3..].iter().all(ResultLine::is_passthrough));
        assert!(lines[4].display().starts_with("Rings are"));
    }

    #[test]
    fn test_documented_form_without_exact_command() {
        let value = render(&registry(), HelpRequest::parse("a??").unwrap());
        assert_eq!(raw_lines(&value), vec!["ab+ <x>  parent"]);
    }

    #[test]
    fn test_no_match() {
        let value = render(&registry(), HelpRequest::parse("zz?").unwrap());
        assert_eq!(raw_lines(&value), vec!["No commands start with 'zz'"]);
    }

    #[test]
    fn test_render_all_lists_everything() {
        let value = render_all(&registry());
        let lines = raw_lines(&value);
        assert!(lines[0].starts_with("ab <x>"));
        assert!(lines.iter().any(|l| l.contains("grandchild")));
        assert!(lines.iter().any(|l| l.contains("Pipelines:")));
    }

    #[test]
    fn test_every_doc_tag_is_unique() {
        let mut tags: Vec<&str> = DOCS.iter().map(|(t, _)| *t).collect();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), DOCS.len());
        assert!(documentation("subjects").is_some());
        assert!(documentation("nope").is_none());
    }
}
