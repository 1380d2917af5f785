//! Row formatting for command output.
//!
//! Each function turns one stored row into one display line. Coloring is
//! applied to bounded spans (ids, names) only when enabled, and metadata
//! suffixes are appended only when requested, so the text filters see is
//! stable across configurations once colors are stripped.

use crate::persistence::{
    Association, AssociationMember, InfoKind, Information, Location, Ring, Subject, TimeEntry,
};
use crossterm::style::{Color, Stylize};
use regex::Regex;
use std::sync::OnceLock;

fn ansi_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").expect("ANSI escape pattern is valid")
    })
}

/// Removes ANSI escape sequences from a line.
pub fn strip_ansi(text: &str) -> String {
    ansi_pattern().replace_all(text, "").into_owned()
}

/// Formats domain rows into display lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineFormatter {
    /// Emit ANSI colors.
    pub color: bool,
    /// Append `[created ...]` style suffixes.
    pub show_metadata: bool,
}

impl LineFormatter {
    /// Creates a formatter.
    pub fn new(color: bool, show_metadata: bool) -> Self {
        Self {
            color,
            show_metadata,
        }
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn emphasize(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn id(&self, id: i64) -> String {
        self.paint(&format!("{id:>4}"), Color::DarkGrey)
    }

    fn note(note: &str) -> String {
        if note.is_empty() {
            String::new()
        } else {
            format!("  {note}")
        }
    }

    fn metadata(&self, created_at: &str, modified_at: Option<&str>) -> String {
        if !self.show_metadata {
            return String::new();
        }
        let suffix = match modified_at {
            Some(modified) if modified != created_at => {
                format!("  [created {created_at}, modified {modified}]")
            }
            _ => format!("  [created {created_at}]"),
        };
        self.paint(&suffix, Color::DarkGrey)
    }

    /// `*   1  berlin  field office` (the star marks the selected ring).
    pub fn ring(&self, ring: &Ring, selected: bool) -> String {
        let mark = if selected { "*" } else { " " };
        format!(
            "{mark}{}  {}{}{}",
            self.id(ring.id),
            self.paint(&ring.name, Color::Cyan),
            Self::note(&ring.note),
            self.metadata(&ring.created_at, None)
        )
    }

    /// `    3  WOLF  courier`.
    pub fn subject(&self, subject: &Subject, selected: bool) -> String {
        let mark = if selected { "*" } else { " " };
        format!(
            "{mark}{}  {}{}{}",
            self.id(subject.id),
            self.emphasize(&subject.codename),
            Self::note(&subject.note),
            self.metadata(&subject.created_at, None)
        )
    }

    /// `   12  [text] address: 5 Main St`.
    pub fn information(&self, info: &Information) -> String {
        let value = match info.kind {
            InfoKind::Text => String::from_utf8_lossy(&info.value).replace('\n', " "),
            InfoKind::Binary => format!("<{} bytes>", info.value.len()),
            InfoKind::Composite => info
                .composite_ids()
                .iter()
                .map(|id| format!("#{id}"))
                .collect::<Vec<_>>()
                .join(", "),
        };
        format!(
            " {}  [{}] {}: {}{}{}",
            self.id(info.id),
            info.kind.as_str(),
            self.paint(&info.name, Color::Yellow),
            value,
            Self::note(&info.note),
            self.metadata(&info.created_at, Some(&info.modified_at))
        )
    }

    /// `    2  Cafe Luna (52.52000, 13.40500)`.
    pub fn location(&self, location: &Location) -> String {
        format!(
            " {}  {} ({:.5}, {:.5}){}{}",
            self.id(location.id),
            self.paint(&location.name, Color::Green),
            location.latitude,
            location.longitude,
            Self::note(&location.note),
            self.metadata(&location.created_at, None)
        )
    }

    /// `    5  2024-01-03 14:00  meeting`.
    pub fn time(&self, time: &TimeEntry) -> String {
        format!(
            " {}  {}{}{}",
            self.id(time.id),
            self.paint(&time.moment, Color::Magenta),
            Self::note(&time.note),
            self.metadata(&time.created_at, None)
        )
    }

    /// `#4 [level 2] met at the cafe`, the header of an association group.
    pub fn association(&self, association: &Association) -> String {
        format!(
            "{} [level {}] {}{}",
            self.paint(&format!("#{}", association.id), Color::DarkGrey),
            association.level,
            self.emphasize(&association.description),
            self.metadata(&association.created_at, None)
        )
    }

    /// `    subject         3  WOLF`, one member of an association group.
    pub fn member(&self, member: &AssociationMember, label: Option<&str>) -> String {
        format!(
            "    {:<12} {}  {}",
            member.kind.as_str(),
            self.id(member.target_id),
            label.unwrap_or("(missing)")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::EntityKind;
    use pretty_assertions::assert_eq;

    fn ring() -> Ring {
        Ring {
            id: 1,
            name: "berlin".to_string(),
            note: "field office".to_string(),
            created_at: "2024-01-01 10:00:00".to_string(),
        }
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[38;5;14mcyan\x1b[39m plain"), "cyan plain");
        assert_eq!(strip_ansi("\x1b[1mbold\x1b[22m"), "bold");
        assert_eq!(strip_ansi("no escapes"), "no escapes");
    }

    #[test]
    fn test_ring_line_plain() {
        let f = LineFormatter::new(false, false);
        assert_eq!(f.ring(&ring(), true), "*   1  berlin  field office");
        assert_eq!(f.ring(&ring(), false), "    1  berlin  field office");
    }

    #[test]
    fn test_colored_line_strips_to_plain() {
        let colored = LineFormatter::new(true, false).ring(&ring(), false);
        let plain = LineFormatter::new(false, false).ring(&ring(), false);
        assert_eq!(strip_ansi(&colored), plain);
    }

    #[test]
    fn test_metadata_suffix() {
        let f = LineFormatter::new(false, true);
        assert!(f
            .ring(&ring(), false)
            .ends_with("[created 2024-01-01 10:00:00]"));
    }

    #[test]
    fn test_information_kinds() {
        let f = LineFormatter::new(false, false);
        let mut info = Information {
            id: 12,
            subject_id: 3,
            kind: InfoKind::Text,
            name: "address".to_string(),
            value: b"5 Main St".to_vec(),
            note: String::new(),
            created_at: "t".to_string(),
            modified_at: "t".to_string(),
        };
        assert_eq!(f.information(&info), "   12  [text] address: 5 Main St");

        info.kind = InfoKind::Binary;
        assert!(f.information(&info).ends_with("<9 bytes>"));

        info.kind = InfoKind::Composite;
        info.value = b"3,4".to_vec();
        assert!(f.information(&info).ends_with("#3, #4"));
    }

    #[test]
    fn test_member_line() {
        let f = LineFormatter::new(false, false);
        let member = AssociationMember {
            association_id: 1,
            kind: EntityKind::Subject,
            target_id: 3,
        };
        assert_eq!(f.member(&member, Some("WOLF")), "    subject         3  WOLF");
        assert!(f.member(&member, None).ends_with("(missing)"));
    }
}
