//! Terminal output utilities: ANSI styling, notes, tables, transcript lines.

use std::io::Write;

use folio_core::{Action, Message, Role};

// ---------------------------------------------------------------------------
// ANSI Color/Style helpers
// ---------------------------------------------------------------------------

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM").map(|t| t != "dumb").unwrap_or(false))
}

fn paint(style: &str, text: &str) -> String {
    if supports_color() {
        format!("{style}{text}{RESET}")
    } else {
        text.to_string()
    }
}

/// Strip ANSI escape codes from a string.
pub fn strip_ansi(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            result.push(c);
        }
    }
    result
}

// ---------------------------------------------------------------------------
// Formatted notes
// ---------------------------------------------------------------------------

/// Severity of a one-line note printed outside the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Note {
    Info,
    Warn,
    Error,
    Success,
}

impl Note {
    fn glyph(self) -> (&'static str, &'static str, &'static str) {
        match self {
            Note::Info => (CYAN, "ℹ", "INFO"),
            Note::Warn => (YELLOW, "⚠", "WARN"),
            Note::Error => (RED, "✗", "ERROR"),
            Note::Success => (GREEN, "✓", "OK"),
        }
    }

    /// The note line, styled when `color` is set.
    pub fn format(self, msg: &str, color: bool) -> String {
        let (style, glyph, plain) = self.glyph();
        if color {
            format!("{style}{BOLD}{glyph}{RESET} {msg}")
        } else {
            format!("{plain}: {msg}")
        }
    }
}

/// Errors go to stderr, everything else to stdout.
pub fn note(kind: Note, msg: &str) {
    let line = kind.format(msg, supports_color());
    if kind == Note::Error {
        eprintln!("{line}");
    } else {
        println!("{line}");
    }
}

pub fn note_info(msg: &str) {
    note(Note::Info, msg);
}

pub fn note_warn(msg: &str) {
    note(Note::Warn, msg);
}

pub fn note_error(msg: &str) {
    note(Note::Error, msg);
}

pub fn note_success(msg: &str) {
    note(Note::Success, msg);
}

// ---------------------------------------------------------------------------
// Transcript
// ---------------------------------------------------------------------------

/// Speaker prefix for a message line.
pub fn speaker(message: &Message) -> String {
    match (message.role, message.is_system) {
        (_, true) => paint(DIM, "  ·"),
        (Role::User, false) => paint(BOLD, "you>"),
        (Role::Bot, false) => paint(CYAN, "bot>"),
    }
}

/// Numbered action buttons, one per line.
pub fn render_actions(actions: &[Action]) -> String {
    actions
        .iter()
        .enumerate()
        .map(|(i, action)| {
            let key = paint(BOLD, &format!("!{}", i + 1));
            format!("     {key} {} ({} {})", action.label, action.action_type, action.target)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A complete message with its actions.
pub fn render_message(message: &Message) -> String {
    let text = if message.is_system { paint(DIM, &message.text) } else { message.text.clone() };
    let mut out = format!("{} {}", speaker(message), text);
    if !message.actions.is_empty() {
        out.push('\n');
        out.push_str(&render_actions(&message.actions));
    }
    out
}

// ---------------------------------------------------------------------------
// Table rendering
// ---------------------------------------------------------------------------

/// Render a left-aligned table.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(strip_ansi(cell).chars().count());
        }
    }

    let line = |cells: Vec<String>| format!("  {}\n", cells.join("  ").trim_end());
    let pad = |s: &str, w: usize| {
        let visible = strip_ansi(s).chars().count();
        format!("{s}{}", " ".repeat(w.saturating_sub(visible)))
    };

    let mut out = String::new();
    out.push_str(&line(headers.iter().zip(&widths).map(|(h, w)| pad(*h, *w)).collect()));
    out.push_str(&line(widths.iter().map(|w| "-".repeat(*w)).collect()));
    for row in rows {
        let cells = widths
            .iter()
            .enumerate()
            .map(|(i, w)| pad(row.get(i).map(String::as_str).unwrap_or(""), *w))
            .collect();
        out.push_str(&line(cells));
    }
    out
}

// ---------------------------------------------------------------------------
// Streaming writer
// ---------------------------------------------------------------------------

/// Write a chunk and flush, so streamed tokens show up immediately.
pub fn stream_write(writer: &mut impl Write, chunk: &str) -> std::io::Result<()> {
    writer.write_all(chunk.as_bytes())?;
    writer.flush()
}
