use std::fmt::Write as _;

#[cfg(feature = "colored-output")]
use colored::*;
use serde::Serialize;
use webcast_decoder::schema::MessageSchema;
use webcast_decoder::{Event, EventKind, StatsSnapshot};

use crate::cli::OutputFormat;
use crate::error::Result;

pub struct OutputManager {
    colored: bool,
}

#[derive(Serialize)]
struct SchemaRow<'a> {
    name: &'a str,
    fields: Vec<FieldRow<'a>>,
}

#[derive(Serialize)]
struct FieldRow<'a> {
    number: u32,
    name: &'a str,
    wire_type: u8,
    repeated: bool,
}

impl OutputManager {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    pub fn format_event(&self, event: &Event, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Pretty => Ok(self.format_event_pretty(event)),
            OutputFormat::Json => Ok(serde_json::to_string(event)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(event)?),
        }
    }

    fn format_event_pretty(&self, event: &Event) -> String {
        let time = event
            .datetime()
            .map(|t| t.format("%H:%M:%S%.3f").to_string())
            .unwrap_or_else(|| event.timestamp.to_string());
        let kind = format!("{:<10}", event.kind.as_str());

        format!(
            "{} {} {}: {}",
            self.colorize(&time, Tint::Dim),
            self.colorize(&kind, Tint::for_kind(event.kind)),
            self.colorize(event.display_name(), Tint::Name),
            event.content
        )
    }

    pub fn format_stats(&self, stats: &StatsSnapshot, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => return Ok(serde_json::to_string(stats)?),
            OutputFormat::JsonPretty => return Ok(serde_json::to_string_pretty(stats)?),
            OutputFormat::Pretty => {}
        }

        let rows = [
            ("frames", stats.frames),
            ("  envelope", stats.envelope_hits),
            ("  response", stats.response_hits),
            ("  gzip scan", stats.gzip_scan_hits),
            ("  message scan", stats.message_scan_hits),
            ("  unresolved", stats.empty_frames),
            ("messages", stats.messages),
            ("  unknown method", stats.unknown_methods),
            ("  dropped", stats.dropped),
            ("  duplicates", stats.duplicates),
            ("  ignored", stats.ignored),
            ("events emitted", stats.emitted),
        ];

        let mut out = self.colorize("Decoder statistics:", Tint::Header);
        out.push('\n');
        for (label, value) in rows {
            let _ = writeln!(out, "  {label:<18} {value}");
        }
        Ok(out)
    }

    pub fn format_schemas(&self, schemas: &[&MessageSchema], format: OutputFormat) -> Result<String> {
        let rows: Vec<SchemaRow<'_>> = schemas
            .iter()
            .map(|s| SchemaRow {
                name: s.name,
                fields: s
                    .fields
                    .iter()
                    .map(|f| FieldRow {
                        number: f.number,
                        name: f.name,
                        wire_type: f.wire.as_u8(),
                        repeated: f.repeated,
                    })
                    .collect(),
            })
            .collect();

        match format {
            OutputFormat::Json => return Ok(serde_json::to_string(&rows)?),
            OutputFormat::JsonPretty => return Ok(serde_json::to_string_pretty(&rows)?),
            OutputFormat::Pretty => {}
        }

        let mut out = String::new();
        for schema in rows {
            out.push_str(&self.colorize(schema.name, Tint::Header));
            out.push('\n');
            for field in schema.fields {
                let _ = writeln!(
                    out,
                    "  {:>3}  {:<20} wire {}{}",
                    field.number,
                    field.name.to_lowercase(),
                    field.wire_type,
                    if field.repeated { "  repeated" } else { "" }
                );
            }
        }
        Ok(out)
    }

    #[cfg(feature = "colored-output")]
    fn colorize(&self, text: &str, tint: Tint) -> String {
        if !self.colored {
            return text.to_string();
        }
        let painted = match tint {
            Tint::Dim => text.dimmed(),
            Tint::Name => text.cyan(),
            Tint::Header => text.green().bold(),
            Tint::Chat => text.white().bold(),
            Tint::Gift => text.magenta().bold(),
            Tint::Social => text.yellow(),
            Tint::System => text.blue(),
        };
        painted.to_string()
    }

    #[cfg(not(feature = "colored-output"))]
    fn colorize(&self, text: &str, _tint: Tint) -> String {
        let _ = self.colored;
        text.to_string()
    }
}

#[derive(Debug, Clone, Copy)]
enum Tint {
    Dim,
    Name,
    Header,
    Chat,
    Gift,
    Social,
    System,
}

impl Tint {
    fn for_kind(kind: EventKind) -> Self {
        match kind {
            EventKind::Chat | EventKind::EmojiChat => Tint::Chat,
            EventKind::Gift | EventKind::Fansclub => Tint::Gift,
            EventKind::Like | EventKind::Member | EventKind::Social => Tint::Social,
            EventKind::RoomStats | EventKind::Control | EventKind::RoomRank | EventKind::Room => {
                Tint::System
            }
        }
    }
}
