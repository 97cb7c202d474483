//! Decoders for the XML documents the API returns.
//!
//! Happenings arrive as `<WORLD><HAPPENINGS><EVENT>…<TEXT>…</TEXT></EVENT>…`
//! and the eligibility shard as `<NATION><TGCANRECRUIT>1</TGCANRECRUIT></NATION>`.

use chrono::{DateTime, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::types::{Happening, HappeningPattern};
use crate::Error;

#[derive(Clone, Copy, PartialEq)]
enum Field {
    Text,
    Timestamp,
}

#[derive(Default)]
struct PendingEvent {
    text: String,
    timestamp: String,
}

/// Decodes a happenings document into entries, most recent first.
///
/// Entries whose text does not match the `@@…@@ … %%` shape are skipped.
/// A broken or cut-off document, or one without a `HAPPENINGS` element, is
/// an error.
pub fn decode_happenings(xml: &str, pattern: &HappeningPattern) -> Result<Vec<Happening>, Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut depth = 0usize;
    let mut saw_list = false;
    let mut current: Option<PendingEvent> = None;
    let mut field: Option<Field> = None;
    let mut happenings = Vec::new();
    let mut skipped = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                depth += 1;
                match e.name().as_ref() {
                    b"HAPPENINGS" => saw_list = true,
                    b"EVENT" => current = Some(PendingEvent::default()),
                    b"TEXT" => field = Some(Field::Text),
                    b"TIMESTAMP" => field = Some(Field::Timestamp),
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"HAPPENINGS" {
                    saw_list = true;
                }
            }
            Ok(Event::Text(t)) => {
                let value = t
                    .unescape()
                    .map_err(|e| Error::Parse(format!("bad text node: {}", e)))?;
                push_field(&mut current, field, &value);
            }
            Ok(Event::CData(c)) => {
                let value = String::from_utf8_lossy(&c.into_inner()).into_owned();
                push_field(&mut current, field, &value);
            }
            Ok(Event::End(e)) => {
                depth = depth.saturating_sub(1);
                match e.name().as_ref() {
                    b"TEXT" | b"TIMESTAMP" => field = None,
                    b"EVENT" => {
                        if let Some(pending) = current.take() {
                            match pattern.extract(&pending.text) {
                                Some((nation, action)) => happenings.push(Happening {
                                    nation,
                                    action,
                                    timestamp: parse_timestamp(&pending.timestamp),
                                }),
                                None => skipped += 1,
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => {
                ensure_closed(depth)?;
                break;
            }
            Err(e) => {
                return Err(Error::Parse(format!(
                    "XML parse error at position {}: {}",
                    reader.error_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    if !saw_list {
        return Err(Error::Parse("no HAPPENINGS element in response".into()));
    }
    if skipped > 0 {
        tracing::debug!("Skipped {} happenings that did not match the feed pattern", skipped);
    }
    Ok(happenings)
}

/// Decodes the `TGCANRECRUIT` shard. `"1"` means the nation may be recruited.
pub fn decode_can_recruit(xml: &str) -> Result<bool, Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut depth = 0usize;
    let mut inside = false;
    let mut value: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                depth += 1;
                if e.name().as_ref() == b"TGCANRECRUIT" {
                    inside = true;
                }
            }
            Ok(Event::End(e)) => {
                depth = depth.saturating_sub(1);
                if e.name().as_ref() == b"TGCANRECRUIT" {
                    inside = false;
                }
            }
            Ok(Event::Text(t)) if inside => {
                let text = t
                    .unescape()
                    .map_err(|e| Error::Parse(format!("bad text node: {}", e)))?;
                value = Some(text.trim().to_string());
            }
            Ok(Event::Eof) => {
                ensure_closed(depth)?;
                break;
            }
            Err(e) => {
                return Err(Error::Parse(format!(
                    "XML parse error at position {}: {}",
                    reader.error_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    match value {
        Some(v) => Ok(v == "1"),
        None => Err(Error::Parse("no TGCANRECRUIT element in response".into())),
    }
}

/// quick-xml reaches `Eof` quietly on a cut-off body; unclosed elements mean truncation.
fn ensure_closed(depth: usize) -> Result<(), Error> {
    if depth > 0 {
        return Err(Error::Parse(format!(
            "document ended with {} unclosed element(s)",
            depth
        )));
    }
    Ok(())
}

fn push_field(current: &mut Option<PendingEvent>, field: Option<Field>, value: &str) {
    if let (Some(pending), Some(field)) = (current.as_mut(), field) {
        match field {
            Field::Text => pending.text.push_str(value),
            Field::Timestamp => pending.timestamp.push_str(value),
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let secs: i64 = raw.trim().parse().ok()?;
    DateTime::from_timestamp(secs, 0)
}
