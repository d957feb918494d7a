//! Input trace decoding.
//!
//! Traces are sparse: each event carries a 1-based `frame` and the control
//! state that holds from that tick until the next event. A trace is either a
//! bare array of events or `{"ticks": N, "events": [...]}` where `ticks`
//! declares how long the recording ran.

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::EngineConfig;

/// A single per-game control event.
pub trait TraceEvent: DeserializeOwned + Clone + fmt::Debug {
    /// Tick on which the event takes effect.
    fn frame(&self) -> u32;

    /// Check field ranges that the type system cannot express.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when a field lies out of bounds.
    fn check_bounds(&self) -> Result<(), String>;
}

/// Structural decode failure.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[error("malformed input at tick {tick:?} (entry {entry:?}): {reason}")]
pub struct MalformedInput {
    pub tick: Option<u32>,
    pub entry: Option<usize>,
    pub reason: String,
}

impl MalformedInput {
    fn whole(reason: impl Into<String>) -> Self {
        Self {
            tick: None,
            entry: None,
            reason: reason.into(),
        }
    }

    fn at(entry: usize, tick: Option<u32>, reason: impl Into<String>) -> Self {
        Self {
            tick,
            entry: Some(entry),
            reason: reason.into(),
        }
    }
}

/// Ceilings enforced while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceLimits {
    pub max_bytes: usize,
    pub max_events: usize,
    pub max_ticks: u32,
}

impl From<&EngineConfig> for TraceLimits {
    fn from(cfg: &EngineConfig) -> Self {
        Self {
            max_bytes: cfg.max_trace_bytes,
            max_events: cfg.max_trace_events,
            max_ticks: cfg.max_ticks,
        }
    }
}

impl Default for TraceLimits {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

/// Decoded, validated trace.
#[derive(Debug, Clone, PartialEq)]
pub struct InputTrace<E> {
    events: Vec<E>,
    extent: u32,
}

impl<E: TraceEvent> InputTrace<E> {
    /// Empty trace: every tick receives neutral input.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            events: Vec::new(),
            extent: 0,
        }
    }

    #[must_use]
    pub fn events(&self) -> &[E] {
        &self.events
    }

    /// Last tick covered by the recording.
    #[must_use]
    pub const fn extent(&self) -> u32 {
        self.extent
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Sequential per-tick view over the trace.
    #[must_use]
    pub fn cursor(&self) -> TraceCursor<'_, E> {
        TraceCursor {
            events: &self.events,
            next: 0,
            extent: self.extent,
        }
    }
}

/// Input delivered to a simulator for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickInput<'a, E> {
    /// An event recorded for exactly this tick.
    Event(&'a E),
    /// No event this tick; the previous control state holds.
    Hold,
    /// The recording has ended; apply the game's neutral control.
    Neutral,
}

/// Walks a trace tick by tick. Ticks must be requested in increasing order.
#[derive(Debug, Clone)]
pub struct TraceCursor<'a, E> {
    events: &'a [E],
    next: usize,
    extent: u32,
}

impl<'a, E: TraceEvent> TraceCursor<'a, E> {
    /// Input for `tick`, skipping any events for earlier ticks.
    pub fn input_for(&mut self, tick: u32) -> TickInput<'a, E> {
        while let Some(event) = self.events.get(self.next) {
            if event.frame() < tick {
                self.next += 1;
                continue;
            }
            if event.frame() == tick {
                self.next += 1;
                return TickInput::Event(event);
            }
            break;
        }
        if tick > self.extent {
            TickInput::Neutral
        } else {
            TickInput::Hold
        }
    }
}

/// Decode and structurally validate a raw trace.
///
/// # Errors
///
/// Returns [`MalformedInput`] for oversized text, invalid JSON, an unknown
/// envelope, missing or out-of-range fields, non-increasing frames, or
/// ceilings exceeded on event count or tick count.
pub fn decode<E: TraceEvent>(raw: &str, limits: &TraceLimits) -> Result<InputTrace<E>, MalformedInput> {
    if raw.len() > limits.max_bytes {
        return Err(MalformedInput::whole(format!(
            "trace is {} bytes, limit is {}",
            raw.len(),
            limits.max_bytes
        )));
    }
    let root: Value = serde_json::from_str(raw)
        .map_err(|err| MalformedInput::whole(format!("trace is not valid JSON: {err}")))?;
    let (entries, declared) = split_envelope(root)?;

    if entries.len() > limits.max_events {
        let tick = entries.get(limits.max_events).and_then(read_frame);
        return Err(MalformedInput::at(
            limits.max_events,
            tick,
            format!(
                "trace has {} events, limit is {}",
                entries.len(),
                limits.max_events
            ),
        ));
    }

    let mut events = Vec::with_capacity(entries.len());
    let mut last_frame = 0u32;
    for (index, entry) in entries.into_iter().enumerate() {
        let Some(frame) = read_frame(&entry) else {
            let tick = last_frame.checked_add(1);
            return Err(MalformedInput::at(
                index,
                tick,
                "entry needs an integer frame of at least 1",
            ));
        };
        if frame <= last_frame {
            return Err(MalformedInput::at(
                index,
                Some(frame),
                format!("frame {frame} does not follow frame {last_frame}"),
            ));
        }
        if frame > limits.max_ticks {
            return Err(MalformedInput::at(
                index,
                Some(frame),
                format!("frame {frame} exceeds tick ceiling {}", limits.max_ticks),
            ));
        }
        let event: E = serde_json::from_value(entry)
            .map_err(|err| MalformedInput::at(index, Some(frame), err.to_string()))?;
        event
            .check_bounds()
            .map_err(|reason| MalformedInput::at(index, Some(frame), reason))?;
        last_frame = frame;
        events.push(event);
    }

    let extent = match declared {
        Some(ticks) if ticks < last_frame => {
            return Err(MalformedInput::whole(format!(
                "declared ticks {ticks} precede last frame {last_frame}"
            )));
        }
        Some(ticks) if ticks > limits.max_ticks => {
            return Err(MalformedInput {
                tick: Some(ticks),
                entry: None,
                reason: format!("declared ticks {ticks} exceed ceiling {}", limits.max_ticks),
            });
        }
        Some(ticks) => ticks,
        None => last_frame,
    };

    Ok(InputTrace { events, extent })
}

fn split_envelope(root: Value) -> Result<(Vec<Value>, Option<u32>), MalformedInput> {
    match root {
        Value::Array(entries) => Ok((entries, None)),
        Value::Object(map) => split_framed(map),
        _ => Err(MalformedInput::whole(
            "trace must be an array of events or an object with events",
        )),
    }
}

fn split_framed(mut map: Map<String, Value>) -> Result<(Vec<Value>, Option<u32>), MalformedInput> {
    if let Some(key) = map.keys().find(|k| *k != "ticks" && *k != "events") {
        return Err(MalformedInput::whole(format!("unknown trace field `{key}`")));
    }
    let declared = match map.remove("ticks") {
        None | Some(Value::Null) => None,
        Some(value) => {
            let ticks = value
                .as_u64()
                .ok_or_else(|| MalformedInput::whole("ticks must be a non-negative integer"))?;
            Some(u32::try_from(ticks).unwrap_or(u32::MAX))
        }
    };
    match map.remove("events") {
        Some(Value::Array(entries)) => Ok((entries, declared)),
        _ => Err(MalformedInput::whole("events must be an array")),
    }
}

fn read_frame(entry: &Value) -> Option<u32> {
    let frame = entry.get("frame")?.as_u64()?;
    if frame == 0 {
        return None;
    }
    Some(u32::try_from(frame).unwrap_or(u32::MAX))
}

/// Render events into the framed envelope accepted by [`decode`].
///
/// # Errors
///
/// Returns a serialization error if an event cannot be encoded.
pub fn encode<E: Serialize>(events: &[E], ticks: Option<u32>) -> Result<String, serde_json::Error> {
    #[derive(Serialize)]
    struct Framed<'a, E> {
        #[serde(skip_serializing_if = "Option::is_none")]
        ticks: Option<u32>,
        events: &'a [E],
    }
    serde_json::to_string(&Framed { ticks, events })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Probe {
        frame: u32,
        level: i64,
    }

    impl TraceEvent for Probe {
        fn frame(&self) -> u32 {
            self.frame
        }

        fn check_bounds(&self) -> Result<(), String> {
            if (0..=9).contains(&self.level) {
                Ok(())
            } else {
                Err(format!("level {} outside 0..=9", self.level))
            }
        }
    }

    fn limits() -> TraceLimits {
        TraceLimits {
            max_bytes: 4096,
            max_events: 4,
            max_ticks: 100,
        }
    }

    #[test]
    fn decodes_bare_and_framed_envelopes() {
        let bare: InputTrace<Probe> =
            decode(r#"[{"frame":1,"level":2},{"frame":5,"level":3}]"#, &limits()).unwrap();
        assert_eq!(bare.len(), 2);
        assert_eq!(bare.extent(), 5);

        let framed: InputTrace<Probe> =
            decode(r#"{"ticks":40,"events":[{"frame":3,"level":0}]}"#, &limits()).unwrap();
        assert_eq!(framed.extent(), 40);

        let empty: InputTrace<Probe> = decode("[]", &limits()).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.extent(), 0);
    }

    #[test]
    fn reports_offending_tick() {
        let err = decode::<Probe>(
            r#"[{"frame":1,"level":2},{"frame":7,"level":12}]"#,
            &limits(),
        )
        .unwrap_err();
        assert_eq!(err.tick, Some(7));
        assert_eq!(err.entry, Some(1));

        let err = decode::<Probe>(r#"[{"frame":4,"level":1},{"frame":4,"level":1}]"#, &limits())
            .unwrap_err();
        assert_eq!(err.tick, Some(4));

        let err = decode::<Probe>(r#"[{"frame":2,"level":1},{"level":1}]"#, &limits())
            .unwrap_err();
        assert_eq!(err.entry, Some(1));
        assert_eq!(err.tick, Some(3));

        let err =
            decode::<Probe>(r#"[{"frame":2,"level":1,"extra":true}]"#, &limits()).unwrap_err();
        assert_eq!(err.tick, Some(2));
    }

    #[test]
    fn enforces_ceilings() {
        let many = r#"[{"frame":1,"level":0},{"frame":2,"level":0},{"frame":3,"level":0},{"frame":4,"level":0},{"frame":5,"level":0}]"#;
        let err = decode::<Probe>(many, &limits()).unwrap_err();
        assert_eq!(err.entry, Some(4));
        assert_eq!(err.tick, Some(5));

        let late = r#"[{"frame":101,"level":0}]"#;
        assert_eq!(decode::<Probe>(late, &limits()).unwrap_err().tick, Some(101));

        let long = r#"{"ticks":500,"events":[]}"#;
        assert_eq!(decode::<Probe>(long, &limits()).unwrap_err().tick, Some(500));

        let tight = TraceLimits {
            max_bytes: 4,
            ..limits()
        };
        assert!(decode::<Probe>("[   ]", &tight).is_err());
    }

    #[test]
    fn rejects_bad_envelopes() {
        assert!(decode::<Probe>("nope", &limits()).is_err());
        assert!(decode::<Probe>("42", &limits()).is_err());
        assert!(decode::<Probe>(r#"{"events":{}}"#, &limits()).is_err());
        assert!(decode::<Probe>(r#"{"events":[],"bonus":1}"#, &limits()).is_err());
        assert!(
            decode::<Probe>(r#"{"ticks":1,"events":[{"frame":2,"level":0}]}"#, &limits()).is_err()
        );
    }

    #[test]
    fn cursor_holds_then_goes_neutral() {
        let trace: InputTrace<Probe> = decode(
            r#"{"ticks":4,"events":[{"frame":2,"level":1},{"frame":3,"level":2}]}"#,
            &limits(),
        )
        .unwrap();
        let mut cursor = trace.cursor();
        assert_eq!(cursor.input_for(1), TickInput::Hold);
        assert!(matches!(cursor.input_for(2), TickInput::Event(e) if e.level == 1));
        assert!(matches!(cursor.input_for(3), TickInput::Event(e) if e.level == 2));
        assert_eq!(cursor.input_for(4), TickInput::Hold);
        assert_eq!(cursor.input_for(5), TickInput::Neutral);
    }

    #[test]
    fn encode_round_trips_through_decode() {
        let events = vec![Probe { frame: 3, level: 4 }];
        let text = encode(&events, Some(10)).unwrap();
        let trace: InputTrace<Probe> = decode(&text, &limits()).unwrap();
        assert_eq!(trace.events(), events.as_slice());
        assert_eq!(trace.extent(), 10);
    }
}
