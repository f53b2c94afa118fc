//! Command scripts: JSON files that replay a sequence of editor commands.
//!
//! Element IDs are random, so a script names the elements it creates with
//! `"as": "<handle>"` and refers to them by handle afterwards:
//!
//! ```json
//! {
//!   "steps": [
//!     { "op": "add_event", "track": "pov1", "position": 20, "label": "Inciting incident", "as": "inciting" },
//!     { "op": "connect", "source": "inciting", "target": "reveal" }
//!   ]
//! }
//! ```
//!
//! The tracks a session starts with are pre-bound as `pov1`, `pov2`, ...

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use loom_core::{Command, CommandOutcome, EditorConfig, EditorSession, ElementRef, TrackId};

/// Keys whose string values are element references.
const REFERENCE_KEYS: [&str; 5] = ["track", "event", "source", "target", "point"];

/// A parsed script file.
#[derive(Debug, Deserialize)]
pub struct Script {
    /// Session configuration; defaults apply to missing fields.
    #[serde(default)]
    pub config: EditorConfig,
    /// Commands to apply in order.
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One command in a script, with an optional handle for what it creates.
#[derive(Debug, Deserialize)]
pub struct Step {
    /// Handle to bind the created element to.
    #[serde(rename = "as", default)]
    pub handle: Option<String>,
    /// The command body, still holding handles instead of IDs.
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

/// What happened to one step.
#[derive(Debug, serde::Serialize)]
pub struct StepReport {
    /// One-based step number.
    pub step: usize,
    /// The `op` field as written.
    pub op: String,
    /// True unless the step was rejected.
    pub applied: bool,
    /// Human-readable result.
    pub result: String,
}

/// A session after replaying a script, plus the per-step results.
pub struct Replay {
    /// The resulting session.
    pub session: EditorSession,
    /// One report per step.
    pub reports: Vec<StepReport>,
}

impl Replay {
    /// Number of rejected steps.
    pub fn rejected(&self) -> usize {
        self.reports.iter().filter(|r| !r.applied).count()
    }
}

/// Read and parse a script file.
pub fn load(path: &Path) -> Result<Script, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("invalid script {}: {e}", path.display()))
}

/// Apply every step of a script to a fresh session.
pub fn replay(script: Script) -> Replay {
    let mut session = EditorSession::new(script.config);
    let mut handles: HashMap<String, String> = session
        .graph()
        .tracks()
        .iter()
        .enumerate()
        .map(|(i, t)| (format!("pov{}", i + 1), t.id.0.to_string()))
        .collect();

    let mut reports = Vec::with_capacity(script.steps.len());
    for (index, step) in script.steps.into_iter().enumerate() {
        let op = step
            .body
            .get("op")
            .and_then(Value::as_str)
            .unwrap_or("?")
            .to_string();
        let report = match resolve(step.body, &handles) {
            Ok(command) => {
                let outcome = session.apply(command);
                if let (Some(handle), Some(element)) = (&step.handle, outcome.created()) {
                    handles.insert(handle.clone(), element_uuid(element));
                }
                StepReport {
                    step: index + 1,
                    op,
                    applied: outcome.is_applied(),
                    result: describe(&outcome),
                }
            }
            Err(message) => StepReport {
                step: index + 1,
                op,
                applied: false,
                result: message,
            },
        };
        if !report.applied {
            tracing::info!(step = report.step, op = %report.op, reason = %report.result, "Step rejected");
        }
        reports.push(report);
    }

    Replay { session, reports }
}

fn resolve(body: Map<String, Value>, handles: &HashMap<String, String>) -> Result<Command, String> {
    let mut value = Value::Object(body);
    substitute(&mut value, handles)?;
    serde_json::from_value(value).map_err(|e| format!("invalid command: {e}"))
}

fn substitute(value: &mut Value, handles: &HashMap<String, String>) -> Result<(), String> {
    match value {
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                match field {
                    Value::String(name) if REFERENCE_KEYS.contains(&key.as_str()) => {
                        if let Some(id) = handles.get(name.as_str()) {
                            *name = id.clone();
                        } else if !is_raw_id(name) {
                            return Err(format!("unknown handle \"{name}\""));
                        }
                    }
                    other => substitute(other, handles)?,
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                substitute(item, handles)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn is_raw_id(text: &str) -> bool {
    serde_json::from_value::<TrackId>(Value::String(text.to_string())).is_ok()
}

fn element_uuid(element: ElementRef) -> String {
    match element {
        ElementRef::Track { id } => id.0.to_string(),
        ElementRef::Event { id } => id.0.to_string(),
        ElementRef::Point { id, .. } => id.0.to_string(),
    }
}

fn describe(outcome: &CommandOutcome) -> String {
    match outcome {
        CommandOutcome::Applied => "ok".to_string(),
        CommandOutcome::Created(ElementRef::Track { id }) => format!("created track {id}"),
        CommandOutcome::Created(ElementRef::Event { id }) => format!("created event {id}"),
        CommandOutcome::Created(ElementRef::Point { curve, id }) => {
            format!("created {curve} point {id}")
        }
        CommandOutcome::Rejected(error) => error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Script {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn handles_resolve_to_created_elements() {
        let replay = replay(parse(
            r#"{ "steps": [
                { "op": "add_event", "track": "pov1", "position": 10, "label": "A", "as": "a" },
                { "op": "add_event", "track": "pov2", "position": 30, "label": "B", "as": "b" },
                { "op": "connect", "source": "a", "target": "b" }
            ] }"#,
        ));
        assert_eq!(replay.rejected(), 0);
        assert_eq!(replay.session.graph().connection_count(), 1);
    }

    #[test]
    fn unknown_handle_is_a_rejected_step() {
        let replay = replay(parse(
            r#"{ "steps": [ { "op": "remove_event", "event": "ghost" } ] }"#,
        ));
        assert_eq!(replay.rejected(), 1);
        assert_eq!(replay.reports[0].result, "unknown handle \"ghost\"");
    }

    #[test]
    fn nested_drag_target_is_resolved() {
        let replay = replay(parse(
            r#"{ "steps": [
                { "op": "add_point", "curve": "tension", "position": 50, "intensity": 5, "as": "p" },
                { "op": "begin_drag", "target": { "kind": "point", "curve": "tension", "point": "p" } },
                { "op": "drag_to", "pointer": { "x": -10, "y": 0 }, "surface": { "left": 0, "top": 0, "width": 100, "height": 100 } },
                { "op": "end_drag" }
            ] }"#,
        ));
        assert_eq!(replay.rejected(), 0);
        let path = replay.session.curve(loom_core::CurveKind::Tension).derive_path();
        assert_eq!(path[0].position, 0.0);
        assert_eq!(path[0].intensity, 10.0);
    }

    #[test]
    fn config_block_is_honoured() {
        let replay = replay(parse(r#"{ "config": { "initial_tracks": 3 }, "steps": [] }"#));
        assert_eq!(replay.session.graph().track_count(), 3);
    }

    #[test]
    fn reversed_config_scale_still_clamps() {
        let replay = replay(parse(
            r#"{ "config": { "momentum_scale": { "min": 10, "max": 1 } },
                 "steps": [
                   { "op": "add_point", "curve": "momentum", "position": 50, "intensity": 42 }
                 ] }"#,
        ));
        assert!(replay.reports[0].applied);
        let curve = replay.session.curve(loom_core::CurveKind::Momentum);
        assert_eq!(curve.scale().min, 1.0);
        assert_eq!(curve.points()[0].intensity, 10.0);
    }
}
