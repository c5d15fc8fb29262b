//! Intent decoding.
//!
//! The external NL parser returns a JSON document: a single step, a
//! multi-step list, or an error it wants relayed. Decoding is done by hand
//! over `serde_json::Value` so malformed documents produce one clear
//! message instead of a serde trace.

use serde_json::Value;

/// One verb with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Mine { block: String, count: u32 },
    Craft { item: String, count: u32 },
    Smelt { item: String, count: u32 },
    Fight { mob: String, radius: f64 },
    Harvest { crop: String, radius: f64 },
    Follow { player: String, distance: f64 },
    Give { player: String, item: String, count: u32 },
    Goto { x: f64, y: f64, z: f64 },
    Respond { message: String },
    LoadBlueprint { file_path: String },
    BuildStructure {
        blueprint: Option<String>,
        position: Option<[i32; 3]>,
    },
    Stop,
    Status,
}

impl Step {
    /// Verb name, for logs and failure reports.
    pub fn verb(&self) -> &'static str {
        match self {
            Step::Mine { .. } => "mine",
            Step::Craft { .. } => "craft",
            Step::Smelt { .. } => "smelt",
            Step::Fight { .. } => "fight",
            Step::Harvest { .. } => "harvest",
            Step::Follow { .. } => "follow",
            Step::Give { .. } => "give",
            Step::Goto { .. } => "goto",
            Step::Respond { .. } => "respond",
            Step::LoadBlueprint { .. } => "load_blueprint",
            Step::BuildStructure { .. } => "build_structure",
            Step::Stop => "stop",
            Step::Status => "status",
        }
    }
}

/// A decoded intent document.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Single(Step),
    Multi(Vec<Step>),
    /// The parser itself failed; relay its message.
    ParserError(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntentError {
    pub message: String,
}

impl std::fmt::Display for IntentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for IntentError {}

fn bad(message: impl Into<String>) -> IntentError {
    IntentError {
        message: message.into(),
    }
}

fn get_str(params: &serde_json::Map<String, Value>, key: &str) -> Result<String, IntentError> {
    params
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| bad(format!("missing or invalid string field `{key}`")))
}

fn get_u32_or(params: &serde_json::Map<String, Value>, key: &str, default: u32) -> u32 {
    params
        .get(key)
        .and_then(Value::as_u64)
        .map(|n| n.min(u32::MAX as u64) as u32)
        .unwrap_or(default)
}

fn get_f64_or(params: &serde_json::Map<String, Value>, key: &str, default: f64) -> f64 {
    params.get(key).and_then(Value::as_f64).unwrap_or(default)
}

fn get_f64(params: &serde_json::Map<String, Value>, key: &str) -> Result<f64, IntentError> {
    params
        .get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| bad(format!("missing or invalid number field `{key}`")))
}

fn decode_step(obj: &serde_json::Map<String, Value>) -> Result<Step, IntentError> {
    let action = obj
        .get("action")
        .and_then(Value::as_str)
        .ok_or_else(|| bad("missing or invalid string field `action`"))?;

    // Parameters arrive either nested under `params` or inline.
    let params = obj
        .get("params")
        .and_then(Value::as_object)
        .unwrap_or(obj);

    let step = match action {
        "mine" => Step::Mine {
            block: get_str(params, "blockType")?,
            count: get_u32_or(params, "count", 1),
        },
        "craft" => Step::Craft {
            item: get_str(params, "itemName")?,
            count: get_u32_or(params, "count", 1),
        },
        "smelt" => Step::Smelt {
            item: get_str(params, "itemName")?,
            count: get_u32_or(params, "count", 1),
        },
        "fight" => Step::Fight {
            mob: get_str(params, "mobType")?,
            radius: get_f64_or(params, "radius", 16.0),
        },
        "harvest" => Step::Harvest {
            crop: get_str(params, "cropType")?,
            radius: get_f64_or(params, "radius", 16.0),
        },
        "follow" => Step::Follow {
            player: get_str(params, "playerName")?,
            distance: get_f64_or(params, "distance", 3.0),
        },
        "give" => Step::Give {
            player: get_str(params, "playerName")?,
            item: get_str(params, "itemName")?,
            count: get_u32_or(params, "count", 1),
        },
        "goto" => Step::Goto {
            x: get_f64(params, "x")?,
            y: get_f64(params, "y")?,
            z: get_f64(params, "z")?,
        },
        "respond" => Step::Respond {
            message: get_str(params, "message")?,
        },
        "load_blueprint" => Step::LoadBlueprint {
            file_path: get_str(params, "filePath")?,
        },
        "build_structure" => {
            let position = params.get("position").and_then(Value::as_array).and_then(|a| {
                if a.len() != 3 {
                    return None;
                }
                let x = a[0].as_i64()?;
                let y = a[1].as_i64()?;
                let z = a[2].as_i64()?;
                Some([x as i32, y as i32, z as i32])
            });
            Step::BuildStructure {
                blueprint: params
                    .get("blueprint")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                position,
            }
        }
        "stop" => Step::Stop,
        "status" => Step::Status,
        other => return Err(bad(format!("unknown action `{other}`"))),
    };
    Ok(step)
}

/// Decode a full intent document.
pub fn decode_intent(value: &Value) -> Result<Intent, IntentError> {
    let obj = value
        .as_object()
        .ok_or_else(|| bad("intent must be a JSON object"))?;

    if let Some(message) = obj.get("error").and_then(Value::as_str) {
        return Ok(Intent::ParserError(message.to_string()));
    }

    if obj.get("is_multistep").and_then(Value::as_bool) == Some(true) {
        let steps = obj
            .get("steps")
            .and_then(Value::as_array)
            .ok_or_else(|| bad("multistep intent is missing `steps`"))?;
        let decoded = steps
            .iter()
            .map(|step| {
                step.as_object()
                    .ok_or_else(|| bad("step must be a JSON object"))
                    .and_then(decode_step)
            })
            .collect::<Result<Vec<_>, _>>()?;
        if decoded.is_empty() {
            return Err(bad("multistep intent has no steps"));
        }
        return Ok(Intent::Multi(decoded));
    }

    decode_step(obj).map(Intent::Single)
}
