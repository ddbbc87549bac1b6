use crate::game::action::Action;
use crate::knowledge::Hint;
use crate::model::colour::Colour;
use crate::model::rank::Rank;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// The `{name, args}` shape actions travel in between the driver and any
/// external collaborator. Discard/play carry `[slot]`; hint carries
/// `[target, [slots...], "colour"|"value", value]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionWire {
    pub name: String,
    pub args: Value,
}

#[derive(Debug)]
pub enum WireError {
    UnknownAction(String),
    MalformedArgs(&'static str),
    Json(serde_json::Error),
}

impl ActionWire {
    pub fn encode(action: &Action) -> Self {
        match action {
            Action::Discard { slot } => Self {
                name: "discard".to_string(),
                args: json!([slot]),
            },
            Action::Play { slot } => Self {
                name: "play".to_string(),
                args: json!([slot]),
            },
            Action::Hint {
                target,
                slots,
                hint,
            } => {
                let (kind, value) = match hint {
                    Hint::Colour(colour) => ("colour", json!(colour.as_str())),
                    Hint::Value(rank) => ("value", json!(rank.value())),
                };
                Self {
                    name: "hint".to_string(),
                    args: json!([target, slots, kind, value]),
                }
            }
        }
    }

    pub fn decode(&self) -> Result<Action, WireError> {
        match self.name.as_str() {
            "discard" => Ok(Action::Discard {
                slot: single_slot(&self.args)?,
            }),
            "play" => Ok(Action::Play {
                slot: single_slot(&self.args)?,
            }),
            "hint" => decode_hint(&self.args),
            other => Err(WireError::UnknownAction(other.to_string())),
        }
    }

    pub fn to_json(action: &Action) -> serde_json::Result<String> {
        serde_json::to_string(&Self::encode(action))
    }

    pub fn from_json(json: &str) -> Result<Action, WireError> {
        let wire: ActionWire = serde_json::from_str(json).map_err(WireError::Json)?;
        wire.decode()
    }
}

fn single_slot(args: &Value) -> Result<usize, WireError> {
    args.as_array()
        .and_then(|args| args.first())
        .and_then(Value::as_u64)
        .map(|slot| slot as usize)
        .ok_or(WireError::MalformedArgs("expected [slot]"))
}

fn decode_hint(args: &Value) -> Result<Action, WireError> {
    let args = args
        .as_array()
        .filter(|args| args.len() == 4)
        .ok_or(WireError::MalformedArgs("expected 4 hint args"))?;

    let target = args[0]
        .as_u64()
        .ok_or(WireError::MalformedArgs("hint target"))? as usize;

    let slots = args[1]
        .as_array()
        .ok_or(WireError::MalformedArgs("hint slots"))?
        .iter()
        .map(|slot| slot.as_u64().map(|slot| slot as usize))
        .collect::<Option<Vec<_>>>()
        .ok_or(WireError::MalformedArgs("hint slots"))?;

    let hint = match args[2].as_str() {
        Some("colour") => {
            let colour = args[3]
                .as_str()
                .and_then(|raw| raw.parse::<Colour>().ok())
                .ok_or(WireError::MalformedArgs("hint colour"))?;
            Hint::Colour(colour)
        }
        Some("value") => {
            let rank = args[3]
                .as_u64()
                .and_then(|raw| u8::try_from(raw).ok())
                .and_then(Rank::from_value)
                .ok_or(WireError::MalformedArgs("hint value"))?;
            Hint::Value(rank)
        }
        _ => return Err(WireError::MalformedArgs("hint kind")),
    };

    Ok(Action::Hint {
        target,
        slots,
        hint,
    })
}
