//! Roll requests and the sanitizer.
//!
//! [`RollRequest`] is the untrusted shape participants send over the wire:
//! every field is optional and leniently coerced, so any JSON object
//! deserializes into one. [`sanitize`] is the sole trust boundary - it clamps
//! a raw request into [`SanitizedRollRequest`], the only input the resolution
//! engine accepts. It is a total function: malformed input degrades to the
//! nearest valid value instead of erroring.

use serde::de::{Deserializer, IgnoredAny};
use serde::{Deserialize, Serialize};

/// Allowed dice pool size.
pub const DICE_COUNT_MIN: i64 = 1;
/// Allowed dice pool size.
pub const DICE_COUNT_MAX: i64 = 20;
/// Allowed difficulty threshold.
pub const DIFFICULTY_MIN: i64 = 1;
/// Allowed difficulty threshold.
pub const DIFFICULTY_MAX: i64 = 20;
/// Maximum automatic successes a request may claim.
pub const AUTO_SUCC_MAX: i64 = 5;
/// Upper bound of the bad-luck mitigation budget. Large enough to be
/// effectively unlimited for a 20-die pool.
pub const MITIGATE_ONES_MAX: i64 = 100_000;
/// Difficulty forced by damage mode.
pub const DAMAGE_DIFFICULTY: u8 = 6;
/// Player names are truncated to this many characters.
pub const PLAYER_NAME_MAX_CHARS: usize = 64;

/// Raw roll request as received from a participant. Untrusted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollRequest {
    /// Display label, not a verified identity.
    #[serde(default, deserialize_with = "lenient_string")]
    pub player_name: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub dice_count: i64,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub difficulty: i64,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub auto_succ: i64,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub reroll_explode: bool,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub mitigate_ones: i64,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub hidden: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub damage_mode: bool,
}

/// A roll request inside the engine's valid input domain.
///
/// Invariant: every field is within the clamped ranges documented on the
/// constants above. The resolution engine never re-validates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedRollRequest {
    pub player_name: String,
    pub dice_count: u8,
    pub difficulty: u8,
    pub auto_succ: u8,
    pub reroll_explode: bool,
    pub mitigate_ones: u32,
    pub hidden: bool,
    pub damage_mode: bool,
}

/// Clamp a raw request into the engine's input domain.
///
/// Damage mode overrides three fields: difficulty is fixed to
/// [`DAMAGE_DIFFICULTY`], the explosion chain is always on, and the
/// mitigation budget is maxed out (damage rolls never suffer bad luck).
pub fn sanitize(raw: &RollRequest) -> SanitizedRollRequest {
    let damage_mode = raw.damage_mode;
    SanitizedRollRequest {
        player_name: raw.player_name.chars().take(PLAYER_NAME_MAX_CHARS).collect(),
        dice_count: clamp(raw.dice_count, DICE_COUNT_MIN, DICE_COUNT_MAX) as u8,
        difficulty: if damage_mode {
            DAMAGE_DIFFICULTY
        } else {
            clamp(raw.difficulty, DIFFICULTY_MIN, DIFFICULTY_MAX) as u8
        },
        auto_succ: clamp(raw.auto_succ, 0, AUTO_SUCC_MAX) as u8,
        reroll_explode: damage_mode || raw.reroll_explode,
        mitigate_ones: if damage_mode {
            MITIGATE_ONES_MAX as u32
        } else {
            clamp(raw.mitigate_ones, 0, MITIGATE_ONES_MAX) as u32
        },
        hidden: raw.hidden,
        damage_mode,
    }
}

fn clamp(value: i64, min: i64, max: i64) -> i64 {
    value.max(min).min(max)
}

/// Loosely-typed JSON scalar used by the lenient field deserializers.
///
/// Variant order matters: booleans must be tried before numbers, and the
/// catch-all swallows arrays, objects and null.
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseValue {
    Bool(bool),
    Num(f64),
    Str(String),
    Other(IgnoredAny),
}

fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(match LooseValue::deserialize(deserializer)? {
        LooseValue::Bool(b) => i64::from(b),
        // Saturating cast: NaN -> 0, infinities -> the integer extremes.
        LooseValue::Num(n) => n as i64,
        LooseValue::Str(s) if s.trim().is_empty() => 0,
        LooseValue::Str(s) => s.trim().parse::<f64>().map(|n| n as i64).unwrap_or(0),
        LooseValue::Other(_) => 0,
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match LooseValue::deserialize(deserializer)? {
        LooseValue::Bool(b) => b,
        LooseValue::Num(n) => n != 0.0 && !n.is_nan(),
        LooseValue::Str(s) => !s.is_empty(),
        LooseValue::Other(_) => false,
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match LooseValue::deserialize(deserializer)? {
        LooseValue::Str(s) => s,
        LooseValue::Num(n) => n.to_string(),
        LooseValue::Bool(b) => b.to_string(),
        LooseValue::Other(_) => String::new(),
    })
}
