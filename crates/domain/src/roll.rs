//! Roll resolution engine.
//!
//! Turns a [`SanitizedRollRequest`] plus a stream of die outcomes into a
//! fully-explained [`RollResult`]. The engine is deterministic given the
//! outcomes it consumes; it has no visibility awareness and holds no
//! reference to history.
//!
//! Resolution order:
//!
//! 1. Draw the base pool and count tens, ones and threshold successes.
//! 2. Spend the mitigation budget against ones.
//! 3. If the explosion chain is on, remaining ones first cancel reroll
//!    opportunities one-for-one, then each surviving ten grants a bonus
//!    roll, recursively: a chain ten spawns the next wave. Chain ones are
//!    inert - they neither generate bad luck nor feed back into mitigation.
//! 4. Apply automatic successes, subtract surviving ones, classify.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dice::{DieSource, DIE_FACES};
use crate::request::SanitizedRollRequest;

/// Hard cap on total chain rolls. The chain is almost-surely finite with a
/// fair die; the cap guards against a die source that never stops rolling
/// tens.
pub const MAX_CHAIN_ROLLS: usize = 1000;

/// Classification of a resolved roll, using the table's Polish labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultType {
    /// Bad luck: unmitigated ones outnumber every success.
    #[serde(rename = "PECH")]
    Pech,
    /// At least one success survived.
    #[serde(rename = "SUKCES")]
    Sukces,
    /// No successes, no fumble.
    #[serde(rename = "PORAŻKA")]
    Porazka,
}

/// A fully-explained roll outcome. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollResult {
    pub player_name: String,
    pub hidden: bool,
    pub timestamp: DateTime<Utc>,
    pub dice_count: u8,
    /// Effective difficulty after damage-mode override.
    pub difficulty: u8,
    pub auto_succ: u8,
    /// Base pool outcomes, in roll order.
    pub base_results: Vec<u8>,
    /// Every outcome produced by the explosion chain, in chain order.
    pub reroll_results: Vec<u8>,
    /// Ones surviving mitigation and reroll cancellation.
    pub ones_effective: u32,
    /// Threshold successes from base pool plus chain.
    pub natural_successes: u32,
    /// Successes after automatic successes and surviving ones.
    pub final_successes: u32,
    /// Ones that outlived every success. Always 0 in damage mode.
    pub leftover_bad_luck: u32,
    pub result_type: ResultType,
    pub damage_mode: bool,
}

/// Resolve a sanitized roll request against a die source.
pub fn resolve(req: &SanitizedRollRequest, dice: &dyn DieSource) -> RollResult {
    let base_results = dice.roll_set(req.dice_count as usize);
    let tens = count(&base_results, |v| v == DIE_FACES);
    let ones = count(&base_results, |v| v == 1);
    let succ_base = count(&base_results, |v| v >= req.difficulty);

    let mitigated = req.mitigate_ones.min(ones);
    let mut ones_effective = ones - mitigated;

    let mut reroll_results = Vec::new();
    let mut succ_rerolls = 0u32;
    if req.reroll_explode {
        // Ones cancel reroll opportunities before the chain can compound.
        let cancelled = tens.min(ones_effective);
        ones_effective -= cancelled;

        let mut pending = tens - cancelled;
        while pending > 0 && reroll_results.len() < MAX_CHAIN_ROLLS {
            let mut next_wave = 0;
            for _ in 0..pending {
                if reroll_results.len() >= MAX_CHAIN_ROLLS {
                    break;
                }
                let outcome = dice.roll_die();
                reroll_results.push(outcome);
                if outcome >= req.difficulty {
                    succ_rerolls += 1;
                }
                if outcome == DIE_FACES {
                    next_wave += 1;
                }
            }
            pending = next_wave;
        }
    }

    let natural_successes = succ_base + succ_rerolls;
    let successes_before_ones = natural_successes + u32::from(req.auto_succ);
    let final_successes = successes_before_ones.saturating_sub(ones_effective);
    let leftover_bad_luck = if req.damage_mode {
        // Damage rolls never fumble, only deal less.
        0
    } else {
        ones_effective.saturating_sub(successes_before_ones)
    };

    let result_type = if !req.damage_mode && leftover_bad_luck > 0 {
        ResultType::Pech
    } else if final_successes > 0 {
        ResultType::Sukces
    } else {
        ResultType::Porazka
    };

    RollResult {
        player_name: req.player_name.clone(),
        hidden: req.hidden,
        timestamp: Utc::now(),
        dice_count: req.dice_count,
        difficulty: req.difficulty,
        auto_succ: req.auto_succ,
        base_results,
        reroll_results,
        ones_effective,
        natural_successes,
        final_successes,
        leftover_bad_luck,
        result_type,
        damage_mode: req.damage_mode,
    }
}

fn count(outcomes: &[u8], pred: impl Fn(u8) -> bool) -> u32 {
    outcomes.iter().copied().filter(|&v| pred(v)).count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;

    fn req(dice_count: u8, difficulty: u8) -> SanitizedRollRequest {
        SanitizedRollRequest {
            player_name: "Gracz".to_string(),
            dice_count,
            difficulty,
            auto_succ: 0,
            reroll_explode: false,
            mitigate_ones: 0,
            hidden: false,
            damage_mode: false,
        }
    }

    #[test]
    fn test_plain_roll_counts_successes_and_ones() {
        // 10 and 6 and 7 meet difficulty 6; the 1 eats one success.
        let dice = ScriptedDice::new(vec![10, 1, 6, 3, 7]);
        let result = resolve(&req(5, 6), &dice);

        assert_eq!(result.base_results, vec![10, 1, 6, 3, 7]);
        assert!(result.reroll_results.is_empty());
        assert_eq!(result.ones_effective, 1);
        assert_eq!(result.natural_successes, 3);
        assert_eq!(result.final_successes, 2);
        assert_eq!(result.leftover_bad_luck, 0);
        assert_eq!(result.result_type, ResultType::Sukces);
    }

    #[test]
    fn test_all_ones_is_a_fumble() {
        let dice = ScriptedDice::constant(1);
        let result = resolve(&req(2, 6), &dice);

        assert_eq!(result.final_successes, 0);
        assert_eq!(result.leftover_bad_luck, 2);
        assert_eq!(result.result_type, ResultType::Pech);
    }

    #[test]
    fn test_no_successes_no_ones_is_a_failure() {
        let dice = ScriptedDice::new(vec![3, 4, 5]);
        let result = resolve(&req(3, 6), &dice);

        assert_eq!(result.final_successes, 0);
        assert_eq!(result.leftover_bad_luck, 0);
        assert_eq!(result.result_type, ResultType::Porazka);
    }

    #[test]
    fn test_explosion_chain_single_wave() {
        // One ten grants one chain roll; the 7 scores but does not chain.
        let dice = ScriptedDice::new(vec![10, 3, 5, 7]);
        let mut request = req(3, 6);
        request.reroll_explode = true;
        let result = resolve(&request, &dice);

        assert_eq!(result.base_results, vec![10, 3, 5]);
        assert_eq!(result.reroll_results, vec![7]);
        assert_eq!(result.natural_successes, 2);
        assert_eq!(result.final_successes, 2);
    }

    #[test]
    fn test_explosion_chain_cascades_until_dry() {
        // Two base tens -> wave of [10, 4] -> wave of [9]. Chain total 3.
        let dice = ScriptedDice::new(vec![10, 10, 2, 10, 4, 9, 2, 2, 2]);
        let mut request = req(3, 6);
        request.reroll_explode = true;
        let result = resolve(&request, &dice);

        assert_eq!(result.base_results, vec![10, 10, 2]);
        assert_eq!(result.reroll_results, vec![10, 4, 9]);
        // Base tens (2) + chain 10 and 9.
        assert_eq!(result.natural_successes, 4);
    }

    #[test]
    fn test_chain_ones_are_inert() {
        // The chain roll of 1 neither scores nor adds bad luck.
        let dice = ScriptedDice::new(vec![10, 6, 1, 2]);
        let mut request = req(2, 6);
        request.reroll_explode = true;
        let result = resolve(&request, &dice);

        assert_eq!(result.reroll_results, vec![1]);
        assert_eq!(result.ones_effective, 0);
        assert_eq!(result.natural_successes, 2);
        assert_eq!(result.leftover_bad_luck, 0);
    }

    #[test]
    fn test_ones_cancel_rerolls_before_the_chain() {
        // One ten, one one: they cancel, so no chain roll happens and the
        // one no longer suppresses successes.
        let dice = ScriptedDice::new(vec![10, 1, 8]);
        let mut request = req(3, 6);
        request.reroll_explode = true;
        let result = resolve(&request, &dice);

        assert!(result.reroll_results.is_empty());
        assert_eq!(result.ones_effective, 0);
        assert_eq!(result.natural_successes, 2);
        assert_eq!(result.final_successes, 2);
        assert_eq!(result.result_type, ResultType::Sukces);
    }

    #[test]
    fn test_mitigation_spends_budget_on_ones() {
        let dice = ScriptedDice::new(vec![1, 1, 1, 7]);
        let mut request = req(4, 6);
        request.mitigate_ones = 2;
        let result = resolve(&request, &dice);

        assert_eq!(result.ones_effective, 1);
        assert_eq!(result.natural_successes, 1);
        assert_eq!(result.final_successes, 0);
        assert_eq!(result.result_type, ResultType::Porazka);
    }

    #[test]
    fn test_auto_successes_are_added_before_ones_subtract() {
        let dice = ScriptedDice::new(vec![1, 1, 3]);
        let mut request = req(3, 6);
        request.auto_succ = 3;
        let result = resolve(&request, &dice);

        // 0 natural + 3 auto - 2 ones = 1.
        assert_eq!(result.final_successes, 1);
        assert_eq!(result.leftover_bad_luck, 0);
        assert_eq!(result.result_type, ResultType::Sukces);
    }

    #[test]
    fn test_damage_mode_never_fumbles() {
        let dice = ScriptedDice::constant(1);
        let mut request = req(5, 6);
        request.damage_mode = true;
        request.reroll_explode = true;
        request.mitigate_ones = crate::request::MITIGATE_ONES_MAX as u32;
        let result = resolve(&request, &dice);

        assert_eq!(result.leftover_bad_luck, 0);
        assert_ne!(result.result_type, ResultType::Pech);
    }

    #[test]
    fn test_chain_terminates_against_always_ten_die() {
        let dice = ScriptedDice::constant(10);
        let mut request = req(5, 6);
        request.reroll_explode = true;
        let result = resolve(&request, &dice);

        assert_eq!(result.reroll_results.len(), MAX_CHAIN_ROLLS);
        assert_eq!(
            result.natural_successes,
            5 + MAX_CHAIN_ROLLS as u32
        );
    }

    #[test]
    fn test_counters_are_consistent() {
        // finalSuccesses = max(0, natural + auto - onesEffective) and the
        // leftover identity, across a spread of scripted pools.
        let scripts: Vec<Vec<u8>> = vec![
            vec![1, 1, 1, 1, 1],
            vec![10, 10, 10, 2, 3],
            vec![5, 6, 7, 8, 9],
            vec![1, 10, 1, 10, 5],
        ];
        for script in scripts {
            let dice = ScriptedDice::new(script);
            let mut request = req(5, 6);
            request.reroll_explode = true;
            request.auto_succ = 1;
            let result = resolve(&request, &dice);

            let before_ones = result.natural_successes + u32::from(result.auto_succ);
            assert_eq!(
                result.final_successes,
                before_ones.saturating_sub(result.ones_effective)
            );
            assert_eq!(
                result.leftover_bad_luck,
                result.ones_effective.saturating_sub(before_ones)
            );
        }
    }

    #[test]
    fn test_result_serializes_with_camel_case_and_labels() {
        let dice = ScriptedDice::new(vec![10, 1, 6, 3, 7]);
        let result = resolve(&req(5, 6), &dice);
        let json = serde_json::to_value(&result).expect("result serializes");

        assert_eq!(json["baseResults"], serde_json::json!([10, 1, 6, 3, 7]));
        assert_eq!(json["finalSuccesses"], 2);
        assert_eq!(json["resultType"], "SUKCES");
        assert!(json.get("redacted").is_none());
    }
}
