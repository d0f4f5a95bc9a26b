use crate::error::{ProviderError, Result};
use serde::Serialize;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

/// A compiled validation predicate for one protocol step.
///
/// Built from a declarative descriptor by [`create_rule`]. Fields missing from
/// the descriptor stay `None`; a rule built that way is unreliable but never
/// panics or errors when validating. `with` and `equipment` keep whatever JSON
/// value the descriptor holds and must match the action's value exactly.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Rule {
    Rinse {
        target_liquid: Option<Value>,
    },
    TransferVolume {
        equipment: Option<Value>,
        target_volume: Option<f64>,
        tolerance: Option<f64>,
    },
}

impl Rule {
    pub fn kind(&self) -> &'static str {
        match self {
            Rule::Rinse { .. } => "rinse",
            Rule::TransferVolume { .. } => "transfer_volume",
        }
    }

    /// Check one student action against this rule.
    pub fn validate(&self, action: &Value) -> bool {
        match self {
            Rule::Rinse { target_liquid } => {
                str_field(action, "action") == Some("rinse")
                    && field(action, "with") == target_liquid.as_ref()
            }
            Rule::TransferVolume {
                equipment,
                target_volume,
                tolerance,
            } => {
                if str_field(action, "action") != Some("transfer_volume") {
                    return false;
                }
                if field(action, "equipment") != equipment.as_ref() {
                    return false;
                }
                let volume = match action.get("volume_ml") {
                    None => 0.0,
                    Some(v) => match v.as_f64() {
                        Some(n) => n,
                        None => return false,
                    },
                };
                match (target_volume, tolerance) {
                    (Some(target), Some(tol)) => (volume - target).abs() <= *tol,
                    _ => false,
                }
            }
        }
    }
}

fn str_field<'a>(doc: &'a Value, key: &str) -> Option<&'a str> {
    doc.get(key).and_then(Value::as_str)
}

/// `doc[key]`, with an explicit `null` read as absent.
fn field<'a>(doc: &'a Value, key: &str) -> Option<&'a Value> {
    doc.get(key).filter(|v| !v.is_null())
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Compile a validation rule descriptor into a [`Rule`].
///
/// Dispatches on the descriptor's `action` field. Anything other than
/// `rinse` or `transfer_volume` is a configuration error.
pub fn create_rule(descriptor: &Value) -> Result<Rule> {
    match str_field(descriptor, "action") {
        Some("rinse") => Ok(Rule::Rinse {
            target_liquid: field(descriptor, "with").cloned(),
        }),
        Some("transfer_volume") => Ok(Rule::TransferVolume {
            equipment: field(descriptor, "equipment").cloned(),
            target_volume: descriptor.get("volume_ml").and_then(Value::as_f64),
            tolerance: descriptor.get("tolerance").and_then(Value::as_f64),
        }),
        Some(other) => Err(ProviderError::UnknownRuleType(other.to_string())),
        None => Err(ProviderError::UnknownRuleType(match descriptor.get("action") {
            Some(v) => v.to_string(),
            None => "<missing action>".to_string(),
        })),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rinse() -> Rule {
        create_rule(&json!({"action": "rinse", "with": "titrant_solution"})).unwrap()
    }

    fn transfer() -> Rule {
        create_rule(&json!({
            "action": "transfer_volume",
            "equipment": "pipette_25ml",
            "volume_ml": 25.0,
            "tolerance": 0.5
        }))
        .unwrap()
    }

    #[test]
    fn factory_builds_rinse_rule() {
        assert_eq!(
            rinse(),
            Rule::Rinse {
                target_liquid: Some(json!("titrant_solution"))
            }
        );
    }

    #[test]
    fn factory_builds_transfer_rule() {
        assert_eq!(
            transfer(),
            Rule::TransferVolume {
                equipment: Some(json!("pipette_25ml")),
                target_volume: Some(25.0),
                tolerance: Some(0.5),
            }
        );
        assert_eq!(transfer().kind(), "transfer_volume");
    }

    #[test]
    fn factory_rejects_unknown_action() {
        let err = create_rule(&json!({"action": "stir"})).unwrap_err();
        assert!(matches!(err, ProviderError::UnknownRuleType(ref t) if t == "stir"));
    }

    #[test]
    fn factory_rejects_missing_action() {
        let err = create_rule(&json!({"with": "water"})).unwrap_err();
        assert!(matches!(err, ProviderError::UnknownRuleType(_)));
    }

    #[test]
    fn factory_passes_missing_fields_through() {
        let rule = create_rule(&json!({"action": "transfer_volume"})).unwrap();
        assert_eq!(
            rule,
            Rule::TransferVolume {
                equipment: None,
                target_volume: None,
                tolerance: None,
            }
        );
    }

    #[test]
    fn rinse_accepts_matching_liquid() {
        assert!(rinse().validate(&json!({"action": "rinse", "with": "titrant_solution"})));
    }

    #[test]
    fn rinse_rejects_other_combinations() {
        let rule = rinse();
        assert!(!rule.validate(&json!({"action": "rinse", "with": "water"})));
        assert!(!rule.validate(&json!({"action": "rinse", "with": "Titrant_Solution"})));
        assert!(!rule.validate(&json!({"action": "transfer_volume", "with": "titrant_solution"})));
        assert!(!rule.validate(&json!({"action": "rinse"})));
        assert!(!rule.validate(&json!({"with": "titrant_solution"})));
        assert!(!rule.validate(&json!({})));
    }

    #[test]
    fn rinse_compares_non_string_liquids_exactly() {
        let rule = create_rule(&json!({"action": "rinse", "with": 5})).unwrap();
        assert!(rule.validate(&json!({"action": "rinse", "with": 5})));
        assert!(!rule.validate(&json!({"action": "rinse", "with": 6})));
        assert!(!rule.validate(&json!({"action": "rinse", "with": "5"})));
        assert!(!rule.validate(&json!({"action": "rinse"})));
    }

    #[test]
    fn rinse_without_target_accepts_only_missing_liquid() {
        let rule = create_rule(&json!({"action": "rinse", "with": null})).unwrap();
        assert!(rule.validate(&json!({"action": "rinse"})));
        assert!(rule.validate(&json!({"action": "rinse", "with": null})));
        assert!(!rule.validate(&json!({"action": "rinse", "with": 0})));
    }

    #[test]
    fn transfer_compares_non_string_equipment_exactly() {
        let rule = create_rule(&json!({
            "action": "transfer_volume",
            "equipment": ["pipette", 25],
            "volume_ml": 25.0,
            "tolerance": 0.5
        }))
        .unwrap();
        let action = |equipment: Value| {
            json!({"action": "transfer_volume", "equipment": equipment, "volume_ml": 25.0})
        };
        assert!(rule.validate(&action(json!(["pipette", 25]))));
        assert!(!rule.validate(&action(json!(["pipette", 50]))));
        assert!(!rule.validate(&action(json!(true))));
    }

    #[test]
    fn transfer_accepts_within_tolerance() {
        let rule = transfer();
        let action = json!({"action": "transfer_volume", "equipment": "pipette_25ml", "volume_ml": 25.2});
        assert!(rule.validate(&action));
    }

    #[test]
    fn transfer_tolerance_is_inclusive() {
        let rule = transfer();
        for volume in [24.5, 25.5] {
            let action = json!({"action": "transfer_volume", "equipment": "pipette_25ml", "volume_ml": volume});
            assert!(rule.validate(&action), "{volume} sits on the boundary");
        }
        let action = json!({"action": "transfer_volume", "equipment": "pipette_25ml", "volume_ml": 25.75});
        assert!(!rule.validate(&action));
    }

    #[test]
    fn transfer_rejects_wrong_equipment_or_action() {
        let rule = transfer();
        assert!(!rule.validate(&json!({"action": "transfer_volume", "equipment": "burette_50ml", "volume_ml": 25.0})));
        assert!(!rule.validate(&json!({"action": "rinse", "equipment": "pipette_25ml", "volume_ml": 25.0})));
    }

    #[test]
    fn transfer_missing_volume_defaults_to_zero() {
        let action = json!({"action": "transfer_volume", "equipment": "pipette_25ml"});
        assert!(!transfer().validate(&action));

        let near_zero = create_rule(&json!({
            "action": "transfer_volume",
            "equipment": "pipette_25ml",
            "volume_ml": 0.2,
            "tolerance": 0.5
        }))
        .unwrap();
        assert!(near_zero.validate(&action));
    }

    #[test]
    fn transfer_with_incomplete_rule_never_passes() {
        let rule = create_rule(&json!({"action": "transfer_volume", "equipment": "pipette_25ml"})).unwrap();
        let action = json!({"action": "transfer_volume", "equipment": "pipette_25ml", "volume_ml": 25.0});
        assert!(!rule.validate(&action));
    }

    #[test]
    fn transfer_rejects_non_numeric_volume() {
        let action = json!({"action": "transfer_volume", "equipment": "pipette_25ml", "volume_ml": "25"});
        assert!(!transfer().validate(&action));
    }
}
