use crate::config::{BattleRules, DrawRange, GameConfig, DAMAGE_RANGE, POINTS_RANGE};
use crate::error::GameError;
use crate::levels::{LevelTable, LevelThreshold};

#[test]
fn test_default_rules_match_the_game() {
    let rules = BattleRules::default();
    assert_eq!(rules.starting_health, 100);
    assert_eq!(rules.damage, DrawRange::new(12, 26));
    assert_eq!(rules.points, DrawRange::new(10, 30));
    assert!(rules.validate().is_ok());
    assert!(DAMAGE_RANGE.contains(12) && DAMAGE_RANGE.contains(26));
    assert!(!POINTS_RANGE.contains(31));
}

#[test]
fn test_invalid_rules_rejected() {
    let inverted = BattleRules {
        damage: DrawRange::new(30, 10),
        ..BattleRules::default()
    };
    assert_eq!(inverted.validate(), Err(GameError::InvalidRules));

    let dead_on_arrival = BattleRules {
        starting_health: -5,
        ..BattleRules::default()
    };
    assert_eq!(dead_on_arrival.validate(), Err(GameError::InvalidRules));
}

#[test]
fn test_empty_json_yields_defaults() {
    let config: GameConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, GameConfig::default());
    assert_eq!(LevelTable::new(config.levels).unwrap(), LevelTable::default());
}

#[test]
fn test_json_overrides_only_named_fields() {
    let json = r#"{
        "battle": { "startingHealth": 60, "points": { "min": 1, "max": 2 } },
        "levels": [
            { "level": 1, "xpRequired": 0 },
            { "level": 2, "xpRequired": 50 }
        ]
    }"#;
    let config: GameConfig = serde_json::from_str(json).unwrap();

    assert_eq!(config.battle.starting_health, 60);
    assert_eq!(config.battle.damage, DAMAGE_RANGE);
    assert_eq!(config.battle.points, DrawRange::new(1, 2));
    assert_eq!(
        config.levels,
        vec![LevelThreshold::new(1, 0), LevelThreshold::new(2, 50)]
    );
}

#[test]
fn test_error_serializes_with_type_tag() {
    let json = serde_json::to_string(&GameError::SessionNotFound).unwrap();
    assert_eq!(json, r#"{"type":"sessionNotFound"}"#);
    assert_eq!(GameError::InvalidState.to_string(), "battle is no longer active");
}
