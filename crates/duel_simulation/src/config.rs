//! Конфигурация поединка
//!
//! Все параметры боя (арена, физика бойца, атаки, stamina, knockback, комбо)
//! живут в одном `DuelConfig` resource. `Default` = стандартная настройка игры,
//! TOML-файл может переопределить любую секцию (`#[serde(default)]` везде).
//!
//! Длительности в файле задаются в миллисекундах (`*_ms`), в коде читаются
//! через helper-методы, возвращающие `Duration`.

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::combat::combo::{ComboAction, ComboBook, ComboCategory};
use crate::logger::LogLevel;

/// Ошибки загрузки и валидации конфига (до старта матча)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: f32 },

    #[error("combo '{0}' has an empty sequence")]
    EmptySequence(String),

    #[error("combo '{key}' has {len} actions but the history holds at most {max}")]
    SequenceTooLong { key: String, len: usize, max: usize },

    #[error("combo key '{0}' is defined twice")]
    DuplicateId(String),

    #[error("combos '{first}' and '{second}' share the same sequence")]
    DuplicateSequence { first: String, second: String },

    #[error("combo '{key}': {reason}")]
    InvalidCombo { key: String, reason: &'static str },

    #[error("unknown log level '{0}'")]
    UnknownLogLevel(String),
}

fn millis(value: u64) -> Duration {
    Duration::from_millis(value)
}

/// Полная конфигурация поединка
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuelConfig {
    pub arena: ArenaConfig,
    pub fighter: FighterConfig,
    pub attacks: AttacksConfig,
    pub stamina: StaminaConfig,
    pub knockback: KnockbackConfig,
    pub defense: DefenseConfig,
    pub timings: TimingsConfig,
    pub effects: EffectsConfig,
    pub logging: LoggingConfig,
    pub combos: Vec<ComboSpec>,
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            arena: ArenaConfig::default(),
            fighter: FighterConfig::default(),
            attacks: AttacksConfig::default(),
            stamina: StaminaConfig::default(),
            knockback: KnockbackConfig::default(),
            defense: DefenseConfig::default(),
            timings: TimingsConfig::default(),
            effects: EffectsConfig::default(),
            logging: LoggingConfig::default(),
            combos: ComboSpec::defaults(),
        }
    }
}

impl DuelConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: DuelConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Проверка всех численных параметров и таблицы комбо
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("arena.width", self.arena.width),
            ("arena.height", self.arena.height),
            ("fighter.width", self.fighter.width),
            ("fighter.height", self.fighter.height),
            ("fighter.max_health", self.fighter.max_health),
            ("fighter.max_stamina", self.fighter.max_stamina),
            ("attacks.range", self.attacks.range),
        ];
        for (field, value) in positive {
            require(field, value, value.is_finite() && value > 0.0)?;
        }

        let non_negative = [
            ("arena.ground_offset", self.arena.ground_offset),
            ("arena.spawn_margin", self.arena.spawn_margin),
            ("fighter.speed", self.fighter.speed),
            ("fighter.jump_power", self.fighter.jump_power),
            ("fighter.gravity", self.fighter.gravity),
            ("attacks.vertical_inset", self.attacks.vertical_inset),
            ("attacks.punch.damage", self.attacks.punch.damage),
            ("attacks.punch.stamina_cost", self.attacks.punch.stamina_cost),
            ("attacks.punch.knockback", self.attacks.punch.knockback),
            ("attacks.kick.damage", self.attacks.kick.damage),
            ("attacks.kick.stamina_cost", self.attacks.kick.stamina_cost),
            ("attacks.kick.knockback", self.attacks.kick.knockback),
            ("stamina.idle_regen", self.stamina.idle_regen),
            ("stamina.movement_regen", self.stamina.movement_regen),
            ("stamina.defend_drain", self.stamina.defend_drain),
            ("stamina.jump_bonus", self.stamina.jump_bonus),
            ("knockback.base_velocity", self.knockback.base_velocity),
            ("knockback.defense_velocity", self.knockback.defense_velocity),
            ("knockback.hit_lift", self.knockback.hit_lift),
            ("knockback.airborne_lift", self.knockback.airborne_lift),
        ];
        for (field, value) in non_negative {
            require(field, value, value.is_finite() && value >= 0.0)?;
        }

        let friction = self.fighter.friction;
        require("fighter.friction", friction, (0.0..=1.0).contains(&friction))?;

        let reduction = self.defense.damage_reduction;
        require("defense.damage_reduction", reduction, (0.0..=1.0).contains(&reduction))?;

        // Боец обязан помещаться на арене над линией земли
        let floor = self.arena.ground_y();
        require("arena.ground_offset", self.arena.ground_offset, floor >= self.fighter.height)?;
        let spawn_span = 2.0 * self.arena.spawn_margin + 2.0 * self.fighter.width;
        require("arena.spawn_margin", self.arena.spawn_margin, spawn_span <= self.arena.width)?;

        require("stamina.interval_ms", self.stamina.interval_ms as f32, self.stamina.interval_ms > 0)?;
        require("effects.slots", self.effects.slots as f32, self.effects.slots > 0)?;

        LogLevel::parse(&self.logging.level)
            .ok_or_else(|| ConfigError::UnknownLogLevel(self.logging.level.clone()))?;

        ComboBook::from_specs(&self.combos)?;
        Ok(())
    }

    pub fn log_level(&self) -> LogLevel {
        LogLevel::parse(&self.logging.level).unwrap_or(LogLevel::Debug)
    }
}

fn require(field: &'static str, value: f32, ok: bool) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue { field, value })
    }
}

/// Арена: размеры и линия земли (y растёт вниз)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub width: f32,
    pub height: f32,
    /// Высота полосы под землёй (место под UI)
    pub ground_offset: f32,
    /// Отступ точек спавна от краёв арены
    pub spawn_margin: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 600.0,
            ground_offset: 100.0,
            spawn_margin: 200.0,
        }
    }
}

impl ArenaConfig {
    pub fn ground_y(&self) -> f32 {
        self.height - self.ground_offset
    }
}

/// Физика и пулы бойца (единицы: пиксели за тик)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FighterConfig {
    pub width: f32,
    pub height: f32,
    pub max_health: f32,
    pub max_stamina: f32,
    pub speed: f32,
    pub jump_power: f32,
    pub gravity: f32,
    /// Множитель vx за тик без ввода направления
    pub friction: f32,
}

impl Default for FighterConfig {
    fn default() -> Self {
        Self {
            width: 60.0,
            height: 120.0,
            max_health: 100.0,
            max_stamina: 100.0,
            speed: 5.0,
            jump_power: 15.0,
            gravity: 0.8,
            friction: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackSpec {
    pub damage: f32,
    pub stamina_cost: f32,
    pub duration_ms: u64,
    /// Множитель базовой скорости knockback
    pub knockback: f32,
}

impl AttackSpec {
    pub fn duration(&self) -> Duration {
        millis(self.duration_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttacksConfig {
    pub punch: AttackSpec,
    pub kick: AttackSpec,
    /// Дальность зоны удара от края тела
    pub range: f32,
    /// Отступ зоны удара сверху и снизу тела
    pub vertical_inset: f32,
    /// Минимальный интервал между началами атак
    pub rate_limit_ms: u64,
}

impl Default for AttacksConfig {
    fn default() -> Self {
        Self {
            punch: AttackSpec {
                damage: 10.0,
                stamina_cost: 10.0,
                duration_ms: 200,
                knockback: 0.25,
            },
            kick: AttackSpec {
                damage: 15.0,
                stamina_cost: 15.0,
                duration_ms: 300,
                knockback: 0.4,
            },
            range: 80.0,
            vertical_inset: 20.0,
            rate_limit_ms: 100,
        }
    }
}

impl AttacksConfig {
    pub fn rate_limit(&self) -> Duration {
        millis(self.rate_limit_ms)
    }
}

/// Stamina economy: регенерация и расход применяются раз в `interval_ms`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaminaConfig {
    pub interval_ms: u64,
    pub idle_regen: f32,
    pub movement_regen: f32,
    pub defend_drain: f32,
    pub jump_bonus: f32,
}

impl Default for StaminaConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            idle_regen: 10.0,
            movement_regen: 5.0,
            defend_drain: 10.0,
            jump_bonus: 3.0,
        }
    }
}

impl StaminaConfig {
    pub fn interval(&self) -> Duration {
        millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnockbackConfig {
    /// Базовая горизонтальная скорость, умножается на множитель атаки/комбо
    pub base_velocity: f32,
    /// Фиксированная скорость отброса защищающегося
    pub defense_velocity: f32,
    /// Подброс при попадании по стоящему на земле
    pub hit_lift: f32,
    /// Минимальный подброс при попадании в воздухе
    pub airborne_lift: f32,
}

impl Default for KnockbackConfig {
    fn default() -> Self {
        Self {
            base_velocity: 6.0,
            // 7 px за 1/10 секунды при 60 тиках в секунду
            defense_velocity: 42.0,
            hit_lift: 12.0,
            airborne_lift: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefenseConfig {
    /// Доля урона, которую снимает защита (0.5 = половина)
    pub damage_reduction: f32,
}

impl Default for DefenseConfig {
    fn default() -> Self {
        Self { damage_reduction: 0.5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingsConfig {
    pub hit_reaction_ms: u64,
    pub combo_window_ms: u64,
}

impl Default for TimingsConfig {
    fn default() -> Self {
        Self {
            hit_reaction_ms: 500,
            combo_window_ms: 3500,
        }
    }
}

impl TimingsConfig {
    pub fn hit_reaction(&self) -> Duration {
        millis(self.hit_reaction_ms)
    }

    pub fn combo_window(&self) -> Duration {
        millis(self.combo_window_ms)
    }
}

/// Параметры визуальных эффектов (геометрия, цвета, длительности)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    /// Размер арены эффектов (слоты переиспользуются)
    pub slots: usize,
    pub attack_ms: u64,
    pub hit_ms: u64,
    pub combo_ms: u64,
    pub heal_ms: u64,
    pub attack_size: [f32; 2],
    pub hit_radius: f32,
    pub combo_radius: f32,
    pub heal_radius: f32,
    pub punch_color: String,
    pub kick_color: String,
    pub hit_color: String,
    pub heal_color: String,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            slots: 80,
            attack_ms: 150,
            hit_ms: 200,
            combo_ms: 500,
            heal_ms: 400,
            attack_size: [40.0, 20.0],
            hit_radius: 20.0,
            combo_radius: 50.0,
            heal_radius: 30.0,
            punch_color: "#ff6b6b".to_string(),
            kick_color: "#4ecdc4".to_string(),
            hit_color: "#ff0000".to_string(),
            heal_color: "#2ecc71".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Описание комбо в конфиге (валидируется в `ComboBook::from_specs`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboSpec {
    pub key: String,
    pub name: String,
    pub sequence: Vec<ComboAction>,
    /// Отрицательное значение = лечение владельца
    pub bonus_damage: f32,
    pub stamina_cost: f32,
    pub cooldown_ms: u64,
    #[serde(default = "default_combo_knockback")]
    pub knockback: f32,
    #[serde(default = "default_combo_category")]
    pub category: ComboCategory,
    #[serde(default)]
    pub requires_airborne: bool,
    #[serde(default = "default_combo_color")]
    pub color: String,
}

fn default_combo_knockback() -> f32 {
    1.0
}

fn default_combo_category() -> ComboCategory {
    ComboCategory::Offensive
}

fn default_combo_color() -> String {
    "#ffffff".to_string()
}

impl ComboSpec {
    /// Стандартный набор: два атакующих комбо и одно лечащее
    pub fn defaults() -> Vec<ComboSpec> {
        use ComboAction::{Jump, Kick, Punch};

        vec![
            ComboSpec {
                key: "windStrike".to_string(),
                name: "疾风连击".to_string(),
                sequence: vec![Punch, Punch, Kick],
                bonus_damage: 12.0,
                stamina_cost: 37.5,
                cooldown_ms: 5000,
                knockback: 1.3,
                category: ComboCategory::Offensive,
                requires_airborne: false,
                color: "#3498db".to_string(),
            },
            ComboSpec {
                key: "thunderStrike".to_string(),
                name: "雷霆重击".to_string(),
                sequence: vec![Kick, Kick, Punch],
                bonus_damage: 15.0,
                stamina_cost: 52.5,
                cooldown_ms: 5000,
                knockback: 1.5,
                category: ComboCategory::Offensive,
                requires_airborne: false,
                color: "#FFD700".to_string(),
            },
            ComboSpec {
                key: "healingStrike".to_string(),
                name: "气功疗伤".to_string(),
                sequence: vec![Jump, Punch],
                bonus_damage: -20.0,
                stamina_cost: 20.0,
                cooldown_ms: 4500,
                knockback: 0.0,
                category: ComboCategory::Healing,
                requires_airborne: true,
                color: "#2ecc71".to_string(),
            },
        ]
    }

    pub fn cooldown(&self) -> Duration {
        millis(self.cooldown_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = DuelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.arena.ground_y(), 500.0);
        assert_eq!(config.combos.len(), 3);
    }

    #[test]
    fn test_sample_file_parses() {
        let source = include_str!("../config/duel.toml");
        let config = DuelConfig::from_toml_str(source).expect("sample config must parse");
        assert_eq!(config.attacks.punch.stamina_cost, 10.0);
        assert_eq!(config.combos[0].sequence, vec![ComboAction::Punch, ComboAction::Punch, ComboAction::Kick]);
        assert_eq!(config.log_level(), LogLevel::Info);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = DuelConfig::from_toml_str("[defense]\ndamage_reduction = 0.25\n").unwrap();
        assert_eq!(config.defense.damage_reduction, 0.25);
        assert_eq!(config.fighter, FighterConfig::default());
        assert_eq!(config.combos.len(), 3);
    }

    #[test]
    fn test_unknown_combo_action_is_parse_error() {
        let source = r#"
            [[combos]]
            key = "spin"
            name = "Spin"
            sequence = ["punch", "spin"]
            bonus_damage = 5.0
            stamina_cost = 10.0
            cooldown_ms = 1000
        "#;
        assert!(matches!(DuelConfig::from_toml_str(source), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_invalid_reduction_rejected() {
        let mut config = DuelConfig::default();
        config.defense.damage_reduction = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "defense.damage_reduction", .. })
        ));
    }

    #[test]
    fn test_arena_too_narrow_rejected() {
        let mut config = DuelConfig::default();
        config.arena.width = 300.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "arena.spawn_margin", .. })
        ));
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let mut config = DuelConfig::default();
        config.logging.level = "loud".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::UnknownLogLevel(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = DuelConfig::load("/definitely/not/here/duel.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
