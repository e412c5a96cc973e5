//! DetectionProfile: per-agent тюнинг детекции
//!
//! Все поля имеют дефолты (`#[serde(default)]`), TOML может переопределять
//! только нужные секции. Значения по умолчанию = тюнинг обычного охранника.
//! Профиль не валидируется: кривые значения = кривое поведение.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{DetectionError, Result};

/// Полный набор параметров одного агента
#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct DetectionProfile {
    pub thresholds: Thresholds,
    pub sensor: SensorTuning,
    pub suspicion: SuspicionTuning,
    pub decay: DecayTuning,
    pub alert: AlertTuning,
    pub behaviour: BehaviourTuning,
}

impl Default for DetectionProfile {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            sensor: SensorTuning::default(),
            suspicion: SuspicionTuning::default(),
            decay: DecayTuning::default(),
            alert: AlertTuning::default(),
            behaviour: BehaviourTuning::default(),
        }
    }
}

impl DetectionProfile {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }
}

/// Загрузить профиль из TOML файла (`data/detection_profiles/*.toml`)
pub fn load_profile(path: impl AsRef<Path>) -> Result<DetectionProfile> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| DetectionError::ProfileIo {
        path: path.to_path_buf(),
        source,
    })?;
    DetectionProfile::from_toml_str(&source)
}

/// Пороги suspicion: Normal [0, aware), Aware [aware, investigate),
/// Investigating [investigate, alert), Alerted [alert, ∞)
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub aware: f32,
    pub investigate: f32,
    pub alert: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            aware: 50.0,
            investigate: 100.0,
            alert: 150.0,
        }
    }
}

/// Прибавки к радиусу (метры) и полным углам конусов (градусы)
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneIncrements {
    pub radius: f32,
    pub primary_angle: f32,
    pub secondary_angle: f32,
}

impl ZoneIncrements {
    pub const ZERO: Self = Self {
        radius: 0.0,
        primary_angle: 0.0,
        secondary_angle: 0.0,
    };
}

/// Множители (< 1) пока агент сам стоит в дыму
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct SmokeFactors {
    pub radius: f32,
    pub primary_angle: f32,
    pub secondary_angle: f32,
}

impl Default for SmokeFactors {
    fn default() -> Self {
        Self {
            radius: 0.3,
            primary_angle: 0.3,
            secondary_angle: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorTuning {
    pub base_radius: f32,
    /// Полный угол узкого (быстрого) конуса
    pub primary_angle: f32,
    /// Полный угол широкого (медленного) конуса
    pub secondary_angle: f32,
    pub aware: ZoneIncrements,
    pub investigating: ZoneIncrements,
    pub alerted: ZoneIncrements,
    /// Permanent buffs (только вне alert window)
    pub buffs: ZoneIncrements,
    pub smoke: SmokeFactors,
}

impl Default for SensorTuning {
    fn default() -> Self {
        Self {
            base_radius: 16.5,
            primary_angle: 65.0,
            secondary_angle: 110.0,
            aware: ZoneIncrements {
                radius: 3.0,
                primary_angle: 15.0,
                secondary_angle: 10.0,
            },
            investigating: ZoneIncrements {
                radius: 6.0,
                primary_angle: 25.0,
                secondary_angle: 20.0,
            },
            alerted: ZoneIncrements {
                radius: 10.0,
                primary_angle: 25.0,
                secondary_angle: 45.0,
            },
            buffs: ZoneIncrements {
                radius: 3.0,
                primary_angle: 15.0,
                secondary_angle: 15.0,
            },
            smoke: SmokeFactors::default(),
        }
    }
}

/// Distance scaling: вблизи rate умножается до `peak_percent`%, на краю радиуса ×1
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct DistanceScaling {
    pub enabled: bool,
    pub peak_percent: f32,
}

impl Default for DistanceScaling {
    fn default() -> Self {
        Self {
            enabled: true,
            peak_percent: 300.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct SuspicionTuning {
    /// suspicion/сек в узком конусе
    pub primary_rate: f32,
    /// suspicion/сек в широком конусе
    pub secondary_rate: f32,
    pub aware_multiplier: f32,
    pub investigating_multiplier: f32,
    pub alerted_multiplier: f32,
    pub buff_multiplier: f32,
    pub corpse_multiplier: f32,
    pub smoke_multiplier: f32,
    pub noise_walk_rate: f32,
    pub noise_run_rate: f32,
    /// Дальше этого расстояния шум не ищем вообще (каждый источник ещё режется своим audible radius)
    pub hearing_radius: f32,
    pub target_scaling: DistanceScaling,
    pub corpse_scaling: DistanceScaling,
    pub smoke_scaling: DistanceScaling,
    pub noise_scaling: DistanceScaling,
}

impl Default for SuspicionTuning {
    fn default() -> Self {
        Self {
            primary_rate: 14.0,
            secondary_rate: 8.0,
            aware_multiplier: 1.1,
            investigating_multiplier: 1.25,
            alerted_multiplier: 1.0,
            buff_multiplier: 1.4,
            corpse_multiplier: 1.4,
            smoke_multiplier: 1.2,
            noise_walk_rate: 18.0,
            noise_run_rate: 42.0,
            hearing_radius: 12.0,
            target_scaling: DistanceScaling::default(),
            corpse_scaling: DistanceScaling::default(),
            smoke_scaling: DistanceScaling {
                enabled: false,
                peak_percent: 100.0,
            },
            noise_scaling: DistanceScaling {
                enabled: true,
                peak_percent: 600.0,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayTuning {
    pub normal_rate: f32,
    /// Сколько секунд вне видимости до полной скорости спада в Normal
    pub normal_ramp_time: f32,
    pub normal_delay: f32,
    pub aware_rate: f32,
    pub aware_delay: f32,
    pub investigating_rate: f32,
    pub investigating_delay: f32,
    pub noise_delay: f32,
}

impl Default for DecayTuning {
    fn default() -> Self {
        Self {
            normal_rate: 8.0,
            normal_ramp_time: 14.0,
            normal_delay: 3.0,
            aware_rate: 8.0,
            aware_delay: 6.0,
            investigating_rate: 5.0,
            investigating_delay: 10.0,
            noise_delay: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertTuning {
    pub window_duration: f32,
    /// На сколько suspicion падает ниже alert порога при естественном окончании окна
    pub nominal_decrement: f32,
    /// Зазор под alert порогом, выше которого дым больше не поднимает suspicion
    pub smoke_ceiling_margin: f32,
    /// Радиус propagation пока окно активно
    pub alert_spread: f32,
    /// Радиус propagation для buffed агента вне окна
    pub buffed_spread: f32,
}

impl Default for AlertTuning {
    fn default() -> Self {
        Self {
            window_duration: 20.0,
            nominal_decrement: 1.0,
            smoke_ceiling_margin: 1.0,
            alert_spread: 21.0,
            buffed_spread: 14.0,
        }
    }
}

/// Прибавки к множителям скорости (movement/rotation) по состоянию
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct StateIncrements {
    pub aware: f32,
    pub investigating: f32,
    pub alerted: f32,
    pub buffed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviourTuning {
    pub investigate_look_interval: f32,
    pub investigate_look_angle: f32,
    pub alert_look_interval: f32,
    pub alert_look_angle: f32,
    /// Градусы/сек при rotation multiplier = 1
    pub base_rotation_speed: f32,
    pub engagement_exit_delay: f32,
    pub movement: StateIncrements,
    pub rotation: StateIncrements,
}

impl Default for BehaviourTuning {
    fn default() -> Self {
        Self {
            investigate_look_interval: 3.0,
            investigate_look_angle: 120.0,
            alert_look_interval: 1.2,
            alert_look_angle: 200.0,
            base_rotation_speed: 120.0,
            engagement_exit_delay: 0.5,
            movement: StateIncrements {
                aware: 0.0,
                investigating: 0.0,
                alerted: 0.7,
                buffed: 0.2,
            },
            rotation: StateIncrements {
                aware: 0.2,
                investigating: 0.5,
                alerted: 0.8,
                buffed: 0.2,
            },
        }
    }
}
