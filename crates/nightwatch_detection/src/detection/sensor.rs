//! SensorProfile: эффективный радиус и углы конусов + state lookups
//!
//! Всё здесь чистые функции от `DetectionProfile` и флагов агента:
//! без побочных эффектов, повторный вызов даёт тот же результат бит в бит.

use crate::detection::components::{DetectionState, SensorState};
use crate::profile::{DetectionProfile, SensorTuning, StateIncrements, ZoneIncrements};

impl SensorTuning {
    pub fn increments(&self, state: DetectionState) -> ZoneIncrements {
        match state {
            DetectionState::Normal => ZoneIncrements::ZERO,
            DetectionState::Aware => self.aware,
            DetectionState::Investigating => self.investigating,
            DetectionState::Alerted => self.alerted,
        }
    }

    fn buff_increments(&self, sensor: SensorState) -> ZoneIncrements {
        if sensor.buffs_apply() {
            self.buffs
        } else {
            ZoneIncrements::ZERO
        }
    }
}

impl StateIncrements {
    pub fn for_state(&self, state: DetectionState) -> f32 {
        match state {
            DetectionState::Normal => 0.0,
            DetectionState::Aware => self.aware,
            DetectionState::Investigating => self.investigating,
            DetectionState::Alerted => self.alerted,
        }
    }

    /// 1 + state increment (+ buff increment)
    pub fn multiplier(&self, state: DetectionState, has_permanent_buffs: bool) -> f32 {
        let buff = if has_permanent_buffs { self.buffed } else { 0.0 };
        1.0 + self.for_state(state) + buff
    }
}

impl DetectionProfile {
    pub fn effective_radius(&self, sensor: SensorState) -> f32 {
        let tuning = &self.sensor;
        let radius = tuning.base_radius
            + tuning.increments(sensor.state).radius
            + tuning.buff_increments(sensor).radius;

        if sensor.in_smoke {
            radius * tuning.smoke.radius
        } else {
            radius
        }
    }

    /// Полный угол узкого конуса (градусы)
    pub fn primary_angle(&self, sensor: SensorState) -> f32 {
        let tuning = &self.sensor;
        let angle = tuning.primary_angle
            + tuning.increments(sensor.state).primary_angle
            + tuning.buff_increments(sensor).primary_angle;

        if sensor.in_smoke {
            angle * tuning.smoke.primary_angle
        } else {
            angle
        }
    }

    /// Полный угол широкого конуса, никогда не уже узкого
    pub fn secondary_angle(&self, sensor: SensorState) -> f32 {
        let tuning = &self.sensor;
        let angle = tuning.secondary_angle
            + tuning.increments(sensor.state).secondary_angle
            + tuning.buff_increments(sensor).secondary_angle;

        let angle = if sensor.in_smoke {
            angle * tuning.smoke.secondary_angle
        } else {
            angle
        };

        angle.max(self.primary_angle(sensor))
    }

    pub fn primary_half_angle(&self, sensor: SensorState) -> f32 {
        self.primary_angle(sensor) * 0.5
    }

    pub fn secondary_half_angle(&self, sensor: SensorState) -> f32 {
        self.secondary_angle(sensor) * 0.5
    }

    pub fn suspicion_multiplier(&self, state: DetectionState) -> f32 {
        match state {
            DetectionState::Normal => 1.0,
            DetectionState::Aware => self.suspicion.aware_multiplier,
            DetectionState::Investigating => self.suspicion.investigating_multiplier,
            DetectionState::Alerted => self.suspicion.alerted_multiplier,
        }
    }

    /// Сколько секунд вне видимости до начала спада
    pub fn decay_delay(&self, state: DetectionState) -> f32 {
        match state {
            DetectionState::Aware => self.decay.aware_delay,
            DetectionState::Investigating => self.decay.investigating_delay,
            DetectionState::Normal | DetectionState::Alerted => self.decay.normal_delay,
        }
    }

    /// Скорость спада (suspicion/сек). Normal рампится по `out_of_sight_timer`,
    /// Alerted не спадает.
    pub fn decay_rate(&self, state: DetectionState, out_of_sight_timer: f32) -> f32 {
        match state {
            DetectionState::Normal => {
                let ramp = if self.decay.normal_ramp_time > 0.0 {
                    (out_of_sight_timer / self.decay.normal_ramp_time).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                self.decay.normal_rate * ramp
            }
            DetectionState::Aware => self.decay.aware_rate,
            DetectionState::Investigating => self.decay.investigating_rate,
            DetectionState::Alerted => 0.0,
        }
    }

    /// (interval, angle) look-around; None = в этом состоянии не осматривается
    pub fn look_around(&self, state: DetectionState) -> Option<(f32, f32)> {
        let behaviour = &self.behaviour;
        match state {
            DetectionState::Investigating => Some((
                behaviour.investigate_look_interval,
                behaviour.investigate_look_angle,
            )),
            DetectionState::Alerted => Some((behaviour.alert_look_interval, behaviour.alert_look_angle)),
            DetectionState::Normal | DetectionState::Aware => None,
        }
    }

    pub fn spread_radius(&self, alert_window_active: bool) -> f32 {
        if alert_window_active {
            self.alert.alert_spread
        } else {
            self.alert.buffed_spread
        }
    }

    pub fn movement_multiplier(&self, state: DetectionState, has_permanent_buffs: bool) -> f32 {
        self.behaviour.movement.multiplier(state, has_permanent_buffs)
    }

    pub fn rotation_multiplier(&self, state: DetectionState, has_permanent_buffs: bool) -> f32 {
        self.behaviour.rotation.multiplier(state, has_permanent_buffs)
    }
}
