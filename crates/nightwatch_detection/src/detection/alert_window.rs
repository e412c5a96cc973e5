//! Alert window, permanent buffs и instant aggro

use bevy::prelude::*;

use crate::detection::components::DetectionAgent;
use crate::logger;
use crate::profile::DetectionProfile;

/// Результат одного шага окна
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowTick {
    Running { elapsed: f32 },
    /// Окно закончилось естественно: buffs выданы
    Expired,
}

/// Источник мгновенной тревоги
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AggroSource {
    /// Удар в ближнем бою: знаем, где атакующий
    Melee { attacker_position: Vec3 },
    /// Попадание издалека: знаем только, где стоим сами
    Ranged,
}

impl DetectionAgent {
    /// Шаг окна, пока агент Alerted и suspicion на пороге.
    /// Повторное обнаружение таймер не сбрасывает.
    pub fn advance_alert_window(&mut self, profile: &DetectionProfile, delta: f32) -> WindowTick {
        let alert = profile.thresholds.alert;

        self.suspicion = alert;
        self.alert_window.paused = true;
        self.alert_window.active = true;
        self.alert_window.timer += delta;

        if self.alert_window.timer < profile.alert.window_duration {
            return WindowTick::Running {
                elapsed: self.alert_window.timer,
            };
        }

        self.alert_window.paused = false;
        self.alert_window.active = false;
        self.alert_window.timer = 0.0;
        self.suspicion = (alert - profile.alert.nominal_decrement).max(0.0);
        self.has_permanent_buffs = true;

        logger::log(&format!(
            "⏱️ Alert window expired: suspicion {:.1}, permanent buffs granted",
            self.suspicion
        ));
        WindowTick::Expired
    }

    /// Ушли из Alerted посреди окна: окно сгорает без buffs
    pub fn abandon_alert_window(&mut self) {
        self.alert_window.active = false;
        self.alert_window.paused = false;
        self.alert_window.timer = 0.0;
    }

    /// Свежее обнаружение: grace таймеры с нуля, спад не начнётся в этом же tick'е
    pub fn refresh_grace_timers(&mut self) {
        self.out_of_sight_timer = 0.0;
        self.noise_heard_timer = 0.0;
    }

    pub fn instant_aggro(&mut self, profile: &DetectionProfile, source: AggroSource, own_position: Vec3) {
        self.suspicion = profile.thresholds.alert;
        self.refresh_grace_timers();
        self.last_known_target_position = match source {
            AggroSource::Melee { attacker_position } => attacker_position,
            AggroSource::Ranged => own_position,
        };

        logger::log_info(&format!(
            "💥 Instant aggro ({:?}): last known {:?}",
            source, self.last_known_target_position
        ));
    }
}
