//! ECS Components хоста, которые читает/пишет detection
//!
//! Организация по доменам:
//! - movement: команды перемещения и навигация (MovementCommand, NavigationState, Locomotion)
//! - world: маркеры мира (DetectionTarget, Corpse, SmokeVolume, Occluder)
//! - status: статусы агента, которыми управляет хост (TaskActivity, Engagement, Incapacitated)

pub mod movement;
pub mod status;
pub mod world;

pub use movement::*;
pub use status::*;
pub use world::*;
