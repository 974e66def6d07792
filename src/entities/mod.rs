//! Entities: the player and enemies as plain components over transforms.

pub mod enemy;
pub mod player;

pub use enemy::{
    spawn_enemy, AiProfile, Enemy, EnemyArchetype, EnemyRegistry, EnemyRegistryPlugin,
};
pub use player::{Player, PlayerStats, StatKind};
