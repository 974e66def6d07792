//! Camera system
//!
//! A single 2D camera that tracks the player with smoothing and stays
//! clamped to the active area's bounds.

use bevy::prelude::*;

use crate::entities::Player;
use crate::states::GameState;
use crate::world::WorldMap;

/// Plugin for camera management
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraSettings>()
            .add_systems(Startup, spawn_camera)
            .add_systems(
                PostUpdate,
                follow_player.run_if(in_state(GameState::Playing)),
            );
    }
}

/// Global camera settings
#[derive(Resource)]
pub struct CameraSettings {
    /// Camera movement smoothing factor
    pub smoothing: f32,
    /// Half-extent of the view, used for bounds clamping
    pub view_half_extent: Vec2,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            smoothing: 5.0,
            view_half_extent: Vec2::new(400.0, 300.0),
        }
    }
}

/// Marker component for the main 2D game camera
#[derive(Component)]
pub struct MainCamera;

fn spawn_camera(mut commands: Commands) {
    commands.spawn((Camera2d, MainCamera));
}

/// Eases the camera toward the player, clamped to the area rectangle.
fn follow_player(
    mut camera: Query<&mut Transform, (With<MainCamera>, Without<Player>)>,
    player: Query<&Transform, With<Player>>,
    world: Res<WorldMap>,
    settings: Res<CameraSettings>,
    time: Res<Time>,
) {
    let Ok(mut camera_transform) = camera.get_single_mut() else {
        return;
    };
    let Ok(player_transform) = player.get_single() else {
        return;
    };

    let area = world.current();
    let half = settings.view_half_extent;
    let target = player_transform.translation.truncate().clamp(
        half.min(area.size / 2.0),
        (area.size - half).max(area.size / 2.0),
    );

    let current = camera_transform.translation.truncate();
    let eased = current.lerp(target, (settings.smoothing * time.delta_secs()).min(1.0));
    camera_transform.translation = eased.extend(camera_transform.translation.z);
}
