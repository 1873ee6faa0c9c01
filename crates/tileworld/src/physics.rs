use crate::entities::EntityPool;
use crate::player::{Facing, Player};
use crate::tile_index::StaticTile;

/// Movement keys held during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

/// Playable screen area the body is clamped into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenBounds {
    pub width: f32,
    pub height: f32,
    pub tile_size: f32,
}

/// What happened to the player during one physics step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhysicsOutcome {
    pub jumped: bool,
    pub landed: bool,
    pub died: bool,
    pub coins_collected: u32,
}

/// Advances the player body by one tick against the static tiles, then runs
/// the death and pickup checks on the moved body.
///
/// Both axes are tested against boxes displaced from the pre-step position
/// and every overlapping tile rewrites the same `dx`/`dy`, so with several
/// overlaps on one axis the last tile in scan order decides the result.
pub fn step(
    player: &mut Player,
    input: PlayerInput,
    tiles: &[StaticTile],
    entities: &mut EntityPool,
    bounds: ScreenBounds,
) -> PhysicsOutcome {
    let mut outcome = PhysicsOutcome::default();
    if player.is_dead() {
        return outcome;
    }
    let tuning = player.tuning;
    let was_airborne = player.in_jump;

    if input.jump && !player.in_jump {
        player.vel_y = tuning.jump_velocity;
        player.in_jump = true;
        outcome.jumped = true;
    }

    let mut dx = 0.0;
    if input.left {
        dx -= tuning.speed;
        player.facing = Facing::Left;
    }
    if input.right {
        dx += tuning.speed;
        player.facing = Facing::Right;
    }

    player.vel_y = (player.vel_y + tuning.gravity).min(tuning.max_fall_speed);
    let mut dy = player.vel_y;

    let body = player.body;
    let moving_up = player.vel_y < 0.0;
    let moving_down = player.vel_y > 0.0;
    let shifted_x = body.translated(dx, 0.0);
    let shifted_y = body.translated(0.0, dy);
    let top_edge = body.with_height(0.0);

    for tile in tiles {
        if tile.rect.overlaps(&shifted_x) {
            dx = 0.0;
        }
        if tile.rect.overlaps(&shifted_y) {
            if moving_up {
                dy = tile.rect.bottom() - body.top();
                player.vel_y = 0.0;
            } else if moving_down {
                dy = tile.rect.top() - body.bottom();
                player.vel_y = 0.0;
                player.in_jump = false;
            }
        }
        if tile.rect.overlaps(&top_edge) {
            player.in_jump = true;
        }
    }

    let mut moved = body.translated(dx, dy);
    if moved.bottom() > bounds.height {
        moved.y = bounds.height - moved.height;
    }
    moved.x = moved.x.max(0.0).min(bounds.width - bounds.tile_size);
    player.body = moved;
    outcome.landed = was_airborne && !player.in_jump;

    if entities.touches_deadly(&player.body) {
        player.mark_dead();
        outcome.died = true;
    }

    let collected = entities.collect_overlapping(&player.body);
    if collected > 0 {
        player.add_coins(collected);
        outcome.coins_collected = collected;
    }

    outcome
}
