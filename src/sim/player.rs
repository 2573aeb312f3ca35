//! The player character: input-driven movement, gravity and platform collision

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Penetration, Rect, Side};
use super::level::Level;
use super::tick::TickInput;
use crate::consts::*;

/// Facing direction (sprite mirroring only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

/// Gravity step: accelerate downward, then clamp to terminal velocity
#[inline]
pub fn apply_gravity(velocity_y: f32) -> f32 {
    (velocity_y + GRAVITY).min(PLAYER_TERMINAL_VELOCITY)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub facing: Facing,
    pub on_ground: bool,
    pub alive: bool,
    pub invincible: bool,
    pub invincible_ticks: u32,
}

impl Default for Player {
    fn default() -> Self {
        Self::new(Vec2::new(PLAYER_SPAWN_X, PLAYER_SPAWN_Y))
    }
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size: Vec2::splat(PLAYER_SIZE),
            facing: Facing::Right,
            on_ground: false,
            alive: true,
            invincible: false,
            invincible_ticks: 0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }

    /// Make the player immune to enemy contact for `ticks` ticks
    pub fn grant_invincibility(&mut self, ticks: u32) {
        if ticks > 0 {
            self.invincible = true;
            self.invincible_ticks = ticks;
        }
    }

    /// Enemy contact. Ignored while invincible.
    pub fn take_damage(&mut self) {
        if !self.invincible {
            self.alive = false;
        }
    }

    /// Advance one tick: input, gravity, integration, platform collision
    pub fn update(&mut self, input: &TickInput, level: &mut Level) {
        if !self.alive {
            return;
        }

        let target_speed = if input.run { RUN_SPEED } else { WALK_SPEED };
        if input.left {
            self.vel.x = -target_speed;
            self.facing = Facing::Left;
        } else if input.right {
            self.vel.x = target_speed;
            self.facing = Facing::Right;
        } else {
            self.vel.x *= FRICTION;
        }

        if input.jump && self.on_ground {
            self.vel.y = -JUMP_IMPULSE;
            self.on_ground = false;
        }

        self.vel.y = apply_gravity(self.vel.y);
        self.pos += self.vel;

        self.on_ground = false;
        self.resolve_platforms(level);

        if self.invincible {
            self.invincible_ticks = self.invincible_ticks.saturating_sub(1);
            if self.invincible_ticks == 0 {
                self.invincible = false;
            }
        }

        if self.pos.y > DEATH_Y {
            self.alive = false;
        }
    }

    /// Resolve against each overlapping platform in list order. Each
    /// resolution sees the position left by the previous one.
    fn resolve_platforms(&mut self, level: &mut Level) {
        for index in 0..level.platforms.len() {
            let platform = &level.platforms[index];
            if !platform.is_solid() {
                continue;
            }
            let block = platform.rect;
            let me = self.rect();
            if !me.intersects(&block) {
                continue;
            }

            let pen = Penetration::between(&me, &block);
            if pen.is_min(Side::Top) && self.vel.y > 0.0 {
                self.pos.y = block.top() - self.size.y;
                self.vel.y = 0.0;
                self.on_ground = true;
            } else if pen.is_min(Side::Bottom) && self.vel.y < 0.0 {
                self.pos.y = block.bottom();
                self.vel.y = 0.0;
                level.strike_block(index);
            } else if pen.is_min(Side::Left) {
                self.pos.x = block.left() - self.size.x;
                self.vel.x = 0.0;
            } else if pen.is_min(Side::Right) {
                self.pos.x = block.right();
                self.vel.x = 0.0;
            }
        }
    }
}
