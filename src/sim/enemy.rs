//! Patrolling walker enemy

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::block::Platform;
use super::collision::Rect;
use crate::consts::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub alive: bool,
    pub squashed: bool,
}

impl Enemy {
    /// New walker heading left at patrol speed
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::new(-ENEMY_PATROL_SPEED, 0.0),
            size: Vec2::splat(ENEMY_SIZE),
            alive: true,
            squashed: false,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }

    /// Stomped by the player. Terminal.
    pub fn squash(&mut self) {
        self.squashed = true;
        self.alive = false;
    }

    /// Advance one tick against the static platform list
    pub fn update(&mut self, platforms: &[Platform]) {
        if !self.alive {
            return;
        }

        self.vel.y = (self.vel.y + GRAVITY).min(ENEMY_TERMINAL_VELOCITY);

        // Vertical pass: fall and land
        self.pos.y += self.vel.y;
        if self.vel.y > 0.0 {
            for platform in platforms.iter().filter(|p| p.is_solid()) {
                if self.rect().intersects(&platform.rect) {
                    self.pos.y = platform.rect.top() - self.size.y;
                    self.vel.y = 0.0;
                }
            }
        }

        // Horizontal pass: any contact turns the walker around
        let step_x = self.vel.x;
        self.pos.x += step_x;
        let mut stepped_back = false;
        for platform in platforms.iter().filter(|p| p.is_solid()) {
            if self.vel.x != 0.0 && self.rect().intersects(&platform.rect) {
                if !stepped_back {
                    self.pos.x -= step_x;
                    stepped_back = true;
                }
                self.vel.x = -self.vel.x;
            }
        }

        if self.pos.y > DEATH_Y {
            self.alive = false;
        }
    }
}
