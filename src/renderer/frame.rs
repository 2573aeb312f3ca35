//! Draw-list construction
//!
//! Positions are converted to screen space here (camera applied), so a sink
//! only has to scale and rasterise.

use glam::Vec2;

use crate::assets::SpriteName;
use crate::consts::*;
use crate::sim::{Facing, GamePhase, ParticleKind, Session};

/// Draw layers, in painting order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Platforms,
    Particles,
    Coins,
    Enemies,
    Goal,
    Player,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    /// Sky fill, always first
    Background,
    Sprite {
        layer: Layer,
        sprite: SpriteName,
        /// Screen-space top-left
        pos: Vec2,
        size: Vec2,
        flip_x: bool,
    },
    /// Dimmed overlay with a PAUSED banner, always last
    PauseOverlay,
}

/// One frame's worth of drawing
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub camera_x: f32,
    pub commands: Vec<DrawCmd>,
}

impl Frame {
    fn sprite(
        &mut self,
        layer: Layer,
        sprite: SpriteName,
        world_pos: Vec2,
        size: Vec2,
        flip_x: bool,
    ) {
        let pos = world_pos - Vec2::new(self.camera_x, 0.0);
        // Cull anything fully off-screen horizontally
        if pos.x + size.x <= 0.0 || pos.x >= VIEWPORT_WIDTH {
            return;
        }
        self.commands.push(DrawCmd::Sprite {
            layer,
            sprite,
            pos,
            size,
            flip_x,
        });
    }
}

/// Build the draw list for the current session state
pub fn build_frame(session: &Session) -> Frame {
    let mut frame = Frame {
        camera_x: session.camera_x,
        commands: Vec::with_capacity(256),
    };
    frame.commands.push(DrawCmd::Background);

    let level = &session.level;

    // Platforms tile their sprite every TILE pixels; the last row/column is
    // trimmed so a pipe 2.5 tiles tall does not spill into the ground
    for platform in level.platforms.iter().filter(|p| !p.broken) {
        let origin = platform.draw_pos();
        let sprite = platform.sprite();
        let size = platform.rect.size;
        let mut dy = 0.0;
        while dy < size.y {
            let mut dx = 0.0;
            while dx < size.x {
                let tile = Vec2::new(TILE.min(size.x - dx), TILE.min(size.y - dy));
                let pos = origin + Vec2::new(dx, dy);
                frame.sprite(Layer::Platforms, sprite, pos, tile, false);
                dx += TILE;
            }
            dy += TILE;
        }
    }

    for particle in &level.particles {
        let sprite = match particle.kind {
            ParticleKind::Debris => SpriteName::Debris,
            ParticleKind::CoinPop => SpriteName::Coin,
        };
        let size = Vec2::splat(particle.size);
        frame.sprite(Layer::Particles, sprite, particle.pos, size, false);
    }

    for coin in level.coins.iter().filter(|c| !c.collected) {
        let pos = coin.rect.pos + Vec2::new(0.0, coin.bob_offset());
        frame.sprite(Layer::Coins, SpriteName::Coin, pos, coin.rect.size, false);
    }

    for enemy in level.enemies.iter().filter(|e| e.alive) {
        frame.sprite(Layer::Enemies, SpriteName::Enemy, enemy.pos, enemy.size, false);
    }

    let goal = level.goal.rect;
    frame.sprite(Layer::Goal, SpriteName::Flag, goal.pos, goal.size, false);

    let player = &session.player;
    let blink_off = player.invincible && (player.invincible_ticks / 5) % 2 == 0;
    if !blink_off {
        frame.sprite(
            Layer::Player,
            SpriteName::Pikachu,
            player.pos,
            player.size,
            player.facing == Facing::Left,
        );
    }

    if session.phase == GamePhase::Paused {
        frame.commands.push(DrawCmd::PauseOverlay);
    }
    frame
}
