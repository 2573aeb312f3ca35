//! Level: the entity collections and the collision environment
//!
//! A level is built once from a `LevelLayout` (validated up front) and then
//! only mutated through per-tick updates and block strikes.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::block::{BlockKind, BlockOutcome, Platform};
use super::enemy::Enemy;
use super::state::{Coin, Goal, Particle, ParticleKind};
use crate::consts::*;

/// Rejected level layout
#[derive(Debug, Clone, PartialEq)]
pub enum LevelError {
    /// Platform tag outside ground/brick/question/pipe
    UnknownBlockKind { index: usize, kind: String },
    /// Platform with zero or negative width/height
    InvalidPlatformSize { index: usize, width: f32, height: f32 },
    /// Level bounds must be positive
    InvalidBounds { width: f32, height: f32 },
    MissingGoal,
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::UnknownBlockKind { index, kind } => {
                write!(f, "platform {index}: unknown block kind '{kind}'")
            }
            LevelError::InvalidPlatformSize {
                index,
                width,
                height,
            } => write!(f, "platform {index}: invalid size {width}x{height}"),
            LevelError::InvalidBounds { width, height } => {
                write!(f, "invalid level bounds {width}x{height}")
            }
            LevelError::MissingGoal => f.write_str("level has no goal"),
        }
    }
}

impl std::error::Error for LevelError {}

/// Authored platform: position, size and a block tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformDef {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub kind: String,
}

/// Authored point (enemy spawn, coin, goal)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PointDef {
    pub x: f32,
    pub y: f32,
}

impl From<PointDef> for Vec2 {
    fn from(p: PointDef) -> Self {
        Vec2::new(p.x, p.y)
    }
}

/// Level data as authored (or loaded from JSON)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelLayout {
    pub width: f32,
    pub height: f32,
    pub platforms: Vec<PlatformDef>,
    #[serde(default)]
    pub enemies: Vec<PointDef>,
    #[serde(default)]
    pub coins: Vec<PointDef>,
    pub goal: Option<PointDef>,
}

impl LevelLayout {
    fn platform(&mut self, x: f32, y: f32, width: f32, height: f32, kind: BlockKind) {
        self.platforms.push(PlatformDef {
            x,
            y,
            width,
            height,
            kind: kind.as_str().to_string(),
        });
    }

    /// The built-in hand-authored level
    pub fn world_1_1() -> Self {
        use BlockKind::*;

        let mut layout = LevelLayout {
            width: 6400.0,
            height: 600.0,
            ..Default::default()
        };

        // Ground floor, full length
        let mut x = 0.0;
        while x < layout.width {
            layout.platform(x, 560.0, TILE, TILE * 2.0, Ground);
            x += TILE;
        }

        // Starting area
        layout.platform(16.0 * TILE, 400.0, TILE * 3.0, TILE, Brick);

        // Question row
        for (col, kind) in [
            (20, Question),
            (22, Question),
            (23, Question),
            (24, Brick),
            (25, Question),
        ] {
            layout.platform(col as f32 * TILE, 400.0, TILE, TILE, kind);
        }

        // Floating ledges
        layout.platform(30.0 * TILE, 450.0, TILE * 2.0, TILE, Brick);
        layout.platform(34.0 * TILE, 400.0, TILE * 2.0, TILE, Brick);
        layout.platform(38.0 * TILE, 350.0, TILE * 2.0, TILE, Brick);

        // Brick pyramid
        for row in 0..4 {
            for col in 0..(4 - row) {
                layout.platform(
                    (45 + col) as f32 * TILE,
                    560.0 - (row + 1) as f32 * TILE,
                    TILE,
                    TILE,
                    Brick,
                );
            }
        }

        for col in [52, 55, 58] {
            layout.platform(col as f32 * TILE, 400.0, TILE, TILE, Question);
        }

        // Pipes
        layout.platform(65.0 * TILE, 480.0, TILE * 2.0, TILE * 2.5, Pipe);
        layout.platform(75.0 * TILE, 450.0, TILE * 2.0, TILE * 3.5, Pipe);
        layout.platform(85.0 * TILE, 420.0, TILE * 2.0, TILE * 4.5, Pipe);

        // Elevated walkway
        layout.platform(95.0 * TILE, 450.0, TILE * 8.0, TILE, Brick);

        layout.platform(105.0 * TILE, 400.0, TILE, TILE, Question);
        layout.platform(107.0 * TILE, 350.0, TILE, TILE, Question);
        layout.platform(109.0 * TILE, 400.0, TILE, TILE, Question);

        // Staircase up, then down
        for step in 0..8 {
            for h in 0..=step {
                layout.platform(
                    (120 + step) as f32 * TILE,
                    560.0 - (h + 1) as f32 * TILE,
                    TILE,
                    TILE,
                    Brick,
                );
            }
        }
        for step in 0..8 {
            for h in 0..=(7 - step) {
                layout.platform(
                    (128 + step) as f32 * TILE,
                    560.0 - (h + 1) as f32 * TILE,
                    TILE,
                    TILE,
                    Brick,
                );
            }
        }

        for col in [25, 35, 50, 60, 70, 80, 100, 110] {
            layout.enemies.push(PointDef {
                x: col as f32 * TILE,
                y: 500.0,
            });
        }

        let coin = |col: i32, y: f32| PointDef {
            x: col as f32 * TILE + 8.0,
            y,
        };
        layout.coins.extend((30..35).map(|i| coin(i, 350.0)));
        layout.coins.extend((52..60).step_by(3).map(|i| coin(i, 300.0)));
        layout.coins.extend((95..103).map(|i| coin(i, 380.0)));

        layout.goal = Some(PointDef {
            x: 137.0 * TILE,
            y: 432.0,
        });

        layout
    }
}

/// Side effect of a block strike, reported to the session for scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelEvent {
    BrickBroken { index: usize },
    CoinReleased { index: usize },
}

/// A playable level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    pub width: f32,
    pub height: f32,
    /// Static collision list, in authoring order (also draw order)
    pub platforms: Vec<Platform>,
    pub enemies: Vec<Enemy>,
    pub coins: Vec<Coin>,
    pub particles: Vec<Particle>,
    pub goal: Goal,
    #[serde(skip)]
    events: Vec<LevelEvent>,
}

impl Level {
    /// Level with bounds and a goal but no other entities
    pub fn empty(width: f32, height: f32, goal: Goal) -> Self {
        Self {
            width,
            height,
            platforms: Vec::new(),
            enemies: Vec::new(),
            coins: Vec::new(),
            particles: Vec::new(),
            goal,
            events: Vec::new(),
        }
    }

    /// Validate a layout and build the level from it
    pub fn from_layout(layout: &LevelLayout) -> Result<Self, LevelError> {
        if !(layout.width > 0.0 && layout.height > 0.0) {
            return Err(LevelError::InvalidBounds {
                width: layout.width,
                height: layout.height,
            });
        }
        let goal = layout.goal.ok_or(LevelError::MissingGoal)?;
        let mut level = Level::empty(layout.width, layout.height, Goal::new(goal.into()));

        for (index, def) in layout.platforms.iter().enumerate() {
            let kind = def
                .kind
                .parse::<BlockKind>()
                .map_err(|_| LevelError::UnknownBlockKind {
                    index,
                    kind: def.kind.clone(),
                })?;
            if !(def.width > 0.0 && def.height > 0.0) {
                return Err(LevelError::InvalidPlatformSize {
                    index,
                    width: def.width,
                    height: def.height,
                });
            }
            level
                .platforms
                .push(Platform::new(def.x, def.y, def.width, def.height, kind));
        }

        level.enemies = layout.enemies.iter().map(|&p| Enemy::new(p.into())).collect();
        level.coins = layout.coins.iter().map(|&p| Coin::new(p.into())).collect();

        log::debug!(
            "Built level {}x{}: {} platforms, {} enemies, {} coins",
            level.width,
            level.height,
            level.platforms.len(),
            level.enemies.len(),
            level.coins.len()
        );
        Ok(level)
    }

    /// Advance platforms, enemies, coins and particles by one tick
    pub fn update(&mut self) {
        for platform in &mut self.platforms {
            platform.update();
        }
        for enemy in &mut self.enemies {
            enemy.update(&self.platforms);
        }
        for coin in &mut self.coins {
            coin.update();
        }
        for particle in &mut self.particles {
            particle.update();
        }
        self.particles.retain(|p| !p.is_dead());
    }

    /// Strike platform `index` from below and apply its side effects
    pub fn strike_block(&mut self, index: usize) -> Option<BlockOutcome> {
        let platform = self.platforms.get_mut(index)?;
        let outcome = platform.strike()?;
        let rect = platform.rect;

        match outcome {
            BlockOutcome::Broken => {
                log::debug!("Brick {index} broken at ({}, {})", rect.pos.x, rect.pos.y);
                let center = rect.pos + rect.size / 2.0;
                let quarter = rect.size / 4.0;
                for (dx, dy, vx, vy) in [
                    (-1.0, -1.0, -3.0, -8.0),
                    (1.0, -1.0, 3.0, -8.0),
                    (-1.0, 1.0, -2.0, -5.0),
                    (1.0, 1.0, 2.0, -5.0),
                ] {
                    self.particles.push(Particle {
                        kind: ParticleKind::Debris,
                        pos: center + Vec2::new(dx * quarter.x, dy * quarter.y)
                            - Vec2::splat(DEBRIS_SIZE / 2.0),
                        vel: Vec2::new(vx, vy),
                        size: DEBRIS_SIZE,
                        life: DEBRIS_LIFETIME,
                    });
                }
                self.events.push(LevelEvent::BrickBroken { index });
            }
            BlockOutcome::CoinReleased => {
                log::debug!("Question block {index} released its coin");
                self.particles.push(Particle {
                    kind: ParticleKind::CoinPop,
                    pos: Vec2::new(
                        rect.pos.x + (rect.size.x - COIN_SIZE) / 2.0,
                        rect.pos.y - COIN_SIZE,
                    ),
                    vel: Vec2::new(0.0, -COIN_POP_SPEED),
                    size: COIN_SIZE,
                    life: COIN_POP_LIFETIME,
                });
                self.events.push(LevelEvent::CoinReleased { index });
            }
        }
        Some(outcome)
    }

    /// Take the events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<LevelEvent> {
        std::mem::take(&mut self.events)
    }
}
