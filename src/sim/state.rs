//! Session state and the passive level entities
//!
//! Everything the tick function mutates lives in `Session`; there is no
//! global state.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::level::Level;
use super::player::Player;
use super::tick::TickInput;
use crate::consts::*;
use crate::settings::{CameraMode, Settings};

/// Session state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for a credit and a start command
    Menu,
    Playing,
    Paused,
    GameOver,
    Win,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Menu => "MENU",
            GamePhase::Playing => "PLAYING",
            GamePhase::Paused => "PAUSED",
            GamePhase::GameOver => "GAME OVER",
            GamePhase::Win => "WIN",
        }
    }
}

/// Collectible coin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coin {
    pub rect: Rect,
    pub collected: bool,
    /// Animation counter (drives the bob)
    pub frame: u32,
}

impl Coin {
    pub fn new(pos: Vec2) -> Self {
        Self {
            rect: Rect {
                pos,
                size: Vec2::splat(COIN_SIZE),
            },
            collected: false,
            frame: 0,
        }
    }

    pub fn update(&mut self) {
        self.frame = self.frame.wrapping_add(1);
    }

    /// Vertical draw offset for the idle bob
    pub fn bob_offset(&self) -> f32 {
        (self.frame as f32 * 0.1).sin() * 3.0
    }
}

/// Level exit flag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub rect: Rect,
    pub reached: bool,
}

impl Goal {
    pub fn new(pos: Vec2) -> Self {
        Self {
            rect: Rect {
                pos,
                size: Vec2::new(GOAL_WIDTH, GOAL_HEIGHT),
            },
            reached: false,
        }
    }
}

/// What a particle looks like
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    /// Brick fragment
    Debris,
    /// Coin popping out of a question block
    CoinPop,
}

/// Short-lived ballistic effect, never collides
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub kind: ParticleKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    /// Ticks left
    pub life: u32,
}

impl Particle {
    pub fn update(&mut self) {
        self.pos += self.vel;
        self.vel.y += PARTICLE_GRAVITY;
        self.life = self.life.saturating_sub(1);
    }

    pub fn is_dead(&self) -> bool {
        self.life == 0
    }
}

/// Session rules fixed at construction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rules {
    pub camera: CameraMode,
    pub start_lives: u8,
    pub time_limit: u32,
    pub respawn_invincibility_ticks: u32,
}

impl From<&Settings> for Rules {
    fn from(settings: &Settings) -> Self {
        Self {
            camera: settings.camera,
            start_lives: settings.start_lives.max(1),
            time_limit: settings.time_limit.max(1),
            respawn_invincibility_ticks: settings.respawn_invincibility_ticks,
        }
    }
}

/// Complete session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub phase: GamePhase,
    pub score: u64,
    /// Coins collected this session
    pub coins: u32,
    /// Countdown, in seconds
    pub time: u32,
    pub lives: u8,
    /// Credits inserted at the menu; one is spent per game
    pub menu_credits: u32,
    /// Horizontal scroll of the viewport
    pub camera_x: f32,
    pub player: Player,
    pub level: Level,
    pub rules: Rules,
    /// Ticks since the countdown last decremented
    pub(crate) second_ticks: u32,
    /// Previous tick's input, for edge detection
    pub(crate) last_input: TickInput,
    /// Validated level as authored; copied on every (re)start
    pristine_level: Level,
}

impl Session {
    /// New session sitting in the menu with no credits
    pub fn new(level: Level, rules: Rules) -> Self {
        Self {
            phase: GamePhase::Menu,
            score: 0,
            coins: 0,
            time: rules.time_limit,
            lives: rules.start_lives,
            menu_credits: 0,
            camera_x: 0.0,
            player: Player::default(),
            level: level.clone(),
            rules,
            second_ticks: 0,
            last_input: TickInput::default(),
            pristine_level: level,
        }
    }

    /// Rebuild the player at the spawn point and the level as authored
    pub fn rebuild_world(&mut self) {
        self.player = Player::default();
        self.level = self.pristine_level.clone();
        self.camera_x = 0.0;
    }

    /// Reset score, coins, time and lives for a fresh game
    pub fn reset_progress(&mut self) {
        self.score = 0;
        self.coins = 0;
        self.time = self.rules.time_limit;
        self.lives = self.rules.start_lives;
        self.second_ticks = 0;
    }

    /// Whether the simulation advances this tick
    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Playing
    }
}
