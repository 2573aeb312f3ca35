//! Pika Run - a side-scrolling platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, session state)
//! - `renderer`: Draw-list construction and the terminal sink
//! - `assets`: Procedural tiles for the fixed sprite set
//! - `hud`: Score/time/lives snapshot for the HUD and menu
//! - `settings`: Player-facing configuration

pub mod assets;
pub mod hud;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use assets::{AssetStore, SpriteName};
pub use hud::HudSnapshot;
pub use settings::{CameraMode, Settings};

/// Game configuration constants
///
/// All physics values are per tick; one tick is `SIM_DT` seconds.
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 5;
    /// Ticks per countdown unit
    pub const TICKS_PER_SECOND: u32 = 60;

    /// Drawing surface
    pub const VIEWPORT_WIDTH: f32 = 800.0;
    pub const VIEWPORT_HEIGHT: f32 = 600.0;
    pub const TILE: f32 = 32.0;

    /// Player
    pub const PLAYER_SIZE: f32 = 32.0;
    pub const PLAYER_SPAWN_X: f32 = 100.0;
    pub const PLAYER_SPAWN_Y: f32 = 400.0;
    pub const WALK_SPEED: f32 = 3.0;
    pub const RUN_SPEED: f32 = 5.0;
    pub const JUMP_IMPULSE: f32 = 12.0;
    pub const GRAVITY: f32 = 0.5;
    pub const PLAYER_TERMINAL_VELOCITY: f32 = 15.0;
    /// Horizontal velocity multiplier when no direction is held
    pub const FRICTION: f32 = 0.8;

    /// Anything whose top passes this y has fallen out of the world
    pub const DEATH_Y: f32 = 600.0;

    /// Enemy
    pub const ENEMY_SIZE: f32 = 32.0;
    pub const ENEMY_PATROL_SPEED: f32 = 1.0;
    pub const ENEMY_TERMINAL_VELOCITY: f32 = 10.0;

    /// Pickups and goal
    pub const COIN_SIZE: f32 = 16.0;
    pub const GOAL_WIDTH: f32 = 32.0;
    pub const GOAL_HEIGHT: f32 = 128.0;

    /// Block bounce (cosmetic draw offset)
    pub const BOUNCE_START: f32 = -10.0;
    pub const BOUNCE_DECAY: f32 = 2.0;

    /// Particles
    pub const PARTICLE_GRAVITY: f32 = 0.4;
    pub const DEBRIS_SIZE: f32 = 8.0;
    pub const DEBRIS_LIFETIME: u32 = 60;
    pub const COIN_POP_SPEED: f32 = 6.0;
    pub const COIN_POP_LIFETIME: u32 = 30;

    /// Stomping
    pub const STOMP_TOLERANCE: f32 = 10.0;
    pub const STOMP_REBOUND: f32 = 8.0;

    /// Scoring
    pub const STOMP_SCORE: u64 = 100;
    pub const COIN_SCORE: u64 = 50;
    pub const BLOCK_COIN_SCORE: u64 = 200;
    pub const BRICK_SCORE: u64 = 50;
    pub const TIME_BONUS_MULTIPLIER: u64 = 10;

    /// Session defaults
    pub const START_TIME: u32 = 400;
    pub const START_LIVES: u8 = 3;
    pub const RESPAWN_INVINCIBILITY_TICKS: u32 = 120;

    /// Camera
    pub const CAMERA_LEAD: f32 = VIEWPORT_WIDTH / 3.0;
    pub const CAMERA_SMOOTHING: f32 = 0.1;
}
