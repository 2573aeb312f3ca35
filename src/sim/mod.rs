//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only, physics constants are per tick
//! - Stable iteration order (authoring order of the level lists)
//! - No rendering or platform dependencies

pub mod block;
pub mod collision;
pub mod enemy;
pub mod level;
pub mod player;
pub mod state;
pub mod tick;

pub use block::{BlockKind, BlockOutcome, BlockState, Platform};
pub use collision::{Penetration, Rect, Side, intersects};
pub use enemy::Enemy;
pub use level::{Level, LevelError, LevelEvent, LevelLayout};
pub use player::{Facing, Player};
pub use state::{Coin, GamePhase, Goal, Particle, ParticleKind, Rules, Session};
pub use tick::{Clock, DeathCause, TickInput, handle_death, tick};
