//! HUD/menu surface data

use serde::Serialize;

use crate::sim::{GamePhase, Session};

/// Values the HUD and menu display, already formatted where the HUD wants text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HudSnapshot {
    /// Score, zero-padded to six digits
    pub score: String,
    pub time: u32,
    pub lives: u8,
    pub coins: u32,
    pub menu_credits: u32,
    pub phase: GamePhase,
}

impl HudSnapshot {
    pub fn from_session(session: &Session) -> Self {
        Self {
            score: format!("{:06}", session.score),
            time: session.time,
            lives: session.lives,
            coins: session.coins,
            menu_credits: session.menu_credits,
            phase: session.phase,
        }
    }

    /// One-line status bar
    pub fn status_line(&self) -> String {
        format!(
            "SCORE {}  COINS x{:02}  TIME {:03}  LIVES {}",
            self.score, self.coins, self.time, self.lives
        )
    }

    /// Whether the start command would be accepted
    pub fn can_start(&self) -> bool {
        self.phase == GamePhase::Menu && self.menu_credits > 0
    }
}
