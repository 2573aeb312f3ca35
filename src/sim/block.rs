//! Static level blocks and their hit-from-below state machine

use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::assets::SpriteName;
use crate::consts::*;

/// Block types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Ground,
    Brick,
    /// Holds one coin until struck
    Question,
    Pipe,
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Ground => "ground",
            BlockKind::Brick => "brick",
            BlockKind::Question => "question",
            BlockKind::Pipe => "pipe",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised block tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBlockKind(pub String);

impl fmt::Display for UnknownBlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown block kind '{}'", self.0)
    }
}

impl std::error::Error for UnknownBlockKind {}

impl FromStr for BlockKind {
    type Err = UnknownBlockKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ground" => Ok(BlockKind::Ground),
            "brick" => Ok(BlockKind::Brick),
            "question" => Ok(BlockKind::Question),
            "pipe" => Ok(BlockKind::Pipe),
            _ => Err(UnknownBlockKind(s.to_string())),
        }
    }
}

/// Derived lifecycle state of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    Intact,
    /// Struck, but with no lasting effect (ground, pipe, empty question)
    Hit,
    /// Brick smashed; occupies no space
    Broken,
    /// Question block whose coin has been released
    Exhausted,
}

/// What striking a block from below produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOutcome {
    Broken,
    CoinReleased,
}

/// A platform tile or block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub rect: Rect,
    pub kind: BlockKind,
    /// One-shot latch: set on the first strike from below
    pub hit: bool,
    pub broken: bool,
    pub has_coin: bool,
    /// Draw-only vertical offset, never part of the collision box
    pub bounce_offset: f32,
}

impl Platform {
    pub fn new(x: f32, y: f32, width: f32, height: f32, kind: BlockKind) -> Self {
        Self {
            rect: Rect::new(x, y, width, height),
            kind,
            hit: false,
            broken: false,
            has_coin: kind == BlockKind::Question,
            bounce_offset: 0.0,
        }
    }

    /// Broken blocks take no part in collision
    #[inline]
    pub fn is_solid(&self) -> bool {
        !self.broken
    }

    /// Strike from below. Fires its side effect at most once per block.
    pub fn strike(&mut self) -> Option<BlockOutcome> {
        if self.hit {
            return None;
        }
        self.hit = true;

        match self.kind {
            BlockKind::Brick => {
                self.broken = true;
                Some(BlockOutcome::Broken)
            }
            BlockKind::Question if self.has_coin => {
                self.has_coin = false;
                self.bounce_offset = BOUNCE_START;
                Some(BlockOutcome::CoinReleased)
            }
            BlockKind::Question | BlockKind::Ground | BlockKind::Pipe => None,
        }
    }

    /// Per-tick bounce decay
    pub fn update(&mut self) {
        if self.bounce_offset < 0.0 {
            self.bounce_offset = (self.bounce_offset + BOUNCE_DECAY).min(0.0);
        } else {
            self.bounce_offset = 0.0;
        }
    }

    pub fn state(&self) -> BlockState {
        match (self.kind, self.hit) {
            (_, false) => BlockState::Intact,
            (BlockKind::Brick, true) if self.broken => BlockState::Broken,
            (BlockKind::Question, true) if !self.has_coin => BlockState::Exhausted,
            (_, true) => BlockState::Hit,
        }
    }

    /// Top-left corner to draw at (includes the bounce offset)
    pub fn draw_pos(&self) -> Vec2 {
        self.rect.pos + Vec2::new(0.0, self.bounce_offset)
    }

    /// Tile used to draw this block; a spent question block looks like brick
    pub fn sprite(&self) -> SpriteName {
        match self.kind {
            BlockKind::Ground => SpriteName::Ground,
            BlockKind::Brick => SpriteName::Brick,
            BlockKind::Question if self.has_coin => SpriteName::Question,
            BlockKind::Question => SpriteName::Brick,
            BlockKind::Pipe => SpriteName::Pipe,
        }
    }
}
