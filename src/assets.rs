//! Procedural sprite tiles
//!
//! Every sprite is an 8x8 grid of palette indices expanded to RGB. Nothing is
//! loaded from disk; the store is ready as soon as it is built.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// The fixed sprite set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteName {
    Pikachu,
    Brick,
    Question,
    Ground,
    Pipe,
    Debris,
    Enemy,
    Coin,
    Flag,
}

impl SpriteName {
    pub const ALL: [SpriteName; 9] = [
        SpriteName::Pikachu,
        SpriteName::Brick,
        SpriteName::Question,
        SpriteName::Ground,
        SpriteName::Pipe,
        SpriteName::Debris,
        SpriteName::Enemy,
        SpriteName::Coin,
        SpriteName::Flag,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpriteName::Pikachu => "pikachu",
            SpriteName::Brick => "brick",
            SpriteName::Question => "question",
            SpriteName::Ground => "ground",
            SpriteName::Pipe => "pipe",
            SpriteName::Debris => "debris",
            SpriteName::Enemy => "enemy",
            SpriteName::Coin => "coin",
            SpriteName::Flag => "flag",
        }
    }
}

impl fmt::Display for SpriteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpriteName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SpriteName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| format!("unknown sprite '{s}'"))
    }
}

pub type Rgb = (u8, u8, u8);

/// Side length of every tile, in texels
pub const SPRITE_SIZE: usize = 8;

/// A drawable tile; `None` texels are transparent
#[derive(Debug, Clone)]
pub struct Sprite {
    pub texels: [[Option<Rgb>; SPRITE_SIZE]; SPRITE_SIZE],
}

impl Sprite {
    fn from_rows(rows: [&str; SPRITE_SIZE], palette: &[(char, Rgb)]) -> Self {
        let mut texels = [[None; SPRITE_SIZE]; SPRITE_SIZE];
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().take(SPRITE_SIZE).enumerate() {
                texels[y][x] = palette.iter().find(|(key, _)| *key == ch).map(|(_, rgb)| *rgb);
            }
        }
        Self { texels }
    }

    /// Texel at normalised coordinates (u, v in 0..1)
    pub fn sample(&self, u: f32, v: f32) -> Option<Rgb> {
        let x = ((u * SPRITE_SIZE as f32) as usize).min(SPRITE_SIZE - 1);
        let y = ((v * SPRITE_SIZE as f32) as usize).min(SPRITE_SIZE - 1);
        self.texels[y][x]
    }
}

const YELLOW: Rgb = (248, 208, 48);
const BLACK: Rgb = (16, 16, 16);
const RED: Rgb = (224, 48, 32);
const BROWN: Rgb = (168, 80, 24);
const DARK_BROWN: Rgb = (96, 48, 16);
const TAN: Rgb = (228, 160, 96);
const ORANGE: Rgb = (240, 144, 32);
const GREEN: Rgb = (48, 168, 48);
const DARK_GREEN: Rgb = (16, 96, 16);
const WHITE: Rgb = (248, 248, 248);
const GOLD: Rgb = (252, 188, 60);

fn build(name: SpriteName) -> Sprite {
    match name {
        SpriteName::Pikachu => Sprite::from_rows(
            [
                "k......k", "yk....ky", "yyyyyyyy", "ykyyyyky", "ryyyyyyr", ".yyyyyy.",
                ".yyyyyy.", ".yy..yy.",
            ],
            &[('y', YELLOW), ('k', BLACK), ('r', RED)],
        ),
        SpriteName::Brick => Sprite::from_rows(
            [
                "bbbdbbbd", "bbbdbbbd", "dddddddd", "bdbbbdbb", "bdbbbdbb", "dddddddd",
                "bbbdbbbd", "dddddddd",
            ],
            &[('b', BROWN), ('d', DARK_BROWN)],
        ),
        SpriteName::Question => Sprite::from_rows(
            [
                "oooooooo", "o.kkk..o", "o....k.o", "o...k..o", "o..k...o", "o......o",
                "o..k...o", "oooooooo",
            ],
            &[('o', ORANGE), ('.', GOLD), ('k', DARK_BROWN)],
        ),
        SpriteName::Ground => Sprite::from_rows(
            [
                "tttttttt", "tbbbtbbb", "tbbbtbbb", "dddddddd", "bbtbbbtb", "bbtbbbtb",
                "bbtbbbtb", "dddddddd",
            ],
            &[('t', TAN), ('b', BROWN), ('d', DARK_BROWN)],
        ),
        SpriteName::Pipe => Sprite::from_rows(
            [
                "kggggggk", "kgwggggk", "kgwggddk", "kgwggddk", "kgwggddk", "kgwggddk",
                "kgwggddk", "kggggggk",
            ],
            &[('g', GREEN), ('d', DARK_GREEN), ('w', WHITE), ('k', BLACK)],
        ),
        SpriteName::Debris => Sprite::from_rows(
            [
                ".bbbb...", "bbdbbb..", "bdbbbbb.", "bbbbdbb.", ".bbbbbb.", "..bbdb..",
                "...bb...", "........",
            ],
            &[('b', BROWN), ('d', DARK_BROWN)],
        ),
        SpriteName::Enemy => Sprite::from_rows(
            [
                "..bbbb..", ".bbbbbb.", "bwkbbkwb", "bwkbbkwb", "bbbbbbbb", ".tttttt.",
                "dd....dd", "ddd..ddd",
            ],
            &[('b', BROWN), ('w', WHITE), ('k', BLACK), ('t', TAN), ('d', DARK_BROWN)],
        ),
        SpriteName::Coin => Sprite::from_rows(
            [
                "..gggg..", ".gyyyyg.", "gyywyyyg", "gyywyyyg", "gyywyyyg", "gyyyyyyg",
                ".gyyyyg.", "..gggg..",
            ],
            &[('g', ORANGE), ('y', GOLD), ('w', WHITE)],
        ),
        SpriteName::Flag => Sprite::from_rows(
            [
                "kgggg...", "kgggggg.", "kgggg...", "k.......", "k.......", "k.......",
                "k.......", "kk......",
            ],
            &[('k', DARK_GREEN), ('g', GREEN)],
        ),
    }
}

/// Registry of drawable tiles keyed by sprite name
#[derive(Debug, Clone, Default)]
pub struct AssetStore {
    sprites: HashMap<SpriteName, Sprite>,
}

impl AssetStore {
    /// Empty store; `is_ready` is false until every sprite is registered
    pub fn empty() -> Self {
        Self::default()
    }

    /// Store with every sprite in the fixed set generated
    pub fn generate() -> Self {
        let mut store = Self::empty();
        for name in SpriteName::ALL {
            store.register(name, build(name));
        }
        log::debug!("Generated {} sprites", store.sprites.len());
        store
    }

    pub fn register(&mut self, name: SpriteName, sprite: Sprite) {
        self.sprites.insert(name, sprite);
    }

    /// Whether every sprite in the fixed set is available
    pub fn is_ready(&self) -> bool {
        SpriteName::ALL.iter().all(|name| self.sprites.contains_key(name))
    }

    /// Look up a sprite. Asking for one that was never registered is a bug.
    pub fn get(&self, name: SpriteName) -> &Sprite {
        match self.sprites.get(&name) {
            Some(sprite) => sprite,
            None => panic!("sprite '{name}' was never registered"),
        }
    }
}
