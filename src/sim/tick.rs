//! Fixed timestep simulation tick
//!
//! Session state machine plus the ordered per-tick pipeline that ties input,
//! physics, interactions, scoring and camera together.

use serde::{Deserialize, Serialize};

use super::level::LevelEvent;
use super::state::{GamePhase, Session};
use crate::consts::*;
use crate::settings::CameraMode;

/// Input state sampled once per tick (current key state, not events)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    /// Run modifier
    pub run: bool,
    /// Pause toggle
    pub pause: bool,
    /// Start game / resume / return to menu
    pub confirm: bool,
    /// Add a menu credit
    pub insert_coin: bool,
}

impl TickInput {
    /// Buttons that went down since `previous`
    pub fn pressed_since(&self, previous: &TickInput) -> TickInput {
        TickInput {
            left: self.left && !previous.left,
            right: self.right && !previous.right,
            jump: self.jump && !previous.jump,
            run: self.run && !previous.run,
            pause: self.pause && !previous.pause,
            confirm: self.confirm && !previous.confirm,
            insert_coin: self.insert_coin && !previous.insert_coin,
        }
    }
}

/// Why the player died
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    /// Enemy contact or falling out of the world
    Killed,
    /// Countdown reached zero
    Timeout,
}

/// Wall-clock to tick converter for the frame loop
#[derive(Debug, Clone, Default)]
pub struct Clock {
    accumulator: f32,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed elapsed frame time; returns how many ticks to run now
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, 0.1);

        let mut ticks = 0;
        while self.accumulator >= SIM_DT && ticks < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            ticks += 1;
        }
        // Drop backlog we refused to simulate
        if ticks == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        ticks
    }
}

/// Advance the session by one tick
pub fn tick(session: &mut Session, input: &TickInput) {
    let pressed = input.pressed_since(&session.last_input);
    session.last_input = *input;

    match session.phase {
        GamePhase::Menu => {
            if pressed.insert_coin {
                session.menu_credits += 1;
                log::info!("Credit inserted ({} available)", session.menu_credits);
            }
            if pressed.confirm && session.menu_credits > 0 {
                start_game(session);
            }
        }
        GamePhase::Paused => {
            if pressed.pause || pressed.confirm {
                session.phase = GamePhase::Playing;
                log::info!("Resumed");
            }
        }
        GamePhase::GameOver | GamePhase::Win => {
            if pressed.confirm {
                session.phase = GamePhase::Menu;
                session.reset_progress();
                log::info!("Back to menu ({} credits)", session.menu_credits);
            }
        }
        GamePhase::Playing => {
            if pressed.pause {
                session.phase = GamePhase::Paused;
                log::info!("Paused");
                return;
            }
            step(session, input);
        }
    }
}

/// Spend a credit and begin a fresh game
fn start_game(session: &mut Session) {
    session.menu_credits -= 1;
    session.reset_progress();
    session.rebuild_world();
    session.phase = GamePhase::Playing;
    log::info!(
        "Game started: {} lives, {} time, {} credits left",
        session.lives,
        session.time,
        session.menu_credits
    );
}

/// One PLAYING tick. The order of these stages is part of the game rules.
fn step(session: &mut Session, input: &TickInput) {
    // 1. Countdown
    if advance_countdown(session) {
        handle_death(session, DeathCause::Timeout);
        return;
    }

    // 2. Player physics (may strike blocks)
    session.player.update(input, &mut session.level);
    award_level_events(session);

    // 3. Level entities
    session.level.update();

    // 4. Camera
    update_camera(session);

    // 5-7. Interactions
    resolve_enemies(session);
    resolve_coins(session);
    if resolve_goal(session) {
        return;
    }

    // 8. Death
    if !session.player.alive {
        handle_death(session, DeathCause::Killed);
    }
}

/// Returns true when time has just run out
fn advance_countdown(session: &mut Session) -> bool {
    session.second_ticks += 1;
    if session.second_ticks < TICKS_PER_SECOND {
        return false;
    }
    session.second_ticks = 0;
    session.time = session.time.saturating_sub(1);
    session.time == 0
}

fn award_level_events(session: &mut Session) {
    for event in session.level.drain_events() {
        match event {
            LevelEvent::BrickBroken { .. } => {
                session.score += BRICK_SCORE;
            }
            LevelEvent::CoinReleased { .. } => {
                session.coins += 1;
                session.score += BLOCK_COIN_SCORE;
            }
        }
    }
}

/// Horizontal follow camera, clamped to the level
fn update_camera(session: &mut Session) {
    let max_x = (session.level.width - VIEWPORT_WIDTH).max(0.0);
    let target = session.player.pos.x - CAMERA_LEAD;
    let next = match session.rules.camera {
        CameraMode::Smooth => session.camera_x + (target - session.camera_x) * CAMERA_SMOOTHING,
        CameraMode::Instant => target,
    };
    session.camera_x = next.clamp(0.0, max_x);
}

fn resolve_enemies(session: &mut Session) {
    let player = &mut session.player;
    for enemy in session.level.enemies.iter_mut().filter(|e| e.alive) {
        let me = player.rect();
        let them = enemy.rect();
        if !me.intersects(&them) {
            continue;
        }

        let descending = player.vel.y > 0.0;
        if descending && me.bottom() - STOMP_TOLERANCE < them.center_y() {
            enemy.squash();
            player.vel.y = -STOMP_REBOUND;
            session.score += STOMP_SCORE;
            log::debug!("Stomped enemy at x={}", them.pos.x);
        } else {
            player.take_damage();
        }
    }
}

fn resolve_coins(session: &mut Session) {
    let me = session.player.rect();
    for coin in session.level.coins.iter_mut().filter(|c| !c.collected) {
        if me.intersects(&coin.rect) {
            coin.collected = true;
            session.coins += 1;
            session.score += COIN_SCORE;
        }
    }
}

/// Returns true if the goal was reached this tick
fn resolve_goal(session: &mut Session) -> bool {
    let goal = &mut session.level.goal;
    if goal.reached || !session.player.rect().intersects(&goal.rect) {
        return false;
    }

    goal.reached = true;
    let bonus = session.time as u64 * TIME_BONUS_MULTIPLIER;
    session.score += bonus;
    session.phase = GamePhase::Win;
    log::info!("Goal reached: time bonus {}, final score {}", bonus, session.score);
    true
}

/// Lose a life; respawn if any remain, otherwise the game is over
pub fn handle_death(session: &mut Session, cause: DeathCause) {
    session.lives = session.lives.saturating_sub(1);

    if session.lives == 0 {
        session.phase = GamePhase::GameOver;
        log::info!("Game over ({:?}), final score {}", cause, session.score);
        return;
    }

    log::info!("Player died ({:?}), {} lives left", cause, session.lives);
    session.rebuild_world();
    session
        .player
        .grant_invincibility(session.rules.respawn_invincibility_ticks);
    if cause == DeathCause::Timeout {
        session.time = session.rules.time_limit;
        session.second_ticks = 0;
    }
    log::debug!(
        "Respawned at ({}, {})",
        session.player.pos.x,
        session.player.pos.y
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::block::{BlockKind, Platform};
    use crate::sim::enemy::Enemy;
    use crate::sim::level::{Level, LevelLayout};
    use crate::sim::state::{Coin, Goal, Rules};
    use glam::Vec2;
    use proptest::prelude::*;

    const CONFIRM: TickInput = TickInput {
        left: false,
        right: false,
        jump: false,
        run: false,
        pause: false,
        confirm: true,
        insert_coin: false,
    };

    /// 640px floor at y=560 with a far-off goal
    fn flat_level() -> Level {
        let mut level = Level::empty(640.0, 600.0, Goal::new(Vec2::new(10_000.0, 0.0)));
        for i in 0..20 {
            level.platforms.push(Platform::new(
                i as f32 * TILE,
                560.0,
                TILE,
                TILE * 2.0,
                BlockKind::Ground,
            ));
        }
        level
    }

    fn world() -> Level {
        Level::from_layout(&LevelLayout::world_1_1()).unwrap()
    }

    fn start_with(level: Level, rules: Rules) -> Session {
        let mut session = Session::new(level, rules);
        session.menu_credits = 1;
        tick(&mut session, &CONFIRM);
        assert_eq!(session.phase, GamePhase::Playing);
        session
    }

    fn start(level: Level) -> Session {
        start_with(level, Rules::from(&Settings::default()))
    }

    fn stand_at(session: &mut Session, x: f32) {
        session.player.pos = Vec2::new(x, 560.0 - PLAYER_SIZE);
        session.player.on_ground = true;
    }

    #[test]
    fn test_menu_requires_credit() {
        let mut session = Session::new(world(), Rules::from(&Settings::default()));

        tick(&mut session, &CONFIRM);
        assert_eq!(session.phase, GamePhase::Menu);

        let coin = TickInput {
            insert_coin: true,
            ..Default::default()
        };
        tick(&mut session, &coin);
        // Holding the coin key only counts once
        tick(&mut session, &coin);
        assert_eq!(session.menu_credits, 1);
        tick(&mut session, &TickInput::default());
        tick(&mut session, &coin);
        assert_eq!(session.menu_credits, 2);

        tick(&mut session, &CONFIRM);
        assert_eq!(session.phase, GamePhase::Playing);
        assert_eq!(session.menu_credits, 1);
        assert_eq!(session.score, 0);
        assert_eq!(session.lives, START_LIVES);
        assert_eq!(session.time, START_TIME);
        assert_eq!(session.player.pos, Vec2::new(PLAYER_SPAWN_X, PLAYER_SPAWN_Y));
    }

    #[test]
    fn test_pause_freezes_and_resumes() {
        let mut session = start(flat_level());
        stand_at(&mut session, 100.0);
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };

        tick(&mut session, &pause);
        assert_eq!(session.phase, GamePhase::Paused);

        let pos = session.player.pos;
        let time_ticks = session.second_ticks;
        let right = TickInput {
            right: true,
            ..Default::default()
        };
        for _ in 0..30 {
            tick(&mut session, &right);
        }
        assert_eq!(session.player.pos, pos);
        assert_eq!(session.second_ticks, time_ticks);

        tick(&mut session, &pause);
        assert_eq!(session.phase, GamePhase::Playing);
        assert_eq!(session.player.pos, pos);
    }

    #[test]
    fn test_death_with_lives_left_respawns_and_keeps_progress() {
        let mut session = start(world());
        let brick = session
            .level
            .platforms
            .iter()
            .position(|p| p.kind == BlockKind::Brick)
            .unwrap();
        session.level.strike_block(brick);
        session.player.pos = Vec2::new(2000.0, 300.0);
        session.player.alive = false;
        session.lives = 2;
        session.score = 1234;
        session.coins = 5;
        session.time = 321;

        handle_death(&mut session, DeathCause::Killed);

        assert_eq!(session.lives, 1);
        assert_eq!(session.phase, GamePhase::Playing);
        assert_eq!(session.score, 1234);
        assert_eq!(session.coins, 5);
        assert_eq!(session.time, 321);
        assert!(session.player.alive);
        assert!(session.player.invincible);
        assert_eq!(session.player.pos, Vec2::new(PLAYER_SPAWN_X, PLAYER_SPAWN_Y));
        assert!(!session.level.platforms[brick].broken);
        assert!(session.level.particles.is_empty());
        assert_eq!(session.camera_x, 0.0);
    }

    #[test]
    fn test_death_on_last_life_is_game_over() {
        let mut session = start(world());
        session.player.alive = false;
        session.lives = 1;

        handle_death(&mut session, DeathCause::Killed);

        assert_eq!(session.lives, 0);
        assert_eq!(session.phase, GamePhase::GameOver);

        // Ticks no longer advance anything until confirm
        session.score = 1200;
        session.coins = 4;
        tick(&mut session, &TickInput::default());
        assert_eq!(session.phase, GamePhase::GameOver);
        assert_eq!(session.score, 1200);

        // Only credits survive the trip back to the menu
        session.menu_credits = 2;
        tick(&mut session, &CONFIRM);
        assert_eq!(session.phase, GamePhase::Menu);
        assert_eq!(session.menu_credits, 2);
        assert_eq!(session.score, 0);
        assert_eq!(session.coins, 0);
        assert_eq!(session.lives, START_LIVES);
        assert_eq!(session.time, START_TIME);
    }

    #[test]
    fn test_goal_wins_once_with_time_bonus() {
        let mut level = flat_level();
        level.goal = Goal::new(Vec2::new(300.0, 400.0));
        let mut session = start(level);
        session.player.pos = Vec2::new(290.0, 496.0);
        session.score = 500;

        tick(&mut session, &TickInput::default());

        assert_eq!(session.phase, GamePhase::Win);
        assert!(session.level.goal.reached);
        assert_eq!(session.score, 500 + START_TIME as u64 * TIME_BONUS_MULTIPLIER);

        let score = session.score;
        for _ in 0..5 {
            tick(&mut session, &TickInput::default());
        }
        assert_eq!(session.score, score);
        assert_eq!(session.phase, GamePhase::Win);
    }

    #[test]
    fn test_stomp_squashes_enemy_and_rebounds() {
        let mut level = flat_level();
        level.enemies.push(Enemy::new(Vec2::new(300.0, 528.0)));
        let mut session = start(level);
        session.player.pos = Vec2::new(300.0, 500.0);
        session.player.vel.y = 2.0;

        tick(&mut session, &TickInput::default());

        let enemy = &session.level.enemies[0];
        assert!(enemy.squashed);
        assert!(!enemy.alive);
        assert_eq!(session.player.vel.y, -STOMP_REBOUND);
        assert_eq!(session.score, STOMP_SCORE);
        assert!(session.player.alive);
        assert_eq!(session.lives, START_LIVES);
    }

    #[test]
    fn test_side_contact_costs_a_life() {
        let mut level = flat_level();
        level.enemies.push(Enemy::new(Vec2::new(282.0, 528.0)));
        let mut session = start(level);
        stand_at(&mut session, 250.0);

        tick(&mut session, &TickInput::default());

        assert_eq!(session.lives, START_LIVES - 1);
        assert_eq!(session.phase, GamePhase::Playing);
        assert!(session.player.alive);
        assert!(session.player.invincible);
        assert_eq!(session.player.pos, Vec2::new(PLAYER_SPAWN_X, PLAYER_SPAWN_Y));
    }

    #[test]
    fn test_invincible_player_ignores_enemy_contact() {
        let mut level = flat_level();
        level.enemies.push(Enemy::new(Vec2::new(282.0, 528.0)));
        let mut session = start(level);
        stand_at(&mut session, 250.0);
        session.player.grant_invincibility(100);

        tick(&mut session, &TickInput::default());

        assert!(session.player.alive);
        assert_eq!(session.lives, START_LIVES);
        assert!(session.level.enemies[0].alive);
    }

    #[test]
    fn test_coin_collection_is_idempotent() {
        let mut level = flat_level();
        level.coins.push(Coin::new(Vec2::new(300.0, 520.0)));
        let mut session = start(level);
        stand_at(&mut session, 290.0);

        tick(&mut session, &TickInput::default());
        assert!(session.level.coins[0].collected);
        assert_eq!(session.coins, 1);
        assert_eq!(session.score, COIN_SCORE);

        for _ in 0..10 {
            tick(&mut session, &TickInput::default());
        }
        assert_eq!(session.coins, 1);
        assert_eq!(session.score, COIN_SCORE);
    }

    #[test]
    fn test_question_block_awards_coin() {
        let mut session = start(world());
        let index = session
            .level
            .platforms
            .iter()
            .position(|p| p.kind == BlockKind::Question)
            .unwrap();
        let block = session.level.platforms[index].rect;
        session.player.pos = Vec2::new(block.pos.x + 4.0, block.bottom() + 4.0);
        session.player.vel.y = -10.0;

        tick(&mut session, &TickInput::default());

        assert!(!session.level.platforms[index].has_coin);
        assert_eq!(session.coins, 1);
        assert_eq!(session.score, BLOCK_COIN_SCORE);
        assert_eq!(session.player.pos.y, block.bottom());
    }

    #[test]
    fn test_timeout_costs_a_life_and_refills_time() {
        let mut session = start(world());
        session.time = 1;
        session.second_ticks = TICKS_PER_SECOND - 1;

        tick(&mut session, &TickInput::default());

        assert_eq!(session.lives, START_LIVES - 1);
        assert_eq!(session.time, START_TIME);
        assert_eq!(session.phase, GamePhase::Playing);
    }

    #[test]
    fn test_countdown_decrements_once_per_second() {
        let mut session = start(flat_level());
        stand_at(&mut session, 100.0);

        for _ in 0..TICKS_PER_SECOND - 1 {
            tick(&mut session, &TickInput::default());
        }
        assert_eq!(session.time, START_TIME);
        tick(&mut session, &TickInput::default());
        assert_eq!(session.time, START_TIME - 1);
    }

    #[test]
    fn test_instant_camera_leads_and_clamps() {
        let rules = Rules {
            camera: CameraMode::Instant,
            ..Rules::from(&Settings::default())
        };
        let mut session = start_with(world(), rules);

        stand_at(&mut session, 100.0);
        tick(&mut session, &TickInput::default());
        assert_eq!(session.camera_x, 0.0);

        stand_at(&mut session, 3000.0);
        tick(&mut session, &TickInput::default());
        assert_eq!(session.camera_x, 3000.0 - CAMERA_LEAD);

        stand_at(&mut session, 6300.0);
        tick(&mut session, &TickInput::default());
        assert_eq!(session.camera_x, 6400.0 - VIEWPORT_WIDTH);
    }

    #[test]
    fn test_smooth_camera_approaches_target() {
        let mut session = start(world());
        stand_at(&mut session, 3000.0);

        let mut last = session.camera_x;
        for _ in 0..20 {
            tick(&mut session, &TickInput::default());
            assert!(session.camera_x > last);
            assert!(session.camera_x <= 3000.0 - CAMERA_LEAD);
            last = session.camera_x;
        }
    }

    #[test]
    fn test_determinism() {
        let mut a = start(world());
        let mut b = start(world());

        let inputs = [
            TickInput {
                right: true,
                ..Default::default()
            },
            TickInput {
                right: true,
                jump: true,
                ..Default::default()
            },
            TickInput {
                right: true,
                run: true,
                ..Default::default()
            },
            TickInput::default(),
        ];

        for i in 0..600 {
            let input = &inputs[(i / 40) % inputs.len()];
            tick(&mut a, input);
            tick(&mut b, input);
        }

        assert_eq!(a.player.pos, b.player.pos);
        assert_eq!(a.score, b.score);
        assert_eq!(a.lives, b.lives);
        assert_eq!(a.phase, b.phase);
    }

    #[test]
    fn test_clock_caps_substeps() {
        let mut clock = Clock::new();
        assert_eq!(clock.advance(SIM_DT * 0.5), 0);
        assert_eq!(clock.advance(SIM_DT * 0.6), 1);
        assert_eq!(clock.advance(1.0), MAX_SUBSTEPS);
        assert!(clock.advance(0.0) <= 1);
    }

    proptest! {
        #[test]
        fn prop_coin_never_recounted(ticks in 1usize..120, x in 260.0f32..330.0) {
            let mut level = flat_level();
            level.coins.push(Coin::new(Vec2::new(300.0, 520.0)));
            let mut session = start(level);
            stand_at(&mut session, x);

            for _ in 0..ticks {
                tick(&mut session, &TickInput::default());
                prop_assert!(session.coins <= 1);
                prop_assert_eq!(session.score, session.coins as u64 * COIN_SCORE);
            }
        }
    }
}
