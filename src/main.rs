//! Pika Run - terminal entry point

use std::collections::HashMap;
use std::io::{BufWriter, Write, stdout};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use crossterm::{
    ExecutableCommand, cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal,
};

use pika_run::renderer::{Renderer, TerminalRenderer, build_frame};
use pika_run::sim::{Clock, Level, Rules, Session, TickInput, tick};
use pika_run::{AssetStore, HudSnapshot, Settings};

/// Target presentation rate (≈60 FPS)
const FRAME: Duration = Duration::from_micros(16_667);

/// Without release events, a fresh press counts as held for this many frames,
/// long enough to cover the OS delay before key repeat starts (≈600 ms)
const FIRST_HOLD_WINDOW: u64 = 40;

/// Without release events, a repeating key counts as held if its last repeat
/// arrived within this many frames
const HOLD_WINDOW: u64 = 8;

#[derive(Debug, Clone, Copy)]
struct KeySeen {
    frame: u64,
    repeating: bool,
}

/// Which keys are down right now.
///
/// Terminals that report release events give exact state: a key is held from
/// `Press` until `Release`. Elsewhere only presses and OS repeats arrive, so a
/// key expires once its events stop.
#[derive(Debug)]
struct HeldKeys {
    seen: HashMap<KeyCode, KeySeen>,
    release_events: bool,
}

impl HeldKeys {
    fn new(release_events: bool) -> Self {
        Self {
            seen: HashMap::new(),
            release_events,
        }
    }

    fn handle(&mut self, code: KeyCode, kind: KeyEventKind, frame: u64) {
        match kind {
            KeyEventKind::Press => {
                // A second press without a release is the OS repeating it
                let repeating = self.seen.contains_key(&code) && !self.release_events;
                self.seen.insert(code, KeySeen { frame, repeating });
            }
            KeyEventKind::Repeat => {
                self.seen.insert(
                    code,
                    KeySeen {
                        frame,
                        repeating: true,
                    },
                );
            }
            KeyEventKind::Release => {
                self.seen.remove(&code);
            }
        }
    }

    fn is_down(&self, key: &KeyCode, frame: u64) -> bool {
        let Some(seen) = self.seen.get(key) else {
            return false;
        };
        if self.release_events {
            return true;
        }
        let window = if seen.repeating {
            HOLD_WINDOW
        } else {
            FIRST_HOLD_WINDOW
        };
        frame.saturating_sub(seen.frame) <= window
    }

    fn any_down(&self, keys: &[KeyCode], frame: u64) -> bool {
        keys.iter().any(|key| self.is_down(key, frame))
    }

    /// Forget keys whose hold window has run out
    fn expire(&mut self, frame: u64) {
        if !self.release_events {
            self.seen.retain(|_, seen| {
                let window = if seen.repeating {
                    HOLD_WINDOW
                } else {
                    FIRST_HOLD_WINDOW
                };
                frame.saturating_sub(seen.frame) <= window
            });
        }
    }
}

/// Map the keys currently held to one tick's input
fn read_input(keys: &HeldKeys, run_modifier: bool, frame: u64) -> TickInput {
    use KeyCode::*;
    TickInput {
        left: keys.any_down(&[Left, Char('a'), Char('A')], frame),
        right: keys.any_down(&[Right, Char('d'), Char('D')], frame),
        jump: keys.any_down(&[Up, Char('z'), Char('Z'), Char(' ')], frame),
        run: run_modifier || keys.any_down(&[Char('x'), Char('X')], frame),
        pause: keys.any_down(&[Char('p'), Char('P'), Esc], frame),
        confirm: keys.any_down(&[Enter], frame),
        insert_coin: keys.any_down(&[Char('c'), Char('C')], frame),
    }
}

fn run<W: Write>(
    renderer: &mut TerminalRenderer<W>,
    session: &mut Session,
    rx: &mpsc::Receiver<Event>,
    release_events: bool,
) -> Result<()> {
    let mut keys = HeldKeys::new(release_events);
    let mut run_modifier = false;
    let mut clock = Clock::new();
    let mut frame: u64 = 0;
    let mut last = Instant::now();

    loop {
        let frame_start = Instant::now();
        frame += 1;
        keys.expire(frame);

        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(KeyEvent {
                    code,
                    kind,
                    modifiers,
                    ..
                }) => {
                    run_modifier = modifiers.contains(KeyModifiers::SHIFT);
                    if kind == KeyEventKind::Press {
                        match code {
                            KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                                return Ok(());
                            }
                            _ => {}
                        }
                    }
                    keys.handle(code, kind, frame);
                }
                Event::Resize(cols, rows) => renderer.resize(cols, rows),
                _ => {}
            }
        }

        let input = read_input(&keys, run_modifier, frame);
        let now = Instant::now();
        let ticks = clock.advance(now.duration_since(last).as_secs_f32());
        last = now;
        for _ in 0..ticks {
            tick(session, &input);
        }

        let hud = HudSnapshot::from_session(session);
        renderer
            .present(&build_frame(session), &hud)
            .context("drawing frame")?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

fn main() -> Result<()> {
    // Logs go to stderr; redirect it (2>pika.log) to read them while playing
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let settings = Settings::load();
    let layout = settings.level_layout()?;
    let level = Level::from_layout(&layout).context("building level")?;
    let mut session = Session::new(level, Rules::from(&settings));

    let assets = AssetStore::generate();
    if !assets.is_ready() {
        bail!("sprite set is incomplete");
    }

    let mut out = BufWriter::new(stdout());
    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Must be asked before the input thread starts consuming events
    let keyboard_enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false);
    if keyboard_enhanced {
        out.execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))?;
    }

    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break;
            }
        }
    });

    let (cols, rows) = terminal::size()?;
    log::info!("Terminal {cols}x{rows}, keyboard enhancement: {keyboard_enhanced}");
    let mut renderer = TerminalRenderer::new(out, assets, cols, rows);

    let result = run(&mut renderer, &mut session, &rx, keyboard_enhanced);

    let mut out = renderer.into_inner();
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    log::info!(
        "Session ended in {} with score {}",
        session.phase.as_str(),
        session.score
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn right_held(keys: &HeldKeys, frames: std::ops::RangeInclusive<u64>) -> Vec<bool> {
        frames.map(|frame| read_input(keys, false, frame).right).collect()
    }

    #[test]
    fn test_release_events_hold_until_release() {
        let mut keys = HeldKeys::new(true);
        keys.handle(KeyCode::Right, KeyEventKind::Press, 1);

        assert!(right_held(&keys, 1..=120).iter().all(|&held| held));

        keys.handle(KeyCode::Right, KeyEventKind::Release, 121);
        assert!(!read_input(&keys, false, 121).right);
    }

    #[test]
    fn test_fresh_press_survives_repeat_delay() {
        let mut keys = HeldKeys::new(false);
        keys.handle(KeyCode::Right, KeyEventKind::Press, 1);

        // No repeat yet after ~500 ms
        assert!(right_held(&keys, 1..=30).iter().all(|&held| held));
        assert!(!read_input(&keys, false, 1 + FIRST_HOLD_WINDOW + 1).right);
    }

    #[test]
    fn test_repeating_key_expires_quickly_after_last_repeat() {
        let mut keys = HeldKeys::new(false);
        keys.handle(KeyCode::Char('d'), KeyEventKind::Press, 1);
        // Classic terminals report OS repeats as further presses
        keys.handle(KeyCode::Char('d'), KeyEventKind::Press, 30);
        keys.handle(KeyCode::Char('d'), KeyEventKind::Press, 33);

        assert!(read_input(&keys, false, 33 + HOLD_WINDOW).right);
        assert!(!read_input(&keys, false, 33 + HOLD_WINDOW + 1).right);
    }

    #[test]
    fn test_expired_key_starts_fresh() {
        let mut keys = HeldKeys::new(false);
        keys.handle(KeyCode::Left, KeyEventKind::Press, 1);
        keys.handle(KeyCode::Left, KeyEventKind::Press, 3);
        keys.expire(100);

        // A new press after expiry gets the long first window again
        keys.handle(KeyCode::Left, KeyEventKind::Press, 100);
        assert!(read_input(&keys, false, 130).left);
    }

    #[test]
    fn test_key_mapping() {
        let mut keys = HeldKeys::new(true);
        for code in [
            KeyCode::Char('z'),
            KeyCode::Char('x'),
            KeyCode::Enter,
            KeyCode::Char('C'),
        ] {
            keys.handle(code, KeyEventKind::Press, 1);
        }

        let input = read_input(&keys, false, 1);
        assert_eq!(
            input,
            TickInput {
                jump: true,
                run: true,
                confirm: true,
                insert_coin: true,
                ..TickInput::default()
            }
        );
        assert!(read_input(&HeldKeys::new(true), true, 1).run);
    }
}
