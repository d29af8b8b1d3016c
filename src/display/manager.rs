/*
 *  display/manager.rs
 *
 *  PlexRadio - turn it up
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display manager - default screen, single override slot and the render tick
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use crate::display::context::DisplayContext;
use crate::display::drivers::MockDriver;
use crate::display::error::{DisplayError, DisplayFactoryError};
use crate::display::factory::{BoxedDriver, DisplayDriverFactory};
use crate::display::marquee::left;
use crate::display::screens::{BoxedScreen, ScreenKind, Transition};
use crate::display::traits::DisplayDriver;

use log::{debug, error, info, warn};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

/// Requests from the radio controller to the render task
pub enum DisplayCommand {
    ShowTemporary { screen: BoxedScreen, ttl: Duration },
    ShowUntilDismissed(BoxedScreen),
    RevertToDefault,
    Clear,
}

impl std::fmt::Debug for DisplayCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayCommand::ShowTemporary { screen, ttl } => {
                write!(f, "ShowTemporary({}, {:?})", screen.name(), ttl)
            }
            DisplayCommand::ShowUntilDismissed(screen) => {
                write!(f, "ShowUntilDismissed({})", screen.name())
            }
            DisplayCommand::RevertToDefault => write!(f, "RevertToDefault"),
            DisplayCommand::Clear => write!(f, "Clear"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    RenderingDefault,
    RenderingOverride,
}

/// The screen that produced the last frame, and that frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveScreen {
    pub name: String,
    pub kind: ScreenKind,
    pub lines: Vec<String>,
}

struct Override {
    screen: BoxedScreen,
    shown_at: Instant,
    ttl: Option<Duration>,
}

impl Override {
    fn expired(&self, now: Instant) -> bool {
        self.ttl
            .is_some_and(|ttl| now.saturating_duration_since(self.shown_at) >= ttl)
    }
}

/// Display manager that orchestrates all display operations
///
/// Holds exactly one default screen and at most one temporary override. A
/// new override replaces the old one outright, there is no queue. Every tick
/// renders one screen and pushes a full frame to the driver:
/// `clear`, one `display_text` per row, `flush`.
///
/// # Example
///
/// ```ignore
/// let driver = DisplayDriverFactory::create_from_config(&config.display(), true);
/// let mut manager = DisplayManager::with_fallback(driver, 16, 2, Box::new(RadioScreen::default()));
///
/// manager.show_temporary(Box::new(VolumeScreen::new(50)), Duration::from_secs(2), Instant::now());
/// manager.tick(&context, Instant::now());
/// ```
pub struct DisplayManager {
    driver: BoxedDriver,
    default_screen: BoxedScreen,
    override_screen: Option<Override>,
    fallback: bool,
    driver_fault: bool,
}

impl DisplayManager {
    /// Manager over an already initialized driver
    pub fn new(driver: BoxedDriver, default_screen: BoxedScreen) -> Self {
        Self {
            driver,
            default_screen,
            override_screen: None,
            fallback: false,
            driver_fault: false,
        }
    }

    /// Manager over the hardware driver, or a mock of the same size if it failed
    ///
    /// Never fails: a missing or broken display leaves the radio fully usable,
    /// only without physical output.
    pub fn with_fallback(
        driver: Result<BoxedDriver, DisplayFactoryError>,
        columns: usize,
        rows: usize,
        default_screen: BoxedScreen,
    ) -> Self {
        match driver {
            Ok(driver) => Self::new(driver, default_screen),
            Err(e) => {
                match e {
                    DisplayFactoryError::Disabled => info!("Display disabled, using software display"),
                    ref other => error!("Display hardware unavailable ({}), using software display", other),
                }
                let mut mock = MockDriver::new(columns, rows);
                if let Err(e) = mock.init() {
                    warn!("Software display init: {}", e);
                }
                let mut manager = Self::new(Box::new(mock), default_screen);
                manager.fallback = true;
                manager
            }
        }
    }

    /// Build the configured driver and wrap it, falling back as needed
    pub fn from_config(
        config: &crate::config::DisplayConfig,
        hardware_enabled: bool,
        default_screen: BoxedScreen,
    ) -> Self {
        let driver = DisplayDriverFactory::create_from_config(config, hardware_enabled);
        Self::with_fallback(driver, config.width(), config.height(), default_screen)
    }

    /// True when rendering through the software fallback driver
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    pub fn dimensions(&self) -> (usize, usize) {
        self.driver.dimensions()
    }

    pub fn driver_name(&self) -> &str {
        &self.driver.capabilities().name
    }

    pub fn state(&self) -> DisplayState {
        if self.override_screen.is_some() {
            DisplayState::RenderingOverride
        } else {
            DisplayState::RenderingDefault
        }
    }

    /// Kind of the pending override, if any
    pub fn override_kind(&self) -> Option<ScreenKind> {
        self.override_screen.as_ref().map(|o| o.screen.kind())
    }

    /// Show `screen` for `ttl` from `now`, replacing any current override
    pub fn show_temporary(&mut self, screen: BoxedScreen, ttl: Duration, now: Instant) {
        self.set_override(screen, Some(ttl), now);
    }

    /// Show `screen` until it reverts itself or something replaces it
    pub fn show_until_dismissed(&mut self, screen: BoxedScreen, now: Instant) {
        self.set_override(screen, None, now);
    }

    fn set_override(&mut self, screen: BoxedScreen, ttl: Option<Duration>, now: Instant) {
        if let Some(previous) = self.override_screen.as_ref() {
            debug!("Screen {} preempted by {}", previous.screen.name(), screen.name());
        }
        debug!("Showing {} screen ({:?})", screen.name(), ttl);
        self.override_screen = Some(Override { screen, shown_at: now, ttl });
    }

    pub fn revert_to_default(&mut self) {
        if let Some(previous) = self.override_screen.take() {
            debug!("Reverting {} screen to default", previous.screen.name());
        }
    }

    /// Drop any override and blank the display
    pub fn clear_display(&mut self) {
        self.override_screen = None;
        let result = self.driver.clear().and_then(|_| self.driver.flush());
        self.note_driver_result(result);
    }

    pub fn apply(&mut self, command: DisplayCommand, now: Instant) {
        match command {
            DisplayCommand::ShowTemporary { screen, ttl } => self.show_temporary(screen, ttl, now),
            DisplayCommand::ShowUntilDismissed(screen) => self.show_until_dismissed(screen, now),
            DisplayCommand::RevertToDefault => self.revert_to_default(),
            DisplayCommand::Clear => self.clear_display(),
        }
    }

    /// Render one frame
    ///
    /// An override whose TTL ran out, or that answers `Revert`, is dropped and
    /// the default screen renders in the same tick so no blank frame is shown.
    pub fn tick(&mut self, ctx: &DisplayContext, now: Instant) -> ActiveScreen {
        let dims = self.driver.dimensions();

        if self.override_screen.as_ref().is_some_and(|o| o.expired(now)) {
            self.revert_to_default();
        }

        let mut rendered = None;
        let mut revert = false;
        if let Some(active) = self.override_screen.as_mut() {
            let frame = active.screen.render(dims, ctx);
            match frame.transition {
                Transition::Continue => {
                    rendered = Some(ActiveScreen {
                        name: active.screen.name().to_string(),
                        kind: active.screen.kind(),
                        lines: frame.lines,
                    });
                }
                Transition::Revert => revert = true,
            }
        }
        if revert {
            self.revert_to_default();
        }

        let mut active = match rendered {
            Some(active) => active,
            None => {
                let frame = self.default_screen.render(dims, ctx);
                ActiveScreen {
                    name: self.default_screen.name().to_string(),
                    kind: self.default_screen.kind(),
                    lines: frame.lines,
                }
            }
        };

        active.lines = fit_lines(&active.lines, dims);
        let result = self.draw(&active.lines);
        self.note_driver_result(result);
        active
    }

    fn draw(&mut self, lines: &[String]) -> Result<(), DisplayError> {
        self.driver.clear()?;
        for (row, text) in lines.iter().enumerate() {
            self.driver.display_text(text, row + 1)?;
        }
        self.driver.flush()
    }

    // log a failing driver once, not at render rate
    fn note_driver_result(&mut self, result: Result<(), DisplayError>) {
        match result {
            Ok(()) => {
                if self.driver_fault {
                    info!("Display {} recovered", self.driver.capabilities().name);
                    self.driver_fault = false;
                }
            }
            Err(e) => {
                if self.driver_fault {
                    debug!("Display write failed: {}", e);
                } else {
                    warn!("Display write failed: {}", e);
                    self.driver_fault = true;
                }
            }
        }
    }

    /// Render task: tick on a fixed period until `shutdown` flips to true
    ///
    /// Only reads context snapshots and applies commands; never touches the
    /// network or the audio player. Clears the display on exit.
    pub async fn run(
        mut self,
        context: watch::Receiver<DisplayContext>,
        mut commands: mpsc::UnboundedReceiver<DisplayCommand>,
        period: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!(
            "Render loop started: {} {}x{} every {:?}{}",
            self.driver_name(),
            self.dimensions().0,
            self.dimensions().1,
            period,
            if self.fallback { " (fallback)" } else { "" }
        );

        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let mut snapshot = context.borrow().clone();
                    snapshot.stamp_clock();
                    self.tick(&snapshot, Instant::now());
                }
                Some(command) = commands.recv() => {
                    debug!("Display command: {:?}", command);
                    self.apply(command, Instant::now());
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        self.clear_display();
        info!("Render loop stopped");
    }
}

/// Exactly `rows` lines of exactly `columns` characters
fn fit_lines(lines: &[String], dims: (usize, usize)) -> Vec<String> {
    let (columns, rows) = dims;
    (0..rows)
        .map(|row| left(lines.get(row).map(String::as_str).unwrap_or(""), columns))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::screens::{ErrorScreen, Frame, MessageScreen, Screen, VolumeScreen};

    struct Fixed(&'static str);

    impl Screen for Fixed {
        fn name(&self) -> &str {
            self.0
        }
        fn kind(&self) -> ScreenKind {
            ScreenKind::Default
        }
        fn render(&mut self, _dims: (usize, usize), _ctx: &DisplayContext) -> Frame {
            Frame::keep(vec![self.0.to_string()])
        }
    }

    fn manager() -> (DisplayManager, MockDriver) {
        let mock = MockDriver::new(16, 2);
        let manager = DisplayManager::new(Box::new(mock.clone()), Box::new(Fixed("home")));
        (manager, mock)
    }

    #[test]
    fn test_default_renders_padded_rows() {
        let (mut manager, mock) = manager();
        let active = manager.tick(&DisplayContext::default(), Instant::now());
        assert_eq!(active.name, "home");
        assert_eq!(active.lines, vec!["home            ".to_string(), " ".repeat(16)]);
        assert_eq!(mock.lines(), active.lines);

        let state = mock.state();
        let state = state.lock().unwrap();
        assert_eq!(state.clear_count, 1);
        assert_eq!(state.write_count, 2);
        assert_eq!(state.flush_count, 1);
    }

    #[tokio::test]
    async fn test_render_loop_applies_commands_and_clears_on_shutdown() {
        let (manager, mock) = manager();
        let (_ctx_tx, ctx_rx) = watch::channel(DisplayContext::default());
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(manager.run(ctx_rx, cmd_rx, Duration::from_millis(10), stop_rx));

        cmd_tx
            .send(DisplayCommand::ShowTemporary {
                screen: Box::new(VolumeScreen::new(40)),
                ttl: Duration::from_secs(5),
            })
            .unwrap();
        let shown = tokio::time::timeout(Duration::from_secs(2), async {
            while mock.lines()[0].trim() != "Volume" {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        assert!(shown.is_ok(), "rows were {:?}", mock.lines());
        assert_eq!(mock.lines()[1].trim(), "40%");

        stop_tx.send_replace(true);
        tokio::time::timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();
        assert!(mock.lines().iter().all(|line| line.trim().is_empty()));
    }

    #[test]
    fn test_ttl_window() {
        let (mut manager, _) = manager();
        let ctx = DisplayContext::default();
        let t = Instant::now();
        manager.show_temporary(Box::new(VolumeScreen::new(40)), Duration::from_millis(2000), t);

        assert_eq!(manager.tick(&ctx, t).kind, ScreenKind::Volume);
        assert_eq!(manager.tick(&ctx, t + Duration::from_millis(1999)).kind, ScreenKind::Volume);
        assert_eq!(manager.state(), DisplayState::RenderingOverride);

        assert_eq!(manager.tick(&ctx, t + Duration::from_millis(2000)).kind, ScreenKind::Default);
        assert_eq!(manager.state(), DisplayState::RenderingDefault);
    }

    #[test]
    fn test_preemption_replaces_override() {
        let (mut manager, _) = manager();
        let ctx = DisplayContext::default();
        let t = Instant::now();
        manager.show_temporary(Box::new(VolumeScreen::new(40)), Duration::from_secs(2), t);
        let t2 = t + Duration::from_millis(1500);
        manager.show_temporary(Box::new(MessageScreen::radio_off()), Duration::from_secs(2), t2);

        // the first TTL would have ended here
        let active = manager.tick(&ctx, t + Duration::from_millis(2500));
        assert_eq!(active.kind, ScreenKind::Custom("radio_off".into()));
        assert_eq!(manager.tick(&ctx, t2 + Duration::from_secs(2)).kind, ScreenKind::Default);
    }

    #[test]
    fn test_revert_transition_renders_default_same_tick() {
        let (mut manager, _) = manager();
        let t = Instant::now();
        manager.show_until_dismissed(Box::new(ErrorScreen::for_failure("API down")), t);

        let failing = DisplayContext { error_message: Some("API down".into()), ..Default::default() };
        assert_eq!(manager.tick(&failing, t).kind, ScreenKind::Error);
        assert_eq!(manager.tick(&failing, t + Duration::from_secs(3600)).kind, ScreenKind::Error);

        let recovered = DisplayContext::default();
        let active = manager.tick(&recovered, t + Duration::from_secs(3601));
        assert_eq!(active.name, "home");
        assert_eq!(manager.state(), DisplayState::RenderingDefault);
    }

    #[test]
    fn test_fallback_on_factory_error() {
        let failed = Err(DisplayFactoryError::DriverInitFailed(DisplayError::I2cError("no ack".into())));
        let mut manager = DisplayManager::with_fallback(failed, 20, 4, Box::new(Fixed("home")));
        assert!(manager.is_fallback());
        assert_eq!(manager.dimensions(), (20, 4));
        assert_eq!(manager.driver_name(), "mock");
        assert_eq!(manager.tick(&DisplayContext::default(), Instant::now()).lines.len(), 4);
    }

    #[test]
    fn test_write_failure_does_not_escape_tick() {
        let (mut manager, mock) = manager();
        mock.state().lock().unwrap().simulate_write_failure = true;
        let active = manager.tick(&DisplayContext::default(), Instant::now());
        assert_eq!(active.name, "home");

        mock.state().lock().unwrap().simulate_write_failure = false;
        manager.tick(&DisplayContext::default(), Instant::now());
        assert_eq!(mock.lines()[0].trim(), "home");
    }

    #[test]
    fn test_apply_commands() {
        let (mut manager, mock) = manager();
        let t = Instant::now();
        manager.apply(DisplayCommand::ShowUntilDismissed(Box::new(MessageScreen::goodbye())), t);
        assert_eq!(manager.override_kind(), Some(ScreenKind::Custom("goodbye".into())));
        manager.apply(DisplayCommand::RevertToDefault, t);
        assert_eq!(manager.state(), DisplayState::RenderingDefault);

        manager.tick(&DisplayContext::default(), t);
        manager.apply(DisplayCommand::Clear, t);
        assert!(mock.lines().iter().all(|l| l.is_empty()));
    }

    #[test]
    fn test_fit_lines() {
        let lines = vec!["a much longer line than fits".to_string()];
        assert_eq!(fit_lines(&lines, (4, 3)), vec!["a mu", "    ", "    "]);
    }
}
