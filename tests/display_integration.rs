/*
 *  tests/display_integration.rs
 *
 *  Integration tests for the display manager and its fallback path
 *
 *  PlexRadio - turn it up
 *  (c) 2020-26 Stuart Hunter
 */

use std::time::{Duration, Instant};

use plexradio::display::{
    DisplayContext, DisplayDriver, DisplayError, DisplayFactoryError, DisplayManager,
    ErrorScreen, MessageScreen, MockDriver, Power, RadioScreen, ScreenKind, VolumeScreen,
};

fn on_air(channel: &str, song: &str) -> DisplayContext {
    DisplayContext {
        power: Power::On,
        channel_index: 0,
        channel_name: channel.to_string(),
        current_song: Some(song.to_string()),
        volume_percent: 40,
        ..Default::default()
    }
}

fn manager_with_mock() -> (DisplayManager, MockDriver) {
    let mut driver = MockDriver::new(16, 2);
    driver.init().unwrap();
    let probe = driver.clone();
    let manager = DisplayManager::new(Box::new(driver), Box::new(RadioScreen::default()));
    (manager, probe)
}

#[test]
fn test_fallback_display_behaves_like_hardware() {
    let failed = Err(DisplayFactoryError::DriverInitFailed(DisplayError::InitializationFailed(
        "no LCD on the bus".to_string(),
    )));
    let mut manager = DisplayManager::with_fallback(failed, 16, 2, Box::new(RadioScreen::default()));
    assert!(manager.is_fallback());
    assert_eq!(manager.dimensions(), (16, 2));

    let t0 = Instant::now();
    manager.show_temporary(Box::new(VolumeScreen::new(50)), Duration::from_secs(2), t0);
    let shown = manager.tick(&on_air("Jazz", "Miles - So What"), t0);
    assert_eq!(shown.kind, ScreenKind::Volume);
    assert_eq!(shown.lines[1].trim(), "50%");

    let after = manager.tick(&on_air("Jazz", "Miles - So What"), t0 + Duration::from_millis(2001));
    assert_eq!(after.kind, ScreenKind::Default);
    assert_eq!(after.lines[0].trim(), "Jazz");
}

#[test]
fn test_disabled_display_still_renders() {
    let mut manager = DisplayManager::with_fallback(
        Err(DisplayFactoryError::Disabled),
        20,
        4,
        Box::new(RadioScreen::default()),
    );
    assert!(manager.is_fallback());
    let shown = manager.tick(&DisplayContext::default().with_clock("12:34:56"), Instant::now());
    assert_eq!(shown.lines.len(), 4);
    assert!(shown.lines.iter().all(|l| l.chars().count() == 20));
}

#[test]
fn test_temporary_screen_window() {
    let (mut manager, probe) = manager_with_mock();
    let ctx = on_air("Rock", "Band - Song");
    let t0 = Instant::now();

    manager.show_temporary(Box::new(VolumeScreen::new(15)), Duration::from_millis(2000), t0);
    for ms in [0u64, 500, 1000, 1999] {
        let shown = manager.tick(&ctx, t0 + Duration::from_millis(ms));
        assert_eq!(shown.kind, ScreenKind::Volume, "at {}ms", ms);
    }
    assert_eq!(probe.lines()[0].trim(), "Volume");

    let shown = manager.tick(&ctx, t0 + Duration::from_millis(2000));
    assert_eq!(shown.kind, ScreenKind::Default);
    assert_eq!(probe.lines()[0].trim(), "Rock");
}

#[test]
fn test_newer_screen_preempts_and_restarts_ttl() {
    let (mut manager, _probe) = manager_with_mock();
    let ctx = on_air("Rock", "Band - Song");
    let t0 = Instant::now();

    manager.show_temporary(Box::new(VolumeScreen::new(20)), Duration::from_secs(2), t0);
    manager.tick(&ctx, t0);

    let t1 = t0 + Duration::from_millis(1500);
    manager.show_temporary(Box::new(ErrorScreen::new("Volume failed")), Duration::from_secs(5), t1);
    let shown = manager.tick(&ctx, t1);
    assert_eq!(shown.kind, ScreenKind::Error);

    // the volume screen's deadline has no say any more
    let shown = manager.tick(&ctx, t0 + Duration::from_millis(2500));
    assert_eq!(shown.kind, ScreenKind::Error);

    let shown = manager.tick(&ctx, t1 + Duration::from_secs(5));
    assert_eq!(shown.kind, ScreenKind::Default);
}

#[test]
fn test_until_dismissed_then_clear() {
    let (mut manager, probe) = manager_with_mock();
    let ctx = on_air("Rock", "Band - Song");
    let t0 = Instant::now();

    manager.show_until_dismissed(Box::new(MessageScreen::goodbye()), t0);
    let shown = manager.tick(&ctx, t0 + Duration::from_secs(3600));
    assert_eq!(shown.kind, ScreenKind::Custom("goodbye".to_string()));
    assert!(probe.lines().iter().any(|l| l.trim() == "Goodbye!"));

    manager.clear_display();
    assert!(probe.lines().iter().all(|l| l.is_empty()));
    assert_eq!(manager.override_kind(), None);
}
