/*
 *  player.rs
 *
 *  PlexRadio - turn it up
 *  (c) 2020-26 Stuart Hunter
 *
 *  Audio playback - ffplay child process and pactl volume
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

use crate::api::SongInfo;
use crate::deutils::seconds_arg;

use log::{debug, info, warn};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use thiserror::Error;

const STOP_GRACE: Duration = Duration::from_secs(2);
const STOP_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("song has no media link")]
    NoMediaLink,
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("volume control failed: {0}")]
    Volume(String),
}

/// Audio output as seen by the radio controller
///
/// Calls may block briefly (process spawn, up to the stop grace period), so
/// the controller runs on a blocking thread.
pub trait Playback: Send {
    /// Stop whatever plays and start `song`
    fn play(&mut self, song: &SongInfo) -> Result<(), PlaybackError>;

    fn stop(&mut self);

    /// True when nothing is playing, either never started or ran to the end
    fn is_finished(&mut self) -> bool;

    fn set_volume(&mut self, percent: u8) -> Result<(), PlaybackError>;
}

/// Locate an executable on PATH
pub fn which(program: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

pub fn ffplay_available() -> bool {
    which("ffplay").is_some()
}

/// ffplay arguments for a song, seeking to where the channel is
pub fn ffplay_args(song: &SongInfo) -> Result<Vec<String>, PlaybackError> {
    let link = song.media_link.as_deref().ok_or(PlaybackError::NoMediaLink)?;
    let mut args: Vec<String> = ["-nodisp", "-autoexit", "-loglevel", "quiet", link]
        .iter()
        .map(|s| s.to_string())
        .collect();
    if let Some(start) = song.start_time {
        args.push("-ss".to_string());
        args.push(seconds_arg(start));
    }
    Ok(args)
}

/// Plays through an `ffplay` child process, volume through `pactl`
#[derive(Debug)]
pub struct FfplayPlayer {
    program: String,
    child: Option<Child>,
}

impl Default for FfplayPlayer {
    fn default() -> Self {
        Self::new("ffplay")
    }
}

impl FfplayPlayer {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            child: None,
        }
    }

    fn terminate(mut child: Child) {
        let pid = child.id() as libc::pid_t;
        // SAFETY: pid belongs to a child we spawned and have not reaped yet
        let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
        if rc != 0 {
            debug!("SIGTERM to {} failed, killing", pid);
        } else {
            let deadline = Instant::now() + STOP_GRACE;
            while Instant::now() < deadline {
                match child.try_wait() {
                    Ok(Some(_)) => return,
                    Ok(None) => std::thread::sleep(STOP_POLL),
                    Err(e) => {
                        warn!("Waiting for player {}: {}", pid, e);
                        break;
                    }
                }
            }
            debug!("Player {} ignored SIGTERM, killing", pid);
        }
        let _ = child.kill();
        let _ = child.wait();
    }
}

impl Playback for FfplayPlayer {
    fn play(&mut self, song: &SongInfo) -> Result<(), PlaybackError> {
        let args = ffplay_args(song)?;
        self.stop();

        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| PlaybackError::Spawn { program: self.program.clone(), source })?;

        info!("Now playing: {} (pid {})", song.display_title(), child.id());
        self.child = Some(child);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(child) = self.child.take() {
            info!("Stopping current playback");
            Self::terminate(child);
        }
    }

    fn is_finished(&mut self) -> bool {
        let Some(child) = self.child.as_mut() else {
            return true;
        };
        match child.try_wait() {
            Ok(Some(status)) => {
                debug!("Player exited: {}", status);
                self.child = None;
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!("Player status unknown: {}", e);
                false
            }
        }
    }

    fn set_volume(&mut self, percent: u8) -> Result<(), PlaybackError> {
        let level = format!("{}%", percent);
        let output = Command::new("pactl")
            .args(["set-sink-volume", "@DEFAULT_SINK@", level.as_str()])
            .stdin(Stdio::null())
            .output()
            .map_err(|e| PlaybackError::Volume(format!("pactl: {}", e)))?;

        if !output.status.success() {
            return Err(PlaybackError::Volume(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        debug!("Volume set to {}%", percent);
        Ok(())
    }
}

impl Drop for FfplayPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Recorded calls of a `MockPlayer`
#[derive(Debug, Default, Clone)]
pub struct MockPlayerState {
    pub played: Vec<SongInfo>,
    pub playing: bool,
    pub stop_count: u32,
    pub volume: Option<u8>,
    pub simulate_play_failure: bool,
    pub simulate_volume_failure: bool,
}

/// Silent player; records calls for inspection
///
/// Used when ffplay is missing so the panel still works, and by tests.
#[derive(Debug, Clone, Default)]
pub struct MockPlayer {
    state: Arc<Mutex<MockPlayerState>>,
}

impl MockPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Arc<Mutex<MockPlayerState>> {
        Arc::clone(&self.state)
    }

    pub fn snapshot(&self) -> MockPlayerState {
        self.lock().clone()
    }

    /// Pretend the current song ran to its end
    pub fn finish(&self) {
        self.lock().playing = false;
    }

    fn lock(&self) -> MutexGuard<'_, MockPlayerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Playback for MockPlayer {
    fn play(&mut self, song: &SongInfo) -> Result<(), PlaybackError> {
        let mut state = self.lock();
        if state.simulate_play_failure {
            return Err(PlaybackError::Spawn {
                program: "mock".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "simulated"),
            });
        }
        if song.media_link.is_none() {
            return Err(PlaybackError::NoMediaLink);
        }
        debug!("Mock playing {}", song.display_title());
        state.played.push(song.clone());
        state.playing = true;
        Ok(())
    }

    fn stop(&mut self) {
        let mut state = self.lock();
        state.playing = false;
        state.stop_count += 1;
    }

    fn is_finished(&mut self) -> bool {
        !self.lock().playing
    }

    fn set_volume(&mut self, percent: u8) -> Result<(), PlaybackError> {
        let mut state = self.lock();
        if state.simulate_volume_failure {
            return Err(PlaybackError::Volume("simulated".to_string()));
        }
        state.volume = Some(percent);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(start: Option<f64>) -> SongInfo {
        SongInfo {
            title: "So What".into(),
            artist: "Miles Davis".into(),
            media_link: Some("http://plex/1.mp3".into()),
            start_time: start,
        }
    }

    #[test]
    fn test_ffplay_args() {
        assert_eq!(
            ffplay_args(&song(None)).unwrap(),
            vec!["-nodisp", "-autoexit", "-loglevel", "quiet", "http://plex/1.mp3"]
        );
        let args = ffplay_args(&song(Some(95.0))).unwrap();
        assert_eq!(&args[5..], &["-ss".to_string(), "95".to_string()]);
    }

    #[test]
    fn test_ffplay_args_need_link() {
        let mut s = song(None);
        s.media_link = None;
        assert!(matches!(ffplay_args(&s), Err(PlaybackError::NoMediaLink)));
    }

    #[test]
    fn test_which_finds_shell() {
        assert!(which("sh").is_some());
        assert!(which("definitely-not-a-real-program-xyz").is_none());
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let mut player = FfplayPlayer::new("definitely-not-a-real-program-xyz");
        assert!(matches!(player.play(&song(None)), Err(PlaybackError::Spawn { .. })));
        assert!(player.is_finished());
    }

    #[test]
    fn test_stop_terminates_child() {
        // `sleep` rejects the ffplay flags, so drive the child directly
        let child = Command::new("sleep").arg("30").spawn().unwrap();
        let mut player = FfplayPlayer::new("sleep");
        player.child = Some(child);
        assert!(!player.is_finished());

        let started = Instant::now();
        player.stop();
        assert!(started.elapsed() < STOP_GRACE);
        assert!(player.is_finished());
    }

    #[test]
    fn test_mock_player_records() {
        let mut player = MockPlayer::new();
        player.play(&song(None)).unwrap();
        assert!(!player.is_finished());
        player.finish();
        assert!(player.is_finished());
        player.set_volume(15).unwrap();
        let state = player.snapshot();
        assert_eq!(state.played.len(), 1);
        assert_eq!(state.volume, Some(15));
    }
}
