/*
 *  radio/controller.rs
 *
 *  PlexRadio - turn it up
 *  (c) 2020-26 Stuart Hunter
 *
 *  Radio controller - the single writer of radio state
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
use crate::config::RadioConfig;
use crate::constants::*;
use crate::display::{
    BoxedScreen, ChannelScreen, DisplayCommand, DisplayContext, ErrorScreen, MessageScreen, Power,
    VolumeScreen,
};
use crate::persist::ChannelStore;
use crate::player::Playback;
use crate::radio::{Button, Debouncer, RadioEvent, RadioState};

use log::{debug, info, trace, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch, Notify};

/// Timing and policy knobs of the controller
#[derive(Debug, Clone)]
pub struct RadioSettings {
    pub debounce: Duration,
    /// Volume applied on every power on
    pub startup_volume: Option<u8>,
    /// Volume buttons work while the radio is off
    pub volume_when_off: bool,
    pub volume_screen: Duration,
    pub channel_screen: Duration,
    pub error_screen: Duration,
    pub radio_off_screen: Duration,
    /// How long a refused power press waits for the roster to arrive
    pub roster_retry: Duration,
}

impl Default for RadioSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEBOUNCE_MS),
            startup_volume: Some(STARTUP_VOLUME),
            volume_when_off: true,
            volume_screen: Duration::from_millis(VOLUME_SCREEN_MS),
            channel_screen: Duration::from_millis(CHANNEL_SCREEN_MS),
            error_screen: Duration::from_millis(ERROR_SCREEN_MS),
            radio_off_screen: Duration::from_millis(RADIO_OFF_SCREEN_MS),
            roster_retry: Duration::from_millis(ROSTER_RETRY_MS),
        }
    }
}

impl From<&RadioConfig> for RadioSettings {
    fn from(cfg: &RadioConfig) -> Self {
        Self {
            debounce: Duration::from_millis(cfg.debounce_ms()),
            startup_volume: Some(cfg.startup_volume()),
            volume_when_off: cfg.volume_when_off(),
            volume_screen: Duration::from_millis(cfg.volume_screen_ms()),
            channel_screen: Duration::from_millis(cfg.channel_screen_ms()),
            error_screen: Duration::from_millis(cfg.error_screen_ms()),
            ..Default::default()
        }
    }
}

/// Owns `RadioState` and turns events into state changes
///
/// Every event is handled to completion before the next one, so transitions
/// never interleave. After each change the display context is republished;
/// screens that should appear are sent to the render task as commands.
pub struct RadioController {
    state: RadioState,
    settings: RadioSettings,
    debouncer: Debouncer,
    store: ChannelStore,
    player: Box<dyn Playback>,
    context: watch::Sender<DisplayContext>,
    display: mpsc::UnboundedSender<DisplayCommand>,
    error_message: Option<String>,
    /// Power on or a channel change is waiting for the next song to start audio
    pending_play: bool,
    playback_failed: bool,
    /// Wakes the poller for another roster fetch
    roster_refresh: Option<Arc<Notify>>,
    /// Power press refused for lack of channels, and when
    power_on_requested: Option<Instant>,
}

impl RadioController {
    pub fn new(
        settings: RadioSettings,
        store: ChannelStore,
        player: Box<dyn Playback>,
        context: watch::Sender<DisplayContext>,
        display: mpsc::UnboundedSender<DisplayCommand>,
    ) -> Self {
        let channel_index = store.load();
        let volume = settings.startup_volume.unwrap_or(STARTUP_VOLUME);
        let controller = Self {
            state: RadioState::new(channel_index, volume),
            debouncer: Debouncer::new(settings.debounce),
            settings,
            store,
            player,
            context,
            display,
            error_message: None,
            pending_play: false,
            playback_failed: false,
            roster_refresh: None,
            power_on_requested: None,
        };
        controller.publish();
        controller
    }

    /// Ask the poller for the roster again when power is pressed without one
    pub fn with_roster_refresh(mut self, notify: Arc<Notify>) -> Self {
        self.roster_refresh = Some(notify);
        self
    }

    pub fn state(&self) -> &RadioState {
        &self.state
    }

    pub fn handle(&mut self, event: RadioEvent, now: Instant) {
        match event {
            RadioEvent::Pressed(button) => {
                if !self.debouncer.accept(button, now) {
                    trace!("Debounced {} press", button);
                    return;
                }
                debug!("{} pressed", button);
                match button {
                    Button::Power => self.toggle_power(now),
                    Button::VolumeUp => self.adjust_volume(true),
                    Button::VolumeDown => self.adjust_volume(false),
                    Button::ChannelUp => self.change_channel(true),
                    Button::ChannelDown => self.change_channel(false),
                }
            }
            RadioEvent::ChannelsLoaded(channels) => self.load_channels(channels, now),
            RadioEvent::SongUpdated { channel_index, song } => self.song_updated(channel_index, &song),
            RadioEvent::CollaboratorFailed(message) => self.collaborator_failed(message),
            RadioEvent::CollaboratorRecovered => self.collaborator_recovered(),
            RadioEvent::Shutdown => self.shutdown(),
        }
    }

    fn toggle_power(&mut self, now: Instant) {
        match self.state.power.toggled() {
            Power::On => self.power_on(now),
            Power::Off => self.power_off(),
        }
    }

    fn power_on(&mut self, now: Instant) {
        if self.state.channels.is_empty() {
            let reason = if self.state.roster_loaded { "No Channels" } else { "Server Not Found" };
            warn!("Cannot power on: {}", reason);
            self.request_roster(now);
            self.show_error(reason);
            return;
        }

        self.power_on_requested = None;
        info!("Radio turned ON");
        self.state.power = Power::On;
        if let Some(volume) = self.settings.startup_volume {
            self.state.volume_percent = volume;
            if let Err(e) = self.player.set_volume(volume) {
                warn!("Could not set startup volume: {}", e);
            }
        }
        self.pending_play = true;
        self.publish();
        self.send(DisplayCommand::RevertToDefault);
    }

    fn power_off(&mut self) {
        info!("Radio turned OFF");
        self.state.power = Power::Off;
        self.player.stop();
        self.state.current_song = None;
        self.pending_play = false;
        self.publish();
        self.show_temporary(Box::new(MessageScreen::radio_off()), self.settings.radio_off_screen);
    }

    fn adjust_volume(&mut self, up: bool) {
        if !self.state.power.is_on() && !self.settings.volume_when_off {
            debug!("Volume change ignored, radio is off");
            return;
        }
        let volume = self.state.step_volume(up);
        info!("Volume {} - {}%", if up { "UP" } else { "DOWN" }, volume);
        self.publish();

        match self.player.set_volume(volume) {
            Ok(()) => self.show_temporary(Box::new(VolumeScreen::new(volume)), self.settings.volume_screen),
            Err(e) => {
                warn!("{}", e);
                self.show_error("Volume failed");
            }
        }
    }

    fn change_channel(&mut self, forward: bool) {
        let Some(index) = self.state.step_channel(forward) else {
            debug!("Channel change ignored, no channels");
            return;
        };
        let name = self.state.channel_name().to_string();
        info!("Switched to channel: {} ({})", name, index);

        if let Err(e) = self.store.save(index) {
            warn!("Could not save channel: {}", e);
        }

        self.state.current_song = None;
        if self.state.power.is_on() {
            self.player.stop();
            self.pending_play = true;
        }
        self.publish();
        self.show_temporary(Box::new(ChannelScreen::new(&name)), self.settings.channel_screen);
    }

    fn song_updated(&mut self, channel_index: usize, song: &SongInfo) {
        if !self.state.power.is_on() || channel_index != self.state.channel_index {
            trace!("Ignoring song for channel {} ({})", channel_index, self.state.power);
            return;
        }

        let title = song.display_title();
        let changed = !title.is_empty() && self.state.current_song.as_deref() != Some(title.as_str());
        if changed {
            debug!("Now on {}: {}", self.state.channel_name(), title);
            self.state.current_song = Some(title);
            self.publish();
        }

        if changed || self.pending_play || self.player.is_finished() {
            self.start_playback(song);
        }
    }

    fn start_playback(&mut self, song: &SongInfo) {
        self.pending_play = false;
        match self.player.play(song) {
            Ok(()) => self.playback_failed = false,
            Err(e) => {
                warn!("Playback failed: {}", e);
                // one screen per failure streak, the retry happens on every song update
                if !self.playback_failed {
                    self.show_error("Playback failed");
                }
                self.playback_failed = true;
            }
        }
    }

    fn request_roster(&mut self, now: Instant) {
        if let Some(notify) = &self.roster_refresh {
            debug!("Asking for the channel roster again");
            notify.notify_one();
        }
        self.power_on_requested = Some(now);
    }

    fn load_channels(&mut self, channels: Vec<crate::api::Channel>, now: Instant) {
        info!("Loaded {} channels", channels.len());
        self.state.channels = channels;
        self.state.roster_loaded = true;
        self.state.channel_index = self.store.load_within(self.state.channels.len());
        self.publish();

        if let Some(asked) = self.power_on_requested.take() {
            if !self.state.channels.is_empty()
                && now.saturating_duration_since(asked) <= self.settings.roster_retry
            {
                info!("Channels arrived after power was pressed");
                self.power_on(now);
            }
        }
    }

    fn collaborator_failed(&mut self, message: String) {
        warn!("{}", message);
        self.error_message = Some(message.clone());
        self.publish();
        self.show_temporary(Box::new(ErrorScreen::for_failure(&message)), self.settings.error_screen);
    }

    fn collaborator_recovered(&mut self) {
        if self.error_message.take().is_some() {
            info!("Radio service reachable again");
            self.publish();
        }
    }

    fn shutdown(&mut self) {
        info!("Shutting down radio");
        self.player.stop();
        self.pending_play = false;
        self.send(DisplayCommand::ShowUntilDismissed(Box::new(MessageScreen::goodbye())));
    }

    fn show_error(&mut self, message: &str) {
        self.show_temporary(Box::new(ErrorScreen::new(message)), self.settings.error_screen);
    }

    fn show_temporary(&self, screen: BoxedScreen, ttl: Duration) {
        self.send(DisplayCommand::ShowTemporary { screen, ttl });
    }

    fn send(&self, command: DisplayCommand) {
        if self.display.send(command).is_err() {
            debug!("Render task gone, display command dropped");
        }
    }

    /// Current state as the screens see it
    pub fn snapshot(&self) -> DisplayContext {
        DisplayContext {
            power: self.state.power,
            channel_index: self.state.channel_index,
            channel_name: self.state.channel_name().to_string(),
            current_song: self.state.current_song.clone(),
            volume_percent: self.state.volume_percent,
            error_message: self.error_message.clone(),
            ..Default::default()
        }
    }

    fn publish(&self) {
        self.context.send_replace(self.snapshot());
    }

    /// Blocking event loop; returns after `Shutdown` or when all senders are gone
    pub fn run(mut self, mut events: mpsc::Receiver<RadioEvent>) {
        info!("Radio controller started on channel {}", self.state.channel_index);
        while let Some(event) = events.blocking_recv() {
            let last = matches!(event, RadioEvent::Shutdown);
            self.handle(event, Instant::now());
            if last {
                break;
            }
        }
        self.player.stop();
        info!("Radio controller stopped");
    }
}
