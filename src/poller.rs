/*
 *  poller.rs
 *
 *  PlexRadio - turn it up
 *  (c) 2020-26 Stuart Hunter
 *
 *  Metadata poller - roster and now playing on their own schedule
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

use crate::api::{ApiError, Channel, RadioApi};
use crate::config::ApiConfig;
use crate::constants::POLL_BACKOFF_MAX_SECS;
use crate::display::{DisplayContext, Power};
use crate::radio::RadioEvent;

use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Notify};

/// Exponential retry delay, doubling from `base` up to `max`
#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    current: Option<Duration>,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self { base, max: max.max(base), current: None }
    }

    /// Delay before the next attempt after another failure
    pub fn failure(&mut self) -> Duration {
        let next = match self.current {
            None => self.base,
            Some(d) => d.saturating_mul(2).min(self.max),
        };
        self.current = Some(next);
        next
    }

    pub fn reset(&mut self) {
        self.current = None;
    }
}

/// Counts consecutive failures; reports the streak once, and its end once
#[derive(Debug, Clone)]
pub struct FailureTracker {
    threshold: u32,
    consecutive: u32,
    reported: bool,
}

impl FailureTracker {
    pub fn new(threshold: u32) -> Self {
        Self { threshold: threshold.max(1), consecutive: 0, reported: false }
    }

    /// True exactly when the streak reaches the threshold
    pub fn failure(&mut self) -> bool {
        self.consecutive = self.consecutive.saturating_add(1);
        if !self.reported && self.consecutive >= self.threshold {
            self.reported = true;
            return true;
        }
        false
    }

    /// True when this success ends a reported streak
    pub fn success(&mut self) -> bool {
        self.consecutive = 0;
        std::mem::take(&mut self.reported)
    }

    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }
}

/// What the user is told when the API keeps failing
pub fn failure_message(err: &ApiError) -> &'static str {
    match err {
        ApiError::Http(_) => "Server Not Found",
        ApiError::Decode(_) | ApiError::Status { .. } => "Bad Server Reply",
    }
}

#[derive(Debug, Clone)]
pub struct PollerSettings {
    pub interval: Duration,
    pub backoff_base: Duration,
    pub backoff_max: Duration,
    pub failure_threshold: u32,
}

impl From<&ApiConfig> for PollerSettings {
    fn from(cfg: &ApiConfig) -> Self {
        Self {
            interval: Duration::from_secs(cfg.poll_interval_secs()),
            backoff_base: Duration::from_secs(1),
            backoff_max: Duration::from_secs(POLL_BACKOFF_MAX_SECS),
            failure_threshold: cfg.failure_threshold(),
        }
    }
}

type PollKey = (Power, usize);

/// Fetches the roster until it has channels, then the current song while on
///
/// Results go into the controller's event queue; the poller never touches
/// radio state itself. A change of power or channel in the published context
/// cuts the current wait short, as does a roster refresh request.
pub struct Poller<A: RadioApi> {
    api: A,
    events: mpsc::Sender<RadioEvent>,
    context: watch::Receiver<DisplayContext>,
    settings: PollerSettings,
    backoff: Backoff,
    tracker: FailureTracker,
    roster: Option<Vec<Channel>>,
    last_key: PollKey,
    roster_refresh: Arc<Notify>,
}

impl<A: RadioApi> Poller<A> {
    pub fn new(
        api: A,
        events: mpsc::Sender<RadioEvent>,
        context: watch::Receiver<DisplayContext>,
        settings: PollerSettings,
    ) -> Self {
        Self {
            api,
            events,
            context,
            backoff: Backoff::new(settings.backoff_base, settings.backoff_max),
            tracker: FailureTracker::new(settings.failure_threshold),
            settings,
            roster: None,
            last_key: (Power::Off, 0),
            roster_refresh: Arc::new(Notify::new()),
        }
    }

    /// Share the notifier the controller signals when it needs channels
    pub fn with_roster_refresh(mut self, notify: Arc<Notify>) -> Self {
        self.roster_refresh = notify;
        self
    }

    fn current_key(&mut self) -> PollKey {
        let ctx = self.context.borrow_and_update();
        (ctx.power, ctx.channel_index)
    }

    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!("Poller started, every {:?}", self.settings.interval);
        loop {
            let delay = self.poll_once().await;
            if self.events.is_closed() || !self.wait(delay, &mut shutdown).await {
                break;
            }
        }
        info!("Poller stopped");
    }

    /// Sleep for `delay`; false when it is time to stop
    async fn wait(&mut self, delay: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);
        let refresh = Arc::clone(&self.roster_refresh);
        loop {
            tokio::select! {
                _ = &mut sleep => return true,
                _ = refresh.notified() => {
                    debug!("Roster requested, polling now");
                    return true;
                }
                changed = self.context.changed() => {
                    if changed.is_err() {
                        return false;
                    }
                    if self.current_key() != self.last_key {
                        debug!("Radio state changed, polling now");
                        return true;
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        return false;
                    }
                }
            }
        }
    }

    /// One round of requests; returns how long to wait before the next
    pub async fn poll_once(&mut self) -> Duration {
        self.last_key = self.current_key();
        let has_channels = self.roster.as_ref().is_some_and(|r| !r.is_empty());

        if !has_channels {
            return match self.api.channels().await {
                Ok(channels) => {
                    if self.roster.as_ref() != Some(&channels) {
                        self.roster = Some(channels.clone());
                        self.emit(RadioEvent::ChannelsLoaded(channels)).await;
                    }
                    self.succeeded().await;
                    // got the roster, go straight on to the song if playing
                    if self.roster.as_ref().is_some_and(|r| !r.is_empty()) && self.last_key.0.is_on() {
                        Duration::ZERO
                    } else {
                        self.settings.interval
                    }
                }
                Err(e) => self.failed("channel roster", e).await,
            };
        }

        let (power, channel_index) = self.last_key;
        if !power.is_on() {
            return self.settings.interval;
        }

        match self.api.current_song(channel_index).await {
            Ok(Some(song)) => {
                debug!("Channel {} playing {}", channel_index, song.display_title());
                self.emit(RadioEvent::SongUpdated { channel_index, song }).await;
                self.succeeded().await;
                self.settings.interval
            }
            Ok(None) => {
                debug!("Channel {} has no current song", channel_index);
                self.succeeded().await;
                self.settings.interval
            }
            Err(e) => self.failed("current song", e).await,
        }
    }

    async fn succeeded(&mut self) {
        self.backoff.reset();
        if self.tracker.success() {
            self.emit(RadioEvent::CollaboratorRecovered).await;
        }
    }

    async fn failed(&mut self, what: &str, err: ApiError) -> Duration {
        let delay = self.backoff.failure();
        warn!(
            "Fetching {} failed ({} in a row), retry in {:?}: {}",
            what,
            self.tracker.consecutive() + 1,
            delay,
            err
        );
        if self.tracker.failure() {
            self.emit(RadioEvent::CollaboratorFailed(failure_message(&err).to_string())).await;
        }
        delay
    }

    async fn emit(&self, event: RadioEvent) {
        if self.events.send(event).await.is_err() {
            debug!("Controller gone, dropping poll result");
        }
    }
}
