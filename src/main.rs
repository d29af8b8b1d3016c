/*
 *  main.rs
 *
 *  PlexRadio - turn it up
 *  (c) 2020-26 Stuart Hunter
 *
 *  Radio panel - wires buttons, controller, poller, player and the LCD
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

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{error, info, warn};
use tokio::sync::{mpsc, watch, Notify};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use plexradio::api::ApiClient;
use plexradio::build_info::BUILD_DATE;
use plexradio::buttons::{self, ButtonSender, GpioButtons};
use plexradio::config::{self, Cli};
use plexradio::constants::{BUTTON_QUEUE_DEPTH, GOODBYE_SCREEN_MS};
use plexradio::display::{
    DisplayCommand, DisplayContext, DisplayManager, ErrorScreen, MessageScreen, RadioScreen,
};
use plexradio::persist::ChannelStore;
use plexradio::player::{self, FfplayPlayer, MockPlayer, Playback};
use plexradio::poller::{Poller, PollerSettings};
use plexradio::radio::controller::{RadioController, RadioSettings};
use plexradio::radio::RadioEvent;

#[cfg(unix)]
async fn signal_handler() -> anyhow::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

#[cfg(not(unix))]
async fn signal_handler() -> anyhow::Result<()> {
    tokio::signal::ctrl_c().await?;
    info!("Ctrl-C received. Initiating graceful shutdown.");
    Ok(())
}

/// Show "Screen Cleared" for a moment, then blank the display
async fn clear_screen(mut manager: DisplayManager) {
    manager.show_until_dismissed(Box::new(MessageScreen::screen_cleared()), Instant::now());
    manager.tick(&DisplayContext::default(), Instant::now());
    tokio::time::sleep(Duration::from_secs(1)).await;
    manager.clear_display();
    info!("Display cleared");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // a broken config file should not keep the radio off the air
    let (cfg, load_error) = match config::load(&cli) {
        Ok(cfg) => (cfg, None),
        Err(e) => (config::defaults_with(&cli), Some(e)),
    };

    if cli.dump_config {
        println!("{}", config::dump(&cfg)?);
        return Ok(());
    }

    env_logger::Builder::from_env(Env::default().default_filter_or(cfg.log_filter()))
        .format_timestamp_secs()
        .init();

    info!("{} - turn it up", env!("CARGO_PKG_NAME"));
    info!("v.{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);
    if let Some(e) = load_error {
        error!("Config not loaded ({}), running on defaults", e);
    }

    let hardware = cfg.hardware_enabled();
    let display_cfg = cfg.display();
    let radio_cfg = cfg.radio();
    let api_cfg = cfg.api();

    let default_screen = Box::new(RadioScreen::new(
        display_cfg.scroll_every_ticks(),
        display_cfg.scroll_hold_ticks(),
    ));
    let manager = DisplayManager::from_config(&display_cfg, hardware, default_screen);

    if cli.clear_screen {
        clear_screen(manager).await;
        return Ok(());
    }

    let (context_tx, context_rx) = watch::channel(DisplayContext::default());
    let (command_tx, command_rx) = mpsc::unbounded_channel::<DisplayCommand>();
    let (event_tx, event_rx) = mpsc::channel::<RadioEvent>(BUTTON_QUEUE_DEPTH);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let roster_refresh = Arc::new(Notify::new());

    let player: Box<dyn Playback> = if player::ffplay_available() {
        Box::new(FfplayPlayer::default())
    } else {
        error!("ffplay not found on PATH, playback disabled");
        let _ = command_tx.send(DisplayCommand::ShowUntilDismissed(Box::new(ErrorScreen::new(
            "ffplay missing",
        ))));
        Box::new(MockPlayer::new())
    };

    let store = ChannelStore::new(radio_cfg.state_file());
    info!("Channel state in {}", store.path().display());

    // publishes the restored channel before the poller takes its first look
    let controller = RadioController::new(
        RadioSettings::from(&radio_cfg),
        store,
        player,
        context_tx,
        command_tx,
    )
    .with_roster_refresh(Arc::clone(&roster_refresh));
    let controller_handle = tokio::task::spawn_blocking(move || controller.run(event_rx));

    let period = Duration::from_millis(display_cfg.render_interval_ms());
    let render_handle = tokio::spawn(manager.run(
        context_rx.clone(),
        command_rx,
        period,
        shutdown_rx.clone(),
    ));

    let poller_handle = match ApiClient::new(
        &api_cfg.base_url(),
        Duration::from_millis(api_cfg.timeout_ms()),
        Duration::from_millis(api_cfg.connect_timeout_ms()),
    ) {
        Ok(client) => {
            info!("Radio API at {}", client.base_url());
            let poller = Poller::new(
                client,
                event_tx.clone(),
                context_rx,
                PollerSettings::from(&api_cfg),
            )
            .with_roster_refresh(roster_refresh);
            Some(tokio::spawn(poller.run(shutdown_rx.clone())))
        }
        Err(e) => {
            error!("Radio API client: {}", e);
            let _ = event_tx.try_send(RadioEvent::CollaboratorFailed("Server Not Found".into()));
            None
        }
    };

    let sender = ButtonSender::new(event_tx.clone());
    let mut use_keyboard = cli.keyboard || !hardware;
    let _gpio = if hardware {
        match GpioButtons::start(&cfg.gpio(), sender.clone()) {
            Ok(gpio) => Some(gpio),
            Err(e) => {
                warn!("GPIO buttons unavailable ({}), using keyboard", e);
                use_keyboard = true;
                None
            }
        }
    } else {
        None
    };
    if use_keyboard {
        tokio::spawn(buttons::run_keyboard(sender, shutdown_rx.clone()));
    }

    signal_handler().await.context("installing signal handlers")?;

    // goodbye screen first, then stop everything
    if event_tx.send(RadioEvent::Shutdown).await.is_err() {
        warn!("Radio controller already stopped");
    }
    drop(event_tx);
    tokio::time::sleep(Duration::from_millis(GOODBYE_SCREEN_MS)).await;
    let _ = shutdown_tx.send(true);

    if let Err(e) = controller_handle.await {
        error!("Radio controller task failed: {}", e);
    }
    if let Some(handle) = poller_handle {
        if let Err(e) = handle.await {
            error!("Poller task failed: {}", e);
        }
    }
    if let Err(e) = render_handle.await {
        error!("Render task failed: {}", e);
    }

    info!("Signing off");
    if use_keyboard {
        // a pending stdin read cannot be cancelled and would hold the runtime open
        std::process::exit(0);
    }
    Ok(())
}
