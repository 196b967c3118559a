use std::sync::Arc;

use color_eyre::eyre::Result;
use dieroll_core::RollSequencer;
use dieroll_core::config::Config;
use tokio::select;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc::unbounded_channel;
use tokio::task::JoinHandle;

use crate::app_event::AppEvent;
use crate::app_event_sender::AppEventSender;
use crate::haptics::TerminalHaptics;
use crate::roll_screen::RollScreen;
use crate::tui;
use crate::tui::TuiEvent;

pub(crate) struct App {
    sequencer: RollSequencer,
    screen: RollScreen,
}

impl App {
    pub async fn run(tui: &mut tui::Tui, config: Config) -> Result<()> {
        use tokio_stream::StreamExt;
        let (app_event_tx, mut app_event_rx) = unbounded_channel();
        let app_event_tx = AppEventSender::new(app_event_tx);

        let haptics = Arc::new(TerminalHaptics::new(
            std::io::stdout(),
            config.haptics.enabled,
        ));
        let sequencer = RollSequencer::from_config(&config, haptics);
        let screen = RollScreen::new(app_event_tx.clone(), config.title.clone(), sequencer.state());
        let forwarder = spawn_roll_forwarder(&sequencer, app_event_tx);

        let mut app = Self { sequencer, screen };

        let tui_events = tui.event_stream();
        tokio::pin!(tui_events);

        tui.frame_requester().schedule_frame();

        let mut result = Ok(());
        loop {
            let keep_running = select! {
                Some(event) = app_event_rx.recv() => Ok(app.handle_event(tui, event)),
                Some(event) = tui_events.next() => app.handle_tui_event(tui, event),
                else => Ok(false),
            };
            match keep_running {
                Ok(true) => {}
                Ok(false) => break,
                Err(err) => {
                    result = Err(err);
                    break;
                }
            }
        }

        // Unmount: no roll may outlive the screen.
        forwarder.abort();
        app.sequencer.cancel();
        tui.terminal.clear()?;
        result
    }

    fn handle_tui_event(&mut self, tui: &mut tui::Tui, event: TuiEvent) -> Result<bool> {
        match event {
            TuiEvent::Key(key_event) => self.screen.handle_key_event(key_event),
            TuiEvent::Mouse(mouse_event) => self.screen.handle_mouse_event(mouse_event),
            TuiEvent::Draw => {
                let screen = &self.screen;
                tui.draw(|frame| frame.render_widget_ref(screen, frame.area()))?;
            }
        }
        Ok(true)
    }

    fn handle_event(&mut self, tui: &tui::Tui, event: AppEvent) -> bool {
        match event {
            AppEvent::Roll => {
                self.sequencer.start();
            }
            AppEvent::ExitRequest => {
                return false;
            }
            AppEvent::RollStateChanged(state) => {
                self.screen.set_state(state);
                tui.frame_requester().schedule_frame();
            }
            AppEvent::RollSettled(outcome) => {
                self.screen.on_roll_settled(outcome);
                tui.frame_requester().schedule_frame();
            }
        }
        true
    }
}

/// Relay sequencer output into the app event loop until the sequencer goes
/// away.
fn spawn_roll_forwarder(sequencer: &RollSequencer, app_event_tx: AppEventSender) -> JoinHandle<()> {
    let mut state_rx = sequencer.subscribe();
    let mut outcome_rx = sequencer.subscribe_outcomes();
    tokio::spawn(async move {
        loop {
            select! {
                changed = state_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let state = *state_rx.borrow_and_update();
                    app_event_tx.send(AppEvent::RollStateChanged(state));
                }
                outcome = outcome_rx.recv() => match outcome {
                    Ok(outcome) => app_event_tx.send(AppEvent::RollSettled(outcome)),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("roll forwarder skipped {skipped} outcomes");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
    })
}
