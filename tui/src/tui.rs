use std::io::Result;
use std::io::Stdout;
use std::io::stdout;
use std::pin::Pin;
use std::time::Duration;

use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableMouseCapture;
use crossterm::event::Event;
use crossterm::event::EventStream;
use crossterm::event::KeyEvent;
use crossterm::event::MouseEvent;
use crossterm::event::MouseEventKind;
use crossterm::execute;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use ratatui::Frame;
use ratatui::backend::CrosstermBackend;
use tokio::select;
use tokio::sync::broadcast;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio::time::sleep_until;
use tokio_stream::Stream;

/// A type alias for the terminal type used in this application
pub type Terminal = ratatui::Terminal<CrosstermBackend<Stdout>>;

/// Enter raw mode and the alternate screen, with mouse reporting on so the
/// roll button can be clicked.
pub fn init() -> Result<Terminal> {
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen, EnableMouseCapture)?;
    set_panic_hook();

    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.hide_cursor()?;
    terminal.clear()?;
    Ok(terminal)
}

fn set_panic_hook() {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore();
        hook(panic_info);
    }));
}

/// Restore the terminal to its original state.
pub fn restore() -> Result<()> {
    execute!(
        stdout(),
        DisableMouseCapture,
        LeaveAlternateScreen,
        crossterm::cursor::Show
    )?;
    disable_raw_mode()?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TuiEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Draw,
}

/// Handle for asking the event loop to redraw.
///
/// Requests are coalesced: any number of requests before the earliest
/// deadline produce a single [`TuiEvent::Draw`].
#[derive(Clone, Debug)]
pub(crate) struct FrameRequester {
    frame_schedule_tx: mpsc::UnboundedSender<Instant>,
}

impl FrameRequester {
    pub(crate) fn schedule_frame(&self) {
        let _ = self.frame_schedule_tx.send(Instant::now());
    }
}

pub(crate) struct Tui {
    frame_schedule_tx: mpsc::UnboundedSender<Instant>,
    draw_tx: broadcast::Sender<()>,
    pub(crate) terminal: Terminal,
}

impl Tui {
    pub(crate) fn new(terminal: Terminal) -> Self {
        let (frame_schedule_tx, frame_schedule_rx) = mpsc::unbounded_channel();
        let (draw_tx, _) = broadcast::channel(1);
        tokio::spawn(coalesce_frames(frame_schedule_rx, draw_tx.clone()));
        Self {
            frame_schedule_tx,
            draw_tx,
            terminal,
        }
    }

    pub(crate) fn frame_requester(&self) -> FrameRequester {
        FrameRequester {
            frame_schedule_tx: self.frame_schedule_tx.clone(),
        }
    }

    pub(crate) fn event_stream(&self) -> Pin<Box<dyn Stream<Item = TuiEvent> + Send + 'static>> {
        use tokio_stream::StreamExt;
        let mut draw_rx = self.draw_tx.subscribe();
        let event_stream = async_stream::stream! {
            let mut crossterm_events = EventStream::new();
            loop {
                select! {
                    Some(Ok(event)) = crossterm_events.next() => {
                        match event {
                            Event::Key(key_event) => yield TuiEvent::Key(key_event),
                            Event::Mouse(mouse_event) if matches!(mouse_event.kind, MouseEventKind::Down(_)) => {
                                yield TuiEvent::Mouse(mouse_event);
                            }
                            Event::Resize(_, _) => yield TuiEvent::Draw,
                            _ => {}
                        }
                    }
                    result = draw_rx.recv() => {
                        match result {
                            Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                                yield TuiEvent::Draw;
                            }
                            Err(broadcast::error::RecvError::Closed) => break,
                        }
                    }
                }
            }
        };
        Box::pin(event_stream)
    }

    pub(crate) fn draw(&mut self, draw_fn: impl FnOnce(&mut Frame)) -> Result<()> {
        self.terminal.draw(draw_fn)?;
        Ok(())
    }
}

/// Collapse frame requests to the earliest pending deadline and fire one draw
/// signal when it passes.
async fn coalesce_frames(
    mut frame_schedule_rx: mpsc::UnboundedReceiver<Instant>,
    draw_tx: broadcast::Sender<()>,
) {
    let mut next_deadline: Option<Instant> = None;
    loop {
        let target = next_deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(60 * 60));
        let sleeper = sleep_until(target);
        tokio::pin!(sleeper);
        select! {
            recv = frame_schedule_rx.recv() => {
                match recv {
                    Some(at) => {
                        if next_deadline.is_none_or(|cur| at < cur) {
                            next_deadline = Some(at);
                        }
                    }
                    None => break,
                }
            }
            _ = &mut sleeper => {
                if next_deadline.take().is_some() {
                    let _ = draw_tx.send(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn frame_requests_coalesce_into_one_draw() {
        let (frame_schedule_tx, frame_schedule_rx) = mpsc::unbounded_channel();
        let (draw_tx, mut draw_rx) = broadcast::channel(4);
        tokio::spawn(coalesce_frames(frame_schedule_rx, draw_tx));
        let now = Instant::now();
        for ms in [16, 8, 12] {
            frame_schedule_tx
                .send(now + Duration::from_millis(ms))
                .unwrap();
        }
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(draw_rx.try_recv().is_ok());
        assert!(draw_rx.try_recv().is_err());
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn no_draw_without_a_request() {
        let (_frame_schedule_tx, frame_schedule_rx) = mpsc::unbounded_channel();
        let (draw_tx, mut draw_rx) = broadcast::channel(4);
        tokio::spawn(coalesce_frames(frame_schedule_rx, draw_tx));

        tokio::time::sleep(Duration::from_secs(2 * 60 * 60)).await;
        assert!(draw_rx.try_recv().is_err());
    }
}
