//! The single screen of the app: title, die, roll button and a status line.
//!
//! The screen owns no roll logic. It renders the latest [`RollState`] it was
//! handed and turns taps into [`AppEvent::Roll`].

use std::cell::Cell;

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use crossterm::event::MouseButton;
use crossterm::event::MouseEvent;
use crossterm::event::MouseEventKind;
use dieroll_core::RollOutcome;
use dieroll_core::RollState;
use ratatui::buffer::Buffer;
use ratatui::layout::Constraint;
use ratatui::layout::Flex;
use ratatui::layout::Layout;
use ratatui::layout::Position;
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Widget;
use ratatui::widgets::WidgetRef;
use unicode_width::UnicodeWidthStr;

use crate::app_event::AppEvent;
use crate::app_event_sender::AppEventSender;
use crate::dice_widget::DIE_HEIGHT;
use crate::dice_widget::DIE_WIDTH;
use crate::dice_widget::DiceWidget;
use crate::faces::FaceAssets;
use crate::faces::face_glyph;
use crate::style::button_style;
use crate::style::hint_style;
use crate::style::screen_style;
use crate::style::title_style;

const BUTTON_LABEL: &str = "ROLL NOW";
const BUTTON_PADDING: u16 = 6;
const BUTTON_HEIGHT: u16 = 3;
const KEY_HINTS: &str = "enter/space/click roll · q quit";

pub(crate) struct RollScreen {
    app_event_tx: AppEventSender,
    assets: FaceAssets,
    title: String,
    state: RollState,
    last_outcome: Option<RollOutcome>,
    /// Area of the last render, kept for mouse hit-testing.
    last_area: Cell<Rect>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScreenLayout {
    pub(crate) title: Rect,
    pub(crate) die: Rect,
    pub(crate) button: Rect,
    pub(crate) status: Rect,
}

pub(crate) fn screen_layout(area: Rect) -> ScreenLayout {
    let status_height = area.height.min(1);
    let status = Rect::new(
        area.x,
        area.bottom() - status_height,
        area.width,
        status_height,
    );
    let body = Rect::new(area.x, area.y, area.width, area.height - status_height);

    let [title, _, die, _, button] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(DIE_HEIGHT),
        Constraint::Length(2),
        Constraint::Length(BUTTON_HEIGHT),
    ])
    .flex(Flex::Center)
    .areas(body);

    let button_width = BUTTON_LABEL.width() as u16 + 2 * BUTTON_PADDING;
    let [button] = Layout::horizontal([Constraint::Length(button_width)])
        .flex(Flex::Center)
        .areas(button);
    let [die] = Layout::horizontal([Constraint::Length(DIE_WIDTH)])
        .flex(Flex::Center)
        .areas(die);

    ScreenLayout {
        title,
        die,
        button,
        status,
    }
}

impl RollScreen {
    pub(crate) fn new(app_event_tx: AppEventSender, title: String, state: RollState) -> Self {
        Self {
            app_event_tx,
            assets: FaceAssets::load(),
            title,
            state,
            last_outcome: None,
            last_area: Cell::new(Rect::default()),
        }
    }

    pub(crate) fn set_state(&mut self, state: RollState) {
        self.state = state;
    }

    pub(crate) fn on_roll_settled(&mut self, outcome: RollOutcome) {
        self.last_outcome = Some(outcome);
    }

    pub(crate) fn handle_key_event(&mut self, key_event: KeyEvent) {
        if key_event.kind == KeyEventKind::Release {
            return;
        }
        match key_event.code {
            KeyCode::Enter | KeyCode::Char(' ') => self.app_event_tx.send(AppEvent::Roll),
            KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                self.app_event_tx.send(AppEvent::ExitRequest);
            }
            KeyCode::Char('q') | KeyCode::Esc => self.app_event_tx.send(AppEvent::ExitRequest),
            _ => {}
        }
    }

    pub(crate) fn handle_mouse_event(&mut self, mouse_event: MouseEvent) {
        if mouse_event.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let button = screen_layout(self.last_area.get()).button;
        if button.contains(Position::new(mouse_event.column, mouse_event.row)) {
            self.app_event_tx.send(AppEvent::Roll);
        }
    }

    fn status_line(&self) -> Line<'static> {
        let status = if self.state.is_rolling() {
            "rolling…".to_string()
        } else if let Some(outcome) = self.last_outcome {
            format!("rolled {} {}", face_glyph(outcome.face), outcome.face)
        } else {
            "tap to roll".to_string()
        };
        Line::from(vec![
            Span::raw(format!(" {status}")),
            Span::styled(format!("  {KEY_HINTS}"), hint_style()),
        ])
    }

    fn render_button(&self, area: Rect, buf: &mut Buffer) {
        let style = button_style(self.state.is_rolling());
        Block::new().style(style).render(area, buf);
        let label_row = Rect::new(area.x, area.y + area.height / 2, area.width, area.height.min(1));
        Line::styled(BUTTON_LABEL, style)
            .centered()
            .render(label_row, buf);
    }
}

impl WidgetRef for &RollScreen {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        self.last_area.set(area);
        Block::new().style(screen_style()).render(area, buf);

        let layout = screen_layout(area);
        Line::styled(self.title.clone(), title_style())
            .centered()
            .render(layout.title, buf);
        DiceWidget::new(
            &self.assets,
            self.state.current_face,
            self.state.rotation_progress,
        )
        .render_ref(layout.die, buf);
        self.render_button(layout.button, buf);
        self.status_line().render(layout.status, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dieroll_core::FaceId;
    use dieroll_core::RollPhase;
    use pretty_assertions::assert_eq;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use tokio::sync::mpsc::UnboundedReceiver;
    use tokio::sync::mpsc::unbounded_channel;

    const WIDTH: u16 = 40;
    const HEIGHT: u16 = 16;

    fn screen() -> (RollScreen, UnboundedReceiver<AppEvent>) {
        let (tx, rx) = unbounded_channel();
        let screen = RollScreen::new(
            AppEventSender::new(tx),
            "🎲 Roll the Dice!".to_string(),
            RollState::default(),
        );
        (screen, rx)
    }

    fn rendered_lines(screen: &RollScreen) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(WIDTH, HEIGHT))
            .unwrap_or_else(|err| panic!("test terminal: {err}"));
        terminal
            .draw(|f| f.render_widget_ref(screen, f.area()))
            .unwrap_or_else(|err| panic!("draw: {err}"));
        let buffer = terminal.backend().buffer();
        (0..HEIGHT)
            .map(|y| {
                (0..WIDTH)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect()
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn layout_stacks_title_die_and_button() {
        let layout = screen_layout(Rect::new(0, 0, WIDTH, HEIGHT));
        assert_eq!(layout.status, Rect::new(0, 15, WIDTH, 1));
        assert!(layout.title.y < layout.die.y);
        assert!(layout.die.bottom() < layout.button.y);
        assert_eq!(layout.die.width, DIE_WIDTH);
        assert_eq!(layout.button.width, 20);
        assert_eq!(layout.button.height, BUTTON_HEIGHT);
        assert_eq!(layout.button.x, (WIDTH - 20) / 2);
    }

    #[test]
    fn renders_title_face_and_button() {
        let (screen, _rx) = screen();
        let lines = rendered_lines(&screen);
        let text = lines.join("\n");

        assert!(text.contains("Roll the Dice!"), "{text}");
        assert!(text.contains("ROLL NOW"), "{text}");
        assert!(text.contains("│    ●    │"), "{text}");
        assert!(lines[15].contains("tap to roll"), "{}", lines[15]);
    }

    #[test]
    fn status_reports_rolling_then_the_outcome() {
        let (mut screen, _rx) = screen();
        screen.set_state(RollState {
            phase: RollPhase::Rolling,
            roll_id: 1,
            ..RollState::default()
        });
        assert!(rendered_lines(&screen)[15].contains("rolling…"));

        let six = FaceId::SIX;
        screen.set_state(RollState {
            current_face: six,
            roll_id: 1,
            ..RollState::default()
        });
        screen.on_roll_settled(RollOutcome {
            roll_id: 1,
            face: six,
        });
        assert!(rendered_lines(&screen)[15].contains("rolled ⚅ 6"));
    }

    #[test]
    fn clicks_inside_the_button_roll() {
        let (mut screen, mut rx) = screen();
        rendered_lines(&screen);
        let button = screen_layout(Rect::new(0, 0, WIDTH, HEIGHT)).button;

        screen.handle_mouse_event(click(button.x, button.y));
        screen.handle_mouse_event(click(button.right() - 1, button.bottom() - 1));
        screen.handle_mouse_event(click(button.right(), button.y));
        screen.handle_mouse_event(click(0, 0));

        assert_eq!(rx.try_recv().ok(), Some(AppEvent::Roll));
        assert_eq!(rx.try_recv().ok(), Some(AppEvent::Roll));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn every_tap_is_forwarded_without_debouncing() {
        let (mut screen, mut rx) = screen();
        for _ in 0..3 {
            screen.handle_key_event(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        }
        screen.handle_key_event(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE));
        screen.handle_key_event(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE));

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(
            events,
            vec![
                AppEvent::Roll,
                AppEvent::Roll,
                AppEvent::Roll,
                AppEvent::Roll,
                AppEvent::ExitRequest,
            ]
        );
    }
}
