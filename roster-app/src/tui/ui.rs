//! TUI rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame
};
use roster::exchange::Exchange;

use super::app::{App, Focus};
use crate::screen::{ScreenState, User};

pub fn draw<M: Exchange>(f: &mut Frame, app: &App<M>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(8), // Form
            Constraint::Min(0),    // List
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    let title = Paragraph::new("Roster - Users")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    draw_form(f, app, chunks[1]);
    draw_list(f, app, chunks[2]);
    draw_help(f, app, chunks[3]);
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

fn input_line<'a>(label: &'a str, value: &'a str, focused: bool) -> Line<'a> {
    let cursor = if focused { "_" } else { "" };
    Line::from(vec![
        Span::styled(format!("{label:<8}"), focus_style(focused)),
        Span::raw(value),
        Span::styled(cursor, Style::default().fg(Color::Yellow))
    ])
}

fn draw_form<M: Exchange>(f: &mut Frame, app: &App<M>, area: Rect) {
    let screen = &app.screen;
    let form = &screen.form;
    let submitting = *screen.state() == ScreenState::Submitting;

    let married = if form.is_married { "[x]" } else { "[ ]" };
    let button = if submitting {
        "[ Creating... ]"
    } else {
        "[ Create User ]"
    };
    let button_style = if screen.can_submit() {
        focus_style(app.focus == Focus::Submit)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let mut lines = vec![
        input_line("Name", &form.name, app.focus == Focus::Name),
        input_line("Age", &form.age, app.focus == Focus::Age),
        Line::from(vec![
            Span::styled(
                format!("{:<8}", "Married"),
                focus_style(app.focus == Focus::Married)
            ),
            Span::raw(married)
        ]),
        Line::from(Span::styled(button, button_style))
    ];

    let error = app
        .form_error
        .as_ref()
        .map(|e| e.to_string())
        .or_else(|| screen.creation_error().map(|e| format!("Error: {e}")));
    if let Some(error) = error {
        lines.push(Line::from(Span::styled(error, Style::default().fg(Color::Red))));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Create User");
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn user_item(user: &User) -> ListItem<'_> {
    let married = match user.is_married {
        Some(true) => "married",
        Some(false) => "single",
        None => "-"
    };
    let age = user
        .age
        .map(|age| age.to_string())
        .unwrap_or_else(|| "-".to_owned());
    ListItem::new(Line::from(vec![
        Span::styled(
            format!("{:<20}", user.name.as_deref().unwrap_or("(no name)")),
            Style::default().add_modifier(Modifier::BOLD)
        ),
        Span::raw(format!("age {:<4}", age)),
        Span::styled(married, Style::default().fg(Color::Gray))
    ]))
}

fn draw_list<M: Exchange>(f: &mut Frame, app: &App<M>, area: Rect) {
    let screen = &app.screen;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(screen.header());

    match screen.state() {
        ScreenState::Loading => {
            f.render_widget(Paragraph::new("Loading...").block(block), area);
        }
        ScreenState::Error { message } => {
            let lines = vec![
                Line::from(Span::styled(
                    format!("Error: {message}"),
                    Style::default().fg(Color::Red)
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "[ Retry (r) ]",
                    Style::default().fg(Color::Yellow)
                ))
            ];
            f.render_widget(
                Paragraph::new(lines).wrap(Wrap { trim: true }).block(block),
                area
            );
        }
        ScreenState::Ready | ScreenState::Submitting if screen.users().is_empty() => {
            f.render_widget(Paragraph::new("No users found").block(block), area);
        }
        ScreenState::Ready | ScreenState::Submitting => {
            let items: Vec<ListItem> = screen.users().iter().map(user_item).collect();
            f.render_widget(List::new(items).block(block), area);
        }
    }
}

fn draw_help<M: Exchange>(f: &mut Frame, app: &App<M>, area: Rect) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut spans = vec![
        Span::styled("Tab: ", bold),
        Span::raw("Next field  "),
        Span::styled("Space: ", bold),
        Span::raw("Toggle married  "),
        Span::styled("Enter: ", bold),
        Span::raw("Create  ")
    ];
    if matches!(app.screen.state(), ScreenState::Error { .. }) {
        spans.push(Span::styled("r: ", bold));
        spans.push(Span::raw("Retry  "));
    }
    spans.push(Span::styled("Esc: ", bold));
    spans.push(Span::raw("Quit"));

    let help = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(help, area);
}

#[cfg(test)]
mod tests {
    use ratatui::{backend::TestBackend, Terminal};
    use roster::default_exchanges::FetchExchangeImpl;
    use roster_normalized_cache::NormalizedCacheImpl;

    use super::*;
    use crate::{build_client, FormError, UsersScreen};

    type TestApp = App<NormalizedCacheImpl<FetchExchangeImpl>>;

    fn app() -> TestApp {
        let client = build_client("http://127.0.0.1:9").expect("valid url");
        App::new(UsersScreen::new(client))
    }

    fn user(id: &str, name: &str, age: i64, is_married: bool) -> User {
        User {
            id: Some(id.to_owned()),
            name: Some(name.to_owned()),
            age: Some(age),
            is_married: Some(is_married)
        }
    }

    fn render(app: &TestApp) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).expect("terminal");
        terminal.draw(|f| draw(f, app)).expect("draws");
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn shows_loading_first() {
        let screen = render(&app());
        assert!(screen.contains("Loading..."));
        assert!(screen.contains("User List (0)"));
    }

    #[test]
    fn lists_users_with_a_count() {
        let mut app = app();
        app.screen.set_ready(vec![
            user("1", "Lee", 25, true),
            user("2", "Kim", 26, false)
        ]);
        let screen = render(&app);
        assert!(screen.contains("User List (2)"));
        assert!(screen.contains("Lee"));
        assert!(screen.contains("age 26"));
        assert!(screen.contains("[ Create User ]"));
    }

    #[test]
    fn empty_lists_say_so() {
        let mut app = app();
        app.screen.set_ready(Vec::new());
        assert!(render(&app).contains("No users found"));
    }

    #[test]
    fn errors_offer_a_retry() {
        let mut app = app();
        app.screen.set_state(ScreenState::Error {
            message: "connection refused".into()
        });
        let screen = render(&app);
        assert!(screen.contains("Error: connection refused"));
        assert!(screen.contains("Retry (r)"));
    }

    #[test]
    fn submitting_relabels_the_button() {
        let mut app = app();
        app.screen.set_ready(Vec::new());
        app.screen.set_state(ScreenState::Submitting);
        assert!(render(&app).contains("[ Creating... ]"));
    }

    #[test]
    fn form_errors_are_shown_inline() {
        let mut app = app();
        app.screen.set_ready(Vec::new());
        app.form_error = Some(FormError::InvalidAge("abc".into()));
        assert!(render(&app).contains("Age must be a whole number, got \"abc\""));
    }
}
