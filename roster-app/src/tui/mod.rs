//! Terminal front end: form on top, user list below.

mod app;
mod ui;

pub use app::{Action, App, Focus};

use std::io;

use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen}
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use roster::exchange::Exchange;

use crate::{build_client, AppConfig, AppError, UsersScreen};

/// Run the UI until the user quits.
pub async fn run(config: &AppConfig) -> Result<(), AppError> {
    let client = build_client(&config.api_url)?;
    let mut app = App::new(UsersScreen::new(client));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.map_err(AppError::from)
}

async fn run_app<B: ratatui::backend::Backend, M: Exchange>(
    terminal: &mut Terminal<B>,
    app: &mut App<M>
) -> io::Result<()> {
    terminal.draw(|f| ui::draw(f, app))?;
    app.screen.mount().await;

    let mut events = EventStream::new();
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        let key = match events.next().await {
            Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => key,
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(e),
            None => return Ok(())
        };

        match app.handle_key(key) {
            Action::Quit => return Ok(()),
            Action::Retry => app.screen.retry().await,
            Action::Submit => match app.screen.begin_submit() {
                Ok(variables) => {
                    app.form_error = None;
                    terminal.draw(|f| ui::draw(f, app))?;
                    app.screen.complete_submit(variables).await;
                    app.focus = Focus::Name;
                }
                Err(error) => app.form_error = Some(error)
            },
            Action::None => {}
        }
    }
}
