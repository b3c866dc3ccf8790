use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use roster::exchange::Exchange;

use crate::error::FormError;
use crate::screen::{ScreenState, UsersScreen};

/// The form control that receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Name,
    Age,
    Married,
    Submit
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Name => Focus::Age,
            Focus::Age => Focus::Married,
            Focus::Married => Focus::Submit,
            Focus::Submit => Focus::Name
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Focus::Name => Focus::Submit,
            Focus::Age => Focus::Name,
            Focus::Married => Focus::Age,
            Focus::Submit => Focus::Married
        }
    }
}

/// What the event loop has to do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Submit,
    Retry,
    Quit
}

pub struct App<M: Exchange> {
    pub screen: UsersScreen<M>,
    pub focus: Focus,
    pub form_error: Option<FormError>
}

impl<M: Exchange> App<M> {
    pub fn new(screen: UsersScreen<M>) -> Self {
        Self {
            screen,
            focus: Focus::Name,
            form_error: None
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Esc => return Action::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Action::Quit
            }
            _ => {}
        }

        match self.screen.state() {
            ScreenState::Error { .. } => match key.code {
                KeyCode::Char('r') => Action::Retry,
                _ => Action::None
            },
            ScreenState::Loading | ScreenState::Submitting => Action::None,
            ScreenState::Ready => self.edit(key)
        }
    }

    fn edit(&mut self, key: KeyEvent) -> Action {
        let form = &mut self.screen.form;
        match key.code {
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.previous(),
            KeyCode::Enter => return Action::Submit,
            KeyCode::Char(' ') if self.focus == Focus::Married => {
                form.is_married = !form.is_married;
            }
            KeyCode::Char(c) => match self.focus {
                Focus::Name => form.name.push(c),
                Focus::Age => form.age.push(c),
                Focus::Married | Focus::Submit => {}
            },
            KeyCode::Backspace => match self.focus {
                Focus::Name => {
                    form.name.pop();
                }
                Focus::Age => {
                    form.age.pop();
                }
                Focus::Married | Focus::Submit => {}
            },
            _ => {}
        }
        self.form_error = None;
        Action::None
    }
}
