use crossterm::event::KeyEvent;

use crate::config::{ConfirmKeys, ViewKeys};
use crate::store::Contact;

use super::controller::Action;
use super::keymap::key_matches_any;

/// Read-only view of one contact, with an optional delete confirmation.
#[derive(Debug, Clone)]
pub struct ViewScreen {
    contact: Contact,
    confirming: bool,
}

impl ViewScreen {
    pub fn new(contact: Contact) -> Self {
        Self {
            contact,
            confirming: false,
        }
    }

    pub fn contact(&self) -> &Contact {
        &self.contact
    }

    pub fn confirming(&self) -> bool {
        self.confirming
    }

    pub fn begin_delete(&mut self) {
        self.confirming = true;
    }

    pub fn cancel_delete(&mut self) {
        self.confirming = false;
    }

    /// While the confirmation is open only its keys are live.
    pub fn handle_key(
        &self,
        key: KeyEvent,
        keys: &ViewKeys,
        confirm: &ConfirmKeys,
    ) -> Option<Action> {
        if self.confirming {
            if key_matches_any(&key, &confirm.confirm) {
                return Some(Action::ConfirmDelete);
            }
            if key_matches_any(&key, &confirm.cancel) {
                return Some(Action::CancelDelete);
            }
            return None;
        }

        if key_matches_any(&key, &keys.back) {
            Some(Action::Back)
        } else if key_matches_any(&key, &keys.edit) {
            Some(Action::EditContact)
        } else if key_matches_any(&key, &keys.delete) {
            Some(Action::RequestDelete)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn screen() -> ViewScreen {
        ViewScreen::new(Contact {
            id: 1,
            name: "Ann".into(),
            phone: String::new(),
            email: String::new(),
        })
    }

    fn press(screen: &ViewScreen, code: KeyCode) -> Option<Action> {
        screen.handle_key(
            KeyEvent::new(code, KeyModifiers::NONE),
            &ViewKeys::default(),
            &ConfirmKeys::default(),
        )
    }

    #[test]
    fn normal_state_keys() {
        let screen = screen();
        assert_eq!(press(&screen, KeyCode::Esc), Some(Action::Back));
        assert_eq!(press(&screen, KeyCode::Char('e')), Some(Action::EditContact));
        assert_eq!(press(&screen, KeyCode::Char('d')), Some(Action::RequestDelete));
        assert_eq!(press(&screen, KeyCode::Char('y')), None);
    }

    #[test]
    fn confirm_state_only_answers_yes_or_no() {
        let mut screen = screen();
        screen.begin_delete();
        assert_eq!(press(&screen, KeyCode::Char('e')), None);
        assert_eq!(press(&screen, KeyCode::Char('y')), Some(Action::ConfirmDelete));
        assert_eq!(press(&screen, KeyCode::Esc), Some(Action::CancelDelete));

        screen.cancel_delete();
        assert!(!screen.confirming());
    }
}
