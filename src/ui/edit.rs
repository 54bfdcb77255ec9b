use crossterm::event::{Event, KeyEvent};
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

use crate::config::EditKeys;
use crate::store::{Contact, ContactId};

use super::controller::Action;
use super::fields::FormField;
use super::keymap::key_matches_any;

/// Trimmed form values ready for the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub phone: String,
    pub email: String,
}

/// Add/Edit form. `editing` is the id being edited; `None` means creation mode.
#[derive(Debug, Clone)]
pub struct EditScreen {
    editing: Option<ContactId>,
    inputs: [Input; FormField::COUNT],
    active: Option<FormField>,
}

impl EditScreen {
    pub fn new(existing: Option<Contact>) -> Self {
        match existing {
            Some(contact) => Self {
                editing: Some(contact.id),
                inputs: [
                    Input::new(contact.name),
                    Input::new(contact.phone),
                    Input::new(contact.email),
                ],
                active: Some(FormField::Name),
            },
            None => Self {
                editing: None,
                inputs: Default::default(),
                active: Some(FormField::Name),
            },
        }
    }

    pub fn editing_id(&self) -> Option<ContactId> {
        self.editing
    }

    pub fn title(&self) -> &'static str {
        if self.editing.is_some() {
            "Edit Contact"
        } else {
            "Add Contact"
        }
    }

    pub fn value(&self, field: FormField) -> &str {
        self.inputs[field.index()].value()
    }

    pub fn active(&self) -> Option<FormField> {
        self.active
    }

    pub fn visual_cursor(&self, field: FormField) -> usize {
        self.inputs[field.index()].visual_cursor()
    }

    /// Activate `field`, or drop focus from every field with `None`.
    pub fn focus(&mut self, field: Option<FormField>) {
        self.active = field;
    }

    pub fn handle_key(&mut self, key: KeyEvent, keys: &EditKeys) -> Option<Action> {
        if key_matches_any(&key, &keys.cancel) {
            return Some(Action::Cancel);
        }
        if key_matches_any(&key, &keys.save) {
            return Some(Action::Save);
        }
        if key_matches_any(&key, &keys.next_field) {
            self.active = Some(self.active.map_or(FormField::Name, FormField::next));
            return None;
        }
        if key_matches_any(&key, &keys.prev_field) {
            self.active = Some(self.active.map_or(FormField::Email, FormField::prev));
            return None;
        }

        if let Some(field) = self.active {
            self.inputs[field.index()].handle_event(&Event::Key(key));
        }
        None
    }

    /// Trimmed values, or `None` when the name is blank.
    pub fn submission(&self) -> Option<Submission> {
        let name = self.value(FormField::Name).trim();
        if name.is_empty() {
            return None;
        }
        Some(Submission {
            name: name.to_string(),
            phone: self.value(FormField::Phone).trim().to_string(),
            email: self.value(FormField::Email).trim().to_string(),
        })
    }
}
