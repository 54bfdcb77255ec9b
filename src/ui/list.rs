use crossterm::event::{Event, KeyEvent};
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

use crate::config::ListKeys;
use crate::search;
use crate::store::Contact;

use super::controller::Action;
use super::keymap::key_matches_any;

/// List screen: all contacts in display order, narrowed by the search box.
#[derive(Debug, Clone)]
pub struct ListScreen {
    contacts: Vec<Contact>,
    search: Input,
    /// Indices into `contacts` that pass the current filter
    visible: Vec<usize>,
    selected: usize,
}

impl ListScreen {
    pub fn new(mut contacts: Vec<Contact>) -> Self {
        search::sort_for_display(&mut contacts);
        let mut screen = Self {
            contacts,
            search: Input::default(),
            visible: Vec::new(),
            selected: 0,
        };
        screen.rebuild_visible();
        screen
    }

    pub fn query(&self) -> &str {
        self.search.value()
    }

    pub fn search_cursor(&self) -> usize {
        self.search.visual_cursor()
    }

    pub fn visible(&self) -> impl Iterator<Item = &Contact> + '_ {
        self.visible.iter().map(|&index| &self.contacts[index])
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_contact(&self) -> Option<&Contact> {
        self.visible
            .get(self.selected)
            .map(|&index| &self.contacts[index])
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.visible.is_empty() {
            self.selected = 0;
            return;
        }
        let max = self.visible.len() as isize - 1;
        self.selected = (self.selected as isize + delta).clamp(0, max) as usize;
    }

    pub fn handle_key(&mut self, key: KeyEvent, keys: &ListKeys) -> Option<Action> {
        if key_matches_any(&key, &keys.add) {
            return Some(Action::AddContact);
        }
        if key_matches_any(&key, &keys.open) {
            return self
                .selected_contact()
                .map(|contact| Action::OpenContact(contact.id));
        }
        if key_matches_any(&key, &keys.next) {
            self.move_selection(1);
            return None;
        }
        if key_matches_any(&key, &keys.prev) {
            self.move_selection(-1);
            return None;
        }

        if let Some(change) = self.search.handle_event(&Event::Key(key)) {
            if change.value {
                self.rebuild_visible();
            }
        }
        None
    }

    fn rebuild_visible(&mut self) {
        let query = search::normalize_query(self.search.value());
        self.visible = self
            .contacts
            .iter()
            .enumerate()
            .filter(|(_, contact)| search::name_matches(&contact.name, query.as_deref()))
            .map(|(index, _)| index)
            .collect();
        self.selected = self.selected.min(self.visible.len().saturating_sub(1));
    }
}
