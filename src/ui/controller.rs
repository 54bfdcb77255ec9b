use anyhow::Result;
use tracing::{debug, info};

use crate::selection::SelectionSlot;
use crate::store::{ContactId, ContactStore};

use super::edit::EditScreen;
use super::list::ListScreen;
use super::view::ViewScreen;

/// Screens the controller can enter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenId {
    List,
    Edit,
    View,
}

/// Logical user intents, produced by keys or clicks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    AddContact,
    OpenContact(ContactId),
    Save,
    Cancel,
    Back,
    EditContact,
    RequestDelete,
    ConfirmDelete,
    CancelDelete,
}

#[derive(Debug)]
pub enum Screen {
    List(ListScreen),
    Edit(EditScreen),
    View(ViewScreen),
}

/// Screen state machine. Owns the active screen and routes the selected id
/// between screens through the selection slot.
pub struct Controller<'a> {
    store: &'a ContactStore,
    slot: &'a mut dyn SelectionSlot,
    screen: Screen,
    status: Option<String>,
}

impl<'a> Controller<'a> {
    pub fn new(store: &'a ContactStore, slot: &'a mut dyn SelectionSlot) -> Result<Self> {
        let mut controller = Self {
            store,
            slot,
            screen: Screen::List(ListScreen::new(Vec::new())),
            status: None,
        };
        controller.enter(ScreenId::List)?;
        Ok(controller)
    }

    pub fn current(&self) -> ScreenId {
        match self.screen {
            Screen::List(_) => ScreenId::List,
            Screen::Edit(_) => ScreenId::Edit,
            Screen::View(_) => ScreenId::View,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screen
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status<S: Into<String>>(&mut self, message: S) {
        self.status = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// Build and activate `target` from the store and the slot.
    ///
    /// View without a resolvable selection lands on List instead.
    pub fn enter(&mut self, target: ScreenId) -> Result<()> {
        let screen = match target {
            ScreenId::List => {
                self.slot.write(None)?;
                Screen::List(ListScreen::new(self.store.load_all()?))
            }
            ScreenId::Edit => {
                let existing = match self.slot.read() {
                    Some(id) => self.store.load_by_id(id)?,
                    None => None,
                };
                if existing.is_some() {
                    self.slot.write(None)?;
                }
                Screen::Edit(EditScreen::new(existing))
            }
            ScreenId::View => {
                let selected = self.slot.read();
                let contact = match selected {
                    Some(id) => self.store.load_by_id(id)?,
                    None => None,
                };
                match contact {
                    Some(contact) => Screen::View(ViewScreen::new(contact)),
                    None => {
                        debug!(?selected, "selection unresolved, returning to list");
                        return self.enter(ScreenId::List);
                    }
                }
            }
        };

        debug!(screen = ?target, "entered screen");
        self.screen = screen;
        Ok(())
    }

    /// Apply `action` to the active screen, entering the next screen if the
    /// action leads somewhere. Actions foreign to the active screen are ignored.
    pub fn perform(&mut self, action: Action) -> Result<()> {
        let current = self.current();
        let next = match (&mut self.screen, action) {
            (Screen::List(_), Action::AddContact) => Some(ScreenId::Edit),
            (Screen::List(_), Action::OpenContact(id)) => {
                self.slot.write(Some(id))?;
                Some(ScreenId::View)
            }
            (Screen::Edit(_), Action::Cancel) => Some(ScreenId::List),
            (Screen::Edit(edit), Action::Save) => match edit.submission() {
                Some(values) => {
                    let editing = edit.editing_id();
                    let id =
                        self.store
                            .upsert(editing, &values.name, &values.phone, &values.email)?;
                    if editing.is_some() {
                        self.slot.write(None)?;
                    }
                    info!(id, updated = editing.is_some(), "saved contact");
                    self.status = Some(format!("Saved {}", values.name));
                    Some(ScreenId::List)
                }
                None => {
                    self.status = Some("Name is required".to_string());
                    None
                }
            },
            (Screen::View(_), Action::Back) => Some(ScreenId::List),
            (Screen::View(view), Action::EditContact) => {
                self.slot.write(Some(view.contact().id))?;
                Some(ScreenId::Edit)
            }
            (Screen::View(view), Action::RequestDelete) => {
                view.begin_delete();
                None
            }
            (Screen::View(view), Action::CancelDelete) => {
                view.cancel_delete();
                None
            }
            (Screen::View(view), Action::ConfirmDelete) if view.confirming() => {
                let contact = view.contact();
                self.store.delete(contact.id)?;
                info!(id = contact.id, "deleted contact");
                self.status = Some(format!("Deleted {}", contact.name));
                Some(ScreenId::List)
            }
            (_, action) => {
                debug!(screen = ?current, ?action, "action ignored on this screen");
                None
            }
        };

        if let Some(target) = next {
            self.enter(target)?;
        }
        Ok(())
    }
}
