use std::io::stdout;

use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::Terminal;
use tracing::{debug, error};

use crate::config::Config;
use crate::selection::SelectionSlot;
use crate::store::ContactStore;

use super::controller::{Action, Controller, Screen};
use super::draw;
use super::hit::{HitMap, Target};
use super::keymap::key_matches_any;

pub struct App<'a> {
    controller: Controller<'a>,
    config: &'a Config,
    hits: HitMap,
    pointer: Option<(u16, u16)>,
}

impl<'a> App<'a> {
    pub fn new(
        store: &'a ContactStore,
        slot: &'a mut dyn SelectionSlot,
        config: &'a Config,
    ) -> Result<Self> {
        Ok(Self {
            controller: Controller::new(store, slot)?,
            config,
            hits: HitMap::default(),
            pointer: None,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal);

        // Restore before surfacing any loop error
        disable_raw_mode()?;
        terminal.backend_mut().execute(DisableMouseCapture)?;
        terminal.backend_mut().execute(LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop<B>(&mut self, terminal: &mut Terminal<B>) -> Result<()>
    where
        B: Backend,
    {
        loop {
            self.draw(terminal)?;

            if event::poll(self.config.tick)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        if self.handle_key(key) {
                            break;
                        }
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    Event::Resize(_, _) => {}
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        draw::render(
            terminal,
            &self.controller,
            self.config,
            self.pointer,
            &mut self.hits,
        )
    }

    /// Returns true when the application should quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        // Ctrl+C always quits (hardcoded for safety)
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            return true;
        }

        self.controller.clear_status();
        let config = self.config;
        let keys = &config.keys;
        let action = match self.controller.screen_mut() {
            Screen::List(list) => {
                if key_matches_any(&key, &keys.list.quit) {
                    return true;
                }
                list.handle_key(key, &keys.list)
            }
            Screen::Edit(edit) => edit.handle_key(key, &keys.edit),
            Screen::View(view) => view.handle_key(key, &keys.view, &keys.confirm),
        };

        if let Some(action) = action {
            self.dispatch(action);
        }
        false
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Moved => {
                self.pointer = Some((mouse.column, mouse.row));
            }
            MouseEventKind::Down(MouseButton::Left) => {
                self.pointer = Some((mouse.column, mouse.row));
                let target = self.hits.target_at(mouse.column, mouse.row);
                debug!(column = mouse.column, row = mouse.row, ?target, "click");
                match target {
                    Some(Target::Action(action)) => {
                        self.controller.clear_status();
                        self.dispatch(action);
                    }
                    Some(Target::Field(field)) => {
                        if let Screen::Edit(edit) = self.controller.screen_mut() {
                            edit.focus(Some(field));
                        }
                    }
                    None => {
                        if let Screen::Edit(edit) = self.controller.screen_mut() {
                            edit.focus(None);
                        }
                    }
                }
            }
            MouseEventKind::ScrollDown => self.scroll_list(1),
            MouseEventKind::ScrollUp => self.scroll_list(-1),
            _ => {}
        }
    }

    fn scroll_list(&mut self, delta: isize) {
        if let Screen::List(list) = self.controller.screen_mut() {
            list.move_selection(delta);
        }
    }

    /// Failed actions keep the app running and surface in the status bar.
    fn dispatch(&mut self, action: Action) {
        if let Err(err) = self.controller.perform(action) {
            error!(?action, "action failed: {:#}", err);
            self.controller.set_status(format!("Error: {}", err));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::{FileSlot, MemorySlot};
    use crate::ui::controller::ScreenId;
    use crate::ui::fields::FormField;
    use ratatui::backend::TestBackend;
    use std::fs;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> Config {
        let path = dir.path().join("config.toml");
        fs::write(&path, "").unwrap();
        crate::config::load(Some(&path), Some(dir.path())).unwrap()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn click_target(app: &mut App, terminal: &mut Terminal<TestBackend>, target: Target) {
        app.draw(terminal).unwrap();
        let area = app.hits.area_of(target).unwrap();
        app.handle_mouse(click(area.x + area.width / 2, area.y + area.height / 2));
    }

    #[test]
    fn keyboard_round_trip_add_view_delete() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let store = ContactStore::new(&config.contacts_path);
        let mut slot = MemorySlot::default();
        let mut app = App::new(&store, &mut slot, &config).unwrap();

        assert!(!app.handle_key(key(KeyCode::F(2))));
        assert_eq!(app.controller.current(), ScreenId::Edit);
        for c in "Ann".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.controller.current(), ScreenId::List);

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.controller.current(), ScreenId::View);

        app.handle_key(key(KeyCode::Char('d')));
        app.handle_key(key(KeyCode::Char('y')));
        assert_eq!(app.controller.current(), ScreenId::List);
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn quit_keys() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let store = ContactStore::new(&config.contacts_path);
        let mut slot = MemorySlot::default();
        let mut app = App::new(&store, &mut slot, &config).unwrap();

        assert!(app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(app.handle_key(key(KeyCode::Esc)));

        app.handle_key(key(KeyCode::F(2)));
        // Escape cancels the form rather than quitting
        assert!(!app.handle_key(key(KeyCode::Esc)));
        assert_eq!(app.controller.current(), ScreenId::List);
    }

    #[test]
    fn clicks_drive_the_screens() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let store = ContactStore::new(&config.contacts_path);
        store.upsert(None, "Ann", "555", "").unwrap();
        let mut slot = FileSlot::new(&config.selection_path);
        let mut app = App::new(&store, &mut slot, &config).unwrap();
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        click_target(&mut app, &mut terminal, Target::Action(Action::OpenContact(1)));
        assert_eq!(app.controller.current(), ScreenId::View);

        click_target(&mut app, &mut terminal, Target::Action(Action::EditContact));
        assert_eq!(app.controller.current(), ScreenId::Edit);

        click_target(&mut app, &mut terminal, Target::Field(FormField::Email));
        for c in "ann@x.io".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_mouse(click(0, 0));
        app.handle_key(key(KeyCode::Char('z')));

        click_target(&mut app, &mut terminal, Target::Action(Action::Save));
        assert_eq!(app.controller.current(), ScreenId::List);

        let contact = store.load_by_id(1).unwrap().unwrap();
        assert_eq!(contact.email, "ann@x.io");
        assert_eq!(contact.phone, "555");
    }

    #[test]
    fn failed_action_reports_status() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let store = ContactStore::new(&config.contacts_path);
        // A directory in the staging file's place makes every rewrite fail
        fs::create_dir_all(dir.path().join(".contact.txt.tmp")).unwrap();
        let mut slot = MemorySlot::default();
        let mut app = App::new(&store, &mut slot, &config).unwrap();

        app.handle_key(key(KeyCode::F(2)));
        app.handle_key(key(KeyCode::Char('A')));
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.controller.current(), ScreenId::Edit);
        let status = app.controller.status().unwrap();
        assert!(status.starts_with("Error: failed to write contact table"));
    }
}
