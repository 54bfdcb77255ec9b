use anyhow::Result;
use ratatui::backend::Backend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::{Frame, Terminal};

use crate::config::{Config, RgbColor, UiColors, UiLayout};

use super::controller::{Action, Controller, Screen};
use super::edit::EditScreen;
use super::fields::FormField;
use super::hit::{HitMap, Target};
use super::keymap::hint;
use super::list::ListScreen;
use super::view::ViewScreen;

const EMPTY_LIST: &str = "No contacts found";
const CONFIRM_MESSAGE: &str = "Are you sure you want to delete?";
const SEARCH_HEIGHT: u16 = 3;
const FIELD_HEIGHT: u16 = 3;
const BUTTON_HEIGHT: u16 = 3;
const ADD_BUTTON_WIDTH: u16 = 5;

struct Painter<'a> {
    colors: &'a UiColors,
    layout: &'a UiLayout,
    pointer: Option<(u16, u16)>,
}

pub fn render<B: Backend>(
    terminal: &mut Terminal<B>,
    controller: &Controller<'_>,
    config: &Config,
    pointer: Option<(u16, u16)>,
    hits: &mut HitMap,
) -> Result<()> {
    let painter = Painter {
        colors: &config.ui.colors,
        layout: &config.ui.layout,
        pointer,
    };
    hits.clear();
    terminal.draw(|frame| draw_frame(frame, controller, config, &painter, hits))?;
    Ok(())
}

fn draw_frame(
    frame: &mut Frame<'_>,
    controller: &Controller<'_>,
    config: &Config,
    painter: &Painter<'_>,
    hits: &mut HitMap,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    match controller.screen() {
        Screen::List(list) => draw_list(frame, layout[0], list, painter, hits),
        Screen::Edit(edit) => draw_edit(frame, layout[0], edit, painter, hits),
        Screen::View(view) => draw_view(frame, layout[0], view, painter, hits),
    }

    draw_footer(frame, layout[1], controller, config, painter);
}

// =============================================================================
// List
// =============================================================================

fn draw_list(
    frame: &mut Frame<'_>,
    area: Rect,
    list: &ListScreen,
    painter: &Painter<'_>,
    hits: &mut HitMap,
) {
    let column = centered_column(area, painter.layout.list_width);
    if column.height < SEARCH_HEIGHT {
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(SEARCH_HEIGHT), Constraint::Min(0)])
        .split(column);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(ADD_BUTTON_WIDTH)])
        .split(rows[0]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(accent_style(painter))
        .title("Search");
    let inner = block.inner(top[0]);
    frame.render_widget(block, top[0]);
    let scroll = draw_input(frame, inner, list.query(), list.search_cursor());
    if inner.width > 0 {
        let cursor = (list.search_cursor() as u16).saturating_sub(scroll);
        frame.set_cursor_position(Position::new(inner.x + cursor.min(inner.width - 1), inner.y));
    }

    draw_button(
        frame,
        top[1],
        "+",
        painter.colors.accent,
        painter,
        hits,
        Action::AddContact,
    );

    let body = rows[1];
    if body.height == 0 {
        return;
    }
    if list.visible_len() == 0 {
        frame.render_widget(
            Paragraph::new(EMPTY_LIST)
                .alignment(Alignment::Center)
                .style(Style::default().fg(color(painter.colors.border))),
            Rect { height: 1, ..body },
        );
        return;
    }

    let height = body.height as usize;
    let offset = (list.selected() + 1).saturating_sub(height);
    for (row, (index, contact)) in list
        .visible()
        .enumerate()
        .skip(offset)
        .take(height)
        .enumerate()
    {
        let line_area = Rect {
            y: body.y + row as u16,
            height: 1,
            ..body
        };
        let style = if index == list.selected() {
            selection_style(painter)
        } else if hovered(line_area, painter.pointer) {
            Style::default().fg(color(painter.colors.hover))
        } else {
            Style::default()
        };
        frame.render_widget(
            Paragraph::new(Line::from(format!(" {}", contact.name))).style(style),
            line_area,
        );
        hits.push(line_area, Target::Action(Action::OpenContact(contact.id)));
    }
}

// =============================================================================
// Add / Edit
// =============================================================================

fn draw_edit(
    frame: &mut Frame<'_>,
    area: Rect,
    edit: &EditScreen,
    painter: &Painter<'_>,
    hits: &mut HitMap,
) {
    let column = centered_column(area, painter.layout.field_width);

    let mut constraints = vec![Constraint::Length(2)];
    for _ in FormField::ALL {
        constraints.push(Constraint::Length(1));
        constraints.push(Constraint::Length(FIELD_HEIGHT));
    }
    constraints.push(Constraint::Length(1));
    constraints.push(Constraint::Length(BUTTON_HEIGHT));
    constraints.push(Constraint::Min(0));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(column);

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(edit.title(), title_style(painter))))
            .alignment(Alignment::Center),
        rows[0],
    );

    for field in FormField::ALL {
        let label_area = rows[1 + field.index() * 2];
        let box_area = rows[2 + field.index() * 2];
        let active = edit.active() == Some(field);

        frame.render_widget(Paragraph::new(field.label()), label_area);

        let border = if active {
            accent_style(painter)
        } else {
            Style::default().fg(color(painter.colors.border))
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .style(Style::default().bg(color(painter.colors.field_bg)));
        let inner = block.inner(box_area);
        frame.render_widget(block, box_area);
        let scroll = draw_input(frame, inner, edit.value(field), edit.visual_cursor(field));

        if active && inner.width > 0 {
            let cursor = (edit.visual_cursor(field) as u16).saturating_sub(scroll);
            frame.set_cursor_position(Position::new(
                inner.x + cursor.min(inner.width - 1),
                inner.y,
            ));
        }
        hits.push(box_area, Target::Field(field));
    }

    let buttons_row = rows[2 + FormField::COUNT * 2];
    let [cancel, save] = button_row(buttons_row, painter.layout.button_width);
    draw_button(
        frame,
        cancel,
        "×",
        painter.colors.danger,
        painter,
        hits,
        Action::Cancel,
    );
    draw_button(
        frame,
        save,
        "√",
        painter.colors.confirm,
        painter,
        hits,
        Action::Save,
    );
}

// =============================================================================
// View
// =============================================================================

fn draw_view(
    frame: &mut Frame<'_>,
    area: Rect,
    view: &ViewScreen,
    painter: &Painter<'_>,
    hits: &mut HitMap,
) {
    let column = centered_column(area, painter.layout.list_width);
    let contact = view.contact();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(BUTTON_HEIGHT),
            Constraint::Min(0),
        ])
        .split(column);

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            contact.name.as_str(),
            title_style(painter),
        )))
        .alignment(Alignment::Center),
        rows[0],
    );
    frame.render_widget(Paragraph::new(detail_line("Phone", &contact.phone, painter)), rows[1]);
    frame.render_widget(Paragraph::new(detail_line("Email", &contact.email, painter)), rows[2]);

    if view.confirming() {
        // Buttons underneath stay visible but are not clickable
        let mut inert = HitMap::default();
        draw_view_buttons(frame, rows[4], painter, &mut inert);
        draw_confirm_modal(frame, area, painter, hits);
    } else {
        draw_view_buttons(frame, rows[4], painter, hits);
    }
}

fn draw_view_buttons(frame: &mut Frame<'_>, area: Rect, painter: &Painter<'_>, hits: &mut HitMap) {
    let width = painter.layout.button_width;
    let slots = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(width),
            Constraint::Length(width),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(area);

    draw_button(frame, slots[0], "Back", painter.colors.accent, painter, hits, Action::Back);
    draw_button(
        frame,
        slots[1],
        "Edit",
        painter.colors.accent,
        painter,
        hits,
        Action::EditContact,
    );
    draw_button(
        frame,
        slots[2],
        "Delete",
        painter.colors.danger,
        painter,
        hits,
        Action::RequestDelete,
    );
}

fn draw_confirm_modal(frame: &mut Frame<'_>, area: Rect, painter: &Painter<'_>, hits: &mut HitMap) {
    let message_width = CONFIRM_MESSAGE.chars().count() as u16 + 4;
    let buttons_width = painter
        .layout
        .button_width
        .saturating_mul(2)
        .saturating_add(4);
    let width = message_width.max(buttons_width);
    let popup = centered_rect(area, width, 3 + BUTTON_HEIGHT + 2);

    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color(painter.colors.danger)))
        .title("Delete");
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(BUTTON_HEIGHT),
            Constraint::Min(0),
        ])
        .split(inner);
    frame.render_widget(
        Paragraph::new(CONFIRM_MESSAGE).alignment(Alignment::Center),
        rows[0],
    );

    let [yes, no] = button_row(rows[2], painter.layout.button_width);
    draw_button(
        frame,
        yes,
        "Yes",
        painter.colors.danger,
        painter,
        hits,
        Action::ConfirmDelete,
    );
    draw_button(
        frame,
        no,
        "No",
        painter.colors.accent,
        painter,
        hits,
        Action::CancelDelete,
    );
}

// =============================================================================
// Footer
// =============================================================================

fn draw_footer(
    frame: &mut Frame<'_>,
    area: Rect,
    controller: &Controller<'_>,
    config: &Config,
    painter: &Painter<'_>,
) {
    let keys = &config.keys;
    let message = match (controller.status(), controller.screen()) {
        (_, Screen::View(view)) if view.confirming() => format!(
            "{}: confirm  {}: cancel",
            hint(&keys.confirm.confirm),
            hint(&keys.confirm.cancel)
        ),
        (Some(status), _) => status.to_string(),
        (None, Screen::List(_)) => format!(
            "Type to search  {}: add  {}: open  {}: quit",
            hint(&keys.list.add),
            hint(&keys.list.open),
            hint(&keys.list.quit)
        ),
        (None, Screen::Edit(_)) => format!(
            "{}: next field  {}: save  {}: cancel",
            hint(&keys.edit.next_field),
            hint(&keys.edit.save),
            hint(&keys.edit.cancel)
        ),
        (None, Screen::View(_)) => format!(
            "{}: edit  {}: delete  {}: back",
            hint(&keys.view.edit),
            hint(&keys.view.delete),
            hint(&keys.view.back)
        ),
    };

    let style = Style::default()
        .fg(color(painter.colors.status_fg))
        .bg(color(painter.colors.status_bg));
    let background = Block::default().style(Style::default().bg(color(painter.colors.status_bg)));
    frame.render_widget(background, area);
    frame.render_widget(Paragraph::new(message).style(style), area);
}

// =============================================================================
// Helpers
// =============================================================================

/// Render a single-line input value, scrolled so the cursor stays visible.
/// Returns the horizontal scroll applied.
fn draw_input(frame: &mut Frame<'_>, area: Rect, value: &str, cursor: usize) -> u16 {
    if area.width == 0 || area.height == 0 {
        return 0;
    }
    let scroll = (cursor as u16).saturating_sub(area.width - 1);
    frame.render_widget(Paragraph::new(value).scroll((0, scroll)), area);
    scroll
}

fn draw_button(
    frame: &mut Frame<'_>,
    area: Rect,
    label: &str,
    rgb: RgbColor,
    painter: &Painter<'_>,
    hits: &mut HitMap,
    action: Action,
) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let style = if hovered(area, painter.pointer) {
        Style::default()
            .fg(color(painter.colors.hover))
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(color(rgb))
    };
    let block = Block::default().borders(Borders::ALL).border_style(style);
    frame.render_widget(
        Paragraph::new(Span::styled(label, style))
            .alignment(Alignment::Center)
            .block(block),
        area,
    );
    hits.push(area, Target::Action(action));
}

fn detail_line<'a>(label: &'a str, value: &'a str, painter: &Painter<'_>) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{}: ", label), accent_style(painter)),
        Span::raw(value),
    ])
}

/// Two buttons side by side, centered in `area`.
fn button_row(area: Rect, button_width: u16) -> [Rect; 2] {
    let width = button_width.saturating_mul(2).saturating_add(2).min(area.width);
    let row = centered_column(area, width);
    let half = row.width.saturating_sub(2) / 2;
    [
        Rect { width: half, ..row },
        Rect {
            x: row.x + row.width - half,
            width: half,
            ..row
        },
    ]
}

fn centered_column(area: Rect, width: u16) -> Rect {
    let width = width.min(area.width);
    Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..area
    }
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn hovered(area: Rect, pointer: Option<(u16, u16)>) -> bool {
    pointer.is_some_and(|(column, row)| area.contains(Position::new(column, row)))
}

fn selection_style(painter: &Painter<'_>) -> Style {
    Style::default()
        .fg(color(painter.colors.selection_fg))
        .bg(color(painter.colors.selection_bg))
}

fn accent_style(painter: &Painter<'_>) -> Style {
    Style::default().fg(color(painter.colors.accent))
}

fn title_style(painter: &Painter<'_>) -> Style {
    accent_style(painter).add_modifier(Modifier::BOLD)
}

fn color(rgb: RgbColor) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}
