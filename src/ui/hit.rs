use ratatui::layout::{Position, Rect};

use super::controller::Action;
use super::fields::FormField;

/// What a click on a region does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Action(Action),
    Field(FormField),
}

/// Clickable regions recorded during the last draw, in paint order.
#[derive(Debug, Default)]
pub struct HitMap {
    regions: Vec<(Rect, Target)>,
}

impl HitMap {
    pub fn clear(&mut self) {
        self.regions.clear();
    }

    pub fn push(&mut self, area: Rect, target: Target) {
        if area.width > 0 && area.height > 0 {
            self.regions.push((area, target));
        }
    }

    /// Topmost region under the cell, so later paints shadow earlier ones.
    pub fn target_at(&self, column: u16, row: u16) -> Option<Target> {
        let position = Position::new(column, row);
        self.regions
            .iter()
            .rev()
            .find(|(area, _)| area.contains(position))
            .map(|(_, target)| *target)
    }
}

#[cfg(test)]
impl HitMap {
    pub fn contains(&self, target: Target) -> bool {
        self.regions.iter().any(|(_, t)| *t == target)
    }

    pub fn area_of(&self, target: Target) -> Option<Rect> {
        self.regions
            .iter()
            .rev()
            .find(|(_, t)| *t == target)
            .map(|(area, _)| *area)
    }
}
