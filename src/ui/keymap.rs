use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Check if the key event matches any of the bindings in the list
pub fn key_matches_any(event: &KeyEvent, bindings: &[String]) -> bool {
    bindings.iter().any(|b| key_matches_single(event, b))
}

/// Check if the key event matches a single binding string
pub fn key_matches_single(event: &KeyEvent, binding: &str) -> bool {
    let trimmed = binding.trim();
    if trimmed.is_empty() {
        return false;
    }

    // Ctrl/Alt/Super combinations are never bindable
    let disallowed = KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER;
    if event.modifiers.intersects(disallowed) {
        return false;
    }

    match trimmed.to_ascii_lowercase().as_str() {
        "enter" => matches!(event.code, KeyCode::Enter),
        "tab" => matches!(event.code, KeyCode::Tab),
        "backtab" | "shift+tab" => matches!(event.code, KeyCode::BackTab),
        "backspace" => matches!(event.code, KeyCode::Backspace),
        "esc" | "escape" => matches!(event.code, KeyCode::Esc),
        "space" => matches!(event.code, KeyCode::Char(' ')),
        "insert" | "ins" => matches!(event.code, KeyCode::Insert),
        "delete" | "del" => matches!(event.code, KeyCode::Delete),
        "up" => matches!(event.code, KeyCode::Up),
        "down" => matches!(event.code, KeyCode::Down),
        "left" => matches!(event.code, KeyCode::Left),
        "right" => matches!(event.code, KeyCode::Right),
        "pageup" | "page_up" => matches!(event.code, KeyCode::PageUp),
        "pagedown" | "page_down" => matches!(event.code, KeyCode::PageDown),
        "home" => matches!(event.code, KeyCode::Home),
        "end" => matches!(event.code, KeyCode::End),
        name => {
            if let Some(n) = function_key_number(name) {
                return event.code == KeyCode::F(n);
            }
            // Single character - case-sensitive (e != E, since E requires Shift)
            let mut chars = trimmed.chars();
            if let (Some(first), None) = (chars.next(), chars.next()) {
                matches!(event.code, KeyCode::Char(c) if c == first)
            } else {
                false
            }
        }
    }
}

fn function_key_number(name: &str) -> Option<u8> {
    let digits = name.strip_prefix('f')?;
    match digits.parse::<u8>() {
        Ok(n) if (1..=12).contains(&n) => Some(n),
        _ => None,
    }
}

/// Label for the footer hint: the first configured binding, or "-".
pub fn hint(bindings: &[String]) -> &str {
    bindings
        .iter()
        .map(|b| b.trim())
        .find(|b| !b.is_empty())
        .unwrap_or("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn named_keys_are_case_insensitive() {
        assert!(key_matches_single(&key(KeyCode::Enter), "ENTER"));
        assert!(key_matches_single(&key(KeyCode::Esc), "Escape"));
        assert!(key_matches_single(&key(KeyCode::BackTab), "shift+tab"));
        assert!(key_matches_single(&key(KeyCode::F(2)), "F2"));
        assert!(key_matches_single(&key(KeyCode::Delete), "Delete"));
        assert!(!key_matches_single(&key(KeyCode::F(2)), "F13"));
    }

    #[test]
    fn single_characters_are_case_sensitive() {
        assert!(key_matches_single(&key(KeyCode::Char('e')), "e"));
        assert!(!key_matches_single(&key(KeyCode::Char('E')), "e"));
        assert!(key_matches_single(
            &KeyEvent::new(KeyCode::Char('E'), KeyModifiers::SHIFT),
            "E"
        ));
    }

    #[test]
    fn control_combinations_never_match() {
        let ctrl_e = KeyEvent::new(KeyCode::Char('e'), KeyModifiers::CONTROL);
        assert!(!key_matches_single(&ctrl_e, "e"));
    }

    #[test]
    fn hint_skips_blank_bindings() {
        let bindings = vec![" ".to_string(), "F2".to_string()];
        assert_eq!(hint(&bindings), "F2");
        assert_eq!(hint(&[]), "-");
    }
}
