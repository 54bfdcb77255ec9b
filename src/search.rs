use crate::store::Contact;

/// Normalize a string for case-insensitive matching.
pub fn normalize(s: &str) -> String {
    s.to_lowercase()
}

pub fn normalize_query(query: &str) -> Option<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(normalize(trimmed))
    }
}

/// Substring match on the contact name only.
pub fn name_matches(name: &str, normalized_query: Option<&str>) -> bool {
    match normalized_query {
        Some(query) => normalize(name).contains(query),
        None => true,
    }
}

/// Display order: by lowercased name, ties keep table order.
pub fn sort_for_display(contacts: &mut [Contact]) {
    contacts.sort_by_cached_key(|contact| normalize(&contact.name));
}

pub fn filter<'a>(contacts: &'a [Contact], query: &str) -> Vec<&'a Contact> {
    let normalized = normalize_query(query);
    contacts
        .iter()
        .filter(|contact| name_matches(&contact.name, normalized.as_deref()))
        .collect()
}
