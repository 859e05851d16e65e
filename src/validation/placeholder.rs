//! Placeholder and dummy-data detection.
//!
//! Data-driven blocklists of strings that show up when someone forgets
//! to replace form defaults or test data before generating a real
//! invoice. Matching is case-insensitive; names match the whole value,
//! tokens match as substrings.

/// Distinctive placeholder names, matched as substrings: a real name
/// never contains "Max Mustermann". Sorted for the ordering test.
static PLACEHOLDER_NAME_TOKENS: &[&str] = &[
    "beispielkunde",
    "john doe",
    "max mustermann",
    "musterkunde",
    "neuer kunde",
    "testkunde",
];

/// Generic words that are only suspicious as the entire name.
/// Substring matching here would reject real names such as
/// "Kundendienst Krause". Sorted for binary search.
static GENERIC_PLACEHOLDER_NAMES: &[&str] = &["customer", "kunde", "kundenname", "name"];

/// Substrings that mark an address or free-text field as dummy data.
/// Kept to clearly fake tokens; ordinary street and town names must
/// never trip this list.
static PLACEHOLDER_TOKENS: &[&str] = &[
    "beispieladresse",
    "beispielstadt",
    "beispielstraße",
    "john doe",
    "max mustermann",
    "musteradresse",
    "musterstadt",
    "musterstraße",
    "platzhalter",
    "test address",
    "testadresse",
    "testkunde",
    "walterweg",
];

/// Email domains that only exist for testing.
static TEST_EMAIL_SUFFIXES: &[&str] = &["@beispiel.de", "@example.com", "@test.com"];

/// Local parts that mark a test mailbox.
static TEST_EMAIL_PREFIXES: &[&str] = &["beispiel@", "test@"];

/// Whether the customer name is a known placeholder. Distinctive
/// tokens match anywhere in the name, generic words only when they are
/// the whole name.
pub fn is_placeholder_name(name: &str) -> bool {
    let normalized = name.trim().to_lowercase();
    PLACEHOLDER_NAME_TOKENS.iter().any(|t| normalized.contains(t))
        || GENERIC_PLACEHOLDER_NAMES
            .binary_search(&normalized.as_str())
            .is_ok()
}

/// Whether the value contains any placeholder token as a substring.
pub fn contains_placeholder(value: &str) -> bool {
    let normalized = value.to_lowercase();
    PLACEHOLDER_TOKENS.iter().any(|t| normalized.contains(t))
}

/// Whether the email address matches a test-mailbox pattern.
pub fn is_test_email(email: &str) -> bool {
    let normalized = email.trim().to_lowercase();
    TEST_EMAIL_SUFFIXES.iter().any(|s| normalized.ends_with(s))
        || TEST_EMAIL_PREFIXES.iter().any(|p| normalized.starts_with(p))
}

/// Whether a line description carries no real content: leading
/// "test"/"abc"/"xyz", digits only, or no letters and digits at all.
pub fn is_meaningless_description(description: &str) -> bool {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return true;
    }
    let lowered = trimmed.to_lowercase();
    if lowered.starts_with("test") || lowered.starts_with("abc") || lowered.starts_with("xyz") {
        return true;
    }
    let mut has_digit = false;
    let mut has_letter = false;
    for c in trimmed.chars() {
        if c.is_alphabetic() {
            has_letter = true;
        } else if c.is_ascii_digit() {
            has_digit = true;
        }
    }
    // "12345" or "!!! ---" say nothing about the work done.
    (has_digit && !has_letter) || (!has_digit && !has_letter)
}
