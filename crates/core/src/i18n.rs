//! Localized strings for interactive CLI prompts.
//!
//! Lookup falls back to English for unknown languages, then to the key itself
//! for unknown keys, so a missing translation never fails a command.

/// Fallback language.
pub const DEFAULT_LANG: &str = "en";

const EN: &[(&str, &str)] = &[
    ("chat.exit_hint", "Type /exit to quit."),
    (
        "error.no_api_key",
        "Error: AIXPLAIN_API_KEY is not set. See ENV.md to configure.",
    ),
    ("chat.prompt", "> "),
];

const AR: &[(&str, &str)] = &[
    ("chat.exit_hint", "اكتب /exit للخروج."),
    (
        "error.no_api_key",
        "خطأ: لم يتم ضبط AIXPLAIN_API_KEY. راجع ENV.md.",
    ),
    ("chat.prompt", "> "),
];

fn table(lang: &str) -> Option<&'static [(&'static str, &'static str)]> {
    match lang.to_lowercase().as_str() {
        "en" => Some(EN),
        "ar" => Some(AR),
        _ => None,
    }
}

fn lookup(table: &[(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Translate `key` into `lang`.
pub fn t(key: &str, lang: &str) -> String {
    let strings = table(lang).unwrap_or(EN);
    lookup(strings, key)
        .or_else(|| lookup(EN, key))
        .map(str::to_string)
        .unwrap_or_else(|| key.to_string())
}
