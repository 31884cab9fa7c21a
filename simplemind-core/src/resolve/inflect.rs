//! English pluralization for the model segment.
//!
//! A fixed rule table plus an exception list. Both directions are
//! deterministic and `singularize(pluralize(w)) == w` for every word the
//! suffix rules cover:
//!
//! | singular ending           | plural      | example          |
//! |---------------------------|-------------|------------------|
//! | `ss`, `us`, `x`, `zz`, `tz`, `ch`, `sh` | `+es` | bus, box, buzz |
//! | consonant + `y`           | `y -> ies`  | city             |
//! | other `s`                 | unchanged   | (already plural) |
//! | anything else             | `+s`        | size, pie, house |
//!
//! Singular words that collide with another class on the way back (`axe`
//! would come back as `ax`, `menu` as `menus`) live in [`IRREGULAR`].

/// (singular, plural) pairs that the suffix rules get wrong
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("foot", "feet"),
    ("tooth", "teeth"),
    ("ox", "oxen"),
    ("quiz", "quizzes"),
    ("axe", "axes"),
    ("ache", "aches"),
    ("cache", "caches"),
    ("niche", "niches"),
    ("cliche", "cliches"),
    ("movie", "movies"),
    ("cookie", "cookies"),
    ("zombie", "zombies"),
    ("calorie", "calories"),
    ("rookie", "rookies"),
    ("selfie", "selfies"),
    ("brownie", "brownies"),
    ("abuse", "abuses"),
    ("excuse", "excuses"),
    ("refuse", "refuses"),
    ("fuse", "fuses"),
    ("muse", "muses"),
    ("use", "uses"),
    ("menu", "menus"),
    ("guru", "gurus"),
    ("emu", "emus"),
    ("crisis", "crises"),
    ("thesis", "theses"),
    ("analysis", "analyses"),
    ("hero", "heroes"),
    ("potato", "potatoes"),
    ("tomato", "tomatoes"),
    ("leaf", "leaves"),
    ("life", "lives"),
    ("knife", "knives"),
    ("wife", "wives"),
    ("half", "halves"),
    ("shelf", "shelves"),
    ("wolf", "wolves"),
];

/// Words with the same singular and plural form
const UNCOUNTABLE: &[&str] = &[
    "news",
    "series",
    "species",
    "information",
    "equipment",
    "software",
    "music",
    "media",
    "data",
];

/// Singular endings pluralized with `es`
const ES_ENDINGS: &[&str] = &["ss", "us", "x", "zz", "tz", "ch", "sh"];

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

/// Pluralize a lower-case ASCII word
pub fn pluralize(word: &str) -> String {
    if word.is_empty() || UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == word) {
        return plural.to_string();
    }
    // Already a known plural
    if IRREGULAR.iter().any(|(_, plural)| *plural == word) {
        return word.to_string();
    }

    if ES_ENDINGS.iter().any(|ending| word.ends_with(ending)) {
        return format!("{word}es");
    }
    // Any other trailing `s` is taken as already plural
    if word.ends_with('s') {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix('y') {
        if stem.chars().last().is_some_and(|c| !is_vowel(c)) {
            return format!("{stem}ies");
        }
    }
    format!("{word}s")
}

/// Singularize a lower-case ASCII word; inverse of [`pluralize`]
pub fn singularize(word: &str) -> String {
    if word.is_empty() || UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }
    if let Some((singular, _)) = IRREGULAR.iter().find(|(_, plural)| *plural == word) {
        return singular.to_string();
    }
    if IRREGULAR.iter().any(|(singular, _)| *singular == word) {
        return word.to_string();
    }

    if let Some(stem) = word.strip_suffix("ies") {
        // `pies`, `ties`: a one-letter stem cannot come from a `-y` word
        return match stem.len() {
            0 => word.to_string(),
            1 => format!("{stem}ie"),
            _ => format!("{stem}y"),
        };
    }
    // `houses`, `causes` keep their `e`; `buses`, `statuses` drop `es`
    if word.ends_with("ouses") || word.ends_with("auses") || word.ends_with("euses") {
        return word[..word.len() - 1].to_string();
    }
    if let Some(stem) = word.strip_suffix("es") {
        if ES_ENDINGS.iter().any(|ending| stem.ends_with(ending)) {
            return stem.to_string();
        }
    }
    if word.ends_with("ss") || word.ends_with("us") {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix('s') {
        if !stem.is_empty() {
            return stem.to_string();
        }
    }
    word.to_string()
}
