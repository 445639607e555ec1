use crate::error::{ChapterizeError, Result};

/// Lexical markers that signal a chapter transition in one language.
///
/// Matching is a case-sensitive substring test against the forms
/// speech-to-text actually emits, so the tables store the capitalized
/// heading spellings. `excluded` phrases veto a match: a narrator saying
/// "back in Chapter Two" announces nothing.
pub struct MarkerTable {
    /// Alternate spellings for the opening section.
    pub prologue: [&'static str; 2],
    pub chapter: &'static str,
    pub epilogue: &'static str,
    pub excluded: &'static [&'static str],
}

impl MarkerTable {
    pub fn contains_marker(&self, text: &str) -> bool {
        text.contains(self.prologue[0])
            || text.contains(self.prologue[1])
            || text.contains(self.chapter)
            || text.contains(self.epilogue)
    }

    pub fn contains_excluded(&self, text: &str) -> bool {
        self.excluded.iter().any(|phrase| text.contains(phrase))
    }

    /// A line announces a chapter when it carries a marker and none of the
    /// excluded phrases.
    pub fn matches(&self, text: &str) -> bool {
        !self.contains_excluded(text) && self.contains_marker(text)
    }
}

const ENGLISH: MarkerTable = MarkerTable {
    prologue: ["Prologue", "Preface"],
    chapter: "Chapter",
    epilogue: "Epilogue",
    excluded: &["in Chapter", "of Chapter", "in the Prologue", "in the Epilogue"],
};

const GERMAN: MarkerTable = MarkerTable {
    prologue: ["Prolog", "Vorwort"],
    chapter: "Kapitel",
    epilogue: "Epilog",
    excluded: &["im Kapitel", "in Kapitel", "des Kapitels"],
};

const SPANISH: MarkerTable = MarkerTable {
    prologue: ["Prólogo", "Prefacio"],
    chapter: "Capítulo",
    epilogue: "Epílogo",
    excluded: &["en el Capítulo", "del Capítulo"],
};

const FRENCH: MarkerTable = MarkerTable {
    prologue: ["Prologue", "Préface"],
    chapter: "Chapitre",
    epilogue: "Épilogue",
    excluded: &["au Chapitre", "du Chapitre"],
};

const ITALIAN: MarkerTable = MarkerTable {
    prologue: ["Prologo", "Prefazione"],
    chapter: "Capitolo",
    epilogue: "Epilogo",
    excluded: &["nel Capitolo", "del Capitolo"],
};

/// (display name, language code) for every configured language.
pub const LANGUAGES: &[(&str, &str)] = &[
    ("English", "en"),
    ("German", "de"),
    ("Spanish", "es"),
    ("French", "fr"),
    ("Italian", "it"),
];

/// Resolve user input (a code, a regional code, or an English name) to a
/// canonical language code.
pub fn resolve_language(input: &str) -> Result<&'static str> {
    let wanted = input.trim().to_lowercase();
    if wanted.is_empty() {
        return Err(ChapterizeError::LanguageNotConfigured(input.to_string()));
    }

    // "en-us" and friends resolve through their primary subtag
    let primary = wanted.split('-').next().unwrap_or(&wanted);

    for &(name, code) in LANGUAGES {
        if code == primary || name.to_lowercase() == wanted {
            return Ok(code);
        }
    }
    Err(ChapterizeError::LanguageNotConfigured(input.to_string()))
}

/// Marker table for a canonical language code, if one is configured.
pub fn table_for(code: &str) -> Option<&'static MarkerTable> {
    match code {
        "en" => Some(&ENGLISH),
        "de" => Some(&GERMAN),
        "es" => Some(&SPANISH),
        "fr" => Some(&FRENCH),
        "it" => Some(&ITALIAN),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_by_code() {
        assert_eq!(resolve_language("en").unwrap(), "en");
        assert_eq!(resolve_language("de").unwrap(), "de");
    }

    #[test]
    fn test_resolve_by_name() {
        assert_eq!(resolve_language("English").unwrap(), "en");
        assert_eq!(resolve_language("french").unwrap(), "fr");
    }

    #[test]
    fn test_resolve_regional_code() {
        assert_eq!(resolve_language("en-us").unwrap(), "en");
        assert_eq!(resolve_language("de-DE").unwrap(), "de");
    }

    #[test]
    fn test_resolve_unknown() {
        assert!(matches!(
            resolve_language("tlh"),
            Err(ChapterizeError::LanguageNotConfigured(_))
        ));
        assert!(resolve_language("").is_err());
    }

    #[test]
    fn test_every_language_has_a_table() {
        for (_, code) in LANGUAGES {
            assert!(table_for(code).is_some(), "missing table for {}", code);
        }
        assert!(table_for("tlh").is_none());
    }

    #[test]
    fn test_marker_matching() {
        let table = table_for("en").unwrap();
        assert!(table.matches("Chapter Twelve"));
        assert!(table.matches("Prologue"));
        assert!(table.matches("Epilogue"));
        assert!(!table.matches("nothing to see here"));
    }

    #[test]
    fn test_excluded_phrase_vetoes_match() {
        let table = table_for("en").unwrap();
        assert!(!table.matches("as we saw in Chapter Two"));
        assert!(!table.matches("at the end of Chapter Nine"));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let table = table_for("en").unwrap();
        assert!(!table.matches("a chapter of accidents"));
    }
}
