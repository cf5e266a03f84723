use crate::assembler::LanguageView;
use serde::Serialize;

/// Language shown in the description header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageFlag {
    pub tag: String,

    /// Placeholder for a language the resource has no data in
    pub disabled: bool,
}

impl LanguageFlag {
    fn enabled(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            disabled: false,
        }
    }

    fn placeholder(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            disabled: true,
        }
    }
}

/// Flags for the languages of `view`, followed by disabled placeholders
///
/// Placeholders come from `assigned_languages`. An administrator with no
/// assigned languages gets every project language instead.
pub fn language_flags(
    view: &LanguageView,
    project_languages: &[String],
    assigned_languages: &[String],
    is_admin: bool,
) -> Vec<LanguageFlag> {
    let mut present: Vec<&str> = view.languages().collect();
    present.sort_unstable();
    present.dedup();

    let mut flags: Vec<LanguageFlag> = present.iter().map(|t| LanguageFlag::enabled(t)).collect();

    let candidates = if assigned_languages.is_empty() && is_admin {
        project_languages
    } else {
        assigned_languages
    };
    for tag in candidates {
        if flags.iter().any(|f| f.tag == *tag) {
            continue;
        }
        flags.push(LanguageFlag::placeholder(tag));
    }
    flags
}
