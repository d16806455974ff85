//! URL slug generation

use std::collections::HashSet;

const MAX_SLUG_LEN: usize = 80;

fn fold_ascii(c: char) -> Option<&'static str> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' => "a",
        'æ' => "ae",
        'ç' | 'č' | 'ć' => "c",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' => "e",
        'ì' | 'í' | 'î' | 'ï' | 'ī' => "i",
        'ñ' | 'ń' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' => "o",
        'œ' => "oe",
        'ß' => "ss",
        'š' | 'ś' => "s",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' => "u",
        'ý' | 'ÿ' => "y",
        'ž' | 'ź' | 'ż' => "z",
        _ => return None,
    };
    Some(folded)
}

/// Turn free text into a lowercase, hyphen-separated slug
///
/// Empty input (or input with no usable characters) yields `"untitled"`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else if let Some(folded) = fold_ascii(c) {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push_str(folded);
        } else {
            pending_dash = true;
        }
    }

    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
        while slug.ends_with('-') {
            slug.pop();
        }
    }

    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

/// `base` if unused, otherwise the smallest free `base-N`
pub fn next_free_slug<S: AsRef<str>>(base: &str, existing: &[S]) -> String {
    let taken: HashSet<&str> = existing.iter().map(AsRef::as_ref).collect();
    if !taken.contains(base) {
        return base.to_string();
    }
    (1u32..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| !taken.contains(candidate.as_str()))
        .unwrap_or_else(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("  Mayor Opens New  Clinic!! "), "mayor-opens-new-clinic");
        assert_eq!(slugify("R50m budget -- approved"), "r50m-budget-approved");
    }

    #[test]
    fn slugify_folds_accents() {
        assert_eq!(slugify("Café São Paulo"), "cafe-sao-paulo");
        assert_eq!(slugify("Straße"), "strasse");
    }

    #[test]
    fn slugify_falls_back_to_untitled() {
        assert_eq!(slugify(""), "untitled");
        assert_eq!(slugify("!!!"), "untitled");
    }

    #[test]
    fn slugify_caps_length_without_trailing_dash() {
        let long = "word ".repeat(40);
        let slug = slugify(&long);
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn next_free_slug_picks_smallest_gap() {
        let none: [&str; 0] = [];
        assert_eq!(next_free_slug("budget", &none), "budget");
        assert_eq!(next_free_slug("budget", &["budget"]), "budget-1");
        assert_eq!(
            next_free_slug("budget", &["budget", "budget-1", "budget-3"]),
            "budget-2"
        );
        assert_eq!(next_free_slug("budget", &["budget-1"]), "budget");
    }
}
