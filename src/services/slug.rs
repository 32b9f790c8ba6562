/// URL slug from a display name: lowercase ASCII words joined by `-`.
///
/// Punctuation and non-ASCII characters are dropped, runs of whitespace, `_` and `-` collapse into one
/// `-`, and leading/trailing dashes are trimmed ("Grills & BBQ" → "grills-bbq").
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.trim().chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_dash = true;
        }
    }
    out
}

/// `slugify`, falling back to `"item"` when nothing survives.
pub fn slugify_or_default(name: &str) -> String {
    unique_slug(&slugify(name), &[])
}

/// `base` if free, otherwise `base-2`, `base-3`, ... skipping slugs in `taken`.
pub fn unique_slug(base: &str, taken: &[String]) -> String {
    let base = if base.is_empty() { "item" } else { base };
    if !taken.iter().any(|s| s == base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken.iter().any(|s| s == candidate))
        .unwrap_or_else(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_matches_menu_names() {
        assert_eq!(slugify("Small Chops"), "small-chops");
        assert_eq!(slugify("Grills & BBQ"), "grills-bbq");
        assert_eq!(slugify("Beers & Ciders"), "beers-ciders");
        assert_eq!(slugify("Non-Alcoholic"), "non-alcoholic");
        assert_eq!(slugify("  Pool's Special  "), "pools-special");
        assert_eq!(slugify("House Wine (Glass)"), "house-wine-glass");
        assert_eq!(slugify("--snake_case--name"), "snake-case-name");
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify("Café Latte"), "caf-latte");
    }

    #[test]
    fn unique_slug_appends_counter() {
        let taken = vec!["wines".to_string(), "wines-2".to_string()];
        assert_eq!(unique_slug("wines", &taken), "wines-3");
        assert_eq!(unique_slug("spirits", &taken), "spirits");
        assert_eq!(unique_slug("", &[]), "item");
    }

    #[test]
    fn slugify_or_default_never_empty() {
        assert_eq!(slugify_or_default("!!!"), "item");
        assert_eq!(slugify_or_default("Jollof Rice"), "jollof-rice");
    }
}
