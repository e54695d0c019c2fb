//! URL slugs derived from event titles.

/// Generate a URL-safe slug from an event title.
///
/// Lowercases the title, drops every character that is not an ASCII word
/// character, whitespace, or hyphen, turns whitespace runs into a single
/// hyphen, collapses consecutive hyphens, and trims leading/trailing
/// hyphens. Collisions are not checked: two events with the same title get
/// the same slug.
///
/// The edge trim is deliberate: a title padded with spaces or punctuation
/// still yields a clean slug, so `"  ¡Fiesta!  "` becomes `fiesta` rather
/// than `-fiesta-`.
pub fn generate_slug(title: &str) -> String {
    let mut result = String::with_capacity(title.len());
    let mut prev_hyphen = false;

    for c in title.to_lowercase().chars() {
        let mapped = if c.is_whitespace() || c == '-' {
            '-'
        } else if c.is_ascii_alphanumeric() || c == '_' {
            c
        } else {
            continue;
        };

        if mapped == '-' {
            if !prev_hyphen {
                result.push('-');
            }
            prev_hyphen = true;
        } else {
            result.push(mapped);
            prev_hyphen = false;
        }
    }

    result.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_and_collapses_spaces() {
        assert_eq!(
            generate_slug("Jazz Night @ The Grey Eagle!"),
            "jazz-night-the-grey-eagle"
        );
    }

    #[test]
    fn is_deterministic_and_idempotent() {
        let once = generate_slug("Jazz Night @ The Grey Eagle!");
        for _ in 0..5 {
            assert_eq!(generate_slug("Jazz Night @ The Grey Eagle!"), once);
        }
        assert_eq!(generate_slug(&once), once);
    }

    #[test]
    fn collapses_existing_hyphens() {
        assert_eq!(generate_slug("Pop-Up -- Market"), "pop-up-market");
    }

    #[test]
    fn keeps_underscores_and_digits() {
        assert_eq!(generate_slug("Run_Club 5K"), "run_club-5k");
    }

    #[test]
    fn drops_non_ascii_letters() {
        assert_eq!(generate_slug("Café Crawl"), "caf-crawl");
    }

    #[test]
    fn trims_edges() {
        assert_eq!(generate_slug("  ¡Fiesta!  "), "fiesta");
        assert_eq!(generate_slug("!!!"), "");
    }
}
