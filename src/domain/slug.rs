//! URL-safe slugs derived from node names.

use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::entities::NodeId;

fn separator_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("static regex is valid"))
}

/// Lowercase ASCII slug. Accents are folded away (NFKD, combining marks
/// dropped), then runs of anything but `[a-z0-9]` become a single `-`.
///
/// `"Shoes / Running & Trail"` → `"shoes-running-trail"`
pub fn slugify(text: &str) -> String {
    let folded: String = text
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect();
    separator_regex()
        .replace_all(&folded, "-")
        .trim_matches('-')
        .to_string()
}

/// `slug`, or `node-<id>` when nothing URL-safe survived slugifying.
pub fn node_slug(slug: String, id: NodeId) -> String {
    if slug.is_empty() {
        format!("node-{id}")
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Node1", "node1")]
    #[case("Shoes / Running & Trail", "shoes-running-trail")]
    #[case("  --Sale!!  ", "sale")]
    #[case("Café Crème", "cafe-creme")]
    #[case("Ångström ﬁle", "angstrom-file")]
    #[case("日本", "")]
    #[case("", "")]
    fn given_name_when_slugifying_then_returns_url_safe_slug(
        #[case] input: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(slugify(input), expected);
    }

    #[test]
    fn given_empty_slug_when_naming_node_then_falls_back_to_id() {
        assert_eq!(node_slug(slugify("日本"), 7), "node-7");
        assert_eq!(node_slug("shoes".into(), 7), "shoes");
    }
}
