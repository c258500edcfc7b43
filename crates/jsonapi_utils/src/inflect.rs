//! String inflection used to derive JSON:API type names.
//!
//! The serializer only needs three operations: pluralizing a relationship
//! name, singularizing it back to build a `<name>_ids` accessor, and turning
//! a type name into a resource type. [`Inflector`] is the seam; [`English`]
//! is a small rule table that covers the regular cases and the common
//! irregular nouns.

use alloc::string::String;

// -----------------------------------------------------------------------------
// Inflector

/// Converts words between their singular and plural forms.
pub trait Inflector: Send + Sync {
    /// Returns the plural form of `word`.
    ///
    /// Words that are already plural are returned unchanged.
    fn pluralize(&self, word: &str) -> String;

    /// Returns the singular form of `word`.
    fn singularize(&self, word: &str) -> String;

    /// Returns the JSON:API resource type for a type name, e.g. `Author` -> `authors`.
    fn resource_type(&self, type_name: &str) -> String {
        self.pluralize(&type_name.to_lowercase())
    }
}

// -----------------------------------------------------------------------------
// English

/// Rule based English inflector.
///
/// # Examples
///
/// ```
/// use jsonapi_utils::{English, Inflector};
///
/// assert_eq!(English.pluralize("author"), "authors");
/// assert_eq!(English.pluralize("category"), "categories");
/// assert_eq!(English.singularize("people"), "person");
/// assert_eq!(English.resource_type("Post"), "posts");
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct English;

/// `(singular, plural)`
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("sex", "sexes"),
    ("move", "moves"),
    ("zombie", "zombies"),
    ("tooth", "teeth"),
    ("foot", "feet"),
    ("goose", "geese"),
];

const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
    "jeans",
    "police",
    "news",
    "metadata",
];

/// `(suffix, chars to strip, replacement)`, first match wins.
type Rule = (&'static str, usize, &'static str);

const PLURAL_RULES: &[Rule] = &[
    ("quiz", 0, "zes"),
    ("mouse", 4, "ice"),
    ("louse", 4, "ice"),
    ("matrix", 2, "ices"),
    ("vertex", 2, "ices"),
    ("index", 2, "ices"),
    ("hive", 0, "s"),
    ("sis", 2, "es"),
    ("tum", 2, "a"),
    ("ium", 2, "a"),
    ("buffalo", 0, "es"),
    ("tomato", 0, "es"),
    ("bus", 0, "es"),
    ("alias", 0, "es"),
    ("status", 0, "es"),
    ("octopus", 2, "i"),
    ("virus", 2, "i"),
    ("axis", 2, "es"),
    ("testis", 2, "es"),
    ("x", 0, "es"),
    ("ch", 0, "es"),
    ("ss", 0, "es"),
    ("sh", 0, "es"),
    ("lf", 1, "ves"),
    ("rf", 1, "ves"),
    ("ife", 2, "ves"),
    ("s", 0, ""),
];

const SINGULAR_RULES: &[Rule] = &[
    ("quizzes", 3, ""),
    ("matrices", 4, "ix"),
    ("vertices", 4, "ex"),
    ("indices", 4, "ex"),
    ("mice", 3, "ouse"),
    ("lice", 3, "ouse"),
    ("buses", 2, ""),
    ("aliases", 2, ""),
    ("statuses", 2, ""),
    ("octopi", 1, "us"),
    ("viri", 1, "us"),
    ("testes", 2, "is"),
    ("analyses", 2, "is"),
    ("theses", 2, "is"),
    ("crises", 2, "is"),
    ("hives", 1, ""),
    ("tives", 1, ""),
    ("lves", 3, "f"),
    ("rves", 3, "f"),
    ("ives", 3, "fe"),
    ("movies", 1, ""),
    ("xes", 2, ""),
    ("ches", 2, ""),
    ("sses", 2, ""),
    ("shes", 2, ""),
    ("ies", 3, "y"),
    ("ss", 0, ""),
    ("us", 0, ""),
    ("is", 0, ""),
    ("s", 1, ""),
];

fn is_vowel(c: u8) -> bool {
    matches!(c, b'a' | b'e' | b'i' | b'o' | b'u' | b'y')
}

fn apply_rules(word: &str, rules: &[Rule]) -> Option<String> {
    rules.iter().find_map(|&(suffix, strip, replacement)| {
        word.strip_suffix(suffix).map(|_| {
            let mut out = String::with_capacity(word.len() + replacement.len());
            out.push_str(&word[..word.len() - strip]);
            out.push_str(replacement);
            out
        })
    })
}

/// Splits `blog_post` into (`blog_`, `post`), inflection only touches the last word.
fn split_last_word(word: &str) -> (&str, &str) {
    match word.rfind('_') {
        Some(pos) => word.split_at(pos + 1),
        None => ("", word),
    }
}

impl English {
    fn irregular(word: &str, to_plural: bool) -> Option<String> {
        let (head, last) = split_last_word(word);
        IRREGULAR.iter().find_map(|&(singular, plural)| {
            let target = match (to_plural, last) {
                (true, w) if w == singular || w == plural => plural,
                (false, w) if w == singular || w == plural => singular,
                _ => return None,
            };
            let mut out = String::from(head);
            out.push_str(target);
            Some(out)
        })
    }

    fn is_uncountable(word: &str) -> bool {
        let (_, last) = split_last_word(word);
        UNCOUNTABLE.contains(&last)
    }
}

impl Inflector for English {
    fn pluralize(&self, word: &str) -> String {
        if word.is_empty() || Self::is_uncountable(word) {
            return String::from(word);
        }
        if let Some(out) = Self::irregular(word, true) {
            return out;
        }
        if let Some(out) = apply_rules(word, PLURAL_RULES) {
            return out;
        }

        let bytes = word.as_bytes();
        if let [.., before, b'y'] = bytes
            && (!is_vowel(*before) || word.ends_with("quy"))
        {
            let mut out = String::from(&word[..word.len() - 1]);
            out.push_str("ies");
            return out;
        }

        let mut out = String::from(word);
        out.push('s');
        out
    }

    fn singularize(&self, word: &str) -> String {
        if word.is_empty() || Self::is_uncountable(word) {
            return String::from(word);
        }
        if let Some(out) = Self::irregular(word, false) {
            return out;
        }
        apply_rules(word, SINGULAR_RULES).unwrap_or_else(|| String::from(word))
    }
}

// -----------------------------------------------------------------------------
// Tests
