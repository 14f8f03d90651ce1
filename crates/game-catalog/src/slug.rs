//! URL slug normalization for CMS entries.

/// Characters kept as-is besides ASCII alphanumerics and whitespace.
const ALLOWED_SYMBOLS: &str = "$*_+~.()'\"!:@-";

/// Build a lowercase slug from a display name.
///
/// Symbols with a conventional spelling are transliterated, Latin
/// diacritics are folded to ASCII, other characters are dropped and runs
/// of whitespace become a single `-`.
pub fn slugify(name: &str) -> String {
    let mut expanded = String::with_capacity(name.len());
    for c in name.chars() {
        match transliterate(c) {
            Some(s) => expanded.push_str(s),
            None => expanded.push(c),
        }
    }

    let kept: String = expanded
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || ALLOWED_SYMBOLS.contains(*c))
        .collect();

    kept.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

/// Convert a storefront slug into the CMS form. Only the first `_`
/// becomes `-`: `the_witcher_3` → `the-witcher_3`.
pub fn game_slug(storefront_slug: &str) -> String {
    storefront_slug.replacen('_', "-", 1)
}

fn transliterate(c: char) -> Option<&'static str> {
    let s = match c {
        '$' => " dollar ",
        '&' => " and ",
        '%' => " percent ",
        '<' => " less ",
        '>' => " greater ",
        '|' => " or ",
        '€' => " euro ",
        '£' => " pound ",
        '¥' => " yen ",
        '¢' => " cent ",
        '©' => "(c)",
        '®' => "(r)",
        '™' => "tm",
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => "a",
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => "A",
        'æ' => "ae",
        'Æ' => "AE",
        'ç' => "c",
        'Ç' => "C",
        'è' | 'é' | 'ê' | 'ë' => "e",
        'È' | 'É' | 'Ê' | 'Ë' => "E",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'Ì' | 'Í' | 'Î' | 'Ï' => "I",
        'ñ' => "n",
        'Ñ' => "N",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => "o",
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => "O",
        'œ' => "oe",
        'Œ' => "OE",
        'ù' | 'ú' | 'û' | 'ü' => "u",
        'Ù' | 'Ú' | 'Û' | 'Ü' => "U",
        'ý' | 'ÿ' => "y",
        'Ý' => "Y",
        'ß' => "ss",
        'ł' => "l",
        'Ł' => "L",
        'ś' | 'š' => "s",
        'Ś' | 'Š' => "S",
        'ź' | 'ż' | 'ž' => "z",
        'Ź' | 'Ż' | 'Ž' => "Z",
        'č' | 'ć' => "c",
        'Č' | 'Ć' => "C",
        _ => return None,
    };
    Some(s)
}
