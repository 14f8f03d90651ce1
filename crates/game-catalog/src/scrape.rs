//! Extract game details from a storefront product page.
//!
//! Parsing is done on the raw HTML with CSS selectors; nothing is
//! rendered and no script runs.

use crate::types::{GameInfo, DEFAULT_RATING};
use scraper::{ElementRef, Html, Selector};

/// Maximum length, in characters, of the short description.
pub const SHORT_DESCRIPTION_LEN: usize = 160;

const RATING_SELECTOR: &str = ".age-restrictions__icon > use";
const DESCRIPTION_SELECTOR: &str = ".description";

/// Parse rating and description out of a product page.
pub fn parse_game_page(html: &str) -> GameInfo {
    let document = Html::parse_document(html);

    let rating = select_first(&document, RATING_SELECTOR)
        .and_then(|el| rating_reference(&el))
        .map(|reference| normalize_rating(&reference))
        .unwrap_or_else(|| DEFAULT_RATING.to_string());

    let (short_description, description) = match select_first(&document, DESCRIPTION_SELECTOR) {
        Some(el) => {
            let text: String = el.text().collect();
            let short: String = text.trim().chars().take(SHORT_DESCRIPTION_LEN).collect();
            (Some(short), Some(el.inner_html()))
        }
        None => (None, None),
    };

    GameInfo {
        rating,
        short_description,
        description,
    }
}

fn select_first<'a>(document: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let sel = Selector::parse(selector).ok()?;
    document.select(&sel).next()
}

/// The badge points at a sprite symbol through `xlink:href`; anything else
/// falls back to the element's first attribute.
fn rating_reference(el: &ElementRef<'_>) -> Option<String> {
    let attrs: Vec<(&str, &str)> = el.value().attrs().collect();
    attrs
        .iter()
        .find(|(name, _)| *name == "href")
        .or_else(|| attrs.first())
        .map(|(_, value)| value.to_string())
}

/// `#PEGI_18` becomes `PEGI18`: the hash and the first underscore go.
fn normalize_rating(reference: &str) -> String {
    let stripped = reference.replacen('#', "", 1);
    let normalized = stripped.replacen('_', "", 1);
    if normalized.is_empty() {
        DEFAULT_RATING.to_string()
    } else {
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"
        <html><body>
          <div class="age-restrictions">
            <svg class="age-restrictions__icon"><use xlink:href="#PEGI_18"></use></svg>
          </div>
          <div class="description">
            <p>Become a <b>monster slayer</b> for hire.</p>
          </div>
        </body></html>
    "##;

    #[test]
    fn test_parse_rating_from_badge() {
        let info = parse_game_page(PAGE);
        assert_eq!(info.rating, "PEGI18");
    }

    #[test]
    fn test_parse_description_html_and_text() {
        let info = parse_game_page(PAGE);
        assert_eq!(
            info.short_description.as_deref(),
            Some("Become a monster slayer for hire.")
        );
        let html = info.description.unwrap();
        assert!(html.contains("<b>monster slayer</b>"));
    }

    #[test]
    fn test_missing_badge_defaults_rating() {
        let info = parse_game_page(r#"<div class="description">Plain</div>"#);
        assert_eq!(info.rating, DEFAULT_RATING);
        assert_eq!(info.short_description.as_deref(), Some("Plain"));
    }

    #[test]
    fn test_missing_description_keeps_rating() {
        let html = r##"<svg class="age-restrictions__icon"><use href="#BR_12"></use></svg>"##;
        let info = parse_game_page(html);
        assert_eq!(info.rating, "BR12");
        assert!(info.short_description.is_none());
        assert!(info.description.is_none());
    }

    #[test]
    fn test_short_description_is_truncated() {
        let long = "x".repeat(400);
        let html = format!(r#"<div class="description">{long}</div>"#);
        let info = parse_game_page(&html);
        assert_eq!(info.short_description.unwrap().chars().count(), SHORT_DESCRIPTION_LEN);
    }

    #[test]
    fn test_short_description_is_cut_after_trimming() {
        let html = format!(
            "<div class=\"description\">\n        {}</div>",
            "y".repeat(200)
        );
        let short = parse_game_page(&html).short_description.unwrap();
        assert_eq!(short, "y".repeat(SHORT_DESCRIPTION_LEN));
    }

    #[test]
    fn test_normalize_rating_only_drops_first_underscore() {
        assert_eq!(normalize_rating("#ESRB_T_13"), "ESRBT_13");
        assert_eq!(normalize_rating("#"), DEFAULT_RATING);
    }
}
