use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::constants::{
    EXTERNAL_LINK_SELECTOR, PURCHASE_LINK_SELECTOR, PURCHASE_LINK_TEXT, TICKET_VENDOR_HOSTS,
    TITLE_MARKER_SELECTOR,
};
use crate::dom::{Fragment, Node};
use crate::extract::date::{parse_concert_date, parse_venue};
use crate::types::ConcertRecord;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Remove markup tags from feed-supplied title text.
pub fn strip_tags(text: &str) -> String {
    TAG_RE.replace_all(text, "").to_string()
}

/// Build a candidate record from a parsed HTML fragment (a feed item's
/// description) and the item's own title as a last-resort fallback.
///
/// Returns `None` when no title survives the fallback chain or the fragment
/// text carries no date token; such items are dropped, never emitted as
/// partial records.
pub fn extract_candidate(
    fragment: &Fragment,
    item_title: &str,
    source_url: &str,
) -> Option<ConcertRecord> {
    let root = fragment.root();
    let base = Url::parse(source_url).ok();

    let title = extract_title(&root, item_title)?;

    // Date and venue tokens may sit in different elements, so both run over
    // the fragment's full rendered text.
    let text = root.text();
    let date = parse_concert_date(&text)?;
    let venue = parse_venue(&text);

    let ticket_url = find_ticket_url(&root, base.as_ref());
    let image_url = find_image_url(&root, base.as_ref());

    Some(ConcertRecord {
        title,
        date,
        venue: Some(venue),
        ticket_url,
        source_url: source_url.to_string(),
        image_url,
    })
}

/// Title fallback chain: marker element, then the first externally-targeted
/// link, then the feed item title with tags stripped.
fn extract_title(root: &Node, item_title: &str) -> Option<String> {
    if let Some(marker) = root.find_first(TITLE_MARKER_SELECTOR) {
        let text = marker.text().trim().to_string();
        if !text.is_empty() {
            return Some(text);
        }
    }

    if let Some(link) = root.find_first(EXTERNAL_LINK_SELECTOR) {
        let text = link.text().trim().to_string();
        if !text.is_empty() {
            return Some(text);
        }
    }

    let stripped = strip_tags(item_title).trim().to_string();
    if stripped.is_empty() {
        None
    } else {
        Some(stripped)
    }
}

fn is_ticket_vendor_host(host: &str) -> bool {
    TICKET_VENDOR_HOSTS
        .iter()
        .any(|vendor| host == *vendor || host.ends_with(&format!(".{vendor}")))
}

/// First link in document order whose host belongs to a known ticket vendor.
pub fn find_ticket_url(region: &Node, base: Option<&Url>) -> Option<String> {
    for link in region.find_all("a") {
        let href = match link.attr("href") {
            Some(href) => href,
            None => continue,
        };
        let resolved = match resolve_url(base, href) {
            Some(resolved) => resolved,
            None => continue,
        };
        if let Some(host) = resolved.host_str() {
            if is_ticket_vendor_host(host) {
                return Some(resolved.to_string());
            }
        }
    }
    None
}

/// Link marked as a ticket-purchase link on detail pages, either by the
/// `next` class convention or by its link text.
pub fn find_purchase_link(region: &Node, base: Option<&Url>) -> Option<String> {
    if let Some(link) = region.find_first(PURCHASE_LINK_SELECTOR) {
        if let Some(href) = link.attr("href") {
            if let Some(resolved) = resolve_url(base, href) {
                return Some(resolved.to_string());
            }
        }
    }

    for link in region.find_all("a") {
        if link.text().contains(PURCHASE_LINK_TEXT) {
            if let Some(href) = link.attr("href") {
                if let Some(resolved) = resolve_url(base, href) {
                    return Some(resolved.to_string());
                }
            }
        }
    }
    None
}

/// First image in the region resolving to the same host as the source page,
/// so site-local artwork beats social-sharing assets; when no same-host
/// image exists the first image at all is accepted.
pub fn find_image_url(region: &Node, base: Option<&Url>) -> Option<String> {
    let mut fallback: Option<String> = None;
    for img in region.find_all("img") {
        let src = match img.attr("src") {
            Some(src) => src,
            None => continue,
        };
        let resolved = match resolve_url(base, src) {
            Some(resolved) => resolved,
            None => continue,
        };
        if is_same_host(&resolved, base) {
            return Some(resolved.to_string());
        }
        if fallback.is_none() {
            fallback = Some(resolved.to_string());
        }
    }
    fallback
}

/// Resolve an href against the page URL when one is known; absolute hrefs
/// stand on their own.
pub fn resolve_url(base: Option<&Url>, href: &str) -> Option<Url> {
    match base {
        Some(base) => base.join(href).ok(),
        None => Url::parse(href).ok(),
    }
}

fn is_same_host(url: &Url, base: Option<&Url>) -> bool {
    match base {
        Some(base) => url.host_str().is_some() && url.host_str() == base.host_str(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.2083.jp/concert/concert-1.html").unwrap()
    }

    #[test]
    fn test_title_prefers_marker_element() {
        let fragment = Fragment::parse_fragment(
            "<div><span class=\"title\">交響組曲コンサート</span>\
             <a target=\"_blank\" href=\"https://example.com\">リンク</a></div>",
        );
        let root = fragment.root();
        assert_eq!(
            extract_title(&root, "feed title").as_deref(),
            Some("交響組曲コンサート")
        );
    }

    #[test]
    fn test_title_falls_back_to_external_link_text() {
        let fragment = Fragment::parse_fragment(
            "<div><a target=\"_blank\" href=\"https://example.com\">Concert Link</a></div>",
        );
        let root = fragment.root();
        assert_eq!(extract_title(&root, "feed title").as_deref(), Some("Concert Link"));
    }

    #[test]
    fn test_title_falls_back_to_stripped_item_title() {
        let fragment = Fragment::parse_fragment("<div><p>本文のみ</p></div>");
        let root = fragment.root();
        assert_eq!(
            extract_title(&root, "<b>コンサート</b>のお知らせ").as_deref(),
            Some("コンサートのお知らせ")
        );
    }

    #[test]
    fn test_title_exhausted_yields_none() {
        let fragment = Fragment::parse_fragment("<div><p>本文のみ</p></div>");
        let root = fragment.root();
        assert_eq!(extract_title(&root, "  "), None);
    }

    #[test]
    fn test_ticket_url_matches_vendor_allow_list() {
        let fragment = Fragment::parse_fragment(
            "<div><a href=\"https://www.2083.jp/news.html\">news</a>\
             <a href=\"https://t.pia.jp/e1\">チケットぴあ</a>\
             <a href=\"https://eplus.jp/e2\">イープラス</a></div>",
        );
        let root = fragment.root();
        let base = base();
        assert_eq!(
            find_ticket_url(&root, Some(&base)).as_deref(),
            Some("https://t.pia.jp/e1")
        );
    }

    #[test]
    fn test_ticket_url_accepts_vendor_subdomains() {
        assert!(is_ticket_vendor_host("sort.eplus.jp"));
        assert!(is_ticket_vendor_host("t.pia.jp"));
        assert!(!is_ticket_vendor_host("not-eplus.jp"));
        assert!(!is_ticket_vendor_host("www.2083.jp"));
    }

    #[test]
    fn test_no_vendor_link_yields_none() {
        let fragment = Fragment::parse_fragment(
            "<div><a href=\"https://www.2083.jp/news.html\">news</a></div>",
        );
        let root = fragment.root();
        let base = base();
        assert_eq!(find_ticket_url(&root, Some(&base)), None);
    }

    #[test]
    fn test_image_prefers_same_host_over_social_assets() {
        let fragment = Fragment::parse_fragment(
            "<div><img src=\"https://social.example.com/share.jpg\">\
             <img src=\"./image1.jpg\"></div>",
        );
        let root = fragment.root();
        let base = base();
        assert_eq!(
            find_image_url(&root, Some(&base)).as_deref(),
            Some("https://www.2083.jp/concert/image1.jpg")
        );
    }

    #[test]
    fn test_image_falls_back_to_first_third_party_image() {
        let fragment = Fragment::parse_fragment(
            "<div><img src=\"https://social.example.com/share.jpg\">\
             <img src=\"https://social.example.com/banner.jpg\"></div>",
        );
        let root = fragment.root();
        let base = base();
        assert_eq!(
            find_image_url(&root, Some(&base)).as_deref(),
            Some("https://social.example.com/share.jpg")
        );
    }

    #[test]
    fn test_no_images_yields_none() {
        let fragment = Fragment::parse_fragment("<div><p>画像なし</p></div>");
        let root = fragment.root();
        let base = base();
        assert_eq!(find_image_url(&root, Some(&base)), None);
    }

    #[test]
    fn test_purchase_link_by_class_and_by_text() {
        let by_class = Fragment::parse_fragment(
            "<div><p class=\"next\"><a href=\"/ticket/1\"><span>チケット購入</span></a></p></div>",
        );
        let base = base();
        assert_eq!(
            find_purchase_link(&by_class.root(), Some(&base)).as_deref(),
            Some("https://www.2083.jp/ticket/1")
        );

        let by_text = Fragment::parse_fragment(
            "<div><a href=\"https://example.com/buy\">⇒オンラインでのチケット購入はこちら</a></div>",
        );
        assert_eq!(
            find_purchase_link(&by_text.root(), Some(&base)).as_deref(),
            Some("https://example.com/buy")
        );
    }
}
