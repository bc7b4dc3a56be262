//! Telegram HTML rendering for offers.

use crate::offers::Offer;

/// Telegram's caption limit, in UTF-16 code units of visible text
pub const MAX_CAPTION_LEN: usize = 1024;
/// Description length kept in a post
pub const MAX_DESCRIPTION_LEN: usize = 600;
const MAX_MERCHANT_LEN: usize = 100;
const MAX_TITLE_LEN: usize = 200;

const DEFAULT_TITLE: &str = "Special Deal";
const DEFAULT_DESCRIPTION: &str = "Grab now!";
const CALL_TO_ACTION: &str = "Grab Deal";

/// Escape text for safe inclusion in Telegram HTML.
///
/// Escapes `&`, `<`, `>`, `"`, and `'` so the output is safe in both text
/// content and `href` attributes.
pub fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Cut `text` to at most `max_len` UTF-16 units, marking the cut with `…`
fn truncate_utf16(text: &str, max_len: usize) -> String {
    if utf16_len(text) <= max_len {
        return text.to_string();
    }

    let budget = max_len.saturating_sub(1);
    let mut used = 0;
    let mut truncated = String::new();
    for c in text.chars() {
        used += c.len_utf16();
        if used > budget {
            break;
        }
        truncated.push(c);
    }
    truncated.push('…');
    truncated
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Render an offer as a channel post.
///
/// The visible text (markup excluded) never exceeds [`MAX_CAPTION_LEN`], so
/// the same text works as a photo caption.
pub fn format_offer(offer: &Offer) -> String {
    let merchant = truncate_utf16(offer.merchant(), MAX_MERCHANT_LEN);
    let title = truncate_utf16(
        non_blank(offer.title.as_deref()).unwrap_or(DEFAULT_TITLE),
        MAX_TITLE_LEN,
    );
    let description = non_blank(offer.description.as_deref()).unwrap_or(DEFAULT_DESCRIPTION);
    let link = offer.call_to_action_url();

    let header = format!("🔥 {} - {}", merchant, title);
    let footer = format!("👉 {}", CALL_TO_ACTION);
    // Header and footer are each followed or preceded by a blank line.
    let remaining = MAX_CAPTION_LEN.saturating_sub(utf16_len(&header) + utf16_len(&footer) + 4);
    let description = truncate_utf16(description, remaining.min(MAX_DESCRIPTION_LEN));

    let call_to_action = if link.is_empty() {
        footer
    } else {
        format!(
            "👉 <a href=\"{}\">{}</a>",
            html_escape(link),
            CALL_TO_ACTION
        )
    };

    format!(
        "🔥 <b>{} - {}</b>\n\n{}\n\n{}",
        html_escape(&merchant),
        html_escape(&title),
        html_escape(&description),
        call_to_action
    )
}
