//! Price-drop message formatting.

use watch_core::PriceDrop;

/// Render a price drop as a chat message.
pub fn format_price_drop(price_drop: &PriceDrop) -> String {
    format!(
        "📉 Price drop: {title}\n{old:.2} → {new:.2} (-{pct:.0}%)\n{url}",
        title = price_drop.title,
        old = price_drop.old_price,
        new = price_drop.new_price,
        pct = price_drop.percentage_change(),
        url = price_drop.url,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price_drop() {
        let price_drop = PriceDrop {
            asin: "B012345678".to_string(),
            title: "Widget".to_string(),
            url: "https://www.amazon.com/dp/B012345678".to_string(),
            old_price: 100.0,
            new_price: 80.0,
        };

        let text = format_price_drop(&price_drop);
        assert!(text.contains("Widget"));
        assert!(text.contains("100.00 → 80.00"));
        assert!(text.contains("-20%"));
        assert!(text.contains("https://www.amazon.com/dp/B012345678"));
    }
}
