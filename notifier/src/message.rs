//! HTML message templates (Telegram `parse_mode=HTML` subset).

use std::time::Duration;

use common::time::format_ms;
use corelib::Quote;
use engine::{DrawdownReport, Signal};

/// Spread past the threshold.
pub fn spread_alert(traded: &Quote, reference: &Quote, signal: &Signal, threshold: f64) -> String {
    format!(
        "🚨 <b>USDT spread alert</b> 🚨\n\n\
         💎 <b>Traded:</b> {traded_value} <i>({traded_source})</i>\n\
         🏦 <b>Reference:</b> {reference_value} <i>({reference_source})</i>\n\
         💰 <b>Spread:</b> {spread:.2} ({percent:.2}%)\n\
         📏 Threshold: {threshold}\n\
         🕒 {at}",
        traded_value = traded.value,
        traded_source = escape(&traded.source),
        reference_value = reference.value,
        reference_source = escape(&reference.source),
        spread = signal.spread,
        percent = signal.percent,
        at = format_ms(traded.observed_ms),
    )
}

/// Watched quantity fell from its rolling peak.
pub fn drawdown_alert(quote: &Quote, report: &DrawdownReport, window: Duration) -> String {
    format!(
        "📉 <b>Drawdown alert</b>\n\n\
         💵 <b>Current:</b> {current} <i>({source})</i>\n\
         ⛰ <b>Peak ({window}):</b> {peak}\n\
         🔻 <b>Drop:</b> {drop:.2}%\n\
         🕒 {at}",
        current = report.current,
        source = escape(&quote.source),
        window = describe_window(window),
        peak = report.peak,
        drop = report.drop_rate * 100.0,
        at = format_ms(quote.observed_ms),
    )
}

fn describe_window(window: Duration) -> String {
    let secs = window.as_secs();
    match secs {
        s if s >= 3600 && s % 3600 == 0 => format!("last {}h", s / 3600),
        s if s >= 60 && s % 60 == 0 => format!("last {}m", s / 60),
        s => format!("last {s}s"),
    }
}

/// Escape the three characters the HTML parse mode treats specially.
fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::Quantity;

    const T: u64 = 1_718_000_000_000;

    fn quote(quantity: Quantity, value: f64, source: &str) -> Quote {
        Quote {
            quantity,
            value,
            source: source.into(),
            observed_ms: T,
        }
    }

    #[test]
    fn spread_alert_names_both_sources() {
        let traded = quote(Quantity::Traded, 32.6, "max:usdttwd");
        let reference = quote(Quantity::Reference, 32.305, "bot:USD");
        let signal = engine::evaluate(32.6, 32.305).unwrap();

        let text = spread_alert(&traded, &reference, &signal, 0.15);

        assert!(text.contains("32.6 <i>(max:usdttwd)</i>"));
        assert!(text.contains("32.305 <i>(bot:USD)</i>"));
        assert!(text.contains("<b>Spread:</b> 0.30 (0.91%)"));
        assert!(text.contains("Threshold: 0.15"));
        assert!(text.contains("2024-06-10"));
    }

    #[test]
    fn drawdown_alert_reports_peak_and_drop() {
        let q = quote(Quantity::Watched, 98.9, "bitopro:usdt_twd");
        let report = DrawdownReport {
            current: 98.9,
            peak: 100.0,
            drop_rate: 0.011,
            drop: true,
            alert: true,
            samples: 2,
            pruned: 0,
        };

        let text = drawdown_alert(&q, &report, Duration::from_secs(3600));

        assert!(text.contains("<b>Peak (last 1h):</b> 100"));
        assert!(text.contains("<b>Drop:</b> 1.10%"));
        assert!(text.contains("(bitopro:usdt_twd)"));
    }

    #[test]
    fn windows_use_the_largest_whole_unit() {
        assert_eq!(describe_window(Duration::from_secs(7200)), "last 2h");
        assert_eq!(describe_window(Duration::from_secs(900)), "last 15m");
        assert_eq!(describe_window(Duration::from_secs(90)), "last 90s");
    }

    #[test]
    fn labels_are_escaped() {
        assert_eq!(escape("a<b>&c"), "a&lt;b&gt;&amp;c");
    }
}
