use chrono::{DateTime, Utc};
use colored::Colorize;
use console::Term;
use merch::api::{BarState, CmdMessage, MessageLevel};
use merch::model::{Item, PriceLog, User};
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const ID_WIDTH: usize = 7;
const PRICE_WIDTH: usize = 14;
const TIME_WIDTH: usize = 14;
const FAVORITE_MARKER: &str = "★";
const SPARK_TICKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const SPARK_POINTS: usize = 40;

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

pub(super) fn print_bar(bar: &BarState) {
    let tags: String = bar
        .tags
        .iter()
        .map(|tag| format!("[{}] ", tag).cyan().to_string())
        .collect();
    println!("{}{}{}", "search: ".dimmed(), tags, bar.text.bold());
}

pub(super) fn print_items(items: &[Item]) {
    if items.is_empty() {
        println!("No items found.");
        return;
    }

    let line_width = Term::stdout()
        .size_checked()
        .map(|(_, cols)| cols as usize)
        .unwrap_or(LINE_WIDTH)
        .min(LINE_WIDTH);

    for item in items {
        let id = format!("{:>width$}. ", item.item_id, width = ID_WIDTH - 2);
        let marker = if item.favorited == Some(true) {
            format!("{} ", FAVORITE_MARKER)
        } else {
            "  ".to_string()
        };

        let price = item
            .price_log
            .as_ref()
            .and_then(|log| log.average_price)
            .map(format_gp)
            .unwrap_or_default();
        let age = item
            .price_log
            .as_ref()
            .map(|log| format_time_ago(log.date))
            .unwrap_or_else(|| " ".repeat(TIME_WIDTH));

        let name = if item.members {
            format!("{} (m)", item.name)
        } else {
            item.name.clone()
        };

        let fixed_width = ID_WIDTH + marker.width() + PRICE_WIDTH + TIME_WIDTH;
        let available = line_width.saturating_sub(fixed_width);
        let name_display = truncate_to_width(&name, available);
        let padding = available.saturating_sub(name_display.width());

        println!(
            "{}{}{}{}{:>price_width$}{}",
            id.dimmed(),
            marker.yellow(),
            name_display,
            " ".repeat(padding),
            price,
            age.dimmed(),
            price_width = PRICE_WIDTH
        );
    }
}

pub(super) fn print_item_detail(item: &Item, logs: &[PriceLog]) {
    let marker = match item.favorited {
        Some(true) => format!(" {}", FAVORITE_MARKER).yellow().to_string(),
        _ => String::new(),
    };
    println!("{} {}{}", item.item_id.to_string().yellow(), item.name.bold(), marker);
    if item.members {
        println!("{}", "members only".dimmed());
    }
    if !item.description.is_empty() {
        println!("{}", item.description);
    }
    println!("--------------------------------");

    print_field("store price", item.store_price.map(format_gp));
    print_field("buy limit", item.buy_limit.map(|limit| limit.to_string()));
    print_field("high alch", item.high_alch.map(format_gp));
    print_field("low alch", item.low_alch.map(format_gp));

    let Some(latest) = logs.last().or(item.price_log.as_ref()) else {
        return;
    };
    println!();
    println!("{} {}", "latest price".bold(), format_time_ago(latest.date).trim().dimmed());
    print_field("buy", latest.buy_price.map(format_gp));
    print_field("sell", latest.sell_price.map(format_gp));
    print_field("average", latest.average_price.map(format_gp));
    print_field(
        "profit",
        latest.profit().map(|profit| {
            let text = format_gp(profit);
            if profit < 0 {
                text.red().to_string()
            } else {
                text.green().to_string()
            }
        }),
    );
    print_field("roi", latest.roi().map(|roi| format!("{:.1}%", (roi - 1.0) * 100.0)));
    print_field("demand", latest.demand().map(|demand| format!("{:.2}", demand)));

    if logs.len() > 1 {
        let prices: Vec<i64> = logs.iter().filter_map(|log| log.average_price).collect();
        let volumes: Vec<i64> = logs
            .iter()
            .map(|log| log.buy_volume.unwrap_or(0) + log.sell_volume.unwrap_or(0))
            .collect();
        println!();
        println!("{:>12}  {}", "price".dimmed(), sparkline(&prices).cyan());
        println!("{:>12}  {}", "volume".dimmed(), sparkline(&volumes).blue());
    }
}

pub(super) fn print_token(token: &str, user: Option<&User>) {
    println!("{} {}", "token:".dimmed(), token);
    if let Some(user) = user {
        let name = user
            .display_name()
            .map(|name| format!("{} ", name))
            .unwrap_or_default();
        println!("{} {}{} <{}>", "user:".dimmed(), name, user.username.bold(), user.email);
    }
}

fn print_field(label: &str, value: Option<String>) {
    if let Some(value) = value {
        println!("{:>12}  {}", label.dimmed(), value);
    }
}

/// One tick per value, scaled between the smallest and largest value. Only
/// the last points that fit are drawn.
fn sparkline(values: &[i64]) -> String {
    let values = &values[values.len().saturating_sub(SPARK_POINTS)..];
    let (Some(min), Some(max)) = (values.iter().min(), values.iter().max()) else {
        return String::new();
    };
    let span = (max - min) as f64;
    let top = (SPARK_TICKS.len() - 1) as f64;

    values
        .iter()
        .map(|value| {
            if span == 0.0 {
                SPARK_TICKS[SPARK_TICKS.len() / 2]
            } else {
                let level = ((value - min) as f64 / span * top).round() as usize;
                SPARK_TICKS[level.min(SPARK_TICKS.len() - 1)]
            }
        })
        .collect()
}

/// Whole coins with thousands separators: 1234567 is "1,234,567 gp".
fn format_gp(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("{}{} gp", sign, grouped)
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let now = Utc::now();
    let duration = now.signed_duration_since(timestamp);

    let formatter = Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());

    format!("{:>width$}", time_str, width = TIME_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gp_groups_thousands() {
        assert_eq!(format_gp(0), "0 gp");
        assert_eq!(format_gp(999), "999 gp");
        assert_eq!(format_gp(1000), "1,000 gp");
        assert_eq!(format_gp(1234567), "1,234,567 gp");
        assert_eq!(format_gp(-45000), "-45,000 gp");
    }

    #[test]
    fn sparkline_scales_between_extremes() {
        assert_eq!(sparkline(&[1, 5, 9]), "▁▅█");
        assert_eq!(sparkline(&[3, 3]), "▅▅");
        assert_eq!(sparkline(&[]), "");
    }

    #[test]
    fn sparkline_keeps_the_latest_points() {
        let values: Vec<i64> = (0..100).collect();
        let line = sparkline(&values);
        assert_eq!(line.chars().count(), SPARK_POINTS);
        assert!(line.ends_with('█'));
    }

    #[test]
    fn truncation_respects_width() {
        assert_eq!(truncate_to_width("Abyssal whip", 20), "Abyssal whip");
        assert_eq!(truncate_to_width("Abyssal whip", 5), "Abys…");
    }
}
