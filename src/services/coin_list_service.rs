use serenity::builder::{CreateEmbed, CreateEmbedFooter};

use crate::models::Asset;
use crate::utils::page::page_count;
use crate::utils::table::{Align, Table};
use crate::utils::{format_percent, format_usd};

pub const ITEMS_PER_PAGE: usize = 10;

/// `$coins [search...] [page]`: a trailing number is the page, the rest is the search term
pub fn parse_args(args: &[&str]) -> (String, usize) {
    match args.split_last() {
        Some((last, rest)) => match last.parse::<usize>() {
            Ok(page) => (rest.join(" "), page),
            Err(_) => (args.join(" "), 1),
        },
        None => (String::new(), 1),
    }
}

fn render_table(assets: &[&Asset], start_rank: usize) -> String {
    let mut table = Table::new(vec!["#", "Coin", "Price", "24h"])
        .align(0, Align::Right)
        .align(2, Align::Right)
        .align(3, Align::Right);

    // Add one row per asset, ranked from start_rank
    for (idx, asset) in assets.iter().enumerate() {
        table.add_row(vec![
            (start_rank + idx).to_string(),
            format!("{} ({})", asset.name, asset.display_symbol()),
            format_usd(asset.current_price),
            format_percent(asset.day_change_percent()),
        ]);
    }

    table.render()
}

/// One embed per page of matching assets
pub fn create_coin_pages(assets: &[&Asset], search: &str) -> Vec<CreateEmbed> {
    let total_pages = page_count(assets.len(), ITEMS_PER_PAGE);
    let title = if search.is_empty() {
        "📈 Top Cryptocurrencies".to_string()
    } else {
        format!("🔎 Cryptocurrencies matching \"{}\"", search)
    };

    assets
        .chunks(ITEMS_PER_PAGE)
        .enumerate()
        .map(|(page_idx, chunk)| {
            let footer_text = format!(
                "Page {}/{} • Prices in USD • Use $predict <coin> for a forecast",
                page_idx + 1,
                total_pages
            );

            CreateEmbed::default()
                .title(&title)
                .description(render_table(chunk, page_idx * ITEMS_PER_PAGE + 1))
                .footer(CreateEmbedFooter::new(footer_text))
                .color(0x00b0f4)
        })
        .collect()
}
