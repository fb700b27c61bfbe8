use dotenvy::dotenv;
use std::env;
use tradesmen_directory::prelude::*;

fn print_listings(title: &str, listings: &Listings) {
    println!("\n{} ({:?}, {} found)", title, listings.source, listings.len());
    if let Some(error) = &listings.error {
        println!("  live store unavailable: {}", error);
    }
    for record in &listings.records {
        let badge = if record.is_premium {
            " [verified]"
        } else if record.is_paid {
            " [featured]"
        } else {
            ""
        };
        println!(
            "  {}{} - {:.1} ({} reviews), {} photos",
            record.name,
            badge,
            record.rating,
            record.review_count,
            record.photos.len()
        );
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv().ok();
    pretty_env_logger::init();

    let directory = Directory::from_env()?;
    let resolver = directory.listings();

    // Usage: listing_example [city] [trade]
    let mut args = env::args().skip(1);
    let city = args.next().unwrap_or_else(|| "London".to_string());
    let trade = args.next().unwrap_or_else(|| "plumber".to_string());

    let listings = resolver.resolve_listings(&city, &trade).await;
    print_listings(
        &format!("{} in {}", Trade::parse(&trade).display_name(), city),
        &listings,
    );

    // The same lookup driven by a triage-style selection
    let mut context = SearchContext::new();
    context.set_trade(Trade::Locksmith);
    context.set_city(&city);
    let listings = resolver.resolve_context(&context).await;
    print_listings(&format!("{} in {}", Trade::Locksmith.display_name(), city), &listings);

    let listings = resolver.search("drain").await;
    print_listings("search: drain", &listings);

    if let Some(first) = resolver
        .static_listings(&city, &trade)
        .and_then(|records| records.into_iter().next())
    {
        println!("\nCanonical record:\n{}", serde_json::to_string_pretty(&first)?);
    }

    Ok(())
}
