//! Storefront demo binary
//!
//! Walks the full shopping flow against real adapters: hydrate from the
//! JSON store, fill the cart with records and a ticket, check out through
//! the simulated gateway, then read the sales ledger back like the back
//! office would.

use anyhow::Result;
use spinshop_core::environment::SystemClock;
use spinshop_storage::JsonFileStore;
use spinshop_storefront::{
    CardDetails, CatalogItem, Config, ItemId, Money, SHIPPING_FEE, SimulatedGateway, Storefront,
    StorefrontError,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spinshop_storefront=debug,spinshop_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Spinshop: Record Store Checkout Walkthrough ===\n");

    let config = Config::from_env();
    println!("Data file: {}", config.storage.data_path.display());

    let storage = JsonFileStore::open(&config.storage.data_path).await?.shared();
    let gateway = SimulatedGateway::new()
        .with_approval_rate(config.gateway.approval_rate)
        .with_latencies(
            config.gateway.intent_latency(),
            config.gateway.confirm_latency(),
        )
        .shared();
    let shop = Storefront::new(storage, gateway, Arc::new(SystemClock)).await;

    if shop.cart_count().await > 0 {
        println!(
            "Found a cart from a previous visit: {} items, {} EUR. Clearing it.",
            shop.cart_count().await,
            shop.cart_total().await
        );
        shop.clear_cart().await?;
    }

    // The catalog the storefront would render
    let blue_train = CatalogItem {
        id: ItemId::from("r-blue-train"),
        title: "Blue Train".to_string(),
        artist: "John Coltrane".to_string(),
        price: Money::from_euros(25),
        cover_url: "https://covers.spinshop.example/blue-train.jpg".to_string(),
        genre: "Jazz".to_string(),
        format: "LP".to_string(),
        description: "The 1957 Blue Note session, 180g reissue.".to_string(),
        discogs_link: "https://www.discogs.com/release/2825456".to_string(),
    };
    let kind_of_blue = CatalogItem {
        id: ItemId::from("r-kind-of-blue"),
        title: "Kind of Blue".to_string(),
        artist: "Miles Davis".to_string(),
        price: Money::from_euros(45),
        cover_url: "https://covers.spinshop.example/kind-of-blue.jpg".to_string(),
        genre: "Jazz".to_string(),
        format: "LP".to_string(),
        description: "Mono pressing of the 1959 classic.".to_string(),
        discogs_link: "https://www.discogs.com/release/1732643".to_string(),
    };
    let jazz_night = CatalogItem::ticket_for_event(
        "jazz-night",
        "Jazz Night",
        "Live Music",
        "2026-09-12",
        Money::from_euros(15),
    );

    println!("\n>>> Adding: {} ({} EUR)", blue_train.title, blue_train.price);
    shop.add_to_cart(blue_train).await?;

    println!(">>> Adding: {} ({} EUR)", kind_of_blue.title, kind_of_blue.price);
    shop.add_to_cart(kind_of_blue).await?;

    println!(">>> Adding: {} ({} EUR)", jazz_night.title, jazz_night.price);
    shop.add_to_cart(jazz_night).await?;

    println!(
        "\nCart: {} items, {} EUR (+{} EUR at checkout)",
        shop.cart_count().await,
        shop.cart_total().await,
        SHIPPING_FEE
    );

    println!("\n>>> Checking out with card 4242 4242 4242 4242…");
    let card = CardDetails::new("4242 4242 4242 4242", "12/30", "123");
    match shop.checkout(card).await {
        Ok(receipt) => {
            println!("Payment approved!");
            println!("  receipt:  {}", receipt.id);
            println!("  charged:  {} EUR", receipt.total);
            println!("  items:    {}", receipt.items.len());
            println!("  type:     {}", receipt.kind);
        }
        Err(StorefrontError::Rejected(failure)) => {
            println!("Checkout did not settle: {failure}");
        }
        Err(error) => return Err(error.into()),
    }

    println!("\nCart after checkout: {} items", shop.cart_count().await);

    // What the back office reads off the same ledger
    let sales = shop.sales().await?;
    let summary = shop.sales_summary().await?;
    println!("\n=== Back Office ===");
    println!("Recorded sales: {}", sales.len());
    println!("Total revenue:  {} EUR", summary.total_revenue);
    println!("Ticket sales:   {}", summary.ticket_sales);

    shop.shutdown().await?;
    println!("\n=== Walkthrough Complete ===");
    Ok(())
}
