/// Insert the sample lounge menu (Food, Drinks, Smoke) for local development.
///
/// Usage: seed-menu [--reset] [--happy-hour]
///   --reset       : delete every category (and, by cascade, the whole menu) first
///   --happy-hour  : add a running "Happy Hour" price on the signature cocktails
use chrono::{Duration, Utc};
use clap::Parser;
use rust_decimal::Decimal;

use lounge_menu_api::{
    db,
    models::{
        category::NewCategory, menu_item::CreateMenuItemRequest, section::NewSection,
        temporary_price::NewTemporaryPrice,
    },
    services::{
        categories::CategoryService, menu_items::MenuItemService, sections::SectionService,
        temporary_prices::TemporaryPriceService,
    },
};

#[derive(Parser)]
#[command(name = "seed-menu", about = "Seed the lounge menu with sample data")]
struct Args {
    #[arg(long)]
    reset: bool,

    #[arg(long)]
    happy_hour: bool,
}

struct SeedItem {
    name: &'static str,
    description: &'static str,
    price: i64,
    image_url: Option<&'static str>,
}

struct SeedSection {
    name: &'static str,
    description: &'static str,
    items: &'static [SeedItem],
}

struct SeedCategory {
    name: &'static str,
    description: &'static str,
    image_url: &'static str,
    sections: &'static [SeedSection],
}

const fn item(name: &'static str, description: &'static str, price: i64) -> SeedItem {
    SeedItem { name, description, price, image_url: None }
}

const fn pictured(
    name: &'static str,
    description: &'static str,
    price: i64,
    image_url: &'static str,
) -> SeedItem {
    SeedItem { name, description, price, image_url: Some(image_url) }
}

const MENU: &[SeedCategory] = &[
    SeedCategory {
        name: "Food",
        description: "Small chops, grills, mains and sides",
        image_url: "https://images.unsplash.com/photo-1504674900247-0877df9cc836?auto=format&fit=crop&w=800&q=80",
        sections: &[
            SeedSection {
                name: "Small Chops",
                description: "Finger foods and light bites",
                items: &[
                    pictured(
                        "Chicken Wings",
                        "Spicy chicken wings with special sauce",
                        3500,
                        "https://images.unsplash.com/photo-1604908176997-125f25cc500f?auto=format&fit=crop&w=800&q=80",
                    ),
                    item("Spring Rolls", "Crispy spring rolls with dipping sauce", 3000),
                ],
            },
            SeedSection {
                name: "Grills & BBQ",
                description: "Grilled meats and BBQ platters",
                items: &[
                    item("Grilled Chicken", "Tender grilled chicken with herbs", 5000),
                    item("BBQ Ribs", "Slow-cooked BBQ ribs", 6500),
                ],
            },
            SeedSection {
                name: "Main Dishes",
                description: "Hearty mains for full meals",
                items: &[
                    item("Jollof Rice", "Nigerian jollof rice with chicken", 4000),
                    item("Fried Rice", "Special fried rice with mixed vegetables", 4500),
                ],
            },
            SeedSection {
                name: "Sides",
                description: "Sides to complement your meal",
                items: &[pictured(
                    "French Fries",
                    "Crispy golden fries",
                    2000,
                    "https://images.unsplash.com/photo-1541592106381-b31e9677c0e5?auto=format&fit=crop&w=800&q=80",
                )],
            },
            SeedSection {
                name: "Platters",
                description: "Sharing platters for groups",
                items: &[item("Mixed Platter", "Assorted appetizers platter", 8000)],
            },
        ],
    },
    SeedCategory {
        name: "Drinks",
        description: "Cocktails, wines, beers and more",
        image_url: "https://images.unsplash.com/photo-1514362545857-3bc16c4c7d1b?auto=format&fit=crop&w=800&q=80",
        sections: &[
            SeedSection {
                name: "Signature Cocktails",
                description: "House special cocktails",
                items: &[
                    pictured(
                        "Signature Mojito",
                        "House special mojito with fresh mint",
                        4500,
                        "https://images.unsplash.com/photo-1546173159-315724a31696?auto=format&fit=crop&w=800&q=80",
                    ),
                    item("Pool's Special", "Our signature cocktail blend", 5000),
                ],
            },
            SeedSection {
                name: "Classic Cocktails",
                description: "All-time cocktail favorites",
                items: &[
                    item("Margarita", "Classic margarita", 4000),
                    item("Old Fashioned", "Classic whiskey cocktail", 4500),
                ],
            },
            SeedSection {
                name: "Beers & Ciders",
                description: "Beers and refreshing ciders",
                items: &[
                    item("Heineken", "Premium beer", 3000),
                    item("Stella Artois", "Premium lager", 3200),
                ],
            },
            SeedSection {
                name: "Wines",
                description: "Red, white and sparkling wines",
                items: &[item("House Wine (Glass)", "Red or white wine", 3500)],
            },
            SeedSection {
                name: "Spirits",
                description: "Vodka, gin, whisky and more",
                items: &[item("Hennessy VS", "Premium cognac", 12000)],
            },
            SeedSection {
                name: "Non-Alcoholic",
                description: "Mocktails, juices and sodas",
                items: &[item("Fresh Orange Juice", "Freshly squeezed orange juice", 2000)],
            },
        ],
    },
    SeedCategory {
        name: "Smoke",
        description: "Shisha, cigars and cigarettes",
        image_url: "https://images.unsplash.com/photo-1527661591475-527312dd65f5?auto=format&fit=crop&w=800&q=80",
        sections: &[
            SeedSection {
                name: "Shisha",
                description: "Flavoured shisha options",
                items: &[
                    pictured(
                        "Premium Shisha",
                        "Flavored shisha with choice of flavor",
                        6000,
                        "https://images.unsplash.com/photo-1611316265282-7d4b6a3b15a5?auto=format&fit=crop&w=800&q=80",
                    ),
                    item("Deluxe Shisha", "Premium shisha with special flavors", 8000),
                ],
            },
            SeedSection {
                name: "Cigars",
                description: "Premium cigars selection",
                items: &[item("Cuban Cigar", "Premium Cuban cigar", 8000)],
            },
            SeedSection {
                name: "Cigarettes",
                description: "Cigarette options",
                items: &[item("Marlboro", "Premium cigarettes", 1500)],
            },
        ],
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable not set"))?;
    let pool = db::create_pool(&database_url).await?;
    db::run_migrations(&pool).await?;

    if args.reset {
        let deleted = sqlx::query("DELETE FROM categories").execute(&pool).await?;
        tracing::info!("removed {} categories", deleted.rows_affected());
    } else {
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&pool)
            .await?;
        if existing > 0 {
            tracing::warn!("menu already has {} categories; pass --reset to reseed", existing);
            return Ok(());
        }
    }

    let mut item_count = 0;
    let mut cocktail_ids = Vec::new();

    for (c_idx, seed) in MENU.iter().enumerate() {
        let category = CategoryService::create(
            &pool,
            &NewCategory {
                name: seed.name.into(),
                description: Some(seed.description.into()),
                enabled: true,
                sort_order: Some(c_idx as i32),
                image_url: Some(seed.image_url.into()),
            },
        )
        .await?
        .category;

        for (s_idx, section_seed) in seed.sections.iter().enumerate() {
            let section = SectionService::create(
                &pool,
                &NewSection {
                    category_id: category.id,
                    name: section_seed.name.into(),
                    description: Some(section_seed.description.into()),
                    enabled: true,
                    sort_order: Some(s_idx as i32),
                    image_url: None,
                },
            )
            .await?;

            for it in section_seed.items {
                let created = MenuItemService::create(
                    &pool,
                    &CreateMenuItemRequest {
                        category_id: category.id,
                        section_id: section.id,
                        name: it.name.into(),
                        slug: None,
                        description: Some(it.description.into()),
                        base_price: Decimal::from(it.price),
                        image_url: it.image_url.map(Into::into),
                        available: Some(true),
                        enabled: Some(true),
                    },
                )
                .await?;
                if section_seed.name == "Signature Cocktails" {
                    cocktail_ids.push((created.id, created.base_price));
                }
                item_count += 1;
            }
        }
        tracing::info!(slug = %category.slug, "seeded category {}", category.name);
    }

    if args.happy_hour {
        let start = Utc::now() - Duration::hours(1);
        for (id, base) in &cocktail_ids {
            TemporaryPriceService::create(
                &pool,
                &NewTemporaryPrice {
                    menu_item_id: *id,
                    rule_name: "Happy Hour".into(),
                    // 20% off
                    price: (*base * Decimal::new(8, 1)).round_dp(2),
                    start_at: start,
                    end_at: start + Duration::hours(3),
                    enabled: true,
                },
            )
            .await?;
        }
        tracing::info!("added happy hour to {} cocktails", cocktail_ids.len());
    }

    tracing::info!("seeded {} categories and {} menu items", MENU.len(), item_count);
    Ok(())
}
