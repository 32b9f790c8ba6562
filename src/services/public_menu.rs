use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::{
    error::ServiceError,
    models::{
        category::Category,
        menu_item::MenuItem,
        public::{PublicCategory, PublicCategoryWithSections, PublicMenuItem, PublicSection, SitemapEntry},
        section::Section,
        temporary_price::TemporaryPrice,
    },
    services::{
        categories::CategoryService, menu_items::MenuItemService, pricing,
        sections::SectionService, temporary_prices::TemporaryPriceService,
    },
};

pub struct PublicMenuService;

impl PublicMenuService {
    pub async fn categories(pool: &PgPool) -> Result<Vec<PublicCategory>, ServiceError> {
        Ok(CategoryService::list_enabled(pool)
            .await?
            .into_iter()
            .map(public_category)
            .collect())
    }

    /// Enabled category with its enabled sections and items, priced at `at`.
    pub async fn category_by_slug(
        pool: &PgPool,
        slug: &str,
        at: DateTime<Utc>,
    ) -> Result<PublicCategoryWithSections, ServiceError> {
        let category = CategoryService::get_enabled_by_slug(pool, slug).await?;
        let sections = SectionService::list_enabled_for_category(pool, category.id).await?;
        let section_ids: Vec<_> = sections.iter().map(|s| s.id).collect();
        let items = MenuItemService::list_enabled_for_sections(pool, &section_ids).await?;
        let item_ids: Vec<_> = items.iter().map(|i| i.id).collect();
        let rules = TemporaryPriceService::for_items(pool, &item_ids).await?;

        Ok(assemble(category, sections, items, &rules, at))
    }

    pub async fn sitemap(pool: &PgPool, base_url: &str) -> Result<Vec<SitemapEntry>, ServiceError> {
        let categories = CategoryService::list_enabled(pool).await?;
        Ok(sitemap_entries(base_url, &categories))
    }
}

fn public_category(c: Category) -> PublicCategory {
    PublicCategory {
        id: c.id,
        name: c.name,
        slug: c.slug,
        description: c.description,
        image_url: c.image_url,
        order: c.sort_order,
    }
}

/// Group items under their sections, keeping the order of both inputs.
pub fn assemble(
    category: Category,
    sections: Vec<Section>,
    items: Vec<MenuItem>,
    rules: &[TemporaryPrice],
    at: DateTime<Utc>,
) -> PublicCategoryWithSections {
    let mut public_sections: Vec<PublicSection> = sections
        .into_iter()
        .map(|s| PublicSection {
            id: s.id,
            name: s.name,
            slug: s.slug,
            description: s.description,
            image_url: s.image_url,
            order: s.sort_order,
            menu_items: Vec::new(),
        })
        .collect();

    for item in items {
        let Some(section) = public_sections.iter_mut().find(|s| s.id == item.section_id) else {
            continue;
        };
        section.menu_items.push(PublicMenuItem {
            id: item.id,
            effective_price: pricing::effective_price(item.base_price, rules, item.id, at),
            base_price: item.base_price,
            name: item.name,
            slug: item.slug,
            description: item.description,
            image_url: item.image_url,
            available: item.available,
        });
    }

    PublicCategoryWithSections {
        category: public_category(category),
        sections: public_sections,
    }
}

pub fn sitemap_entries(base_url: &str, categories: &[Category]) -> Vec<SitemapEntry> {
    let base = base_url.trim_end_matches('/');
    let mut entries = vec![
        SitemapEntry {
            url: base.to_string(),
            change_frequency: "weekly",
            priority: 1.0,
        },
        SitemapEntry {
            url: format!("{base}/menu"),
            change_frequency: "weekly",
            priority: 0.9,
        },
    ];
    entries.extend(categories.iter().map(|c| SitemapEntry {
        url: format!("{base}/menu/{}", c.slug),
        change_frequency: "weekly",
        priority: 0.8,
    }));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn ts(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, h, 0, 0).unwrap()
    }

    fn category() -> Category {
        Category {
            id: Uuid::new_v4(),
            name: "Drinks".into(),
            slug: "drinks".into(),
            description: None,
            image_url: None,
            sort_order: 1,
            enabled: true,
            created_at: ts(0),
            updated_at: ts(0),
        }
    }

    fn section(category_id: Uuid, name: &str, order: i32) -> Section {
        Section {
            id: Uuid::new_v4(),
            category_id,
            name: name.into(),
            slug: name.to_lowercase(),
            description: None,
            image_url: None,
            sort_order: order,
            enabled: true,
            created_at: ts(0),
            updated_at: ts(0),
        }
    }

    fn item(section: &Section, name: &str, price: i64) -> MenuItem {
        MenuItem {
            id: Uuid::new_v4(),
            category_id: section.category_id,
            section_id: section.id,
            name: name.into(),
            slug: name.to_lowercase(),
            description: None,
            base_price: Decimal::from(price),
            image_url: None,
            available: true,
            enabled: true,
            sort_order: 0,
            created_at: ts(0),
            updated_at: ts(0),
        }
    }

    #[test]
    fn assemble_groups_and_prices_items() {
        let cat = category();
        let cocktails = section(cat.id, "Cocktails", 0);
        let wines = section(cat.id, "Wines", 1);
        let mojito = item(&cocktails, "Mojito", 4500);
        let house = item(&wines, "House", 3500);
        let rules = vec![TemporaryPrice {
            id: Uuid::new_v4(),
            menu_item_id: mojito.id,
            rule_name: "Happy Hour".into(),
            price: Decimal::from(3000),
            start_at: ts(17),
            end_at: ts(19),
            enabled: true,
            created_at: ts(0),
            updated_at: ts(0),
        }];

        let out = assemble(cat, vec![cocktails, wines], vec![mojito, house], &rules, ts(18));
        assert_eq!(out.sections.len(), 2);
        assert_eq!(out.sections[0].menu_items[0].effective_price, Decimal::from(3000));
        assert_eq!(out.sections[0].menu_items[0].base_price, Decimal::from(4500));
        assert_eq!(out.sections[1].menu_items[0].effective_price, Decimal::from(3500));

        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["slug"], "drinks");
        assert_eq!(json["sections"][0]["menuItems"][0]["effectivePrice"], "3000");
        assert_eq!(json["sections"][0]["menuItems"][0]["basePrice"], "4500");
    }

    #[test]
    fn sitemap_lists_static_and_category_pages() {
        let entries = sitemap_entries("https://lounge.example/", &[category()]);
        let urls: Vec<_> = entries.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(
            urls,
            [
                "https://lounge.example",
                "https://lounge.example/menu",
                "https://lounge.example/menu/drinks"
            ]
        );
    }
}
