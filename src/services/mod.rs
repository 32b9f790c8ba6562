pub mod auth;
pub mod categories;
pub mod images;
pub mod menu_items;
pub mod metrics;
pub mod pricing;
pub mod public_menu;
pub mod sections;
pub mod slug;
pub mod temporary_prices;
