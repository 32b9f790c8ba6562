pub mod auth;
pub mod category;
pub mod menu_item;
pub mod pagination;
pub mod public;
pub mod section;
pub mod temporary_price;
