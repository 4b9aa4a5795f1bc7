//! Plain CRUD aggregates kept as documents: deposit and festival bonuses,
//! banners, available games and support queries.

pub mod manager;
pub mod models;

pub use manager::CatalogManager;
pub use models::{
    AvailableGame, Banner, CatalogItem, DepositBonus, Document, DocumentFilter, FestivalBonus,
    ItemStatus, NewQuery, QueryReply, QueryStatus, StoredDocument, SupportQuery,
};
