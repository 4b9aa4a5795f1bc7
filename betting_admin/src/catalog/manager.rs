//! Generic document CRUD over one collection.

use std::marker::PhantomData;

use super::models::{
    CatalogItem, Document, DocumentFilter, NewQuery, QueryStatus, SupportQuery,
};
use crate::accounts::UserId;
use crate::db::SharedStore;
use crate::error::{AdminError, AdminResult};
use crate::ids::with_unique_id;
use crate::pagination::{Page, PageRequest};

/// CRUD manager for the collection of `T`
pub struct CatalogManager<T> {
    store: SharedStore,
    _item: PhantomData<fn() -> T>,
}

impl<T> Clone for CatalogManager<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _item: PhantomData,
        }
    }
}

impl<T: CatalogItem> CatalogManager<T> {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            _item: PhantomData,
        }
    }

    /// Validate and insert under a fresh six-digit public id
    pub async fn create(&self, item: T) -> AdminResult<Document<T>> {
        item.validate()?;
        let body = serde_json::to_value(&item)?;

        let stored = with_unique_id("public_id", |public_id| {
            let store = self.store.clone();
            let body = body.clone();
            async move { store.insert_document(T::COLLECTION, public_id, body).await }
        })
        .await?;

        log::info!("Created {} {}", T::ENTITY, stored.public_id);
        stored.decode()
    }

    pub async fn get(&self, public_id: i64) -> AdminResult<Document<T>> {
        self.store
            .find_document(T::COLLECTION, public_id)
            .await?
            .ok_or_else(|| AdminError::not_found(T::ENTITY, public_id))?
            .decode()
    }

    /// Newest first
    pub async fn list(
        &self,
        filter: &DocumentFilter,
        page: PageRequest,
    ) -> AdminResult<Page<Document<T>>> {
        let (docs, total) = self
            .store
            .list_documents(T::COLLECTION, filter, &page)
            .await?;
        let items = docs
            .into_iter()
            .map(|d| d.decode())
            .collect::<AdminResult<Vec<_>>>()?;
        Ok(Page::new(items, page, total))
    }

    /// Replace the body of an existing document
    pub async fn update(&self, public_id: i64, item: T) -> AdminResult<Document<T>> {
        item.validate()?;
        let body = serde_json::to_value(&item)?;

        let stored = self
            .store
            .replace_document(T::COLLECTION, public_id, body)
            .await?
            .ok_or_else(|| AdminError::not_found(T::ENTITY, public_id))?;

        log::info!("Updated {} {}", T::ENTITY, public_id);
        stored.decode()
    }

    pub async fn delete(&self, public_id: i64) -> AdminResult<()> {
        if !self.store.delete_document(T::COLLECTION, public_id).await? {
            return Err(AdminError::not_found(T::ENTITY, public_id));
        }
        log::info!("Deleted {} {}", T::ENTITY, public_id);
        Ok(())
    }
}

impl CatalogManager<SupportQuery> {
    /// Open a support query for `user_id`
    pub async fn open(&self, user_id: UserId, query: NewQuery) -> AdminResult<Document<SupportQuery>> {
        self.create(SupportQuery {
            user_id,
            subject: query.subject,
            message: query.message,
            reply: None,
            status: QueryStatus::Open,
        })
        .await
    }

    /// Queries opened by one user
    pub async fn list_for_user(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> AdminResult<Page<Document<SupportQuery>>> {
        let filter = DocumentFilter {
            status: None,
            user_id: Some(user_id),
        };
        self.list(&filter, page).await
    }

    /// Store the admin reply and resolve the query
    pub async fn reply(&self, public_id: i64, reply: &str) -> AdminResult<Document<SupportQuery>> {
        if reply.trim().is_empty() {
            return Err(AdminError::validation("Reply must not be empty"));
        }

        let mut query = self.get(public_id).await?.body;
        query.reply = Some(reply.to_string());
        query.status = QueryStatus::Resolved;

        self.update(public_id, query).await
    }
}
