//! Per-resource REST wrappers.
//!
//! A [`ResourceService`] turns one typed operation into exactly one HTTP
//! request (two for [`get_by_slug`](ResourceService::get_by_slug)) and
//! unwraps the typed result. Errors propagate unchanged.

use std::marker::PhantomData;

use quill_core::error::CoreError;
use quill_core::models::{Blog, Editor, Industry, Media, Project, Resource, Service, Tag};
use quill_core::pagination::{ListParams, ListResponse};
use quill_core::types::RecordId;

use crate::error::ApiError;
use crate::http::{ApiClient, RequestBody};

pub type BlogService = ResourceService<Blog>;
pub type ServiceService = ResourceService<Service>;
pub type IndustryService = ResourceService<Industry>;
pub type ProjectService = ResourceService<Project>;
pub type TagService = ResourceService<Tag>;
pub type MediaService = ResourceService<Media>;
pub type EditorService = ResourceService<Editor>;

/// CRUD operations for one collection endpoint.
pub struct ResourceService<R> {
    client: ApiClient,
    _marker: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceService<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _marker: PhantomData,
        }
    }
}

impl<R: Resource> ResourceService<R> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            _marker: PhantomData,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    fn detail_path(id: &RecordId) -> String {
        format!("{}{}/", R::PATH, id)
    }

    /// `GET` the collection, accepting both flat and paged responses.
    pub async fn list_page(&self, params: &ListParams) -> Result<ListResponse<R>, ApiError> {
        self.client.get(R::PATH, &params.to_query_pairs()).await
    }

    /// `GET` the collection and return its items in server order.
    pub async fn list(&self, params: &ListParams) -> Result<Vec<R>, ApiError> {
        Ok(self.list_page(params).await?.into_items())
    }

    pub async fn get(&self, id: &RecordId) -> Result<R, ApiError> {
        self.client.get(&Self::detail_path(id), &[]).await
    }

    /// Find a record by slug.
    ///
    /// There is no slug endpoint: this fetches the collection, searches it
    /// linearly and then fetches the match by id. Only the first page is
    /// searched and slugs are assumed unique.
    pub async fn get_by_slug(&self, slug: &str) -> Result<R, ApiError> {
        let items = self.list(&ListParams::default()).await?;
        let id = items
            .iter()
            .find(|item| item.slug() == Some(slug))
            .map(|item| item.id().clone())
            .ok_or_else(|| CoreError::NotFound {
                entity: R::ENTITY,
                key: slug.to_string(),
            })?;
        self.get(&id).await
    }

    pub async fn create(&self, body: RequestBody) -> Result<R, ApiError> {
        self.client.post(R::PATH, body).await
    }

    /// Partial update (`PATCH`).
    pub async fn update(&self, id: &RecordId, body: RequestBody) -> Result<R, ApiError> {
        self.client.patch(&Self::detail_path(id), body).await
    }

    pub async fn delete(&self, id: &RecordId) -> Result<(), ApiError> {
        self.client.delete(&Self::detail_path(id)).await
    }
}
