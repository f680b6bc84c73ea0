//! Entry search route.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiResult, middleware::AuthUser};
use jobledger_db::{EntryRepository, repositories::EntrySearchHit};
use jobledger_shared::types::{PageRequest, PageResponse};

/// Creates the search routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/search/entries", get(search_entries))
}

/// Query parameters for entry search.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    /// Text matched against descriptions and material descriptions.
    #[serde(default)]
    pub q: String,
    /// Restrict to one project.
    pub project_id: Option<Uuid>,
    /// Page number, from 1.
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

impl SearchQuery {
    fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

/// GET /search/entries?q=&project_id=&page=&per_page=
async fn search_entries(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<PageResponse<EntrySearchHit>>> {
    let repo = EntryRepository::new((*state.db).clone());
    let hits = repo
        .search(
            auth.contractor_id(),
            query.q.trim(),
            query.project_id,
            &query.page_request(),
        )
        .await?;
    Ok(Json(hits))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults() {
        let page = SearchQuery::default().page_request();
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 20);
    }

    #[test]
    fn test_page_from_query() {
        let query = SearchQuery {
            page: Some(3),
            per_page: Some(50),
            ..SearchQuery::default()
        };
        let page = query.page_request();
        assert_eq!(page.page, 3);
        assert_eq!(page.per_page, 50);
    }
}
