//! Catalog handlers: bonus campaigns, banners and games share one generic set
//! of CRUD handlers; support queries have their own open/reply flow.

use axum::{
    Router,
    extract::{Extension, OriginalUri, State},
    routing::get,
};
use betting_admin::{
    PageRequest,
    auth::AccessTokenClaims,
    catalog::{
        AvailableGame, Banner, CatalogItem, CatalogManager, DepositBonus, DocumentFilter,
        FestivalBonus, NewQuery, QueryReply,
    },
};

use super::AppState;
use super::response::{self, ApiJson, ApiPath, ApiQuery, ApiResult};

/// Stored form of `ItemStatus::Active`
const ACTIVE: &str = "Active";

/// Catalog collection exposed over HTTP
pub trait CatalogRoute: CatalogItem {
    /// Route prefix, relative to `/api/v1` or `/api/v1/admin`
    const PATH: &'static str;

    fn manager(state: &AppState) -> &CatalogManager<Self>;
}

impl CatalogRoute for DepositBonus {
    const PATH: &'static str = "/deposit-bonuses";

    fn manager(state: &AppState) -> &CatalogManager<Self> {
        &state.deposit_bonuses
    }
}

impl CatalogRoute for FestivalBonus {
    const PATH: &'static str = "/festival-bonuses";

    fn manager(state: &AppState) -> &CatalogManager<Self> {
        &state.festival_bonuses
    }
}

impl CatalogRoute for Banner {
    const PATH: &'static str = "/banners";

    fn manager(state: &AppState) -> &CatalogManager<Self> {
        &state.banners
    }
}

impl CatalogRoute for AvailableGame {
    const PATH: &'static str = "/games";

    fn manager(state: &AppState) -> &CatalogManager<Self> {
        &state.games
    }
}

/// Admin CRUD routes for one collection
pub fn admin_routes<T: CatalogRoute>() -> Router<AppState> {
    Router::new()
        .route(T::PATH, get(admin_list::<T>).post(create::<T>))
        .route(
            &format!("{}/{{public_id}}", T::PATH),
            get(get_one::<T>).put(update::<T>).delete(delete::<T>),
        )
}

fn listed(entity: &str) -> String {
    format!("{entity} list fetched")
}

/// Active items only, for unauthenticated clients
pub async fn public_list<T: CatalogRoute>(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageRequest>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult {
    let filter = DocumentFilter {
        status: Some(ACTIVE.to_string()),
        user_id: None,
    };
    let items = T::manager(&state).list(&filter, page.normalized()).await?;
    response::paginated(listed(T::ENTITY), items, uri.path())
}

/// `GET /admin/<collection>?status=&pageNumber=&perpage=`
pub async fn admin_list<T: CatalogRoute>(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<DocumentFilter>,
    ApiQuery(page): ApiQuery<PageRequest>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult {
    let items = T::manager(&state).list(&filter, page.normalized()).await?;
    response::paginated(listed(T::ENTITY), items, uri.path())
}

pub async fn create<T: CatalogRoute>(
    State(state): State<AppState>,
    ApiJson(item): ApiJson<T>,
) -> ApiResult {
    let document = T::manager(&state).create(item).await?;
    response::created(format!("{} created", T::ENTITY), document)
}

pub async fn get_one<T: CatalogRoute>(
    State(state): State<AppState>,
    ApiPath(public_id): ApiPath<i64>,
) -> ApiResult {
    let document = T::manager(&state).get(public_id).await?;
    response::ok(format!("{} fetched", T::ENTITY), document)
}

pub async fn update<T: CatalogRoute>(
    State(state): State<AppState>,
    ApiPath(public_id): ApiPath<i64>,
    ApiJson(item): ApiJson<T>,
) -> ApiResult {
    let document = T::manager(&state).update(public_id, item).await?;
    response::ok(format!("{} updated", T::ENTITY), document)
}

pub async fn delete<T: CatalogRoute>(
    State(state): State<AppState>,
    ApiPath(public_id): ApiPath<i64>,
) -> ApiResult {
    T::manager(&state).delete(public_id).await?;
    response::done(format!("{} deleted", T::ENTITY))
}

// ============================================================================
// Support queries
// ============================================================================

pub async fn open_query(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessTokenClaims>,
    ApiJson(query): ApiJson<NewQuery>,
) -> ApiResult {
    let document = state.queries.open(claims.user_id, query).await?;
    response::created("Query submitted", document)
}

pub async fn my_queries(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessTokenClaims>,
    ApiQuery(page): ApiQuery<PageRequest>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult {
    let queries = state
        .queries
        .list_for_user(claims.user_id, page.normalized())
        .await?;
    response::paginated("Queries listed", queries, uri.path())
}

/// `GET /admin/queries?status=Open&userId=&pageNumber=&perpage=`
pub async fn list_queries(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<DocumentFilter>,
    ApiQuery(page): ApiQuery<PageRequest>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult {
    let queries = state.queries.list(&filter, page.normalized()).await?;
    response::paginated("Queries listed", queries, uri.path())
}

pub async fn get_query(
    State(state): State<AppState>,
    ApiPath(public_id): ApiPath<i64>,
) -> ApiResult {
    let document = state.queries.get(public_id).await?;
    response::ok("Query fetched", document)
}

/// Store the reply and mark the query Resolved
pub async fn reply_query(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessTokenClaims>,
    ApiPath(public_id): ApiPath<i64>,
    ApiJson(reply): ApiJson<QueryReply>,
) -> ApiResult {
    let document = state.queries.reply(public_id, &reply.reply).await?;
    tracing::info!(admin_id = claims.user_id, public_id, "Query answered");
    response::ok("Reply sent", document)
}
