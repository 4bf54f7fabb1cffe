//! In-process stand-in for the public jsonplaceholder `/posts` resource.
//!
//! # Design
//! The real demo API fakes every write, so a delete followed by a read still
//! finds the post. This server keeps writes in memory instead, which makes the
//! contract tests deterministic. Response shapes and status codes otherwise
//! follow the public service: 201 on create, `{}` bodies on 404, and a 200
//! for every delete.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;

/// Number of posts a fresh server starts with.
pub const SEED_COUNT: u64 = 100;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
    pub id: u64,
    pub title: String,
    pub body: String,
}

/// Payload for `POST` and `PUT`. Any client-supplied `id` is ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// Payload for `PATCH`. Only the fields present are applied.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchPost {
    pub user_id: Option<u64>,
    pub title: Option<String>,
    pub body: Option<String>,
}

/// Query filters accepted by `GET /posts`. Unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostFilter {
    pub user_id: Option<u64>,
    pub id: Option<u64>,
}

pub type Db = Arc<RwLock<BTreeMap<u64, Post>>>;

/// The seed data: ten posts per user, ids `1..=SEED_COUNT`.
pub fn seed() -> BTreeMap<u64, Post> {
    (1..=SEED_COUNT)
        .map(|id| {
            let post = Post {
                user_id: Some((id - 1) / 10 + 1),
                id,
                title: format!("post {id}"),
                body: format!("body of post {id}"),
            };
            (id, post)
        })
        .collect()
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(seed()));
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/{id}",
            get(get_post)
                .put(replace_post)
                .patch(patch_post)
                .delete(delete_post),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

type NotFound = (StatusCode, Json<Value>);

fn not_found() -> NotFound {
    (StatusCode::NOT_FOUND, Json(json!({})))
}

async fn list_posts(State(db): State<Db>, Query(filter): Query<PostFilter>) -> Json<Vec<Post>> {
    let posts = db.read().await;
    Json(
        posts
            .values()
            .filter(|p| filter.user_id.is_none_or(|u| p.user_id == Some(u)))
            .filter(|p| filter.id.is_none_or(|id| p.id == id))
            .cloned()
            .collect(),
    )
}

async fn create_post(
    State(db): State<Db>,
    Json(input): Json<NewPost>,
) -> (StatusCode, Json<Post>) {
    let mut posts = db.write().await;
    let id = posts.keys().next_back().map_or(1, |last| last + 1);
    let post = Post {
        user_id: input.user_id,
        id,
        title: input.title,
        body: input.body,
    };
    posts.insert(id, post.clone());
    tracing::debug!(id, "created post");
    (StatusCode::CREATED, Json(post))
}

async fn get_post(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<Post>, NotFound> {
    let posts = db.read().await;
    posts.get(&id).cloned().map(Json).ok_or_else(not_found)
}

async fn replace_post(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<NewPost>,
) -> Result<Json<Post>, NotFound> {
    let mut posts = db.write().await;
    let post = posts.get_mut(&id).ok_or_else(not_found)?;
    *post = Post {
        user_id: input.user_id,
        id,
        title: input.title,
        body: input.body,
    };
    Ok(Json(post.clone()))
}

async fn patch_post(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<PatchPost>,
) -> Result<Json<Post>, NotFound> {
    let mut posts = db.write().await;
    let post = posts.get_mut(&id).ok_or_else(not_found)?;
    if let Some(user_id) = input.user_id {
        post.user_id = Some(user_id);
    }
    if let Some(title) = input.title {
        post.title = title;
    }
    if let Some(body) = input.body {
        post.body = body;
    }
    Ok(Json(post.clone()))
}

async fn delete_post(State(db): State<Db>, Path(id): Path<u64>) -> Json<Value> {
    if db.write().await.remove(&id).is_some() {
        tracing::debug!(id, "deleted post");
    }
    Json(json!({}))
}
