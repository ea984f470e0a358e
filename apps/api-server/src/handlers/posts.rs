//! Post handlers - publishing, editing and interacting with posts.

use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};

use piazza_core::InteractionReceipt;
use piazza_core::domain::{Interaction, NewPost, Post, PostChanges, PostView, Topic, parse_post_id};
use piazza_core::query::{InterestOrder, TopicFilter, TopicQuery};
use piazza_shared::ApiResponse;
use piazza_shared::dto::{
    CommentRequest, CreatePostRequest, InteractionResponse, InteractionView, PostResponse,
    TopicListQuery, UpdatePostRequest,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn interaction_view(entry: Interaction) -> InteractionView {
    InteractionView {
        time: entry.time.to_rfc3339(),
        kind: entry.kind.as_str().to_string(),
        actor_id: entry.actor_id.to_string(),
        actor_name: entry.actor_name,
        text: entry.text,
        remaining_at_time: entry.remaining_at_time,
    }
}

/// Build the wire form of `post`, with its status as of `now`.
fn to_response(post: Post, include_interactions: bool, now: DateTime<Utc>) -> PostResponse {
    let status = post.status_at(now).to_string();
    let interactions = include_interactions
        .then(|| post.interactions.into_iter().map(interaction_view).collect());

    PostResponse {
        id: post.id.to_string(),
        author_id: post.author_id.to_string(),
        author_name: post.author_name,
        title: post.title,
        text: post.text,
        topics: post.topics.iter().map(|t| t.as_str().to_string()).collect(),
        created_at: post.created_at.to_rfc3339(),
        duration_minutes: post.duration_minutes,
        expiration_time: post.expiration_time.to_rfc3339(),
        status,
        likes: post.likes,
        dislikes: post.dislikes,
        interest_score: post.interest_score,
        interactions,
    }
}

fn view_response(view: PostView, now: DateTime<Utc>) -> PostResponse {
    let full = view.includes_interactions();
    to_response(view.into_post(), full, now)
}

fn receipt_response(state: &AppState, receipt: InteractionReceipt) -> HttpResponse {
    HttpResponse::Ok().json(InteractionResponse {
        message: receipt.message,
        post: to_response(receipt.post, true, state.posts.now()),
    })
}

/// POST /api/post
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let draft = NewPost {
        title: req.title,
        text: req.text,
        topics: Topic::parse_list(&req.topics)?,
        duration_minutes: req.duration_minutes,
    };

    let post = state.posts.create_post(&identity.caller(), draft).await?;
    let now = state.posts.now();
    Ok(HttpResponse::Created().json(to_response(post, true, now)))
}

/// GET /api/post/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_post_id(&path)?;
    let post = state.posts.get_post(id).await?;
    Ok(HttpResponse::Ok().json(to_response(post, true, state.posts.now())))
}

/// PATCH /api/post/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let id = parse_post_id(&path)?;
    let req = body.into_inner();
    let changes = PostChanges {
        title: req.title,
        text: req.text,
        topics: req.topics.map(Topic::parse_list).transpose()?,
    };

    let post = state
        .posts
        .update_post(&identity.caller(), id, changes)
        .await?;
    let response = to_response(post, true, state.posts.now());
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(response, "Post updated")))
}

/// DELETE /api/post/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_post_id(&path)?;
    state.posts.delete_post(&identity.caller(), id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::<()>::message("Post deleted")))
}

/// POST /api/post/{id}/like
pub async fn like(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_post_id(&path)?;
    let receipt = state.posts.like(&identity.caller(), id).await?;
    Ok(receipt_response(&state, receipt))
}

/// POST /api/post/{id}/dislike
pub async fn dislike(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_post_id(&path)?;
    let receipt = state.posts.dislike(&identity.caller(), id).await?;
    Ok(receipt_response(&state, receipt))
}

/// POST /api/post/{id}/comment
pub async fn comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let id = parse_post_id(&path)?;
    let text = body.into_inner().text;
    let receipt = state.posts.comment(&identity.caller(), id, text).await?;
    Ok(receipt_response(&state, receipt))
}

/// GET /api/post/topic/{topic}?filter=live|expired|all&interest=highest
pub async fn list_by_topic(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<String>,
    query: web::Query<TopicListQuery>,
) -> AppResult<HttpResponse> {
    let topic: Topic = path.parse()?;
    let params = query.into_inner();

    let mut topic_query = TopicQuery::new(topic);
    if let Some(filter) = params.filter.as_deref() {
        topic_query = topic_query.with_filter(filter.parse::<TopicFilter>()?);
    }
    if let Some(interest) = params.interest.as_deref() {
        match interest.parse::<InterestOrder>()? {
            InterestOrder::Highest => topic_query = topic_query.highest_interest(),
        }
    }

    let views = state.posts.list_by_topic(topic_query).await?;
    let now = state.posts.now();
    let body: Vec<PostResponse> = views
        .into_iter()
        .map(|view| view_response(view, now))
        .collect();

    Ok(HttpResponse::Ok().json(body))
}
