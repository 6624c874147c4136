/// Assistant endpoints
///
/// A thin chat layer over OpenAI: every exchange is persisted, and each
/// completion request carries a system prompt summarizing today's meals,
/// open tasks, and the latest check-in so the assistant can answer
/// questions like "how am I doing today?" without tool calls.
///
/// # Endpoints
///
/// - `POST /v1/assistant/chat` - Send a message, get the assistant's reply
/// - `GET /v1/assistant/messages` - Conversation history, newest first
/// - `DELETE /v1/assistant/messages` - Clear the conversation
///
/// All three are rate limited per user (see `middleware::rate_limit`).
/// When no OpenAI key is configured the chat endpoint returns 503.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::page,
};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;
use untangle_connectors::ChatMessage;
use untangle_shared::{
    auth::middleware::AuthContext,
    models::{
        meal::Meal,
        message::{Message, MessageRole},
        mindfulness::MindfulnessCheckin,
        task::Task,
    },
};
use uuid::Uuid;
use validator::Validate;

/// How many stored messages accompany each completion request
const CHAT_HISTORY_WINDOW: i64 = 20;

const SYSTEM_PROMPT: &str = "You are Untangle, a personal lifestyle assistant. \
You help one person reflect on their meals, habits, tasks, money, and \
wellbeing. Be concise and concrete, ground advice in the daily context \
you are given, and never invent data the context does not contain.";

/// Chat request
#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 4000, message = "Message must be 1-4000 characters"))]
    pub message: String,
}

/// History query
#[derive(Debug, Deserialize)]
pub struct ListMessagesQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Builds the daily context block injected into the system prompt
async fn daily_context(db: &PgPool, user_id: Uuid) -> Result<String, sqlx::Error> {
    let today = Utc::now().date_naive();

    let meals = Meal::list_for_day(db, user_id, today).await?;
    let open_tasks = Task::count_open(db, user_id).await?;
    let latest_checkin = MindfulnessCheckin::latest(db, user_id).await?;

    let mut context = format!("Today is {}.", today);

    if meals.is_empty() {
        context.push_str(" No meals logged yet today.");
    } else {
        let mean_score = meals.iter().map(|m| m.score).sum::<f64>() / meals.len() as f64;
        let names: Vec<&str> = meals.iter().map(|m| m.name.as_str()).collect();
        context.push_str(&format!(
            " Meals logged today ({}): {}. Mean meal score: {:.1}/10.",
            meals.len(),
            names.join(", "),
            mean_score,
        ));
    }

    context.push_str(&format!(" Open tasks: {}.", open_tasks));

    match latest_checkin {
        Some(checkin) => context.push_str(&format!(
            " Latest check-in: mood {}, energy {}/5, stress {}/5.",
            checkin.mood.as_str(),
            checkin.energy,
            checkin.stress,
        )),
        None => context.push_str(" No mindfulness check-ins recorded."),
    }

    Ok(context)
}

/// Sends a message to the assistant
///
/// The user message is persisted before calling OpenAI, so a failed
/// completion never loses what the user typed; the client can retry.
///
/// # Errors
///
/// - `502 Bad Gateway`: OpenAI request failed
/// - `503 Service Unavailable`: No OpenAI key configured
pub async fn chat(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<ChatRequest>,
) -> ApiResult<Json<Message>> {
    req.validate()?;

    let openai = state
        .openai
        .as_ref()
        .ok_or_else(|| ApiError::ServiceUnavailable("Assistant is not configured".to_string()))?;

    Message::append(&state.db, auth.user_id, MessageRole::User, &req.message).await?;

    let context = daily_context(&state.db, auth.user_id).await?;
    let history =
        Message::recent_window(&state.db, auth.user_id, CHAT_HISTORY_WINDOW).await?;

    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(ChatMessage::system(format!(
        "{}\n\nDaily context: {}",
        SYSTEM_PROMPT, context
    )));
    for msg in &history {
        messages.push(match msg.role {
            MessageRole::User => ChatMessage::user(msg.content.as_str()),
            MessageRole::Assistant => ChatMessage::assistant(msg.content.as_str()),
        });
    }

    let reply = openai.complete(&messages).await?;

    let stored =
        Message::append(&state.db, auth.user_id, MessageRole::Assistant, &reply).await?;

    Ok(Json(stored))
}

/// Lists conversation history, newest first
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListMessagesQuery>,
) -> ApiResult<Json<Vec<Message>>> {
    let (limit, offset) = page(query.limit, query.offset);
    let messages = Message::list(&state.db, auth.user_id, limit, offset).await?;

    Ok(Json(messages))
}

/// Clears the conversation
pub async fn clear_messages(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<serde_json::Value>> {
    let deleted = Message::clear(&state.db, auth.user_id).await?;
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}
