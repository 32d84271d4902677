use askama::Template;
use axum::{
    Extension,
    extract::{Path, RawQuery, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde_json::Value;

use crate::{
    AppState,
    context::RequestContext,
    endpoints,
    error::AppError,
    models::{CommentsPage, DataEnvelope, Discussion},
    pages::{AuthPage, AuthView, DashboardPage, DiscussionPage, LandingPage},
    preload::{DehydratedQuery, DehydratedState, HydrationPayload, InfiniteData, preload},
    queries,
    session::{Session, resolve_session},
};

// --- Query Structs ---

/// AuthPageQuery
///
/// Query parameters accepted by the guest-only auth pages. Read from the raw
/// query string so a bad value never rejects the request; it only loses its
/// say in the redirect decision.
#[derive(Debug, Default, PartialEq)]
pub struct AuthPageQuery {
    /// Where to send the visitor once authenticated, still percent-encoded.
    /// The first occurrence wins when the parameter is repeated.
    pub redirect_to: Option<String>,
}

impl AuthPageQuery {
    pub const REDIRECT_TO_PARAM: &'static str = "redirectTo";

    pub fn from_raw(query: Option<&str>) -> Self {
        let redirect_to = query
            .unwrap_or_default()
            .split('&')
            .find_map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (key == Self::REDIRECT_TO_PARAM).then(|| value.to_string())
            });
        Self { redirect_to }
    }

    /// The target decoded once, for links that re-encode it.
    fn decoded_redirect_to(&self) -> Option<String> {
        let raw = self.redirect_to.as_deref()?;
        urlencoding::decode(raw).ok().map(|decoded| decoded.into_owned())
    }
}

// --- Helpers ---

/// Caches the resolved user the same way the client's user query would, so the
/// client does not repeat the identity lookup. Unresolved sessions add nothing.
fn dehydrate_session(state: &mut DehydratedState, session: &Session) {
    let data = match session {
        Session::Unknown => return,
        Session::Absent => Value::Null,
        Session::Present(user) => match serde_json::to_value(user) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, "could not serialize session user");
                return;
            }
        },
    };
    state.insert(DehydratedQuery::success(
        queries::user_query_key(),
        data,
        Utc::now().timestamp_millis(),
    ));
}

fn hydration_script(app: &AppState, dehydrated: DehydratedState) -> Result<String, AppError> {
    let payload = HydrationPayload::new(dehydrated, app.config.query_stale_time);
    Ok(payload.to_script_json()?)
}

// --- Handlers ---

/// landing
///
/// [Public Route] The home page. Only needs the session to pick its call to action.
pub async fn landing(
    State(app): State<AppState>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let mut dehydrated = DehydratedState::default();
    dehydrate_session(&mut dehydrated, &session);

    let page = LandingPage::new(session.user(), hydration_script(&app, dehydrated)?);
    Ok(Html(page.render()?))
}

/// public_discussion
///
/// [Public Route] Renders one discussion with the first page of its comments.
///
/// The discussion detail and first comment page are read concurrently as one
/// preload batch, alongside the session lookup. If either preload read fails
/// the page fails as a whole; there is no partially hydrated render.
pub async fn public_discussion(
    State(app): State<AppState>,
    ctx: RequestContext,
    Path(discussion_id): Path<String>,
) -> Result<Html<String>, AppError> {
    if !endpoints::is_valid_id(&discussion_id) {
        return Err(AppError::NotFound);
    }

    let batch = queries::discussion_page_batch(&discussion_id);
    let backend = app.backend.as_ref();

    let (session, preloaded) = tokio::join!(
        resolve_session(backend, &ctx),
        preload(backend, &batch, &ctx, app.config.upstream_timeout),
    );
    let mut dehydrated = preloaded?;

    let discussion = dehydrated
        .data_as::<DataEnvelope<Discussion>>(&queries::discussion_query_key(&discussion_id))
        .ok_or(AppError::NotFound)??
        .data;
    let first_page = dehydrated
        .data_as::<InfiniteData<CommentsPage>>(&queries::comments_query_key(&discussion_id))
        .ok_or(AppError::NotFound)??
        .pages
        .into_iter()
        .next()
        .unwrap_or_default();

    tracing::info!(
        discussion_id = %discussion_id,
        comments = first_page.data.len(),
        "discussion page preloaded"
    );

    dehydrate_session(&mut dehydrated, &session);

    let page = DiscussionPage::new(
        &discussion,
        &first_page.data,
        first_page.meta.next_cursor.is_some(),
        session.user(),
        hydration_script(&app, dehydrated)?,
    );
    Ok(Html(page.render()?))
}

/// login
///
/// [Guest Route] Login form. Authenticated visitors are sent on instead.
pub async fn login(
    State(app): State<AppState>,
    session: Session,
    RawQuery(query): RawQuery,
) -> Result<Response, AppError> {
    let query = AuthPageQuery::from_raw(query.as_deref());
    auth_page(AuthView::Login, &app, session, query)
}

/// register
///
/// [Guest Route] Registration form. Authenticated visitors are sent on instead.
pub async fn register(
    State(app): State<AppState>,
    session: Session,
    RawQuery(query): RawQuery,
) -> Result<Response, AppError> {
    let query = AuthPageQuery::from_raw(query.as_deref());
    auth_page(AuthView::Register, &app, session, query)
}

/// The session has already been resolved by the extractor; this is the one
/// redirect decision made for it.
fn auth_page(
    view: AuthView,
    app: &AppState,
    session: Session,
    query: AuthPageQuery,
) -> Result<Response, AppError> {
    if let Some(target) = app
        .redirects
        .decide_redirect(&session, query.redirect_to.as_deref())
    {
        tracing::info!(target = %target, "authenticated visitor on guest page, redirecting");
        return Ok(Redirect::to(target.as_str()).into_response());
    }

    let mut dehydrated = DehydratedState::default();
    dehydrate_session(&mut dehydrated, &session);

    let redirect_to = query.decoded_redirect_to();
    let page = AuthPage::new(
        view,
        redirect_to.as_deref(),
        hydration_script(app, dehydrated)?,
    );
    Ok(Html(page.render()?).into_response())
}

/// dashboard
///
/// [Authenticated Route] Landing page for signed-in users. The guard layer has
/// already resolved the session and placed it in the request extensions.
pub async fn dashboard(
    State(app): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Response, AppError> {
    let Some(user) = session.user() else {
        return Err(AppError::NotFound);
    };

    let mut dehydrated = DehydratedState::default();
    dehydrate_session(&mut dehydrated, &session);

    let page = DashboardPage::new(user, hydration_script(&app, dehydrated)?);
    Ok(Html(page.render()?).into_response())
}

/// not_found
///
/// Fallback for every unmatched path.
pub async fn not_found() -> AppError {
    AppError::NotFound
}
