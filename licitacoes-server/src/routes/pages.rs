//! Dashboard, creation and detail pages

use axum::{
    Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;

use licitacoes_core::save::{SaveError, SaveKind, save};
use licitacoes_core::{Agenda, Attachment, EventoDraft, LicitacaoResult};

use crate::form::read_submission;
use crate::routes::AppError;
use crate::state::AppState;
use crate::views::{FormView, render_dashboard};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/nova", get(nova).post(criar))
        .route("/detalhes/{id}", get(detalhes).post(atualizar))
}

/// `?salvo=` set by the redirect after a successful save.
#[derive(Debug, Default, Deserialize)]
struct Aviso {
    salvo: Option<String>,
}

impl Aviso {
    fn message(&self) -> Option<String> {
        match self.salvo.as_deref()? {
            "nova" => Some("Licitação cadastrada com sucesso!".to_string()),
            _ => Some("Licitação salva com sucesso!".to_string()),
        }
    }
}

/// GET / - Redirect to the configured landing record
async fn root(State(state): State<AppState>) -> Redirect {
    Redirect::to(&format!("/detalhes/{}", state.config.landing_id))
}

/// Fetch a fresh snapshot. A failed fetch renders an empty agenda with the error.
async fn load_agenda(state: &AppState) -> (Agenda, Option<String>) {
    match Agenda::fetch(state.service.as_ref(), &state.config.collection, state.today()).await {
        Ok(agenda) => (agenda, None),
        Err(e) => {
            tracing::error!(error = %e, "failed to fetch events");
            (Agenda::default(), Some(format!("Erro ao buscar eventos: {e}")))
        }
    }
}

/// GET /nova - Dashboard with an empty creation form
async fn nova(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let (agenda, message) = load_agenda(&state).await;
    let html = render_dashboard(&state.templates, &agenda, Some(FormView::nova()), message)?;
    Ok(Html(html))
}

/// GET /detalhes/:id - Dashboard with the record's edit form, when it exists
async fn detalhes(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(aviso): Query<Aviso>,
) -> Result<Html<String>, AppError> {
    let (agenda, error) = load_agenda(&state).await;
    let form = agenda.find(&id).map(FormView::editar);
    if form.is_none() {
        tracing::debug!(id = %id, "no record for detail page");
    }

    let message = error.or_else(|| aviso.message());
    let html = render_dashboard(&state.templates, &agenda, form, message)?;
    Ok(Html(html))
}

/// POST /nova - Create a record
async fn criar(State(state): State<AppState>, multipart: Multipart) -> Result<Response, AppError> {
    let (mut draft, attachment) = read_submission(multipart)
        .await
        .map_err(AppError::bad_request)?;
    draft.id = None;
    draft.arquivo_url = None;

    submit(&state, draft, attachment).await
}

/// POST /detalhes/:id - Update the record with this id
async fn atualizar(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let (mut draft, attachment) = read_submission(multipart)
        .await
        .map_err(AppError::bad_request)?;

    // Without a new file the record keeps the attachment it already has.
    draft.arquivo_url = match stored_arquivo_url(&state, &id).await {
        Ok(url) => url,
        Err(e) => {
            tracing::error!(error = %e, id = %id, "could not load record before update");
            draft.id = Some(id);
            let form = FormView::new(draft).with_message(format!("Erro ao buscar eventos: {e}"));
            return rerender(&state, StatusCode::BAD_GATEWAY, form).await;
        }
    };
    draft.id = Some(id);

    submit(&state, draft, attachment).await
}

async fn stored_arquivo_url(state: &AppState, id: &str) -> LicitacaoResult<Option<String>> {
    let agenda =
        Agenda::fetch(state.service.as_ref(), &state.config.collection, state.today()).await?;
    Ok(agenda.find(id).and_then(|e| e.payload.arquivo_url.clone()))
}

/// Save, then either show the saved record or re-render the form with the
/// user's input and the error.
async fn submit(
    state: &AppState,
    draft: EventoDraft,
    attachment: Option<Attachment>,
) -> Result<Response, AppError> {
    let target = state.config.save_target();

    let err = match save(state.service.as_ref(), &target, &draft, attachment.as_ref()).await {
        Ok(outcome) => {
            let salvo = match outcome.kind {
                SaveKind::Created => "nova",
                SaveKind::Updated => "editada",
            };
            let location = format!("/detalhes/{}?salvo={salvo}", outcome.id);
            return Ok(Redirect::to(&location).into_response());
        }
        Err(err) => err,
    };

    let (status, form) = match &err {
        SaveError::Validation(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            FormView::new(draft).with_errors(errors),
        ),
        SaveError::Upload(_) | SaveError::Persist { .. } => {
            tracing::error!(error = %err, "save failed");
            (StatusCode::BAD_GATEWAY, FormView::new(draft).with_message(err.to_string()))
        }
    };

    rerender(state, status, form).await
}

async fn rerender(state: &AppState, status: StatusCode, form: FormView) -> Result<Response, AppError> {
    let (agenda, message) = load_agenda(state).await;
    let html = render_dashboard(&state.templates, &agenda, Some(form), message)?;
    Ok((status, Html(html)).into_response())
}
