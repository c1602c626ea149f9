//! HTTP routing configuration.
//!
//! Every remote operation is `POST /{match}/{action}`: `join` seats a player,
//! the five commands act for one. The player id travels in a header both ways.

use actix_web::http::StatusCode;
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::{HttpRequest, HttpResponse, ResponseError, web};
use log::debug;
use uuid::Uuid;

use crate::config::server::{PLAYER_ID_HEADER, PLAYER_MONIKER_HEADER};
use crate::error::ArenaError;
use crate::game::types::{Command, TurnState};
use crate::server::http_error::http_error_response;
use crate::server::state::AppState;

/// Configure the application's HTTP routes.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/{game}/{action}")
            .route(web::post().to(handle_action))
            .default_service(web::to(method_not_allowed)),
    );
}

fn header<'a>(req: &'a HttpRequest, name: &'static str) -> Option<&'a str> {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

async fn handle_action(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    req: HttpRequest,
) -> HttpResponse {
    let (game, action) = path.into_inner();
    debug!("[router] {} on {}", action, game);

    match dispatch(&state, &game, &action, &req).await {
        Ok((player_id, turn_state)) => match serde_json::to_string_pretty(&turn_state) {
            Ok(body) => with_player_id(
                HttpResponse::Ok().content_type("application/json").body(body),
                Some(&player_id.to_string()),
            ),
            Err(e) => ArenaError::from(e).error_response(),
        },
        Err(e) => with_player_id(e.error_response(), header(&req, PLAYER_ID_HEADER)),
    }
}

async fn dispatch(
    state: &AppState,
    game: &str,
    action: &str,
    req: &HttpRequest,
) -> Result<(Uuid, TurnState), ArenaError> {
    if action == "join" {
        let moniker = header(req, PLAYER_MONIKER_HEADER)
            .ok_or(ArenaError::MissingHeader(PLAYER_MONIKER_HEADER))?;
        return state.join(game, moniker.to_string()).await;
    }

    let command: Command = action.parse()?;
    let raw_id = header(req, PLAYER_ID_HEADER).ok_or(ArenaError::MissingHeader(PLAYER_ID_HEADER))?;
    let player_id = Uuid::parse_str(raw_id).map_err(|_| ArenaError::InvalidPlayerId(raw_id.to_string()))?;
    let turn_state = state.act(game, player_id, command).await?;
    Ok((player_id, turn_state))
}

fn with_player_id(mut response: HttpResponse, player_id: Option<&str>) -> HttpResponse {
    if let Some(value) = player_id.and_then(|id| HeaderValue::from_str(id).ok()) {
        response
            .headers_mut()
            .insert(HeaderName::from_static("x-sm-playerid"), value);
    }
    response
}

async fn method_not_allowed() -> HttpResponse {
    http_error_response(
        "METHOD_NOT_ALLOWED",
        "only POST is supported",
        StatusCode::METHOD_NOT_ALLOWED,
    )
}
