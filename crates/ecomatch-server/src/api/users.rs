use axum::{extract::State, Extension, Json};
use ecomatch_core::RosterUser;
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct UserItem {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub lat: f64,
    pub lon: f64,
}

impl From<&RosterUser> for UserItem {
    fn from(user: &RosterUser) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            lat: user.coordinate.latitude(),
            lon: user.coordinate.longitude(),
        }
    }
}

pub(super) async fn list_users(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<UserItem>>> {
    let data = state.roster.users().iter().map(UserItem::from).collect();
    Json(ApiResponse::new(data, req_id.0))
}
