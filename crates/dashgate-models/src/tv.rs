//! TV presentations: ordered playlists of report pages for wall displays.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use dashgate_core::serde::deserialize_optional_bool;

use crate::ids::{TvPresentationId, TvSlideId, UserId};

pub const DEFAULT_SLIDE_DURATION_SECS: i32 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TvPresentation {
    pub id: TvPresentationId,
    pub name: String,
    pub created_by: Option<UserId>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TvSlide {
    pub id: TvSlideId,
    pub presentation_id: TvPresentationId,
    pub workspace_id: String,
    pub report_id: String,
    pub report_name: Option<String>,
    pub page_name: Option<String>,
    pub page_display_name: Option<String>,
    /// Seconds on screen
    pub duration: i32,
    pub order_index: i32,
    pub embed_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TvPresentationWithSlides {
    #[serde(flatten)]
    pub presentation: TvPresentation,
    pub slides: Vec<TvSlide>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTvPresentationDto {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateTvPresentationDto {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

/// One slide in a replacement list; its position becomes `order_index`.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct TvSlideInput {
    #[validate(length(min = 1))]
    pub workspace_id: String,
    #[validate(length(min = 1))]
    pub report_id: String,
    pub report_name: Option<String>,
    pub page_name: Option<String>,
    pub page_display_name: Option<String>,
    #[validate(range(min = 1, max = 86400))]
    pub duration: Option<i32>,
    #[validate(url)]
    pub embed_url: Option<String>,
}

impl TvSlideInput {
    pub fn duration_or_default(&self) -> i32 {
        self.duration.unwrap_or(DEFAULT_SLIDE_DURATION_SECS)
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ReplaceSlidesDto {
    #[validate(nested)]
    pub slides: Vec<TvSlideInput>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct TvPresentationFilterParams {
    /// Only honored for callers that can manage presentations
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub include_inactive: Option<bool>,
}
