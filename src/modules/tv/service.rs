use sqlx::PgPool;
use tracing::{info, instrument};

use dashgate_core::AppError;
use dashgate_models::{
    CreateTvPresentationDto, ReplaceSlidesDto, TvPresentation, TvPresentationId,
    TvPresentationWithSlides, TvSlide, UpdateTvPresentationDto, UserId,
};

const PRESENTATION_COLUMNS: &str = "id, name, created_by, is_active, created_at, updated_at";

const SLIDE_COLUMNS: &str = "id, presentation_id, workspace_id, report_id, report_name, \
                             page_name, page_display_name, duration, order_index, embed_url, \
                             created_at";

fn not_found() -> AppError {
    AppError::not_found(anyhow::anyhow!("TV presentation not found"))
}

pub struct TvService;

impl TvService {
    #[instrument(skip(db))]
    pub async fn list(db: &PgPool, include_inactive: bool) -> Result<Vec<TvPresentation>, AppError> {
        let presentations = sqlx::query_as::<_, TvPresentation>(&format!(
            "SELECT {} FROM tv_presentations
             WHERE is_active OR $1
             ORDER BY name, created_at",
            PRESENTATION_COLUMNS
        ))
        .bind(include_inactive)
        .fetch_all(db)
        .await?;
        Ok(presentations)
    }

    async fn find(db: &PgPool, id: TvPresentationId) -> Result<TvPresentation, AppError> {
        sqlx::query_as::<_, TvPresentation>(&format!(
            "SELECT {} FROM tv_presentations WHERE id = $1",
            PRESENTATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(not_found)
    }

    async fn slides(db: &PgPool, id: TvPresentationId) -> Result<Vec<TvSlide>, AppError> {
        let slides = sqlx::query_as::<_, TvSlide>(&format!(
            "SELECT {} FROM tv_presentation_slides
             WHERE presentation_id = $1
             ORDER BY order_index",
            SLIDE_COLUMNS
        ))
        .bind(id)
        .fetch_all(db)
        .await?;
        Ok(slides)
    }

    /// A presentation with its slides in playback order.
    ///
    /// Inactive presentations are reported as missing unless `include_inactive`.
    #[instrument(skip(db))]
    pub async fn get(
        db: &PgPool,
        id: TvPresentationId,
        include_inactive: bool,
    ) -> Result<TvPresentationWithSlides, AppError> {
        let presentation = Self::find(db, id).await?;
        if !presentation.is_active && !include_inactive {
            return Err(not_found());
        }

        let slides = Self::slides(db, id).await?;
        Ok(TvPresentationWithSlides {
            presentation,
            slides,
        })
    }

    #[instrument(skip(db, dto), fields(name = %dto.name))]
    pub async fn create(
        db: &PgPool,
        created_by: UserId,
        dto: CreateTvPresentationDto,
    ) -> Result<TvPresentation, AppError> {
        let presentation = sqlx::query_as::<_, TvPresentation>(&format!(
            "INSERT INTO tv_presentations (name, created_by, is_active)
             VALUES ($1, $2, $3)
             RETURNING {}",
            PRESENTATION_COLUMNS
        ))
        .bind(dto.name.trim())
        .bind(created_by)
        .bind(dto.is_active.unwrap_or(true))
        .fetch_one(db)
        .await?;

        info!(presentation.id = %presentation.id, "TV presentation created");
        Ok(presentation)
    }

    #[instrument(skip(db, dto))]
    pub async fn update(
        db: &PgPool,
        id: TvPresentationId,
        dto: UpdateTvPresentationDto,
    ) -> Result<TvPresentation, AppError> {
        let presentation = sqlx::query_as::<_, TvPresentation>(&format!(
            "UPDATE tv_presentations SET
                name = COALESCE($2, name),
                is_active = COALESCE($3, is_active),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            PRESENTATION_COLUMNS
        ))
        .bind(id)
        .bind(dto.name.as_deref().map(str::trim))
        .bind(dto.is_active)
        .fetch_optional(db)
        .await?
        .ok_or_else(not_found)?;

        Ok(presentation)
    }

    /// Slides go with it (`ON DELETE CASCADE`).
    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, id: TvPresentationId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM tv_presentations WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found());
        }

        info!(presentation.id = %id, "TV presentation deleted");
        Ok(())
    }

    /// Swaps the whole slide list in one transaction. The position of each
    /// slide in `dto.slides` becomes its `order_index`.
    #[instrument(skip(db, dto), fields(slides = dto.slides.len()))]
    pub async fn replace_slides(
        db: &PgPool,
        id: TvPresentationId,
        dto: ReplaceSlidesDto,
    ) -> Result<TvPresentationWithSlides, AppError> {
        let mut tx = db.begin().await?;

        // Locks the presentation so concurrent replacements serialize.
        sqlx::query_scalar::<_, TvPresentationId>(
            "SELECT id FROM tv_presentations WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(not_found)?;

        sqlx::query("DELETE FROM tv_presentation_slides WHERE presentation_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let mut slides = Vec::with_capacity(dto.slides.len());
        for (index, slide) in dto.slides.iter().enumerate() {
            let order_index = i32::try_from(index)
                .map_err(|_| AppError::bad_request(anyhow::anyhow!("Too many slides")))?;

            let row = sqlx::query_as::<_, TvSlide>(&format!(
                "INSERT INTO tv_presentation_slides
                    (presentation_id, workspace_id, report_id, report_name, page_name,
                     page_display_name, duration, order_index, embed_url)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                 RETURNING {}",
                SLIDE_COLUMNS
            ))
            .bind(id)
            .bind(&slide.workspace_id)
            .bind(&slide.report_id)
            .bind(&slide.report_name)
            .bind(&slide.page_name)
            .bind(&slide.page_display_name)
            .bind(slide.duration_or_default())
            .bind(order_index)
            .bind(&slide.embed_url)
            .fetch_one(&mut *tx)
            .await?;
            slides.push(row);
        }

        let presentation = sqlx::query_as::<_, TvPresentation>(&format!(
            "UPDATE tv_presentations SET updated_at = NOW() WHERE id = $1 RETURNING {}",
            PRESENTATION_COLUMNS
        ))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(presentation.id = %id, slides = slides.len(), "TV slides replaced");
        Ok(TvPresentationWithSlides {
            presentation,
            slides,
        })
    }
}
