use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::error::{MdropError, Result};
use crate::media::MediaKind;
use crate::service::{DownloadRequest, DownloadResponse, MediaService};

/// Raw query string. Every field is optional so that missing or malformed
/// values come back as JSON errors instead of axum's plain-text rejection.
#[derive(Debug, Default, Deserialize)]
pub struct DownloadParams {
    pub url: Option<String>,
    pub name_prefix: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// `GET /download?url=&name_prefix=&type=`
pub async fn download(
    State(service): State<MediaService>,
    query: std::result::Result<Query<DownloadParams>, QueryRejection>,
) -> Result<Json<DownloadResponse>> {
    let req = to_request(query, None)?;
    Ok(Json(service.download(req).await?))
}

/// `GET /download/video?url=&name_prefix=`
pub async fn download_video(
    State(service): State<MediaService>,
    query: std::result::Result<Query<DownloadParams>, QueryRejection>,
) -> Result<Json<DownloadResponse>> {
    let req = to_request(query, Some(MediaKind::Video))?;
    Ok(Json(service.download(req).await?))
}

/// `GET /download/image?url=&name_prefix=`
pub async fn download_image(
    State(service): State<MediaService>,
    query: std::result::Result<Query<DownloadParams>, QueryRejection>,
) -> Result<Json<DownloadResponse>> {
    let req = to_request(query, Some(MediaKind::Image))?;
    Ok(Json(service.download(req).await?))
}

fn to_request(
    query: std::result::Result<Query<DownloadParams>, QueryRejection>,
    fixed_kind: Option<MediaKind>,
) -> Result<DownloadRequest> {
    let Query(params) =
        query.map_err(|e| MdropError::bad_request(format!("Invalid query string: {}", e)))?;

    let url = params
        .url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| MdropError::bad_request("Missing required query parameter: url"))?;

    let kind = match fixed_kind {
        Some(k) => k,
        None => params
            .kind
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| MdropError::bad_request("Missing required query parameter: type"))?
            .parse::<MediaKind>()
            .map_err(MdropError::bad_request)?,
    };

    Ok(DownloadRequest {
        url,
        name_prefix: params.name_prefix,
        kind,
    })
}
