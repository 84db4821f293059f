//! HTTP front end: a single `GET /` route serving the aggregated feeds.

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::aggregate::{FeedSet, OutputFormat};
use crate::feed::HttpClient;

/// Render the feed set as HTML, or as JSON when a `json` parameter is present.
///
/// The query is read as raw pairs so a repeated `json` key still renders.
async fn root<C>(
    State(feeds): State<FeedSet<C>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response
where
    C: HttpClient + 'static,
{
    let flag = params
        .iter()
        .find(|(key, _)| key == "json")
        .map(|(_, value)| value.as_str());
    let format = OutputFormat::from_json_flag(flag);
    let aggregation = feeds.aggregation().await;

    match aggregation.render(format) {
        Ok(document) => {
            tracing::debug!(?format, feeds = aggregation.feeds().len(), "Rendered feeds");
            ([(header::CONTENT_TYPE, document.content_type())], document.body).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to render feeds");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Build the axum application router.
///
/// Separated from [`run_server`] to enable testing without TCP binding.
pub fn build_app<C>(feeds: FeedSet<C>) -> Router
where
    C: HttpClient + 'static,
{
    Router::new().route("/", get(root::<C>)).with_state(feeds)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn run_server<C>(addr: &str, feeds: FeedSet<C>) -> Result<(), std::io::Error>
where
    C: HttpClient + 'static,
{
    let app = build_app(feeds);

    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "feed aggregation server listening");

    axum::serve(listener, app).await
}
