//! OpenAPI document for the registry, served at `/api-docs/openapi.json`, and
//! a Swagger UI page at `/api-docs` that renders it.

use axum::{Json, response::Html};
use utoipa::OpenApi;

use crate::{areas, auth, stats, trees};

pub const SPEC_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "BioUrb API",
        description = "Registry of urban trees and green areas."
    ),
    paths(
        auth::register,
        auth::login,
        stats::get_stats,
        trees::list_trees,
        trees::create_tree,
        trees::update_tree,
        trees::delete_tree,
        areas::list_areas,
        areas::create_area,
        areas::update_area,
        areas::delete_area,
        crate::health,
    ),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "trees", description = "Tree registry"),
        (name = "areas", description = "Green area registry"),
        (name = "stats", description = "Registry totals"),
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

// Assets come from the unpkg CDN; only the page shell is served here.
const SWAGGER_UI: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>BioUrb API</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js" crossorigin></script>
  <script>
    window.onload = () => {
      window.ui = SwaggerUIBundle({ url: "/api-docs/openapi.json", dom_id: "#swagger-ui" });
    };
  </script>
</body>
</html>
"##;

pub async fn swagger_ui() -> Html<&'static str> {
    Html(SWAGGER_UI)
}
