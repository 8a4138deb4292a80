//! HTTP server for the GraphQL API.

use super::context::Context;
use async_graphql::http::GraphiQLSource;
use async_graphql_tide::graphql;
use tide::{http::mime, Response, Server};

/// Create an app serving the API of `context`.
///
/// Unless the admin interface is disabled, an interactive GraphQL explorer is served at `/`.
pub fn create_server(context: &Context) -> Server<()> {
    let path = context.system().graphql_path.clone();
    let mut app = tide::new();
    app.at(&path).all(graphql(context.schema().clone()));

    if !context.system().ui_disabled {
        let page = GraphiQLSource::build().endpoint(&path).finish();
        app.at("/").get(move |_| {
            let page = page.clone();
            async move {
                Ok::<_, tide::Error>(
                    Response::builder(200)
                        .body(page)
                        .content_type(mime::HTML)
                        .build(),
                )
            }
        });
    }
    tracing::info!(%path, ui = !context.system().ui_disabled, "created server");
    app
}
