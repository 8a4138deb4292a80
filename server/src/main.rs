use anyhow::Error;
use clap::{Parser, Subcommand};
use model::{
    config::{fields, DbConfig, ListOptions, SystemConfig},
    context::Context,
    fields::{plain_date, IsIndexed, PlainDateFieldConfig, Validation},
    http::create_server,
    list,
    schema::create_system,
    singleton,
};


/// Run the content management server.
#[derive(Clone, Debug, Parser)]
struct Options {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Serve the GraphQL API.
    Serve {
        /// The port where the app should be served.
        #[clap(short, long, env = "CMS_PORT", default_value = "3000")]
        port: u16,

        #[clap(flatten)]
        db: DbConfig,
    },
    /// Print the storage schema and the GraphQL schema.
    GenSchema {
        #[clap(flatten)]
        db: DbConfig,
    },
}

/// The application served by this binary.
fn app_config(db: DbConfig) -> SystemConfig {
    model::config(SystemConfig {
        db,
        lists: [
            (
                "Post".to_string(),
                list(ListOptions {
                    fields: fields([
                        (
                            "publishedOn",
                            plain_date(PlainDateFieldConfig {
                                validation: Validation {
                                    is_required: Some(true),
                                },
                                is_indexed: IsIndexed::Index,
                                ..Default::default()
                            }),
                        ),
                        ("archivedOn", plain_date(Default::default())),
                    ]),
                    ..Default::default()
                }),
            ),
            (
                "Settings".to_string(),
                singleton(ListOptions {
                    fields: fields([(
                        "launchDate",
                        plain_date(PlainDateFieldConfig {
                            default_value: Some("1970-01-01".into()),
                            ..Default::default()
                        }),
                    )]),
                    ..Default::default()
                }),
            ),
        ]
        .into_iter()
        .collect(),
        ..Default::default()
    })
}

async fn serve(port: u16, db: DbConfig) -> tide::Result<()> {
    let context = Context::new(&app_config(db)).await?;
    context.connect().await;
    let app = create_server(&context);
    tracing::info!(port, "serving");
    app.listen(format!("0.0.0.0:{port}")).await?;
    context.disconnect().await;
    Ok(())
}

fn gen_schema(db: DbConfig) -> Result<(), Error> {
    let system = create_system(&app_config(db))?;
    let store = model::store::Store::new(system.provider);
    let schema = system.graphql_schema(store)?;
    println!("{}", system.prisma_schema());
    println!("{}", schema.sdl());
    Ok(())
}

#[async_std::main]
async fn main() -> tide::Result<()> {
    model::init_logging();
    match Options::parse().command {
        Command::Serve { port, db } => serve(port, db).await?,
        Command::GenSchema { db } => gen_schema(db)?,
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use model::provider::DatabaseProvider;
    use serde_json::{json, Value};
    use strum::IntoEnumIterator;
    use tide::http::{Body, Method, Request, StatusCode, Url};

    #[async_std::test]
    async fn test_app() {
        let context = Context::new(&app_config(DbConfig::local(DatabaseProvider::Sqlite)))
            .await
            .unwrap();
        context.connect().await;
        let app = create_server(&context);

        let mut req = Request::new(
            Method::Post,
            Url::parse("http://localhost/api/graphql").unwrap(),
        );
        req.set_body(
            Body::from_json(&json!({
                "query": r#"mutation { createPost(data: { publishedOn: "2020-02-29" }) { publishedOn archivedOn } }"#,
            }))
            .unwrap(),
        );
        let mut res: tide::http::Response = app.respond(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::Ok);
        let body: Value = res.body_json().await.unwrap();
        assert_eq!(
            body["data"]["createPost"],
            json!({ "publishedOn": "2020-02-29", "archivedOn": null })
        );

        let req = Request::new(Method::Get, Url::parse("http://localhost/").unwrap());
        let res: tide::http::Response = app.respond(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::Ok);
        context.disconnect().await;
    }

    #[test]
    fn test_gen_schema() {
        for provider in DatabaseProvider::iter() {
            gen_schema(DbConfig::local(provider)).unwrap();
        }
    }
}
