//! Harness for tests which run against a complete application.
//!
//! [`setup_test_env`] compiles a configuration, writes its schema artifacts, and stands up a
//! fresh store and HTTP app. [`TestRunner`] wraps that in a connect/run/disconnect cycle, so
//! every test runs against an empty database:
//!
//! ```ignore
//! setup_test_runner(config)
//!     .run(|args| async move {
//!         let res = args.graphql_request.send("{ postsCount }", None, None).await?;
//!         assert_eq!(res.data()["postsCount"], 0);
//!         Ok(())
//!     })
//!     .await
//!     .unwrap();
//! ```

use super::{config::SystemConfig, context::Context, http::create_server, schema::System};
use anyhow::Error;
use async_graphql::dynamic::Schema;
use async_std::{fs, sync::Mutex};
use futures::Future;
use serde_json::{Map, Value};
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::Arc,
};
use tide::{
    http::{self, Body, Method, StatusCode, Url},
    Server,
};

/// Generated schema files, keyed by a hash of the storage schema.
///
/// Configurations with the same storage schema share a directory, and each directory is written
/// at most once per cache.
#[derive(Debug)]
pub struct ArtifactCache {
    root: PathBuf,
    generated: Mutex<HashSet<String>>,
}

impl Default for ArtifactCache {
    fn default() -> Self {
        Self::new(std::env::temp_dir().join("cms-tests"))
    }
}

impl ArtifactCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            generated: Default::default(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write the artifacts of `system`, if they have not been written already.
    ///
    /// Returns the directory holding `schema.prisma` and `schema.graphql`.
    pub async fn write(&self, system: &System, schema: &Schema) -> Result<PathBuf, Error> {
        let prisma = system.prisma_schema();
        let hash = format!("{:x}", md5::compute(&prisma));
        let path = self.root.join(&hash);

        let mut generated = self.generated.lock().await;
        if generated.insert(hash) {
            fs::create_dir_all(&path).await?;
            fs::write(path.join("schema.prisma"), prisma).await?;
            fs::write(path.join("schema.graphql"), schema.sdl()).await?;
            tracing::info!(path = %path.display(), "wrote schema artifacts");
        }
        Ok(path)
    }
}

/// The response to a [`GraphQLRequest`].
#[derive(Clone, Debug)]
pub struct GraphQLResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl GraphQLResponse {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// The messages of any GraphQL errors in the response.
    pub fn errors(&self) -> Vec<String> {
        self.body["errors"]
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|err| err["message"].as_str().map(String::from))
            .collect()
    }
}

/// Sends GraphQL requests to an app over in-process HTTP.
#[derive(Clone)]
pub struct GraphQLRequest {
    app: Server<()>,
    path: String,
}

impl GraphQLRequest {
    /// Send `query`, running `operation_name` if the document defines more than one operation.
    pub async fn send(
        &self,
        query: &str,
        variables: Option<Value>,
        operation_name: Option<&str>,
    ) -> Result<GraphQLResponse, Error> {
        let mut body = Map::new();
        body.insert("query".into(), query.into());
        if let Some(variables) = variables {
            body.insert("variables".into(), variables);
        }
        if let Some(operation_name) = operation_name {
            body.insert("operationName".into(), operation_name.into());
        }

        let url = Url::parse("http://localhost/")?.join(&self.path)?;
        let mut req = http::Request::new(Method::Post, url);
        req.insert_header("accept", "application/json");
        req.set_body(Body::from_json(&body).map_err(http::Error::into_inner)?);

        let mut res: http::Response = self
            .app
            .respond(req)
            .await
            .map_err(http::Error::into_inner)?;
        let body = res.body_json().await.map_err(http::Error::into_inner)?;
        Ok(GraphQLResponse {
            status: res.status(),
            body,
        })
    }
}

/// Everything a test gets access to.
#[derive(Clone)]
pub struct TestArgs {
    pub context: Context,
    pub graphql_request: GraphQLRequest,
    pub app: Server<()>,
}

pub struct TestEnv {
    args: TestArgs,
    artifacts: PathBuf,
}

impl TestEnv {
    pub async fn connect(&self) {
        self.args.context.connect().await;
    }

    pub async fn disconnect(&self) {
        self.args.context.disconnect().await;
    }

    pub fn args(&self) -> &TestArgs {
        &self.args
    }

    /// The directory holding the schema artifacts of this environment.
    pub fn artifacts(&self) -> &Path {
        &self.artifacts
    }
}

/// Stand up an application for `config`, with an empty store and the admin interface disabled.
pub async fn setup_test_env(
    mut config: SystemConfig,
    artifacts: &ArtifactCache,
) -> Result<TestEnv, Error> {
    config.ui.is_disabled = true;
    let context = Context::new(&config).await?;
    let artifacts = artifacts.write(context.system(), context.schema()).await?;

    let app = create_server(&context);
    let graphql_request = GraphQLRequest {
        app: app.clone(),
        path: context.system().graphql_path.clone(),
    };
    tracing::info!(
        provider = %context.system().provider,
        artifacts = %artifacts.display(),
        "set up test environment"
    );
    Ok(TestEnv {
        args: TestArgs {
            context,
            graphql_request,
            app,
        },
        artifacts,
    })
}

/// Runs tests, each against a fresh application for one configuration.
pub struct TestRunner {
    config: SystemConfig,
    artifacts: Arc<ArtifactCache>,
}

pub fn setup_test_runner(config: SystemConfig) -> TestRunner {
    TestRunner {
        config,
        artifacts: Default::default(),
    }
}

impl TestRunner {
    /// Share an artifact cache with other runners.
    pub fn with_artifacts(mut self, artifacts: Arc<ArtifactCache>) -> Self {
        self.artifacts = artifacts;
        self
    }

    /// Run `test` against a new, connected application, disconnecting it afterwards whether
    /// or not the test succeeds.
    pub async fn run<F, Fut>(&self, test: F) -> Result<(), Error>
    where
        F: FnOnce(TestArgs) -> Fut,
        Fut: Future<Output = Result<(), Error>>,
    {
        let env = setup_test_env(self.config.clone(), &self.artifacts).await?;
        env.connect().await;
        let res = test(env.args().clone()).await;
        env.disconnect().await;
        res
    }
}
