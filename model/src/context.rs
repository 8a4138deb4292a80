//! A running application: the compiled system, its store and its GraphQL schema.

use super::{
    config::SystemConfig,
    schema::{create_system, System},
    store::Store,
};
use anyhow::{bail, Error};
use async_graphql::{dynamic::Schema, Request, Response, Variables};
use std::sync::Arc;

#[derive(Clone)]
pub struct Context {
    system: Arc<System>,
    store: Store,
    schema: Schema,
}

impl Context {
    /// Compile `config` and create the tables of a new, disconnected store.
    pub async fn new(config: &SystemConfig) -> Result<Self, Error> {
        let system = create_system(config)?;
        let store = Store::new(system.provider);
        for table in system.table_schemas() {
            store.create_table(table).await?;
        }
        let schema = system.graphql_schema(store.clone())?;
        tracing::info!(provider = %system.provider, "created context");
        Ok(Self {
            system: Arc::new(system),
            store,
            schema,
        })
    }

    pub fn system(&self) -> &System {
        &self.system
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub async fn connect(&self) {
        self.store.open().await;
    }

    pub async fn disconnect(&self) {
        self.store.close().await;
    }

    /// Execute a GraphQL request, returning the response as is.
    pub async fn graphql_raw(&self, request: Request) -> Response {
        self.schema.execute(request).await
    }

    /// Execute a GraphQL request, failing if the response has any errors.
    pub async fn graphql_run(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<serde_json::Value, Error> {
        let res = self
            .graphql_raw(Request::new(query).variables(Variables::from_json(variables)))
            .await;
        if !res.errors.is_empty() {
            let messages = res
                .errors
                .into_iter()
                .map(|err| err.message)
                .collect::<Vec<_>>();
            bail!("GraphQL request failed: {}", messages.join("; "));
        }
        Ok(res.data.into_json()?)
    }
}
