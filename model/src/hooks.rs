//! Hooks run by the schema compiler around item mutations.

use super::{store::Row, value::Value};
use anyhow::Error;
use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::Arc;
use strum::Display;

/// The kind of mutation being validated.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
}

/// Arguments passed to a [`ValidateInputHook`].
pub struct ValidateInputArgs<'a> {
    /// The list being mutated.
    pub list_key: &'a str,
    /// The field whose hook is running.
    pub field_key: &'a str,
    pub operation: Operation,
    /// Field values after input resolution, keyed by field key.
    ///
    /// On update, only the fields supplied by the caller are present.
    pub resolved_data: &'a IndexMap<String, Value>,
    /// The existing item, for updates.
    pub item: Option<&'a Row>,
    errors: &'a mut Vec<String>,
}

impl<'a> ValidateInputArgs<'a> {
    pub fn new(
        list_key: &'a str,
        field_key: &'a str,
        operation: Operation,
        resolved_data: &'a IndexMap<String, Value>,
        item: Option<&'a Row>,
        errors: &'a mut Vec<String>,
    ) -> Self {
        Self {
            list_key,
            field_key,
            operation,
            resolved_data,
            item,
            errors,
        }
    }

    /// Report a problem with the input to the caller.
    ///
    /// Validation continues after an error is added, so that every problem with the input is
    /// reported at once.
    pub fn add_validation_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }
}

/// A hook which validates input before it is persisted.
#[async_trait]
pub trait ValidateInputHook: Send + Sync {
    async fn validate_input(&self, args: &mut ValidateInputArgs<'_>) -> Result<(), Error>;
}

#[async_trait]
impl<F> ValidateInputHook for F
where
    F: Send + Sync + for<'a, 'b> Fn(&'a mut ValidateInputArgs<'b>) -> Result<(), Error>,
{
    async fn validate_input(&self, args: &mut ValidateInputArgs<'_>) -> Result<(), Error> {
        self(args)
    }
}

/// Hooks attached to a single field.
#[derive(Clone, Default)]
pub struct FieldHooks {
    pub validate_input: Option<Arc<dyn ValidateInputHook>>,
}

impl FieldHooks {
    /// Hooks which run `hook` to validate input.
    pub fn validate_input(hook: impl ValidateInputHook + 'static) -> Self {
        Self {
            validate_input: Some(Arc::new(hook)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[async_std::test]
    async fn test_closure_hook() {
        let hook = |args: &mut ValidateInputArgs| -> Result<(), Error> {
            if args.resolved_data.get("title") == Some(&Value::Null) {
                args.add_validation_error("title must be set");
            }
            Ok(())
        };

        let mut errors = vec![];
        let data = [("title".to_string(), Value::Null)].into_iter().collect();
        let mut args = ValidateInputArgs::new(
            "Post",
            "title",
            Operation::Create,
            &data,
            None,
            &mut errors,
        );
        hook.validate_input(&mut args).await.unwrap();
        args.add_validation_error("another");
        assert_eq!(errors, ["title must be set", "another"]);
    }
}
