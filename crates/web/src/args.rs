//! The single decoded argument handed to a route handler.

use std::collections::HashMap;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// A decoded argument: a JSON value (query string or JSON body), or the named fields of a
/// multipart body.
#[derive(Debug, Clone, PartialEq)]
pub enum Args {
    Json(Value),
    Form(HashMap<String, Bytes>),
}

impl Args {
    /// Returns the raw bytes of a multipart field.
    pub fn field(&self, name: &str) -> Option<&Bytes> {
        match self {
            Args::Form(fields) => fields.get(name),
            Args::Json(_) => None,
        }
    }

    /// Views the argument as JSON; multipart fields become UTF-8 string members.
    pub fn into_json(self) -> Result<Value, ApiError> {
        match self {
            Args::Json(value) => Ok(value),
            Args::Form(fields) => {
                let mut object = Map::with_capacity(fields.len());
                for (name, content) in fields {
                    let text = String::from_utf8(content.to_vec())
                        .map_err(|e| ApiError::invalid_argument(format!("field `{name}` is not utf-8: {e}")))?;
                    object.insert(name, Value::String(text));
                }
                Ok(Value::Object(object))
            }
        }
    }

    pub fn parse<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        serde_json::from_value(self.into_json()?).map_err(ApiError::invalid_argument)
    }
}

/// Parses a required argument into `T`.
pub fn require<T: DeserializeOwned>(args: Option<Args>) -> Result<T, ApiError> {
    args.ok_or(ApiError::MissingArgument)?.parse()
}
