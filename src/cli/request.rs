//! Request model for the stdin/stdout interface
//!
//! ```json
//! {"op": "insert", "uri": "content://com.example.app/notes", "values": {"title": "a"}}
//! {"op": "query", "uri": "content://com.example.app/notes", "selection": "title = ?", "selection_args": ["a"]}
//! ```

use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::{ProviderError, ProviderResult};
use crate::router::TableRouter;
use crate::selection::Selection;
use crate::store::{ContentValues, SqlValue};
use crate::uri::ResourceUri;

/// One operation against the router
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Query {
        uri: String,
        #[serde(default)]
        projection: Option<Vec<String>>,
        #[serde(default)]
        selection: Option<String>,
        #[serde(default)]
        selection_args: Vec<Value>,
        #[serde(default)]
        sort_order: Option<String>,
    },
    Insert {
        uri: String,
        #[serde(default)]
        values: Option<Value>,
    },
    Update {
        uri: String,
        values: Value,
        #[serde(default)]
        selection: Option<String>,
        #[serde(default)]
        selection_args: Vec<Value>,
    },
    Delete {
        uri: String,
        #[serde(default)]
        selection: Option<String>,
        #[serde(default)]
        selection_args: Vec<Value>,
    },
    GetType {
        uri: String,
    },
}

impl Request {
    /// Parse a request object
    pub fn from_json(value: Value) -> ProviderResult<Self> {
        serde_json::from_value(value)
            .map_err(|e| ProviderError::invalid_argument(format!("Invalid request: {}", e)))
    }

    /// Run the request, producing the `data` member of the response
    pub fn execute(self, router: &TableRouter) -> ProviderResult<Value> {
        match self {
            Request::Query {
                uri,
                projection,
                selection,
                selection_args,
                sort_order,
            } => {
                let uri = ResourceUri::parse(&uri)?;
                let selection = selection_from(selection, selection_args)?;
                let rows = router.query(
                    &uri,
                    projection.as_deref(),
                    &selection,
                    sort_order.as_deref(),
                )?;
                Ok(json!({
                    "columns": rows.columns(),
                    "count": rows.len(),
                    "rows": rows.to_records(),
                    "notification_uri": rows.notification_uri(),
                }))
            }
            Request::Insert { uri, values } => {
                let uri = ResourceUri::parse(&uri)?;
                let values = values.as_ref().map(values_from).transpose()?;
                let row_uri = router.insert(&uri, values)?;
                Ok(json!({ "uri": row_uri }))
            }
            Request::Update {
                uri,
                values,
                selection,
                selection_args,
            } => {
                let uri = ResourceUri::parse(&uri)?;
                let values = values_from(&values)?;
                let selection = selection_from(selection, selection_args)?;
                Ok(json!({ "updated": router.update(&uri, &values, &selection)? }))
            }
            Request::Delete {
                uri,
                selection,
                selection_args,
            } => {
                let uri = ResourceUri::parse(&uri)?;
                let selection = selection_from(selection, selection_args)?;
                Ok(json!({ "deleted": router.delete(&uri, &selection)? }))
            }
            Request::GetType { uri } => {
                let uri = ResourceUri::parse(&uri)?;
                Ok(json!({ "type": router.get_type(&uri)? }))
            }
        }
    }
}

fn values_from(value: &Value) -> ProviderResult<ContentValues> {
    ContentValues::from_json(value).ok_or_else(|| {
        ProviderError::invalid_argument("values must be an object of scalar column values")
    })
}

fn selection_from(clause: Option<String>, args: Vec<Value>) -> ProviderResult<Selection> {
    let args = args
        .iter()
        .map(|a| {
            SqlValue::from_json(a).ok_or_else(|| {
                ProviderError::invalid_argument(format!("Unsupported selection argument: {}", a))
            })
        })
        .collect::<ProviderResult<Vec<_>>>()?;
    Ok(Selection::from_parts(clause.as_deref(), args))
}
