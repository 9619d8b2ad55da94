//! Side effects requested by controllers and their results
//!
//! Controllers never touch the network. They return [`Request`] values, the
//! host runs them on tokio tasks and feeds the matching [`Response`] back.

use crate::api::{ApiClient, ApiError};
use serde_json::{Map, Value};

/// Whether a save creates a record or replaces an existing one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveMode {
    Create,
    Update { id: String },
}

/// A network call a controller wants made
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    FetchList {
        resource: String,
        seq: u64,
        path: String,
    },
    FetchLookup {
        resource: String,
        lookup: String,
        seq: u64,
        path: String,
    },
    Save {
        resource: String,
        /// Form session that issued the save
        session: u64,
        mode: SaveMode,
        path: String,
        payload: Map<String, Value>,
    },
    Delete {
        resource: String,
        id: String,
        path: String,
    },
}

/// Outcome of a [`Request`], routed back to the controller of `resource`
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    ListFetched {
        resource: String,
        seq: u64,
        result: Result<Value, ApiError>,
    },
    LookupFetched {
        resource: String,
        lookup: String,
        seq: u64,
        result: Result<Value, ApiError>,
    },
    Saved {
        resource: String,
        session: u64,
        mode: SaveMode,
        result: Result<Value, ApiError>,
    },
    Deleted {
        resource: String,
        id: String,
        result: Result<Value, ApiError>,
    },
}

impl Request {
    pub fn resource(&self) -> &str {
        match self {
            Request::FetchList { resource, .. }
            | Request::FetchLookup { resource, .. }
            | Request::Save { resource, .. }
            | Request::Delete { resource, .. } => resource,
        }
    }

    /// Short description for logs
    pub fn describe(&self) -> String {
        match self {
            Request::FetchList { path, seq, .. } => format!("GET {} (#{})", path, seq),
            Request::FetchLookup {
                lookup, path, seq, ..
            } => format!("GET {} for {} (#{})", path, lookup, seq),
            Request::Save {
                mode: SaveMode::Create,
                path,
                ..
            } => format!("POST {}", path),
            Request::Save { path, .. } => format!("PATCH {}", path),
            Request::Delete { path, .. } => format!("DELETE {}", path),
        }
    }

    /// Perform the call and wrap the result for the controller
    pub async fn execute(self, client: &ApiClient) -> Response {
        match self {
            Request::FetchList {
                resource,
                seq,
                path,
            } => Response::ListFetched {
                result: client.get(&path).await,
                resource,
                seq,
            },
            Request::FetchLookup {
                resource,
                lookup,
                seq,
                path,
            } => Response::LookupFetched {
                result: client.get(&path).await,
                resource,
                lookup,
                seq,
            },
            Request::Save {
                resource,
                session,
                mode,
                path,
                payload,
            } => {
                let body = Value::Object(payload);
                let result = match mode {
                    SaveMode::Create => client.post(&path, &body).await,
                    SaveMode::Update { .. } => client.patch(&path, &body).await,
                };
                Response::Saved {
                    resource,
                    session,
                    mode,
                    result,
                }
            }
            Request::Delete { resource, id, path } => Response::Deleted {
                result: client.delete(&path).await,
                resource,
                id,
            },
        }
    }
}

impl Response {
    pub fn resource(&self) -> &str {
        match self {
            Response::ListFetched { resource, .. }
            | Response::LookupFetched { resource, .. }
            | Response::Saved { resource, .. }
            | Response::Deleted { resource, .. } => resource,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        let save = Request::Save {
            resource: "actor".into(),
            session: 1,
            mode: SaveMode::Update { id: "4".into() },
            path: "/actor/4".into(),
            payload: Map::new(),
        };
        assert_eq!(save.describe(), "PATCH /actor/4");
        assert_eq!(save.resource(), "actor");

        let list = Request::FetchList {
            resource: "genre".into(),
            seq: 3,
            path: "/genre".into(),
        };
        assert_eq!(list.describe(), "GET /genre (#3)");
    }

    #[test]
    fn test_execute_reports_transport_error() {
        let client = ApiClient::new("http://127.0.0.1:9", std::time::Duration::from_secs(2)).unwrap();
        let request = Request::Delete {
            resource: "genre".into(),
            id: "1".into(),
            path: "/genre/1".into(),
        };
        let response = tokio_test::block_on(request.execute(&client));
        match response {
            Response::Deleted { id, result, .. } => {
                assert_eq!(id, "1");
                assert!(matches!(result, Err(ApiError::Transport(_))));
            }
            other => panic!("unexpected response {:?}", other),
        }
    }
}
