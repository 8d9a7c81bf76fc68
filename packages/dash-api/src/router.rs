//! Matchit routing configuration.

use std::sync::Arc;

use hyper::{body::Bytes, Method, Request, Response};
use matchit::Router as MatchitRouter;
use tokio::sync::mpsc;

use crate::handlers;
use dash_core::config::DashConfig;
use dash_runtime::ApiRequest;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Dashboard configuration
    pub config: Arc<DashConfig>,
    /// API request sender to runtime
    pub api_tx: mpsc::Sender<ApiRequest>,
}

/// HTTP request router.
pub struct Router {
    inner: MatchitRouter<RouteHandler>,
    state: AppState,
}

const ROUTES: [(&str, RouteHandler); 12] = [
    ("/dataset", RouteHandler::Dataset),
    ("/dataset/load", RouteHandler::Load),
    ("/dataset/columns", RouteHandler::Columns),
    ("/dataset/query", RouteHandler::Query),
    ("/dataset/export", RouteHandler::Export),
    ("/dataset/summary", RouteHandler::Summary),
    ("/dataset/crosstab", RouteHandler::CrossTab),
    ("/dataset/aggregate", RouteHandler::Aggregate),
    ("/dataset/rows/{row}", RouteHandler::Row),
    ("/dataset/changes", RouteHandler::Changes),
    ("/dataset/save", RouteHandler::Save),
    ("/dataset/discard", RouteHandler::Discard),
];

impl Router {
    /// Creates a new router with the dataset routes.
    pub fn new(
        config: Arc<DashConfig>,
        api_tx: mpsc::Sender<ApiRequest>,
    ) -> Result<Self, matchit::InsertError> {
        let mut router = MatchitRouter::new();
        for (path, handler) in ROUTES {
            router.insert(path, handler)?;
        }

        Ok(Self {
            inner: router,
            state: AppState { config, api_tx },
        })
    }

    /// Routes an incoming request to the appropriate handler.
    ///
    /// Handler errors are turned into error envelopes here, so the result
    /// only fails if no response could be built at all.
    pub async fn route(
        &self,
        req: Request<hyper::body::Incoming>,
    ) -> Result<Response<Bytes>, RouterError> {
        let path = req.uri().path().to_string();
        let method = req.method().clone();

        let result = match self.inner.at(&path) {
            Ok(matched) => {
                matched
                    .value
                    .handle(req, matched.params, self.state.clone())
                    .await
            }
            Err(_) => Err(RouterError::NotFound(format!("No route found for {}", path))),
        };

        match result {
            Ok(response) => {
                tracing::debug!("{} {} -> {}", method, path, response.status());
                Ok(response)
            }
            Err(err) => {
                tracing::debug!("{} {} failed: {}", method, path, err);
                Ok(err.into())
            }
        }
    }
}

/// Route handler function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouteHandler {
    Dataset,
    Load,
    Columns,
    Query,
    Export,
    Summary,
    CrossTab,
    Aggregate,
    Row,
    Changes,
    Save,
    Discard,
}

impl RouteHandler {
    /// The single method each route answers to.
    fn method(self) -> Method {
        match self {
            RouteHandler::Dataset | RouteHandler::Columns | RouteHandler::Changes => Method::GET,
            RouteHandler::Row => Method::PATCH,
            _ => Method::POST,
        }
    }

    /// Handles a request with the given route parameters.
    async fn handle(
        self,
        req: Request<hyper::body::Incoming>,
        params: matchit::Params<'_, '_>,
        state: AppState,
    ) -> Result<Response<Bytes>, RouterError> {
        if req.method() != self.method() {
            return Err(RouterError::MethodNotAllowed);
        }

        match self {
            RouteHandler::Dataset => handlers::preview(req, state).await,
            RouteHandler::Load => handlers::load(state).await,
            RouteHandler::Columns => handlers::columns(state).await,
            RouteHandler::Query => handlers::query(req, state).await,
            RouteHandler::Export => handlers::export(req, state).await,
            RouteHandler::Summary => handlers::summary(req, state).await,
            RouteHandler::CrossTab => handlers::crosstab(req, state).await,
            RouteHandler::Aggregate => handlers::aggregate(req, state).await,
            RouteHandler::Row => handlers::edit_row(req, params, state).await,
            RouteHandler::Changes => handlers::changes(state).await,
            RouteHandler::Save => handlers::save(state).await,
            RouteHandler::Discard => handlers::discard(state).await,
        }
    }
}

/// Router error type.
#[derive(Debug, Clone, PartialEq)]
pub enum RouterError {
    MethodNotAllowed,
    InternalError(String),
    Timeout,
    BadRequest(String),
    NotFound(String),
    /// The warehouse refused a connection or a write
    BadGateway(String),
}

impl RouterError {
    pub fn status(&self) -> u16 {
        match self {
            RouterError::MethodNotAllowed => 405,
            RouterError::InternalError(_) => 500,
            RouterError::Timeout => 408,
            RouterError::BadRequest(_) => 400,
            RouterError::NotFound(_) => 404,
            RouterError::BadGateway(_) => 502,
        }
    }
}

impl std::fmt::Display for RouterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouterError::MethodNotAllowed => write!(f, "Method Not Allowed"),
            RouterError::InternalError(msg) => write!(f, "Internal Error: {}", msg),
            RouterError::Timeout => write!(f, "Request Timeout"),
            RouterError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            RouterError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            RouterError::BadGateway(msg) => write!(f, "Bad Gateway: {}", msg),
        }
    }
}

impl std::error::Error for RouterError {}

impl From<RouterError> for Response<Bytes> {
    fn from(err: RouterError) -> Self {
        let status = err.status();
        let message = match &err {
            RouterError::MethodNotAllowed => "Method Not Allowed",
            RouterError::Timeout => "Request Timeout",
            RouterError::InternalError(msg)
            | RouterError::BadRequest(msg)
            | RouterError::NotFound(msg)
            | RouterError::BadGateway(msg) => msg.as_str(),
        };

        let body = handlers::ErrorResponse::new(status, message).to_bytes();

        let mut response = Response::new(Bytes::from(body));
        *response.status_mut() =
            hyper::StatusCode::from_u16(status).unwrap_or(hyper::StatusCode::INTERNAL_SERVER_ERROR);
        response.headers_mut().insert(
            hyper::header::CONTENT_TYPE,
            hyper::header::HeaderValue::from_static("application/json"),
        );
        response
    }
}
