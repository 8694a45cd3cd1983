//! The route table.
//!
//! Routes are registered by name while the table is built; the path is derived from the name
//! (`fs_readtext` becomes `/api/fs/readtext`). After [`RouteTableBuilder::build`] the table is
//! read-only and shared by all connections.

use crate::error::RouteError;
use crate::handler::RouteHandler;

/// First path segment of every API route.
pub const API_ROOT: &str = "api";

/// Separator in route names that becomes `/` in the path.
pub const NAME_SEPARATOR: char = '_';

type InnerRouter = matchit::Router<Box<dyn RouteHandler>>;

pub struct RouteTable {
    inner_router: InnerRouter,
    paths: Vec<String>,
}

/// Derives the path of a route from its name.
pub fn route_path(name: &str) -> String {
    format!("/{API_ROOT}/{}", name.replace(NAME_SEPARATOR, "/"))
}

/// Returns true if `path` is under the API prefix.
pub fn is_api_path(path: &str) -> bool {
    path.strip_prefix('/').and_then(|rest| rest.strip_prefix(API_ROOT)).is_some_and(|rest| rest.starts_with('/'))
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::new()
    }

    /// Finds the handler registered for `path`.
    pub fn at(&self, path: &str) -> Option<&dyn RouteHandler> {
        self.inner_router.at(path).ok().map(|matched| matched.value.as_ref())
    }

    /// Registered paths, in registration order.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }
}

impl std::fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteTable").field("paths", &self.paths).finish()
    }
}

pub struct RouteTableBuilder {
    routes: Vec<(String, Box<dyn RouteHandler>)>,
}

impl RouteTableBuilder {
    fn new() -> Self {
        Self { routes: Vec::new() }
    }

    pub fn register(mut self, name: impl Into<String>, handler: impl RouteHandler + 'static) -> Self {
        self.routes.push((name.into(), Box::new(handler)));
        self
    }

    /// Freezes the table; the first name that is malformed or derives an already
    /// registered path is an error.
    pub fn build(self) -> Result<RouteTable, RouteError> {
        let mut inner_router = InnerRouter::new();
        let mut paths = Vec::with_capacity(self.routes.len());

        for (name, handler) in self.routes {
            let valid = !name.is_empty()
                && name.split(NAME_SEPARATOR).all(|segment| !segment.is_empty())
                && name.chars().all(|c| c.is_ascii_alphanumeric() || c == NAME_SEPARATOR);
            if !valid {
                return Err(RouteError::InvalidName { name });
            }

            let path = route_path(&name);
            if paths.contains(&path) {
                return Err(RouteError::Duplicate { name, path });
            }

            inner_router.insert(path.clone(), handler).map_err(|source| RouteError::Insert { path: path.clone(), source })?;
            paths.push(path);
        }

        Ok(RouteTable { inner_router, paths })
    }
}

impl std::fmt::Debug for RouteTableBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.routes.iter().map(|(name, _)| name.as_str()).collect();
        f.debug_struct("RouteTableBuilder").field("names", &names).finish()
    }
}
