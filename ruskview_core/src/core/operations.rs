//! Typed shortcuts for the cluster and index calls the dashboard makes.
//! Each one only builds a `ProxyRequest`; sending goes through the proxy.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use urlencoding::encode;

use super::proxy::ProxyRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterOp {
    Health,
    State,
    Stats,
    Nodes,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOp {
    Search,
    Mapping,
    Settings,
    Stats,
    Create,
    Delete,
}

/// Query parameters, kept sorted so paths are reproducible.
pub type Params = BTreeMap<String, String>;

impl ClusterOp {
    pub fn path(self) -> &'static str {
        match self {
            ClusterOp::Health => "/_cluster/health",
            ClusterOp::State => "/_cluster/state",
            ClusterOp::Stats => "/_cluster/stats",
            ClusterOp::Nodes => "/_nodes",
            ClusterOp::Info => "/",
        }
    }

    pub fn request(self, params: &Params) -> ProxyRequest {
        ProxyRequest::get(with_query(self.path().to_string(), params))
    }
}

impl IndexOp {
    pub fn path(self, index: &str) -> String {
        let index = encode(index);
        match self {
            IndexOp::Search => format!("/{index}/_search"),
            IndexOp::Mapping => format!("/{index}/_mapping"),
            IndexOp::Settings => format!("/{index}/_settings"),
            IndexOp::Stats => format!("/{index}/_stats"),
            IndexOp::Create | IndexOp::Delete => format!("/{index}"),
        }
    }

    pub fn method(self) -> http::Method {
        match self {
            IndexOp::Create => http::Method::PUT,
            IndexOp::Delete => http::Method::DELETE,
            // Search usually carries a query body.
            IndexOp::Search => http::Method::POST,
            _ => http::Method::GET,
        }
    }

    /// Only `Search` and `Create` forward `body`; other operations drop it.
    pub fn request(self, index: &str, params: &Params, body: Option<Value>) -> ProxyRequest {
        let request = ProxyRequest::new(self.method(), with_query(self.path(index), params));
        match (self, body) {
            (IndexOp::Search | IndexOp::Create, Some(body)) => request.with_json(body),
            _ => request,
        }
    }
}

fn with_query(base: String, params: &Params) -> String {
    if params.is_empty() {
        return base;
    }
    let query: Vec<String> = params
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect();
    format!("{}?{}", base, query.join("&"))
}

impl FromStr for ClusterOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "health" => Ok(ClusterOp::Health),
            "state" => Ok(ClusterOp::State),
            "stats" => Ok(ClusterOp::Stats),
            "nodes" => Ok(ClusterOp::Nodes),
            "info" => Ok(ClusterOp::Info),
            other => Err(format!("unknown cluster operation '{other}'")),
        }
    }
}

impl FromStr for IndexOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "search" => Ok(IndexOp::Search),
            "mapping" => Ok(IndexOp::Mapping),
            "settings" => Ok(IndexOp::Settings),
            "stats" => Ok(IndexOp::Stats),
            "create" => Ok(IndexOp::Create),
            "delete" => Ok(IndexOp::Delete),
            other => Err(format!("unknown index operation '{other}'")),
        }
    }
}

impl fmt::Display for ClusterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = format!("{:?}", self).to_lowercase();
        f.write_str(&name)
    }
}

impl fmt::Display for IndexOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = format!("{:?}", self).to_lowercase();
        f.write_str(&name)
    }
}
