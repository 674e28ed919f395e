//! Records returned by the blog API.
//!
//! Only the fields the client reads are typed; everything else is kept in
//! `extra` so a record survives a round trip unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A blog post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
  pub id: u64,
  pub user_id: u64,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub body: String,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

/// A post author
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
  pub id: u64,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub username: String,
  #[serde(default)]
  pub email: String,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

/// A comment on a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
  pub id: u64,
  pub post_id: u64,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub body: String,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}
