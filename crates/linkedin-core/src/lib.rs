//! Core library for the LinkedIn REST integration: credentials, the HTTP
//! client for posts and profile info, and the tool registry built on top.

pub mod auth;
pub mod config;
pub mod rest;
pub mod services;
pub mod tools;

pub use rest::{ApiError, ApiResult, ErrorKind, LinkedInClient};
pub use tools::{LinkedInTools, ToolDefinition, ToolError, ToolName, ToolParameter};
