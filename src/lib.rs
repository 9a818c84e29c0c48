//! GitGuide MCP library for discovering GitHub libraries and documenting them
//!
//! This library provides Model Context Protocol (MCP) tools for:
//! - Searching GitHub repositories by library name, sorted by stars
//! - Fetching repository metadata together with the decoded README
//! - Generating a markdown usage guide with a language model and saving it
//!
//! ## Configuration
//!
//! Both the GitHub token and the LLM API key are required:
//!
//! ```bash
//! export GITHUB_TOKEN=your_github_token
//! export LLM_API_KEY=your_llm_api_key
//! ```
//!
//! Optional variables are `LLM_MODEL` (default `gpt-4`), `OUTPUT_DIR` (default
//! `./docs`), `PORT` (default `8000`), `GITHUB_API_BASE_URL` and
//! `LLM_API_BASE_URL`. See [`config`] for details.
//!
//! ## Protocol
//!
//! Requests are `{"method": "tools/list" | "tools/call", "params": {...}}`.
//! Responses carry either `{"result": {"content": ...}}` or
//! `{"error": {"code", "message", "details"}}`; see [`tools::McpHandler`].
//!
//! ## Guide generation
//!
//! When the language model is unavailable (bad key, rate limits, outages) a
//! deterministic template is rendered instead, so `generate_usage_guide` still
//! succeeds. The response's `source` field says which one was used.

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod tools;
pub mod transport;
