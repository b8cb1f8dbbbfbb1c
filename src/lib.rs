//! # showcase-gateway
//!
//! HTTP gateway for a hackathon project-discovery site. It sits between the
//! site and the project/search backend, expanding free-text queries into
//! search keywords and forwarding everything else.
//!
//! ## Query flow
//!
//! ```text
//!        ┌─────────────┐
//!        │ User Query  │
//!        └──────┬──────┘
//!               │
//!               ▼
//!   ┌───────────────────────┐      ┌─────────────────────┐
//!   │   Keyword Expansion   │─────▶│  Inference Broker   │
//!   │ model or stopword     │      │ ledger, signing,    │
//!   │ filter (fallback)     │◀─────│ settlement          │
//!   └───────────┬───────────┘      └─────────────────────┘
//!               │ "defi, lending, ..."
//!               ▼
//!   ┌───────────────────────┐
//!   │     Result Cache      │  hit ──────────────┐
//!   └───────────┬───────────┘                    │
//!               │ miss                           │
//!               ▼                                │
//!   ┌───────────────────────┐                    │
//!   │ Backend /embeddings   │                    │
//!   └───────────┬───────────┘                    │
//!               ▼                                ▼
//!   ┌──────────────────────────────────────────────────┐
//!   │ /api/chat          single-page result envelope   │
//!   │ /api/chat/message  top 10 + summary, or backend  │
//!   │                    /chat when anything fails     │
//!   └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for the backend, LLM and broker
//! - [`models`] - Backend DTOs (`Project`, `Prize`, `SearchResponse`, ...) and request types
//! - [`backend`] - Typed HTTP client for the project/search backend
//! - [`llm::keywords`] - Local stopword-filter expansion and keyword list parsing
//! - [`llm::query_expand`] - Model-backed query expansion with local fallback
//! - [`llm::broker`] - Paid inference: ledger checks, provider setup, request signing
//! - [`llm::summary`] - Conversational summary of matched projects
//! - [`cache`] - Bounded embeddings result cache
//! - [`pagination`] - Pagination envelopes and page-link windows
//! - [`gateway`] - Expansion search and chat flows
//! - [`api`] - Axum router and handlers
//! - [`state`] - Shared application state

pub mod api;
pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod llm;
pub mod models;
pub mod pagination;
pub mod state;
