//! Cross-module tests and shared fakes.

mod rag_flow;
