//! Integration tests for PromptForge live in `tests/`.
