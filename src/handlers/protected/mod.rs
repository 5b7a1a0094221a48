// Protected handlers: every one takes a `Session`, so an unauthenticated
// request is answered with 401 before any store access.
//
// Route prefix: /api/*
// Stages: authenticate (extractor) → authorize (require_role) → validate →
// execute (run_operation) → respond (ApiResponse)

pub mod auth;
pub mod company;
pub mod master_data;
pub mod postal;
pub mod preferences;
pub mod records;
pub mod remarks;
pub mod settings;
