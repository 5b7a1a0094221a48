// Two tiers:
// Public (no session) → Protected (session required, role-gated writes)

pub mod protected; // /api/*
pub mod public; // /, /health
