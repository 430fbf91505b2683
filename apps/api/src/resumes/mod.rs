// Résumé service: persists uploaded résumés and runs AI structuring and
// job-fit analysis over their extracted text.
// All LLM calls go through llm_client.

pub mod ai;
pub mod handlers;
pub mod prompts;
pub mod repository;
pub mod storage;
