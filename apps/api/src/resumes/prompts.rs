// LLM prompt constants for the résumé service.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for turning raw résumé text into structured JSON.
pub const STRUCTURE_SYSTEM: &str = "You are an expert recruiter who reads résumés \
    written in Portuguese or English and extracts their content faithfully.";

/// Structuring prompt template. Replace `{resume_text}` before sending.
pub const STRUCTURE_PROMPT_TEMPLATE: &str = r#"Extract the content of the résumé below.

Return a JSON object with this EXACT schema (no extra fields):
{
  "full_name": "Maria Silva",
  "email": "maria@example.com",
  "phone": "+55 11 99999-0000",
  "location": "São Paulo, SP",
  "linkedin": "linkedin.com/in/mariasilva",
  "summary": "Desenvolvedora backend com 6 anos de experiência...",
  "experiences": [
    {
      "company": "Empresa X",
      "role": "Engenheira de Software",
      "start_date": "2019-03",
      "end_date": null,
      "description": "Liderou a migração..."
    }
  ],
  "education": [
    {
      "institution": "USP",
      "degree": "Bacharelado",
      "field": "Ciência da Computação",
      "start_date": "2013",
      "end_date": "2017"
    }
  ],
  "skills": ["Rust", "PostgreSQL"],
  "languages": ["Português (nativo)", "Inglês (avançado)"],
  "certifications": ["AWS Solutions Architect"]
}

Dates use YYYY-MM or YYYY as written; a current position has "end_date": null.

Résumé:
{resume_text}"#;

/// System prompt for job-fit analysis.
pub const ANALYSIS_SYSTEM: &str = "You are a senior career coach for the Brazilian job market. \
    You assess résumés against job descriptions and ATS screening.";

/// Analysis prompt template. Replace `{resume_text}` and `{job_description}` before sending.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the résumé below against the target position.

Return a JSON object with this EXACT schema (no extra fields):
{
  "compatibility_score": 72,
  "optimized_resume": "Full rewritten résumé in plain text...",
  "market_summary": "Short overview of demand, salary range and competition...",
  "action_plan": [
    {"day": 1, "title": "Ajustar palavras-chave", "tasks": ["...", "..."]}
  ]
}

Rules:
- compatibility_score is an integer from 0 to 100.
- optimized_resume keeps every fact from the original and is ATS-friendly: no tables, no columns.
- action_plan covers 7 consecutive days, starting at day 1.

Target position:
{job_description}

Résumé:
{resume_text}"#;

/// Substituted for `{job_description}` when the user gave none.
pub const NO_JOB_DESCRIPTION: &str =
    "No specific position. Assess the résumé against the general market for its area.";
