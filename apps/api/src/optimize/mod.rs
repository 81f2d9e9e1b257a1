// ATS optimization: scores resume text against a job description.
// Stateless; the caller decides whether to keep the report.

pub mod analysis;
pub mod handlers;
pub mod prompts;
