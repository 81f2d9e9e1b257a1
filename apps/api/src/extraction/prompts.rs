// Cleanup-stage prompt templates. Replace `{raw_text}` before sending;
// `cleanup::build_cleanup_prompt` appends the shared no-commentary instruction.

/// Restructuring prompt for text rebuilt from PDF geometry.
pub const PDF_CLEANUP_PROMPT_TEMPLATE: &str = r#"You are a text cleaning assistant. The following text was extracted from a PDF resume but may have formatting issues, broken lines, or scattered information.

Please clean and restructure this text into a well-formatted resume with clear sections (Contact Info, Summary, Experience, Education, Skills, etc.).
- Fix broken lines and paragraphs
- Remove page break markers
- Organize scattered information
- Preserve all dates, company names, and achievements
- Maintain chronological order

Raw text:
{raw_text}"#;

/// Shorter prompt for DOCX text, which is already in reading order.
pub const DOCX_CLEANUP_PROMPT_TEMPLATE: &str = r#"Clean and properly format this resume text. Fix any formatting issues and organize it into clear sections (Contact Info, Summary, Experience, Education, Skills):

{raw_text}"#;
