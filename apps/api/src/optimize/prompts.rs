// ATS analysis prompt. Replace `{resume_text}` and `{job_description}` before
// sending; `analysis::build_analysis_prompt` appends the JSON-only instruction.

pub const ATS_ANALYSIS_PROMPT_TEMPLATE: &str = r#"You are an ATS (Applicant Tracking System) expert. Analyze the following resume against the job description and provide:
1. ATS compatibility score (0-100)
2. Missing keywords (array of strings)
3. Matched keywords (array of strings)
4. Optimization suggestions (array of strings with specific actionable advice)

Resume:
{resume_text}

Job Description:
{job_description}

Respond in this exact format:
{
  "atsScore": number,
  "missingKeywords": ["keyword1", "keyword2"],
  "matchedKeywords": ["keyword1", "keyword2"],
  "suggestions": ["suggestion1", "suggestion2"]
}"#;
