#![allow(dead_code)]

// All LLM prompt constants for the AI job handlers.

/// System prompt for resume analysis — enforces JSON-only output.
pub const ANALYZE_SYSTEM: &str = "You are a precise JSON-only response generator. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Resume analysis prompt template.
/// Replace `{resume_text}` and `{job_description}` before sending.
pub const ANALYZE_PROMPT_TEMPLATE: &str = r#"You are a professional resume consultant with 15+ years of experience in tech recruiting.

Analyze this resume against the job description below.

RESUME TEXT:
"""
{resume_text}
"""

JOB DESCRIPTION:
"""
{job_description}
"""

Provide a detailed analysis in strict JSON format only (no other text). The JSON must have exactly these keys:

{
  "keywords": ["list of important keywords from job desc that appear in resume"],
  "missingKeywords": ["keywords/skills from job desc that are MISSING from resume"],
  "skillsToEmphasize": ["skills in resume that match the job and should be highlighted more"],
  "experienceToHighlight": ["specific experiences or achievements in resume to emphasize for this role"],
  "recommendedChanges": ["bullet points of actionable suggestions to improve resume fit"],
  "matchScore": number between 0 and 100 (integer) representing overall fit
}

Be concise, accurate, and honest. Do not hallucinate missing information.
If resume is very short or job desc is unclear, still provide best-effort analysis."#;

/// System prompt for cover-letter generation — free text, no JSON.
pub const COVER_LETTER_SYSTEM: &str =
    "You are a professional career coach specializing in cover letters.";

/// Cover-letter prompt template.
/// Replace: {position}, {company}, {resume_summary}, {job_description}.
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"Write a professional, concise cover letter (300-400 words max) tailored for:

Position: {position}
Company: {company}

Candidate background (from resume):
"""
{resume_summary}
"""

Job requirements:
"""
{job_description}
"""

Guidelines:
- Professional tone, enthusiastic but not over-the-top
- Highlight 2-3 relevant experiences/skills from resume that match the job
- Show genuine interest in the company/role
- End with a strong call-to-action
- Use first-person language
- Keep under 400 words

Return ONLY the cover letter text, with no extra explanations."#;
