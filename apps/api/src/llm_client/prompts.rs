/// Resume scoring prompt. `{resume_text}` is replaced with the extracted text.
pub const RESUME_ANALYSIS_PROMPT: &str = r#"Analyze the following resume text and provide feedback. Structure your response as a JSON object adhering STRICTLY to the following format:
{
  "overallScore": <integer score 0-100>,
  "categoryScores": {
    "formatting": <integer score 0-100 for layout, readability, consistency>,
    "content": <integer score 0-100 for clarity, conciseness, grammar, spelling>,
    "keywords": <integer score 0-100 for relevance of skills and terms to common job descriptions>,
    "impact": <integer score 0-100 for showcasing achievements and quantifiable results>
  },
  "suggestions": [<array of specific, actionable suggestion strings>],
  "strengths": [<array of specific strength strings>]
}

Resume Text:
--- START RESUME ---
{resume_text}
--- END RESUME ---

Ensure your entire response is ONLY the JSON object requested, without any introductory text, code block markers, or explanations.

JSON Response:"#;

pub fn resume_analysis_prompt(resume_text: &str) -> String {
    RESUME_ANALYSIS_PROMPT.replace("{resume_text}", resume_text)
}
