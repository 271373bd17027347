// Prompt for the résumé optimization call.
// The example object documents the StructuredResume shape for the model; keep
// it in sync with `models::resume`.

const RESPONSE_EXAMPLE: &str = r#"{
  "header": {
    "name": "Full Name",
    "contact": "email@example.com | +1 555 0100 | City, Country | linkedin.com/in/profile"
  },
  "summary": "Two to four sentences tailored to the target role.",
  "skills": ["Skill one", "Skill two", "Skill three"],
  "experience": [
    {
      "title": "Job Title",
      "company": "Company Name",
      "period": "Jan 2020 - Present",
      "highlights": [
        "Achievement-oriented bullet using keywords from the job description",
        "Quantified impact where the original resume supports it"
      ]
    }
  ],
  "education": [
    {
      "degree": "Degree and Field",
      "institution": "Institution Name",
      "year": "2019"
    }
  ],
  "matchScore": 85
}"#;

/// Builds the single combined prompt. Inputs are embedded verbatim.
pub fn build_optimization_prompt(resume_text: &str, job_description: &str, job_role: &str) -> String {
    format!(
        "You are an expert resume writer and ATS optimization specialist.\n\
         Rewrite the candidate's resume so it targets the role below. \
         Keep every fact truthful to the original resume: do not invent employers, \
         dates, degrees or metrics. Prefer the job description's terminology where \
         the candidate's experience supports it.\n\n\
         Return ONLY a JSON object, with no commentary before or after it, \
         matching exactly this structure:\n\
         {example}\n\n\
         Rules:\n\
         - \"matchScore\" is an integer from 0 to 100 estimating how well the optimized resume fits the job.\n\
         - Omit a section's content (use an empty array) when the resume has nothing for it.\n\
         - Order experience from most recent to oldest.\n\n\
         TARGET ROLE:\n{job_role}\n\n\
         JOB DESCRIPTION:\n{job_description}\n\n\
         ORIGINAL RESUME:\n{resume_text}\n",
        example = RESPONSE_EXAMPLE,
    )
}
