//! Tier-shaped prompt selection.
//!
//! Each [`SizeTier`] gets its own response-schema prompt and token
//! budget. The budget and requested verbosity grow with source size but
//! stay within gateway limits; the three schemas are mutually exclusive
//! so the model is never asked for per-line detail on inputs where the
//! response would be truncated or prohibitively long.

use crate::models::SizeTier;

/// Token budget for Standard-tier responses (per-line annotations).
pub const STANDARD_TOKEN_BUDGET: u32 = 16_384;
/// Token budget for Large-tier responses (sections + summary).
pub const LARGE_TOKEN_BUDGET: u32 = 24_576;
/// Token budget for VeryLarge-tier responses (sections + architecture notes).
pub const VERY_LARGE_TOKEN_BUDGET: u32 = 32_768;

/// A selected prompt: the system message describing the required
/// response schema, plus the completion token budget for the tier.
#[derive(Debug, Clone)]
pub struct PromptPlan {
    pub system: String,
    pub token_budget: u32,
}

/// Select the response schema and token budget for a tier.
///
/// Pure selection logic with no failure modes; the tier is always one
/// of three valid values.
pub fn select_prompt(tier: SizeTier, line_count: usize) -> PromptPlan {
    match tier {
        SizeTier::Standard => PromptPlan {
            system: standard_schema_prompt(),
            token_budget: STANDARD_TOKEN_BUDGET,
        },
        SizeTier::Large => PromptPlan {
            system: large_schema_prompt(line_count),
            token_budget: LARGE_TOKEN_BUDGET,
        },
        SizeTier::VeryLarge => PromptPlan {
            system: very_large_schema_prompt(line_count),
            token_budget: VERY_LARGE_TOKEN_BUDGET,
        },
    }
}

/// Build the user message carrying the source to analyze.
pub fn user_message(language: Option<&str>, code: &str) -> String {
    format!(
        "Analyze this {} in detail. Include quality metrics (complexity, readability, \
         maintainability score 1-10), generate appropriate docstrings/comments, identify \
         issues, and suggest improvements:\n\n{}",
        language.unwrap_or("code"),
        code
    )
}

fn standard_schema_prompt() -> String {
    r#"You are an expert code analyzer. Analyze code and provide comprehensive feedback including quality metrics, docstrings, and improvement suggestions.

Return the analysis in this exact JSON structure:
{
  "explanation": "Overall explanation of what the code does",
  "docstring": "Generated docstring or inline comments for the code",
  "rating": {
    "complexity": "low|medium|high",
    "readability": "low|medium|high",
    "maintainability": 7
  },
  "lineByLine": [
    {
      "line": 1,
      "content": "the actual line of code",
      "explanation": "what this line does"
    }
  ],
  "issues": [
    {
      "severity": "high|medium|low",
      "line": 5,
      "description": "description of the issue",
      "suggestion": "how to fix it"
    }
  ],
  "improvements": [
    {
      "title": "improvement title",
      "description": "detailed description",
      "startLine": 3,
      "endLine": 8,
      "code": "suggested improved code"
    }
  ]
}

Always include the rating object. Do not include "sections" or "summary" fields."#
        .to_string()
}

fn large_schema_prompt(line_count: usize) -> String {
    format!(
        r#"You are an expert code analyzer. The input is a large file ({line_count} lines), so describe it section by section instead of line by line.

Return the analysis in this exact JSON structure:
{{
  "explanation": "Overall explanation of what the code does",
  "docstring": "High-level documentation for the file",
  "rating": {{
    "complexity": "low|medium|high",
    "readability": "low|medium|high",
    "maintainability": 7
  }},
  "sections": [
    {{
      "name": "section name",
      "startLine": 1,
      "endLine": 120,
      "purpose": "what this section is responsible for",
      "keyPoints": ["notable detail"]
    }}
  ],
  "summary": {{
    "totalFunctions": 12,
    "totalClasses": 3,
    "linesOfCode": {line_count},
    "keyPatterns": ["patterns used"],
    "mainDependencies": ["imported libraries"]
  }},
  "issues": [
    {{
      "severity": "high|medium|low",
      "line": 5,
      "description": "description of the issue",
      "suggestion": "how to fix it"
    }}
  ],
  "improvements": [
    {{
      "title": "improvement title",
      "description": "detailed description",
      "startLine": 3,
      "endLine": 8,
      "code": "suggested improved code"
    }}
  ]
}}

Always include the rating object. Do not include a "lineByLine" field.
Report at most 10 low-severity issues and at most 15 improvements."#
    )
}

fn very_large_schema_prompt(line_count: usize) -> String {
    format!(
        r#"You are an expert code analyzer. The input is a very large file ({line_count} lines), so describe it section by section and focus on architecture.

Return the analysis in this exact JSON structure:
{{
  "explanation": "Overall explanation of what the code does",
  "docstring": "High-level documentation for the file",
  "rating": {{
    "complexity": "low|medium|high",
    "readability": "low|medium|high",
    "maintainability": 7
  }},
  "sections": [
    {{
      "name": "section name",
      "startLine": 1,
      "endLine": 400,
      "purpose": "what this section is responsible for",
      "keyPoints": ["notable detail"]
    }}
  ],
  "summary": {{
    "totalFunctions": 40,
    "totalClasses": 9,
    "linesOfCode": {line_count},
    "keyPatterns": ["patterns used"],
    "mainDependencies": ["imported libraries"],
    "architectureNotes": "how the file is organized and why"
  }},
  "issues": [
    {{
      "severity": "high",
      "line": 5,
      "description": "description of the issue",
      "suggestion": "how to fix it"
    }}
  ],
  "improvements": [
    {{
      "title": "improvement title",
      "description": "detailed description",
      "startLine": 3,
      "endLine": 8,
      "code": "suggested improved code"
    }}
  ]
}}

Always include the rating object and the summary's "architectureNotes".
Do not include a "lineByLine" field.
Report only high-severity issues (at most 10) and the top 10 improvements."#
    )
}
