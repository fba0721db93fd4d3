/// CV keyword scan — pulls the technical vocabulary out of an uploaded PDF
/// so recruiters can filter applications without opening every file.
///
/// Best-effort by design: a CV that cannot be parsed never fails the
/// application, it just leaves the keyword column empty.
use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

const PROGRAMMING_LANGUAGES: &[&str] = &[
    "Python",
    "Java",
    "C++",
    "C#",
    "JavaScript",
    "Ruby",
    "Go",
    "Rust",
    "PHP",
    "Swift",
    "Kotlin",
    "TypeScript",
    "SQL",
    "R",
    "Perl",
    "Scala",
    "Haskell",
    "Lua",
];

const FRAMEWORKS_TOOLS: &[&str] = &[
    "Django",
    "Flask",
    "Spring",
    "React",
    "Angular",
    "Vue.js",
    "Node.js",
    "Express",
    "TensorFlow",
    "PyTorch",
    "Git",
    "Docker",
    "Kubernetes",
    "Jenkins",
    "AWS",
    "Azure",
    "GCP",
    "Terraform",
    "Ansible",
    "Maven",
    "Gradle",
];

const CONCEPTS_APPROACHES: &[&str] = &[
    "Agile",
    "Scrum",
    "DevOps",
    "CI/CD",
    "OOP",
    "Functional Programming",
    "REST",
    "GraphQL",
    "Microservices",
    "TDD",
    "BDD",
    "Design Patterns",
    "SOLID",
    "DRY",
    "Machine Learning",
    "Deep Learning",
    "Big Data",
    "Cloud Computing",
];

const DATABASES: &[&str] = &[
    "MySQL",
    "PostgreSQL",
    "MongoDB",
    "SQLite",
    "Oracle",
    "Redis",
    "Cassandra",
    "DynamoDB",
];

/// Keywords found in a CV, grouped the way the screening UI displays them.
#[derive(Debug, Default, Serialize)]
pub struct CvKeywords {
    pub programming_languages: Vec<String>,
    pub frameworks_tools: Vec<String>,
    pub concepts_approaches: Vec<String>,
    pub databases: Vec<String>,
}

impl CvKeywords {
    fn is_empty(&self) -> bool {
        self.programming_languages.is_empty()
            && self.frameworks_tools.is_empty()
            && self.concepts_approaches.is_empty()
            && self.databases.is_empty()
    }
}

/// Extracts text from an uploaded PDF and scans it for known technical
/// keywords. Returns `None` when no text could be extracted, leaving the
/// stored column null; an extracted-but-keywordless CV stores `{}`.
pub fn scan_cv(pdf: &[u8]) -> Option<Value> {
    let text = match pdf_extract::extract_text_from_mem(pdf) {
        Ok(text) => text,
        Err(err) => {
            warn!("CV text extraction failed: {err}");
            return None;
        }
    };

    if text.trim().is_empty() {
        warn!("CV contained no extractable text");
        return None;
    }

    let keywords = extract_keywords(&text);
    if keywords.is_empty() {
        return Some(json!({}));
    }

    serde_json::to_value(&keywords).ok()
}

/// Scans text against the keyword tables. Matching is case-insensitive and
/// boundary-aware so "Java" does not fire inside "JavaScript".
pub fn extract_keywords(text: &str) -> CvKeywords {
    let haystack = text.to_lowercase();

    let scan = |table: &[&str]| -> Vec<String> {
        table
            .iter()
            .filter(|term| contains_term(&haystack, &term.to_lowercase()))
            .map(|term| term.to_string())
            .collect()
    };

    CvKeywords {
        programming_languages: scan(PROGRAMMING_LANGUAGES),
        frameworks_tools: scan(FRAMEWORKS_TOOLS),
        concepts_approaches: scan(CONCEPTS_APPROACHES),
        databases: scan(DATABASES),
    }
}

/// Substring search where neither neighbour of the match is alphanumeric.
/// Terms like "C++" and "CI/CD" carry their own punctuation, so a plain
/// word-boundary regex would miss them.
fn contains_term(haystack: &str, term: &str) -> bool {
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(term) {
        let begin = start + pos;
        let end = begin + term.len();

        let before_ok = haystack[..begin]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());

        if before_ok && after_ok {
            return true;
        }

        // Step one char forward so overlapping occurrences are still seen.
        let step = haystack[begin..]
            .chars()
            .next()
            .map_or(1, |c| c.len_utf8());
        start = begin + step;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_term_requires_boundaries() {
        assert!(contains_term("shipped in go and rust", "go"));
        assert!(!contains_term("worked at google", "go"));
        assert!(!contains_term("javascript everywhere", "java"));
    }

    #[test]
    fn test_contains_term_handles_punctuated_terms() {
        assert!(contains_term("fluent in c++ and c#", "c++"));
        assert!(contains_term("owned the ci/cd pipeline", "ci/cd"));
        assert!(contains_term("(node.js)", "node.js"));
    }

    #[test]
    fn test_contains_term_finds_later_occurrence() {
        // First "r" is embedded in a word; the standalone one still counts.
        assert!(contains_term("rust, r, python", "r"));
    }

    #[test]
    fn test_extract_keywords_categorizes() {
        let text = "Senior QA engineer. Python and Rust, Django and Docker, \
                    strong TDD background, PostgreSQL in production.";
        let found = extract_keywords(text);

        assert_eq!(found.programming_languages, vec!["Python", "Rust"]);
        assert_eq!(found.frameworks_tools, vec!["Django", "Docker"]);
        assert_eq!(found.concepts_approaches, vec!["TDD"]);
        assert_eq!(found.databases, vec!["PostgreSQL"]);
    }

    #[test]
    fn test_extract_keywords_empty_text() {
        assert!(extract_keywords("nothing technical here").is_empty());
    }
}
