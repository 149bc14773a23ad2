/// Tech skills recognized in free-text job descriptions.
const KNOWN_SKILLS: &[&str] = &[
    "Python",
    "JavaScript",
    "Java",
    "C++",
    "React",
    "Angular",
    "Vue",
    "Node.js",
    "Django",
    "Flask",
    "SQL",
    "MongoDB",
    "PostgreSQL",
    "AWS",
    "Azure",
    "GCP",
    "Docker",
    "Kubernetes",
    "Git",
    "Machine Learning",
    "AI",
    "Data Science",
    "DevOps",
    "TypeScript",
    "Ruby",
    "Go",
    "Rust",
    "PHP",
    "Swift",
    "REST API",
    "GraphQL",
    "Redis",
    "Elasticsearch",
];

const MAX_EXTRACTED: usize = 10;

/// Known skills mentioned anywhere in `description`, in vocabulary order,
/// capped at ten. Plain case-insensitive substring search, so short names
/// such as "Go" also hit inside longer words.
pub fn extract_skills(description: &str) -> Vec<String> {
    if description.is_empty() {
        return Vec::new();
    }
    let lower = description.to_lowercase();
    KNOWN_SKILLS
        .iter()
        .filter(|skill| lower.contains(&skill.to_lowercase()))
        .take(MAX_EXTRACTED)
        .map(|skill| skill.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_in_vocabulary_order() {
        let skills = extract_skills("We use docker, PYTHON and kubernetes.");
        assert_eq!(skills, vec!["Python", "Docker", "Kubernetes"]);
    }

    #[test]
    fn test_empty_description() {
        assert!(extract_skills("").is_empty());
    }

    #[test]
    fn test_caps_at_ten() {
        let text = "python javascript java c++ react angular vue node.js django flask sql mongodb";
        assert_eq!(extract_skills(text).len(), 10);
    }
}
