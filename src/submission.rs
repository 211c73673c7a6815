/// Topics offered by the editor's topic picker.
pub const TOPICS: [&str; 13] = [
    "Arrays",
    "Strings",
    "HashMaps",
    "LinkedLists",
    "Stacks",
    "Queues",
    "Trees",
    "Graphs",
    "Sorting",
    "Searching",
    "Dynamic Programming",
    "Recursion",
    "Backtracking",
];

pub const DEFAULT_LANGUAGE: &str = "java";

/// Wraps submitted code in a fenced block under a topic header.
///
/// The code is embedded verbatim; a fence inside the code is not escaped.
pub fn format_submission(code: &str, topic: &str) -> String {
    format_submission_as(code, topic, DEFAULT_LANGUAGE)
}

pub fn format_submission_as(code: &str, topic: &str, language: &str) -> String {
    format!("I've submitted code for the topic: {}\n\n```{}\n{}\n```", topic, language, code)
}
