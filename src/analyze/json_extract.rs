use lazy_static::lazy_static;
use regex::Regex;
use serde::de::DeserializeOwned;

lazy_static! {
    static ref JSON_BLOCK: Regex = Regex::new(r"(?is)```json\s*(.*?)\s*```").unwrap();
    static ref BARE_BLOCK: Regex = Regex::new(r"(?s)```[ \t]*\r?\n(.*?)\s*```").unwrap();
}

fn block_body<'a>(re: &Regex, reply: &'a str) -> Option<&'a str> {
    re.captures(reply).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// Body of the first `json` fence, else of the first unlabeled fence, else
/// the whole reply.
pub fn json_payload(reply: &str) -> &str {
    block_body(&JSON_BLOCK, reply)
        .or_else(|| block_body(&BARE_BLOCK, reply))
        .unwrap_or(reply)
        .trim()
}

/// Parses a model reply that may wrap its JSON in a markdown fence.
pub fn parse_reply<T: DeserializeOwned>(reply: &str) -> serde_json::Result<T> {
    serde_json::from_str(json_payload(reply))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn raw_json_is_used_as_is() {
        let v: Value = parse_reply(" [{\"title\":\"HW1\"}] \n").unwrap();
        assert_eq!(v[0]["title"], "HW1");
    }

    #[test]
    fn fenced_block_wins_over_surrounding_prose() {
        let reply = "Here you go:\n```json\n[{\"title\":\"Quiz 2\"}]\n```\nGood luck!";
        let v: Value = parse_reply(reply).unwrap();
        assert_eq!(v[0]["title"], "Quiz 2");
    }

    #[test]
    fn unlabeled_fence_is_accepted() {
        let v: Value = parse_reply("```\n{\"title\":\"x\"}\n```").unwrap();
        assert_eq!(v["title"], "x");
    }

    #[test]
    fn json_fence_is_preferred_over_an_earlier_plain_fence() {
        let reply = "The syllabus says:\n```\nHW1 due Oct 1\n```\nResult:\n```json\n[{\"title\":\"HW1\",\"deadline\":\"2025-10-01\"}]\n```";
        let v: Value = parse_reply(reply).unwrap();
        assert_eq!(v[0]["deadline"], "2025-10-01");
    }

    #[test]
    fn prose_is_an_error() {
        assert!(parse_reply::<Value>("I could not find any tasks.").is_err());
    }
}
