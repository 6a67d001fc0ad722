use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}]+").expect("valid token regex"));

/// Light suffix stripping. Only ASCII suffixes are removed, so byte slicing
/// stays on char boundaries.
pub fn stem(token: &str) -> String {
    let len = token.chars().count();
    let cut = |n: usize| token[..token.len() - n].to_string();

    if len > 5 && token.ends_with("ing") {
        cut(3)
    } else if len > 4 && token.ends_with("ers") {
        cut(3)
    } else if len > 4 && token.ends_with("ies") {
        format!("{}y", &token[..token.len() - 3])
    } else if len > 3 && token.ends_with("ed") {
        cut(2)
    } else if len > 3 && token.ends_with("es") {
        cut(2)
    } else if len > 3 && token.ends_with('s') && !token.ends_with("ss") {
        cut(1)
    } else {
        token.to_string()
    }
}

/// Lowercased, stemmed, order-preserving unique tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    tokenize_all(std::iter::once(text))
}

pub fn tokenize_all<'a>(texts: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut tokens = Vec::new();
    for text in texts {
        let lowered = text.to_lowercase();
        for m in TOKEN_RE.find_iter(&lowered) {
            let token = stem(m.as_str());
            if !token.is_empty() && seen.insert(token.clone()) {
                tokens.push(token);
            }
        }
    }
    tokens
}

/// Max of symmetric coverage and matched / larger-set size.
pub fn token_overlap(query: &[String], candidate: &[String]) -> f64 {
    if query.is_empty() || candidate.is_empty() {
        return 0.0;
    }
    let candidate_set: HashSet<&str> = candidate.iter().map(String::as_str).collect();
    let matched = query.iter().filter(|t| candidate_set.contains(t.as_str())).count() as f64;
    if matched == 0.0 {
        return 0.0;
    }
    let (q, c) = (query.len() as f64, candidate.len() as f64);
    let symmetric = (matched / q + matched / c) / 2.0;
    let max_set = matched / q.max(c);
    symmetric.max(max_set)
}

fn trigrams(text: &str) -> HashSet<String> {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    let padded: Vec<char> = format!(" {normalized} ").chars().collect();
    padded.windows(3).map(|w| w.iter().collect()).collect()
}

/// Character 3-gram Jaccard similarity over space-padded text.
pub fn trigram_similarity(a: &str, b: &str) -> f64 {
    if a.trim().is_empty() || b.trim().is_empty() {
        return 0.0;
    }
    let (left, right) = (trigrams(a), trigrams(b));
    let intersection = left.intersection(&right).count() as f64;
    let union = left.union(&right).count() as f64;
    if union == 0.0 {
        0.0
    } else {
        intersection / union
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stemming_rules() {
        assert_eq!(stem("drafting"), "draft");
        assert_eq!(stem("writers"), "writ");
        assert_eq!(stem("stories"), "story");
        assert_eq!(stem("posted"), "post");
        assert_eq!(stem("emails"), "email");
        assert_eq!(stem("class"), "class");
        assert_eq!(stem("bus"), "bus");
        assert_eq!(stem("sing"), "sing");
    }

    #[test]
    fn tokens_are_unique_and_ordered() {
        assert_eq!(tokenize("Blog posts, blog POST!"), vec!["blog", "post"]);
    }

    #[test]
    fn overlap_measures() {
        let q = tokenize("blog post");
        assert_eq!(token_overlap(&q, &tokenize("blog post outline")), (1.0 + 2.0 / 3.0) / 2.0);
        assert_eq!(token_overlap(&q, &[]), 0.0);
        assert_eq!(token_overlap(&q, &tokenize("invoice")), 0.0);
    }

    #[test]
    fn trigram_identity_and_disjoint() {
        assert!((trigram_similarity("cover letter", "Cover   Letter") - 1.0).abs() < 1e-9);
        assert_eq!(trigram_similarity("abc", "xyz"), 0.0);
        assert_eq!(trigram_similarity("", "xyz"), 0.0);
    }
}
