//! Relevance scoring for place-search results.
//!
//! The providers return everything that vaguely matches; the auditors need
//! the store they typed on top. Scores are additive and heuristic — the
//! absolute value only matters against the thresholds used by the search
//! orchestration (>100 early return, <60 triggers recommendations).

/// Generic venue words that indicate a plausible landmark match.
const VENUE_WORDS: &[&str] = &[
    "plaza", "mall", "center", "tower", "store", "广场", "商场", "中心", "大厦", "店",
];

/// Score one result against the search keyword.
pub fn relevance_score(keyword: &str, name: &str, address: &str, brands: &[String]) -> f64 {
    let mut score: f64 = 0.0;
    let keyword_lower = keyword.to_lowercase();
    let name_lower = name.to_lowercase();
    let address_lower = address.to_lowercase();

    // 1. exact name match (top score)
    if keyword_lower == name_lower {
        score += 100.0;
    }
    // 2. name contains the whole keyword
    else if name_lower.contains(&keyword_lower) {
        score += 80.0;
    }
    // 3. shared tokens between keyword and name
    else {
        for part in tokens(&keyword_lower) {
            if name_lower.contains(part) {
                score += 30.0;
            }
        }
    }

    // 4. address relevance: keyword tokens appearing in the address
    for part in tokens(&keyword_lower) {
        if address_lower.contains(part) {
            score += 15.0;
        }
    }

    // 5. distinctive tokens found anywhere in name+address, generic venue
    //    words count for less
    let haystack = format!("{}{}", name_lower, address_lower);
    for part in tokens(&keyword_lower) {
        if haystack.contains(part) {
            score += 40.0;
        } else if VENUE_WORDS.iter().any(|w| haystack.contains(w)) {
            score += 15.0;
        }
    }

    // 6. brand match bonus
    for brand in brands {
        let brand_lower = brand.to_lowercase();
        if keyword_lower.contains(&brand_lower) && name_lower.contains(&brand_lower) {
            score += 25.0;
        }
    }

    // 7. wrong-chain penalty: the keyword names a brand but the result is a
    //    different shop (mild, the landmark part may still be right)
    if let Some(brand) = brands
        .iter()
        .find(|b| keyword_lower.contains(&b.to_lowercase()))
        && !name_lower.contains(&brand.to_lowercase())
    {
        score -= 20.0;
    }

    score.max(0.0)
}

/// Whitespace tokens of at least two characters.
fn tokens(s: &str) -> impl Iterator<Item = &str> {
    s.split_whitespace().filter(|p| p.chars().count() >= 2)
}

/// The first configured brand contained in the keyword, if any.
pub fn find_brand<'a>(keyword: &str, brands: &'a [String]) -> Option<&'a str> {
    let keyword_lower = keyword.to_lowercase();
    brands
        .iter()
        .find(|b| keyword_lower.contains(&b.to_lowercase()))
        .map(|s| s.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brands() -> Vec<String> {
        vec!["Goodme".into(), "Starbucks".into(), "KFC".into()]
    }

    #[test]
    fn exact_match_outranks_partial() {
        let exact = relevance_score("Starbucks Plaza", "Starbucks Plaza", "", &brands());
        let contains = relevance_score("Starbucks Plaza", "Starbucks Plaza East Gate", "", &brands());
        let unrelated = relevance_score("Starbucks Plaza", "Lucky Noodles", "", &brands());

        assert!(exact > contains);
        assert!(contains > unrelated);
    }

    #[test]
    fn wrong_brand_is_penalized() {
        let right = relevance_score("KFC Riverside", "KFC Riverside Mall", "", &brands());
        let wrong = relevance_score("KFC Riverside", "Starbucks Riverside Mall", "", &brands());
        assert!(right > wrong);
    }

    #[test]
    fn score_never_negative() {
        let s = relevance_score("KFC", "Completely Different", "", &brands());
        assert!(s >= 0.0);
    }

    #[test]
    fn address_tokens_add_signal() {
        let with_addr = relevance_score("Binjiang office", "Some Tower", "Binjiang district", &brands());
        let without = relevance_score("Binjiang office", "Some Tower", "Xihu district", &brands());
        assert!(with_addr > without);
    }

    #[test]
    fn brand_detection() {
        assert_eq!(find_brand("goodme west lake", &brands()), Some("Goodme"));
        assert_eq!(find_brand("random place", &brands()), None);
    }
}
