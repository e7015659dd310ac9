/// Matcher for `*` glob segments of path patterns (`*.txt`, `img_*_final.*`).
///
/// Only `*` is special; it matches any run of characters within one path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardComparer {
    pattern: Vec<char>,
    min_length: usize,
}

pub const ASTERISK: char = '*';

impl WildcardComparer {
    pub fn new(pattern: &str) -> Self {
        let mut chars: Vec<char> = Vec::with_capacity(pattern.len());
        for c in pattern.chars() {
            if c == ASTERISK && chars.last() == Some(&ASTERISK) {
                continue;
            }
            chars.push(c);
        }
        let min_length = chars.iter().filter(|c| **c != ASTERISK).count();
        Self {
            pattern: chars,
            min_length,
        }
    }

    pub fn pattern(&self) -> String {
        self.pattern.iter().collect()
    }

    pub fn matches(&self, value: &str) -> bool {
        let value: Vec<char> = value.chars().collect();
        if value.len() < self.min_length {
            return false;
        }
        let (p, v) = (self.pattern.len(), value.len());
        // dp[i][j]: pattern[..i] matches value[..j]
        let mut dp = vec![vec![false; v + 1]; p + 1];
        dp[0][0] = true;
        for i in 1..=p {
            if self.pattern[i - 1] == ASTERISK {
                dp[i][0] = dp[i - 1][0];
            }
        }
        for i in 1..=p {
            for j in 1..=v {
                dp[i][j] = if self.pattern[i - 1] == ASTERISK {
                    dp[i - 1][j] || dp[i][j - 1]
                } else {
                    dp[i - 1][j - 1] && self.pattern[i - 1] == value[j - 1]
                };
            }
        }
        dp[p][v]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments() {
        let w = WildcardComparer::new("*.txt");
        assert!(w.matches("a.txt"));
        assert!(w.matches(".txt"));
        assert!(!w.matches("a.txt.bak"));

        let w = WildcardComparer::new("img_**_final.*");
        assert_eq!(w.pattern(), "img_*_final.*");
        assert!(w.matches("img_2020_final.png"));
        assert!(!w.matches("img_2020.png"));
        assert!(WildcardComparer::new("*").matches(""));
    }
}
