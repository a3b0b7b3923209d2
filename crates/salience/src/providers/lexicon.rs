//! Lexicon-based sentiment analysis
//!
//! Fast, model-free valence and arousal estimation from weighted word
//! patterns. Valence averages the weights of matched emotion words and is
//! partially flipped by negations; arousal averages intensity markers
//! (urgent words, exclamation marks, shouting, intensifiers, long texts).

use std::sync::LazyLock;

use regex::Regex;

use crate::providers::{Sentiment, SentimentAnalyzer};

/// Arousal reported when no intensity marker is present
pub const BASELINE_AROUSAL: f64 = 0.3;
/// Valence multiplier applied when a negation is present
const NEGATION_FLIP: f64 = -0.7;
/// Texts longer than this many words add a small arousal marker
const LONG_TEXT_WORDS: usize = 50;

fn compile(specs: &[(&str, f64)]) -> Vec<(Regex, f64)> {
    specs
        .iter()
        .map(|(pattern, weight)| (Regex::new(pattern).expect("valid lexicon pattern"), *weight))
        .collect()
}

static POSITIVE_WORDS: LazyLock<Vec<(Regex, f64)>> = LazyLock::new(|| {
    compile(&[
        (r"\b(ecstatic|overjoyed|thrilled|elated|euphoric|exhilarated)\b", 0.9),
        (r"\b(breakthrough|discovery|amazing|incredible|fantastic|wonderful)\b", 0.85),
        (r"\b(love|adore|perfect|brilliant|excellent|outstanding)\b", 0.8),
        (r"\b(happy|joy|pleased|glad|delighted|excited)\b", 0.7),
        (r"\b(good|great|nice|helpful|positive|successful)\b", 0.6),
        (r"\b(like|enjoy|appreciate|satisfied|content)\b", 0.5),
    ])
});

static NEGATIVE_WORDS: LazyLock<Vec<(Regex, f64)>> = LazyLock::new(|| {
    compile(&[
        (r"\b(devastated|horrible|terrible|catastrophic|disaster|nightmare)\b", 0.9),
        (r"\b(hate|despise|furious|enraged|disgusted|appalled)\b", 0.85),
        (r"\b(awful|dreadful|miserable|tragic|horrific)\b", 0.8),
        (r"\b(angry|sad|upset|disappointed|frustrated|annoyed)\b", 0.7),
        (r"\b(bad|poor|wrong|problem|issue|error)\b", 0.6),
        (r"\b(dislike|concerned|worried|anxious|stressed)\b", 0.5),
    ])
});

/// Matched against the lowercased text
static AROUSAL_MARKERS: LazyLock<Vec<(Regex, f64)>> = LazyLock::new(|| {
    compile(&[
        (r"!{2,}|\?{2,}", 0.9),
        (r"\b(shocking|stunning|explosive|overwhelming|intense)\b", 0.85),
        (r"\b(exciting|surprising|unexpected|dramatic|significant)\b", 0.7),
        (r"\b(quickly|suddenly|immediately|urgent|now)\b", 0.6),
        (r"!", 0.5),
    ])
});

/// Matched case-sensitively against the raw text
static ALARM_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(URGENT|EMERGENCY|CRITICAL|IMPORTANT)\b").expect("valid alarm pattern")
});

static SHOUTED_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]{3,}\b").expect("valid caps pattern"));

static INTENSIFIERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\b(very|extremely|incredibly|absolutely|totally|completely)\b",
        r"\b(really|quite|pretty|fairly|rather|somewhat)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid intensifier pattern"))
    .collect()
});

static NEGATIONS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\b(not|no|never|neither|nobody|nothing|nowhere)\b",
        r"\b(don't|doesn't|didn't|won't|wouldn't|can't|couldn't)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid negation pattern"))
    .collect()
});

/// Sentiment analyzer backed by a fixed emotion lexicon
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconAnalyzer;

impl LexiconAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Valence in [-1, 1]; 0.0 when no emotion word matches
    pub fn valence(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        let has_negation = NEGATIONS.iter().any(|p| p.is_match(&lower));

        let (positive_score, positive_count) = weighted_matches(&POSITIVE_WORDS, &lower);
        let (negative_score, negative_count) = weighted_matches(&NEGATIVE_WORDS, &lower);

        let total = positive_count + negative_count;
        if total == 0 {
            return 0.0;
        }

        let mut valence = (positive_score - negative_score) / total as f64;
        if has_negation {
            valence *= NEGATION_FLIP;
        }
        valence.clamp(-1.0, 1.0)
    }

    /// Arousal in [0, 1]; [`BASELINE_AROUSAL`] when no marker is present
    pub fn arousal(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();

        let (mut score, mut count) = weighted_matches(&AROUSAL_MARKERS, &lower);

        let alarms = ALARM_WORDS.find_iter(text).count();
        score += 0.9 * alarms as f64;
        count += alarms;

        let shouted = SHOUTED_WORD.find_iter(text).count();
        score += 0.8 * shouted as f64;
        count += shouted;

        for pattern in INTENSIFIERS.iter() {
            if pattern.is_match(&lower) {
                score += 0.3;
                count += 1;
            }
        }

        if lower.split_whitespace().count() > LONG_TEXT_WORDS {
            score += 0.2;
            count += 1;
        }

        if count == 0 {
            return BASELINE_AROUSAL;
        }
        (score / count as f64).clamp(0.0, 1.0)
    }
}

impl SentimentAnalyzer for LexiconAnalyzer {
    fn analyze(&self, text: &str) -> Sentiment {
        Sentiment::new(self.valence(text), self.arousal(text))
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}

fn weighted_matches(patterns: &[(Regex, f64)], text: &str) -> (f64, usize) {
    patterns
        .iter()
        .fold((0.0, 0), |(score, count), (pattern, weight)| {
            let matches = pattern.find_iter(text).count();
            (score + weight * matches as f64, count + matches)
        })
}

/// Circumplex label for a valence/arousal pair
pub fn emotion_label(valence: f64, arousal: f64) -> &'static str {
    if arousal > 0.6 {
        if valence > 0.3 {
            if arousal > 0.8 { "excited" } else { "happy" }
        } else if valence < -0.3 {
            if arousal > 0.8 { "angry" } else { "frustrated" }
        } else {
            "surprised"
        }
    } else if valence > 0.3 {
        "content"
    } else if valence < -0.3 {
        "sad"
    } else {
        "neutral"
    }
}
