//! Derived metric formulas
//!
//! Pure functions computing scalars from raw annotation fields:
//! - Tone positivity: fixed lookup table, averaged per speech
//! - Stance labeling: fixed ±0.2 thresholds
//! - Party proportions: percentage of the filtered total
//! - Divisiveness: pass-through of the precomputed talker score
//! - Sentiment grouping: one parameterized aggregation over per-speech rows

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::db::models::{House, SentimentRow};

/// Score used for unknown tone tags and for speeches without any tag
pub const NEUTRAL_TONE: f64 = 0.5;

/// Stance strictly above this is "In Favor"
pub const STANCE_FAVOR_THRESHOLD: f64 = 0.2;

/// Stance strictly below this is "Against"
pub const STANCE_AGAINST_THRESHOLD: f64 = -0.2;

/// Conduciveness of each tone tag to good discussion, 0 (bad) to 1 (good)
pub const TONE_POSITIVITY: [(&str, f64); 35] = [
    // Emotional / relational
    ("caring", 0.9),
    ("heartfelt", 0.7),
    ("nostalgic", 0.5),
    ("sentimental", 0.5),
    ("empathetic", 1.0),
    ("inspirational", 0.8),
    ("reassuring", 0.85),
    // Humorous / playful
    ("humorous", 0.7),
    ("sarcastic", 0.3),
    ("self_deprecating", 0.6),
    ("cheeky", 0.5),
    ("satirical", 0.4),
    ("deadpan", 0.4),
    // Assertive / persuasive
    ("confident", 0.7),
    ("persuasive", 0.6),
    ("confrontational", 0.1),
    ("aggressive", 0.0),
    ("motivational", 0.7),
    ("empowered", 0.7),
    // Intellectual / analytical
    ("reflective", 0.95),
    ("philosophical", 0.9),
    ("inquisitive", 1.0),
    ("objective", 1.0),
    ("didactic", 0.6),
    // Stylistic / rhetorical
    ("storytelling", 0.7),
    ("conversational", 1.0),
    ("formal", 0.8),
    ("poetic", 0.5),
    ("dramatic", 0.3),
    ("minimalist", 0.7),
    // Dark / intense
    ("somber", 0.2),
    ("melancholic", 0.2),
    ("ironic", 0.3),
    ("cynical", 0.1),
    ("foreboding", 0.0),
];

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Positivity weight of a single tone tag (unknown tags are neutral)
pub fn tone_positivity(tag: &str) -> f64 {
    TONE_POSITIVITY
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, score)| *score)
        .unwrap_or(NEUTRAL_TONE)
}

/// Aggregate tone score of a speech: mean of its tags, rounded to 2 decimals.
///
/// A speech with no tags scores exactly [`NEUTRAL_TONE`].
pub fn speech_tone_positivity<S: AsRef<str>>(tags: &[S]) -> f64 {
    if tags.is_empty() {
        return NEUTRAL_TONE;
    }
    let total: f64 = tags.iter().map(|tag| tone_positivity(tag.as_ref())).sum();
    round2(total / tags.len() as f64)
}

/// Qualitative label for a stance scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StanceLabel {
    #[serde(rename = "In Favor")]
    InFavor,
    #[serde(rename = "Against")]
    Against,
    #[serde(rename = "Neutral")]
    Neutral,
}

impl StanceLabel {
    /// Total over all reals; the thresholds are strict, NaN is Neutral
    pub fn from_stance(stance: f64) -> Self {
        if stance > STANCE_FAVOR_THRESHOLD {
            StanceLabel::InFavor
        } else if stance < STANCE_AGAINST_THRESHOLD {
            StanceLabel::Against
        } else {
            StanceLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StanceLabel::InFavor => "In Favor",
            StanceLabel::Against => "Against",
            StanceLabel::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for StanceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `count / total * 100` rounded to 2 decimals; zero total yields 0
pub fn proportion(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(count as f64 / total as f64 * 100.0)
}

/// Precomputed divisiveness, with non-finite values treated as absent
pub fn divisiveness(score: Option<f64>) -> Option<f64> {
    score.filter(|value| value.is_finite())
}

/// Granularity for sentiment scatter data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentGroupBy {
    /// One point per speech
    #[default]
    Speech,
    /// One point per talker
    Member,
    /// One point per party
    Party,
}

impl SentimentGroupBy {
    /// Parse a request value; returns None for anything unrecognised
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "speech" => Some(SentimentGroupBy::Speech),
            "member" => Some(SentimentGroupBy::Member),
            "party" => Some(SentimentGroupBy::Party),
            _ => None,
        }
    }

    /// Parse a request value, falling back to per-speech points
    pub fn parse_or_default(value: &str) -> Self {
        Self::from_str(value).unwrap_or_default()
    }
}

/// One point of the stance/tone scatter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentPoint {
    /// Speech id, talker id or party depending on the grouping
    pub key: String,
    pub talker_id: Option<String>,
    pub speech_id: Option<String>,
    pub name: Option<String>,
    pub party: Option<String>,
    pub house: Option<House>,
    pub stance: f64,
    pub tone_value: f64,
    /// Number of speeches contributing to this point
    pub count: u64,
}

#[derive(Default)]
struct GroupAccumulator {
    first: Option<usize>,
    stance_sum: f64,
    tone_values: Vec<f64>,
    count: u64,
}

/// Re-aggregate per-speech sentiment rows at the requested granularity.
///
/// Per speech, rows without a finite tone value are dropped. Per member or
/// party, the stance mean covers every row in the group while the tone mean
/// covers finite tone values only (neutral when there are none). Groups keep
/// the order in which their first row appears.
pub fn group_sentiment(rows: &[SentimentRow], group_by: SentimentGroupBy) -> Vec<SentimentPoint> {
    let key_of = |row: &SentimentRow| -> String {
        match group_by {
            SentimentGroupBy::Speech => row.speech_id.clone(),
            SentimentGroupBy::Member => row.talker_id.clone(),
            SentimentGroupBy::Party => row.party.clone().unwrap_or_else(|| UNKNOWN_PARTY.to_string()),
        }
    };

    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, GroupAccumulator> = HashMap::new();

    for (index, row) in rows.iter().enumerate() {
        let key = key_of(row);
        let group = groups.entry(key.clone()).or_insert_with(|| {
            order.push(key.clone());
            GroupAccumulator::default()
        });
        group.first.get_or_insert(index);
        group.stance_sum += row.stance;
        group.count += 1;
        if let Some(tone) = row.tone_value.filter(|value| value.is_finite()) {
            group.tone_values.push(tone);
        }
    }

    order
        .into_iter()
        .filter_map(|key| {
            let group = groups.remove(&key)?;
            let first = &rows[group.first?];
            match group_by {
                SentimentGroupBy::Speech => {
                    let tone_value = *group.tone_values.first()?;
                    Some(SentimentPoint {
                        key,
                        talker_id: Some(first.talker_id.clone()),
                        speech_id: Some(first.speech_id.clone()),
                        name: first.name.clone(),
                        party: first.party.clone(),
                        house: Some(first.house),
                        stance: first.stance,
                        tone_value,
                        count: 1,
                    })
                }
                SentimentGroupBy::Member | SentimentGroupBy::Party => {
                    let tone_value = if group.tone_values.is_empty() {
                        NEUTRAL_TONE
                    } else {
                        group.tone_values.iter().sum::<f64>() / group.tone_values.len() as f64
                    };
                    let is_member = group_by == SentimentGroupBy::Member;
                    Some(SentimentPoint {
                        talker_id: is_member.then(|| first.talker_id.clone()),
                        speech_id: None,
                        name: if is_member { first.name.clone() } else { None },
                        party: if is_member { first.party.clone() } else { Some(key.clone()) },
                        house: is_member.then_some(first.house),
                        stance: group.stance_sum / group.count as f64,
                        tone_value,
                        count: group.count,
                        key,
                    })
                }
            }
        })
        .collect()
}

/// Party label used when a talker has no recorded party
pub const UNKNOWN_PARTY: &str = "Unknown";
