//! Record models
//!
//! Canonical shapes of the rows held by the record store and of the
//! view-ready rows the aggregation queries return.

use chrono::{DateTime, NaiveDate, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use sqlx::types::Json;

use crate::Error;

/// Parliamentary chamber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum House {
    /// House of Representatives
    Hor,
    Senate,
}

impl House {
    pub fn as_str(&self) -> &'static str {
        match self {
            House::Hor => "hor",
            House::Senate => "senate",
        }
    }

    /// Parse a filter value; unrecognised chambers are ignored by callers
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "hor" | "house" | "reps" => Some(House::Hor),
            "senate" => Some(House::Senate),
            _ => None,
        }
    }
}

/// Discriminator of a speech part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartKind {
    Speech,
    FirstReading,
    Division,
    Interjection,
    Continuation,
}

impl PartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartKind::Speech => "speech",
            PartKind::FirstReading => "first_reading",
            PartKind::Division => "division",
            PartKind::Interjection => "interjection",
            PartKind::Continuation => "continuation",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "speech" => Some(PartKind::Speech),
            "first_reading" => Some(PartKind::FirstReading),
            "division" => Some(PartKind::Division),
            "interjection" => Some(PartKind::Interjection),
            "continuation" => Some(PartKind::Continuation),
            _ => None,
        }
    }
}

impl TryFrom<String> for House {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        House::from_str(&value).ok_or_else(|| Error::InvalidInput(format!("unknown house: {value}")))
    }
}

impl TryFrom<String> for PartKind {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PartKind::from_str(&value)
            .ok_or_else(|| Error::InvalidInput(format!("unknown part type: {value}")))
    }
}

/// A parliamentary member who may be attributed speech parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Talker {
    pub id: String,
    pub name: String,
    pub electorate: Option<String>,
    pub party: Option<String>,
    #[serde(default)]
    pub divisiveness: Option<f64>,
    #[serde(default)]
    pub bill_divisiveness: Option<f64>,
}

/// One utterance fragment within a speech (canonical schema)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SpeechPart {
    pub speech_id: String,
    /// Position of this fragment within its speech; 0 is the head part
    pub part_seq: i64,
    /// Position of the speech within its sub-debate
    pub speech_seq: i64,
    /// Chamber/debate sequence within the sitting day
    pub debate_seq: i64,
    pub subdebate_1_seq: i64,
    pub subdebate_2_seq: i64,
    pub debate_title: Option<String>,
    pub debate_category: Option<String>,
    pub subdebate_1_title: Option<String>,
    pub subdebate_2_title: Option<String>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type", try_from = "String")]
    pub kind: PartKind,
    #[sqlx(try_from = "String")]
    pub house: House,
    pub date: NaiveDate,
    pub bill_ids: Json<Vec<String>>,
    pub content: String,
    pub talker_id: Option<String>,
    pub part_type: Option<String>,
}

impl SpeechPart {
    /// Head parts represent the whole speech in summaries
    pub fn is_head(&self) -> bool {
        self.part_seq == 0
    }

    /// Title shown for the debate this part belongs to
    pub fn display_title(&self) -> Option<&str> {
        self.subdebate_1_title
            .as_deref()
            .or(self.debate_title.as_deref())
    }
}

/// Sentiment annotation of a speech
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SpeechStats {
    pub speech_id: String,
    pub summary: Option<String>,
    pub stance: Option<f64>,
    /// NULL when the speech was never annotated
    pub tone: Option<Json<Vec<String>>>,
}

/// Talker fields joined onto a part; every field is absent when the part
/// has no speaker or the talker record is missing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TalkerInfo {
    pub talker_name: Option<String>,
    pub talker_party: Option<String>,
    pub talker_electorate: Option<String>,
}

/// A speech part enriched with its talker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PartWithTalker {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub part: SpeechPart,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub talker: TalkerInfo,
}

/// Share of head parts attributed to one party
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyShare {
    pub party: String,
    pub count: u64,
    pub proportion: f64,
}

/// Party shares, largest first; serialized as an ordered `{party: percent}` map
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "std::collections::BTreeMap<String, f64>")]
pub struct PartyProportions(pub Vec<PartyShare>);

impl PartyProportions {
    pub fn get(&self, party: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|share| share.party == party)
            .map(|share| share.proportion)
    }

    /// Party with the largest share, if any
    pub fn largest(&self) -> Option<&PartyShare> {
        self.0.first()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for PartyProportions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for share in &self.0 {
            map.serialize_entry(&share.party, &share.proportion)?;
        }
        map.end()
    }
}

impl From<std::collections::BTreeMap<String, f64>> for PartyProportions {
    fn from(map: std::collections::BTreeMap<String, f64>) -> Self {
        let mut shares: Vec<PartyShare> = map
            .into_iter()
            .map(|(party, proportion)| PartyShare {
                party,
                count: 0,
                proportion,
            })
            .collect();
        shares.sort_by(|a, b| b.proportion.total_cmp(&a.proportion));
        PartyProportions(shares)
    }
}

/// Speech counts per chamber on one sitting date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverTimeRow {
    pub date: NaiveDate,
    pub hor: u64,
    pub senate: u64,
}

impl OverTimeRow {
    pub fn zero(date: NaiveDate) -> Self {
        Self {
            date,
            hor: 0,
            senate: 0,
        }
    }
}

/// A talker ranked by number of speeches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerRow {
    pub id: String,
    pub name: Option<String>,
    pub party: Option<String>,
    pub electorate: Option<String>,
    pub count: u64,
    pub house: House,
    /// Stance of the talker's first speech in reading order, when annotated
    pub stance: Option<f64>,
}

/// Parts given on one sitting date, in reading order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub parts: Vec<PartWithTalker>,
}

/// Per-speech sentiment joined with its talker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRow {
    pub talker_id: String,
    pub speech_id: String,
    pub name: Option<String>,
    pub party: Option<String>,
    pub electorate: Option<String>,
    pub house: House,
    pub stance: f64,
    /// Tone tags; None when the speech carries no tone annotation
    pub tone: Option<Vec<String>>,
    /// Mean tone positivity; None when there is no tone annotation
    pub tone_value: Option<f64>,
}

/// The five facets summarising one bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillOverview {
    pub party_speech_proportions: PartyProportions,
    pub speeches_over_time: Vec<OverTimeRow>,
    pub top_speakers: Vec<SpeakerRow>,
    pub speech_list: Vec<DayBucket>,
    pub sentiment: Vec<SentimentRow>,
}

impl BillOverview {
    /// Title of the bill: the display title of the earliest listed part
    pub fn title(&self) -> Option<&str> {
        self.speech_list
            .last()
            .and_then(|bucket| bucket.parts.first())
            .and_then(|entry| entry.part.display_title())
    }
}

/// Materialized overview of one bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillOverviewDoc {
    pub bill_id: String,
    #[serde(flatten)]
    pub overview: BillOverview,
    pub updated_at: DateTime<Utc>,
}
