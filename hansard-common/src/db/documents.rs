//! Speech part documents as found in exported collections
//!
//! Two document shapes exist: the older flat `speeches` export (one `seq`
//! per fragment, a single optional `bill_id`) and the nested `parts` export
//! (full debate/sub-debate sequencing and a `bill_ids` array). Both are
//! normalized into [`SpeechPart`] so nothing downstream cares which one a
//! record came from.

use serde::Deserialize;
use sqlx::types::Json;

use super::models::{House, PartKind, SpeechPart};
use crate::time::parse_filter_date;
use crate::{Error, Result};

/// Either document shape; nested documents are recognised by `part_seq`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PartDocument {
    Nested(NestedPartDocument),
    Flat(FlatPartDocument),
}

/// Document from the `parts` export
#[derive(Debug, Clone, Deserialize)]
pub struct NestedPartDocument {
    pub speech_id: String,
    pub part_seq: i64,
    #[serde(default)]
    pub speech_seq: i64,
    #[serde(default)]
    pub debate_seq: i64,
    #[serde(default)]
    pub subdebate_1_seq: i64,
    #[serde(default)]
    pub subdebate_2_seq: i64,
    #[serde(default)]
    pub debate_title: Option<String>,
    #[serde(default)]
    pub debate_category: Option<String>,
    #[serde(default)]
    pub subdebate_1_title: Option<String>,
    #[serde(default)]
    pub subdebate_2_title: Option<String>,
    #[serde(rename = "type")]
    pub kind: PartKind,
    #[serde(default)]
    pub house: Option<House>,
    pub date: String,
    #[serde(default)]
    pub bill_ids: Vec<String>,
    #[serde(default, alias = "speech_content")]
    pub content: Option<String>,
    #[serde(default)]
    pub talker_id: Option<String>,
    #[serde(default)]
    pub part_type: Option<String>,
}

/// Document from the flat `speeches` export
#[derive(Debug, Clone, Deserialize)]
pub struct FlatPartDocument {
    pub speech_id: String,
    pub seq: i64,
    #[serde(default)]
    pub talker_id: Option<String>,
    #[serde(default)]
    pub bill_id: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "type")]
    pub kind: PartKind,
    #[serde(default)]
    pub debate_category: Option<String>,
    #[serde(default)]
    pub debate_title: Option<String>,
    #[serde(default)]
    pub debate_info: Option<String>,
    #[serde(default)]
    pub subdebate_title: Option<String>,
    #[serde(default)]
    pub subdebate_info: Option<String>,
    #[serde(default)]
    pub house: Option<House>,
    pub date: String,
}

impl PartDocument {
    pub fn speech_id(&self) -> &str {
        match self {
            PartDocument::Nested(doc) => &doc.speech_id,
            PartDocument::Flat(doc) => &doc.speech_id,
        }
    }

    /// Normalize into the canonical part shape
    pub fn into_part(self) -> Result<SpeechPart> {
        match self {
            PartDocument::Nested(doc) => doc.into_part(),
            PartDocument::Flat(doc) => doc.into_part(),
        }
    }
}

fn parse_document_date(speech_id: &str, raw: &str) -> Result<chrono::NaiveDate> {
    parse_filter_date(raw).ok_or_else(|| {
        Error::InvalidInput(format!("speech {speech_id}: unparseable date {raw:?}"))
    })
}

/// Drop blank ids and duplicates, keeping first-seen order
fn clean_bill_ids(ids: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        let id = id.trim().to_string();
        if !id.is_empty() && !cleaned.contains(&id) {
            cleaned.push(id);
        }
    }
    cleaned
}

impl NestedPartDocument {
    fn into_part(self) -> Result<SpeechPart> {
        let date = parse_document_date(&self.speech_id, &self.date)?;
        Ok(SpeechPart {
            speech_id: self.speech_id,
            part_seq: self.part_seq,
            speech_seq: self.speech_seq,
            debate_seq: self.debate_seq,
            subdebate_1_seq: self.subdebate_1_seq,
            subdebate_2_seq: self.subdebate_2_seq,
            debate_title: self.debate_title,
            debate_category: self.debate_category,
            subdebate_1_title: self.subdebate_1_title,
            subdebate_2_title: self.subdebate_2_title,
            kind: self.kind,
            house: self.house.unwrap_or(House::Hor),
            date,
            bill_ids: Json(clean_bill_ids(self.bill_ids)),
            content: self.content.unwrap_or_default(),
            talker_id: self.talker_id,
            part_type: self.part_type,
        })
    }
}

impl FlatPartDocument {
    fn into_part(self) -> Result<SpeechPart> {
        let date = parse_document_date(&self.speech_id, &self.date)?;
        let part_type = match self.kind {
            PartKind::Interjection | PartKind::Continuation => Some(self.kind.as_str().to_string()),
            _ => None,
        };
        Ok(SpeechPart {
            speech_id: self.speech_id,
            part_seq: self.seq,
            speech_seq: 0,
            debate_seq: 0,
            subdebate_1_seq: 0,
            subdebate_2_seq: 0,
            debate_title: self.debate_title,
            debate_category: self.debate_category,
            subdebate_1_title: self.subdebate_title,
            subdebate_2_title: None,
            kind: self.kind,
            house: self.house.unwrap_or(House::Hor),
            date,
            bill_ids: Json(clean_bill_ids(self.bill_id.into_iter().collect())),
            content: self.content,
            talker_id: self.talker_id,
            part_type,
        })
    }
}
