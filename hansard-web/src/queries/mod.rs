//! Aggregation queries over the record store
//!
//! Each query takes the store, a per-request [`QueryContext`](crate::store::QueryContext)
//! and normalized [`QueryFilters`](crate::params::QueryFilters), and runs entirely
//! in SQL so only the rows being returned leave the database.

pub mod bills;
pub mod filters;
pub mod members;
pub mod options;
pub mod party;
pub mod sentiment;
pub mod speakers;
pub mod speech_list;
pub mod speeches;
pub mod time_series;

pub use bills::{
    bill_discussion, bills_detailed, bills_list, BillDetailRow, BillDiscussionRow, BillListRow,
    BillTitleStrategy,
};
pub use members::{
    member_detail, members, talker_search, talker_speeches, MemberDetail, MemberRow,
};
pub use options::{filter_options, FilterOptions};
pub use party::party_speech_proportions;
pub use sentiment::sentiment_rows;
pub use speakers::{divisiveness_ranking, top_speakers, DivisivenessRow};
pub use speech_list::{bucket_by_day, speech_list};
pub use speeches::{speech_detail, speeches, SpeechDetail, SpeechListingPlan};
pub use time_series::{backfill, speeches_over_time};
