//! HTTP API handlers

pub mod bills;
pub mod buildinfo;
pub mod health;
pub mod members;
pub mod options;
pub mod speeches;

pub use bills::{
    bill_lookup, bill_overview, bill_sentiment, bills_detailed, bills_discussion, bills_summary,
    list_bills, party_proportions, speakers, divisiveness,
};
pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use members::{get_member, list_members, search_talkers, talker_speeches};
pub use options::get_filter_options;
pub use speeches::{get_speech, list_speeches};

use tokio_util::sync::DropGuard;

use crate::params::{ParamMap, QueryFilters};
use crate::store::QueryContext;
use crate::AppState;

/// Query-string parameters and query context of one request. Dropping the
/// scope (including when the client disconnects and the handler future is
/// dropped) cancels the request's outstanding queries.
pub(crate) struct RequestScope {
    pub params: ParamMap,
    pub ctx: QueryContext,
    _guard: DropGuard,
}

impl RequestScope {
    pub fn new(state: &AppState, pairs: Vec<(String, String)>) -> Self {
        let ctx = state.store.context();
        let guard = ctx.drop_guard();
        Self {
            params: ParamMap::from(pairs),
            ctx,
            _guard: guard,
        }
    }

    pub fn filters(&self) -> QueryFilters {
        QueryFilters::from_params(&self.params)
    }
}
