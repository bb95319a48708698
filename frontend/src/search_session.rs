//! Orchestrator-side search state that widgets refine.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use common::search_query::SearchQuery;

use crate::widgets::{SearchDispatch, SearchHelper};

type SearchCallback = Box<dyn FnMut(&SearchQuery, u64)>;

/// Delivers searches to the callback in request order. A search requested from inside the
/// callback is queued and delivered when the callback returns.
struct SearchNotifier {
    on_search: RefCell<SearchCallback>,
    queue: RefCell<VecDeque<(SearchQuery, u64)>>,
}

impl SearchNotifier {
    fn notify(&self, query: SearchQuery, request_id: u64) {
        self.queue.borrow_mut().push_back((query, request_id));
        let Ok(mut on_search) = self.on_search.try_borrow_mut() else {
            tracing::debug!("Search {} queued behind a running callback", request_id);
            return;
        };
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some((query, request_id)) = next else { break };
            (&mut *on_search)(&query, request_id);
        }
    }
}


/// Holds the current [`SearchQuery`] and hands every requested search to a callback together
/// with a fresh, increasing request id.
#[derive(Default)]
pub struct SearchSession {
    query: SearchQuery,
    searches_requested: u64,
    last_request_id: Option<u64>,
    on_search: Option<Rc<SearchNotifier>>,
}

impl fmt::Debug for SearchSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchSession")
            .field("query", &self.query)
            .field("searches_requested", &self.searches_requested)
            .field("last_request_id", &self.last_request_id)
            .finish_non_exhaustive()
    }
}

impl SearchSession {
    pub fn new(query: SearchQuery) -> Self {
        Self { query, ..Default::default() }
    }

    pub fn with_on_search(mut self, on_search: impl FnMut(&SearchQuery, u64) + 'static) -> Self {
        self.on_search = Some(Rc::new(SearchNotifier {
            on_search: RefCell::new(Box::new(on_search)),
            queue: RefCell::new(VecDeque::new()),
        }));
        self
    }

    pub fn shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut SearchQuery {
        &mut self.query
    }

    /// Replaces the query without searching, e.g. when restoring state from the URL.
    pub fn restore(&mut self, query: SearchQuery) {
        self.query = query;
    }

    pub fn searches_requested(&self) -> u64 {
        self.searches_requested
    }

    pub fn last_request_id(&self) -> Option<u64> {
        self.last_request_id
    }
}

impl SearchHelper for SearchSession {
    fn query(&self) -> &SearchQuery {
        &self.query
    }

    fn query_mut(&mut self) -> &mut SearchQuery {
        &mut self.query
    }

    fn search(&mut self) -> SearchDispatch {
        self.searches_requested += 1;
        let request_id = self.last_request_id.map_or(1, |id| id + 1);
        self.last_request_id = Some(request_id);
        tracing::debug!("Search {} requested", request_id);
        let Some(notifier) = self.on_search.clone() else { return SearchDispatch::default() };
        let query = self.query.clone();
        SearchDispatch::new(move || notifier.notify(query, request_id))
    }
}
