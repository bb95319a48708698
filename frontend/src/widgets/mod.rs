//! Refinement widgets and the lifecycle protocol the search orchestrator drives them through.
//!
//! The orchestrator calls `init` once before the first search, `render` after every result set,
//! and `dispose` once on teardown. Widgets never own the event loop: committing a refinement
//! mutates the shared [`SearchHelper`] and asks it to search, and the answer comes back through a
//! later `render`. The helper is never borrowed while the orchestrator is notified.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use common::facet_config::ContainerHandle;
use common::search_query::{SearchParameters, SearchQuery};
use common::search_result::SearchResults;

pub mod date_input;
pub mod date_range;
pub mod lifecycle;
pub mod refinement_list;

pub use date_range::{DateRange, DateRangeRefinement, DateRangeRenderState, RangeState};
pub use refinement_list::{RefinementList, RefinementListItem, RefinementListRenderState};


/// Orchestrator-owned search state the widgets refine.
pub trait SearchHelper {
    fn query(&self) -> &SearchQuery;
    fn query_mut(&mut self) -> &mut SearchQuery;
    /// Records a search of the current query. The returned dispatch notifies the orchestrator and
    /// must run after the helper is released; [`request_search`] does both.
    fn search(&mut self) -> SearchDispatch;
}

pub type SharedHelper = Rc<RefCell<dyn SearchHelper>>;

/// Deferred search notification.
#[must_use]
#[derive(Default)]
pub struct SearchDispatch(Option<Box<dyn FnOnce()>>);

impl SearchDispatch {
    pub fn new(notify: impl FnOnce() + 'static) -> Self {
        Self(Some(Box::new(notify)))
    }

    pub fn run(self) {
        if let Some(notify) = self.0 {
            notify();
        }
    }
}

/// Requests a search and notifies the orchestrator once the helper is no longer borrowed, so the
/// notification may read the helper or render widgets synchronously.
pub fn request_search(helper: &SharedHelper) {
    let dispatch = helper.borrow_mut().search();
    dispatch.run();
}

/// What the orchestrator hands to every protocol call.
#[derive(Clone)]
pub struct WidgetContext {
    pub helper: SharedHelper,
    pub results: Option<Rc<SearchResults>>,
    /// Id of the search `results` answer; newer searches have larger ids.
    pub request_id: Option<u64>,
}

impl WidgetContext {
    pub fn new(helper: SharedHelper) -> Self {
        Self { helper, results: None, request_id: None }
    }

    pub fn with_results(&self, results: SearchResults, request_id: Option<u64>) -> Self {
        Self { helper: Rc::clone(&self.helper), results: Some(Rc::new(results)), request_id }
    }
}

/// Draws a widget's render state into its container.
pub trait WidgetRenderer<S> {
    fn render(&mut self, container: &ContainerHandle, state: &S, is_first_render: bool);

    fn unmount(&mut self, _container: &ContainerHandle) {}
}

impl<S, F> WidgetRenderer<S> for F
where
    F: FnMut(&ContainerHandle, &S, bool),
{
    fn render(&mut self, container: &ContainerHandle, state: &S, is_first_render: bool) {
        self(container, state, is_first_render)
    }
}

#[derive(Debug, Clone)]
pub enum WidgetRenderState {
    DateRange(DateRangeRenderState),
    RefinementList(RefinementListRenderState),
}

impl From<DateRangeRenderState> for WidgetRenderState {
    fn from(state: DateRangeRenderState) -> Self {
        WidgetRenderState::DateRange(state)
    }
}

impl From<RefinementListRenderState> for WidgetRenderState {
    fn from(state: RefinementListRenderState) -> Self {
        WidgetRenderState::RefinementList(state)
    }
}

/// Render states of all widgets, keyed by attribute path.
#[derive(Debug, Clone, Default)]
pub struct GlobalRenderState {
    entries: BTreeMap<String, WidgetRenderState>,
}

impl GlobalRenderState {
    pub fn get(&self, attribute: &str) -> Option<&WidgetRenderState> {
        self.entries.get(attribute)
    }

    /// Sets one attribute's entry; other widgets' entries are left alone.
    pub fn insert(&mut self, attribute: impl Into<String>, state: WidgetRenderState) {
        self.entries.insert(attribute.into(), state);
    }

    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub trait RefinementWidget {
    type RenderState: Clone + Into<WidgetRenderState>;

    fn attribute(&self) -> &str;

    /// Called once before the first search; renders with `is_first_render = true`.
    fn init(&mut self, context: &WidgetContext);

    /// Called after every result set change; renders with `is_first_render = false`.
    fn render(&mut self, context: &WidgetContext);

    /// Called once on teardown. No other method may be called afterwards.
    fn dispose(&mut self, context: &WidgetContext);

    /// Projection of the results and committed refinements. Repeated calls return the same
    /// `refine` callback.
    fn get_widget_render_state(&self, context: &WidgetContext) -> Self::RenderState;

    fn get_render_state(&self, mut global: GlobalRenderState, context: &WidgetContext) -> GlobalRenderState {
        global.insert(self.attribute(), self.get_widget_render_state(context).into());
        global
    }

    fn get_widget_search_parameters(&self, params: SearchParameters, ui_state: &SearchQuery) -> SearchParameters;
}
