//! Date-range refinement over a timestamp attribute.

use std::cell::{OnceCell, RefCell};
use std::fmt;
use std::rc::Rc;

use common::facet_config::{ContainerHandle, WidgetSpec};
use common::search_query::{NumericOperator, SearchParameters, SearchQuery};
use common::search_result::FacetStats;
use common::timestamp_boundary::{Timestamp, TimezoneMode};
use serde::{Deserialize, Serialize};

use super::lifecycle::Lifecycle;
use super::{RefinementWidget, SearchHelper, WidgetContext, WidgetRenderer, request_search};


/// Committed bounds; both are whole Unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
}

impl DateRange {
    pub const EMPTY: DateRange = DateRange { start: None, end: None };

    pub fn new(start: Option<Timestamp>, end: Option<Timestamp>) -> Self {
        Self { start, end }
    }

    pub fn state(&self) -> RangeState {
        match (self.start, self.end) {
            (None, None) => RangeState::Empty,
            (Some(_), None) => RangeState::PartialStart,
            (None, Some(_)) => RangeState::PartialEnd,
            (Some(_), Some(_)) => RangeState::FullRange,
        }
    }

    fn from_query(query: &SearchQuery, attribute: &str) -> Self {
        Self {
            start: query.numeric_refinement(attribute, NumericOperator::GreaterOrEqual),
            end: query.numeric_refinement(attribute, NumericOperator::LessOrEqual),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangeState {
    Empty,
    PartialStart,
    PartialEnd,
    FullRange,
}

pub type RefineRange = Rc<dyn Fn(DateRange)>;

#[derive(Clone)]
pub struct DateRangeRenderState {
    pub attribute: String,
    pub container: ContainerHandle,
    pub timezone: TimezoneMode,
    pub current: DateRange,
    pub state: RangeState,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Advisory upper bound for the start input: the committed end date.
    pub start_max: Option<String>,
    /// Advisory lower bound for the end input: the committed start date.
    pub end_min: Option<String>,
    /// Bounds of the attribute across the current results, when the backend reports them.
    pub range: Option<FacetStats>,
    pub refine: RefineRange,
}

impl fmt::Debug for DateRangeRenderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DateRangeRenderState")
            .field("attribute", &self.attribute)
            .field("current", &self.current)
            .field("state", &self.state)
            .field("start_date", &self.start_date)
            .field("end_date", &self.end_date)
            .field("start_max", &self.start_max)
            .field("end_min", &self.end_min)
            .finish_non_exhaustive()
    }
}

pub struct DateRangeRefinement<R> {
    attribute: String,
    container: ContainerHandle,
    timezone: TimezoneMode,
    renderer: R,
    committed: Rc<RefCell<DateRange>>,
    refine: OnceCell<RefineRange>,
    lifecycle: Lifecycle,
}

impl<R: WidgetRenderer<DateRangeRenderState>> DateRangeRefinement<R> {
    pub fn new(attribute: impl Into<String>, container: ContainerHandle, timezone: TimezoneMode, renderer: R) -> Self {
        Self {
            attribute: attribute.into(),
            container,
            timezone,
            renderer,
            committed: Rc::new(RefCell::new(DateRange::EMPTY)),
            refine: OnceCell::new(),
            lifecycle: Lifecycle::default(),
        }
    }

    pub fn from_spec(spec: &WidgetSpec, renderer: R) -> Self {
        Self::new(spec.attribute.clone(), spec.container.clone(), spec.hints.timezone, renderer)
    }

    pub fn timezone(&self) -> TimezoneMode {
        self.timezone
    }

    pub fn committed(&self) -> DateRange {
        *self.committed.borrow()
    }

    /// Created on first use and kept for the widget's lifetime.
    fn refine_fn(&self, context: &WidgetContext) -> RefineRange {
        let refine = self.refine.get_or_init(|| {
            let helper = Rc::clone(&context.helper);
            let committed = Rc::clone(&self.committed);
            let attribute = self.attribute.clone();
            let refine: RefineRange = Rc::new(move |range: DateRange| {
                *committed.borrow_mut() = range;
                {
                    let mut helper = helper.borrow_mut();
                    let query = helper.query_mut();
                    query.remove_numeric_refinements(&attribute);
                    if let Some(start) = range.start {
                        query.add_numeric_refinement(&attribute, NumericOperator::GreaterOrEqual, start);
                    }
                    if let Some(end) = range.end {
                        query.add_numeric_refinement(&attribute, NumericOperator::LessOrEqual, end);
                    }
                }
                tracing::debug!("Refined {} to {:?}", attribute, range.state());
                request_search(&helper);
            });
            refine
        });
        Rc::clone(refine)
    }

    /// Adopts refinements changed outside the widget, e.g. a cleared filter or a restored URL.
    fn sync_from_helper(&self, context: &WidgetContext) {
        let external = DateRange::from_query(context.helper.borrow().query(), &self.attribute);
        let mut committed = self.committed.borrow_mut();
        if *committed != external {
            tracing::debug!("{} changed outside the widget: {:?} -> {:?}", self.attribute, committed.state(), external.state());
            *committed = external;
        }
    }

    fn date_string(&self, timestamp: Option<Timestamp>) -> Option<String> {
        let timestamp = timestamp?;
        match self.timezone.date_string(timestamp) {
            Ok(date) => Some(date),
            Err(e) => {
                tracing::warn!("Cannot display bound of {}: {}", self.attribute, e);
                None
            }
        }
    }
}

impl<R: WidgetRenderer<DateRangeRenderState>> RefinementWidget for DateRangeRefinement<R> {
    type RenderState = DateRangeRenderState;

    fn attribute(&self) -> &str {
        &self.attribute
    }

    fn init(&mut self, context: &WidgetContext) {
        if !self.lifecycle.begin_init(&self.attribute) {
            return;
        }
        self.sync_from_helper(context);
        let state = self.get_widget_render_state(context);
        self.renderer.render(&self.container, &state, true);
    }

    fn render(&mut self, context: &WidgetContext) {
        if !self.lifecycle.can_render(&self.attribute) || !self.lifecycle.accept_request(&self.attribute, context.request_id) {
            return;
        }
        self.sync_from_helper(context);
        let state = self.get_widget_render_state(context);
        self.renderer.render(&self.container, &state, false);
    }

    fn dispose(&mut self, context: &WidgetContext) {
        if !self.lifecycle.begin_dispose(&self.attribute) {
            return;
        }
        self.renderer.unmount(&self.container);
        context.helper.borrow_mut().query_mut().remove_numeric_refinements(&self.attribute);
        *self.committed.borrow_mut() = DateRange::EMPTY;
        self.refine.take();
    }

    fn get_widget_render_state(&self, context: &WidgetContext) -> DateRangeRenderState {
        let current = self.committed();
        let start_date = self.date_string(current.start);
        let end_date = self.date_string(current.end);
        DateRangeRenderState {
            attribute: self.attribute.clone(),
            container: self.container.clone(),
            timezone: self.timezone,
            current,
            state: current.state(),
            start_max: end_date.clone(),
            end_min: start_date.clone(),
            start_date,
            end_date,
            range: context.results.as_ref().and_then(|results| results.facet(&self.attribute)).and_then(|facet| facet.stats),
            refine: self.refine_fn(context),
        }
    }

    /// Commits go through `refine`, so nothing is contributed here.
    fn get_widget_search_parameters(&self, params: SearchParameters, _ui_state: &SearchQuery) -> SearchParameters {
        params
    }
}
