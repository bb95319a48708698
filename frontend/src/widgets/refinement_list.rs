//! Checkbox list over the values of a facet.

use std::cell::{OnceCell, RefCell};
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use common::facet_config::{ContainerHandle, WidgetSpec};
use common::search_query::{SearchParameters, SearchQuery};
use common::search_result::FacetOriginalValue;

use super::lifecycle::Lifecycle;
use super::{RefinementWidget, SearchHelper, WidgetContext, WidgetRenderer, request_search};


#[derive(Debug, Clone, PartialEq)]
pub struct RefinementListItem {
    pub value: FacetOriginalValue,
    pub label: String,
    pub count: u64,
    pub is_refined: bool,
}

pub type RefineValue = Rc<dyn Fn(FacetOriginalValue)>;

#[derive(Clone)]
pub struct RefinementListRenderState {
    pub attribute: String,
    pub container: ContainerHandle,
    pub items: Vec<RefinementListItem>,
    pub searchable: bool,
    pub search_text: String,
    pub placeholder_key: Option<String>,
    pub can_refine: bool,
    pub refine: RefineValue,
}

impl fmt::Debug for RefinementListRenderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefinementListRenderState")
            .field("attribute", &self.attribute)
            .field("items", &self.items)
            .field("search_text", &self.search_text)
            .finish_non_exhaustive()
    }
}

pub struct RefinementList<R> {
    spec: WidgetSpec,
    renderer: R,
    search_text: RefCell<String>,
    refine: OnceCell<RefineValue>,
    lifecycle: Lifecycle,
}

impl<R: WidgetRenderer<RefinementListRenderState>> RefinementList<R> {
    pub fn new(spec: WidgetSpec, renderer: R) -> Self {
        Self { spec, renderer, search_text: RefCell::default(), refine: OnceCell::new(), lifecycle: Lifecycle::default() }
    }

    /// Narrows the offered values to those containing `text`; only for searchable attributes.
    pub fn search_for_facet_values(&mut self, text: &str, context: &WidgetContext) {
        if !self.spec.hints.searchable {
            tracing::debug!("{} is not searchable", self.spec.attribute);
            return;
        }
        *self.search_text.borrow_mut() = text.trim().to_string();
        if self.lifecycle.can_render(&self.spec.attribute) {
            let state = self.get_widget_render_state(context);
            self.renderer.render(&self.spec.container, &state, false);
        }
    }

    fn refine_fn(&self, context: &WidgetContext) -> RefineValue {
        let refine = self.refine.get_or_init(|| {
            let helper = Rc::clone(&context.helper);
            let attribute = self.spec.attribute.clone();
            let refine: RefineValue = Rc::new(move |value: FacetOriginalValue| {
                let selected = helper.borrow_mut().query_mut().toggle_facet_value(&attribute, value);
                tracing::debug!("{} value {}", attribute, if selected { "selected" } else { "unselected" });
                request_search(&helper);
            });
            refine
        });
        Rc::clone(refine)
    }

    fn items(&self, context: &WidgetContext) -> Vec<RefinementListItem> {
        let attribute = self.spec.attribute.as_str();
        let selected = context.helper.borrow().query().selected_facet_values(attribute);
        let excluded = self.spec.hints.exclude_values.iter().map(String::as_str).collect::<BTreeSet<_>>();
        let search_text = self.search_text.borrow().to_lowercase();

        let mut items = context
            .results
            .as_ref()
            .and_then(|results| results.facet(attribute))
            .map(|facet| facet.facet_values.as_slice())
            .unwrap_or_default()
            .iter()
            .filter(|item| !excluded.contains(item.display_string.as_str()))
            .filter(|item| search_text.is_empty() || item.display_string.to_lowercase().contains(&search_text))
            .take(self.spec.hints.limit)
            .map(|item| RefinementListItem {
                value: item.original_value.clone(),
                label: item.display_string.clone(),
                count: item.count,
                is_refined: selected.contains(&item.original_value),
            })
            .collect::<Vec<_>>();

        // selected values the backend no longer returns stay listed so they can be unselected
        let returned_values = items.iter().map(|item| item.value.clone()).collect::<BTreeSet<_>>();
        for value in selected.difference(&returned_values) {
            items.push(RefinementListItem { label: value.to_string(), value: value.clone(), count: 0, is_refined: true });
        }
        items
    }
}

impl<R: WidgetRenderer<RefinementListRenderState>> RefinementWidget for RefinementList<R> {
    type RenderState = RefinementListRenderState;

    fn attribute(&self) -> &str {
        &self.spec.attribute
    }

    fn init(&mut self, context: &WidgetContext) {
        if !self.lifecycle.begin_init(&self.spec.attribute) {
            return;
        }
        let state = self.get_widget_render_state(context);
        self.renderer.render(&self.spec.container, &state, true);
    }

    fn render(&mut self, context: &WidgetContext) {
        if !self.lifecycle.can_render(&self.spec.attribute) || !self.lifecycle.accept_request(&self.spec.attribute, context.request_id) {
            return;
        }
        let state = self.get_widget_render_state(context);
        self.renderer.render(&self.spec.container, &state, false);
    }

    fn dispose(&mut self, context: &WidgetContext) {
        if !self.lifecycle.begin_dispose(&self.spec.attribute) {
            return;
        }
        self.renderer.unmount(&self.spec.container);
        context.helper.borrow_mut().query_mut().facet_filters.remove(&self.spec.attribute);
        self.refine.take();
    }

    fn get_widget_render_state(&self, context: &WidgetContext) -> RefinementListRenderState {
        let items = self.items(context);
        RefinementListRenderState {
            attribute: self.spec.attribute.clone(),
            container: self.spec.container.clone(),
            can_refine: !items.is_empty(),
            items,
            searchable: self.spec.hints.searchable,
            search_text: self.search_text.borrow().clone(),
            placeholder_key: self.spec.hints.placeholder_key.clone(),
            refine: self.refine_fn(context),
        }
    }

    fn get_widget_search_parameters(&self, mut params: SearchParameters, _ui_state: &SearchQuery) -> SearchParameters {
        params.add_facet(&self.spec.attribute);
        params.with_max_values_per_facet(self.spec.hints.limit as u64)
    }
}
