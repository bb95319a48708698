//! Compiles the static attribute list into per-attribute widget specifications.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::attribute_config::{AttributeOptions, FacetConfigEntry, FilterGroupDescriptor, WidgetKind};


/// Identity of the render target a widget is mounted into. Handed to widgets explicitly instead of
/// being looked up in a shared registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContainerHandle(pub String);

impl ContainerHandle {
    pub fn for_attribute(schema_field: &str) -> Self {
        let slug = schema_field
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
            .collect::<String>();
        ContainerHandle(format!("x-refinement-{slug}"))
    }
}

impl fmt::Display for ContainerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything needed to register one refinement widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetSpec {
    pub container: ContainerHandle,
    pub attribute: String,
    /// Resolved group, `None` when the attribute is placed at the top level.
    pub group_id: Option<String>,
    pub kind: WidgetKind,
    pub hints: AttributeOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledGroup {
    pub descriptor: FilterGroupDescriptor,
    pub widgets: Vec<WidgetSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FacetLayoutItem {
    Group(CompiledGroup),
    Attribute(WidgetSpec),
}

/// Widget specifications laid out in configuration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CompiledFacetConfig {
    pub layout: Vec<FacetLayoutItem>,
    /// Attribute paths in configuration order, regardless of grouping.
    order: Vec<String>,
}

impl CompiledFacetConfig {
    /// Every widget in the order its attribute was declared.
    pub fn widgets(&self) -> Vec<&WidgetSpec> {
        let by_attribute = self.layout_widgets().map(|spec| (spec.attribute.as_str(), spec)).collect::<HashMap<_, _>>();
        self.order.iter().filter_map(|attribute| by_attribute.get(attribute.as_str()).copied()).collect()
    }

    fn layout_widgets(&self) -> impl Iterator<Item = &WidgetSpec> {
        self.layout.iter().flat_map(|item| match item {
            FacetLayoutItem::Group(group) => group.widgets.iter().collect::<Vec<_>>(),
            FacetLayoutItem::Attribute(spec) => vec![spec],
        })
    }

    pub fn widget(&self, attribute: &str) -> Option<&WidgetSpec> {
        self.layout_widgets().find(|spec| spec.attribute == attribute)
    }

    pub fn groups(&self) -> impl Iterator<Item = &CompiledGroup> {
        self.layout.iter().filter_map(|item| match item {
            FacetLayoutItem::Group(group) => Some(group),
            FacetLayoutItem::Attribute(_) => None,
        })
    }

    /// Attributes of every group instance carrying `group_id`.
    pub fn group_attributes(&self, group_id: &str) -> Vec<&str> {
        self.groups()
            .filter(|group| group.descriptor.id == group_id)
            .flat_map(|group| group.widgets.iter().map(|spec| spec.attribute.as_str()))
            .collect()
    }

    /// Attributes the backend should not count facet values for.
    pub fn facet_deny_list(&self) -> BTreeSet<String> {
        self.layout_widgets().filter(|spec| !spec.hints.facet_counts).map(|spec| spec.attribute.clone()).collect()
    }

    /// Attributes of refinement-list widgets; these are the facets a search asks counts for.
    pub fn facet_attributes(&self) -> Vec<String> {
        self.widgets()
            .into_iter()
            .filter(|spec| spec.kind == WidgetKind::RefinementList)
            .map(|spec| spec.attribute.clone())
            .collect()
    }
}

/// Associates every attribute with the nearest preceding group declaring its `group_id`.
/// Attributes whose group has not been declared yet, or never is, stay at the top level.
pub fn compile(entries: &[FacetConfigEntry]) -> CompiledFacetConfig {
    let mut compiled = CompiledFacetConfig::default();
    // group id -> index into `layout` of its latest declaration
    let mut open_groups: HashMap<&str, usize> = HashMap::new();

    for entry in entries {
        match entry {
            FacetConfigEntry::Group(descriptor) => {
                open_groups.insert(descriptor.id.as_str(), compiled.layout.len());
                compiled.layout.push(FacetLayoutItem::Group(CompiledGroup { descriptor: descriptor.clone(), widgets: Vec::new() }));
            }
            FacetConfigEntry::Attribute(descriptor) => {
                if compiled.order.contains(&descriptor.schema_field) {
                    tracing::warn!("Attribute {} is declared twice; keeping the first", descriptor.schema_field);
                    continue;
                }
                let hints = descriptor.hints();
                let mut spec = WidgetSpec {
                    container: ContainerHandle::for_attribute(&descriptor.schema_field),
                    attribute: descriptor.schema_field.clone(),
                    group_id: None,
                    kind: hints.widget,
                    hints,
                };
                compiled.order.push(descriptor.schema_field.clone());

                let group_index = open_groups.get(descriptor.group_id.as_str()).copied();
                match group_index.and_then(|index| match &mut compiled.layout[index] {
                    FacetLayoutItem::Group(group) => Some(group),
                    FacetLayoutItem::Attribute(_) => None,
                }) {
                    Some(group) => {
                        spec.group_id = Some(group.descriptor.id.clone());
                        group.widgets.push(spec);
                    }
                    None => {
                        if !descriptor.group_id.is_empty() {
                            tracing::debug!(
                                "Attribute {} references undeclared group {}; placing it at the top level",
                                descriptor.schema_field,
                                descriptor.group_id
                            );
                        }
                        compiled.layout.push(FacetLayoutItem::Attribute(spec));
                    }
                }
            }
        }
    }
    compiled
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::attribute_config::AttributeDescriptor;

    fn group(id: &str) -> FacetConfigEntry {
        FacetConfigEntry::Group(FilterGroupDescriptor { id: id.to_string(), name: id.to_uppercase() })
    }

    fn attribute(group_id: &str, field: &str) -> FacetConfigEntry {
        FacetConfigEntry::Attribute(AttributeDescriptor::new(group_id, field))
    }

    #[test]
    fn groups_attributes_in_order() {
        let compiled = compile(&[
            group("person"),
            attribute("person", "person.gender"),
            attribute("person", "person.nationalities.text"),
            group("file"),
            attribute("file", "file.type"),
        ]);

        assert_eq!(compiled.layout.len(), 2);
        assert_eq!(compiled.group_attributes("person"), vec!["person.gender", "person.nationalities.text"]);
        assert_eq!(compiled.group_attributes("file"), vec!["file.type"]);
        let order = compiled.widgets().iter().map(|spec| spec.attribute.as_str()).collect::<Vec<_>>();
        assert_eq!(order, vec!["person.gender", "person.nationalities.text", "file.type"]);
        assert_eq!(compiled.widget("file.type").unwrap().group_id.as_deref(), Some("file"));
    }

    #[test]
    fn attribute_before_its_group_is_ungrouped() {
        let compiled = compile(&[
            attribute("person", "person.gender"),
            group("person"),
            attribute("person", "person.birthYear"),
            attribute("missing", "file.name"),
            attribute("", "base.category"),
        ]);

        assert!(matches!(&compiled.layout[0], FacetLayoutItem::Attribute(spec) if spec.attribute == "person.gender"));
        assert!(matches!(&compiled.layout[2], FacetLayoutItem::Attribute(spec) if spec.group_id.is_none()));
        assert!(matches!(&compiled.layout[3], FacetLayoutItem::Attribute(spec) if spec.attribute == "base.category"));
        assert_eq!(compiled.group_attributes("person"), vec!["person.birthYear"]);
    }

    #[test]
    fn binds_to_nearest_preceding_group() {
        let compiled = compile(&[
            group("person"),
            attribute("person", "person.gender"),
            group("file"),
            group("person"),
            attribute("person", "person.birthYear"),
        ]);

        let FacetLayoutItem::Group(first) = &compiled.layout[0] else { panic!("expected group") };
        let FacetLayoutItem::Group(second) = &compiled.layout[2] else { panic!("expected group") };
        assert_eq!(first.widgets.len(), 1);
        assert_eq!(second.widgets[0].attribute, "person.birthYear");
    }

    #[test]
    fn derives_containers_and_facet_lists() {
        let compiled = compile(&[
            attribute("", "person.nationalities.text"),
            FacetConfigEntry::Attribute(AttributeDescriptor::new("", "base.isScheduledForDeletion").with_option("facetCounts", false)),
            FacetConfigEntry::Attribute(AttributeDescriptor::new("", "file.createdAt").with_option("widget", "dateRange")),
        ]);

        assert_eq!(
            compiled.widget("person.nationalities.text").unwrap().container,
            ContainerHandle("x-refinement-person-nationalities-text".to_string())
        );
        assert_eq!(compiled.facet_deny_list(), BTreeSet::from(["base.isScheduledForDeletion".to_string()]));
        assert_eq!(compiled.facet_attributes(), vec!["person.nationalities.text".to_string(), "base.isScheduledForDeletion".to_string()]);
    }

    #[test]
    fn duplicate_attribute_keeps_first() {
        let compiled = compile(&[attribute("", "file.type"), attribute("", "file.type")]);
        assert_eq!(compiled.widgets().len(), 1);
    }
}
