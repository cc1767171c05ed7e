use crate::core::types::{
    ContainerImage, DnsRecord, HostedZone, Listener, ListenerRule, LoadBalancer, Repository,
    trim_dot,
};

/// Text fields a row can be matched on. A match on any field qualifies the row.
pub(crate) trait Searchable {
    fn search_fields(&self) -> Vec<String>;
}

pub(crate) fn matches_query<T: Searchable>(item: &T, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    item.search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// One layer of a drill-down hierarchy: the full fetched set, the indices that
/// pass the current query, and the table selection.
#[derive(Debug, Clone)]
pub(crate) struct DrillLevel<T> {
    parent_key: Option<String>,
    all_items: Vec<T>,
    visible: Vec<usize>,
    query: String,
    selected: usize,
    loaded: bool,
}

impl<T> Default for DrillLevel<T> {
    fn default() -> Self {
        Self {
            parent_key: None,
            all_items: Vec::new(),
            visible: Vec::new(),
            query: String::new(),
            selected: 0,
            loaded: false,
        }
    }
}

impl<T: Searchable> DrillLevel<T> {
    /// Swaps in a freshly fetched set. The query is reset and the selection clamped.
    pub(crate) fn replace_items(&mut self, parent_key: Option<String>, items: Vec<T>) {
        self.parent_key = parent_key;
        self.all_items = items;
        self.query.clear();
        self.loaded = true;
        self.refilter();
        self.clamp_selection();
    }

    pub(crate) fn apply_filter(&mut self, query: &str) {
        self.query = query.trim().to_string();
        self.refilter();
        self.selected = 0;
    }

    fn refilter(&mut self) {
        let query = self.query.as_str();
        self.visible = self
            .all_items
            .iter()
            .enumerate()
            .filter(|(_, item)| matches_query(*item, query))
            .map(|(idx, _)| idx)
            .collect();
    }
}

impl<T> DrillLevel<T> {
    #[cfg(test)]
    pub(crate) fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// True when this level already holds data fetched for `parent_key`.
    pub(crate) fn is_loaded_for(&self, parent_key: &str) -> bool {
        self.loaded && self.parent_key.as_deref() == Some(parent_key)
    }

    pub(crate) fn parent_key(&self) -> Option<&str> {
        self.parent_key.as_deref()
    }

    pub(crate) fn query(&self) -> &str {
        &self.query
    }

    #[cfg(test)]
    pub(crate) fn all_items(&self) -> &[T] {
        &self.all_items
    }

    pub(crate) fn visible_items(&self) -> impl Iterator<Item = &T> {
        self.visible.iter().filter_map(|idx| self.all_items.get(*idx))
    }

    pub(crate) fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub(crate) fn selected_index(&self) -> usize {
        self.selected
    }

    pub(crate) fn selected_item(&self) -> Option<&T> {
        self.visible
            .get(self.selected)
            .and_then(|idx| self.all_items.get(*idx))
    }

    pub(crate) fn clamp_selection(&mut self) {
        if self.visible.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.visible.len() {
            self.selected = self.visible.len() - 1;
        }
    }

    pub(crate) fn select_next(&mut self, step: usize) {
        if !self.visible.is_empty() {
            self.selected = self
                .selected
                .saturating_add(step)
                .min(self.visible.len() - 1);
        }
    }

    pub(crate) fn select_previous(&mut self, step: usize) {
        self.selected = self.selected.saturating_sub(step);
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.visible.len().saturating_sub(1);
    }
}

impl Searchable for HostedZone {
    fn search_fields(&self) -> Vec<String> {
        vec![trim_dot(&self.name).to_string(), self.id.clone()]
    }
}

impl Searchable for DnsRecord {
    fn search_fields(&self) -> Vec<String> {
        let mut fields = Vec::with_capacity(self.values.len() + 2);
        fields.push(self.display_name().to_string());
        fields.extend(self.values.iter().cloned());
        if let Some(alias) = &self.alias {
            fields.push(alias.search_text());
        }
        fields
    }
}

impl Searchable for Repository {
    fn search_fields(&self) -> Vec<String> {
        vec![self.name.clone()]
    }
}

impl Searchable for ContainerImage {
    fn search_fields(&self) -> Vec<String> {
        let mut fields = self.tags.clone();
        fields.push(self.digest.clone());
        fields
    }
}

impl Searchable for LoadBalancer {
    fn search_fields(&self) -> Vec<String> {
        vec![self.name.clone()]
    }
}

impl Searchable for Listener {
    fn search_fields(&self) -> Vec<String> {
        let mut fields = vec![self.protocol.clone()];
        if let Some(port) = self.port {
            fields.push(port.to_string());
        }
        fields
    }
}

impl Searchable for ListenerRule {
    fn search_fields(&self) -> Vec<String> {
        let mut fields = vec![self.priority_label().to_string()];
        for cond in &self.conditions {
            fields.extend(cond.values.iter().cloned());
        }
        fields
    }
}
