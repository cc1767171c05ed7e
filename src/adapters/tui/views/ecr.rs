use crate::adapters::tui::components::filter_bar::{FilterInput, draw_filter_bar};
use crate::adapters::tui::components::resource_table::{
    TableView, draw_footer, draw_resource_table,
};
use crate::adapters::tui::status::StatusLine;
use crate::adapters::tui::text_utils::{format_size, format_timestamp};
use crate::adapters::tui::views::{
    ResourceView, ViewFocus, handle_filter_key, handle_table_navigation, split_view_area,
    view_focus,
};
use crate::adapters::tui::worker::TaskRunner;
use crate::core::context::AppContext;
use crate::core::error::AwsApiError;
use crate::core::filter::DrillLevel;
use crate::core::types::{ContainerImage, Repository};
use crate::ports::{ClipboardPort, RegistryDataSource};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    widgets::{Cell, Row},
};
use std::cmp::Reverse;
use std::sync::Arc;
use tracing::debug;

const REPOSITORY_HEADERS: [&str; 3] = ["Repository", "URI", "Created"];
const REPOSITORY_WIDTHS: [Constraint; 3] = [
    Constraint::Percentage(30),
    Constraint::Percentage(50),
    Constraint::Percentage(20),
];
const IMAGE_HEADERS: [&str; 4] = ["Tag", "Pushed at", "Size", "Digest"];
const IMAGE_WIDTHS: [Constraint; 4] = [
    Constraint::Percentage(25),
    Constraint::Percentage(20),
    Constraint::Percentage(10),
    Constraint::Percentage(45),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Slot {
    Repositories,
    Images,
}

enum Message {
    Repositories(Result<Vec<Repository>, AwsApiError>),
    Images {
        repository: Repository,
        switch_level: bool,
        result: Result<Vec<ContainerImage>, AwsApiError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Repositories,
    Images,
}

/// Newest repositories first.
fn sort_repositories(mut repositories: Vec<Repository>) -> Vec<Repository> {
    repositories.sort_by_key(|r| Reverse(r.created_at));
    repositories
}

/// Untagged images are dropped; the rest are ordered newest push first.
fn tagged_images(images: Vec<ContainerImage>) -> Vec<ContainerImage> {
    let mut tagged: Vec<ContainerImage> = images
        .into_iter()
        .filter(|image| !image.tags.is_empty())
        .collect();
    tagged.sort_by_key(|image| Reverse(image.pushed_at));
    tagged
}

fn tag_label(image: &ContainerImage) -> String {
    match image.tags.as_slice() {
        [] => "-".to_string(),
        [only] => only.clone(),
        [first, rest @ ..] => format!("{} +{}", first, rest.len()),
    }
}

pub(crate) struct EcrView {
    registry: Arc<dyn RegistryDataSource>,
    clipboard: Arc<dyn ClipboardPort>,
    tasks: TaskRunner<Slot, Message>,
    level: Level,
    repositories: DrillLevel<Repository>,
    images: DrillLevel<ContainerImage>,
    images_repository: Option<Repository>,
    filter: FilterInput,
    active: bool,
}

impl EcrView {
    pub(crate) fn new(ctx: &AppContext) -> Self {
        Self {
            registry: ctx.registry.clone(),
            clipboard: ctx.clipboard.clone(),
            tasks: TaskRunner::new(),
            level: Level::Repositories,
            repositories: DrillLevel::default(),
            images: DrillLevel::default(),
            images_repository: None,
            filter: FilterInput::default(),
            active: false,
        }
    }

    fn fetch_repositories(&mut self, status: &mut StatusLine) {
        status.set_status("Fetching repositories...");
        status.clear_error();
        let registry = self.registry.clone();
        self.tasks.run(Slot::Repositories, async move {
            Message::Repositories(registry.list_repositories().await)
        });
    }

    fn fetch_images(&mut self, repository: Repository, switch_level: bool, status: &mut StatusLine) {
        status.set_status(format!("Fetching images for {}...", repository.name));
        status.clear_error();
        let registry = self.registry.clone();
        self.tasks.run(Slot::Images, async move {
            let result = registry.list_images(&repository.name).await;
            Message::Images {
                repository,
                switch_level,
                result,
            }
        });
    }

    fn descend(&mut self, status: &mut StatusLine) {
        let Some(repository) = self.repositories.selected_item().cloned() else {
            return;
        };
        if self.images.is_loaded_for(&repository.name) {
            debug!("Reusing cached images for {}", repository.name);
            self.tasks.cancel(Slot::Images);
            self.level = Level::Images;
            return;
        }
        self.fetch_images(repository, true, status);
    }

    fn copy_uri(&self, status: &mut StatusLine) {
        let (uri, confirmation) = match self.level {
            Level::Repositories => match self.repositories.selected_item() {
                Some(repository) => (
                    repository.uri.clone(),
                    "Repository URI copied to clipboard",
                ),
                None => {
                    status.set_status("Select a repository to copy");
                    return;
                }
            },
            Level::Images => {
                let image_tag = self.images.selected_item().and_then(|i| i.primary_tag());
                match (&self.images_repository, image_tag) {
                    (Some(repository), Some(tag)) => (
                        format!("{}:{}", repository.uri, tag),
                        "Image URI copied to clipboard",
                    ),
                    _ => {
                        status.set_status("Select an image to copy");
                        return;
                    }
                }
            }
        };
        match self.clipboard.copy_text(&uri) {
            Ok(()) => status.set_status(confirmation),
            Err(e) => status.set_error(format!("failed to copy URI: {}", e)),
        }
    }

    fn apply(&mut self, message: Message, status: &mut StatusLine) {
        match message {
            Message::Repositories(Ok(repositories)) => {
                status.set_status(format!("Loaded {} repositories", repositories.len()));
                self.repositories
                    .replace_items(None, sort_repositories(repositories));
            }
            Message::Repositories(Err(e)) => {
                status.set_error(format!("describe repositories: {}", e))
            }
            Message::Images {
                repository,
                switch_level,
                result,
            } => match result {
                Ok(images) => {
                    let images = tagged_images(images);
                    status.set_status(format!(
                        "Loaded {} images for {}",
                        images.len(),
                        repository.name
                    ));
                    self.images
                        .replace_items(Some(repository.name.clone()), images);
                    self.images_repository = Some(repository);
                    if switch_level {
                        self.level = Level::Images;
                    }
                }
                Err(e) => status.set_error(format!("describe images: {}", e)),
            },
        }
    }

    fn repository_rows(&self) -> Vec<Row<'static>> {
        self.repositories
            .visible_items()
            .map(|repository| {
                Row::new(vec![
                    Cell::from(repository.name.clone()),
                    Cell::from(repository.uri.clone()),
                    Cell::from(format_timestamp(repository.created_at.as_ref())),
                ])
            })
            .collect()
    }

    fn image_rows(&self) -> Vec<Row<'static>> {
        self.images
            .visible_items()
            .map(|image| {
                Row::new(vec![
                    Cell::from(tag_label(image)),
                    Cell::from(format_timestamp(image.pushed_at.as_ref())),
                    Cell::from(
                        image
                            .size_bytes
                            .map(format_size)
                            .unwrap_or_else(|| "-".to_string()),
                    ),
                    Cell::from(image.digest.clone()),
                ])
            })
            .collect()
    }
}

impl ResourceView for EcrView {
    fn name(&self) -> &'static str {
        "ecr"
    }

    fn title(&self) -> &'static str {
        "Amazon ECR – repositories › images"
    }

    fn init(&mut self, status: &mut StatusLine) {
        self.fetch_repositories(status);
    }

    fn activate(&mut self) {
        self.active = true;
    }

    fn deactivate(&mut self) {
        self.active = false;
    }

    fn refresh(&mut self, status: &mut StatusLine) {
        match self.level {
            Level::Repositories => self.fetch_repositories(status),
            Level::Images => {
                if let Some(repository) = self.images_repository.clone() {
                    self.fetch_images(repository, false, status);
                }
            }
        }
    }

    fn enter_filter_mode(&mut self, _status: &mut StatusLine) -> bool {
        let current = match self.level {
            Level::Repositories => self.repositories.query().to_string(),
            Level::Images => self.images.query().to_string(),
        };
        self.filter.open(&current);
        true
    }

    fn in_filter_mode(&self) -> bool {
        self.filter.is_active()
    }

    fn has_modal(&self) -> bool {
        false
    }

    fn focus(&self) -> ViewFocus {
        view_focus(self.active, false, self.in_filter_mode())
    }

    fn handle_input(&mut self, key: KeyEvent, status: &mut StatusLine) -> bool {
        if self.filter.is_active() {
            match self.level {
                Level::Repositories => {
                    handle_filter_key(&mut self.filter, &mut self.repositories, key)
                }
                Level::Images => handle_filter_key(&mut self.filter, &mut self.images, key),
            }
            return true;
        }

        let navigated = match self.level {
            Level::Repositories => handle_table_navigation(&mut self.repositories, &key),
            Level::Images => handle_table_navigation(&mut self.images, &key),
        };
        if navigated {
            return true;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return false;
        }

        match key.code {
            KeyCode::Char('c' | 'C' | 'y' | 'Y') => {
                self.copy_uri(status);
                true
            }
            KeyCode::Enter if self.level == Level::Repositories => {
                self.descend(status);
                true
            }
            KeyCode::Esc if self.level == Level::Images => {
                self.level = Level::Repositories;
                true
            }
            _ => false,
        }
    }

    fn poll_tasks(&mut self, status: &mut StatusLine) {
        for (_, message) in self.tasks.drain() {
            self.apply(message, status);
        }
        for slot in self.tasks.take_failed() {
            let operation = match slot {
                Slot::Repositories => "describe repositories",
                Slot::Images => "describe images",
            };
            status.set_error(format!("{}: background task aborted", operation));
        }
    }

    fn has_pending_tasks(&self) -> bool {
        self.tasks.has_pending()
    }

    fn breadcrumb(&self) -> String {
        match (self.level, &self.images_repository) {
            (Level::Images, Some(repository)) => {
                format!("<repositories> › <images: {}>", repository.name)
            }
            _ => "<repositories>".to_string(),
        }
    }

    fn total_items(&self) -> usize {
        match self.level {
            Level::Repositories => self.repositories.visible_len(),
            Level::Images => self.images.visible_len(),
        }
    }

    fn draw(&self, frame: &mut Frame, area: Rect) {
        let areas = split_view_area(area);
        let focused = self.focus() == ViewFocus::Table;
        match self.level {
            Level::Repositories => {
                draw_resource_table(
                    frame,
                    areas.table,
                    TableView {
                        title: " Repositories ".to_string(),
                        headers: &REPOSITORY_HEADERS,
                        widths: &REPOSITORY_WIDTHS,
                        rows: self.repository_rows(),
                        selected: self.repositories.selected_index(),
                        focused,
                        loading: self.tasks.is_pending(Slot::Repositories),
                        empty_message: "No repositories found",
                    },
                );
                draw_filter_bar(frame, areas.filter, &self.filter, self.repositories.query());
            }
            Level::Images => {
                let name = self
                    .images_repository
                    .as_ref()
                    .map(|r| r.name.as_str())
                    .unwrap_or_default();
                draw_resource_table(
                    frame,
                    areas.table,
                    TableView {
                        title: format!(" Images – {} ", name),
                        headers: &IMAGE_HEADERS,
                        widths: &IMAGE_WIDTHS,
                        rows: self.image_rows(),
                        selected: self.images.selected_index(),
                        focused,
                        loading: self.tasks.is_pending(Slot::Images),
                        empty_message: "No tagged images found",
                    },
                );
                draw_filter_bar(frame, areas.filter, &self.filter, self.images.query());
            }
        }
        draw_footer(frame, areas.footer, self.total_items(), &self.breadcrumb());
    }
}
