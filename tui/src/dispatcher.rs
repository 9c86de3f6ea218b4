//! Runs resolved commands against the persisted page state and turns plain
//! submissions into search navigations.
//!
//! [`PageController`] is the single implementor of both
//! [`newtab_core::CommandDispatcher`] and [`newtab_core::SearchHandler`]. It
//! keeps the authoritative in-memory [`PageState`] and persists it in the
//! background after every mutation; the key handler never waits on disk.

use newtab_core::Command;
use newtab_core::CommandDispatcher;
use newtab_core::DispatchOutcome;
use newtab_core::SearchHandler;
use newtab_core::search_url::build_search_url;
use newtab_core::search_url::engine_template;
use newtab_state::Background;
use newtab_state::BoardItem;
use newtab_state::PAGE_STATE_KEY;
use newtab_state::PageState;
use newtab_state::StateStore;
use newtab_state::history::record_search;
use tokio::task::JoinHandle;
use url::Url;

use crate::app_event::AppEvent;
use crate::app_event_sender::AppEventSender;

pub(crate) struct PageController {
    store: StateStore,
    page: PageState,
    next_item_id: u64,
    app_event_tx: AppEventSender,
    /// Tail of the background save chain. Each new save awaits the previous
    /// one so snapshots reach the disk in mutation order.
    last_save: Option<JoinHandle<()>>,
}

impl PageController {
    /// Load the persisted page state, falling back to defaults when nothing
    /// has been saved yet.
    pub(crate) async fn load(
        store: StateStore,
        app_event_tx: AppEventSender,
    ) -> anyhow::Result<Self> {
        let page: PageState = store.get(PAGE_STATE_KEY).await?.unwrap_or_default();
        let next_item_id = page.items.iter().map(|item| item.id + 1).max().unwrap_or(1);
        Ok(Self {
            store,
            page,
            next_item_id,
            app_event_tx,
            last_save: None,
        })
    }

    pub(crate) fn page(&self) -> &PageState {
        &self.page
    }

    fn notice(&self, message: impl Into<String>) {
        self.app_event_tx.send(AppEvent::Notice(message.into()));
    }

    /// A recognized command is missing its argument: show the usage line and
    /// keep the input for correction.
    fn usage_rejection(&self, command: Command) -> DispatchOutcome {
        self.notice(format!("Usage: {}", command.usage()));
        DispatchOutcome::rejected()
    }

    /// Persist the current page snapshot in the background. Saves are chained
    /// so they hit the store in order; failures surface as a notice.
    fn persist(&mut self) {
        let store = self.store.clone();
        let page = self.page.clone();
        let tx = self.app_event_tx.clone();
        let prev = self.last_save.take();
        self.last_save = Some(tokio::spawn(async move {
            if let Some(prev) = prev {
                let _ = prev.await;
            }
            if let Err(err) = store.set(PAGE_STATE_KEY, &page).await {
                tracing::warn!("failed to persist page state: {err:#}");
                tx.send(AppEvent::Notice("Could not save the page state.".to_string()));
            }
        }));
    }

    /// Wait for every queued background save to finish. Used on shutdown.
    pub(crate) async fn flush_saves(&mut self) {
        if let Some(handle) = self.last_save.take() {
            let _ = handle.await;
        }
    }

    fn set_background(&mut self, args: &[String]) -> DispatchOutcome {
        if args.is_empty() {
            return self.usage_rejection(Command::Bg);
        }
        let source = args.join(" ");
        let background = Background::from_source(source);
        let noun = match background.kind {
            newtab_state::BackgroundKind::Video => "video",
            newtab_state::BackgroundKind::Image => "image",
        };
        self.page.background = Some(background);
        self.persist();
        self.notice(format!("Background {noun} set."));
        DispatchOutcome::handled()
    }

    fn add_icon(&mut self, args: &[String]) -> DispatchOutcome {
        let Some(raw) = args.first() else {
            return self.usage_rejection(Command::AddIcon);
        };
        let Some(link_url) = normalize_site_url(raw) else {
            self.notice(format!("Not a valid site URL: {raw}"));
            return DispatchOutcome::rejected();
        };
        let icon_url = favicon_url(&link_url);
        let id = self.next_item_id;
        self.next_item_id += 1;
        self.page.items.push(BoardItem {
            link_url: link_url.clone(),
            icon_url,
            id,
        });
        self.persist();
        self.notice(format!("Icon added for {link_url}."));
        DispatchOutcome::handled()
    }

    fn save(&mut self) -> DispatchOutcome {
        self.persist();
        self.notice("Page state saved.");
        DispatchOutcome::handled()
    }

    fn clear(&mut self) -> DispatchOutcome {
        self.page.background = None;
        self.page.items.clear();
        self.next_item_id = 1;
        self.wipe_store_and_persist();
        self.notice("Background, icons and stored data cleared.");
        DispatchOutcome::handled()
    }

    /// `//clear` drops every stored key (history included), then writes the
    /// reset page snapshot back so the engine/style configuration survives.
    fn wipe_store_and_persist(&mut self) {
        let store = self.store.clone();
        let page = self.page.clone();
        let tx = self.app_event_tx.clone();
        let prev = self.last_save.take();
        self.last_save = Some(tokio::spawn(async move {
            if let Some(prev) = prev {
                let _ = prev.await;
            }
            let result = async {
                store.clear().await?;
                store.set(PAGE_STATE_KEY, &page).await
            }
            .await;
            if let Err(err) = result {
                tracing::warn!("failed to clear the page store: {err:#}");
                tx.send(AppEvent::Notice("Could not clear the page store.".to_string()));
            }
        }));
    }

    fn set_style(&mut self, args: &[String]) -> DispatchOutcome {
        match args.first().map(String::as_str) {
            Some(style @ ("1" | "2")) => {
                self.page.style = style.to_string();
                self.persist();
                self.notice(format!("Style {style} active."));
                DispatchOutcome::handled()
            }
            _ => self.usage_rejection(Command::Style),
        }
    }

    fn set_text_color(&mut self, args: &[String]) -> DispatchOutcome {
        let Some(color) = args.first() else {
            return self.usage_rejection(Command::TextColor);
        };
        self.page.text_color = Some(color.clone());
        self.persist();
        self.notice(format!("Text color set to {color}."));
        DispatchOutcome::handled()
    }

    fn set_search_engine(&mut self, args: &[String]) -> DispatchOutcome {
        let Some(arg) = args.first() else {
            return self.usage_rejection(Command::SetSearch);
        };
        if let Some(template) = engine_template(arg) {
            self.page.search_engine_name = arg.to_lowercase();
            self.page.search_engine_template = template.to_string();
        } else if arg.starts_with("http://") || arg.starts_with("https://") {
            // A custom template; `%s` is optional, the URL builder appends a
            // `q` parameter when it is absent.
            self.page.search_engine_name = "custom".to_string();
            self.page.search_engine_template = arg.clone();
        } else {
            self.notice(format!("Unknown search engine: {arg}"));
            return DispatchOutcome::rejected();
        }
        self.persist();
        self.notice(format!(
            "Search engine set to {}.",
            self.page.search_engine_name
        ));
        DispatchOutcome::handled()
    }
}

impl CommandDispatcher for PageController {
    fn execute(&mut self, command: Command, args: &[String]) -> DispatchOutcome {
        tracing::info!("dispatching {} with {} arg(s)", command.key(), args.len());
        match command {
            Command::Bg => self.set_background(args),
            Command::AddIcon => self.add_icon(args),
            Command::Save => self.save(),
            Command::Clear => self.clear(),
            Command::Style => self.set_style(args),
            Command::TextColor => self.set_text_color(args),
            Command::SetSearch => self.set_search_engine(args),
        }
    }
}

impl SearchHandler for PageController {
    fn search(&mut self, query: &str) {
        let url = build_search_url(&self.page.search_engine_template, query);
        let store = self.store.clone();
        let query = query.to_string();
        tokio::spawn(async move {
            if let Err(err) = record_search(&store, &query).await {
                tracing::warn!("failed to record search history: {err:#}");
            }
        });
        self.app_event_tx.send(AppEvent::OpenUrl(url));
    }
}

/// Accept bare domains as well as full URLs; everything ends up with a
/// scheme.
fn normalize_site_url(raw: &str) -> Option<String> {
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    let url = Url::parse(&candidate).ok()?;
    url.host_str()?;
    Some(url.to_string())
}

fn favicon_url(link_url: &str) -> String {
    let domain = Url::parse(link_url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| link_url.to_string());
    format!("https://www.google.com/s2/favicons?domain={domain}&sz=64")
}

#[cfg(test)]
mod tests {
    use super::*;
    use newtab_core::resolve_submission;
    use newtab_state::BackgroundKind;
    use newtab_state::history::search_history;
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc::UnboundedReceiver;
    use tokio::sync::mpsc::unbounded_channel;

    async fn controller_in(
        dir: &tempfile::TempDir,
    ) -> (PageController, UnboundedReceiver<AppEvent>) {
        let (tx, rx) = unbounded_channel();
        let store = StateStore::new(dir.path().join("state.json"));
        let controller = PageController::load(store, AppEventSender::new(tx))
            .await
            .expect("load controller");
        (controller, rx)
    }

    fn notices(rx: &mut UnboundedReceiver<AppEvent>) -> Vec<String> {
        let mut notices = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let AppEvent::Notice(message) = event {
                notices.push(message);
            }
        }
        notices
    }

    #[tokio::test]
    async fn bg_sets_and_persists_the_background() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut controller, _rx) = controller_in(&dir).await;
        let outcome = controller.execute(
            Command::Bg,
            &["https://cdn.example.com/clip.mp4".to_string()],
        );
        assert!(outcome.handled);
        controller.flush_saves().await;

        let (reloaded, _rx) = controller_in(&dir).await;
        let background = reloaded.page().background.clone().expect("background");
        assert_eq!(background.kind, BackgroundKind::Video);
        assert_eq!(background.source, "https://cdn.example.com/clip.mp4");
    }

    #[tokio::test]
    async fn bg_without_argument_shows_usage_and_keeps_input() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut controller, mut rx) = controller_in(&dir).await;
        let outcome = controller.execute(Command::Bg, &[]);
        assert_eq!(outcome, DispatchOutcome::rejected());
        let notices = notices(&mut rx);
        assert_eq!(notices.len(), 1);
        assert!(notices[0].starts_with("Usage: //bg"));
    }

    #[tokio::test]
    async fn addicon_normalizes_bare_domains() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut controller, _rx) = controller_in(&dir).await;
        let outcome = controller.execute(Command::AddIcon, &["example.com".to_string()]);
        assert!(outcome.handled);
        let item = controller.page().items.first().expect("item");
        assert_eq!(item.link_url, "https://example.com/");
        assert!(item.icon_url.contains("domain=example.com"));
        assert_eq!(item.id, 1);
    }

    #[tokio::test]
    async fn addicon_ids_keep_increasing_across_reloads() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut controller, _rx) = controller_in(&dir).await;
        controller.execute(Command::AddIcon, &["a.example".to_string()]);
        controller.execute(Command::AddIcon, &["b.example".to_string()]);
        controller.flush_saves().await;

        let (mut reloaded, _rx) = controller_in(&dir).await;
        reloaded.execute(Command::AddIcon, &["c.example".to_string()]);
        let ids: Vec<u64> = reloaded.page().items.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn clear_wipes_the_store_including_history() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = StateStore::new(dir.path().join("state.json"));
        record_search(&store, "earlier search").await.expect("record");

        let (mut controller, _rx) = controller_in(&dir).await;
        controller.execute(Command::Bg, &["https://x.example/p.png".to_string()]);
        controller.execute(Command::Clear, &[]);
        controller.flush_saves().await;

        assert!(search_history(&store).await.expect("history").is_empty());
        let (reloaded, _rx) = controller_in(&dir).await;
        assert_eq!(reloaded.page().background, None);
        assert!(reloaded.page().items.is_empty());
    }

    #[tokio::test]
    async fn clear_resets_background_and_icons() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut controller, _rx) = controller_in(&dir).await;
        controller.execute(Command::Bg, &["https://x.example/p.png".to_string()]);
        controller.execute(Command::AddIcon, &["example.com".to_string()]);
        controller.execute(Command::Clear, &[]);
        controller.flush_saves().await;

        let (reloaded, _rx) = controller_in(&dir).await;
        assert_eq!(reloaded.page().background, None);
        assert!(reloaded.page().items.is_empty());
    }

    #[tokio::test]
    async fn style_accepts_only_the_two_known_styles() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut controller, _rx) = controller_in(&dir).await;
        assert!(controller.execute(Command::Style, &["2".to_string()]).handled);
        assert_eq!(controller.page().style, "2");
        let outcome = controller.execute(Command::Style, &["9".to_string()]);
        assert_eq!(outcome, DispatchOutcome::rejected());
        assert_eq!(controller.page().style, "2");
    }

    #[tokio::test]
    async fn setsearch_accepts_keywords_and_custom_templates() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut controller, _rx) = controller_in(&dir).await;

        assert!(
            controller
                .execute(Command::SetSearch, &["ddg".to_string()])
                .handled
        );
        assert_eq!(controller.page().search_engine_name, "ddg");
        assert_eq!(
            controller.page().search_engine_template,
            "https://duckduckgo.com/?q=%s"
        );

        assert!(
            controller
                .execute(
                    Command::SetSearch,
                    &["https://search.example/?q=%s".to_string()]
                )
                .handled
        );
        assert_eq!(controller.page().search_engine_name, "custom");

        let outcome = controller.execute(Command::SetSearch, &["altavista".to_string()]);
        assert_eq!(outcome, DispatchOutcome::rejected());
        assert_eq!(controller.page().search_engine_name, "custom");
    }

    #[tokio::test]
    async fn search_opens_the_configured_engine_and_records_history() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut controller, mut rx) = controller_in(&dir).await;
        controller.execute(Command::SetSearch, &["ddg".to_string()]);

        controller.search("hello world");
        let open = loop {
            match rx.try_recv() {
                Ok(AppEvent::OpenUrl(url)) => break url,
                Ok(_) => continue,
                Err(_) => panic!("expected an OpenUrl event"),
            }
        };
        assert_eq!(open, "https://duckduckgo.com/?q=hello+world");

        // The history write runs in the background.
        tokio::task::yield_now().await;
        let store = StateStore::new(dir.path().join("state.json"));
        let mut history = search_history(&store).await.expect("history");
        for _ in 0..50 {
            if !history.is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            history = search_history(&store).await.expect("history");
        }
        assert_eq!(history, vec!["hello world".to_string()]);
    }

    #[tokio::test]
    async fn full_submission_path_clears_on_success() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut controller, _rx) = controller_in(&dir).await;
        let resolution = resolve_submission("//style 2", &mut controller);
        assert!(resolution.should_clear_input());
        assert_eq!(controller.page().style, "2");
    }
}
