#![forbid(unsafe_code)]

//! `wasm32` bindings: a DOM-backed [`SectionHost`] and the JS-facing
//! [`FolioPager`].

use std::cell::RefCell;
use std::rc::Rc;

use folio_core::{catalog, IntersectionEntry, Lang, SectionBounds, SectionId, SystemClock};
use folio_runtime::{
    LanguageService, LanguageStorage, ObservationToken, PagerConfig, ScrollBehavior, SectionHost,
    SectionNav, SectionPager, StorageError, Subscription,
};
use js_sys::Array;
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    ScrollIntoViewOptions, ScrollLogicalPosition, Storage, Window,
};

type EntryQueue = Rc<RefCell<Vec<IntersectionEntry>>>;

fn js_error(message: &str) -> JsValue {
    JsValue::from_str(message)
}

// ---------------------------------------------------------------------------
// DomHost
// ---------------------------------------------------------------------------

/// [`SectionHost`] over the live document. Section elements are looked up
/// by their `id` attribute.
pub struct DomHost {
    window: Window,
    document: Document,
    entries: EntryQueue,
}

impl DomHost {
    pub fn new() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| js_error("no window"))?;
        let document = window.document().ok_or_else(|| js_error("no document"))?;
        Ok(Self {
            window,
            document,
            entries: Rc::new(RefCell::new(Vec::new())),
        })
    }

    /// Intersection entries delivered by the browser since the last call.
    pub fn take_entries(&self) -> Vec<IntersectionEntry> {
        std::mem::take(&mut *self.entries.borrow_mut())
    }
}

impl SectionHost for DomHost {
    fn has_section(&self, id: &SectionId) -> bool {
        self.document.get_element_by_id(id.as_str()).is_some()
    }

    fn scroll_to(&self, id: &SectionId, behavior: ScrollBehavior) {
        let Some(element) = self.document.get_element_by_id(id.as_str()) else {
            return;
        };
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(match behavior {
            ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
            ScrollBehavior::Instant => web_sys::ScrollBehavior::Instant,
        });
        options.set_block(ScrollLogicalPosition::Start);
        element.scroll_into_view_with_scroll_into_view_options(&options);
    }

    fn observe(&self, ids: &[SectionId], threshold: f64) -> Option<ObservationToken> {
        let queue = Rc::clone(&self.entries);
        let callback = Closure::<dyn FnMut(Array)>::new(move |entries: Array| {
            let mut queue = queue.borrow_mut();
            for entry in entries.iter() {
                if let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() {
                    queue.push(IntersectionEntry::new(
                        entry.target().id(),
                        entry.intersection_ratio(),
                    ));
                }
            }
        });

        let init = IntersectionObserverInit::new();
        let steps: Array = crate::observer_thresholds(threshold)
            .into_iter()
            .map(JsValue::from_f64)
            .collect();
        init.set_threshold(&steps);
        let observer =
            match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init) {
                Ok(observer) => observer,
                Err(err) => {
                    debug!(target: "folio.web", ?err, "IntersectionObserver unavailable");
                    return None;
                }
            };
        for id in ids {
            match self.document.get_element_by_id(id.as_str()) {
                Some(element) => observer.observe(&element),
                None => debug!(target: "folio.web", %id, "section element not found for observation"),
            }
        }
        Some(ObservationToken::new(move || {
            observer.disconnect();
            drop(callback);
        }))
    }

    fn section_bounds(&self, id: &SectionId) -> Option<SectionBounds> {
        let rect = self
            .document
            .get_element_by_id(id.as_str())?
            .get_bounding_client_rect();
        Some(SectionBounds::new(rect.y(), rect.height()))
    }

    fn viewport_height(&self) -> f64 {
        self.window
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or(0.0)
    }
}

// ---------------------------------------------------------------------------
// WebStorage
// ---------------------------------------------------------------------------

/// [`LanguageStorage`] over `window.localStorage`.
pub struct WebStorage {
    storage: Storage,
}

impl WebStorage {
    /// `None` when storage is unavailable (privacy mode, sandboxed frames).
    pub fn local(window: &Window) -> Option<Self> {
        window
            .local_storage()
            .ok()
            .flatten()
            .map(|storage| Self { storage })
    }
}

impl LanguageStorage for WebStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage
            .set_item(key, value)
            .map_err(|err| StorageError::new(format!("{err:?}")))
    }
}

// ---------------------------------------------------------------------------
// FolioPager
// ---------------------------------------------------------------------------

/// JS-facing section pager for the portfolio page.
///
/// The page script forwards wheel, touch and navigation activity and calls
/// `tick()` from `requestAnimationFrame`.
#[wasm_bindgen]
pub struct FolioPager {
    pager: SectionPager,
    nav: SectionNav,
    host: Rc<DomHost>,
    language: LanguageService,
    _lang_attr: Subscription,
}

#[wasm_bindgen]
impl FolioPager {
    /// Create a pager over the six portfolio sections.
    ///
    /// `lang` overrides the saved UI language when it is a supported code.
    #[wasm_bindgen(constructor)]
    pub fn new(lang: Option<String>) -> Result<FolioPager, JsValue> {
        let host = Rc::new(DomHost::new()?);
        let storage = WebStorage::local(&host.window)
            .map(|s| Box::new(s) as Box<dyn LanguageStorage>);
        let language = LanguageService::new(storage);
        if let Some(lang) = lang.as_deref().and_then(Lang::parse) {
            language.set_lang(lang);
        }

        let root = host.document.document_element();
        let set_root_lang = move |lang: &Lang| {
            if let Some(root) = &root
                && let Err(err) = root.set_attribute("lang", lang.code())
            {
                warn!(target: "folio.web", ?err, "failed to set document language");
            }
        };
        set_root_lang(&language.current());
        let lang_attr = language.lang().subscribe(set_root_lang);

        let nav = SectionNav::new(catalog::portfolio_sections(language.current()));
        let pager = SectionPager::new(
            nav.clone(),
            Rc::clone(&host) as Rc<dyn SectionHost>,
            Rc::new(SystemClock::new()),
            PagerConfig::default(),
        );
        Ok(Self {
            pager,
            nav,
            host,
            language,
            _lang_attr: lang_attr,
        })
    }

    /// Section elements exist; `url` is the page URL for deep linking.
    pub fn mount(&mut self, url: Option<String>) {
        let initial = crate::initial_section(&self.nav, url.as_deref());
        self.pager.mount(initial);
    }

    pub fn wheel(&mut self, delta_y: f64) {
        self.pager.on_wheel(delta_y);
    }

    #[wasm_bindgen(js_name = touchStart)]
    pub fn touch_start(&mut self, y: f64) {
        self.pager.on_touch_start(y);
    }

    #[wasm_bindgen(js_name = touchEnd)]
    pub fn touch_end(&mut self, y: f64) {
        self.pager.on_touch_end(y);
    }

    #[wasm_bindgen(js_name = touchCancel)]
    pub fn touch_cancel(&mut self) {
        self.pager.on_touch_cancel();
    }

    /// Feed one intersection ratio observed outside the built-in observer.
    pub fn intersection(&mut self, id: &str, ratio: f64) {
        self.pager
            .on_intersection(&[IntersectionEntry::new(id, ratio)]);
    }

    /// Request a scroll to `id` (header and footer links).
    pub fn navigate(&self, id: &str) {
        self.nav.request_scroll(id);
    }

    /// Deliver queued intersection entries and advance timers.
    pub fn tick(&mut self) {
        let entries = self.host.take_entries();
        if !entries.is_empty() {
            self.pager.on_intersection(&entries);
        }
        self.pager.tick();
    }

    pub fn unmount(&mut self) {
        self.pager.unmount();
    }

    #[wasm_bindgen(js_name = activeSection)]
    pub fn active_section(&self) -> String {
        self.nav.active().get().to_string()
    }

    #[wasm_bindgen(js_name = isLast)]
    pub fn is_last(&self) -> bool {
        self.nav.is_last().get()
    }

    /// Apply a JSON-encoded [`HostEvent`](crate::HostEvent).
    #[wasm_bindgen(js_name = pushEventJson)]
    pub fn push_event_json(&mut self, json: &str) -> Result<(), JsValue> {
        crate::dispatch_json(&mut self.pager, &self.nav, json)
            .map_err(|err| js_error(&err.to_string()))
    }

    pub fn language(&self) -> String {
        self.language.current().code().to_owned()
    }

    /// Advance de → en → ru and return the new language code.
    #[wasm_bindgen(js_name = cycleLanguage)]
    pub fn cycle_language(&self) -> String {
        self.language.cycle().code().to_owned()
    }

    /// Label of `id` in the current language.
    #[wasm_bindgen(js_name = sectionLabel)]
    pub fn section_label(&self, id: &str) -> Option<String> {
        catalog::label(self.language.current(), id).map(str::to_owned)
    }
}
