use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use calmpage::prelude::*;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

struct Site {
    page: Arc<MemoryPage>,
    toggler: ElementId,
    collapse: ElementId,
    about_link: ElementId,
    contact_link: ElementId,
    about: ElementId,
    contact: ElementId,
    heading: ElementId,
    image: ElementId,
    eager_image: ElementId,
    counter: ElementId,
    form: ElementId,
    submit: ElementId,
    privacy_link: ElementId,
    policy_link: ElementId,
}

impl Site {
    fn control(&self, id: &str) -> ElementId {
        self.page
            .query_first(Some(self.form), &Query::id(id))
            .expect("form control")
    }

    fn fill_form(&self) {
        self.page.type_into(self.control("firstName"), "Ada");
        self.page.type_into(self.control("lastName"), "Lovelace");
        self.page.type_into(self.control("email"), "ada@example.org");
        self.page
            .type_into(self.control("message"), "Please send the engine notes.");
        self.page.set_checked(self.control("privacy"), true);
    }
}

fn site(href: &str) -> Site {
    init_logging();
    let page = Arc::new(MemoryPage::new(href));
    let body = page.body();

    let header = page.insert(body, "header", &[("class", "navbar")]);
    let toggler = page.insert(
        header,
        "button",
        &[("class", "navbar-toggler"), ("aria-expanded", "false")],
    );
    let collapse = page.insert(header, "div", &[("class", "navbar-collapse")]);
    let about_link = page.insert(
        collapse,
        "a",
        &[("class", "nav-link"), ("href", "#about")],
    );
    let contact_link = page.insert(
        collapse,
        "a",
        &[("class", "nav-link"), ("href", "#contact")],
    );
    page.insert(
        collapse,
        "a",
        &[("class", "nav-link"), ("href", "about.html")],
    );

    let about = page.insert(body, "section", &[("id", "about")]);
    let heading = page.insert(about, "h2", &[]);
    page.set_text(heading, "Über uns");
    page.insert(about, "div", &[("class", "card")]);
    let image = page.insert(about, "img", &[("src", "team.jpg")]);
    let eager_image = page.insert(about, "img", &[("src", "logo.svg"), ("loading", "eager")]);
    let counter = page.insert(about, "span", &[("data-count", "12500")]);

    let contact = page.insert(body, "section", &[("id", "contact")]);
    let form = page.insert(contact, "form", &[("id", "contactForm")]);
    for (id, tag, kind) in [
        ("firstName", "input", "text"),
        ("lastName", "input", "text"),
        ("email", "input", "email"),
        ("phone", "input", "tel"),
        ("message", "textarea", "text"),
        ("privacy", "input", "checkbox"),
    ] {
        let wrapper = page.insert(form, "div", &[("class", "mb-3")]);
        page.insert(wrapper, tag, &[("id", id), ("type", kind)]);
    }
    let submit = page.insert(
        form,
        "button",
        &[("type", "submit"), ("class", "btn btn-primary")],
    );
    page.set_text(submit, "Absenden");

    let footer = page.insert(body, "footer", &[]);
    let privacy_link = page.insert(footer, "a", &[("href", "privacy.html")]);
    page.set_text(privacy_link, "Datenschutz");
    let policy_link = page.insert(footer, "a", &[("href", "privacy.html#cookies")]);
    page.set_text(policy_link, "Cookie policy");

    Site {
        page,
        toggler,
        collapse,
        about_link,
        contact_link,
        about,
        contact,
        heading,
        image,
        eager_image,
        counter,
        form,
        submit,
        privacy_link,
        policy_link,
    }
}

fn controller(site: &Site) -> PageController {
    PageController::new(site.page.clone(), PageConfig::instant().locale("de"))
}

#[test]
fn init_is_idempotent() {
    let site = site("https://example.com/");
    let controller = controller(&site);

    let first = controller.init().expect("first init");
    assert!(first.initialized);
    assert!(first.is_clean(), "{:?}", first.failed);
    assert_eq!(first.activated.len(), Feature::ALL.len());
    let listeners = site.page.total_listeners();
    let styles = site
        .page
        .query_all(Some(site.page.head()), &Query::tag("style"))
        .len();

    let second = controller.init().expect("second init");
    assert!(!second.initialized);
    assert!(second.activated.is_empty());
    assert_eq!(site.page.total_listeners(), listeners);
    assert_eq!(
        site.page
            .query_all(Some(site.page.head()), &Query::tag("style"))
            .len(),
        styles
    );
    assert_eq!(
        site.page
            .query_all(None, &Query::class("scroll-to-top"))
            .len(),
        1
    );

    assert_eq!(
        controller.activate(Feature::Menu).expect("menu"),
        Activation::AlreadyActive
    );
    let entries = controller.registry().entries().expect("entries");
    assert_eq!(entries.len(), Feature::ALL.len() + 1);
    assert_eq!(entries.get(&INIT), Some(&FeatureState::Active));
}

#[test]
fn menu_opens_and_closes_every_way() {
    let site = site("https://example.com/");
    let controller = controller(&site);
    controller.init().expect("init");
    let page = site.page.as_ref();
    let is_open = || page.has_class(site.collapse, "show");

    let event = page.click(site.toggler);
    assert!(event.is_default_prevented());
    assert!(is_open());
    assert_eq!(
        page.attribute(site.toggler, "aria-expanded").as_deref(),
        Some("true")
    );
    assert_eq!(page.style(page.body(), "overflow").as_deref(), Some("hidden"));

    page.key_down("Enter");
    assert!(is_open());
    page.key_down("Escape");
    assert!(!is_open());
    assert_eq!(page.style(page.body(), "overflow"), None);

    page.click(site.toggler);
    page.click(site.heading);
    assert!(!is_open(), "outside click closes");

    page.click(site.toggler);
    page.click(site.collapse);
    assert!(is_open(), "click inside the panel keeps it open");
    page.click(site.contact_link);
    assert!(!is_open(), "nav link click closes");

    page.click(site.toggler);
    page.resize(500.0);
    page.run_until_idle();
    assert!(is_open());
    page.resize(1024.0);
    page.run_until_idle();
    assert!(!is_open(), "widening past the breakpoint closes");
    assert_eq!(
        page.attribute(site.toggler, "aria-expanded").as_deref(),
        Some("false")
    );
}

#[test]
fn anchors_scroll_smoothly_below_the_header_on_the_homepage() {
    let site = site("https://example.com/index.html");
    controller(&site).init().expect("init");
    let page = site.page.as_ref();
    page.set_rect(site.about, Rect::new(0.0, 500.0, 1024.0, 400.0));
    page.scroll_window(100.0);

    let event = page.click(site.about_link);

    assert!(event.is_default_prevented());
    assert_eq!(
        page.scroll_requests().last(),
        Some(&(520.0, ScrollBehavior::Smooth))
    );
}

#[test]
fn anchors_keep_default_behavior_off_the_homepage() {
    let site = site("https://example.com/about.html");
    controller(&site).init().expect("init");

    let event = site.page.click(site.about_link);

    assert!(!event.is_default_prevented());
    assert!(site.page.scroll_requests().is_empty());
}

#[test]
fn scroll_spy_tracks_the_visible_section() {
    let site = site("https://example.com/");
    controller(&site).init().expect("init");
    let page = site.page.as_ref();

    page.set_visible(site.contact, true);
    assert!(page.has_class(site.contact_link, "active"));
    assert_eq!(
        page.attribute(site.contact_link, "aria-current").as_deref(),
        Some("page")
    );
    assert!(!page.has_class(site.about_link, "active"));

    page.set_visible(site.contact, false);
    assert!(page.has_class(site.contact_link, "active"), "leaving keeps the mark");

    page.set_visible(site.about, true);
    assert!(page.has_class(site.about_link, "active"));
    assert_eq!(page.attribute(site.contact_link, "aria-current"), None);
}

#[test]
fn active_menu_marks_the_current_page() {
    init_logging();
    let nav = |href: &str| {
        let page = Arc::new(MemoryPage::new(href));
        let links = ["index.html", "about.html", "contact.html"]
            .map(|target| page.insert(page.body(), "a", &[("class", "nav-link"), ("href", target)]));
        page.add_class(links[0], "active");
        (page, links)
    };

    let (page, [home, about, contact]) = nav("https://example.com/about.html");
    PageController::new(page.clone(), PageConfig::instant())
        .init()
        .expect("init");
    assert!(page.has_class(about, "active"));
    assert_eq!(page.attribute(about, "aria-current").as_deref(), Some("page"));
    assert!(!page.has_class(home, "active"), "stale marks are cleared");
    assert!(!page.has_class(contact, "active"));

    let (page, [home, _, _]) = nav("https://example.com/");
    PageController::new(page.clone(), PageConfig::instant())
        .init()
        .expect("init");
    assert!(page.has_class(home, "active"), "`/` matches index.html");
}

#[test]
fn images_load_lazily_and_fall_back_to_a_placeholder() {
    let site = site("https://example.com/");
    controller(&site).init().expect("init");
    let page = site.page.as_ref();

    assert_eq!(page.attribute(site.image, "loading").as_deref(), Some("lazy"));
    assert_eq!(
        page.attribute(site.eager_image, "loading").as_deref(),
        Some("eager")
    );

    page.fail_load(site.image);
    let src = page.attribute(site.image, "src").expect("src");
    assert!(src.starts_with("data:image/svg+xml;base64,"), "{src}");
    assert_eq!(page.style(site.image, "object-fit").as_deref(), Some("contain"));
    assert_eq!(
        page.attribute(site.eager_image, "src").as_deref(),
        Some("logo.svg")
    );
}

#[test]
fn counters_count_up_once_half_visible() {
    let site = site("https://example.com/");
    controller(&site).init().expect("init");
    let page = site.page.as_ref();

    page.set_intersection_ratio(site.counter, 0.4);
    page.run_until_idle();
    assert_eq!(page.text(site.counter), "");
    assert_eq!(page.observed_count(site.counter), 1);

    page.set_intersection_ratio(site.counter, 0.6);
    page.run_until_idle();
    assert_eq!(page.text(site.counter), "12.500");
    assert_eq!(page.observed_count(site.counter), 0);
}

#[test]
fn content_reveals_on_first_visibility() {
    let site = site("https://example.com/");
    controller(&site).init().expect("init");
    let page = site.page.as_ref();
    assert_eq!(page.observed_count(site.heading), 1);

    page.set_visible(site.heading, true);
    assert_eq!(page.style(site.heading, "opacity").as_deref(), Some("0"));
    assert_eq!(
        page.style(site.heading, "transform").as_deref(),
        Some("translateY(30px)")
    );
    assert_eq!(page.observed_count(site.heading), 0);

    page.run_until_idle();
    assert_eq!(page.style(site.heading, "opacity").as_deref(), Some("1"));
    assert_eq!(
        page.style(site.heading, "transform").as_deref(),
        Some("translateY(0)")
    );
    assert_eq!(
        page.style(site.heading, "transition").as_deref(),
        Some("opacity 0s ease-out, transform 0s ease-out")
    );
}

#[test]
fn buttons_ripple_from_the_click_point() {
    let site = site("https://example.com/");
    controller(&site).init().expect("init");
    let page = site.page.as_ref();
    page.set_rect(site.submit, Rect::new(10.0, 100.0, 120.0, 40.0));

    page.click_at(site.submit, 70.0, 130.0);

    let ripple = page
        .query_first(Some(site.submit), &Query::class("ripple"))
        .expect("ripple span");
    assert_eq!(page.style(ripple, "width").as_deref(), Some("120px"));
    assert_eq!(page.style(ripple, "left").as_deref(), Some("0px"));
    assert_eq!(page.style(ripple, "top").as_deref(), Some("-30px"));
    assert_eq!(page.style(site.submit, "position").as_deref(), Some("relative"));
    assert_eq!(page.style(site.submit, "overflow").as_deref(), Some("hidden"));
    assert!(
        page.query_first(
            Some(page.head()),
            &Query::attr_equals("data-calmpage-style", "ripple")
        )
        .is_some()
    );

    page.run_until_idle();
    assert!(!page.is_connected(ripple));
}

#[test]
fn scroll_to_top_button_follows_scroll_offset() {
    let site = site("https://example.com/");
    controller(&site).init().expect("init");
    let page = site.page.as_ref();
    let button = page
        .query_first(None, &Query::class("scroll-to-top"))
        .expect("scroll-to-top button");
    assert_eq!(
        page.attribute(button, "aria-label").as_deref(),
        Some("Nach oben scrollen")
    );
    assert_eq!(page.style(button, "visibility").as_deref(), Some("hidden"));

    page.scroll_window(450.0);
    assert_eq!(page.style(button, "opacity").as_deref(), Some("1"));
    assert_eq!(page.style(button, "visibility").as_deref(), Some("visible"));

    page.run_until_idle();
    page.scroll_window(120.0);
    assert_eq!(page.style(button, "opacity").as_deref(), Some("0"));

    page.click(button);
    assert_eq!(
        page.scroll_requests().last(),
        Some(&(0.0, ScrollBehavior::Smooth))
    );
}

#[test]
fn privacy_links_redirect_unless_already_there() {
    let home = site("https://example.com/");
    controller(&home).init().expect("init");

    let event = home.page.click(home.privacy_link);
    assert!(event.is_default_prevented());
    assert_eq!(home.page.navigations(), vec!["privacy.html".to_string()]);

    let event = home.page.click(home.policy_link);
    assert!(!event.is_default_prevented());
    assert_eq!(home.page.navigations().len(), 1);

    let privacy = site("https://example.com/privacy.html");
    controller(&privacy).init().expect("init");
    let event = privacy.page.click(privacy.privacy_link);
    assert!(!event.is_default_prevented());
    assert!(privacy.page.navigations().is_empty());
}

#[test]
fn contact_form_submits_and_redirects() {
    let site = site("https://example.com/");
    let controller = controller(&site);
    controller.init().expect("init");
    let forms = controller.forms().expect("forms");
    assert_eq!(forms.len(), 1);
    assert_eq!(forms[0].form(), site.form);

    site.fill_form();
    let event = site.page.submit(site.form);

    assert!(event.is_default_prevented());
    assert!(site.page.is_disabled(site.submit));
    assert_eq!(site.page.text(site.submit), "Senden...");
    assert_eq!(
        forms[0].submit_state().expect("state"),
        SubmitState::Submitting
    );

    site.page.run_until_idle();

    assert_eq!(forms[0].submit_state().expect("state"), SubmitState::Done);
    assert_eq!(site.page.navigations(), vec!["thank_you.html".to_string()]);
    assert!(controller.notifier().list().expect("notifications").is_empty());

    site.page.submit(site.form);
    site.page.run_until_idle();
    assert_eq!(site.page.navigations().len(), 1, "no second submission");
}

#[test]
fn invalid_contact_form_shows_errors_and_one_notification() {
    let site = site("https://example.com/");
    let controller = controller(&site);
    controller.init().expect("init");

    site.page.submit(site.form);

    let first_name = site.control("firstName");
    assert!(site.page.has_class(first_name, "is-invalid"));
    assert!(!site.page.has_class(site.control("phone"), "is-invalid"));
    let live = controller.notifier().list().expect("notifications");
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].severity, Severity::Danger);
    assert!(site.page.has_class(live[0].element, "alert-danger"));
    assert!(!site.page.is_disabled(site.submit));

    site.page.type_into(first_name, "A");
    assert!(!site.page.has_class(first_name, "is-invalid"));

    site.page.run_until_idle();
    assert!(site.page.navigations().is_empty());
    assert_eq!(
        controller.forms().expect("forms")[0]
            .submit_state()
            .expect("state"),
        SubmitState::Idle
    );
}

#[test]
fn form_mixing_id_schemes_is_left_unwired() {
    let site = site("https://example.com/");
    let stray = site.page.insert(site.form, "div", &[]);
    site.page.insert(stray, "input", &[("id", "vorname")]);
    let controller = controller(&site);

    let report = controller.init().expect("init");

    assert!(report.is_clean());
    assert!(controller.forms().expect("forms").is_empty());
    let event = site.page.submit(site.form);
    assert!(!event.is_default_prevented());
}

#[test]
fn failing_feature_does_not_block_the_rest() {
    let site = site("https://example.com/");
    let runs = Arc::new(AtomicUsize::new(0));
    let counted = runs.clone();
    let controller = controller(&site)
        .with_feature(FeatureKey::new("broken"), |_| {
            Err(StatePoisoned("wiring broken feature").into())
        })
        .with_feature(FeatureKey::new("analytics"), move |cx| {
            counted.fetch_add(1, Ordering::SeqCst);
            cx.page.set_attribute(cx.page.body(), "data-analytics", "on");
            Ok(())
        });

    let report = controller.init().expect("init");

    assert_eq!(report.failed.len(), 1);
    assert!(matches!(
        &report.failed[0],
        PageError::FeatureSetup { feature, .. } if *feature == FeatureKey::new("broken")
    ));
    assert!(report.activated.contains(&FeatureKey::new("analytics")));
    assert_eq!(
        controller
            .registry()
            .state(FeatureKey::new("broken"))
            .expect("state"),
        Some(FeatureState::Failed)
    );
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    controller.init().expect("second init");
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}
