//! Storefront page the terminal host mounts the widget into.

use crate::config::PRIMARY_ACTION_CLASS;
use crate::dom::{Document, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    Click,
    /// Submit button: a click on the button, then a submit on its form.
    Submit { form: NodeId },
}

/// A focusable element on the page.
#[derive(Debug, Clone)]
pub struct Control {
    pub node: NodeId,
    pub label: String,
    pub tracked: bool,
    pub action: ControlAction,
}

#[derive(Debug, Clone)]
pub struct DemoPage {
    pub document: Document,
    pub heading: String,
    pub intro: String,
    pub controls: Vec<Control>,
    pub form: Option<NodeId>,
}

pub fn storefront() -> DemoPage {
    let heading = "Autumn Collection";
    let intro = "Warm layers, fresh colours. Free shipping this week.";

    let mut doc = Document::new();
    let body = doc.body();
    let main = doc.append_element(body, "main", &["storefront"], "");
    doc.append_element(main, "h1", &[], heading);
    doc.append_element(main, "p", &[], intro);

    let shop = doc.append_element(main, "a", &[PRIMARY_ACTION_CLASS], "");
    doc.set_attribute(shop, "href", "/shop.html");
    doc.append_element(shop, "span", &[], "Shop Now");
    let cart = doc.append_element(main, "button", &[PRIMARY_ACTION_CLASS], "Add to cart");
    let learn = doc.append_element(main, "a", &[], "Learn more");
    doc.set_attribute(learn, "href", "/about.html");

    let form = doc.append_element(main, "form", &["newsletter"], "");
    let email = doc.append_element(form, "input", &[], "");
    doc.set_attribute(email, "type", "email");
    let subscribe = doc.append_element(form, "button", &[], "Subscribe");
    doc.set_attribute(subscribe, "type", "submit");

    let control = |doc: &Document, node: NodeId, action: ControlAction| Control {
        node,
        label: doc.text_content(node),
        tracked: doc.has_class(node, PRIMARY_ACTION_CLASS),
        action,
    };
    let controls = vec![
        control(&doc, shop, ControlAction::Click),
        control(&doc, cart, ControlAction::Click),
        control(&doc, learn, ControlAction::Click),
        control(&doc, subscribe, ControlAction::Submit { form }),
    ];

    DemoPage {
        document: doc,
        heading: heading.to_string(),
        intro: intro.to_string(),
        controls,
        form: Some(form),
    }
}
