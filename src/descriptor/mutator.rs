//! Auto-reconfiguration injection into a deployment descriptor.
//!
//! Three additive edits against a [`DescriptorTree`]:
//!
//! 1. the application-wide `contextConfigLocation` context-param gains the
//!    auto-reconfiguration context,
//! 2. the application-wide `contextInitializerClasses` context-param gains
//!    the auto-reconfiguration initializer,
//! 3. every servlet whose class is the framework's dispatcher servlet gains
//!    the auto-reconfiguration context in its `contextConfigLocation`
//!    init-param.
//!
//! All three follow one update rule: match the parameter by exact trimmed
//! name within its scope; skip when the value already carries the injected
//! literal (split on whitespace); append to an existing value; create the
//! parameter from the scope's registered default location when absent. A
//! `contextClass` sibling naming the annotation-driven application context
//! switches the injected value to the annotation-config variant. The sibling
//! is only honored within the same scope; a `contextClass` elsewhere in the
//! document never changes another scope's injection.

use super::tree::{DescriptorTree, XmlElement};
use std::collections::HashMap;
use tracing::debug;

pub const CONTEXT_CONFIG_LOCATION: &str = "contextConfigLocation";
pub const CONTEXT_INITIALIZER_CLASSES: &str = "contextInitializerClasses";
pub const CONTEXT_CLASS: &str = "contextClass";

/// The annotation-driven application context class that flips the injection
/// to the annotation-config variant.
pub const ANNOTATION_CONTEXT_CLASS: &str =
    "org.springframework.web.context.support.AnnotationConfigWebApplicationContext";

/// The literal values injected into one application's descriptor, read-only
/// once built.
#[derive(Debug, Clone)]
pub struct ConfigurationBundle {
    /// Value injected into `contextConfigLocation` parameters.
    pub context_config_location: String,
    /// Variant injected when the scope bootstraps an annotation context.
    pub annotation_config_location: Option<String>,
    /// Value injected into the `contextInitializerClasses` context-param;
    /// `None` skips that edit entirely.
    pub context_initializer_classes: Option<String>,
    /// Servlet class whose entries receive the init-param edit.
    pub dispatcher_servlet_class: String,
    /// Default application context location used when the context-param must
    /// be created from scratch; without it the context edit creates nothing.
    pub default_app_context: Option<String>,
    /// Default servlet context locations, keyed by servlet name.
    pub default_servlet_contexts: HashMap<String, String>,
}

/// Applies one bundle to one descriptor. In-place tree edits only; the
/// caller serializes and writes the result back.
pub struct DescriptorMutator<'a> {
    tree: &'a mut DescriptorTree,
    bundle: &'a ConfigurationBundle,
    // qualified names, computed once per descriptor
    context_param: String,
    init_param: String,
    param_name: String,
    param_value: String,
    servlet: String,
    servlet_name: String,
    servlet_class: String,
}

impl<'a> DescriptorMutator<'a> {
    pub fn new(tree: &'a mut DescriptorTree, bundle: &'a ConfigurationBundle) -> Self {
        let context_param = tree.qualified("context-param");
        let init_param = tree.qualified("init-param");
        let param_name = tree.qualified("param-name");
        let param_value = tree.qualified("param-value");
        let servlet = tree.qualified("servlet");
        let servlet_name = tree.qualified("servlet-name");
        let servlet_class = tree.qualified("servlet-class");
        Self {
            tree,
            bundle,
            context_param,
            init_param,
            param_name,
            param_value,
            servlet,
            servlet_name,
            servlet_class,
        }
    }

    /// Runs every edit the bundle asks for.
    pub fn apply(&mut self) {
        self.configure_context_param();
        if self.bundle.context_initializer_classes.is_some() {
            self.configure_initializer_param();
        }
        self.configure_servlets();
    }

    /// Edit 1: the application-wide `contextConfigLocation` context-param.
    pub fn configure_context_param(&mut self) {
        let inject = self
            .context_location_for(self.tree.root(), &self.context_param)
            .to_string();
        let names = self.names();
        let default = self.bundle.default_app_context.clone();
        update_param(
            self.tree.root_mut(),
            &names,
            ParamEdit {
                element: names.context_param.clone(),
                name: CONTEXT_CONFIG_LOCATION,
                inject: &inject,
                separator: " ",
                default_location: default.as_deref(),
                create_without_default: false,
            },
        );
    }

    /// Edit 2: the application-wide `contextInitializerClasses` context-param.
    pub fn configure_initializer_param(&mut self) {
        let Some(initializer) = self.bundle.context_initializer_classes.clone() else {
            return;
        };
        let names = self.names();
        update_param(
            self.tree.root_mut(),
            &names,
            ParamEdit {
                element: names.context_param.clone(),
                name: CONTEXT_INITIALIZER_CLASSES,
                inject: &initializer,
                separator: ", ",
                default_location: None,
                create_without_default: true,
            },
        );
    }

    /// Edit 3: every dispatcher servlet's `contextConfigLocation` init-param,
    /// each servlet processed independently.
    pub fn configure_servlets(&mut self) {
        let names = self.names();
        let dispatcher = self.bundle.dispatcher_servlet_class.clone();
        let defaults = self.bundle.default_servlet_contexts.clone();
        let context_location = self.bundle.context_config_location.clone();
        let annotation_location = self.bundle.annotation_config_location.clone();

        let servlet_tag = self.servlet.clone();
        let servlet_class_tag = self.servlet_class.clone();
        let servlet_name_tag = self.servlet_name.clone();

        for servlet in self.tree.root_mut().elements_mut(&servlet_tag) {
            let class = servlet
                .first_element(&servlet_class_tag)
                .map(|el| el.text().trim().to_string())
                .unwrap_or_default();
            if class != dispatcher {
                continue;
            }

            let name = servlet
                .first_element(&servlet_name_tag)
                .map(|el| el.text().trim().to_string())
                .unwrap_or_default();
            debug!("configuring dispatcher servlet {name:?}");

            let inject = if annotation_scope(servlet, &names, &names.init_param) {
                annotation_location
                    .clone()
                    .unwrap_or_else(|| context_location.clone())
            } else {
                context_location.clone()
            };

            update_param(
                servlet,
                &names,
                ParamEdit {
                    element: names.init_param.clone(),
                    name: CONTEXT_CONFIG_LOCATION,
                    inject: &inject,
                    separator: " ",
                    default_location: defaults.get(&name).map(String::as_str),
                    create_without_default: true,
                },
            );
        }
    }

    /// The value to inject for a configuration-location edit within `scope`,
    /// honoring a same-scope `contextClass` annotation sibling.
    fn context_location_for<'b>(&'b self, scope: &XmlElement, param_element: &str) -> &'b str {
        let names = self.names();
        if annotation_scope(scope, &names, param_element) {
            if let Some(annotation) = &self.bundle.annotation_config_location {
                return annotation;
            }
        }
        &self.bundle.context_config_location
    }

    fn names(&self) -> QualifiedNames {
        QualifiedNames {
            context_param: self.context_param.clone(),
            init_param: self.init_param.clone(),
            param_name: self.param_name.clone(),
            param_value: self.param_value.clone(),
        }
    }
}

#[derive(Clone)]
struct QualifiedNames {
    context_param: String,
    init_param: String,
    param_name: String,
    param_value: String,
}

struct ParamEdit<'a> {
    /// `context-param` or `init-param`, already namespace-qualified.
    element: String,
    name: &'a str,
    inject: &'a str,
    separator: &'a str,
    /// Location prefixed to the injected value when the parameter is created.
    default_location: Option<&'a str>,
    /// Whether to create the parameter when absent and no default is
    /// registered. The context-location context-param is only created when a
    /// default application context exists; every other edit creates freely.
    create_without_default: bool,
}

/// True when `scope` holds a `contextClass` parameter naming the
/// annotation-driven application context.
fn annotation_scope(scope: &XmlElement, names: &QualifiedNames, param_element: &str) -> bool {
    find_param(scope, param_element, names, CONTEXT_CLASS)
        .and_then(|param| param.first_element(&names.param_value))
        .map(|value| value.text().trim() == ANNOTATION_CONTEXT_CLASS)
        .unwrap_or(false)
}

fn find_param<'e>(
    scope: &'e XmlElement,
    param_element: &str,
    names: &QualifiedNames,
    param_name: &str,
) -> Option<&'e XmlElement> {
    scope.elements(param_element).find(|param| {
        param
            .first_element(&names.param_name)
            .map(|name| name.text().trim() == param_name)
            .unwrap_or(false)
    })
}

fn find_param_mut<'e>(
    scope: &'e mut XmlElement,
    param_element: &str,
    names: &QualifiedNames,
    param_name: &str,
) -> Option<&'e mut XmlElement> {
    scope.elements_mut(param_element).find(|param| {
        param
            .first_element(&names.param_name)
            .map(|name| name.text().trim() == param_name)
            .unwrap_or(false)
    })
}

/// The shared update rule for all three edits.
fn update_param(scope: &mut XmlElement, names: &QualifiedNames, edit: ParamEdit<'_>) {
    match find_param_mut(scope, &edit.element, names, edit.name) {
        Some(param) => match param.first_element_mut(&names.param_value) {
            Some(value_el) => {
                let current = value_el.text();
                if current.split_whitespace().any(|token| token == edit.inject) {
                    debug!("{} already configured, leaving descriptor untouched", edit.name);
                    return;
                }
                let updated = if current.trim().is_empty() {
                    edit.inject.to_string()
                } else {
                    format!("{}{}{}", current, edit.separator, edit.inject)
                };
                value_el.set_text(&updated);
            }
            None => {
                param.push_text_element(&names.param_value, edit.inject);
            }
        },
        None => {
            let value = match edit.default_location {
                Some(default) => format!("{} {}", default, edit.inject),
                None if edit.create_without_default => edit.inject.to_string(),
                None => return,
            };
            let mut param = XmlElement::new(edit.element.as_str());
            param.push_text_element(&names.param_name, edit.name);
            param.push_text_element(&names.param_value, &value);
            scope.push_element(param);
        }
    }
}
